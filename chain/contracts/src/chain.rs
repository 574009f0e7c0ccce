//! SupplyChain: the contract facade
//!
//! Composes the role registry, asset ledger, escrow and event log behind
//! one call surface. Every mutating call is all-or-nothing: it either
//! commits its state changes together with its events, or fails with no
//! observable effect.

use tracing::{debug, info};
use types::ids::{Identity, Serial, Upc};
use types::numeric::Amount;
use types::role::Role;

use crate::config::LedgerConfig;
use crate::errors::{ContractError, LedgerError};
use crate::escrow::EscrowAccount;
use crate::events::{EventLog, EventRecord, SupplyChainEvent};
use crate::ledger::{Aircraft, AssetLedger, Call, Committed, Component, Equipment};
use crate::rail::{LocalRail, PaymentRail};
use crate::roles::RoleRegistry;
use crate::security::Ownership;
use crate::snapshot::ChainState;

/// The supply chain contract.
///
/// Generic over the payment rail that executes withdrawals; the rail is
/// external to the contract state and is not part of snapshots.
#[derive(Debug)]
pub struct SupplyChain<R: PaymentRail = LocalRail> {
    config: LedgerConfig,
    ownership: Ownership,
    roles: RoleRegistry,
    ledger: AssetLedger,
    escrow: EscrowAccount,
    events: EventLog,
    rail: R,
}

impl SupplyChain<LocalRail> {
    /// Deploy with default prices and an in-memory rail.
    pub fn deploy_local(deployer: Identity) -> Self {
        Self::deploy(deployer, LedgerConfig::default(), LocalRail::new())
    }
}

impl<R: PaymentRail> SupplyChain<R> {
    /// Deploy a fresh contract.
    ///
    /// The deployer becomes the contract owner and is seeded with every
    /// role under `config.bootstrap_name`, emitting one `RoleAdded` each.
    pub fn deploy(deployer: Identity, config: LedgerConfig, rail: R) -> Self {
        let mut roles = RoleRegistry::new();
        let seeded = roles.bootstrap(deployer, &config.bootstrap_name);
        let mut events = EventLog::new();
        events.append(seeded);
        info!(%deployer, "Supply chain deployed");

        Self {
            config,
            ownership: Ownership::new(deployer),
            roles,
            ledger: AssetLedger::new(),
            escrow: EscrowAccount::new(),
            events,
            rail,
        }
    }

    /// Rebuild a contract from previously captured state.
    pub fn restore(state: ChainState, rail: R) -> Self {
        let ChainState {
            config,
            ownership,
            roles,
            ledger,
            escrow,
            events,
        } = state;
        info!(
            owner = %ownership.owner(),
            aircraft = ledger.aircraft_count(),
            last_event = events.last_sequence(),
            "Supply chain restored"
        );
        Self {
            config,
            ownership,
            roles,
            ledger,
            escrow,
            events,
            rail,
        }
    }

    /// Copy of the full contract state, excluding the rail.
    pub fn capture(&self) -> ChainState {
        ChainState {
            config: self.config.clone(),
            ownership: self.ownership.clone(),
            roles: self.roles.clone(),
            ledger: self.ledger.clone(),
            escrow: self.escrow.clone(),
            events: self.events.clone(),
        }
    }

    /// Replace the contract state with `state`, keeping the rail.
    ///
    /// Used to roll back a committed call whose effects could not be
    /// made durable. Transfers already executed on the rail are not undone.
    pub fn reset_state(&mut self, state: ChainState) {
        let ChainState {
            config,
            ownership,
            roles,
            ledger,
            escrow,
            events,
        } = state;
        self.config = config;
        self.ownership = ownership;
        self.roles = roles;
        self.ledger = ledger;
        self.escrow = escrow;
        self.events = events;
        debug!(last_event = self.events.last_sequence(), "State reset");
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    // ───────────────────────── Ownership ─────────────────────────

    pub fn owner(&self) -> Identity {
        self.ownership.owner()
    }

    pub fn transfer_ownership(
        &mut self,
        caller: &Identity,
        new_owner: Identity,
    ) -> Result<(), ContractError> {
        if !self.ownership.is_owner(caller) {
            return Err(ContractError::NotOwner { caller: *caller });
        }
        if !self.ownership.transfer(caller, new_owner) {
            return Err(ContractError::EmptyOwner);
        }
        info!(previous = %caller, owner = %new_owner, "Ownership transferred");
        Ok(())
    }

    // ───────────────────────── Roles ─────────────────────────

    /// Grant `role` to `identity` under display name `name`.
    pub fn add_role(
        &mut self,
        caller: &Identity,
        role: Role,
        identity: Identity,
        name: &str,
    ) -> Result<(), ContractError> {
        let event = self.roles.grant(caller, role, identity, name)?;
        self.events.append([event]);
        Ok(())
    }

    /// Remove the caller's own membership in `role`.
    pub fn renounce_role(&mut self, caller: &Identity, role: Role) -> Result<(), ContractError> {
        let event = self.roles.renounce(caller, role)?;
        self.events.append([event]);
        Ok(())
    }

    pub fn has_role(&self, role: Role, identity: &Identity) -> bool {
        self.roles.has(role, identity)
    }

    pub fn role_name(&self, role: Role, identity: &Identity) -> Option<&str> {
        self.roles.name_of(role, identity)
    }

    pub fn role_members(&self, role: Role) -> Vec<Identity> {
        self.roles.members(role)
    }

    // ───────────────────────── Aircraft ─────────────────────────

    pub fn order_aircraft(
        &mut self,
        call: &Call,
        equipment_id: Upc,
        manufacturer: Identity,
    ) -> Result<Aircraft, ContractError> {
        let result = self.ledger.order_aircraft(
            call,
            &self.roles,
            &mut self.escrow,
            &self.config,
            equipment_id,
            manufacturer,
        );
        let serial = self.commit("order_aircraft", call, result)?;
        self.fetch_aircraft(serial)
    }

    pub fn prepare_structure(
        &mut self,
        call: &Call,
        serial: Serial,
        origin_plant: &str,
        notes: &str,
    ) -> Result<Aircraft, ContractError> {
        let result = self
            .ledger
            .prepare_structure(call, &self.roles, serial, origin_plant, notes);
        let serial = self.commit("prepare_structure", call, result)?;
        self.fetch_aircraft(serial)
    }

    pub fn receive_aircraft(&mut self, call: &Call, serial: Serial) -> Result<Aircraft, ContractError> {
        let result = self.ledger.receive_aircraft(
            call,
            &self.roles,
            &mut self.escrow,
            &self.config,
            serial,
        );
        let serial = self.commit("receive_aircraft", call, result)?;
        self.fetch_aircraft(serial)
    }

    // ───────────────────────── Equipment ─────────────────────────

    pub fn order_equipment(
        &mut self,
        call: &Call,
        upc: Upc,
        supplier: Identity,
        serial: Serial,
    ) -> Result<Equipment, ContractError> {
        let result = self.ledger.order_equipment(
            call,
            &self.roles,
            &mut self.escrow,
            &self.config,
            upc,
            supplier,
            serial,
        );
        let upc = self.commit("order_equipment", call, result)?;
        self.fetch_equipment(upc)
    }

    pub fn pack_equipment(
        &mut self,
        call: &Call,
        upc: Upc,
        transporter: Identity,
    ) -> Result<Equipment, ContractError> {
        let result = self.ledger.pack_equipment(
            call,
            &self.roles,
            &mut self.escrow,
            &self.config,
            upc,
            transporter,
        );
        let upc = self.commit("pack_equipment", call, result)?;
        self.fetch_equipment(upc)
    }

    pub fn transport_equipment(&mut self, call: &Call, upc: Upc) -> Result<Equipment, ContractError> {
        let result = self.ledger.transport_equipment(call, &self.roles, upc);
        let upc = self.commit("transport_equipment", call, result)?;
        self.fetch_equipment(upc)
    }

    pub fn receive_equipment(&mut self, call: &Call, upc: Upc) -> Result<Equipment, ContractError> {
        let result = self.ledger.receive_equipment(
            call,
            &self.roles,
            &mut self.escrow,
            &self.config,
            upc,
        );
        let upc = self.commit("receive_equipment", call, result)?;
        self.fetch_equipment(upc)
    }

    /// Integrate received equipment; also assembles the linked aircraft.
    pub fn process_equipment(
        &mut self,
        call: &Call,
        upc: Upc,
        notes: &str,
    ) -> Result<Equipment, ContractError> {
        let result = self.ledger.process_equipment(call, &self.roles, upc, notes);
        let upc = self.commit("process_equipment", call, result)?;
        self.fetch_equipment(upc)
    }

    // ───────────────────────── Components ─────────────────────────

    pub fn receive_component(
        &mut self,
        call: &Call,
        upc: Upc,
        origin_manufacturer: &str,
        origin_plant: &str,
        equipment_id: Upc,
    ) -> Result<Component, ContractError> {
        let result = self.ledger.receive_component(
            call,
            &self.roles,
            upc,
            origin_manufacturer,
            origin_plant,
            equipment_id,
        );
        let upc = self.commit("receive_component", call, result)?;
        self.fetch_component(upc)
    }

    /// Integrate a received component; also assembles its equipment.
    pub fn process_component(
        &mut self,
        call: &Call,
        upc: Upc,
        origin_plant: &str,
        notes: &str,
    ) -> Result<Component, ContractError> {
        let result = self
            .ledger
            .process_component(call, &self.roles, upc, origin_plant, notes);
        let upc = self.commit("process_component", call, result)?;
        self.fetch_component(upc)
    }

    // ───────────────────────── Escrow ─────────────────────────

    /// Pay the caller's pending balance out through the rail.
    ///
    /// Returns the amount paid; zero when nothing was pending.
    pub fn withdraw(&mut self, caller: &Identity) -> Result<Amount, ContractError> {
        let paid = self.escrow.withdraw(caller, &mut self.rail)?;
        Ok(paid)
    }

    pub fn pending_withdrawals(&self, identity: &Identity) -> Amount {
        self.escrow.pending_of(identity)
    }

    /// Attached funds held by the contract but credited to nobody
    pub fn retained_funds(&self) -> Amount {
        self.escrow.retained()
    }

    pub fn total_pending(&self) -> Amount {
        self.escrow.total_pending()
    }

    pub fn rail(&self) -> &R {
        &self.rail
    }

    pub fn rail_mut(&mut self) -> &mut R {
        &mut self.rail
    }

    // ───────────────────────── Reads ─────────────────────────

    pub fn fetch_aircraft(&self, serial: Serial) -> Result<Aircraft, ContractError> {
        Ok(self.ledger.aircraft(serial)?.clone())
    }

    pub fn fetch_equipment(&self, upc: Upc) -> Result<Equipment, ContractError> {
        Ok(self.ledger.equipment(upc)?.clone())
    }

    pub fn fetch_component(&self, upc: Upc) -> Result<Component, ContractError> {
        Ok(self.ledger.component(upc)?.clone())
    }

    pub fn ledger(&self) -> &AssetLedger {
        &self.ledger
    }

    // ───────────────────────── Events ─────────────────────────

    pub fn events(&self) -> &[EventRecord] {
        self.events.records()
    }

    pub fn events_since(&self, sequence: u64) -> &[EventRecord] {
        self.events.since(sequence)
    }

    pub fn drain_events(&mut self) -> Vec<EventRecord> {
        self.events.drain()
    }

    pub fn last_event_sequence(&self) -> u64 {
        self.events.last_sequence()
    }

    // ───────────────────────── Internal ─────────────────────────

    /// Publish the events of a committed transition, or pass a rejection
    /// through untouched.
    fn commit<K>(
        &mut self,
        operation: &'static str,
        call: &Call,
        result: Result<Committed<K>, LedgerError>,
    ) -> Result<K, ContractError> {
        match result {
            Ok(Committed { key, events }) => {
                let labels: Vec<&'static str> = events.iter().map(SupplyChainEvent::label).collect();
                let sequences = self.events.append(events);
                info!(
                    operation,
                    caller = %call.caller,
                    events = ?labels,
                    last_sequence = sequences.last().copied().unwrap_or_default(),
                    "Call committed"
                );
                Ok(key)
            }
            Err(e) => {
                debug!(operation, caller = %call.caller, error = %e, "Call rejected");
                Err(e.into())
            }
        }
    }
}
