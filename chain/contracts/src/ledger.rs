//! Asset ledger: linked aircraft, equipment and component state machines
//!
//! Aircraft are ordered by customers and keyed by a contract-assigned
//! serial. Equipment is ordered by the aircraft's manufacturer for one
//! aircraft; a component is received by the equipment's supplier for one
//! piece of equipment. Every transition follows the same shape:
//!
//! 1. role check on the caller
//! 2. lookup of every touched entity (NotFound / DuplicateId)
//! 3. recorded counterparty check
//! 4. source state check of every touched entity
//! 5. exact attached payment check
//! 6. escrow settlement (the only fallible mutation)
//! 7. ledger writes
//!
//! Steps 1-6 either fail before anything is written or, in the case of
//! settlement, fail without writing. Step 7 cannot fail, so a transition
//! commits all of its effects or none.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;
use types::asset::{AircraftState, AssetKind, ComponentState, EquipmentState, LifecycleState};
use types::ids::{Identity, Serial, Upc};
use types::numeric::Amount;
use types::role::Role;

use crate::config::LedgerConfig;
use crate::errors::LedgerError;
use crate::escrow::EscrowAccount;
use crate::events::SupplyChainEvent;
use crate::roles::RoleRegistry;

/// Caller identity and attached payment of one call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Call {
    pub caller: Identity,
    pub payment: Amount,
}

impl Call {
    /// A call with no value attached
    pub fn new(caller: Identity) -> Self {
        Self {
            caller,
            payment: Decimal::ZERO,
        }
    }

    /// A call attaching `payment`
    pub fn paying(caller: Identity, payment: Amount) -> Self {
        Self { caller, payment }
    }
}

/// External field order of an aircraft:
/// (serial, equipment id, price, state code, owner, manufacturer,
/// origin plant, notes, customer)
pub type AircraftRecord = (u64, u64, Amount, u8, Identity, Identity, String, String, Identity);

/// External field order of equipment:
/// (id, component id, aircraft serial, price, state code, owner, supplier,
/// origin plant, notes, transporter, manufacturer)
pub type EquipmentRecord = (
    u64,
    u64,
    u64,
    Amount,
    u8,
    Identity,
    Identity,
    String,
    String,
    Identity,
    Identity,
);

/// External field order of a component:
/// (id, equipment id, state code, origin manufacturer name, origin plant,
/// supplier)
pub type ComponentRecord = (u64, u64, u8, String, String, Identity);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aircraft {
    pub serial: Serial,
    pub equipment_id: Upc,
    pub price: Amount,
    pub state: AircraftState,
    pub owner: Option<Identity>,
    pub manufacturer: Identity,
    pub origin_plant: String,
    pub notes: String,
    pub customer: Identity,
}

impl Aircraft {
    pub fn as_record(&self) -> AircraftRecord {
        (
            self.serial.value(),
            self.equipment_id.value(),
            self.price,
            self.state.code(),
            Identity::or_empty(self.owner),
            self.manufacturer,
            self.origin_plant.clone(),
            self.notes.clone(),
            self.customer,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equipment {
    pub upc: Upc,
    pub component_id: Option<Upc>,
    pub aircraft: Serial,
    pub price: Amount,
    pub state: EquipmentState,
    pub owner: Option<Identity>,
    pub supplier: Identity,
    pub origin_plant: String,
    pub notes: String,
    pub transporter: Option<Identity>,
    pub manufacturer: Identity,
}

impl Equipment {
    pub fn as_record(&self) -> EquipmentRecord {
        (
            self.upc.value(),
            Upc::or_zero(self.component_id),
            self.aircraft.value(),
            self.price,
            self.state.code(),
            Identity::or_empty(self.owner),
            self.supplier,
            self.origin_plant.clone(),
            self.notes.clone(),
            Identity::or_empty(self.transporter),
            self.manufacturer,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    pub upc: Upc,
    pub equipment_id: Upc,
    pub state: ComponentState,
    pub origin_manufacturer: String,
    pub origin_plant: String,
    pub supplier: Identity,
}

impl Component {
    pub fn as_record(&self) -> ComponentRecord {
        (
            self.upc.value(),
            self.equipment_id.value(),
            self.state.code(),
            self.origin_manufacturer.clone(),
            self.origin_plant.clone(),
            self.supplier,
        )
    }
}

/// Result of a committed transition: the key of the primary entity and the
/// events to publish, in emission order.
#[derive(Debug, Clone, PartialEq)]
pub struct Committed<K> {
    pub key: K,
    pub events: Vec<SupplyChainEvent>,
}

/// The three entity stores.
///
/// Entities are never removed; `next_serial` only grows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetLedger {
    aircraft: BTreeMap<Serial, Aircraft>,
    equipment: BTreeMap<Upc, Equipment>,
    components: BTreeMap<Upc, Component>,
    next_serial: Serial,
}

impl Default for AssetLedger {
    fn default() -> Self {
        Self {
            aircraft: BTreeMap::new(),
            equipment: BTreeMap::new(),
            components: BTreeMap::new(),
            next_serial: Serial::FIRST,
        }
    }
}

impl AssetLedger {
    pub fn new() -> Self {
        Self::default()
    }

    // ───────────────────────── Reads ─────────────────────────

    pub fn aircraft(&self, serial: Serial) -> Result<&Aircraft, LedgerError> {
        self.aircraft.get(&serial).ok_or(LedgerError::NotFound {
            asset: AssetKind::Aircraft,
            id: serial.value(),
        })
    }

    pub fn equipment(&self, upc: Upc) -> Result<&Equipment, LedgerError> {
        self.equipment.get(&upc).ok_or(LedgerError::NotFound {
            asset: AssetKind::Equipment,
            id: upc.value(),
        })
    }

    pub fn component(&self, upc: Upc) -> Result<&Component, LedgerError> {
        self.components.get(&upc).ok_or(LedgerError::NotFound {
            asset: AssetKind::Component,
            id: upc.value(),
        })
    }

    /// Serial the next aircraft order will receive
    pub fn next_serial(&self) -> Serial {
        self.next_serial
    }

    pub fn aircraft_count(&self) -> usize {
        self.aircraft.len()
    }

    pub fn equipment_count(&self) -> usize {
        self.equipment.len()
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    // ───────────────────────── Aircraft ─────────────────────────

    /// Customer orders a new aircraft from `manufacturer`.
    ///
    /// Requires the full aircraft price; half is credited to the
    /// manufacturer, half retained until delivery is paid.
    pub fn order_aircraft(
        &mut self,
        call: &Call,
        roles: &RoleRegistry,
        escrow: &mut EscrowAccount,
        config: &LedgerConfig,
        equipment_id: Upc,
        manufacturer: Identity,
    ) -> Result<Committed<Serial>, LedgerError> {
        require_role(roles, call, Role::Customer)?;
        if manufacturer.is_empty() {
            return Err(LedgerError::EmptyCounterparty {
                asset: AssetKind::Aircraft,
                field: "manufacturer",
            });
        }
        require_payment(call, config.aircraft_price)?;

        escrow.settle(
            call.payment,
            &[(manufacturer, config.aircraft_installment())],
        )?;

        let serial = self.next_serial;
        self.next_serial = serial.next();
        self.aircraft.insert(
            serial,
            Aircraft {
                serial,
                equipment_id,
                price: config.aircraft_price,
                state: AircraftState::Ordered,
                owner: None,
                manufacturer,
                origin_plant: String::new(),
                notes: String::new(),
                customer: call.caller,
            },
        );
        info!(%serial, customer = %call.caller, %manufacturer, "Aircraft ordered");

        Ok(Committed {
            key: serial,
            events: vec![SupplyChainEvent::Ordered {
                asset: AssetKind::Aircraft,
                id: serial.value(),
            }],
        })
    }

    /// Manufacturer prepares the structure of an ordered aircraft.
    pub fn prepare_structure(
        &mut self,
        call: &Call,
        roles: &RoleRegistry,
        serial: Serial,
        origin_plant: &str,
        notes: &str,
    ) -> Result<Committed<Serial>, LedgerError> {
        require_role(roles, call, Role::Manufacturer)?;
        let aircraft = self.aircraft(serial)?;
        require_party(call, aircraft.manufacturer, "manufacturer", AssetKind::Aircraft, serial.value())?;
        require_state(aircraft.state, AircraftState::Ordered, serial.value())?;
        require_payment(call, Decimal::ZERO)?;

        let aircraft = self.aircraft_mut(serial);
        advance(&mut aircraft.state, AircraftState::StructureReady);
        aircraft.origin_plant = origin_plant.to_string();
        aircraft.notes = notes.to_string();
        info!(%serial, origin_plant, "Aircraft structure ready");

        Ok(Committed {
            key: serial,
            events: vec![SupplyChainEvent::StructureReady { serial }],
        })
    }

    /// Customer takes delivery of an assembled aircraft, paying the
    /// second installment to the manufacturer.
    pub fn receive_aircraft(
        &mut self,
        call: &Call,
        roles: &RoleRegistry,
        escrow: &mut EscrowAccount,
        config: &LedgerConfig,
        serial: Serial,
    ) -> Result<Committed<Serial>, LedgerError> {
        require_role(roles, call, Role::Customer)?;
        let aircraft = self.aircraft(serial)?;
        require_party(call, aircraft.customer, "customer", AssetKind::Aircraft, serial.value())?;
        require_state(aircraft.state, AircraftState::Assembled, serial.value())?;
        let installment = config.aircraft_installment();
        require_payment(call, installment)?;
        let manufacturer = aircraft.manufacturer;

        escrow.settle(call.payment, &[(manufacturer, installment)])?;

        let aircraft = self.aircraft_mut(serial);
        advance(&mut aircraft.state, AircraftState::Received);
        aircraft.owner = Some(aircraft.customer);
        info!(%serial, customer = %call.caller, "Aircraft received");

        Ok(Committed {
            key: serial,
            events: vec![SupplyChainEvent::Received {
                asset: AssetKind::Aircraft,
                id: serial.value(),
            }],
        })
    }

    // ───────────────────────── Equipment ─────────────────────────

    /// Manufacturer of an ordered aircraft orders its equipment from
    /// `supplier`, paying the full equipment price to the supplier.
    pub fn order_equipment(
        &mut self,
        call: &Call,
        roles: &RoleRegistry,
        escrow: &mut EscrowAccount,
        config: &LedgerConfig,
        upc: Upc,
        supplier: Identity,
        serial: Serial,
    ) -> Result<Committed<Upc>, LedgerError> {
        require_role(roles, call, Role::Manufacturer)?;
        if self.equipment.contains_key(&upc) {
            return Err(LedgerError::DuplicateId {
                asset: AssetKind::Equipment,
                id: upc.value(),
            });
        }
        let aircraft = self.aircraft(serial)?;
        require_party(call, aircraft.manufacturer, "manufacturer", AssetKind::Aircraft, serial.value())?;
        require_state(aircraft.state, AircraftState::Ordered, serial.value())?;
        if aircraft.equipment_id != upc {
            return Err(LedgerError::LinkMismatch {
                asset: AssetKind::Aircraft,
                id: serial.value(),
                linked: aircraft.equipment_id.value(),
                requested: upc.value(),
            });
        }
        if supplier.is_empty() {
            return Err(LedgerError::EmptyCounterparty {
                asset: AssetKind::Equipment,
                field: "supplier",
            });
        }
        require_payment(call, config.equipment_price)?;

        escrow.settle(call.payment, &[(supplier, config.equipment_price)])?;

        self.equipment.insert(
            upc,
            Equipment {
                upc,
                component_id: None,
                aircraft: serial,
                price: config.equipment_price,
                state: EquipmentState::Ordered,
                owner: None,
                supplier,
                origin_plant: String::new(),
                notes: String::new(),
                transporter: None,
                manufacturer: call.caller,
            },
        );
        info!(%upc, %serial, %supplier, "Equipment ordered");

        Ok(Committed {
            key: upc,
            events: vec![SupplyChainEvent::Ordered {
                asset: AssetKind::Equipment,
                id: upc.value(),
            }],
        })
    }

    /// Supplier packs assembled equipment for `transporter`, paying the
    /// first transport installment.
    pub fn pack_equipment(
        &mut self,
        call: &Call,
        roles: &RoleRegistry,
        escrow: &mut EscrowAccount,
        config: &LedgerConfig,
        upc: Upc,
        transporter: Identity,
    ) -> Result<Committed<Upc>, LedgerError> {
        require_role(roles, call, Role::Supplier)?;
        let equipment = self.equipment(upc)?;
        require_owner(call, equipment.owner, AssetKind::Equipment, upc.value())?;
        require_state(equipment.state, EquipmentState::Assembled, upc.value())?;
        if transporter.is_empty() {
            return Err(LedgerError::EmptyCounterparty {
                asset: AssetKind::Equipment,
                field: "transporter",
            });
        }
        let installment = config.transport_installment();
        require_payment(call, installment)?;

        escrow.settle(call.payment, &[(transporter, installment)])?;

        let equipment = self.equipment_mut(upc);
        advance(&mut equipment.state, EquipmentState::Packed);
        equipment.transporter = Some(transporter);
        info!(%upc, %transporter, "Equipment packed");

        Ok(Committed {
            key: upc,
            events: vec![SupplyChainEvent::Packed { id: upc }],
        })
    }

    /// Recorded transporter picks up packed equipment.
    pub fn transport_equipment(
        &mut self,
        call: &Call,
        roles: &RoleRegistry,
        upc: Upc,
    ) -> Result<Committed<Upc>, LedgerError> {
        require_role(roles, call, Role::Transporter)?;
        let equipment = self.equipment(upc)?;
        require_optional_party(call, equipment.transporter, "transporter", upc.value())?;
        require_state(equipment.state, EquipmentState::Packed, upc.value())?;
        require_payment(call, Decimal::ZERO)?;

        let equipment = self.equipment_mut(upc);
        advance(&mut equipment.state, EquipmentState::InTransit);
        equipment.owner = Some(call.caller);
        info!(%upc, transporter = %call.caller, "Equipment in transit");

        Ok(Committed {
            key: upc,
            events: vec![SupplyChainEvent::InTransit { id: upc }],
        })
    }

    /// Ordering manufacturer receives equipment in transit, paying the
    /// second transport installment.
    pub fn receive_equipment(
        &mut self,
        call: &Call,
        roles: &RoleRegistry,
        escrow: &mut EscrowAccount,
        config: &LedgerConfig,
        upc: Upc,
    ) -> Result<Committed<Upc>, LedgerError> {
        require_role(roles, call, Role::Manufacturer)?;
        let equipment = self.equipment(upc)?;
        require_party(call, equipment.manufacturer, "manufacturer", AssetKind::Equipment, upc.value())?;
        require_state(equipment.state, EquipmentState::InTransit, upc.value())?;
        let installment = config.transport_installment();
        require_payment(call, installment)?;
        // Packing always records a transporter before InTransit is reachable
        let transporter = Identity::or_empty(equipment.transporter);

        escrow.settle(call.payment, &[(transporter, installment)])?;

        let equipment = self.equipment_mut(upc);
        advance(&mut equipment.state, EquipmentState::Received);
        equipment.owner = Some(call.caller);
        info!(%upc, manufacturer = %call.caller, "Equipment received");

        Ok(Committed {
            key: upc,
            events: vec![SupplyChainEvent::Received {
                asset: AssetKind::Equipment,
                id: upc.value(),
            }],
        })
    }

    /// Manufacturer integrates received equipment into the structure of its
    /// aircraft: equipment becomes Integrated, aircraft Assembled, and the
    /// assembly notes are appended to the aircraft notes.
    pub fn process_equipment(
        &mut self,
        call: &Call,
        roles: &RoleRegistry,
        upc: Upc,
        notes: &str,
    ) -> Result<Committed<Upc>, LedgerError> {
        require_role(roles, call, Role::Manufacturer)?;
        let equipment = self.equipment(upc)?;
        let serial = equipment.aircraft;
        let aircraft = self.aircraft(serial)?;
        require_owner(call, equipment.owner, AssetKind::Equipment, upc.value())?;
        require_party(call, aircraft.manufacturer, "manufacturer", AssetKind::Aircraft, serial.value())?;
        require_state(equipment.state, EquipmentState::Received, upc.value())?;
        require_state(aircraft.state, AircraftState::StructureReady, serial.value())?;
        require_payment(call, Decimal::ZERO)?;

        let equipment = self.equipment_mut(upc);
        advance(&mut equipment.state, EquipmentState::Integrated);

        let aircraft = self.aircraft_mut(serial);
        advance(&mut aircraft.state, AircraftState::Assembled);
        aircraft.notes.push_str(", Assembly stage: ");
        aircraft.notes.push_str(notes);
        info!(%upc, %serial, "Equipment integrated, aircraft assembled");

        Ok(Committed {
            key: upc,
            events: vec![
                SupplyChainEvent::Integrated {
                    asset: AssetKind::Equipment,
                    id: upc.value(),
                },
                SupplyChainEvent::Assembled {
                    asset: AssetKind::Aircraft,
                    id: serial.value(),
                },
            ],
        })
    }

    // ───────────────────────── Components ─────────────────────────

    /// Supplier takes in a component for existing equipment. The component
    /// starts in the Received state.
    pub fn receive_component(
        &mut self,
        call: &Call,
        roles: &RoleRegistry,
        upc: Upc,
        origin_manufacturer: &str,
        origin_plant: &str,
        equipment_id: Upc,
    ) -> Result<Committed<Upc>, LedgerError> {
        require_role(roles, call, Role::Supplier)?;
        if self.components.contains_key(&upc) {
            return Err(LedgerError::DuplicateId {
                asset: AssetKind::Component,
                id: upc.value(),
            });
        }
        self.equipment(equipment_id)?;
        require_payment(call, Decimal::ZERO)?;

        self.components.insert(
            upc,
            Component {
                upc,
                equipment_id,
                state: ComponentState::Received,
                origin_manufacturer: origin_manufacturer.to_string(),
                origin_plant: origin_plant.to_string(),
                supplier: call.caller,
            },
        );
        info!(%upc, equipment = %equipment_id, supplier = %call.caller, "Component received");

        Ok(Committed {
            key: upc,
            events: vec![SupplyChainEvent::Received {
                asset: AssetKind::Component,
                id: upc.value(),
            }],
        })
    }

    /// Supplier assembles ordered equipment from a received component:
    /// component becomes Integrated, equipment Assembled and owned by the
    /// supplier.
    pub fn process_component(
        &mut self,
        call: &Call,
        roles: &RoleRegistry,
        upc: Upc,
        origin_plant: &str,
        notes: &str,
    ) -> Result<Committed<Upc>, LedgerError> {
        require_role(roles, call, Role::Supplier)?;
        let component = self.component(upc)?;
        let equipment_id = component.equipment_id;
        let equipment = self.equipment(equipment_id)?;
        require_party(call, component.supplier, "supplier", AssetKind::Component, upc.value())?;
        require_party(call, equipment.supplier, "supplier", AssetKind::Equipment, equipment_id.value())?;
        require_state(component.state, ComponentState::Received, upc.value())?;
        require_state(equipment.state, EquipmentState::Ordered, equipment_id.value())?;
        require_payment(call, Decimal::ZERO)?;

        let component = self.component_mut(upc);
        advance(&mut component.state, ComponentState::Integrated);

        let equipment = self.equipment_mut(equipment_id);
        advance(&mut equipment.state, EquipmentState::Assembled);
        equipment.owner = Some(call.caller);
        equipment.origin_plant = origin_plant.to_string();
        equipment.notes = notes.to_string();
        equipment.component_id = Some(upc);
        info!(%upc, equipment = %equipment_id, origin_plant, "Component integrated, equipment assembled");

        Ok(Committed {
            key: upc,
            events: vec![
                SupplyChainEvent::Assembled {
                    asset: AssetKind::Equipment,
                    id: equipment_id.value(),
                },
                SupplyChainEvent::Integrated {
                    asset: AssetKind::Component,
                    id: upc.value(),
                },
            ],
        })
    }

    // ───────────────────────── Internal ─────────────────────────

    // The `*_mut` accessors are only reached after the matching read has
    // succeeded within the same transition.

    fn aircraft_mut(&mut self, serial: Serial) -> &mut Aircraft {
        self.aircraft
            .get_mut(&serial)
            .unwrap_or_else(|| unreachable!("aircraft {serial} validated before write"))
    }

    fn equipment_mut(&mut self, upc: Upc) -> &mut Equipment {
        self.equipment
            .get_mut(&upc)
            .unwrap_or_else(|| unreachable!("equipment {upc} validated before write"))
    }

    fn component_mut(&mut self, upc: Upc) -> &mut Component {
        self.components
            .get_mut(&upc)
            .unwrap_or_else(|| unreachable!("component {upc} validated before write"))
    }
}

// ───────────────────────── Guards ─────────────────────────

fn require_role(roles: &RoleRegistry, call: &Call, role: Role) -> Result<(), LedgerError> {
    if roles.has(role, &call.caller) {
        Ok(())
    } else {
        Err(LedgerError::MissingRole {
            caller: call.caller,
            role,
        })
    }
}

fn require_party(
    call: &Call,
    recorded: Identity,
    party: &'static str,
    asset: AssetKind,
    id: u64,
) -> Result<(), LedgerError> {
    if recorded == call.caller {
        Ok(())
    } else {
        Err(LedgerError::NotCounterparty {
            caller: call.caller,
            party,
            asset,
            id,
        })
    }
}

fn require_owner(
    call: &Call,
    owner: Option<Identity>,
    asset: AssetKind,
    id: u64,
) -> Result<(), LedgerError> {
    require_party(call, Identity::or_empty(owner), "owner", asset, id)
}

fn require_optional_party(
    call: &Call,
    recorded: Option<Identity>,
    party: &'static str,
    id: u64,
) -> Result<(), LedgerError> {
    require_party(call, Identity::or_empty(recorded), party, AssetKind::Equipment, id)
}

fn require_state<S: LifecycleState>(actual: S, expected: S, id: u64) -> Result<(), LedgerError> {
    if actual == expected {
        Ok(())
    } else {
        Err(LedgerError::InvalidState {
            asset: S::ASSET,
            id,
            expected: format!("{expected:?}"),
            actual: format!("{actual:?}"),
        })
    }
}

fn require_payment(call: &Call, required: Amount) -> Result<(), LedgerError> {
    if call.payment == required {
        Ok(())
    } else {
        Err(LedgerError::PaymentMismatch {
            required,
            attached: call.payment,
        })
    }
}

/// Move `state` to its immediate successor `next`.
fn advance<S: LifecycleState>(state: &mut S, next: S) {
    debug_assert!(
        state.can_advance_to(next),
        "illegal {} transition {:?} -> {:?}",
        S::ASSET,
        state,
        next
    );
    *state = next;
}
