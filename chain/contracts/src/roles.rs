//! Role registry
//!
//! Four independent membership sets, each mapping a member identity to the
//! display name recorded when the role was granted. A role is administered
//! by its own members: only a current holder may grant it to someone else,
//! and any holder may renounce their own membership.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};
use types::ids::Identity;
use types::role::Role;

use crate::errors::RoleError;
use crate::events::SupplyChainEvent;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoleRegistry {
    /// role -> (member -> display name)
    members: BTreeMap<Role, BTreeMap<Identity, String>>,
}

impl RoleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed `identity` with every role.
    ///
    /// Used once, when the contract is deployed. Returns one `RoleAdded`
    /// per role the identity did not already hold.
    pub fn bootstrap(&mut self, identity: Identity, name: &str) -> Vec<SupplyChainEvent> {
        let missing: Vec<Role> = Role::ALL
            .into_iter()
            .filter(|role| !self.has(*role, &identity))
            .collect();
        missing
            .into_iter()
            .map(|role| self.insert(role, identity, name))
            .collect()
    }

    /// Grant `role` to `identity`. The caller must already hold `role`.
    pub fn grant(
        &mut self,
        caller: &Identity,
        role: Role,
        identity: Identity,
        name: &str,
    ) -> Result<SupplyChainEvent, RoleError> {
        if !self.has(role, caller) {
            debug!(%caller, %role, "Grant rejected: caller lacks role");
            return Err(RoleError::Unauthorized {
                caller: *caller,
                role,
            });
        }
        if identity.is_empty() {
            return Err(RoleError::EmptyIdentity { role });
        }
        if self.has(role, &identity) {
            return Err(RoleError::AlreadyHeld { role, identity });
        }
        Ok(self.insert(role, identity, name))
    }

    /// Remove the caller's own membership in `role`.
    pub fn renounce(&mut self, caller: &Identity, role: Role) -> Result<SupplyChainEvent, RoleError> {
        let removed = self
            .members
            .get_mut(&role)
            .and_then(|set| set.remove(caller));
        if removed.is_none() {
            return Err(RoleError::NotHeld {
                role,
                identity: *caller,
            });
        }
        info!(identity = %caller, %role, "Role renounced");
        Ok(SupplyChainEvent::RoleRemoved {
            role,
            identity: *caller,
        })
    }

    pub fn has(&self, role: Role, identity: &Identity) -> bool {
        self.members
            .get(&role)
            .is_some_and(|set| set.contains_key(identity))
    }

    /// Display name recorded when `identity` was granted `role`
    pub fn name_of(&self, role: Role, identity: &Identity) -> Option<&str> {
        self.members
            .get(&role)
            .and_then(|set| set.get(identity))
            .map(String::as_str)
    }

    /// Current members of `role`, in address order
    pub fn members(&self, role: Role) -> Vec<Identity> {
        self.members
            .get(&role)
            .map(|set| set.keys().copied().collect())
            .unwrap_or_default()
    }

    fn insert(&mut self, role: Role, identity: Identity, name: &str) -> SupplyChainEvent {
        self.members
            .entry(role)
            .or_default()
            .insert(identity, name.to_string());
        info!(%identity, %role, name, "Role added");
        SupplyChainEvent::RoleAdded {
            role,
            identity,
            name: name.to_string(),
        }
    }
}
