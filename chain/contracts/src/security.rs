//! Shared security primitives for contract modules
//!
//! Reentrancy protection for the withdrawal path and single-owner
//! administration of the contract itself.

use serde::{Deserialize, Serialize};
use types::ids::Identity;

/// Reentrancy guard preventing nested calls into protected functions.
///
/// The escrow acquires the guard before zeroing a balance and releases it
/// once the external transfer has settled. Any nested attempt fails.
#[derive(Debug, Clone, Default)]
pub struct ReentrancyGuard {
    locked: bool,
}

impl ReentrancyGuard {
    /// Create a new unlocked guard.
    pub fn new() -> Self {
        Self { locked: false }
    }

    /// Acquire the guard. Returns `false` if already locked.
    pub fn acquire(&mut self) -> bool {
        if self.locked {
            return false;
        }
        self.locked = true;
        true
    }

    pub fn release(&mut self) {
        self.locked = false;
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }
}

/// Contract ownership.
///
/// The deploying identity owns the contract. Ownership is independent of the
/// supply chain roles: renouncing every role leaves the owner in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ownership {
    owner: Identity,
}

impl Ownership {
    pub fn new(owner: Identity) -> Self {
        Self { owner }
    }

    pub fn owner(&self) -> Identity {
        self.owner
    }

    pub fn is_owner(&self, caller: &Identity) -> bool {
        self.owner == *caller
    }

    /// Hand ownership to `new_owner`. Only the current owner may do this,
    /// and never to the empty identity.
    pub fn transfer(&mut self, caller: &Identity, new_owner: Identity) -> bool {
        if !self.is_owner(caller) || new_owner.is_empty() {
            return false;
        }
        self.owner = new_owner;
        true
    }
}
