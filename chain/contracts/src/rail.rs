//! External value transfer
//!
//! The settlement substrate moves value out of the contract. The ledger only
//! needs one primitive from it, `transfer`, abstracted here so the escrow
//! can be driven by an in-memory rail in tests and local deployments.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use thiserror::Error;
use types::ids::Identity;
use types::numeric::Amount;

/// Transfer failure reported by a rail
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RailError {
    #[error("recipient {0} rejected the transfer")]
    Rejected(Identity),

    #[error("recipient balance overflow")]
    Overflow,
}

/// Outbound value transfer supplied by the settlement substrate
pub trait PaymentRail {
    /// Move `amount` from the contract to `recipient`.
    fn transfer(&mut self, recipient: Identity, amount: Amount) -> Result<(), RailError>;
}

/// In-memory rail tracking the external balance of every recipient.
///
/// Recipients can be marked as rejecting to exercise failed transfers.
#[derive(Debug, Clone, Default)]
pub struct LocalRail {
    balances: BTreeMap<Identity, Amount>,
    rejecting: BTreeSet<Identity>,
}

impl LocalRail {
    pub fn new() -> Self {
        Self::default()
    }

    /// External balance of `identity`
    pub fn balance_of(&self, identity: &Identity) -> Amount {
        self.balances.get(identity).copied().unwrap_or(Decimal::ZERO)
    }

    /// Make transfers to `identity` fail until `accept` is called
    pub fn reject(&mut self, identity: Identity) {
        self.rejecting.insert(identity);
    }

    pub fn accept(&mut self, identity: &Identity) {
        self.rejecting.remove(identity);
    }
}

impl PaymentRail for LocalRail {
    fn transfer(&mut self, recipient: Identity, amount: Amount) -> Result<(), RailError> {
        if self.rejecting.contains(&recipient) {
            return Err(RailError::Rejected(recipient));
        }
        let balance = self.balances.entry(recipient).or_insert(Decimal::ZERO);
        *balance = balance.checked_add(amount).ok_or(RailError::Overflow)?;
        Ok(())
    }
}
