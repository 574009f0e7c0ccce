//! Escrow: pending balances and pull withdrawals
//!
//! Payments attached to ledger calls are split between the parties they
//! pay (credited to their pending balance) and the contract itself
//! (retained). A party collects its pending balance with `withdraw`, which
//! zeroes the balance before handing the amount to the payment rail.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{info, warn};
use types::ids::Identity;
use types::numeric::{is_valid_amount, Amount};

use crate::errors::EscrowError;
use crate::rail::PaymentRail;
use crate::security::ReentrancyGuard;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EscrowAccount {
    /// Pending withdrawals per identity; zero balances are not stored
    pending: BTreeMap<Identity, Amount>,
    /// Attached funds not credited to any party
    retained: Amount,
    #[serde(skip)]
    guard: ReentrancyGuard,
}

impl PartialEq for EscrowAccount {
    fn eq(&self, other: &Self) -> bool {
        self.pending == other.pending && self.retained == other.retained
    }
}

impl EscrowAccount {
    pub fn new() -> Self {
        Self::default()
    }

    /// Book an attached payment.
    ///
    /// Each `(payee, amount)` credit is added to the payee's pending balance
    /// and the remainder of `attached` is retained by the contract. All new
    /// balances are computed before any is written, so a failure leaves the
    /// escrow untouched.
    pub fn settle(
        &mut self,
        attached: Amount,
        credits: &[(Identity, Amount)],
    ) -> Result<(), EscrowError> {
        if !is_valid_amount(attached) {
            return Err(EscrowError::InvalidAmount(attached));
        }

        let mut credited = Decimal::ZERO;
        let mut updated: BTreeMap<Identity, Amount> = BTreeMap::new();
        for (payee, amount) in credits {
            if !is_valid_amount(*amount) {
                return Err(EscrowError::InvalidAmount(*amount));
            }
            credited = credited.checked_add(*amount).ok_or(EscrowError::Overflow)?;
            let current = match updated.get(payee) {
                Some(balance) => *balance,
                None => self.pending_of(payee),
            };
            let next = current.checked_add(*amount).ok_or(EscrowError::Overflow)?;
            updated.insert(*payee, next);
        }

        if credited > attached {
            return Err(EscrowError::InsufficientFunds { attached, credited });
        }
        let retained = self
            .retained
            .checked_add(attached - credited)
            .ok_or(EscrowError::Overflow)?;

        for (payee, balance) in updated {
            if !balance.is_zero() {
                self.pending.insert(payee, balance);
            }
        }
        self.retained = retained;
        Ok(())
    }

    /// Pay the caller's full pending balance out through `rail`.
    ///
    /// Returns the amount paid. A zero balance is a no-op returning zero.
    /// The balance is cleared before the transfer; if the rail rejects it,
    /// the balance is restored and the error returned.
    pub fn withdraw<R: PaymentRail>(
        &mut self,
        caller: &Identity,
        rail: &mut R,
    ) -> Result<Amount, EscrowError> {
        if !self.guard.acquire() {
            return Err(EscrowError::Reentrancy);
        }

        let Some(amount) = self.pending.remove(caller) else {
            self.guard.release();
            return Ok(Decimal::ZERO);
        };

        let result = rail.transfer(*caller, amount);
        let outcome = match result {
            Ok(()) => {
                info!(identity = %caller, %amount, "Escrow withdrawn");
                Ok(amount)
            }
            Err(e) => {
                warn!(identity = %caller, %amount, error = %e, "Withdrawal transfer failed");
                self.pending.insert(*caller, amount);
                Err(EscrowError::TransferFailed {
                    recipient: *caller,
                    amount,
                    reason: e.to_string(),
                })
            }
        };
        self.guard.release();
        outcome
    }

    /// Pending balance of `identity`, zero when none
    pub fn pending_of(&self, identity: &Identity) -> Amount {
        self.pending.get(identity).copied().unwrap_or(Decimal::ZERO)
    }

    /// Funds held by the contract on nobody's behalf
    pub fn retained(&self) -> Amount {
        self.retained
    }

    /// Sum of all pending balances
    pub fn total_pending(&self) -> Amount {
        self.pending.values().copied().sum()
    }

    #[cfg(test)]
    pub(crate) fn guard_mut(&mut self) -> &mut ReentrancyGuard {
        &mut self.guard
    }
}
