//! Monetary amounts
//!
//! Uses rust_decimal for deterministic arithmetic (no floating-point errors).
//! Amounts are expressed in the settlement substrate's smallest unit.

use rust_decimal::Decimal;

/// A value attached to a call, credited to escrow, or withdrawn
pub type Amount = Decimal;

/// Split an amount into two equal installments.
///
/// Decimal division is exact for the fixed prices the ledger uses, so
/// `half(x) + half(x) == x`.
pub fn half(amount: Amount) -> Amount {
    amount / Decimal::TWO
}

/// Check that an amount can be attached or credited (non-negative)
pub fn is_valid_amount(amount: Amount) -> bool {
    amount >= Decimal::ZERO
}
