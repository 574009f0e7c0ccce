//! Protocol constants for a deployment
//!
//! Prices are fixed for the lifetime of a contract. They are expressed in
//! the settlement substrate's smallest unit.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use types::numeric::{half, Amount};

/// Aircraft price: 1 ether in wei
pub const DEFAULT_AIRCRAFT_PRICE: u64 = 1_000_000_000_000_000_000;
/// Equipment price: 1 kwei
pub const DEFAULT_EQUIPMENT_PRICE: u64 = 1_000;
/// Transport fee, split evenly between packing and receipt
pub const DEFAULT_TRANSPORT_FEE: u64 = 100;
/// Display name recorded for the deployer's bootstrap roles
pub const DEFAULT_BOOTSTRAP_NAME: &str = "Contract Owner";

/// Fixed prices and bootstrap settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerConfig {
    pub aircraft_price: Amount,
    pub equipment_price: Amount,
    pub transport_fee: Amount,
    pub bootstrap_name: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            aircraft_price: Decimal::from(DEFAULT_AIRCRAFT_PRICE),
            equipment_price: Decimal::from(DEFAULT_EQUIPMENT_PRICE),
            transport_fee: Decimal::from(DEFAULT_TRANSPORT_FEE),
            bootstrap_name: DEFAULT_BOOTSTRAP_NAME.to_string(),
        }
    }
}

impl LedgerConfig {
    /// Installment paid at order and again at delivery of an aircraft
    pub fn aircraft_installment(&self) -> Amount {
        half(self.aircraft_price)
    }

    /// Installment paid at packing and again at receipt of equipment
    pub fn transport_installment(&self) -> Amount {
        half(self.transport_fee)
    }
}
