//! Error types for parsing shared ledger types

use thiserror::Error;

/// Failures converting external representations into typed values
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TypeError {
    #[error("Invalid identity address: {0}")]
    InvalidIdentity(String),

    #[error("Unknown role: {0}")]
    UnknownRole(String),

    #[error("Unknown {asset} state code: {code}")]
    UnknownStateCode { asset: String, code: u8 },
}
