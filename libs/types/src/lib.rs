//! Types library for the aerospace supply chain ledger
//!
//! Core type definitions shared by the contract layer and the gateway,
//! keeping identifiers, roles and lifecycle states in one frozen place.
//!
//! # Modules
//! - `ids`: Identifiers (Identity, Serial, Upc)
//! - `numeric`: Monetary amounts and installment splitting
//! - `role`: Supply chain roles
//! - `asset`: Asset kinds and the per-entity lifecycle states
//! - `errors`: Parsing errors for the types above

pub mod asset;
pub mod errors;
pub mod ids;
pub mod numeric;
pub mod role;

// Library version constant
pub const LIB_VERSION: &str = "1.0.0";

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::asset::*;
    pub use crate::errors::*;
    pub use crate::ids::*;
    pub use crate::numeric::*;
    pub use crate::role::*;
}
