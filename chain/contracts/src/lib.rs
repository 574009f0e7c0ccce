//! Contract Logic for the Aerospace Supply Chain
//!
//! This crate implements the contract layer that tracks aircraft, equipment
//! and components through their multi-party lifecycle, gates each transition
//! on the caller's role and recorded ownership, and escrows payments until
//! the payee withdraws them.
//!
//! # Modules
//! - `config`: Protocol constants (prices, transport fee, bootstrap name)
//! - `errors`: Contract-specific error types and failure classification
//! - `events`: Contract events and the append-only event log
//! - `security`: Reentrancy guard and contract ownership
//! - `roles`: Role registry (grant, renounce, membership queries)
//! - `escrow`: Pending balances, retained funds and pull withdrawals
//! - `rail`: External value transfer boundary
//! - `ledger`: Aircraft, equipment and component state machines
//! - `chain`: The `SupplyChain` facade composing all of the above
//! - `shared`: Serialized, thread-safe access to a `SupplyChain`
//! - `snapshot`: Checksummed state snapshots
//!
//! # Version
//! v0.1.0

pub mod chain;
pub mod config;
pub mod errors;
pub mod escrow;
pub mod events;
pub mod ledger;
pub mod rail;
pub mod roles;
pub mod security;
pub mod shared;
pub mod snapshot;

pub use chain::SupplyChain;
pub use config::LedgerConfig;
pub use errors::{ContractError, FailureKind};
pub use ledger::Call;
pub use shared::SharedSupplyChain;

/// Contract ABI version, frozen after release
pub const CONTRACT_ABI_VERSION: &str = "1.0.0";
