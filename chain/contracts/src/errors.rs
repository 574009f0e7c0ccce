//! Contract-specific error types
//!
//! Each module has its own error enum; `ContractError` composes them for
//! the facade and `FailureKind` classifies any failure into the small set
//! of kinds callers act on.

use thiserror::Error;
use types::asset::AssetKind;
use types::ids::Identity;
use types::numeric::Amount;
use types::role::Role;

/// Coarse classification of a failed call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Caller lacks the role or is not the recorded counterparty
    Unauthorized,
    /// An entity touched by the call is not in the required state
    InvalidState,
    /// Attached payment differs from the required amount
    PaymentMismatch,
    /// Referenced entity does not exist
    NotFound,
    /// Caller-supplied id (or role membership) already exists
    DuplicateId,
    /// An argument is unusable (e.g. the empty identity)
    InvalidArgument,
    /// Settlement or synchronization failure outside the ledger rules
    Internal,
}

/// Role registry errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RoleError {
    #[error("Unauthorized: {caller} does not hold the {role} role")]
    Unauthorized { caller: Identity, role: Role },

    #[error("{identity} already holds the {role} role")]
    AlreadyHeld { role: Role, identity: Identity },

    #[error("{identity} does not hold the {role} role")]
    NotHeld { role: Role, identity: Identity },

    #[error("Cannot grant the {role} role to the empty identity")]
    EmptyIdentity { role: Role },
}

/// Escrow errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EscrowError {
    #[error("Reentrancy detected")]
    Reentrancy,

    #[error("Arithmetic overflow in balance calculation")]
    Overflow,

    #[error("Credits of {credited} exceed the attached {attached}")]
    InsufficientFunds { attached: Amount, credited: Amount },

    #[error("Amount must not be negative: {0}")]
    InvalidAmount(Amount),

    #[error("Transfer of {amount} to {recipient} failed: {reason}")]
    TransferFailed {
        recipient: Identity,
        amount: Amount,
        reason: String,
    },
}

/// Asset ledger errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error("Unauthorized: {caller} does not hold the {role} role")]
    MissingRole { caller: Identity, role: Role },

    #[error("Unauthorized: {caller} is not the recorded {party} of {asset} {id}")]
    NotCounterparty {
        caller: Identity,
        party: &'static str,
        asset: AssetKind,
        id: u64,
    },

    #[error("{asset} {id} is {actual}, expected {expected}")]
    InvalidState {
        asset: AssetKind,
        id: u64,
        expected: String,
        actual: String,
    },

    #[error("{asset} {id} is linked to {linked}, not {requested}")]
    LinkMismatch {
        asset: AssetKind,
        id: u64,
        linked: u64,
        requested: u64,
    },

    #[error("Payment mismatch: required {required}, attached {attached}")]
    PaymentMismatch { required: Amount, attached: Amount },

    #[error("{asset} not found: {id}")]
    NotFound { asset: AssetKind, id: u64 },

    #[error("{asset} id already in use: {id}")]
    DuplicateId { asset: AssetKind, id: u64 },

    #[error("The {field} of a new {asset} cannot be the empty identity")]
    EmptyCounterparty {
        asset: AssetKind,
        field: &'static str,
    },

    #[error("Escrow error: {0}")]
    Escrow(#[from] EscrowError),
}

/// Errors surfaced by the `SupplyChain` facade
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ContractError {
    #[error("Role error: {0}")]
    Role(#[from] RoleError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Escrow error: {0}")]
    Escrow(#[from] EscrowError),

    #[error("Unauthorized: {caller} is not the contract owner")]
    NotOwner { caller: Identity },

    #[error("Ownership cannot be transferred to the empty identity")]
    EmptyOwner,

    #[error("Contract state lock poisoned")]
    Poisoned,
}

impl EscrowError {
    pub fn kind(&self) -> FailureKind {
        match self {
            EscrowError::InvalidAmount(_) => FailureKind::InvalidArgument,
            _ => FailureKind::Internal,
        }
    }
}

impl RoleError {
    pub fn kind(&self) -> FailureKind {
        match self {
            RoleError::Unauthorized { .. } => FailureKind::Unauthorized,
            RoleError::AlreadyHeld { .. } => FailureKind::DuplicateId,
            RoleError::NotHeld { .. } => FailureKind::NotFound,
            RoleError::EmptyIdentity { .. } => FailureKind::InvalidArgument,
        }
    }
}

impl LedgerError {
    pub fn kind(&self) -> FailureKind {
        match self {
            LedgerError::MissingRole { .. } | LedgerError::NotCounterparty { .. } => {
                FailureKind::Unauthorized
            }
            LedgerError::InvalidState { .. } | LedgerError::LinkMismatch { .. } => {
                FailureKind::InvalidState
            }
            LedgerError::PaymentMismatch { .. } => FailureKind::PaymentMismatch,
            LedgerError::NotFound { .. } => FailureKind::NotFound,
            LedgerError::DuplicateId { .. } => FailureKind::DuplicateId,
            LedgerError::EmptyCounterparty { .. } => FailureKind::InvalidArgument,
            LedgerError::Escrow(e) => e.kind(),
        }
    }
}

impl ContractError {
    /// Classify this failure
    pub fn kind(&self) -> FailureKind {
        match self {
            ContractError::Role(e) => e.kind(),
            ContractError::Ledger(e) => e.kind(),
            ContractError::Escrow(e) => e.kind(),
            ContractError::NotOwner { .. } => FailureKind::Unauthorized,
            ContractError::EmptyOwner => FailureKind::InvalidArgument,
            ContractError::Poisoned => FailureKind::Internal,
        }
    }
}
