//! Identifier types for supply chain parties and assets
//!
//! Parties are addressed by a 20-byte `Identity`. Aircraft are keyed by a
//! contract-assigned `Serial`, equipment and components by a caller-supplied
//! `Upc`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::TypeError;

/// Length of an identity address in bytes
pub const IDENTITY_LEN: usize = 20;

/// Opaque external party address
///
/// Rendered as `0x`-prefixed lowercase hex. The all-zero address is the
/// "empty" identity used in external field tuples for unset parties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identity([u8; IDENTITY_LEN]);

impl Identity {
    /// The empty (zero) address
    pub const EMPTY: Identity = Identity([0u8; IDENTITY_LEN]);

    /// Create from raw address bytes
    pub const fn new(bytes: [u8; IDENTITY_LEN]) -> Self {
        Self(bytes)
    }

    /// Build an address whose last byte is `tag`.
    ///
    /// Handy for fixtures and local deployments.
    pub const fn from_tag(tag: u8) -> Self {
        let mut bytes = [0u8; IDENTITY_LEN];
        bytes[IDENTITY_LEN - 1] = tag;
        Self(bytes)
    }

    /// Get the raw address bytes
    pub fn as_bytes(&self) -> &[u8; IDENTITY_LEN] {
        &self.0
    }

    /// True for the zero address
    pub fn is_empty(&self) -> bool {
        self.0 == [0u8; IDENTITY_LEN]
    }

    /// Render an optional party, mapping `None` to the zero address
    pub fn or_empty(party: Option<Identity>) -> Identity {
        party.unwrap_or(Identity::EMPTY)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Identity {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        let raw = hex::decode(digits).map_err(|_| TypeError::InvalidIdentity(s.to_string()))?;
        let bytes: [u8; IDENTITY_LEN] = raw
            .try_into()
            .map_err(|_| TypeError::InvalidIdentity(s.to_string()))?;
        Ok(Self(bytes))
    }
}

impl TryFrom<String> for Identity {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Identity> for String {
    fn from(id: Identity) -> Self {
        id.to_string()
    }
}

/// Aircraft serial number (MSN), assigned from 1 in creation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Serial(u64);

impl Serial {
    /// The first serial handed out by a fresh ledger
    pub const FIRST: Serial = Serial(1);

    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    /// The serial following this one
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for Serial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Caller-supplied product code for equipment and components
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Upc(u64);

impl Upc {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    /// External code for an optional link, 0 when unset
    pub fn or_zero(upc: Option<Upc>) -> u64 {
        upc.map_or(0, |u| u.0)
    }
}

impl fmt::Display for Upc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
