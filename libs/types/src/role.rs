//! Supply chain roles
//!
//! Each role is an independent membership set; an identity may hold any
//! combination of them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::TypeError;

/// A party's function in the supply chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Builds aircraft and orders equipment
    Manufacturer,
    /// Receives components and assembles equipment
    Supplier,
    /// Moves packed equipment to the manufacturer
    Transporter,
    /// Orders and takes delivery of aircraft
    Customer,
}

impl Role {
    /// Every role, in declaration order
    pub const ALL: [Role; 4] = [
        Role::Manufacturer,
        Role::Supplier,
        Role::Transporter,
        Role::Customer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Manufacturer => "manufacturer",
            Role::Supplier => "supplier",
            Role::Transporter => "transporter",
            Role::Customer => "customer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| TypeError::UnknownRole(s.to_string()))
    }
}
