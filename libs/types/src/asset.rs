//! Asset kinds and lifecycle states
//!
//! Aircraft, equipment and components each move through their own state
//! machine. The three enums are distinct, but every variant maps onto the
//! shared external code table for wire compatibility:
//!
//! | Code | Name           |
//! |------|----------------|
//! | 1    | Ordered        |
//! | 2    | Assembled      |
//! | 3    | Packed         |
//! | 4    | InTransit      |
//! | 5    | Received       |
//! | 6    | Integrated     |
//! | 7    | StructureReady |

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::TypeError;

/// The three kinds of tracked asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetKind {
    Aircraft,
    Equipment,
    Component,
}

impl AssetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetKind::Aircraft => "Aircraft",
            AssetKind::Equipment => "Equipment",
            AssetKind::Component => "Component",
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Common behavior of the per-asset state enums
pub trait LifecycleState: Copy + Eq + fmt::Debug {
    /// Which asset this state machine belongs to
    const ASSET: AssetKind;

    /// External numeric code
    fn code(&self) -> u8;

    /// Position in the forward order, starting at 0
    fn stage(&self) -> u8;

    /// No further transitions possible
    fn is_terminal(&self) -> bool;

    /// A transition is legal only to the immediate successor
    fn can_advance_to(&self, next: Self) -> bool {
        next.stage() == self.stage() + 1
    }
}

/// Aircraft lifecycle: Ordered → StructureReady → Assembled → Received
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AircraftState {
    /// Code 1: ordered by a customer
    Ordered,
    /// Code 7: structure prepared by the manufacturer
    StructureReady,
    /// Code 2: equipment integrated into the structure
    Assembled,
    /// Code 5: delivered to the customer (terminal)
    Received,
}

impl AircraftState {
    pub fn from_code(code: u8) -> Result<Self, TypeError> {
        match code {
            1 => Ok(Self::Ordered),
            7 => Ok(Self::StructureReady),
            2 => Ok(Self::Assembled),
            5 => Ok(Self::Received),
            _ => Err(TypeError::UnknownStateCode {
                asset: AssetKind::Aircraft.to_string(),
                code,
            }),
        }
    }
}

impl LifecycleState for AircraftState {
    const ASSET: AssetKind = AssetKind::Aircraft;

    fn code(&self) -> u8 {
        match self {
            Self::Ordered => 1,
            Self::StructureReady => 7,
            Self::Assembled => 2,
            Self::Received => 5,
        }
    }

    fn stage(&self) -> u8 {
        match self {
            Self::Ordered => 0,
            Self::StructureReady => 1,
            Self::Assembled => 2,
            Self::Received => 3,
        }
    }

    fn is_terminal(&self) -> bool {
        matches!(self, Self::Received)
    }
}

/// Equipment lifecycle:
/// Ordered → Assembled → Packed → InTransit → Received → Integrated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EquipmentState {
    /// Code 1: ordered by a manufacturer
    Ordered,
    /// Code 2: assembled by the supplier from a component
    Assembled,
    /// Code 3: packed for a transporter
    Packed,
    /// Code 4: picked up by the transporter
    InTransit,
    /// Code 5: delivered to the manufacturer
    Received,
    /// Code 6: built into the aircraft (terminal)
    Integrated,
}

impl EquipmentState {
    pub fn from_code(code: u8) -> Result<Self, TypeError> {
        match code {
            1 => Ok(Self::Ordered),
            2 => Ok(Self::Assembled),
            3 => Ok(Self::Packed),
            4 => Ok(Self::InTransit),
            5 => Ok(Self::Received),
            6 => Ok(Self::Integrated),
            _ => Err(TypeError::UnknownStateCode {
                asset: AssetKind::Equipment.to_string(),
                code,
            }),
        }
    }
}

impl LifecycleState for EquipmentState {
    const ASSET: AssetKind = AssetKind::Equipment;

    fn code(&self) -> u8 {
        match self {
            Self::Ordered => 1,
            Self::Assembled => 2,
            Self::Packed => 3,
            Self::InTransit => 4,
            Self::Received => 5,
            Self::Integrated => 6,
        }
    }

    fn stage(&self) -> u8 {
        self.code() - 1
    }

    fn is_terminal(&self) -> bool {
        matches!(self, Self::Integrated)
    }
}

/// Component lifecycle: Received → Integrated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentState {
    /// Code 5: taken in by the supplier (initial)
    Received,
    /// Code 6: built into equipment (terminal)
    Integrated,
}

impl ComponentState {
    pub fn from_code(code: u8) -> Result<Self, TypeError> {
        match code {
            5 => Ok(Self::Received),
            6 => Ok(Self::Integrated),
            _ => Err(TypeError::UnknownStateCode {
                asset: AssetKind::Component.to_string(),
                code,
            }),
        }
    }
}

impl LifecycleState for ComponentState {
    const ASSET: AssetKind = AssetKind::Component;

    fn code(&self) -> u8 {
        match self {
            Self::Received => 5,
            Self::Integrated => 6,
        }
    }

    fn stage(&self) -> u8 {
        match self {
            Self::Received => 0,
            Self::Integrated => 1,
        }
    }

    fn is_terminal(&self) -> bool {
        matches!(self, Self::Integrated)
    }
}
