//! Contract events and the append-only event log
//!
//! Events are immutable records of committed transitions, consumed by
//! external observers. Each entry carries a sequence number starting at 1.

use serde::{Deserialize, Serialize};
use types::asset::AssetKind;
use types::ids::{Identity, Serial, Upc};
use types::role::Role;

/// Notification emitted by a committed call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum SupplyChainEvent {
    /// An aircraft or equipment order was placed
    Ordered { asset: AssetKind, id: u64 },
    /// An asset reached its received milestone
    Received { asset: AssetKind, id: u64 },
    /// An asset was assembled from its child
    Assembled { asset: AssetKind, id: u64 },
    /// An asset was built into its parent
    Integrated { asset: AssetKind, id: u64 },
    /// Equipment packed for transport
    Packed { id: Upc },
    /// Equipment picked up by the transporter
    InTransit { id: Upc },
    /// Aircraft structure prepared
    StructureReady { serial: Serial },
    /// Role granted
    RoleAdded {
        role: Role,
        identity: Identity,
        name: String,
    },
    /// Role renounced
    RoleRemoved { role: Role, identity: Identity },
}

impl SupplyChainEvent {
    /// Short label for logging
    pub fn label(&self) -> &'static str {
        match self {
            SupplyChainEvent::Ordered { .. } => "Ordered",
            SupplyChainEvent::Received { .. } => "Received",
            SupplyChainEvent::Assembled { .. } => "Assembled",
            SupplyChainEvent::Integrated { .. } => "Integrated",
            SupplyChainEvent::Packed { .. } => "Packed",
            SupplyChainEvent::InTransit { .. } => "InTransit",
            SupplyChainEvent::StructureReady { .. } => "StructureReady",
            SupplyChainEvent::RoleAdded { .. } => "RoleAdded",
            SupplyChainEvent::RoleRemoved { .. } => "RoleRemoved",
        }
    }
}

/// A logged event with its position in the log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub sequence: u64,
    pub event: SupplyChainEvent,
}

/// Append-only event log
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventLog {
    records: Vec<EventRecord>,
    /// Sequence of the last appended record, 0 when nothing was ever logged
    last_sequence: u64,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append events in order, returning their sequence numbers
    pub fn append(&mut self, events: impl IntoIterator<Item = SupplyChainEvent>) -> Vec<u64> {
        events
            .into_iter()
            .map(|event| {
                self.last_sequence += 1;
                self.records.push(EventRecord {
                    sequence: self.last_sequence,
                    event,
                });
                self.last_sequence
            })
            .collect()
    }

    /// All retained records
    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    /// Records with a sequence strictly greater than `sequence`
    pub fn since(&self, sequence: u64) -> &[EventRecord] {
        let start = self.records.partition_point(|r| r.sequence <= sequence);
        &self.records[start..]
    }

    /// Consume and clear retained records; sequence numbering continues
    pub fn drain(&mut self) -> Vec<EventRecord> {
        std::mem::take(&mut self.records)
    }

    pub fn last_sequence(&self) -> u64 {
        self.last_sequence
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
