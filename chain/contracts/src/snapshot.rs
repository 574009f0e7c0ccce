//! Snapshots: full contract state with an integrity checksum
//!
//! All stores are `BTreeMap`s, so the JSON encoding of a state is
//! deterministic and the SHA-256 checksum over it is stable across
//! save/load cycles.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

use crate::config::LedgerConfig;
use crate::escrow::EscrowAccount;
use crate::events::EventLog;
use crate::ledger::AssetLedger;
use crate::roles::RoleRegistry;
use crate::security::Ownership;

// ── Errors ──────────────────────────────────────────────────────────

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Integrity check failed: expected {expected}, got {actual}")]
    IntegrityFailure { expected: String, actual: String },

    #[error("Unsupported snapshot version: {0}")]
    UnsupportedVersion(u32),
}

// ── Chain State ─────────────────────────────────────────────────────

/// Everything a contract needs to resume, except its payment rail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainState {
    pub config: LedgerConfig,
    pub ownership: Ownership,
    pub roles: RoleRegistry,
    pub ledger: AssetLedger,
    pub escrow: EscrowAccount,
    pub events: EventLog,
}

impl ChainState {
    /// SHA-256 over the canonical JSON encoding, lowercase hex.
    pub fn compute_hash(&self) -> Result<String, SnapshotError> {
        let bytes =
            serde_json::to_vec(self).map_err(|e| SnapshotError::Serialization(e.to_string()))?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        Ok(format!("{:x}", hasher.finalize()))
    }
}

// ── Snapshot ────────────────────────────────────────────────────────

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Snapshot format version
    pub version: u32,
    /// Sequence of the last event logged before capture
    pub sequence: u64,
    /// SHA-256 of the serialized state
    pub checksum: String,
    pub state: ChainState,
}

impl Snapshot {
    pub fn new(state: ChainState) -> Result<Self, SnapshotError> {
        let checksum = state.compute_hash()?;
        Ok(Self {
            version: SNAPSHOT_VERSION,
            sequence: state.events.last_sequence(),
            checksum,
            state,
        })
    }

    /// Check version and checksum.
    pub fn verify(&self) -> Result<(), SnapshotError> {
        if self.version > SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion(self.version));
        }
        let actual = self.state.compute_hash()?;
        if actual != self.checksum {
            return Err(SnapshotError::IntegrityFailure {
                expected: self.checksum.clone(),
                actual,
            });
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        serde_json::to_string_pretty(self).map_err(|e| SnapshotError::Serialization(e.to_string()))
    }

    /// Parse and verify a snapshot.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let snapshot: Snapshot =
            serde_json::from_str(json).map_err(|e| SnapshotError::Serialization(e.to_string()))?;
        snapshot.verify()?;
        Ok(snapshot)
    }

    /// Write atomically: temp file, fsync, rename.
    pub fn save(&self, path: &Path) -> Result<(), SnapshotError> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let json = self.to_json()?;
        let tmp_path = path.with_extension("tmp");
        {
            let mut file = File::create(&tmp_path)?;
            file.write_all(json.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp_path, path)?;
        debug!(path = %path.display(), sequence = self.sequence, "Snapshot saved");
        Ok(())
    }

    /// Read and verify a snapshot file.
    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let json = fs::read_to_string(path)?;
        let snapshot = Self::from_json(&json)?;
        debug!(path = %path.display(), sequence = snapshot.sequence, "Snapshot loaded");
        Ok(snapshot)
    }
}
