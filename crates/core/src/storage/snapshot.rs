use std::path::Path;

use crate::errors::AdvisorError;
use crate::models::decision::DecisionRecord;

/// Flat JSON snapshot of a finished decision record.
///
/// This is deliberately the whole persistence story: one record in, one
/// pretty-printed JSON document out. Report generators and archives build on
/// these files; the core keeps no state between runs.
pub struct SnapshotStore;

impl SnapshotStore {
    /// Serialize a record to pretty-printed JSON bytes.
    pub fn to_bytes(record: &DecisionRecord) -> Result<Vec<u8>, AdvisorError> {
        serde_json::to_vec_pretty(record)
            .map_err(|e| AdvisorError::Serialization(format!("Failed to serialize record: {e}")))
    }

    /// Deserialize a record from JSON bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<DecisionRecord, AdvisorError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Write a record snapshot to disk.
    pub fn save_to_file(record: &DecisionRecord, path: impl AsRef<Path>) -> Result<(), AdvisorError> {
        let bytes = Self::to_bytes(record)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Read a record snapshot from disk.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<DecisionRecord, AdvisorError> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }
}
