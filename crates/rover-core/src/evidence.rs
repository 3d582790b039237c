//! Evidence ledger
//!
//! Append-only record of what the rover captured while the link was
//! down. Writes are gated on degraded mode; while connected the ledger
//! is frozen and only the recovery synchronizer may clear it, after a
//! fully acknowledged sync.

use crate::error::ControllerError;
use crate::types::{EvidenceRecord, Mode};
use chrono::{DateTime, Utc};
use tracing::warn;

/// Capture-ordered evidence store.
#[derive(Debug, Default)]
pub struct EvidenceLedger {
    records: Vec<EvidenceRecord>,
}

impl EvidenceLedger {
    /// Empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Append a capture. Only legal while degraded; a call while
    /// connected is a caller error, reported and dropped.
    pub fn record(
        &mut self,
        filename: &str,
        mode: Mode,
        captured_at: DateTime<Utc>,
    ) -> Result<EvidenceRecord, ControllerError> {
        if mode != Mode::Degraded {
            warn!(filename, "evidence capture rejected outside degraded mode");
            return Err(ControllerError::EvidenceRejected { mode });
        }

        let record = EvidenceRecord {
            filename: filename.to_string(),
            captured_at,
        };
        self.records.push(record.clone());
        Ok(record)
    }

    /// Snapshot in capture order (FIFO).
    #[must_use]
    pub fn manifest(&self) -> Vec<EvidenceRecord> {
        self.records.clone()
    }

    /// Number of records held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the ledger holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drop all records. Called by the recovery synchronizer once a
    /// sync session reaches full acknowledgement, never mid-session.
    pub fn clear(&mut self) {
        self.records.clear();
    }
}
