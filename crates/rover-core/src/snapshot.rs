//! Read model for the rendering layer
//!
//! One serializable snapshot per tick, published over a watch channel
//! so a presentation layer re-renders without polling logic of its own.

use crate::command::SourceCounts;
use crate::types::{Command, EvidenceRecord, Mode, SyncSession};
use serde::{Deserialize, Serialize};

/// Everything a panel needs to draw the console, frozen at one tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsoleSnapshot {
    /// Current operational mode.
    pub mode: Mode,
    /// Command log, newest first.
    pub commands: Vec<Command>,
    /// Submission totals per source.
    pub command_counts: SourceCounts,
    /// Evidence manifest in capture order.
    pub evidence: Vec<EvidenceRecord>,
    /// Active or completed sync session, if any.
    pub sync: Option<SyncSession>,
    /// Whether the "connection restored" banner is showing. Decoupled
    /// from sync completion: the banner hides on its own timer.
    pub banner_visible: bool,
    /// Evidence backlog size at the moment of the last recovery, for
    /// the banner's "N files syncing" text.
    pub recovered_backlog: usize,
    /// Operator speed setting, 0..=100.
    pub speed: u8,
}

impl ConsoleSnapshot {
    /// Snapshot of a freshly started controller.
    #[must_use]
    pub fn initial() -> Self {
        Self {
            mode: Mode::Connected,
            commands: Vec::new(),
            command_counts: SourceCounts::default(),
            evidence: Vec::new(),
            sync: None,
            banner_visible: false,
            recovered_backlog: 0,
            speed: 50,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_serializes_to_json() {
        let snapshot = ConsoleSnapshot::initial();
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("\"mode\":\"connected\""));
        assert!(json.contains("\"banner_visible\":false"));
    }
}
