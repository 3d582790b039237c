//! Recovery synchronizer
//!
//! Bounded reconciliation of the evidence backlog after reconnection.
//! Progress advances in fixed percentage steps, a stand-in for per-file
//! transport acknowledgements that maps 1:1 onto item counts when the
//! transport does confirm per file. The session is retained at 100% for
//! display; the recovery banner hides on its own timer.

use crate::types::{SyncPhase, SyncSession};
use tracing::info;

impl SyncSession {
    /// New session over `total_items` evidence files, at 0%.
    #[must_use]
    pub fn start(total_items: usize) -> Self {
        Self {
            total_items,
            acknowledged_items: 0,
            progress_percent: 0,
        }
    }

    /// Advance one tick by `step` percentage points, clamped at 100.
    /// Returns the phase after the step. Advancing a complete session
    /// is a no-op.
    pub fn advance(&mut self, step: u8) -> SyncPhase {
        if self.is_complete() {
            return SyncPhase::Complete;
        }

        self.progress_percent = self.progress_percent.saturating_add(step).min(100);
        self.acknowledged_items = acknowledged_for(self.total_items, self.progress_percent);

        if self.is_complete() {
            info!(total_items = self.total_items, "evidence sync complete");
        }
        self.phase()
    }

    /// Per-file acknowledgement from the transport, when available.
    /// Item counts stay authoritative; the percentage is derived.
    pub fn acknowledge_item(&mut self) -> SyncPhase {
        if self.acknowledged_items < self.total_items {
            self.acknowledged_items += 1;
            self.progress_percent =
                ((self.acknowledged_items * 100) / self.total_items.max(1)) as u8;
        }
        self.phase()
    }
}

/// Items considered acknowledged at a given percentage, rounded to the
/// nearest whole item.
fn acknowledged_for(total: usize, percent: u8) -> usize {
    (total * usize::from(percent) + 50) / 100
}
