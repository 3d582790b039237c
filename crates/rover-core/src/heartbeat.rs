//! Heartbeat monitor
//!
//! Keeps "time since last confirmed contact". A positive sample stamps
//! the contact time; a negative sample writes nothing. Staleness is
//! recomputed by the reader from elapsed time, never cached.

use tokio::time::Instant;

/// Last-contact bookkeeping for the connectivity signal.
#[derive(Debug, Clone)]
pub struct HeartbeatMonitor {
    last_contact: Option<Instant>,
}

impl HeartbeatMonitor {
    /// Monitor that has never seen a positive sample.
    #[must_use]
    pub fn new() -> Self {
        Self { last_contact: None }
    }

    /// Monitor primed as if contact was confirmed at `now`. Used at
    /// startup so an initially-silent link is measured from boot, not
    /// treated as infinitely stale.
    #[must_use]
    pub fn primed(now: Instant) -> Self {
        Self {
            last_contact: Some(now),
        }
    }

    /// Feed one connectivity sample.
    pub fn observe(&mut self, signal: bool, now: Instant) {
        if signal {
            self.last_contact = Some(now);
        }
    }

    /// Time elapsed since the last positive sample, or `None` if there
    /// has never been one.
    #[must_use]
    pub fn staleness(&self, now: Instant) -> Option<std::time::Duration> {
        self.last_contact.map(|t| now.duration_since(t))
    }

    /// Instant of the last confirmed contact.
    #[must_use]
    pub fn last_contact(&self) -> Option<Instant> {
        self.last_contact
    }

    /// Forget all contact history.
    pub fn reset(&mut self) {
        self.last_contact = None;
    }
}

impl Default for HeartbeatMonitor {
    fn default() -> Self {
        Self::new()
    }
}
