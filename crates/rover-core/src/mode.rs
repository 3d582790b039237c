//! Mode state machine
//!
//! Two states, asymmetric rules:
//! - `Connected → Degraded` only after sustained staleness past the
//!   disconnect threshold (pessimistic debounce: one missed sample
//!   must not trigger a full autonomy failover).
//! - `Degraded → Connected` on the very next positive signal
//!   (optimistic recovery: the operator regains control the instant
//!   the link is back).

use crate::types::Mode;
use std::time::Duration;
use tracing::debug;

/// Transition produced by one evaluation tick, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeTransition {
    /// `Connected → Degraded`: staleness exceeded the threshold.
    LinkLost,
    /// `Degraded → Connected`: a positive signal arrived.
    LinkRestored,
}

/// The single writer of [`Mode`].
#[derive(Debug, Clone)]
pub struct ModeMachine {
    mode: Mode,
    threshold: Duration,
}

impl ModeMachine {
    /// New machine in the initial `Connected` state.
    #[must_use]
    pub fn new(threshold: Duration) -> Self {
        Self {
            mode: Mode::Connected,
            threshold,
        }
    }

    /// Current mode.
    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Evaluate one tick: the sampled signal plus the staleness the
    /// heartbeat monitor computed after ingesting that sample.
    ///
    /// `staleness = None` means no contact has ever been confirmed and
    /// no measurement exists yet; the machine holds its state rather
    /// than demote on an unmeasurable link.
    pub fn evaluate(
        &mut self,
        signal: bool,
        staleness: Option<Duration>,
    ) -> Option<ModeTransition> {
        match self.mode {
            Mode::Connected => {
                let stale = staleness.is_some_and(|s| s > self.threshold);
                if !signal && stale {
                    self.mode = Mode::Degraded;
                    debug!(staleness_ms = staleness.map(|s| s.as_millis() as u64),
                           "link lost, entering degraded mode");
                    Some(ModeTransition::LinkLost)
                } else {
                    None
                }
            }
            Mode::Degraded => {
                if signal {
                    self.mode = Mode::Connected;
                    debug!("link restored, entering connected mode");
                    Some(ModeTransition::LinkRestored)
                } else {
                    None
                }
            }
        }
    }
}
