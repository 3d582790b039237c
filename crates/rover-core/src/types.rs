//! Core types for the mode controller
//!
//! Defines the fundamental types shared across components:
//! - Operational mode
//! - Commands, their sources and lifecycle states
//! - Evidence records captured while degraded
//! - Sync session bookkeeping

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Operational mode of the console.
///
/// Exactly one value at any instant; written only by the mode state
/// machine, observed read-only everywhere else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Link is healthy; the operator drives the rover.
    Connected,
    /// Heartbeat staleness exceeded the threshold; the rover runs
    /// autonomously and the console refuses outbound commands.
    Degraded,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Connected => write!(f, "connected"),
            Mode::Degraded => write!(f, "degraded"),
        }
    }
}

/// Unique command identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CommandId(pub Uuid);

impl CommandId {
    /// Generate new command ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CommandId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CommandId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who asked for a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandSource {
    /// Human operator at the console.
    Operator,
    /// Autonomous policy running alongside the operator.
    Autonomous,
}

/// Lifecycle state of a command.
///
/// Mutated at most once after creation: `Pending` moves to exactly one
/// terminal state. A transport that confirms synchronously may create a
/// command directly in a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandStatus {
    /// Dispatched, waiting on the transport.
    Pending,
    /// Transport confirmed execution.
    Succeeded,
    /// Transport reported failure; resubmission is a new command.
    Failed,
}

impl CommandStatus {
    /// Whether this status can no longer change.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, CommandStatus::Succeeded | CommandStatus::Failed)
    }
}

/// Outcome reported by the transport for a dispatched command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Success,
    Failure,
}

impl From<CommandOutcome> for CommandStatus {
    fn from(outcome: CommandOutcome) -> Self {
        match outcome {
            CommandOutcome::Success => CommandStatus::Succeeded,
            CommandOutcome::Failure => CommandStatus::Failed,
        }
    }
}

/// A discrete instruction issued by the operator or the autonomous
/// policy, tracked through its full lifecycle in the command log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Command {
    /// Unique identifier
    pub id: CommandId,
    /// Verb sent to the rover (e.g. "FORWARD", "STOP")
    pub kind: String,
    /// Wall-clock submission time, for display
    pub submitted_at: DateTime<Utc>,
    /// Lifecycle state
    pub status: CommandStatus,
    /// Which side issued it
    pub source: CommandSource,
}

/// A unit of evidence captured on the rover while the link was down.
///
/// Immutable once created; the ledger only appends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceRecord {
    /// Filename on the rover's local storage (e.g. "IMG_0042.jpg")
    pub filename: String,
    /// Wall-clock capture time
    pub captured_at: DateTime<Utc>,
}

/// Phase of an evidence sync session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncPhase {
    /// Session created, no progress yet.
    Pending,
    /// Progress between 1 and 99 percent.
    InProgress,
    /// All items acknowledged.
    Complete,
}

/// Bounded reconciliation of the evidence backlog after reconnection.
///
/// Retained after completion so the banner can keep showing the final
/// state; banner visibility itself is an independent timer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSession {
    /// Number of evidence items being reconciled
    pub total_items: usize,
    /// Items acknowledged so far
    pub acknowledged_items: usize,
    /// Overall progress, 0..=100
    pub progress_percent: u8,
}

impl SyncSession {
    /// Phase derived from progress.
    #[must_use]
    pub fn phase(&self) -> SyncPhase {
        match self.progress_percent {
            0 => SyncPhase::Pending,
            100 => SyncPhase::Complete,
            _ => SyncPhase::InProgress,
        }
    }

    /// Whether every item has been acknowledged.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.progress_percent >= 100
    }
}
