//! Error types for the mode controller
//!
//! Nothing in this crate escalates to a panic: every operation either
//! succeeds, is idempotently ignored, or returns one of these typed
//! refusals for the caller to surface.

use crate::types::{CommandId, Mode};

/// Errors surfaced by controller operations.
#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    /// Command submission attempted while the link was down. The
    /// command is refused outright; no log entry is created.
    #[error("command refused: console is in {mode} mode")]
    CommandRefused {
        /// Mode at the time of refusal
        mode: Mode,
    },

    /// Resolution targeted a command id that was never submitted.
    #[error("unknown command: {0}")]
    UnknownCommand(CommandId),

    /// Evidence capture attempted outside degraded mode. Caller error;
    /// the record is dropped, never silently accepted.
    #[error("evidence rejected: console is in {mode} mode")]
    EvidenceRejected {
        /// Mode at the time of rejection
        mode: Mode,
    },
}

/// Errors from the external transport boundary.
///
/// These never cross into `ControllerError`: a probe failure reads as
/// "not connected" and a send failure resolves the command `Failed`.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Connectivity probe could not be completed.
    #[error("connectivity probe failed: {0}")]
    Probe(String),

    /// Command dispatch failed before or after reaching the rover.
    #[error("command dispatch failed: {0}")]
    Send(String),

    /// Remote evidence manifest could not be fetched.
    #[error("manifest fetch failed: {0}")]
    Manifest(String),
}
