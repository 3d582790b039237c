//! Command pipeline
//!
//! One append-only log shared by both submission sources (operator and
//! autonomous policy). Commands are never deleted or replaced: failed
//! attempts stay in the log and a retry is a fresh submission. The
//! pipeline records who attempted what; actuator-level arbitration
//! between the two sources lives at the transport boundary.

use crate::error::ControllerError;
use crate::types::{
    Command, CommandId, CommandOutcome, CommandSource, CommandStatus, Mode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Read-model filter for [`CommandLog::query`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandFilter {
    /// Restrict to one submission source.
    pub source: Option<CommandSource>,
    /// Restrict to one lifecycle state.
    pub status: Option<CommandStatus>,
}

/// Per-source submission totals, part of the read model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceCounts {
    /// Commands submitted by the human operator
    pub operator: usize,
    /// Commands submitted by the autonomous policy
    pub autonomous: usize,
}

/// The append-ordered command log and its lifecycle operations.
#[derive(Debug, Default)]
pub struct CommandLog {
    entries: Vec<Command>,
}

impl CommandLog {
    /// Empty log.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Submit a command. Refused outright while degraded: no entry of
    /// any status is created and the caller gets the refusal back.
    pub fn submit(
        &mut self,
        kind: &str,
        source: CommandSource,
        mode: Mode,
        submitted_at: DateTime<Utc>,
    ) -> Result<Command, ControllerError> {
        if mode == Mode::Degraded {
            warn!(kind, ?source, "command refused while degraded");
            return Err(ControllerError::CommandRefused { mode });
        }

        let command = Command {
            id: CommandId::new(),
            kind: kind.to_string(),
            submitted_at,
            status: CommandStatus::Pending,
            source,
        };
        self.entries.push(command.clone());
        Ok(command)
    }

    /// Move a pending command to its terminal status.
    ///
    /// Idempotent: resolving an already-terminal command is a no-op
    /// that reports the status set by the first resolution, guarding
    /// against duplicate completion signals from the transport.
    pub fn resolve(
        &mut self,
        id: CommandId,
        outcome: CommandOutcome,
    ) -> Result<CommandStatus, ControllerError> {
        let entry = self
            .entries
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(ControllerError::UnknownCommand(id))?;

        if entry.status.is_terminal() {
            return Ok(entry.status);
        }
        entry.status = outcome.into();
        Ok(entry.status)
    }

    /// Read-only view in submission order.
    #[must_use]
    pub fn query(&self, filter: CommandFilter) -> Vec<Command> {
        self.entries
            .iter()
            .filter(|c| filter.source.map_or(true, |s| c.source == s))
            .filter(|c| filter.status.map_or(true, |s| c.status == s))
            .cloned()
            .collect()
    }

    /// Number of entries in the log.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Submission totals per source.
    #[must_use]
    pub fn counts_by_source(&self) -> SourceCounts {
        let mut counts = SourceCounts::default();
        for entry in &self.entries {
            match entry.source {
                CommandSource::Operator => counts.operator += 1,
                CommandSource::Autonomous => counts.autonomous += 1,
            }
        }
        counts
    }

    /// Entries newest-first, the order the console displays.
    #[must_use]
    pub fn display_order(&self) -> Vec<Command> {
        self.entries.iter().rev().cloned().collect()
    }
}
