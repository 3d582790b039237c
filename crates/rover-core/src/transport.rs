//! Transport boundary traits
//!
//! The controller never talks to the network itself; it consumes these
//! seams. Production wires them to the telemetry endpoint and the
//! command gateway; tests and the simulator supply deterministic
//! fixtures instead of live polling or randomness.

use crate::error::TransportError;
use async_trait::async_trait;

/// Source of the connectivity signal sampled by the heartbeat monitor.
///
/// Implementations may fail; the controller maps any error to "not
/// connected" (the fail-safe direction) and never lets it propagate.
#[async_trait]
pub trait ConnectivityProbe: Send + Sync {
    /// One connectivity sample: is the link to the rover up right now?
    async fn poll(&self) -> Result<bool, TransportError>;
}

/// Downstream path for dispatched commands.
#[async_trait]
pub trait CommandTransport: Send + Sync {
    /// Deliver a command verb to the rover. Resolution of the awaited
    /// outcome is what moves the command out of `Pending`.
    async fn send(&self, kind: &str) -> Result<(), TransportError>;
}

/// Optional authoritative source for the evidence backlog size.
#[async_trait]
pub trait EvidenceEndpoint: Send + Sync {
    /// Filenames the rover reports as captured while offline. On error
    /// the controller falls back to the local ledger length.
    async fn poll_remote_manifest(&self) -> Result<Vec<String>, TransportError>;
}
