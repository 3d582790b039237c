//! Rover Core - Connectivity/Autonomy Mode Controller
//!
//! The decision logic behind the operator console for a teleoperated
//! rescue rover:
//! - Judges link health from a periodic heartbeat signal
//! - Drives a two-state operational mode with asymmetric hysteresis
//! - Arbitrates and tracks commands from the operator and the
//!   autonomous policy through one append-only log
//! - Reconciles the evidence backlog against the rover once the link
//!   returns
//!
//! Rendering, transport and the rover firmware live behind the traits
//! in [`transport`]; the controller only consumes a connectivity signal
//! and produces mode, command and evidence state.
//!
//! # Example
//!
//! ```rust,ignore
//! use rover_core::{ControllerConfig, CommandSource, ModeController};
//! use std::sync::Arc;
//!
//! # async fn example(probe: Arc<dyn rover_core::ConnectivityProbe>,
//! #                  gateway: Arc<dyn rover_core::CommandTransport>) {
//! let controller = ModeController::new(ControllerConfig::default(), probe, gateway, None);
//! controller.start();
//!
//! let command = controller.submit("FORWARD", CommandSource::Operator).unwrap();
//! println!("dispatched {}", command.id);
//!
//! controller.stop();
//! # }
//! ```

// Core modules
pub mod command;
pub mod config;
pub mod controller;
pub mod error;
pub mod evidence;
pub mod heartbeat;
pub mod mode;
pub mod snapshot;
pub mod sync;
pub mod transport;
pub mod types;

// Re-exports for convenience
pub use command::{CommandFilter, CommandLog, SourceCounts};
pub use config::ControllerConfig;
pub use controller::ModeController;
pub use error::{ControllerError, TransportError};
pub use evidence::EvidenceLedger;
pub use heartbeat::HeartbeatMonitor;
pub use mode::{ModeMachine, ModeTransition};
pub use snapshot::ConsoleSnapshot;
pub use transport::{CommandTransport, ConnectivityProbe, EvidenceEndpoint};
pub use types::{
    Command, CommandId, CommandOutcome, CommandSource, CommandStatus, EvidenceRecord, Mode,
    SyncPhase, SyncSession,
};
