//! Deterministic link-outage simulator
//!
//! Drives a real controller through a scripted mission: periods of
//! healthy link with operator and autonomous command traffic, then
//! full outages during which the rover "captures" evidence, then
//! recovery and sync. Everything is seeded so a run is reproducible;
//! there is no live transport anywhere in the loop.

use async_trait::async_trait;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rover_core::{
    CommandSource, CommandTransport, ConnectivityProbe, ControllerConfig, EvidenceEndpoint,
    Mode, ModeController, TransportError,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Simulator configuration
#[derive(Debug, Clone)]
pub(crate) struct SimulatorConfig {
    /// Random seed for reproducibility
    pub(crate) seed: u64,
    /// Total simulated mission length in seconds
    pub(crate) duration_secs: u64,
    /// Number of link outages to script into the mission
    pub(crate) outages: u32,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            duration_secs: 20,
            outages: 2,
        }
    }
}

/// Statistics for one simulated mission
#[derive(Debug, Clone, Default)]
pub(crate) struct SimulatorStats {
    pub(crate) commands_submitted: u64,
    pub(crate) commands_refused: u64,
    pub(crate) evidence_captured: u64,
    pub(crate) outages_survived: u32,
    pub(crate) syncs_completed: u32,
}

/// Probe over a shared link flag the script flips.
struct ScriptedLink(Arc<AtomicBool>);

#[async_trait]
impl ConnectivityProbe for ScriptedLink {
    async fn poll(&self) -> Result<bool, TransportError> {
        Ok(self.0.load(Ordering::SeqCst))
    }
}

/// Command gateway stub: small latency, seeded occasional failure.
struct GatewayStub {
    rng: Mutex<StdRng>,
}

#[async_trait]
impl CommandTransport for GatewayStub {
    async fn send(&self, _kind: &str) -> Result<(), TransportError> {
        tokio::time::sleep(Duration::from_millis(40)).await;
        let flaky = self.rng.lock().gen_bool(0.1);
        if flaky {
            Err(TransportError::Send("gateway dropped the frame".into()))
        } else {
            Ok(())
        }
    }
}

/// Remote manifest mirroring what the scripted rover captured.
struct RoverStorage(Arc<Mutex<Vec<String>>>);

#[async_trait]
impl EvidenceEndpoint for RoverStorage {
    async fn poll_remote_manifest(&self) -> Result<Vec<String>, TransportError> {
        Ok(self.0.lock().clone())
    }
}

const OPERATOR_VERBS: [&str; 4] = ["FORWARD", "LEFT", "RIGHT", "STOP"];

/// Run one scripted mission and return its statistics.
pub(crate) async fn run_simulator(config: SimulatorConfig) -> SimulatorStats {
    let link = Arc::new(AtomicBool::new(true));
    let rover_files = Arc::new(Mutex::new(Vec::new()));
    let controller = ModeController::new(
        ControllerConfig::default(),
        Arc::new(ScriptedLink(link.clone())),
        Arc::new(GatewayStub {
            rng: Mutex::new(StdRng::seed_from_u64(config.seed)),
        }),
        Some(Arc::new(RoverStorage(rover_files.clone()))),
    );
    controller.start();

    // Renderer stand-in: log every published snapshot change.
    let mut rx = controller.subscribe();
    let renderer = tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let snapshot = rx.borrow_and_update().clone();
            info!(
                mode = %snapshot.mode,
                commands = snapshot.commands.len(),
                evidence = snapshot.evidence.len(),
                sync = ?snapshot.sync.as_ref().map(|s| s.progress_percent),
                banner = snapshot.banner_visible,
                "console"
            );
        }
    });

    let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(1));
    let mut stats = SimulatorStats::default();
    let mut evidence_counter = 0_u32;

    // Slice the mission into per-second phases: outages are evenly
    // spread and each lasts six seconds, long enough to clear the 2 s
    // disconnect debounce with room for captures.
    let outage_len = 6_u64;
    let spacing = (config.duration_secs / u64::from(config.outages.max(1))).max(outage_len + 2);

    for second in 0..config.duration_secs {
        let in_outage = config.outages > 0 && second % spacing >= spacing - outage_len;
        link.store(!in_outage, Ordering::SeqCst);

        if in_outage {
            // The rover keeps working on its own: capture evidence once
            // the console has actually degraded.
            if controller.mode() == Mode::Degraded {
                evidence_counter += 1;
                let filename = format!("IMG_{evidence_counter:04}.jpg");
                rover_files.lock().push(filename.clone());
                if controller.record_evidence(&filename).is_ok() {
                    stats.evidence_captured += 1;
                }
            }
            // Operator keeps pressing buttons; once the console has
            // degraded, the gate refuses them.
            let verb = OPERATOR_VERBS[rng.gen_range(0..OPERATOR_VERBS.len())];
            match controller.submit(verb, CommandSource::Operator) {
                Ok(_) => stats.commands_submitted += 1,
                Err(_) => stats.commands_refused += 1,
            }
        } else {
            let verb = OPERATOR_VERBS[rng.gen_range(0..OPERATOR_VERBS.len())];
            if controller.submit(verb, CommandSource::Operator).is_ok() {
                stats.commands_submitted += 1;
            } else {
                stats.commands_refused += 1;
            }
            // The autonomous policy chimes in now and then.
            if rng.gen_bool(0.3)
                && controller.submit("SCAN", CommandSource::Autonomous).is_ok()
            {
                stats.commands_submitted += 1;
            }
        }

        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    // Let any trailing sync settle before reading final state.
    link.store(true, Ordering::SeqCst);
    tokio::time::sleep(Duration::from_secs(3)).await;

    let final_snapshot = controller.snapshot();
    stats.outages_survived = config.outages;
    if final_snapshot.sync.map_or(false, |s| s.is_complete()) {
        stats.syncs_completed += 1;
    }

    controller.stop();
    renderer.abort();
    stats
}
