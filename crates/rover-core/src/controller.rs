//! Mode controller
//!
//! The single owner of console state: heartbeat bookkeeping, the mode
//! machine, the command log, the evidence ledger and any active sync
//! session all live behind one lock, mutated only on discrete ticks or
//! transport callbacks. Explicit lifecycle (`start`/`stop`) so tests
//! can run several independent controllers and no timer outlives its
//! owner.

use crate::command::{CommandFilter, CommandLog, SourceCounts};
use crate::config::ControllerConfig;
use crate::error::ControllerError;
use crate::evidence::EvidenceLedger;
use crate::heartbeat::HeartbeatMonitor;
use crate::mode::{ModeMachine, ModeTransition};
use crate::snapshot::ConsoleSnapshot;
use crate::transport::{CommandTransport, ConnectivityProbe, EvidenceEndpoint};
use crate::types::{
    Command, CommandId, CommandOutcome, CommandSource, CommandStatus, EvidenceRecord, Mode,
    SyncSession,
};
use chrono::Utc;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{info, warn};

const MAX_SPEED: u8 = 100;

/// Mutable console state. One lock, never held across an await.
struct ControllerState {
    heartbeat: HeartbeatMonitor,
    machine: ModeMachine,
    log: CommandLog,
    ledger: EvidenceLedger,
    sync: Option<SyncSession>,
    banner_visible: bool,
    recovered_backlog: usize,
    speed: u8,
}

/// Handles for every scheduled activity, so teardown can halt them.
#[derive(Default)]
struct Tasks {
    heartbeat: Option<JoinHandle<()>>,
    sync: Option<JoinHandle<()>>,
    banner: Option<JoinHandle<()>>,
    dispatch: Vec<JoinHandle<()>>,
}

impl Tasks {
    fn abort_recovery(&mut self) {
        if let Some(handle) = self.sync.take() {
            handle.abort();
        }
        if let Some(handle) = self.banner.take() {
            handle.abort();
        }
    }

    fn abort_all(&mut self) {
        if let Some(handle) = self.heartbeat.take() {
            handle.abort();
        }
        self.abort_recovery();
        for handle in self.dispatch.drain(..) {
            handle.abort();
        }
    }
}

struct Inner {
    config: ControllerConfig,
    state: Mutex<ControllerState>,
    tasks: Mutex<Tasks>,
    probe: Arc<dyn ConnectivityProbe>,
    transport: Arc<dyn CommandTransport>,
    evidence_endpoint: Option<Arc<dyn EvidenceEndpoint>>,
    snapshot_tx: watch::Sender<ConsoleSnapshot>,
}

/// The connectivity/autonomy mode controller.
///
/// Cheap to clone; all clones share one state. Call [`start`] to begin
/// heartbeat sampling and [`stop`] (or drop the last clone) to halt
/// every scheduled activity.
///
/// [`start`]: ModeController::start
/// [`stop`]: ModeController::stop
#[derive(Clone)]
pub struct ModeController {
    inner: Arc<Inner>,
}

impl ModeController {
    /// Build a controller over the given transport seams. Nothing is
    /// scheduled until [`start`](ModeController::start).
    #[must_use]
    pub fn new(
        config: ControllerConfig,
        probe: Arc<dyn ConnectivityProbe>,
        transport: Arc<dyn CommandTransport>,
        evidence_endpoint: Option<Arc<dyn EvidenceEndpoint>>,
    ) -> Self {
        let state = ControllerState {
            heartbeat: HeartbeatMonitor::primed(Instant::now()),
            machine: ModeMachine::new(config.disconnect_threshold),
            log: CommandLog::new(),
            ledger: EvidenceLedger::new(),
            sync: None,
            banner_visible: false,
            recovered_backlog: 0,
            speed: 50,
        };
        let (snapshot_tx, _) = watch::channel(ConsoleSnapshot::initial());
        Self {
            inner: Arc::new(Inner {
                config,
                state: Mutex::new(state),
                tasks: Mutex::new(Tasks::default()),
                probe,
                transport,
                evidence_endpoint,
                snapshot_tx,
            }),
        }
    }

    /// Begin periodic heartbeat sampling and mode evaluation.
    /// Idempotent: a second call while running is a no-op.
    pub fn start(&self) {
        let mut tasks = self.inner.tasks.lock();
        if tasks.heartbeat.is_some() {
            return;
        }
        // The task keeps only a weak handle so dropping the last
        // controller clone tears the sampling loop down on its own.
        let weak = Arc::downgrade(&self.inner);
        let period = self.inner.config.poll_interval;
        tasks.heartbeat = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // The first interval tick fires immediately; samples start
            // one full period after start.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(inner) = weak.upgrade() else { break };
                ModeController { inner }.tick().await;
            }
        }));
    }

    /// Halt every scheduled activity. State stays readable; no timer
    /// mutates it after this returns.
    pub fn stop(&self) {
        self.inner.tasks.lock().abort_all();
    }

    /// Current operational mode.
    #[must_use]
    pub fn mode(&self) -> Mode {
        self.inner.state.lock().machine.mode()
    }

    /// Subscribe to per-tick snapshots of the read model.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ConsoleSnapshot> {
        self.inner.snapshot_tx.subscribe()
    }

    /// Read model frozen at the present moment.
    #[must_use]
    pub fn snapshot(&self) -> ConsoleSnapshot {
        let state = self.inner.state.lock();
        build_snapshot(&state)
    }

    /// One heartbeat tick: sample the probe, feed the monitor, evaluate
    /// the mode machine and run transition side effects. Probe errors
    /// read as "not connected", the fail-safe direction.
    pub async fn tick(&self) {
        let signal = self.inner.probe.poll().await.unwrap_or_else(|e| {
            warn!(error = %e, "connectivity probe failed, treating as offline");
            false
        });

        let transition = {
            let mut state = self.inner.state.lock();
            let now = Instant::now();
            state.heartbeat.observe(signal, now);
            let staleness = state.heartbeat.staleness(now);
            let transition = state.machine.evaluate(signal, staleness);
            if let Some(ModeTransition::LinkLost) = transition {
                // A partial sync session cannot outlive the link; the
                // ledger keeps its records since only full completion
                // clears it.
                state.sync = None;
                state.banner_visible = false;
            }
            self.publish(&state);
            transition
        };

        match transition {
            Some(ModeTransition::LinkLost) => {
                info!("mode degraded: command gate closed, evidence capture open");
                self.inner.tasks.lock().abort_recovery();
            }
            Some(ModeTransition::LinkRestored) => {
                info!("mode connected: operator control restored");
                self.begin_recovery().await;
            }
            None => {}
        }
    }

    /// Submit a command on behalf of `source`. Refused while degraded.
    /// Returns the pending command immediately; the transport outcome
    /// resolves it asynchronously.
    pub fn submit(&self, kind: &str, source: CommandSource) -> Result<Command, ControllerError> {
        let command = {
            let mut state = self.inner.state.lock();
            let mode = state.machine.mode();
            let command = state.log.submit(kind, source, mode, Utc::now())?;
            self.publish(&state);
            command
        };

        let transport = Arc::clone(&self.inner.transport);
        let weak = Arc::downgrade(&self.inner);
        let id = command.id;
        let kind = command.kind.clone();
        let handle = tokio::spawn(async move {
            let outcome = match transport.send(&kind).await {
                Ok(()) => CommandOutcome::Success,
                Err(e) => {
                    warn!(command = %id, error = %e, "command dispatch failed");
                    CommandOutcome::Failure
                }
            };
            if let Some(inner) = weak.upgrade() {
                // The command may already be terminal if the transport
                // signalled completion through resolve(); idempotent.
                let _ = ModeController { inner }.resolve(id, outcome);
            }
        });
        let mut tasks = self.inner.tasks.lock();
        tasks.dispatch.retain(|h| !h.is_finished());
        tasks.dispatch.push(handle);

        Ok(command)
    }

    /// Resolve a pending command to its terminal status. Idempotent.
    pub fn resolve(
        &self,
        id: CommandId,
        outcome: CommandOutcome,
    ) -> Result<CommandStatus, ControllerError> {
        let mut state = self.inner.state.lock();
        let status = state.log.resolve(id, outcome)?;
        self.publish(&state);
        Ok(status)
    }

    /// Read-only command query in submission order.
    #[must_use]
    pub fn query(&self, filter: CommandFilter) -> Vec<Command> {
        self.inner.state.lock().log.query(filter)
    }

    /// Per-source submission totals.
    #[must_use]
    pub fn command_counts(&self) -> SourceCounts {
        self.inner.state.lock().log.counts_by_source()
    }

    /// Record an evidence capture. Only legal while degraded.
    pub fn record_evidence(&self, filename: &str) -> Result<EvidenceRecord, ControllerError> {
        let mut state = self.inner.state.lock();
        let mode = state.machine.mode();
        let record = state.ledger.record(filename, mode, Utc::now())?;
        self.publish(&state);
        Ok(record)
    }

    /// Evidence manifest in capture order.
    #[must_use]
    pub fn evidence_manifest(&self) -> Vec<EvidenceRecord> {
        self.inner.state.lock().ledger.manifest()
    }

    /// Set the operator speed value (clamped to 0..=100). Consumed from
    /// the radial input widget as a plain number.
    pub fn set_speed(&self, speed: u8) {
        let mut state = self.inner.state.lock();
        state.speed = speed.min(MAX_SPEED);
        self.publish(&state);
    }

    /// Side effects of `Degraded → Connected`: with a non-empty
    /// backlog, start a sync session and raise the recovery banner on
    /// its own timer.
    async fn begin_recovery(&self) {
        let backlog = self.inner.state.lock().ledger.len();
        if backlog == 0 {
            return;
        }

        // Remote manifest is authoritative for the item count when the
        // endpoint answers; the local ledger length is the fallback.
        let total = match &self.inner.evidence_endpoint {
            Some(endpoint) => match endpoint.poll_remote_manifest().await {
                Ok(manifest) => manifest.len(),
                Err(e) => {
                    warn!(error = %e, "remote manifest unavailable, using local ledger");
                    backlog
                }
            },
            None => backlog,
        };

        {
            let mut state = self.inner.state.lock();
            // The link may have dropped again while the manifest poll
            // was in flight; recovery side effects only apply while
            // connected.
            if state.machine.mode() != Mode::Connected {
                return;
            }
            state.sync = Some(SyncSession::start(total));
            state.banner_visible = true;
            state.recovered_backlog = total;
            self.publish(&state);
        }
        info!(total_items = total, "recovery sync started");

        let mut tasks = self.inner.tasks.lock();
        tasks.abort_recovery();

        let weak = Arc::downgrade(&self.inner);
        let step = self.inner.config.sync_step;
        let sync_tick = self.inner.config.sync_tick;
        tasks.sync = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(sync_tick);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(inner) = weak.upgrade() else { break };
                let controller = ModeController { inner };
                let done = {
                    let mut state = controller.inner.state.lock();
                    let state = &mut *state;
                    let done = match state.sync.as_mut() {
                        Some(session) => {
                            session.advance(step);
                            if session.is_complete() {
                                // Full acknowledgement: the backlog is
                                // reconciled, the ledger may finally
                                // empty.
                                state.ledger.clear();
                                true
                            } else {
                                false
                            }
                        }
                        // Session was discarded; nothing left to step.
                        None => true,
                    };
                    controller.publish(state);
                    done
                };
                if done {
                    break;
                }
            }
        }));

        let weak = Arc::downgrade(&self.inner);
        let banner_duration = self.inner.config.banner_duration;
        tasks.banner = Some(tokio::spawn(async move {
            tokio::time::sleep(banner_duration).await;
            let Some(inner) = weak.upgrade() else { return };
            let controller = ModeController { inner };
            let mut state = controller.inner.state.lock();
            // Banner visibility is deliberately decoupled from sync
            // completion; hide it even if the sync is still running.
            state.banner_visible = false;
            controller.publish(&state);
        }));
    }

    fn publish(&self, state: &ControllerState) {
        self.inner.snapshot_tx.send_replace(build_snapshot(state));
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.tasks.lock().abort_all();
    }
}

fn build_snapshot(state: &ControllerState) -> ConsoleSnapshot {
    ConsoleSnapshot {
        mode: state.machine.mode(),
        commands: state.log.display_order(),
        command_counts: state.log.counts_by_source(),
        evidence: state.ledger.manifest(),
        sync: state.sync.clone(),
        banner_visible: state.banner_visible,
        recovered_backlog: state.recovered_backlog,
        speed: state.speed,
    }
}
