//! End-to-end controller scenarios driven under a paused clock.

use async_trait::async_trait;
use rover_core::{
    CommandFilter, CommandOutcome, CommandSource, CommandStatus, CommandTransport,
    ConnectivityProbe, ControllerConfig, EvidenceEndpoint, Mode, ModeController, SyncPhase,
    TransportError,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Probe backed by a shared flag the test flips.
struct FlagProbe(Arc<AtomicBool>);

#[async_trait]
impl ConnectivityProbe for FlagProbe {
    async fn poll(&self) -> Result<bool, TransportError> {
        Ok(self.0.load(Ordering::SeqCst))
    }
}

/// Probe that always errors; must read as "not connected".
struct FailingProbe;

#[async_trait]
impl ConnectivityProbe for FailingProbe {
    async fn poll(&self) -> Result<bool, TransportError> {
        Err(TransportError::Probe("telemetry endpoint down".into()))
    }
}

/// Transport that confirms instantly.
struct OkTransport;

#[async_trait]
impl CommandTransport for OkTransport {
    async fn send(&self, _kind: &str) -> Result<(), TransportError> {
        Ok(())
    }
}

/// Transport that never answers; resolution comes from the caller.
struct SilentTransport;

#[async_trait]
impl CommandTransport for SilentTransport {
    async fn send(&self, _kind: &str) -> Result<(), TransportError> {
        std::future::pending().await
    }
}

/// Evidence endpoint with a fixed remote manifest.
struct FixedManifest(Vec<String>);

#[async_trait]
impl EvidenceEndpoint for FixedManifest {
    async fn poll_remote_manifest(&self) -> Result<Vec<String>, TransportError> {
        Ok(self.0.clone())
    }
}

fn linked_controller(transport: Arc<dyn CommandTransport>) -> (ModeController, Arc<AtomicBool>) {
    let link = Arc::new(AtomicBool::new(true));
    let controller = ModeController::new(
        ControllerConfig::default(),
        Arc::new(FlagProbe(link.clone())),
        transport,
        None,
    );
    (controller, link)
}

/// Drop the link, advance past the threshold and tick into degraded.
async fn degrade(controller: &ModeController, link: &AtomicBool) {
    link.store(false, Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(2100)).await;
    controller.tick().await;
    assert_eq!(controller.mode(), Mode::Degraded);
}

// Scenario A: degraded strictly after 2000ms of silence, not before.
#[tokio::test(start_paused = true)]
async fn scenario_a_degrades_only_past_threshold() {
    let (controller, link) = linked_controller(Arc::new(OkTransport));
    link.store(false, Ordering::SeqCst);

    tokio::time::sleep(Duration::from_millis(1000)).await;
    controller.tick().await;
    assert_eq!(controller.mode(), Mode::Connected);

    // Exactly at the threshold: still connected.
    tokio::time::sleep(Duration::from_millis(1000)).await;
    controller.tick().await;
    assert_eq!(controller.mode(), Mode::Connected);

    // Slightly past it: degraded.
    tokio::time::sleep(Duration::from_millis(100)).await;
    controller.tick().await;
    assert_eq!(controller.mode(), Mode::Degraded);
}

#[tokio::test(start_paused = true)]
async fn recovery_is_immediate_on_one_positive_sample() {
    let (controller, link) = linked_controller(Arc::new(OkTransport));
    degrade(&controller, &link).await;

    // A long outage changes nothing about recovery latency.
    tokio::time::sleep(Duration::from_secs(60)).await;
    controller.tick().await;
    assert_eq!(controller.mode(), Mode::Degraded);

    link.store(true, Ordering::SeqCst);
    controller.tick().await;
    assert_eq!(controller.mode(), Mode::Connected);
}

// Scenario B: 3 evidence files, sync steps +15 every 300ms until 100%,
// then the ledger is cleared.
#[tokio::test(start_paused = true)]
async fn scenario_b_sync_session_reconciles_backlog() {
    let (controller, link) = linked_controller(Arc::new(OkTransport));
    degrade(&controller, &link).await;

    for i in 1..=3 {
        controller
            .record_evidence(&format!("IMG_{i:04}.jpg"))
            .unwrap();
    }

    link.store(true, Ordering::SeqCst);
    controller.tick().await;
    assert_eq!(controller.mode(), Mode::Connected);

    let snapshot = controller.snapshot();
    let session = snapshot.sync.expect("sync session should have started");
    assert_eq!(session.total_items, 3);
    assert_eq!(session.phase(), SyncPhase::Pending);
    assert!(snapshot.banner_visible);

    // ceil(100 / 15) = 7 progress ticks to full acknowledgement.
    tokio::time::sleep(Duration::from_millis(7 * 300 + 50)).await;
    let snapshot = controller.snapshot();
    let session = snapshot.sync.expect("completed session is retained");
    assert_eq!(session.phase(), SyncPhase::Complete);
    assert_eq!(session.acknowledged_items, 3);
    assert!(snapshot.evidence.is_empty(), "ledger cleared after full sync");

    controller.stop();
}

#[tokio::test(start_paused = true)]
async fn banner_hides_on_its_own_timer_while_sync_still_runs() {
    let config = ControllerConfig {
        // Slow the sync down so it outlives the banner.
        sync_tick: Duration::from_millis(1000),
        ..ControllerConfig::default()
    };
    let link = Arc::new(AtomicBool::new(true));
    let controller = ModeController::new(
        config,
        Arc::new(FlagProbe(link.clone())),
        Arc::new(OkTransport),
        None,
    );
    degrade(&controller, &link).await;
    controller.record_evidence("IMG_0001.jpg").unwrap();

    link.store(true, Ordering::SeqCst);
    controller.tick().await;
    assert!(controller.snapshot().banner_visible);

    // 5s banner elapses while the 1s-per-step sync is only part way.
    tokio::time::sleep(Duration::from_millis(5500)).await;
    let snapshot = controller.snapshot();
    assert!(!snapshot.banner_visible);
    let session = snapshot.sync.expect("sync keeps running after banner hides");
    assert_eq!(session.phase(), SyncPhase::InProgress);

    // And the sync still completes on its own schedule.
    tokio::time::sleep(Duration::from_millis(2000)).await;
    assert_eq!(
        controller.snapshot().sync.unwrap().phase(),
        SyncPhase::Complete
    );

    controller.stop();
}

#[tokio::test(start_paused = true)]
async fn remote_manifest_count_is_authoritative() {
    let link = Arc::new(AtomicBool::new(true));
    let remote: Vec<String> = (1..=5).map(|i| format!("IMG_{i:04}.jpg")).collect();
    let controller = ModeController::new(
        ControllerConfig::default(),
        Arc::new(FlagProbe(link.clone())),
        Arc::new(OkTransport),
        Some(Arc::new(FixedManifest(remote))),
    );
    degrade(&controller, &link).await;

    // Local ledger saw fewer captures than the rover reports.
    controller.record_evidence("IMG_0001.jpg").unwrap();
    controller.record_evidence("IMG_0002.jpg").unwrap();

    link.store(true, Ordering::SeqCst);
    controller.tick().await;
    assert_eq!(controller.snapshot().sync.unwrap().total_items, 5);

    controller.stop();
}

// Scenario C: pending-then-resolve lifecycle with an external resolver.
#[tokio::test(start_paused = true)]
async fn scenario_c_pending_command_resolves_succeeded() {
    let (controller, _link) = linked_controller(Arc::new(SilentTransport));

    let command = controller
        .submit("FORWARD", CommandSource::Operator)
        .unwrap();
    assert_eq!(command.status, CommandStatus::Pending);

    let status = controller
        .resolve(command.id, CommandOutcome::Success)
        .unwrap();
    assert_eq!(status, CommandStatus::Succeeded);
    assert_eq!(controller.query(CommandFilter::default()).len(), 1);

    controller.stop();
}

// Scenario D: rapid same-kind submissions from both sources are two
// distinct log entries.
#[tokio::test(start_paused = true)]
async fn scenario_d_same_kind_both_sources_distinct_entries() {
    let (controller, _link) = linked_controller(Arc::new(OkTransport));

    let a = controller.submit("FORWARD", CommandSource::Operator).unwrap();
    let b = controller
        .submit("FORWARD", CommandSource::Autonomous)
        .unwrap();
    assert_ne!(a.id, b.id);

    let log = controller.query(CommandFilter::default());
    assert_eq!(log.len(), 2);
    let counts = controller.command_counts();
    assert_eq!(counts.operator, 1);
    assert_eq!(counts.autonomous, 1);

    controller.stop();
}

#[tokio::test(start_paused = true)]
async fn resolve_is_idempotent_across_duplicate_signals() {
    let (controller, _link) = linked_controller(Arc::new(SilentTransport));

    let command = controller.submit("LEFT", CommandSource::Operator).unwrap();
    controller
        .resolve(command.id, CommandOutcome::Failure)
        .unwrap();
    let status = controller
        .resolve(command.id, CommandOutcome::Success)
        .unwrap();
    assert_eq!(status, CommandStatus::Failed);

    controller.stop();
}

#[tokio::test(start_paused = true)]
async fn probe_failure_reads_as_offline() {
    let controller = ModeController::new(
        ControllerConfig::default(),
        Arc::new(FailingProbe),
        Arc::new(OkTransport),
        None,
    );

    tokio::time::sleep(Duration::from_millis(2100)).await;
    controller.tick().await;
    assert_eq!(controller.mode(), Mode::Degraded);
}

#[tokio::test(start_paused = true)]
async fn relapse_mid_sync_discards_session_and_keeps_ledger() {
    let config = ControllerConfig {
        // Slow sync so the outage below lands mid-session.
        sync_tick: Duration::from_millis(1000),
        ..ControllerConfig::default()
    };
    let link = Arc::new(AtomicBool::new(true));
    let controller = ModeController::new(
        config,
        Arc::new(FlagProbe(link.clone())),
        Arc::new(OkTransport),
        None,
    );
    degrade(&controller, &link).await;
    controller.record_evidence("IMG_0001.jpg").unwrap();
    controller.record_evidence("IMG_0002.jpg").unwrap();

    link.store(true, Ordering::SeqCst);
    controller.tick().await;
    assert!(controller.snapshot().sync.is_some());

    // The link drops again partway into the sync.
    tokio::time::sleep(Duration::from_millis(350)).await;
    degrade(&controller, &link).await;

    let snapshot = controller.snapshot();
    assert!(snapshot.sync.is_none(), "partial session discarded");
    assert!(!snapshot.banner_visible);
    // Only a fully acknowledged sync clears the ledger.
    assert_eq!(snapshot.evidence.len(), 2);

    // Capture continues while degraded.
    controller.record_evidence("IMG_0003.jpg").unwrap();
    assert_eq!(controller.evidence_manifest().len(), 3);

    controller.stop();
}

#[tokio::test(start_paused = true)]
async fn no_session_or_banner_for_empty_backlog() {
    let (controller, link) = linked_controller(Arc::new(OkTransport));
    degrade(&controller, &link).await;

    link.store(true, Ordering::SeqCst);
    controller.tick().await;
    let snapshot = controller.snapshot();
    assert_eq!(snapshot.mode, Mode::Connected);
    assert!(snapshot.sync.is_none());
    assert!(!snapshot.banner_visible);
}

#[tokio::test(start_paused = true)]
async fn watch_subscribers_see_every_mode_change() {
    let (controller, link) = linked_controller(Arc::new(OkTransport));
    let mut rx = controller.subscribe();
    assert_eq!(rx.borrow().mode, Mode::Connected);

    degrade(&controller, &link).await;
    rx.changed().await.unwrap();
    assert_eq!(rx.borrow_and_update().mode, Mode::Degraded);
}
