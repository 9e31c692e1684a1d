//! Integration tests for the lane scheduler using wiremock
//!
//! These tests drive real lane executions against a mock partner server
//! and an in-memory store, exercising the lifecycle state machine:
//! completion, pause-to-interrupted and resume.

mod common;

use std::sync::Arc;
use std::time::Duration;

use tokio_test::assert_ok;
use wiremock::matchers::{method, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use slotsync::gate::AdmissionGate;
use slotsync::models::SyncStatus;
use slotsync::scheduler::{Lane, SyncScheduler};
use slotsync::storage::{create_memory_store, Reconciler};
use slotsync::sync::client::PartnerClient;
use slotsync::sync::pipeline::FetchPipeline;

use common::slot_json;

fn test_scheduler(server: &MockServer) -> Arc<SyncScheduler> {
    let client =
        PartnerClient::new(&server.uri(), "test-key", Duration::from_secs(5)).unwrap();
    let gate = Arc::new(AdmissionGate::new(5, Duration::from_millis(1)));
    let pipeline = FetchPipeline::new(Arc::new(client), gate);

    let store = create_memory_store();
    let reconciler = Reconciler::new(store);

    Arc::new(SyncScheduler::new(
        pipeline,
        reconciler,
        vec!["14".to_string()],
        3,
    ))
}

/// Mount one mock answering every inventory call, optionally delayed.
async fn mount_inventory(server: &MockServer, delay: Duration) {
    let day = chrono::Local::now().date_naive();
    Mock::given(method("GET"))
        .and(path_regex("^/inventory/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(delay)
                .set_body_json(vec![slot_json("slot-1", day)]),
        )
        .mount(server)
        .await;
}

async fn wait_for_status(
    scheduler: &SyncScheduler,
    lane: Lane,
    expected: SyncStatus,
) -> bool {
    for _ in 0..200 {
        let status = scheduler.status().await;
        if status
            .sync_state
            .get(lane.name())
            .is_some_and(|s| s.status == expected)
        {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    false
}

/// A chunked lane run walks its whole window and lands on completed with
/// full progress.
#[tokio::test]
async fn test_chunked_lane_runs_to_completion() {
    let mock_server = MockServer::start().await;
    mount_inventory(&mock_server, Duration::ZERO).await;

    let scheduler = test_scheduler(&mock_server);
    scheduler.run_lane(Lane::Medium).await;

    let status = scheduler.status().await;
    let state = status.sync_state.get("medium").expect("lane state recorded");

    assert_eq!(state.status, SyncStatus::Completed);
    assert_eq!(state.progress, 100);
    assert!(!state.interrupted);
    assert!(state.end_time.is_some());
    assert_eq!(scheduler.active_lanes().await, 0);
}

/// The unchunked fine lane also records a completed state.
#[tokio::test]
async fn test_fine_lane_runs_to_completion() {
    let mock_server = MockServer::start().await;
    mount_inventory(&mock_server, Duration::ZERO).await;

    let scheduler = test_scheduler(&mock_server);
    scheduler.run_lane(Lane::Fine).await;

    let status = scheduler.status().await;
    let state = status.sync_state.get("fine").expect("lane state recorded");
    assert_eq!(state.status, SyncStatus::Completed);
}

/// Progress of a chunked lane advances through the rounded per-chunk
/// steps: a 3-chunk window only ever reports 0, 33, 67 or 100, strictly
/// increasing, ending at 100.
#[tokio::test]
async fn test_chunk_progress_advances_in_rounded_steps() {
    let mock_server = MockServer::start().await;
    mount_inventory(&mock_server, Duration::from_millis(200)).await;

    let scheduler = test_scheduler(&mock_server);

    let runner = {
        let scheduler = scheduler.clone();
        tokio::spawn(async move { scheduler.run_lane(Lane::Medium).await })
    };

    // medium: 8-day window in 3-day chunks = 3 chunks
    let mut seen: Vec<u8> = vec![0];
    while !runner.is_finished() {
        if let Some(state) = scheduler.status().await.sync_state.get("medium") {
            if state.progress != *seen.last().unwrap() {
                seen.push(state.progress);
            }
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_ok!(runner.await);

    for step in &seen {
        assert!(
            [0, 33, 67, 100].contains(step),
            "unexpected progress value {step}"
        );
    }
    assert!(
        seen.windows(2).all(|w| w[0] < w[1]),
        "progress went backwards: {seen:?}"
    );
    assert!(
        seen.len() > 2,
        "no intermediate chunk progress observed: {seen:?}"
    );

    let status = scheduler.status().await;
    assert_eq!(status.sync_state.get("medium").unwrap().progress, 100);
}

/// Pausing mid-run interrupts the execution at the next chunk boundary:
/// the lane ends interrupted with partial progress and its cancellation
/// registration is cleaned up.
#[tokio::test]
async fn test_pause_interrupts_running_lane() {
    let mock_server = MockServer::start().await;
    mount_inventory(&mock_server, Duration::from_millis(300)).await;

    let scheduler = test_scheduler(&mock_server);

    let runner = {
        let scheduler = scheduler.clone();
        tokio::spawn(async move { scheduler.run_lane(Lane::Medium).await })
    };

    // let the first chunk get going, then pause
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert!(scheduler.pause().await);

    assert_ok!(runner.await);

    let status = scheduler.status().await;
    assert!(status.is_paused);

    let state = status.sync_state.get("medium").expect("lane state recorded");
    assert_eq!(state.status, SyncStatus::Interrupted);
    assert!(state.interrupted);
    assert!(state.progress < 100);
    assert_eq!(scheduler.active_lanes().await, 0);
}

/// While paused, new lane runs are skipped without leaving any state.
#[tokio::test]
async fn test_paused_scheduler_skips_runs() {
    let mock_server = MockServer::start().await;
    mount_inventory(&mock_server, Duration::ZERO).await;

    let scheduler = test_scheduler(&mock_server);
    scheduler.pause().await;

    scheduler.run_lane(Lane::Fine).await;

    let status = scheduler.status().await;
    assert!(status.sync_state.get("fine").is_none());
}

/// Resume restarts an interrupted lane from scratch and it runs to
/// completion over its full fresh window.
#[tokio::test]
async fn test_resume_restarts_interrupted_lane() {
    let mock_server = MockServer::start().await;
    mount_inventory(&mock_server, Duration::from_millis(200)).await;

    let scheduler = test_scheduler(&mock_server);

    let runner = {
        let scheduler = scheduler.clone();
        tokio::spawn(async move { scheduler.run_lane(Lane::Medium).await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;
    scheduler.pause().await;
    assert_ok!(runner.await);

    assert!(!scheduler.resume().await);

    assert!(
        wait_for_status(&scheduler, Lane::Medium, SyncStatus::Completed).await,
        "resumed lane should complete"
    );

    let status = scheduler.status().await;
    assert!(!status.is_paused);
    let state = status.sync_state.get("medium").unwrap();
    assert_eq!(state.progress, 100);
    assert!(!state.interrupted);
}

/// A lane whose every fetch fails still completes: per-product failures
/// are swallowed upstream, so the reconciler just sees empty batches.
#[tokio::test]
async fn test_lane_completes_on_empty_fetches() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex("^/inventory/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let scheduler = test_scheduler(&mock_server);
    scheduler.run_lane(Lane::Medium).await;

    let status = scheduler.status().await;
    let state = status.sync_state.get("medium").unwrap();
    assert_eq!(state.status, SyncStatus::Completed);
}
