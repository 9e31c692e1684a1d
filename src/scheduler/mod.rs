//! Lane scheduler
//!
//! Owns the three sync lanes: timer loops, pause/resume, per-lane
//! cancellation and the sync-state registry handed out over the status
//! endpoint. Cancellation is cooperative and only observed at chunk
//! boundaries; an in-flight chunk always finishes before a lane yields.

pub mod lane;

pub use lane::Lane;

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tokio::sync::{watch, RwLock};
use tokio::time::MissedTickBehavior;

use crate::error::{Error, Result};
use crate::metrics;
use crate::models::{FetchRequest, StoreOutcome, SyncState, SyncStatus};
use crate::storage::Reconciler;
use crate::sync::pipeline::FetchPipeline;

/// Snapshot returned by the status endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerStatus {
    pub is_paused: bool,
    pub sync_state: BTreeMap<String, SyncState>,
}

#[derive(Default)]
struct SchedulerState {
    paused: bool,
    lanes: HashMap<&'static str, SyncState>,
    active: HashMap<&'static str, watch::Sender<bool>>,
}

/// Drives periodic lane executions against the pipeline and reconciler.
pub struct SyncScheduler {
    pipeline: FetchPipeline,
    reconciler: Reconciler,
    product_ids: Vec<String>,
    chunk_days: u32,
    state: RwLock<SchedulerState>,
    shutdown: watch::Sender<bool>,
}

impl SyncScheduler {
    pub fn new(
        pipeline: FetchPipeline,
        reconciler: Reconciler,
        product_ids: Vec<String>,
        chunk_days: u32,
    ) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            pipeline,
            reconciler,
            product_ids,
            chunk_days,
            state: RwLock::new(SchedulerState::default()),
            shutdown,
        }
    }

    /// Spawn the three lane timer loops. Each lane starts after its
    /// stagger delay, runs immediately, then repeats at its cadence until
    /// shutdown.
    pub fn start(self: &Arc<Self>) {
        for lane in Lane::ALL {
            let scheduler = Arc::clone(self);
            let mut shutdown = self.shutdown.subscribe();

            tokio::spawn(async move {
                tokio::select! {
                    _ = tokio::time::sleep(lane.startup_delay()) => {}
                    _ = shutdown.changed() => return,
                }

                let mut ticker = tokio::time::interval(lane.interval());
                ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

                loop {
                    tokio::select! {
                        _ = ticker.tick() => scheduler.run_lane(lane).await,
                        _ = shutdown.changed() => {
                            tracing::info!(lane = %lane, "Lane timer stopped");
                            return;
                        }
                    }
                }
            });
        }

        tracing::info!(products = ?self.product_ids, "Scheduler started, 3 lanes spawned");
    }

    /// Stop all lane timers. Running executions are cancelled at their
    /// next chunk boundary.
    pub async fn shutdown(&self) {
        let _ = self.shutdown.send(true);
        let state = self.state.read().await;
        for sender in state.active.values() {
            let _ = sender.send(true);
        }
    }

    /// Execute one lane run end to end, recording its lifecycle in the
    /// state registry. Skipped entirely while paused or if the same lane
    /// is already running.
    pub async fn run_lane(&self, lane: Lane) {
        let cancel = {
            let mut state = self.state.write().await;
            if state.paused {
                tracing::debug!(lane = %lane, "Skipping run, scheduler is paused");
                return;
            }
            if state.active.contains_key(lane.name()) {
                tracing::warn!(lane = %lane, "Previous run still active, skipping tick");
                return;
            }

            let (tx, rx) = watch::channel(false);
            state.active.insert(lane.name(), tx);
            state
                .lanes
                .insert(lane.name(), SyncState::running(Utc::now()));
            rx
        };

        metrics::record_lane_run(lane.name());
        tracing::info!(lane = %lane, "Lane run started");

        let result = self.execute_lane(lane, cancel).await;

        let mut state = self.state.write().await;
        state.active.remove(lane.name());
        let Some(entry) = state.lanes.get_mut(lane.name()) else {
            return;
        };

        match result {
            Ok(outcome) => {
                entry.status = SyncStatus::Completed;
                entry.end_time = Some(Utc::now());
                entry.progress = 100;
                tracing::info!(
                    lane = %lane,
                    saved = outcome.saved,
                    updated = outcome.updated,
                    skipped = outcome.skipped,
                    "Lane run completed"
                );
            }
            Err(e) if e.is_cancelled() => {
                entry.status = SyncStatus::Interrupted;
                entry.interrupted = true;
                entry.end_time = Some(Utc::now());
                tracing::info!(lane = %lane, progress = entry.progress, "Lane run interrupted");
            }
            Err(e) => {
                entry.status = SyncStatus::Failed;
                entry.error = Some(e.to_string());
                entry.end_time = Some(Utc::now());
                metrics::record_lane_error(lane.name());
                tracing::error!(lane = %lane, error = %e, "Lane run failed");
            }
        }
    }

    async fn execute_lane(
        &self,
        lane: Lane,
        cancel: watch::Receiver<bool>,
    ) -> Result<StoreOutcome> {
        let window = lane.window();

        if lane.is_chunked() {
            let chunks = window.chunks(self.chunk_days);
            let total = chunks.len();
            let mut outcome = StoreOutcome::default();

            for (done, chunk) in chunks.into_iter().enumerate() {
                if *cancel.borrow() {
                    return Err(Error::Cancelled);
                }

                let request = FetchRequest {
                    product_ids: self.product_ids.clone(),
                    window: chunk,
                };
                let slots = self.pipeline.fetch_inventory(&request).await;
                outcome.merge(&self.reconciler.store_slot_availabilities(&slots));

                self.set_progress(lane, done + 1, total).await;

                if *cancel.borrow() {
                    return Err(Error::Cancelled);
                }
            }

            Ok(outcome)
        } else {
            let request = FetchRequest {
                product_ids: self.product_ids.clone(),
                window,
            };
            let slots = self.pipeline.fetch_inventory(&request).await;

            // the fetch is not undone, but nothing is persisted after
            // a cancellation observed here
            if *cancel.borrow() {
                return Err(Error::Cancelled);
            }

            Ok(self.reconciler.store_slot_availabilities(&slots))
        }
    }

    async fn set_progress(&self, lane: Lane, done: usize, total: usize) {
        let progress = ((done as f64 / total as f64) * 100.0).round() as u8;
        let mut state = self.state.write().await;
        if let Some(entry) = state.lanes.get_mut(lane.name()) {
            entry.progress = progress;
        }
    }

    /// Pause: stop launching new runs and signal every active run to stop
    /// at its next chunk boundary. Returns the new paused flag.
    pub async fn pause(&self) -> bool {
        let mut state = self.state.write().await;
        state.paused = true;
        for (name, sender) in &state.active {
            tracing::info!(lane = %name, "Signalling active run to stop");
            let _ = sender.send(true);
        }
        tracing::info!("Scheduler paused");
        true
    }

    /// Resume: clear the paused flag and immediately restart every lane
    /// whose last run was interrupted, each over its full fresh window.
    /// Returns the new paused flag.
    pub async fn resume(self: &Arc<Self>) -> bool {
        let interrupted: Vec<Lane> = {
            let mut state = self.state.write().await;
            state.paused = false;
            Lane::ALL
                .into_iter()
                .filter(|lane| {
                    state
                        .lanes
                        .get(lane.name())
                        .is_some_and(|s| s.interrupted)
                })
                .collect()
        };

        for lane in interrupted {
            tracing::info!(lane = %lane, "Resuming interrupted lane");
            let scheduler = Arc::clone(self);
            tokio::spawn(async move { scheduler.run_lane(lane).await });
        }

        tracing::info!("Scheduler resumed");
        false
    }

    /// Current paused flag and per-lane state snapshot.
    pub async fn status(&self) -> SchedulerStatus {
        let state = self.state.read().await;
        SchedulerStatus {
            is_paused: state.paused,
            sync_state: state
                .lanes
                .iter()
                .map(|(name, s)| (name.to_string(), s.clone()))
                .collect(),
        }
    }

    /// Number of currently executing lane runs.
    pub async fn active_lanes(&self) -> usize {
        self.state.read().await.active.len()
    }
}
