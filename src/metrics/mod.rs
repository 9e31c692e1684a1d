//! Prometheus metrics
//!
//! Metrics are optional: recording helpers are no-ops until
//! [`init_metrics`] is called, so unit tests and one-shot CLI runs never
//! need a registry.

use std::sync::OnceLock;

use prometheus::{CounterVec, Encoder, IntCounter, Opts, Registry, TextEncoder};

static METRICS: OnceLock<SyncMetrics> = OnceLock::new();

pub struct SyncMetrics {
    registry: Registry,
    gate_failures: IntCounter,
    lane_runs: CounterVec,
    lane_errors: CounterVec,
    reconcile_outcomes: CounterVec,
}

impl SyncMetrics {
    fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let gate_failures = IntCounter::new(
            "slotsync_gate_failures_total",
            "Operations that failed after passing the admission gate",
        )?;
        let lane_runs = CounterVec::new(
            Opts::new("slotsync_lane_runs_total", "Lane executions started"),
            &["lane"],
        )?;
        let lane_errors = CounterVec::new(
            Opts::new("slotsync_lane_errors_total", "Lane executions that failed"),
            &["lane"],
        )?;
        let reconcile_outcomes = CounterVec::new(
            Opts::new(
                "slotsync_reconcile_records_total",
                "Reconciled records by outcome",
            ),
            &["outcome"],
        )?;

        registry.register(Box::new(gate_failures.clone()))?;
        registry.register(Box::new(lane_runs.clone()))?;
        registry.register(Box::new(lane_errors.clone()))?;
        registry.register(Box::new(reconcile_outcomes.clone()))?;

        Ok(Self {
            registry,
            gate_failures,
            lane_runs,
            lane_errors,
            reconcile_outcomes,
        })
    }
}

/// Install the global metrics registry. Safe to call more than once.
pub fn init_metrics() {
    if METRICS.get().is_some() {
        return;
    }
    match SyncMetrics::new() {
        Ok(metrics) => {
            let _ = METRICS.set(metrics);
        }
        Err(e) => tracing::warn!(error = %e, "Failed to initialize metrics registry"),
    }
}

pub fn record_gate_failure() {
    if let Some(m) = METRICS.get() {
        m.gate_failures.inc();
    }
}

pub fn record_lane_run(lane: &str) {
    if let Some(m) = METRICS.get() {
        m.lane_runs.with_label_values(&[lane]).inc();
    }
}

pub fn record_lane_error(lane: &str) {
    if let Some(m) = METRICS.get() {
        m.lane_errors.with_label_values(&[lane]).inc();
    }
}

pub fn record_outcome(outcome: &crate::models::StoreOutcome) {
    if let Some(m) = METRICS.get() {
        m.reconcile_outcomes
            .with_label_values(&["saved"])
            .inc_by(outcome.saved as f64);
        m.reconcile_outcomes
            .with_label_values(&["updated"])
            .inc_by(outcome.updated as f64);
        m.reconcile_outcomes
            .with_label_values(&["skipped"])
            .inc_by(outcome.skipped as f64);
    }
}

/// Render the registry in Prometheus text exposition format.
pub fn encode_metrics() -> String {
    let Some(m) = METRICS.get() else {
        return String::new();
    };

    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&m.registry.gather(), &mut buffer) {
        tracing::warn!(error = %e, "Failed to encode metrics");
        return String::new();
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_without_init_is_noop() {
        // must not panic even if no test initialized the registry
        record_gate_failure();
        record_lane_run("fine");
    }

    #[test]
    fn test_encode_after_init_contains_counters() {
        init_metrics();
        record_lane_run("medium");
        record_outcome(&crate::models::StoreOutcome {
            saved: 2,
            updated: 1,
            skipped: 0,
        });

        let text = encode_metrics();
        assert!(text.contains("slotsync_lane_runs_total"));
        assert!(text.contains("slotsync_reconcile_records_total"));
    }
}
