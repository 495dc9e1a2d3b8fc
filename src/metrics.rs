// Prometheus metrics definitions for the leaderboard backend.

use std::sync::Once;

use lazy_static::lazy_static;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};

use crate::contestant::Contestant;

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // ── Gauges ───────────────────────────────────────────────────────

    /// Contestants in the in-memory collection.
    pub static ref CONTESTANTS: IntGauge =
        IntGauge::new("leaderboard_contestants", "Contestants in the collection").unwrap();

    /// Contestants not yet knocked out.
    pub static ref ACTIVE_CONTESTANTS: IntGauge =
        IntGauge::new("leaderboard_active_contestants", "Contestants still active").unwrap();

    // ── Counters ─────────────────────────────────────────────────────

    /// Applied mutations, by operation (add, add_score, knock_out).
    pub static ref MUTATIONS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("leaderboard_mutations_total", "Applied mutations"),
        &["op"],
    )
    .unwrap();

    /// Failed load/save calls against the persistence back end.
    pub static ref PERSISTENCE_FAILURES_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new(
            "leaderboard_persistence_failures_total",
            "Failed persistence operations",
        ),
        &["op"],
    )
    .unwrap();

    /// Login attempts, by outcome (accepted, rejected).
    pub static ref LOGIN_ATTEMPTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("leaderboard_login_attempts_total", "Admin login attempts"),
        &["outcome"],
    )
    .unwrap();

    // ── Histograms ───────────────────────────────────────────────────

    pub static ref PERSISTENCE_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "leaderboard_persistence_duration_seconds",
            "Persistence call duration in seconds",
        )
        .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),
        &["op"],
    )
    .unwrap();
}

static REGISTER: Once = Once::new();

/// Register all metrics with the custom registry. Safe to call more than once.
pub fn register_metrics() {
    REGISTER.call_once(|| {
        let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
            Box::new(CONTESTANTS.clone()),
            Box::new(ACTIVE_CONTESTANTS.clone()),
            Box::new(MUTATIONS_TOTAL.clone()),
            Box::new(PERSISTENCE_FAILURES_TOTAL.clone()),
            Box::new(LOGIN_ATTEMPTS_TOTAL.clone()),
            Box::new(PERSISTENCE_DURATION_SECONDS.clone()),
        ];

        for c in collectors {
            if let Err(e) = REGISTRY.register(c) {
                tracing::error!("failed to register metric: {e}");
            }
        }
    });
}

/// Refresh the collection gauges from the current contestant list.
pub fn record_collection(contestants: &[Contestant]) {
    CONTESTANTS.set(contestants.len() as i64);
    ACTIVE_CONTESTANTS.set(contestants.iter().filter(|c| c.active).count() as i64);
}

/// Serialize all registered metrics to the Prometheus text exposition format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("failed to encode metrics: {e}");
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
