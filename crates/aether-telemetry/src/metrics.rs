//! Prometheus metrics for the state engine.
//!
//! All metrics follow the naming convention: `al_<component>_<metric>_<unit>`

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Counter, CounterVec, Encoder, Gauge, Histogram, HistogramOpts, Opts,
    Registry, TextEncoder,
};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // STORE PROVIDER
    // =========================================================================

    /// Updates applied without error
    pub static ref UPDATES_APPLIED: Counter = Counter::new(
        "al_store_updates_applied_total",
        "Total number of updates applied to the session store"
    ).expect("metric creation failed");

    /// Updates whose mutation returned an error
    pub static ref UPDATES_FAILED: Counter = Counter::new(
        "al_store_updates_failed_total",
        "Total number of updates that returned an error"
    ).expect("metric creation failed");

    /// Time spent applying one update
    pub static ref UPDATE_APPLY_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "al_store_update_apply_duration_seconds",
            "Time spent applying one update inside the control loop"
        ).buckets(exponential_buckets(0.000_001, 4.0, 12).expect("valid buckets"))
    ).expect("metric creation failed");

    /// Queries that gave up waiting on the control loop
    pub static ref QUERY_TIMEOUTS: CounterVec = CounterVec::new(
        Opts::new("al_store_query_timeouts_total", "Read queries that timed out"),
        &["query"]  // streams, stream, entity
    ).expect("metric creation failed");

    // =========================================================================
    // HUBS
    // =========================================================================

    /// Per-subscriber deliveries dropped on a full queue
    pub static ref HUB_EVENTS_DROPPED: CounterVec = CounterVec::new(
        Opts::new("al_hub_events_dropped_total", "Events dropped for slow subscribers"),
        &["hub"]  // stream, entity
    ).expect("metric creation failed");

    // =========================================================================
    // SESSIONS
    // =========================================================================

    /// Sessions currently feeding the store
    pub static ref SESSIONS_ACTIVE: Gauge = Gauge::new(
        "al_sessions_active",
        "Number of live session handlers"
    ).expect("metric creation failed");
}

/// Register all metrics with the global registry.
///
/// Fails if called more than once per process.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(UPDATES_APPLIED.clone()),
        Box::new(UPDATES_FAILED.clone()),
        Box::new(UPDATE_APPLY_DURATION.clone()),
        Box::new(QUERY_TIMEOUTS.clone()),
        Box::new(HUB_EVENTS_DROPPED.clone()),
        Box::new(SESSIONS_ACTIVE.clone()),
    ];

    for metric in metrics {
        REGISTRY
            .register(metric)
            .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    }
    Ok(())
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Timer guard for automatic histogram observation.
pub struct HistogramTimer {
    histogram: Histogram,
    start: std::time::Instant,
}

impl HistogramTimer {
    /// Start a new timer for the given histogram.
    pub fn new(histogram: &Histogram) -> Self {
        Self {
            histogram: histogram.clone(),
            start: std::time::Instant::now(),
        }
    }
}

impl Drop for HistogramTimer {
    fn drop(&mut self) {
        self.histogram.observe(self.start.elapsed().as_secs_f64());
    }
}

/// Start timing for a histogram. Observation happens on drop.
#[macro_export]
macro_rules! time_histogram {
    ($histogram:expr) => {
        $crate::metrics::HistogramTimer::new(&$histogram)
    };
}
