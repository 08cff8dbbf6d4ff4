//! # Aether Telemetry
//!
//! Logging and metrics for the Aetherlens state engine.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use aether_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     let _guard = init_telemetry(&TelemetryConfig::from_env())?;
//!     // logs and metrics are now being collected
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `AL_SERVICE_NAME` | `aetherlens` | Service name in logs |
//! | `AL_LOG_LEVEL` | `info` | Log level filter (`RUST_LOG` wins) |
//! | `AL_JSON_LOGS` | `false` | JSON log output |

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod config;
mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use logging::init_logging;
pub use metrics::{
    encode_metrics, register_metrics, HistogramTimer, HUB_EVENTS_DROPPED, QUERY_TIMEOUTS,
    SESSIONS_ACTIVE, UPDATES_APPLIED, UPDATES_FAILED, UPDATE_APPLY_DURATION,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),
}

/// Initialize logging and register metrics.
///
/// Returns a guard that should be held for the lifetime of the process.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    register_metrics()?;
    init_logging(config)?;
    Ok(TelemetryGuard {
        service_name: config.service_name.clone(),
    })
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    service_name: String,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!(service = %self.service_name, "Shutting down telemetry");
    }
}

/// Convenience macro for recording a metric increment.
#[macro_export]
macro_rules! metric_inc {
    ($metric:expr) => {
        $metric.inc()
    };
    ($metric:expr, $labels:expr) => {
        $metric.with_label_values($labels).inc()
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_inc_macro() {
        let before = UPDATES_FAILED.get();
        metric_inc!(UPDATES_FAILED);
        metric_inc!(QUERY_TIMEOUTS, &["stream"]);
        assert!(UPDATES_FAILED.get() > before);
        assert!(QUERY_TIMEOUTS.with_label_values(&["stream"]).get() >= 1.0);
    }
}
