//! Prometheus metrics for Lamina.
//!
//! A function runtime has no socket to scrape, so the recorder is installed
//! without an HTTP listener; call [`render_metrics`] to obtain the
//! exposition text (for example to log it or push it elsewhere).
//!
//! # Standard Metrics
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `lamina_invocations_total` | Counter | `route`, `status` | Completed invocations |
//! | `lamina_invocation_duration_seconds` | Histogram | `route` | Invocation latency |
//! | `lamina_validation_failures_total` | Counter | `source` | Rejected parameters |
//! | `lamina_in_flight_invocations` | Gauge | - | Invocations in progress |

use crate::error::TelemetryError;
use crate::TelemetryResult;
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::Duration;

/// Completed invocations, labelled by route and status.
pub const INVOCATIONS_TOTAL: &str = "lamina_invocations_total";
/// Invocation latency histogram, labelled by route.
pub const INVOCATION_DURATION_SECONDS: &str = "lamina_invocation_duration_seconds";
/// Validation failures, labelled by parameter source.
pub const VALIDATION_FAILURES_TOTAL: &str = "lamina_validation_failures_total";
/// Invocations currently in progress.
pub const IN_FLIGHT_INVOCATIONS: &str = "lamina_in_flight_invocations";

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Metrics configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsConfig {
    /// Whether metrics are enabled.
    pub enabled: bool,

    /// Histogram buckets for invocation duration, in seconds.
    pub duration_buckets: Vec<f64>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            // 1ms .. 10s
            duration_buckets: vec![
                0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
            ],
        }
    }
}

/// Installs the global Prometheus recorder.
///
/// A disabled config is a no-op. A second installation fails with
/// [`TelemetryError::MetricsInit`].
pub fn init_metrics(config: &MetricsConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }
    if config.duration_buckets.is_empty() {
        return Err(TelemetryError::InvalidConfig(
            "duration_buckets must not be empty".to_string(),
        ));
    }

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full(INVOCATION_DURATION_SECONDS.to_string()),
            &config.duration_buckets,
        )
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?
        .install_recorder()
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;

    if METRICS_HANDLE.set(handle).is_err() {
        return Err(TelemetryError::MetricsInit(
            "metrics recorder already installed".to_string(),
        ));
    }

    register_metric_descriptions();
    Ok(())
}

/// Returns the global metrics handle if initialized.
pub fn get_metrics_handle() -> Option<&'static PrometheusHandle> {
    METRICS_HANDLE.get()
}

/// Renders metrics in Prometheus text format.
///
/// Returns `None` if metrics are not initialized.
pub fn render_metrics() -> Option<String> {
    METRICS_HANDLE.get().map(PrometheusHandle::render)
}

fn register_metric_descriptions() {
    describe_counter!(INVOCATIONS_TOTAL, "Total number of completed invocations");
    describe_histogram!(
        INVOCATION_DURATION_SECONDS,
        metrics::Unit::Seconds,
        "Invocation duration in seconds"
    );
    describe_counter!(
        VALIDATION_FAILURES_TOTAL,
        "Parameters rejected during resolution, by source"
    );
    describe_gauge!(IN_FLIGHT_INVOCATIONS, "Invocations currently being processed");
}

/// Records a completed invocation.
///
/// `route` is the matched template (or `unmatched`), never the raw path, so
/// label cardinality stays bounded.
pub fn record_invocation(route: &str, status_code: u16, duration: Duration) {
    counter!(
        INVOCATIONS_TOTAL,
        "route" => route.to_string(),
        "status" => status_code.to_string()
    )
    .increment(1);

    histogram!(INVOCATION_DURATION_SECONDS, "route" => route.to_string())
        .record(duration.as_secs_f64());
}

/// Records a rejected parameter.
pub fn record_validation_failure(source: &str) {
    counter!(VALIDATION_FAILURES_TOTAL, "source" => source.to_string()).increment(1);
}

/// Guard that tracks an invocation in the in-flight gauge.
///
/// The gauge is decremented on drop, including during unwinding.
#[derive(Debug)]
pub struct InFlightGuard {
    _private: (),
}

impl InFlightGuard {
    /// Increments the in-flight gauge.
    #[must_use]
    pub fn new() -> Self {
        gauge!(IN_FLIGHT_INVOCATIONS).increment(1.0);
        Self { _private: () }
    }
}

impl Default for InFlightGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        gauge!(IN_FLIGHT_INVOCATIONS).decrement(1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MetricsConfig::default();
        assert!(config.enabled);
        assert_eq!(config.duration_buckets.len(), 12);
    }

    #[test]
    fn test_disabled_is_noop() {
        let config = MetricsConfig {
            enabled: false,
            duration_buckets: Vec::new(),
        };
        assert!(init_metrics(&config).is_ok());
    }

    #[test]
    fn test_empty_buckets_rejected() {
        let config = MetricsConfig {
            enabled: true,
            duration_buckets: Vec::new(),
        };
        assert!(matches!(
            init_metrics(&config),
            Err(TelemetryError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_record_and_render() {
        // Only this test installs the recorder in this binary.
        init_metrics(&MetricsConfig::default()).unwrap();
        assert!(get_metrics_handle().is_some());

        {
            let _guard = InFlightGuard::new();
            record_invocation("/users/{user_id}", 200, Duration::from_millis(12));
        }
        record_validation_failure("query");

        let text = render_metrics().unwrap();
        assert!(text.contains(INVOCATIONS_TOTAL));
        assert!(text.contains("route=\"/users/{user_id}\""));
        assert!(text.contains(VALIDATION_FAILURES_TOTAL));
        assert!(text.contains(INVOCATION_DURATION_SECONDS));

        assert!(matches!(
            init_metrics(&MetricsConfig::default()),
            Err(TelemetryError::MetricsInit(_))
        ));
    }

    #[test]
    fn test_record_functions_dont_panic_without_recorder() {
        record_invocation("unmatched", 404, Duration::from_millis(1));
        record_validation_failure("body");
        drop(InFlightGuard::default());
    }
}
