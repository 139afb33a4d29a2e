//! Observability for Lamina functions.
//!
//! - **Logging**: structured JSON (or pretty) output via `tracing-subscriber`
//! - **Metrics**: invocation counters and latency via the `metrics` facade,
//!   rendered in Prometheus text format on demand
//!
//! # Standard Metrics
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `lamina_invocations_total` | Counter | `route`, `status` | Completed invocations |
//! | `lamina_invocation_duration_seconds` | Histogram | `route` | Invocation latency |
//! | `lamina_validation_failures_total` | Counter | `source` | Rejected parameters |
//! | `lamina_in_flight_invocations` | Gauge | - | Invocations in progress |
//!
//! # Example
//!
//! ```rust,ignore
//! use lamina_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let config = TelemetryConfig::builder().service_name("orders").build();
//! init_telemetry(&config)?;
//! ```

#![doc(html_root_url = "https://docs.rs/lamina-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;

pub use config::{TelemetryConfig, TelemetryConfigBuilder};
pub use error::TelemetryError;
pub use logging::{init_logging, LogConfig};
pub use crate::metrics::{
    init_metrics, record_invocation, record_validation_failure, render_metrics, InFlightGuard,
    MetricsConfig,
};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// Initializes logging, then metrics.
///
/// Call once per execution environment, outside the handler, so warm
/// invocations reuse the installed subscriber and recorder.
pub fn init_telemetry(config: &TelemetryConfig) -> TelemetryResult<()> {
    init_logging(&config.logging)?;
    init_metrics(&config.metrics)?;
    Ok(())
}
