//! Mapping from [`LaminaConfig`] sections to runtime settings.

use std::time::Duration;

use http::Method;
use lamina_config::{CorsConfig, LaminaConfig, LogFormat};
use lamina_middleware::CorsPolicy;
use lamina_telemetry::{LogConfig, MetricsConfig, TelemetryConfig};

use crate::ConfigurationError;

/// Builds telemetry settings from the `[logging]` and `[metrics]` sections.
///
/// ```rust
/// use lamina::config::LaminaConfig;
///
/// let mut config = LaminaConfig::development();
/// config.logging.service_name = "orders".to_string();
///
/// let telemetry = lamina::telemetry_from_config(&config);
/// assert_eq!(telemetry.service_name, "orders");
/// assert!(!telemetry.logging.json_format);
/// ```
pub fn telemetry_from_config(config: &LaminaConfig) -> TelemetryConfig {
    let preset = match config.logging.format {
        LogFormat::Json => LogConfig::production(),
        LogFormat::Pretty => LogConfig::development(),
    };
    let logging = LogConfig {
        enabled: config.logging.enabled,
        ..preset.with_level(config.logging.level.as_str())
    };
    let metrics = MetricsConfig {
        enabled: config.metrics.enabled,
        ..MetricsConfig::default()
    };

    TelemetryConfig::builder()
        .service_name(&config.logging.service_name)
        .logging(logging)
        .metrics(metrics)
        .build()
}

/// Builds the application-wide policy from the `[cors]` section.
///
/// Returns `Ok(None)` when the section is disabled.
pub(crate) fn cors_policy(config: &CorsConfig) -> Result<Option<CorsPolicy>, ConfigurationError> {
    if !config.enabled {
        return Ok(None);
    }

    let methods = config
        .methods
        .iter()
        .map(|m| {
            Method::from_bytes(m.as_bytes()).map_err(|_| ConfigurationError::CorsMethod(m.clone()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut builder = CorsPolicy::builder()
        .allow_origins(config.origins.iter().cloned())
        .allow_methods(methods)
        .allow_headers(config.headers.iter().cloned())
        .expose_headers(config.expose_headers.iter().cloned())
        .allow_credentials(config.allow_credentials);
    if let Some(secs) = config.max_age_secs {
        builder = builder.max_age(Duration::from_secs(secs));
    }
    Ok(Some(builder.build()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lamina_middleware::AllowedOrigins;

    #[test]
    fn test_disabled_cors_yields_no_policy() {
        assert!(cors_policy(&CorsConfig::default()).unwrap().is_none());
    }

    #[test]
    fn test_cors_policy_from_section() {
        let config = CorsConfig {
            enabled: true,
            origins: vec!["https://app.test".to_string()],
            methods: vec!["GET".to_string(), "POST".to_string()],
            allow_credentials: true,
            max_age_secs: Some(60),
            ..CorsConfig::default()
        };
        let policy = cors_policy(&config).unwrap().unwrap();
        assert_eq!(
            policy.origins(),
            &AllowedOrigins::List(vec!["https://app.test".to_string()])
        );
        assert_eq!(policy.methods(), &[Method::GET, Method::POST]);
        assert!(policy.allows_credentials());
    }

    #[test]
    fn test_bad_cors_method() {
        let config = CorsConfig {
            enabled: true,
            methods: vec!["GE T".to_string()],
            ..CorsConfig::default()
        };
        assert!(matches!(
            cors_policy(&config),
            Err(ConfigurationError::CorsMethod(m)) if m == "GE T"
        ));
    }

    #[test]
    fn test_telemetry_from_production_config() {
        let mut config = LaminaConfig::production();
        config.logging.level = "warn".to_string();
        config.metrics.enabled = false;

        let telemetry = telemetry_from_config(&config);
        assert!(telemetry.logging.json_format);
        assert_eq!(telemetry.logging.level, "warn");
        assert!(!telemetry.metrics.enabled);
        assert_eq!(telemetry.service_name, "lamina");
    }
}
