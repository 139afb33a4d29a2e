//! Top-level configuration type.

use http::Method;
use serde::{Deserialize, Serialize};

use crate::{AppConfig, ConfigError, CorsConfig, LogFormat, LoggingConfig, MetricsConfig};

/// Complete Lamina configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load it from files and
/// environment variables.
///
/// # Example
///
/// ```
/// use lamina_config::LaminaConfig;
///
/// let config = LaminaConfig::default();
/// assert_eq!(config.app.credential_header, "authorization");
/// assert!(!config.cors.enabled);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct LaminaConfig {
    /// Application behaviour.
    #[serde(default)]
    pub app: AppConfig,

    /// Application-wide CORS policy.
    #[serde(default)]
    pub cors: CorsConfig,

    /// Logging.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Metrics.
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl LaminaConfig {
    /// Validate cross-field rules.
    ///
    /// # Errors
    ///
    /// - `cors.allow_credentials` combined with a wildcard origin
    /// - a `cors.methods` entry that is not an HTTP method token
    /// - an empty `logging.level`
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cors.allow_credentials && self.cors.allows_any_origin() {
            return Err(ConfigError::validation_error(
                "cors.allow_credentials cannot be combined with a wildcard origin",
            ));
        }

        for method in &self.cors.methods {
            if Method::from_bytes(method.as_bytes()).is_err() {
                return Err(ConfigError::invalid_value(
                    "cors.methods",
                    format!("'{method}' is not an HTTP method"),
                ));
            }
        }

        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "logging.level",
                "must not be empty",
            ));
        }

        Ok(())
    }

    /// Development preset: pretty debug logs, metrics off.
    ///
    /// ```
    /// use lamina_config::{LaminaConfig, LogFormat};
    ///
    /// let config = LaminaConfig::development();
    /// assert_eq!(config.logging.format, LogFormat::Pretty);
    /// ```
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();
        config.logging.level = "debug".to_string();
        config.logging.format = LogFormat::Pretty;
        config.metrics.enabled = false;
        config
    }

    /// Production preset: JSON info logs, metrics on.
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();
        config.logging.level = "info".to_string();
        config.logging.format = LogFormat::Json;
        config.metrics.enabled = true;
        config
    }
}
