//! Configuration schema types.
//!
//! Every section rejects unknown keys and fills missing ones from its
//! defaults, so a file only needs to name what it changes.

use serde::{Deserialize, Serialize};

/// Application section: how incoming paths and credentials are read.
///
/// # Example
///
/// ```
/// use lamina_config::AppConfig;
///
/// let config: AppConfig = toml::from_str(r#"root_path = "/v1""#).unwrap();
/// assert_eq!(config.root_path, "/v1");
/// assert_eq!(config.credential_header, "authorization");
/// assert!(config.method_not_allowed);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Prefix stripped from incoming paths before matching. Empty means none.
    #[serde(default)]
    pub root_path: String,

    /// Header carrying the raw credential handed to the auth provider.
    #[serde(default = "default_credential_header")]
    pub credential_header: String,

    /// Report a method mismatch as 405. When false it is reported as 404.
    #[serde(default = "default_true")]
    pub method_not_allowed: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            root_path: String::new(),
            credential_header: default_credential_header(),
            method_not_allowed: true,
        }
    }
}

fn default_credential_header() -> String {
    "authorization".to_string()
}

/// Application-wide CORS section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CorsConfig {
    /// Install an application-wide policy.
    #[serde(default)]
    pub enabled: bool,

    /// Allowed origins. `"*"` allows any origin.
    #[serde(default = "default_cors_origins")]
    pub origins: Vec<String>,

    /// Allowed methods.
    #[serde(default = "default_cors_methods")]
    pub methods: Vec<String>,

    /// Allowed request headers.
    #[serde(default = "default_cors_headers")]
    pub headers: Vec<String>,

    /// Response headers exposed to scripts.
    #[serde(default)]
    pub expose_headers: Vec<String>,

    /// Send `Access-Control-Allow-Credentials: true`.
    #[serde(default)]
    pub allow_credentials: bool,

    /// Preflight cache lifetime in seconds.
    #[serde(default)]
    pub max_age_secs: Option<u64>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            origins: default_cors_origins(),
            methods: default_cors_methods(),
            headers: default_cors_headers(),
            expose_headers: Vec::new(),
            allow_credentials: false,
            max_age_secs: None,
        }
    }
}

impl CorsConfig {
    /// True when the origin list contains the wildcard.
    #[must_use]
    pub fn allows_any_origin(&self) -> bool {
        self.origins.iter().any(|o| o == "*")
    }
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_cors_methods() -> Vec<String> {
    ["GET", "POST", "PUT", "DELETE", "PATCH", "OPTIONS"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_cors_headers() -> Vec<String> {
    ["Content-Type", "Authorization", "X-Requested-With"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Log output format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per event.
    #[default]
    Json,
    /// Human-readable multi-line output.
    Pretty,
}

/// Logging section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Filter directive (`info`, `lamina=debug,warn`, ...).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Service name attached to log events.
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
            service_name: default_service_name(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_service_name() -> String {
    "lamina".to_string()
}

/// Metrics section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct MetricsConfig {
    /// Install the Prometheus recorder.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_config_default() {
        let config = AppConfig::default();
        assert_eq!(config.root_path, "");
        assert_eq!(config.credential_header, "authorization");
        assert!(config.method_not_allowed);
    }

    #[test]
    fn test_app_config_unknown_field_rejected() {
        let toml = r#"
            root_path = "/v1"
            http_addr = "0.0.0.0:8080"
        "#;
        let result: Result<AppConfig, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_cors_config_default() {
        let config = CorsConfig::default();
        assert!(!config.enabled);
        assert_eq!(config.origins, vec!["*"]);
        assert_eq!(config.methods.len(), 6);
        assert_eq!(
            config.headers,
            vec!["Content-Type", "Authorization", "X-Requested-With"]
        );
        assert!(config.expose_headers.is_empty());
        assert!(!config.allow_credentials);
        assert_eq!(config.max_age_secs, None);
        assert!(config.allows_any_origin());
    }

    #[test]
    fn test_cors_config_partial_deserialize() {
        let toml = r#"
            enabled = true
            origins = ["https://app.example.com"]
            max_age_secs = 600
        "#;
        let config: CorsConfig = toml::from_str(toml).unwrap();
        assert!(config.enabled);
        assert!(!config.allows_any_origin());
        assert_eq!(config.max_age_secs, Some(600));
        // Defaults applied
        assert_eq!(config.methods, default_cors_methods());
    }

    #[test]
    fn test_log_format_deserialize() {
        let config: LoggingConfig = toml::from_str(r#"format = "pretty""#).unwrap();
        assert_eq!(config.format, LogFormat::Pretty);

        let result: Result<LoggingConfig, _> = toml::from_str(r#"format = "xml""#);
        assert!(result.is_err());
    }

    #[test]
    fn test_logging_config_default() {
        let config = LoggingConfig::default();
        assert!(config.enabled);
        assert_eq!(config.level, "info");
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.service_name, "lamina");
    }

    #[test]
    fn test_metrics_config_json() {
        let config: MetricsConfig = serde_json::from_str(r#"{"enabled": false}"#).unwrap();
        assert!(!config.enabled);
        assert!(MetricsConfig::default().enabled);
    }
}
