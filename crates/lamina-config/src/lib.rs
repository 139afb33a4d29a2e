//! Typed configuration for Lamina functions.
//!
//! - TOML and JSON configuration files
//! - Environment variable overrides
//! - Strict parsing (fails on unknown keys)
//! - Layered loading (defaults, then file, then env)
//!
//! The root type is [`LaminaConfig`]:
//!
//! - [`AppConfig`] - root path, credential header, 405 reporting
//! - [`CorsConfig`] - application-wide CORS policy
//! - [`LoggingConfig`] - log level, format, service name
//! - [`MetricsConfig`] - Prometheus recorder toggle
//!
//! # Example
//!
//! ```no_run
//! use lamina_config::ConfigLoader;
//!
//! # fn main() -> Result<(), lamina_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_dotenv()?
//!     .with_optional_file("lamina.toml")?
//!     .with_env_prefix("LAMINA")
//!     .load()?;
//!
//! println!("credentials read from: {}", config.app.credential_header);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [app]
//! root_path = "/prod"
//! credential_header = "authorization"
//! method_not_allowed = true
//!
//! [cors]
//! enabled = true
//! origins = ["https://app.example.com"]
//! allow_credentials = true
//! max_age_secs = 600
//!
//! [logging]
//! level = "info"
//! format = "json"
//! service_name = "orders"
//!
//! [metrics]
//! enabled = true
//! ```
//!
//! # Environment Variable Overrides
//!
//! Keys use the form `PREFIX__SECTION__KEY`; lists are comma-separated:
//!
//! - `LAMINA__APP__ROOT_PATH=/v1`
//! - `LAMINA__CORS__ORIGINS=https://a.test,https://b.test`
//! - `LAMINA__LOGGING__LEVEL=debug`

#![warn(missing_docs)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::LaminaConfig;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::*;
