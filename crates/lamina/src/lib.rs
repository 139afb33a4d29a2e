//! # Lamina
//!
//! **Request dispatch for serverless HTTP functions**
//!
//! Lamina receives one platform event per invocation, matches it to a
//! registered route, resolves the parameters the handler declares, runs the
//! handler inside a middleware chain, and turns the result (or any failure)
//! into a platform response envelope.
//!
//! - **Declared parameters**: path, query, header, body, and identity
//!   parameters with coercion and constraints, compiled once at build time
//! - **Predictable routing**: literal routes first, then capture routes in
//!   registration order
//! - **Structured failures**: every error is a JSON body with a stable code
//! - **CORS**: preflights answered without running handlers
//!
//! ## Quick Start
//!
//! ```rust
//! use lamina::prelude::*;
//! use serde_json::json;
//!
//! # fn main() -> Result<(), lamina::ConfigurationError> {
//! let app = App::builder()
//!     .route(
//!         Route::get("/items", |args: Arguments| async move {
//!             json!({ "limit": args.integer("limit") })
//!         })
//!         .param(Param::query("limit", ParamType::Integer).default(10).ge(1).le(100)),
//!     )
//!     .build()?;
//!
//! # tokio_test::block_on(async {
//! let response = app
//!     .handle_json(json!({
//!         "httpMethod": "GET",
//!         "path": "/items",
//!         "queryStringParameters": { "limit": "abc" }
//!     }))
//!     .await;
//! assert_eq!(response.status_code, 400);
//! # });
//! # Ok(())
//! # }
//! ```
//!
//! ## Crates
//!
//! | Re-export | Crate |
//! |-----------|-------|
//! | [`core`] | failure taxonomy, request/response, envelopes, identity |
//! | [`router`] | path templates and the route table |
//! | [`extract`] | parameter declarations and resolution |
//! | [`middleware`] | middleware chain, CORS, error translation |
//! | [`config`] | layered configuration |
//! | [`telemetry`] | logging and metrics |

#![doc(html_root_url = "https://docs.rs/lamina/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod app;
mod error;
mod handler;
mod route;
mod settings;

pub use app::{App, AppBuilder};
pub use error::ConfigurationError;
pub use handler::{Handler, SharedHandler};
pub use route::{Route, RouteGroup};
pub use settings::telemetry_from_config;

pub use lamina_extract::Arguments;

pub use lamina_config as config;
pub use lamina_core as core;
pub use lamina_extract as extract;
pub use lamina_middleware as middleware;
pub use lamina_router as router;
pub use lamina_telemetry as telemetry;

/// Prelude module for convenient imports.
///
/// ```rust
/// use lamina::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{App, AppBuilder, Arguments, ConfigurationError, Handler, Route, RouteGroup};

    pub use lamina_core::{
        async_trait, AuthProvider, BasicIdentity, Body, ErrorKind, Identity, IntoResponse, Json,
        LaminaError, LaminaResult, ProxyEvent, ProxyResponse, Request, Response, SharedIdentity,
    };

    pub use lamina_extract::{Field, Param, ParamType};

    pub use lamina_middleware::{
        hooks, CorsPolicy, ErrorTranslator, InvocationContext, Middleware, Next, Outcome,
    };

    pub use lamina_config::{ConfigLoader, LaminaConfig};
}
