//! # Lamina Middleware
//!
//! The layer that wraps handler dispatch in Lamina.
//!
//! ## Pieces
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`Middleware`], [`Next`] | one stage of the chain and the callback to continue it |
//! | [`MiddlewareChain`] | stages in registration order, run as nested wrappers |
//! | [`hooks`] | a stage built from synchronous before/after closures |
//! | [`InvocationContext`] | per-invocation IDs, route, timing, and typed extensions |
//! | [`CorsPolicy`] | preflight answers and response annotation |
//! | [`ErrorTranslator`] | failure-to-response mapping |
//!
//! ## Order
//!
//! ```text
//! request → stage 1 → stage 2 → … → endpoint
//! outcome ← stage 1 ← stage 2 ← … ←──┘
//! ```
//!
//! A stage may short-circuit by returning without calling [`Next::run`], or
//! fail with a [`LaminaError`](lamina_core::LaminaError); the dispatcher
//! hands failures to the [`ErrorTranslator`].

#![doc(html_root_url = "https://docs.rs/lamina-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod chain;
pub mod context;
pub mod cors;
pub mod error_translator;
pub mod hooks;
pub mod middleware;

pub use chain::{BoxedMiddleware, MiddlewareChain};
pub use context::InvocationContext;
pub use cors::{AllowedOrigins, CorsBuilder, CorsPolicy};
pub use error_translator::{render, ErrorTranslator};
pub use hooks::{hooks, Hooks};
pub use middleware::{BoxFuture, Middleware, Next, Outcome};
