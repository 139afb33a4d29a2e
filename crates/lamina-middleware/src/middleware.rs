//! Core middleware trait and types.
//!
//! A [`Middleware`] wraps everything after it in the chain: it sees the
//! request on the way in, may short-circuit by returning without calling
//! [`Next::run`], and sees the outcome on the way out. Outcomes are
//! `Result<Response, LaminaError>` so a stage can fail with a taxonomy error
//! and leave rendering to the error translator.
//!
//! # Example
//!
//! ```
//! use lamina_middleware::{BoxFuture, InvocationContext, Middleware, Next, Outcome};
//! use lamina_core::Request;
//!
//! struct ServerHeader;
//!
//! impl Middleware for ServerHeader {
//!     fn name(&self) -> &'static str {
//!         "server_header"
//!     }
//!
//!     fn process<'a>(
//!         &'a self,
//!         ctx: &'a mut InvocationContext,
//!         request: Request,
//!         next: Next<'a>,
//!     ) -> BoxFuture<'a, Outcome> {
//!         Box::pin(async move {
//!             let mut response = next.run(ctx, request).await?;
//!             response.set_header("server", "lamina");
//!             Ok(response)
//!         })
//!     }
//! }
//! ```

use crate::context::InvocationContext;
use lamina_core::{LaminaError, Request, Response};
use std::future::Future;
use std::pin::Pin;

/// A boxed, sendable future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// What a middleware stage or endpoint produces.
pub type Outcome = Result<Response, LaminaError>;

/// A stage in the middleware chain.
///
/// Stages run in registration order on the way in and in reverse order on
/// the way out.
///
/// # Invariants
///
/// - Call `next.run()` at most once; not calling it short-circuits the chain
/// - Errors from downstream should be returned, not swallowed, unless the
///   stage deliberately recovers them
pub trait Middleware: Send + Sync + 'static {
    /// Returns the name of this stage, used in logs.
    fn name(&self) -> &'static str;

    /// Processes the request, delegating to `next` to continue the chain.
    fn process<'a>(
        &'a self,
        ctx: &'a mut InvocationContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Outcome>;
}

/// Callback to invoke the rest of the chain.
///
/// Consumed by [`run`](Self::run), so it can be called at most once.
pub struct Next<'a> {
    inner: NextInner<'a>,
}

enum NextInner<'a> {
    Chain {
        middleware: &'a dyn Middleware,
        next: Box<Next<'a>>,
    },
    Endpoint(Box<dyn FnOnce(&mut InvocationContext, Request) -> BoxFuture<'static, Outcome> + Send + 'a>),
}

impl<'a> Next<'a> {
    /// Creates a `Next` that invokes `middleware` before `next`.
    pub(crate) fn new(middleware: &'a dyn Middleware, next: Next<'a>) -> Self {
        Self {
            inner: NextInner::Chain {
                middleware,
                next: Box::new(next),
            },
        }
    }

    /// Creates a terminal `Next` that invokes the endpoint.
    pub fn endpoint<F>(f: F) -> Self
    where
        F: FnOnce(&mut InvocationContext, Request) -> BoxFuture<'static, Outcome> + Send + 'a,
    {
        Self {
            inner: NextInner::Endpoint(Box::new(f)),
        }
    }

    /// Invokes the next stage or the endpoint.
    pub async fn run(self, ctx: &mut InvocationContext, request: Request) -> Outcome {
        match self.inner {
            NextInner::Chain { middleware, next } => {
                middleware.process(ctx, request, *next).await
            }
            NextInner::Endpoint(endpoint) => endpoint(ctx, request).await,
        }
    }
}

impl std::fmt::Debug for Next<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.inner {
            NextInner::Chain { middleware, .. } => f
                .debug_struct("Next")
                .field("middleware", &middleware.name())
                .finish(),
            NextInner::Endpoint(_) => f.debug_struct("Next").field("endpoint", &true).finish(),
        }
    }
}
