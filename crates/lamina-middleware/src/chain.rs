//! Ordered middleware chain.
//!
//! The chain is assembled at application-build time and never changes
//! afterwards. Each invocation builds a fresh [`Next`] linked list over the
//! stored stages, so the chain itself needs no synchronization.

use crate::context::InvocationContext;
use crate::middleware::{BoxFuture, Middleware, Next, Outcome};
use lamina_core::Request;
use std::sync::Arc;

/// A type-erased middleware that can be stored in a vector.
pub type BoxedMiddleware = Arc<dyn Middleware>;

/// Middleware stages in registration order.
///
/// # Example
///
/// ```
/// use lamina_middleware::{hooks, InvocationContext, MiddlewareChain, Outcome};
/// use lamina_core::{Request, Response};
/// use http::Method;
/// use serde_json::json;
///
/// let mut chain = MiddlewareChain::new();
/// chain.push(hooks("tag").after(|_ctx, response| response.with_header("x-served-by", "lamina")));
///
/// let mut ctx = InvocationContext::new(Method::GET, "/");
/// let outcome = tokio_test::block_on(chain.run(&mut ctx, Request::new(Method::GET, "/"), |_ctx, _req| {
///     Box::pin(async { Ok::<_, lamina_core::LaminaError>(Response::json(json!({}))) })
/// }));
///
/// assert_eq!(outcome.unwrap().header("x-served-by"), Some("lamina"));
/// ```
#[derive(Clone, Default)]
pub struct MiddlewareChain {
    stages: Vec<BoxedMiddleware>,
}

impl MiddlewareChain {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a stage. Earlier stages wrap later ones.
    pub fn push<M: Middleware>(&mut self, middleware: M) {
        self.stages.push(Arc::new(middleware));
    }

    /// Appends an already shared stage.
    pub fn push_shared(&mut self, middleware: BoxedMiddleware) {
        self.stages.push(middleware);
    }

    /// Returns the number of stages.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Returns `true` if the chain has no stages.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Returns the stage names in registration order.
    pub fn names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|m| m.name()).collect()
    }

    /// Runs `request` through every stage and then `endpoint`.
    pub async fn run<E>(&self, ctx: &mut InvocationContext, request: Request, endpoint: E) -> Outcome
    where
        E: FnOnce(&mut InvocationContext, Request) -> BoxFuture<'static, Outcome> + Send,
    {
        let next = self.build_chain(endpoint);
        next.run(ctx, request).await
    }

    fn build_chain<'a, E>(&'a self, endpoint: E) -> Next<'a>
    where
        E: FnOnce(&mut InvocationContext, Request) -> BoxFuture<'static, Outcome> + Send + 'a,
    {
        let mut next = Next::endpoint(endpoint);
        for middleware in self.stages.iter().rev() {
            next = Next::new(middleware.as_ref(), next);
        }
        next
    }
}

impl std::fmt::Debug for MiddlewareChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MiddlewareChain")
            .field("stages", &self.names())
            .finish()
    }
}
