//! Synchronous before/after hooks.
//!
//! For transforms that need no awaiting, [`hooks`] builds a middleware from
//! plain closures instead of a full [`Middleware`] impl.

use crate::context::InvocationContext;
use crate::middleware::{BoxFuture, Middleware, Next, Outcome};
use lamina_core::{Request, Response};
use std::sync::Arc;

type BeforeFn = Arc<dyn Fn(&mut InvocationContext, &mut Request) -> Option<Response> + Send + Sync>;
type AfterFn = Arc<dyn Fn(&InvocationContext, Response) -> Response + Send + Sync>;

/// Starts a hook middleware named `name`.
pub fn hooks(name: &'static str) -> Hooks {
    Hooks {
        name,
        before: None,
        after: None,
    }
}

/// A middleware made of a pre-phase and a post-phase closure.
///
/// The `before` closure may edit the request, or return a response to
/// short-circuit the rest of the chain. The `after` closure sees successful
/// responses only; failures pass through to the error translator untouched.
///
/// # Example
///
/// ```
/// use lamina_middleware::hooks;
/// use lamina_core::Response;
/// use http::StatusCode;
///
/// let maintenance = hooks("maintenance")
///     .before(|_ctx, request| {
///         (request.header("x-maintenance").is_some())
///             .then(|| Response::text("down for maintenance").with_status(StatusCode::SERVICE_UNAVAILABLE))
///     })
///     .after(|ctx, response| response.with_header("x-route", ctx.route().unwrap_or("-")));
/// # let _ = maintenance;
/// ```
#[derive(Clone)]
pub struct Hooks {
    name: &'static str,
    before: Option<BeforeFn>,
    after: Option<AfterFn>,
}

impl Hooks {
    /// Sets the pre-phase closure.
    pub fn before<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut InvocationContext, &mut Request) -> Option<Response> + Send + Sync + 'static,
    {
        self.before = Some(Arc::new(f));
        self
    }

    /// Sets the post-phase closure.
    pub fn after<F>(mut self, f: F) -> Self
    where
        F: Fn(&InvocationContext, Response) -> Response + Send + Sync + 'static,
    {
        self.after = Some(Arc::new(f));
        self
    }
}

impl Middleware for Hooks {
    fn name(&self) -> &'static str {
        self.name
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut InvocationContext,
        mut request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Outcome> {
        Box::pin(async move {
            if let Some(before) = &self.before {
                if let Some(response) = before(ctx, &mut request) {
                    tracing::debug!(hook = self.name, "before hook short-circuited the chain");
                    return Ok(response);
                }
            }

            let response = next.run(ctx, request).await?;

            Ok(match &self.after {
                Some(after) => after(ctx, response),
                None => response,
            })
        })
    }
}

impl std::fmt::Debug for Hooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hooks")
            .field("name", &self.name)
            .field("before", &self.before.is_some())
            .field("after", &self.after.is_some())
            .finish()
    }
}
