//! Failure-to-response translation.
//!
//! Every failure that escapes the middleware chain ends up here. Matching
//! runs in a fixed order:
//!
//! 1. handlers registered for the concrete application error type
//! 2. handlers registered for the failure's [`ErrorKind`]
//! 3. the built-in rendering for taxonomy failures
//! 4. the fallback (if registered) or the default opaque `500`
//!
//! Opaque failures are logged with an `error_id` that is also placed in the
//! response body; their message and source never reach the client.

use crate::context::InvocationContext;
use http::header::{ALLOW, RETRY_AFTER, WWW_AUTHENTICATE};
use http::Method;
use lamina_core::{ErrorKind, LaminaError, Response};
use std::collections::HashMap;
use std::sync::Arc;

type Handler = Arc<dyn Fn(&LaminaError, &InvocationContext) -> Response + Send + Sync>;
type TypedHandler = Arc<dyn Fn(&LaminaError, &InvocationContext) -> Option<Response> + Send + Sync>;

/// Maps failures to HTTP responses.
///
/// # Example
///
/// ```
/// use lamina_middleware::{ErrorTranslator, InvocationContext};
/// use lamina_core::{ErrorBody, ErrorKind, LaminaError, Response};
/// use http::{Method, StatusCode};
///
/// #[derive(Debug, thiserror::Error)]
/// #[error("insufficient funds")]
/// struct InsufficientFunds;
///
/// let translator = ErrorTranslator::new()
///     .on::<InsufficientFunds, _>(|_err, _ctx| {
///         let body = ErrorBody::new("INSUFFICIENT_FUNDS", "balance too low", StatusCode::PAYMENT_REQUIRED);
///         Response::json(body.to_value()).with_status(StatusCode::PAYMENT_REQUIRED)
///     });
///
/// let ctx = InvocationContext::new(Method::POST, "/transfers");
/// let response = translator.translate(&LaminaError::application(InsufficientFunds), &ctx);
/// assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
///
/// let response = translator.translate(&LaminaError::not_found("no such transfer"), &ctx);
/// assert_eq!(response.status(), StatusCode::NOT_FOUND);
/// ```
#[derive(Clone, Default)]
pub struct ErrorTranslator {
    typed: Vec<TypedHandler>,
    by_kind: HashMap<ErrorKind, Handler>,
    fallback: Option<Handler>,
}

impl ErrorTranslator {
    /// Creates a translator with only the built-in rendering.
    pub fn new() -> Self {
        Self::default()
    }

    /// Handles failures of one taxonomy kind. A later registration replaces
    /// an earlier one.
    pub fn on_kind<F>(mut self, kind: ErrorKind, f: F) -> Self
    where
        F: Fn(&LaminaError, &InvocationContext) -> Response + Send + Sync + 'static,
    {
        self.by_kind.insert(kind, Arc::new(f));
        self
    }

    /// Handles an application error of concrete type `E`.
    ///
    /// Matches errors wrapped with [`LaminaError::application`] as well as
    /// unhandled errors whose underlying type is `E`. Type handlers are
    /// tried in registration order.
    pub fn on<E, F>(mut self, f: F) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
        F: Fn(&E, &InvocationContext) -> Response + Send + Sync + 'static,
    {
        self.typed.push(Arc::new(move |error, ctx| {
            let inner = match error {
                LaminaError::Unhandled(inner) => inner.downcast_ref::<E>(),
                other => other.downcast_application::<E>(),
            };
            inner.map(|e| f(e, ctx))
        }));
        self
    }

    /// Replaces the default `500` rendering for opaque failures.
    pub fn fallback<F>(mut self, f: F) -> Self
    where
        F: Fn(&LaminaError, &InvocationContext) -> Response + Send + Sync + 'static,
    {
        self.fallback = Some(Arc::new(f));
        self
    }

    /// Converts a failure into a response.
    pub fn translate(&self, error: &LaminaError, ctx: &InvocationContext) -> Response {
        if let Some(response) = self.typed.iter().find_map(|handler| handler(error, ctx)) {
            return response;
        }
        if let Some(handler) = self.by_kind.get(&error.kind()) {
            return handler(error, ctx);
        }
        if error.is_opaque() {
            if let Some(fallback) = &self.fallback {
                log_opaque(error, ctx);
                return fallback(error, ctx);
            }
        }
        render(error, ctx)
    }
}

/// Renders a failure with the built-in error body and headers.
///
/// The body carries the correlation ID; opaque failures additionally carry
/// an `error_id` matching the server-side log entry.
pub fn render(error: &LaminaError, ctx: &InvocationContext) -> Response {
    let correlation = ctx.correlation_id();
    let status = error.status_code();

    let error_id = if error.is_opaque() {
        log_opaque(error, ctx);
        Some(ctx.request_id().to_string())
    } else {
        if status.is_server_error() {
            tracing::warn!(
                request_id = %correlation,
                http.status_code = status.as_u16(),
                error = %error,
                "request failed"
            );
        } else {
            tracing::debug!(
                request_id = %correlation,
                http.status_code = status.as_u16(),
                error = %error,
                "request rejected"
            );
        }
        None
    };

    let body = error.to_body(Some(&correlation), error_id.as_deref());
    let mut response = Response::json(body.to_value()).with_status(status);

    match error {
        LaminaError::Authentication { .. } => {
            response.set_header(WWW_AUTHENTICATE.as_str(), "Bearer");
        }
        LaminaError::MethodNotAllowed { allowed, .. } => {
            let allow: Vec<&str> = allowed.iter().map(Method::as_str).collect();
            response.set_header(ALLOW.as_str(), &allow.join(", "));
        }
        _ => {}
    }
    if let Some(seconds) = error.retry_after() {
        response.set_header(RETRY_AFTER.as_str(), &seconds.to_string());
    }

    response
}

fn log_opaque(error: &LaminaError, ctx: &InvocationContext) {
    let source = std::error::Error::source(error).map(ToString::to_string);
    tracing::error!(
        error_id = %ctx.request_id(),
        request_id = %ctx.correlation_id(),
        http.method = %ctx.method(),
        http.path = ctx.path(),
        route = ctx.route().unwrap_or("-"),
        error = %error,
        source = source.as_deref().unwrap_or("-"),
        "unhandled failure"
    );
}

impl std::fmt::Debug for ErrorTranslator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorTranslator")
            .field("typed_handlers", &self.typed.len())
            .field("kinds", &self.by_kind.keys().collect::<Vec<_>>())
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}
