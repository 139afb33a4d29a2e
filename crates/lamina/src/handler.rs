//! Handler abstraction.
//!
//! A handler receives the resolved [`Arguments`] of one invocation and
//! returns anything that implements [`IntoResponse`]. Async closures and
//! `async fn`s taking `Arguments` are handlers without further ceremony:
//!
//! ```rust
//! use lamina::{Arguments, Handler};
//! use serde_json::json;
//!
//! async fn get_user(args: Arguments) -> serde_json::Value {
//!     json!({ "id": args.integer("user_id") })
//! }
//!
//! fn assert_handler<H: Handler>(_: H) {}
//! assert_handler(get_user);
//! ```

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;
use lamina_core::{IntoResponse, LaminaError};
use lamina_extract::Arguments;
use lamina_middleware::{BoxFuture, Outcome};

/// An invocable route handler.
pub trait Handler: Send + Sync + 'static {
    /// Runs the handler and normalizes its return value.
    fn call(&self, args: Arguments) -> BoxFuture<'static, Outcome>;
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Arguments) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse,
{
    fn call(&self, args: Arguments) -> BoxFuture<'static, Outcome> {
        let fut = self(args);
        Box::pin(async move { fut.await.into_response() })
    }
}

/// A type-erased, shareable handler.
pub type SharedHandler = Arc<dyn Handler>;

/// Calls `handler`, turning a panic into an unhandled failure.
pub(crate) async fn invoke(handler: &dyn Handler, args: Arguments) -> Outcome {
    match AssertUnwindSafe(async move { handler.call(args).await })
        .catch_unwind()
        .await
    {
        Ok(outcome) => outcome,
        Err(payload) => Err(LaminaError::unhandled(anyhow::anyhow!(
            "handler panicked: {}",
            panic_message(payload.as_ref())
        ))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}
