//! Per-invocation context.
//!
//! The [`InvocationContext`] travels with the request through the middleware
//! chain. The dispatcher fills in the route template once matching succeeds;
//! middleware may stash typed extensions for later stages.

use http::Method;
use lamina_core::RequestId;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Context that flows through the middleware chain for one invocation.
///
/// # Example
///
/// ```
/// use lamina_middleware::InvocationContext;
/// use http::Method;
///
/// #[derive(Debug, PartialEq)]
/// struct Tenant(&'static str);
///
/// let mut ctx = InvocationContext::new(Method::GET, "/users/42");
/// ctx.set_route("/users/{user_id}");
/// ctx.set_extension(Tenant("acme"));
///
/// assert_eq!(ctx.route(), Some("/users/{user_id}"));
/// assert_eq!(ctx.get_extension::<Tenant>(), Some(&Tenant("acme")));
/// ```
#[derive(Debug)]
pub struct InvocationContext {
    request_id: RequestId,
    platform_request_id: Option<String>,
    method: Method,
    path: String,
    route: Option<String>,
    started_at: Instant,
    extensions: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl InvocationContext {
    /// Creates a context with a fresh request ID.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            request_id: RequestId::new(),
            platform_request_id: None,
            method,
            path: path.into(),
            route: None,
            started_at: Instant::now(),
            extensions: HashMap::new(),
        }
    }

    /// Records the request ID the platform assigned to the event.
    #[must_use]
    pub fn with_platform_request_id(mut self, id: Option<String>) -> Self {
        self.platform_request_id = id;
        self
    }

    /// Returns the generated invocation ID.
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Returns the platform request ID, if the event carried one.
    pub fn platform_request_id(&self) -> Option<&str> {
        self.platform_request_id.as_deref()
    }

    /// The ID reported to clients: the platform's when present, else ours.
    pub fn correlation_id(&self) -> String {
        self.platform_request_id
            .clone()
            .unwrap_or_else(|| self.request_id.to_string())
    }

    /// Returns the request method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request path after root-path stripping.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the matched route template.
    pub fn route(&self) -> Option<&str> {
        self.route.as_deref()
    }

    /// Records the matched route template.
    pub fn set_route(&mut self, template: impl Into<String>) {
        self.route = Some(template.into());
    }

    /// Returns when the invocation started.
    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    /// Returns the time spent so far.
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Stores a typed extension value, replacing any previous one.
    pub fn set_extension<T: Send + Sync + 'static>(&mut self, value: T) {
        self.extensions.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Retrieves a typed extension value.
    pub fn get_extension<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.extensions
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref())
    }

    /// Removes and returns a typed extension value.
    pub fn remove_extension<T: Send + Sync + 'static>(&mut self) -> Option<T> {
        self.extensions
            .remove(&TypeId::of::<T>())
            .and_then(|v| v.downcast().ok())
            .map(|b| *b)
    }

    /// Checks if an extension of the given type exists.
    pub fn has_extension<T: Send + Sync + 'static>(&self) -> bool {
        self.extensions.contains_key(&TypeId::of::<T>())
    }
}
