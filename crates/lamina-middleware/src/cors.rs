//! CORS (Cross-Origin Resource Sharing) negotiation.
//!
//! A [`CorsPolicy`] answers preflight requests and annotates ordinary
//! responses. It never blocks a request: CORS is enforced by browsers, so a
//! disallowed origin simply gets no `Access-Control-Allow-Origin` header.
//!
//! ## Preflight Requests
//!
//! Every `OPTIONS` request is treated as a preflight. The dispatcher answers
//! it from the applicable policy with `204 No Content` and an empty body,
//! without invoking any handler.
//!
//! ## Example
//!
//! ```
//! use lamina_middleware::CorsPolicy;
//! use http::{Method, StatusCode};
//! use std::time::Duration;
//!
//! let cors = CorsPolicy::builder()
//!     .allow_origin("https://app.example.com")
//!     .allow_methods([Method::GET, Method::POST])
//!     .allow_credentials(true)
//!     .max_age(Duration::from_secs(600))
//!     .build();
//!
//! let preflight = cors.preflight(Some("https://app.example.com"));
//! assert_eq!(preflight.status(), StatusCode::NO_CONTENT);
//! assert_eq!(
//!     preflight.header("access-control-allow-origin"),
//!     Some("https://app.example.com")
//! );
//! assert_eq!(preflight.header("access-control-max-age"), Some("600"));
//! ```

use http::Method;
use lamina_core::Response;
use std::time::Duration;

/// CORS header names.
pub mod headers {
    /// `Access-Control-Allow-Origin` header.
    pub const ALLOW_ORIGIN: &str = "access-control-allow-origin";
    /// `Access-Control-Allow-Methods` header.
    pub const ALLOW_METHODS: &str = "access-control-allow-methods";
    /// `Access-Control-Allow-Headers` header.
    pub const ALLOW_HEADERS: &str = "access-control-allow-headers";
    /// `Access-Control-Allow-Credentials` header.
    pub const ALLOW_CREDENTIALS: &str = "access-control-allow-credentials";
    /// `Access-Control-Max-Age` header.
    pub const MAX_AGE: &str = "access-control-max-age";
    /// `Access-Control-Expose-Headers` header.
    pub const EXPOSE_HEADERS: &str = "access-control-expose-headers";
    /// `Origin` header.
    pub const ORIGIN: &str = "origin";
    /// `Vary` header.
    pub const VARY: &str = "vary";
}

/// Represents the set of allowed origins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowedOrigins {
    /// Allow any origin (wildcard `*`).
    Any,
    /// Allow the listed origins, echoed back when they match.
    List(Vec<String>),
}

impl AllowedOrigins {
    /// Checks if an origin is allowed.
    pub fn is_allowed(&self, origin: &str) -> bool {
        match self {
            AllowedOrigins::Any => true,
            AllowedOrigins::List(origins) => origins.iter().any(|o| o == origin),
        }
    }

    /// Returns the `Access-Control-Allow-Origin` value for a request origin.
    pub fn header_value(&self, origin: Option<&str>) -> Option<String> {
        match (self, origin) {
            (AllowedOrigins::Any, _) => Some("*".to_string()),
            (AllowedOrigins::List(_), Some(origin)) if self.is_allowed(origin) => {
                Some(origin.to_string())
            }
            (AllowedOrigins::List(_), _) => None,
        }
    }
}

/// A CORS policy for an application, route group, or route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsPolicy {
    origins: AllowedOrigins,
    methods: Vec<Method>,
    headers: Vec<String>,
    expose_headers: Vec<String>,
    allow_credentials: bool,
    max_age: Option<Duration>,
}

impl Default for CorsPolicy {
    fn default() -> Self {
        Self {
            origins: AllowedOrigins::Any,
            methods: vec![
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::PATCH,
                Method::OPTIONS,
            ],
            headers: vec![
                "Content-Type".to_string(),
                "Authorization".to_string(),
                "X-Requested-With".to_string(),
            ],
            expose_headers: Vec::new(),
            allow_credentials: false,
            max_age: None,
        }
    }
}

impl CorsPolicy {
    /// Creates a builder starting from the default policy.
    pub fn builder() -> CorsBuilder {
        CorsBuilder::new()
    }

    /// Returns the allowed origins.
    pub fn origins(&self) -> &AllowedOrigins {
        &self.origins
    }

    /// Returns the allowed methods, in declaration order.
    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    /// Returns the allowed request headers, in declaration order.
    pub fn allowed_headers(&self) -> &[String] {
        &self.headers
    }

    /// Returns whether credentials are allowed.
    pub fn allows_credentials(&self) -> bool {
        self.allow_credentials
    }

    /// Answers a preflight request.
    pub fn preflight(&self, origin: Option<&str>) -> Response {
        let mut response = Response::no_content();

        if let Some(value) = self.origins.header_value(origin) {
            response.set_header(headers::ALLOW_ORIGIN, &value);
        }
        if !self.methods.is_empty() {
            let methods: Vec<&str> = self.methods.iter().map(Method::as_str).collect();
            response.set_header(headers::ALLOW_METHODS, &methods.join(", "));
        }
        if !self.headers.is_empty() {
            response.set_header(headers::ALLOW_HEADERS, &self.headers.join(", "));
        }
        if self.allow_credentials {
            response.set_header(headers::ALLOW_CREDENTIALS, "true");
        }
        if let Some(max_age) = self.max_age {
            response.set_header(headers::MAX_AGE, &max_age.as_secs().to_string());
        }
        self.add_vary(&mut response);

        response
    }

    /// Adds CORS headers to a non-preflight response.
    pub fn annotate(&self, response: &mut Response, origin: Option<&str>) {
        if let Some(value) = self.origins.header_value(origin) {
            response.set_header(headers::ALLOW_ORIGIN, &value);
        }
        if self.allow_credentials {
            response.set_header(headers::ALLOW_CREDENTIALS, "true");
        }
        if !self.expose_headers.is_empty() {
            response.set_header(headers::EXPOSE_HEADERS, &self.expose_headers.join(", "));
        }
        self.add_vary(response);
    }

    // Echoed origins make the response depend on the request.
    fn add_vary(&self, response: &mut Response) {
        if self.origins == AllowedOrigins::Any {
            return;
        }
        let vary = match response.header(headers::VARY) {
            None => "Origin".to_string(),
            Some(existing) if existing.split(',').any(|v| v.trim().eq_ignore_ascii_case("origin")) => {
                return;
            }
            Some(existing) => format!("{existing}, Origin"),
        };
        response.set_header(headers::VARY, &vary);
    }
}

/// Builder for [`CorsPolicy`].
#[derive(Debug, Clone, Default)]
pub struct CorsBuilder {
    policy: CorsPolicy,
    origins_set: bool,
}

impl CorsBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allows any origin (wildcard `*`).
    ///
    /// **Warning**: browsers reject `Access-Control-Allow-Origin: *` combined
    /// with `Access-Control-Allow-Credentials: true`.
    pub fn allow_any_origin(mut self) -> Self {
        self.policy.origins = AllowedOrigins::Any;
        self.origins_set = true;
        self
    }

    /// Adds an allowed origin. The first call replaces the default wildcard.
    pub fn allow_origin(mut self, origin: impl Into<String>) -> Self {
        let origin = origin.into();
        if origin == "*" {
            return self.allow_any_origin();
        }
        if !self.origins_set {
            self.policy.origins = AllowedOrigins::List(Vec::new());
            self.origins_set = true;
        }
        if let AllowedOrigins::List(origins) = &mut self.policy.origins {
            if !origins.contains(&origin) {
                origins.push(origin);
            }
        }
        self
    }

    /// Sets the allowed origins. A `*` entry allows any origin.
    pub fn allow_origins<I, S>(mut self, origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let origins: Vec<String> = origins.into_iter().map(Into::into).collect();
        self.origins_set = true;
        self.policy.origins = if origins.iter().any(|o| o == "*") {
            AllowedOrigins::Any
        } else {
            let mut unique = Vec::with_capacity(origins.len());
            for origin in origins {
                if !unique.contains(&origin) {
                    unique.push(origin);
                }
            }
            AllowedOrigins::List(unique)
        };
        self
    }

    /// Sets the allowed HTTP methods.
    pub fn allow_methods<I>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = Method>,
    {
        let mut unique = Vec::new();
        for method in methods {
            if !unique.contains(&method) {
                unique.push(method);
            }
        }
        self.policy.methods = unique;
        self
    }

    /// Sets the allowed request headers.
    pub fn allow_headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.policy.headers = headers.into_iter().map(Into::into).collect();
        self
    }

    /// Sets headers that should be exposed to JavaScript.
    pub fn expose_headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.policy.expose_headers = headers.into_iter().map(Into::into).collect();
        self
    }

    /// Sets whether to allow credentials (cookies, authorization headers).
    pub fn allow_credentials(mut self, allow: bool) -> Self {
        self.policy.allow_credentials = allow;
        self
    }

    /// Sets how long browsers may cache the preflight answer.
    pub fn max_age(mut self, duration: Duration) -> Self {
        self.policy.max_age = Some(duration);
        self
    }

    /// Builds the policy.
    pub fn build(self) -> CorsPolicy {
        if self.policy.allow_credentials && self.policy.origins == AllowedOrigins::Any {
            tracing::warn!("CORS policy allows credentials with a wildcard origin; browsers will reject it");
        }
        self.policy
    }
}
