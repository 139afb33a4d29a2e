//! Failure taxonomy for Lamina.
//!
//! Every failure that can cross the dispatch pipeline is a [`LaminaError`].
//! Each variant belongs to exactly one [`ErrorKind`], which fixes its default
//! HTTP status and its stable machine-readable code:
//!
//! | Kind | Status | Code |
//! |---|---|---|
//! | `Validation` | 400 | `VALIDATION_ERROR` |
//! | `Authentication` | 401 | `AUTH_REQUIRED` |
//! | `Authorization` | 403 | `ACCESS_DENIED` |
//! | `NotFound` | 404 | `NOT_FOUND` |
//! | `MethodNotAllowed` | 405 | `METHOD_NOT_ALLOWED` |
//! | `Timeout` | 408 | `TIMEOUT` |
//! | `Conflict` | 409 | `CONFLICT` |
//! | `RateLimited` | 429 | `RATE_LIMIT_EXCEEDED` |
//! | `Internal` | 500 | `INTERNAL_ERROR` |
//! | `ProviderUnavailable` | 503 | `SERVICE_UNAVAILABLE` |
//!
//! Parameter problems are described by [`ValidationFailure`], which is always
//! fully populated so a 400 body can be rendered without re-deriving anything.

use http::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;
use thiserror::Error;

/// Result type alias using [`LaminaError`].
pub type LaminaResult<T> = Result<T, LaminaError>;

/// Classification of a failure, independent of its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// A parameter was missing, malformed, or violated a constraint.
    Validation,
    /// Credentials were missing, invalid, or expired.
    Authentication,
    /// The caller is authenticated but not allowed.
    Authorization,
    /// No route or resource matched.
    NotFound,
    /// The path exists but not for the requested method.
    MethodNotAllowed,
    /// The resource state conflicts with the request.
    Conflict,
    /// The caller exceeded a rate limit.
    RateLimited,
    /// An operation did not complete in time.
    Timeout,
    /// Anything unexpected.
    Internal,
    /// A dependency (such as the authentication provider) is unavailable.
    ProviderUnavailable,
}

impl ErrorKind {
    /// All kinds, in status-code order.
    pub const ALL: [ErrorKind; 10] = [
        Self::Validation,
        Self::Authentication,
        Self::Authorization,
        Self::NotFound,
        Self::MethodNotAllowed,
        Self::Timeout,
        Self::Conflict,
        Self::RateLimited,
        Self::Internal,
        Self::ProviderUnavailable,
    ];

    /// Returns the default HTTP status code for this kind.
    #[must_use]
    pub const fn default_status_code(&self) -> StatusCode {
        match self {
            Self::Validation => StatusCode::BAD_REQUEST,
            Self::Authentication => StatusCode::UNAUTHORIZED,
            Self::Authorization => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Conflict => StatusCode::CONFLICT,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::Timeout => StatusCode::REQUEST_TIMEOUT,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ProviderUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Returns the machine-readable code placed in the `error` field.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Validation => "VALIDATION_ERROR",
            Self::Authentication => "AUTH_REQUIRED",
            Self::Authorization => "ACCESS_DENIED",
            Self::NotFound => "NOT_FOUND",
            Self::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            Self::Conflict => "CONFLICT",
            Self::RateLimited => "RATE_LIMIT_EXCEEDED",
            Self::Timeout => "TIMEOUT",
            Self::Internal => "INTERNAL_ERROR",
            Self::ProviderUnavailable => "SERVICE_UNAVAILABLE",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Where a declared parameter takes its value from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamSource {
    /// A captured path segment.
    Path,
    /// The query string.
    Query,
    /// The JSON request body.
    Body,
    /// A request header.
    Header,
    /// The authenticated caller.
    Identity,
}

impl ParamSource {
    /// Returns the lowercase name used in error details.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Path => "path",
            Self::Query => "query",
            Self::Body => "body",
            Self::Header => "header",
            Self::Identity => "identity",
        }
    }
}

impl fmt::Display for ParamSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The rule a parameter value failed.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    /// The value was absent and the parameter has no default.
    Required,
    /// The value could not be converted to the declared type.
    Type {
        /// Name of the declared type (`integer`, `float`, ...).
        expected: String,
    },
    /// Exclusive lower bound.
    Gt(f64),
    /// Inclusive lower bound.
    Ge(f64),
    /// Exclusive upper bound.
    Lt(f64),
    /// Inclusive upper bound.
    Le(f64),
    /// Minimum length in characters (strings) or items (lists).
    MinLength(usize),
    /// Maximum length in characters (strings) or items (lists).
    MaxLength(usize),
    /// Regular expression the value must match from its first character.
    Pattern(String),
}

impl Constraint {
    /// Returns the short constraint name used in error details.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::Type { .. } => "type",
            Self::Gt(_) => "gt",
            Self::Ge(_) => "ge",
            Self::Lt(_) => "lt",
            Self::Le(_) => "le",
            Self::MinLength(_) => "min_length",
            Self::MaxLength(_) => "max_length",
            Self::Pattern(_) => "pattern",
        }
    }

    /// Returns the bound or expectation attached to the constraint, if any.
    #[must_use]
    pub fn limit(&self) -> Option<Value> {
        match self {
            Self::Required => None,
            Self::Type { expected } => Some(Value::from(expected.as_str())),
            Self::Gt(n) | Self::Ge(n) | Self::Lt(n) | Self::Le(n) => Some(number(*n)),
            Self::MinLength(n) | Self::MaxLength(n) => Some(Value::from(*n)),
            Self::Pattern(p) => Some(Value::from(p.as_str())),
        }
    }
}

// Renders whole bounds as JSON integers so `ge: 1` stays `1` rather than `1.0`.
#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
fn number(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < 9.0e15 {
        Value::from(n as i64)
    } else {
        Value::from(n)
    }
}

/// A parameter that could not be resolved.
///
/// # Example
///
/// ```
/// use lamina_core::{Constraint, ParamSource, ValidationFailure};
///
/// let failure = ValidationFailure::violated(
///     "limit",
///     ParamSource::Query,
///     Some("0".into()),
///     Constraint::Ge(1.0),
/// );
/// assert_eq!(failure.message(), "parameter 'limit' must be greater than or equal to 1");
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ValidationFailure {
    parameter: String,
    location: ParamSource,
    raw_value: Option<Value>,
    constraint: Constraint,
    message: String,
}

impl ValidationFailure {
    /// A required parameter was absent.
    pub fn missing(parameter: impl Into<String>, source: ParamSource) -> Self {
        Self::violated(parameter, source, None, Constraint::Required)
    }

    /// A raw value could not be converted to `expected`.
    pub fn invalid_type(
        parameter: impl Into<String>,
        source: ParamSource,
        raw_value: Option<Value>,
        expected: impl Into<String>,
    ) -> Self {
        Self::violated(
            parameter,
            source,
            raw_value,
            Constraint::Type {
                expected: expected.into(),
            },
        )
    }

    /// A value violated `constraint`; the message is derived from it.
    pub fn violated(
        parameter: impl Into<String>,
        source: ParamSource,
        raw_value: Option<Value>,
        constraint: Constraint,
    ) -> Self {
        let parameter = parameter.into();
        let message = describe(&parameter, &constraint);
        Self {
            parameter,
            location: source,
            raw_value,
            constraint,
            message,
        }
    }

    /// Replaces the generated message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Prefixes the parameter name with a parent path (`user` + `name` = `user.name`).
    #[must_use]
    pub fn nested_in(mut self, parent: &str) -> Self {
        let old = std::mem::take(&mut self.parameter);
        self.parameter = if old.starts_with('[') {
            format!("{parent}{old}")
        } else {
            format!("{parent}.{old}")
        };
        self.message = describe(&self.parameter, &self.constraint);
        self
    }

    /// Returns the dotted parameter name.
    pub fn parameter(&self) -> &str {
        &self.parameter
    }

    /// Returns the source the parameter was read from.
    pub fn source(&self) -> ParamSource {
        self.location
    }

    /// Returns the offending raw value, if one was present.
    pub fn raw_value(&self) -> Option<&Value> {
        self.raw_value.as_ref()
    }

    /// Returns the violated constraint.
    pub fn constraint(&self) -> &Constraint {
        &self.constraint
    }

    /// Returns the human-readable message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Renders the failure for the `details` field of an error body.
    ///
    /// The raw value is left out for parameters whose names look like secrets.
    pub fn details(&self) -> Value {
        let mut details = Map::new();
        details.insert("field".into(), Value::from(self.parameter.as_str()));
        details.insert("source".into(), Value::from(self.location.as_str()));
        details.insert("constraint".into(), Value::from(self.constraint.name()));
        if let Some(limit) = self.constraint.limit() {
            details.insert("expected".into(), limit);
        }
        if let Some(raw) = &self.raw_value {
            if !is_sensitive_name(&self.parameter) {
                details.insert("value".into(), raw.clone());
            }
        }
        Value::Object(details)
    }
}

fn describe(parameter: &str, constraint: &Constraint) -> String {
    match constraint {
        Constraint::Required => format!("required parameter '{parameter}' is missing"),
        Constraint::Type { expected } => {
            format!("parameter '{parameter}' must be a valid {expected}")
        }
        Constraint::Gt(n) => format!("parameter '{parameter}' must be greater than {n}"),
        Constraint::Ge(n) => {
            format!("parameter '{parameter}' must be greater than or equal to {n}")
        }
        Constraint::Lt(n) => format!("parameter '{parameter}' must be less than {n}"),
        Constraint::Le(n) => format!("parameter '{parameter}' must be less than or equal to {n}"),
        Constraint::MinLength(n) => {
            format!("parameter '{parameter}' must have a length of at least {n}")
        }
        Constraint::MaxLength(n) => {
            format!("parameter '{parameter}' must have a length of at most {n}")
        }
        Constraint::Pattern(p) => format!("parameter '{parameter}' must match pattern '{p}'"),
    }
}

const SENSITIVE_MARKERS: [&str; 12] = [
    "password",
    "passwd",
    "secret",
    "token",
    "key",
    "auth",
    "credential",
    "session",
    "cookie",
    "private",
    "ssn",
    "pin",
];

/// Returns `true` when a field name looks like it holds a secret.
///
/// Matching is case-insensitive and substring based, so `api_key` and
/// `X-Auth-Token` both qualify.
pub fn is_sensitive_name(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    SENSITIVE_MARKERS.iter().any(|marker| lower.contains(marker))
}

/// Standard error type for Lamina.
///
/// Handlers return `Result<_, LaminaError>`; the error translator turns any
/// variant into a JSON error body with the status of its [`ErrorKind`].
///
/// # Example
///
/// ```
/// use lamina_core::{ErrorKind, LaminaError};
///
/// fn load(id: i64) -> Result<(), LaminaError> {
///     Err(LaminaError::not_found_resource("User", id.to_string()))
/// }
///
/// let err = load(7).unwrap_err();
/// assert_eq!(err.kind(), ErrorKind::NotFound);
/// assert_eq!(err.status_code().as_u16(), 404);
/// ```
#[derive(Error, Debug)]
pub enum LaminaError {
    /// A single parameter failed resolution.
    #[error(transparent)]
    Validation(ValidationFailure),

    /// Several parameters failed; reported together.
    #[error("{message}")]
    ValidationSet {
        /// Summary message.
        message: String,
        /// The individual failures, in declaration order.
        failures: Vec<ValidationFailure>,
    },

    /// Authentication failed.
    #[error("{message}")]
    Authentication {
        /// Human-readable error message.
        message: String,
    },

    /// Authorization denied.
    #[error("{message}")]
    Authorization {
        /// Human-readable error message.
        message: String,
        /// Role of the rejected caller, if known.
        user_role: Option<String>,
        /// Roles that would have been accepted.
        required_roles: Vec<String>,
    },

    /// Route or resource not found.
    #[error("{message}")]
    NotFound {
        /// Human-readable error message.
        message: String,
        /// The type of resource that was not found.
        resource_type: Option<String>,
        /// The identifier of the resource.
        resource_id: Option<String>,
    },

    /// The path is known but not for this method.
    #[error("{message}")]
    MethodNotAllowed {
        /// Human-readable error message.
        message: String,
        /// Methods registered for the path.
        allowed: Vec<Method>,
    },

    /// Conflict with the current resource state.
    #[error("{message}")]
    Conflict {
        /// Human-readable error message.
        message: String,
        /// The conflicting resource, if named.
        resource: Option<String>,
    },

    /// Rate limit exceeded.
    #[error("{message}")]
    RateLimited {
        /// Human-readable error message.
        message: String,
        /// Seconds until the caller may retry.
        retry_after_seconds: Option<u64>,
    },

    /// The operation timed out.
    #[error("{message}")]
    Timeout {
        /// Human-readable error message.
        message: String,
        /// The timeout that elapsed.
        timeout_seconds: Option<u64>,
    },

    /// Internal error. The message is logged, never returned to clients.
    #[error("{message}")]
    Internal {
        /// Message for server-side logs.
        message: String,
        /// The underlying error (not exposed to clients).
        #[source]
        source: Option<anyhow::Error>,
    },

    /// A dependency is unavailable.
    #[error("{message}")]
    ProviderUnavailable {
        /// Human-readable error message.
        message: String,
        /// Name of the unavailable dependency.
        service: Option<String>,
        /// Seconds until the caller may retry.
        retry_after_seconds: Option<u64>,
    },

    /// An application-defined error, matched by its concrete type.
    #[error(transparent)]
    Application(Box<dyn std::error::Error + Send + Sync + 'static>),

    /// Any other failure.
    #[error("unhandled error: {0}")]
    Unhandled(anyhow::Error),
}

impl LaminaError {
    /// Creates an aggregated validation error.
    pub fn validation_set(failures: Vec<ValidationFailure>) -> Self {
        let message = match failures.as_slice() {
            [single] => single.message().to_string(),
            _ => format!("{} parameters failed validation", failures.len()),
        };
        Self::ValidationSet { message, failures }
    }

    /// Creates an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    /// Creates an authorization error.
    pub fn authorization(message: impl Into<String>) -> Self {
        Self::Authorization {
            message: message.into(),
            user_role: None,
            required_roles: Vec::new(),
        }
    }

    /// Creates an authorization error for a failed role gate.
    pub fn role_denied<I, S>(user_role: Option<&str>, required_roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let required_roles: Vec<String> = required_roles.into_iter().map(Into::into).collect();
        Self::Authorization {
            message: format!("one of roles [{}] is required", required_roles.join(", ")),
            user_role: user_role.map(ToString::to_string),
            required_roles,
        }
    }

    /// Creates a not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            resource_type: None,
            resource_id: None,
        }
    }

    /// Creates a not found error with resource context.
    pub fn not_found_resource(
        resource_type: impl Into<String>,
        resource_id: impl Into<String>,
    ) -> Self {
        let resource_type = resource_type.into();
        let resource_id = resource_id.into();
        Self::NotFound {
            message: format!("{resource_type} with ID '{resource_id}' not found"),
            resource_type: Some(resource_type),
            resource_id: Some(resource_id),
        }
    }

    /// Creates a method-not-allowed error listing the registered methods.
    pub fn method_not_allowed(method: &Method, allowed: Vec<Method>) -> Self {
        Self::MethodNotAllowed {
            message: format!("method {method} is not allowed for this path"),
            allowed,
        }
    }

    /// Creates a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
            resource: None,
        }
    }

    /// Creates a rate limited error.
    pub fn rate_limited(message: impl Into<String>, retry_after_seconds: Option<u64>) -> Self {
        Self::RateLimited {
            message: message.into(),
            retry_after_seconds,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(message: impl Into<String>, timeout_seconds: Option<u64>) -> Self {
        Self::Timeout {
            message: message.into(),
            timeout_seconds,
        }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an internal error with a source error.
    pub fn internal_with_source(
        message: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::Internal {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Creates a provider-unavailable error.
    pub fn provider_unavailable(
        service: impl Into<String>,
        retry_after_seconds: Option<u64>,
    ) -> Self {
        let service = service.into();
        Self::ProviderUnavailable {
            message: format!("{service} is temporarily unavailable"),
            service: Some(service),
            retry_after_seconds,
        }
    }

    /// Wraps an application-defined error so it can be matched by type.
    pub fn application<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Application(Box::new(error))
    }

    /// Wraps any other error as unhandled.
    pub fn unhandled(error: impl Into<anyhow::Error>) -> Self {
        Self::Unhandled(error.into())
    }

    /// Returns the taxonomy kind.
    ///
    /// Application and unhandled errors report [`ErrorKind::Internal`].
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) | Self::ValidationSet { .. } => ErrorKind::Validation,
            Self::Authentication { .. } => ErrorKind::Authentication,
            Self::Authorization { .. } => ErrorKind::Authorization,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::MethodNotAllowed { .. } => ErrorKind::MethodNotAllowed,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::RateLimited { .. } => ErrorKind::RateLimited,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::ProviderUnavailable { .. } => ErrorKind::ProviderUnavailable,
            Self::Internal { .. } | Self::Application(_) | Self::Unhandled(_) => {
                ErrorKind::Internal
            }
        }
    }

    /// Returns the HTTP status code for this error.
    pub const fn status_code(&self) -> StatusCode {
        self.kind().default_status_code()
    }

    /// Returns `true` for failures whose message must not reach clients.
    pub const fn is_opaque(&self) -> bool {
        matches!(
            self,
            Self::Internal { .. } | Self::Application(_) | Self::Unhandled(_)
        )
    }

    /// Returns the retry hint carried by rate-limit and availability errors.
    pub const fn retry_after(&self) -> Option<u64> {
        match self {
            Self::RateLimited {
                retry_after_seconds,
                ..
            }
            | Self::ProviderUnavailable {
                retry_after_seconds,
                ..
            } => *retry_after_seconds,
            _ => None,
        }
    }

    /// Returns the application error if it has type `E`.
    pub fn downcast_application<E>(&self) -> Option<&E>
    where
        E: std::error::Error + 'static,
    {
        match self {
            Self::Application(inner) => inner.downcast_ref::<E>(),
            _ => None,
        }
    }

    /// Returns the kind-specific `details` mapping.
    pub fn details(&self) -> Value {
        match self {
            Self::Validation(failure) => failure.details(),
            Self::ValidationSet { failures, .. } => json!({
                "errors": failures.iter().map(ValidationFailure::details).collect::<Vec<_>>()
            }),
            Self::Authorization {
                user_role,
                required_roles,
                ..
            } if !required_roles.is_empty() => json!({
                "user_role": user_role,
                "required_roles": required_roles,
            }),
            Self::NotFound {
                resource_type: Some(rt),
                resource_id: Some(rid),
                ..
            } => json!({
                "resource_type": rt,
                "resource_id": rid
            }),
            Self::MethodNotAllowed { allowed, .. } => json!({
                "allowed_methods": allowed.iter().map(Method::as_str).collect::<Vec<_>>()
            }),
            Self::Conflict {
                resource: Some(resource),
                ..
            } => json!({ "resource": resource }),
            Self::RateLimited {
                retry_after_seconds: Some(seconds),
                ..
            } => json!({ "retry_after": seconds }),
            Self::Timeout {
                timeout_seconds: Some(seconds),
                ..
            } => json!({ "timeout_seconds": seconds }),
            Self::ProviderUnavailable {
                service,
                retry_after_seconds,
                ..
            } => {
                let mut details = Map::new();
                if let Some(service) = service {
                    details.insert("service".into(), Value::from(service.as_str()));
                }
                if let Some(seconds) = retry_after_seconds {
                    details.insert("retry_after".into(), Value::from(*seconds));
                }
                Value::Object(details)
            }
            _ => Value::Object(Map::new()),
        }
    }

    /// Builds the serializable error body.
    ///
    /// Opaque failures (internal, application, unhandled) are rendered with a
    /// generic message; pass the correlating `error_id` so the body can be
    /// matched to server-side logs.
    pub fn to_body(&self, request_id: Option<&str>, error_id: Option<&str>) -> ErrorBody {
        let kind = self.kind();
        let (message, details) = if self.is_opaque() {
            let mut details = Map::new();
            if let Some(id) = error_id {
                details.insert("error_id".into(), Value::from(id));
            }
            (
                "An unexpected error occurred".to_string(),
                Value::Object(details),
            )
        } else {
            (self.to_string(), self.details())
        };

        ErrorBody {
            error: kind.code().to_string(),
            message,
            status_code: kind.default_status_code().as_u16(),
            details,
            request_id: request_id.map(ToString::to_string),
        }
    }
}

impl From<ValidationFailure> for LaminaError {
    fn from(failure: ValidationFailure) -> Self {
        Self::Validation(failure)
    }
}

impl From<anyhow::Error> for LaminaError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unhandled(error)
    }
}

/// Serializable error body returned to clients.
///
/// ```json
/// {"error": "NOT_FOUND", "message": "...", "status_code": 404, "details": {}}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable error message.
    pub message: String,
    /// HTTP status code, repeated for clients that only see the body.
    pub status_code: u16,
    /// Kind-specific details; an empty object when there are none.
    pub details: Value,
    /// The request ID for correlation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl ErrorBody {
    /// Creates a body with a custom code, for application error handlers.
    pub fn new(code: impl Into<String>, message: impl Into<String>, status: StatusCode) -> Self {
        Self {
            error: code.into(),
            message: message.into(),
            status_code: status.as_u16(),
            details: Value::Object(Map::new()),
            request_id: None,
        }
    }

    /// Replaces the details mapping.
    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }

    /// Sets the correlation request ID.
    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Converts the body to a JSON value.
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("error".into(), Value::from(self.error.as_str()));
        map.insert("message".into(), Value::from(self.message.as_str()));
        map.insert("status_code".into(), Value::from(self.status_code));
        map.insert("details".into(), self.details.clone());
        if let Some(id) = &self.request_id {
            map.insert("request_id".into(), Value::from(id.as_str()));
        }
        Value::Object(map)
    }
}
