//! Responses and handler return normalization.
//!
//! Handlers may return anything implementing [`IntoResponse`]. The rules:
//!
//! - a [`Response`] passes through unchanged
//! - JSON objects and arrays (including [`Json`]) become `200` JSON bodies
//! - scalars (strings, numbers, booleans) become `{"result": value}`
//! - `()` becomes `200` with `{}`
//! - `(StatusCode, R)` normalizes `R` and then overrides the status

use crate::error::LaminaError;
use http::header::{HeaderName, CONTENT_TYPE};
use http::{HeaderMap, HeaderValue, StatusCode};
use serde::Serialize;
use serde_json::{json, Map, Value};

/// JSON content type.
pub const APPLICATION_JSON: &str = "application/json";

/// Response payload before serialization.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// No payload; serialized as the empty string.
    Empty,
    /// Pre-serialized text.
    Text(String),
    /// Structured payload; serialized as JSON with a JSON content type.
    Json(Value),
}

impl Body {
    /// Returns `true` for [`Body::Json`].
    pub const fn is_structured(&self) -> bool {
        matches!(self, Self::Json(_))
    }

    /// Serializes the payload to the string the platform expects.
    pub fn to_text(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Text(text) => text.clone(),
            Self::Json(value) => value.to_string(),
        }
    }
}

/// An HTTP response before it is converted to the platform envelope.
///
/// # Example
///
/// ```
/// use lamina_core::Response;
/// use http::StatusCode;
/// use serde_json::json;
///
/// let response = Response::json(json!({"id": 1}))
///     .with_status(StatusCode::CREATED)
///     .with_header("x-request-id", "abc");
///
/// assert_eq!(response.status(), StatusCode::CREATED);
/// assert_eq!(response.header("content-type"), Some("application/json"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Body,
}

impl Response {
    /// Creates an empty response with the given status.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: Body::Empty,
        }
    }

    /// Creates a `200` JSON response.
    pub fn json(value: Value) -> Self {
        Self::new(StatusCode::OK).with_body(Body::Json(value))
    }

    /// Creates a `200` plain-text response.
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(StatusCode::OK)
            .with_body(Body::Text(text.into()))
            .with_header("content-type", "text/plain; charset=utf-8")
    }

    /// Creates a `204 No Content` response.
    pub fn no_content() -> Self {
        Self::new(StatusCode::NO_CONTENT)
    }

    /// Serializes `value` into a `200` JSON response.
    pub fn serialize<T: Serialize>(value: &T) -> Result<Self, LaminaError> {
        serde_json::to_value(value)
            .map(Self::json)
            .map_err(|e| LaminaError::internal_with_source("failed to serialize response", e))
    }

    /// Sets the status.
    #[must_use]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Replaces the body and sets a JSON content type for structured bodies.
    #[must_use]
    pub fn with_body(mut self, body: Body) -> Self {
        if body.is_structured() && !self.headers.contains_key(CONTENT_TYPE) {
            self.headers
                .insert(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));
        }
        self.body = body;
        self
    }

    /// Sets a header, replacing earlier values. Invalid pairs are ignored.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.set_header(name, value);
        self
    }

    /// Sets a header in place, replacing earlier values. Invalid pairs are ignored.
    pub fn set_header(&mut self, name: &str, value: &str) {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                self.headers.insert(name, value);
            }
            _ => tracing::debug!(header = name, "skipping invalid response header"),
        }
    }

    /// Returns the status.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns mutable headers.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Returns the first value of a header.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns the body.
    pub fn body(&self) -> &Body {
        &self.body
    }
}

/// Wraps a serializable value so it is returned as JSON.
///
/// Objects and arrays become the body directly; scalars are wrapped as
/// `{"result": value}` like any other scalar return.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Json<T>(pub T);

/// Conversion from handler return values into a [`Response`].
pub trait IntoResponse {
    /// Performs the conversion.
    fn into_response(self) -> Result<Response, LaminaError>;
}

impl IntoResponse for Response {
    fn into_response(self) -> Result<Response, LaminaError> {
        Ok(self)
    }
}

impl IntoResponse for Value {
    fn into_response(self) -> Result<Response, LaminaError> {
        Ok(match self {
            Value::Object(_) | Value::Array(_) => Response::json(self),
            Value::Null => Response::json(Value::Object(Map::new())),
            scalar => Response::json(json!({ "result": scalar })),
        })
    }
}

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Result<Response, LaminaError> {
        serde_json::to_value(&self.0)
            .map_err(|e| LaminaError::internal_with_source("failed to serialize response", e))?
            .into_response()
    }
}

impl IntoResponse for () {
    fn into_response(self) -> Result<Response, LaminaError> {
        Ok(Response::json(Value::Object(Map::new())))
    }
}

impl IntoResponse for String {
    fn into_response(self) -> Result<Response, LaminaError> {
        Value::String(self).into_response()
    }
}

impl IntoResponse for &'static str {
    fn into_response(self) -> Result<Response, LaminaError> {
        Value::from(self).into_response()
    }
}

macro_rules! scalar_into_response {
    ($($ty:ty),*) => {
        $(
            impl IntoResponse for $ty {
                fn into_response(self) -> Result<Response, LaminaError> {
                    Value::from(self).into_response()
                }
            }
        )*
    };
}

scalar_into_response!(bool, i32, i64, u32, u64, f64);

impl<R: IntoResponse> IntoResponse for (StatusCode, R) {
    fn into_response(self) -> Result<Response, LaminaError> {
        let (status, inner) = self;
        inner.into_response().map(|r| r.with_status(status))
    }
}

impl<R: IntoResponse> IntoResponse for Result<R, LaminaError> {
    fn into_response(self) -> Result<Response, LaminaError> {
        self.and_then(IntoResponse::into_response)
    }
}
