//! The normalized request.
//!
//! A [`Request`] is built once per invocation from the platform event. After
//! routing fills in the captured path parameters it is never mutated again,
//! except for the lazily-filled body caches.

use crate::error::{ParamSource, ValidationFailure};
use base64::Engine;
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use indexmap::IndexMap;
use lamina_router::PathParams;
use serde_json::Value;
use std::sync::OnceLock;

/// Query string parameters, keyed by name, each possibly multi-valued.
///
/// Keys keep the order in which they first appeared.
///
/// # Example
///
/// ```
/// use lamina_core::QueryParams;
///
/// let mut query = QueryParams::new();
/// query.append("tag", "a");
/// query.append("tag", "b");
/// query.append("limit", "10");
///
/// assert_eq!(query.get("tag"), Some("a"));
/// assert_eq!(query.get_all("tag"), ["a", "b"]);
/// assert_eq!(query.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    inner: IndexMap<String, Vec<String>>,
}

impl QueryParams {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a value, keeping any values already present for `name`.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.inner.entry(name.into()).or_default().push(value.into());
    }

    /// Replaces all values for `name`.
    pub fn set_all(&mut self, name: impl Into<String>, values: Vec<String>) {
        self.inner.insert(name.into(), values);
    }

    /// Returns the first value for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Returns every value for `name`; empty when absent.
    pub fn get_all(&self, name: &str) -> &[String] {
        self.inner.get(name).map_or(&[], Vec::as_slice)
    }

    /// Returns `true` if `name` appeared in the query string.
    pub fn contains_key(&self, name: &str) -> bool {
        self.inner.contains_key(name)
    }

    /// Returns the number of distinct keys.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` when there are no parameters.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Iterates keys with all of their values.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.inner.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut query = Self::new();
        for (k, v) in iter {
            query.append(k, v);
        }
        query
    }
}

/// One HTTP request, normalized from the platform event.
///
/// # Example
///
/// ```
/// use lamina_core::Request;
/// use http::Method;
///
/// let request = Request::new(Method::POST, "/users")
///     .with_header("Content-Type", "application/json")
///     .with_body(r#"{"name": "alice"}"#);
///
/// let body = request.json().unwrap().unwrap();
/// assert_eq!(body["name"], "alice");
/// assert_eq!(request.header("content-type"), Some("application/json"));
/// ```
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    path: String,
    path_params: PathParams,
    query: QueryParams,
    headers: HeaderMap,
    body: Option<String>,
    base64_encoded: bool,
    platform_request_id: Option<String>,
    text: OnceLock<Result<Option<String>, ValidationFailure>>,
    parsed: OnceLock<Result<Option<Value>, ValidationFailure>>,
}

impl Request {
    /// Creates a request with no query, headers, or body.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            path_params: PathParams::new(),
            query: QueryParams::new(),
            headers: HeaderMap::new(),
            body: None,
            base64_encoded: false,
            platform_request_id: None,
            text: OnceLock::new(),
            parsed: OnceLock::new(),
        }
    }

    /// Replaces the query parameters.
    #[must_use]
    pub fn with_query(mut self, query: QueryParams) -> Self {
        self.query = query;
        self
    }

    /// Adds one query parameter value.
    #[must_use]
    pub fn with_query_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.append(name, value);
        self
    }

    /// Replaces the headers.
    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Appends a header. Non-ASCII values are kept as UTF-8; names or values
    /// with control characters are skipped.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_bytes(value.as_bytes()),
        ) {
            (Ok(name), Ok(value)) => {
                self.headers.append(name, value);
            }
            _ => tracing::debug!(header = name, "skipping invalid request header"),
        }
        self
    }

    /// Sets the raw body text.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self.base64_encoded = false;
        self
    }

    /// Sets a base64-encoded body; it is decoded on first access.
    #[must_use]
    pub fn with_base64_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self.base64_encoded = true;
        self
    }

    /// Records the request id assigned by the platform.
    #[must_use]
    pub fn with_platform_request_id(mut self, id: impl Into<String>) -> Self {
        self.platform_request_id = Some(id.into());
        self
    }

    /// Stores the values captured by the route template.
    pub fn set_path_params(&mut self, params: PathParams) {
        self.path_params = params;
    }

    /// Returns the HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the path as received, before any root-path stripping.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns all captured path parameters in template order.
    pub fn path_params(&self) -> &PathParams {
        &self.path_params
    }

    /// Returns one captured path parameter.
    pub fn path_param(&self, name: &str) -> Option<&str> {
        self.path_params.get(name)
    }

    /// Returns the query parameters.
    pub fn query(&self) -> &QueryParams {
        &self.query
    }

    /// Returns the headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the first value of a header, looked up case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(name)
            .and_then(|v| std::str::from_utf8(v.as_bytes()).ok())
    }

    /// Returns every value of a header.
    pub fn header_all(&self, name: &str) -> Vec<&str> {
        self.headers
            .get_all(name)
            .iter()
            .filter_map(|v| std::str::from_utf8(v.as_bytes()).ok())
            .collect()
    }

    /// Returns the body exactly as carried by the event.
    pub fn raw_body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// Returns `true` if the body was marked base64-encoded.
    pub fn is_base64_encoded(&self) -> bool {
        self.base64_encoded
    }

    /// Returns the platform request id, if the event carried one.
    pub fn platform_request_id(&self) -> Option<&str> {
        self.platform_request_id.as_deref()
    }

    /// Returns the decoded body text, or `None` when there is no body.
    ///
    /// Base64 bodies are decoded on first call and cached.
    pub fn text(&self) -> Result<Option<&str>, ValidationFailure> {
        match self.text.get_or_init(|| self.decode_body()) {
            Ok(text) => Ok(text.as_deref()),
            Err(failure) => Err(failure.clone()),
        }
    }

    /// Returns the body parsed as JSON, or `None` when the body is empty.
    ///
    /// The parse runs at most once per request.
    pub fn json(&self) -> Result<Option<&Value>, ValidationFailure> {
        let parsed = self.parsed.get_or_init(|| {
            let Some(text) = self.text()? else {
                return Ok(None);
            };
            if text.trim().is_empty() {
                return Ok(None);
            }
            serde_json::from_str(text).map(Some).map_err(|e| {
                ValidationFailure::invalid_type("body", ParamSource::Body, None, "JSON document")
                    .with_message(format!("request body is not valid JSON: {e}"))
            })
        });

        match parsed {
            Ok(value) => Ok(value.as_ref()),
            Err(failure) => Err(failure.clone()),
        }
    }

    fn decode_body(&self) -> Result<Option<String>, ValidationFailure> {
        let Some(body) = &self.body else {
            return Ok(None);
        };
        if !self.base64_encoded {
            return Ok(Some(body.clone()));
        }

        let bytes = base64::engine::general_purpose::STANDARD
            .decode(body.trim())
            .map_err(|e| {
                ValidationFailure::invalid_type("body", ParamSource::Body, None, "base64 payload")
                    .with_message(format!("request body is not valid base64: {e}"))
            })?;
        String::from_utf8(bytes).map(Some).map_err(|_| {
            ValidationFailure::invalid_type("body", ParamSource::Body, None, "UTF-8 text")
                .with_message("request body is not valid UTF-8")
        })
    }
}
