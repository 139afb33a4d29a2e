//! Test event building.

use std::collections::HashMap;

use base64::Engine;
use http::{header, HeaderName, Method};
use lamina_core::{ProxyEvent, ProxyRequestContext};
use serde::Serialize;

use crate::error::TestError;

/// A request ready to be turned into a [`ProxyEvent`].
///
/// Query values are stored percent-encoded, the way the platform delivers
/// them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestRequest {
    /// HTTP method
    pub method: Method,
    /// Path without the query string
    pub path: String,
    /// Headers in insertion order; names may repeat
    pub headers: Vec<(String, String)>,
    /// Query pairs in insertion order; names may repeat
    pub query: Vec<(String, String)>,
    /// Raw body
    pub body: Option<String>,
    /// Whether `body` is base64-encoded
    pub is_base64_encoded: bool,
    /// Platform request id
    pub request_id: Option<String>,
}

impl TestRequest {
    /// Creates a new GET request.
    pub fn get(uri: impl AsRef<str>) -> TestRequestBuilder {
        TestRequestBuilder::new(Method::GET, uri)
    }

    /// Creates a new POST request.
    pub fn post(uri: impl AsRef<str>) -> TestRequestBuilder {
        TestRequestBuilder::new(Method::POST, uri)
    }

    /// Creates a new PUT request.
    pub fn put(uri: impl AsRef<str>) -> TestRequestBuilder {
        TestRequestBuilder::new(Method::PUT, uri)
    }

    /// Creates a new PATCH request.
    pub fn patch(uri: impl AsRef<str>) -> TestRequestBuilder {
        TestRequestBuilder::new(Method::PATCH, uri)
    }

    /// Creates a new DELETE request.
    pub fn delete(uri: impl AsRef<str>) -> TestRequestBuilder {
        TestRequestBuilder::new(Method::DELETE, uri)
    }

    /// Creates a new OPTIONS request.
    pub fn options(uri: impl AsRef<str>) -> TestRequestBuilder {
        TestRequestBuilder::new(Method::OPTIONS, uri)
    }

    /// Converts this request into the platform event envelope.
    ///
    /// Headers and query parameters are written to both the single- and
    /// multi-valued maps; the single-valued map keeps the last value.
    pub fn into_event(self) -> ProxyEvent {
        let (headers, multi_value_headers) = split_pairs(self.headers);
        let (query, multi_value_query) = split_pairs(self.query);

        ProxyEvent {
            http_method: Some(self.method.as_str().to_string()),
            path: Some(self.path),
            headers,
            multi_value_headers,
            query_string_parameters: query,
            multi_value_query_string_parameters: multi_value_query,
            path_parameters: None,
            body: self.body,
            is_base64_encoded: self.is_base64_encoded,
            request_context: Some(ProxyRequestContext {
                request_id: self.request_id,
            }),
        }
    }
}

fn split_pairs(
    pairs: Vec<(String, String)>,
) -> (
    Option<HashMap<String, String>>,
    Option<HashMap<String, Vec<String>>>,
) {
    if pairs.is_empty() {
        return (None, None);
    }
    let mut single = HashMap::new();
    let mut multi: HashMap<String, Vec<String>> = HashMap::new();
    for (name, value) in pairs {
        single.insert(name.clone(), value.clone());
        multi.entry(name).or_default().push(value);
    }
    (Some(single), Some(multi))
}

/// Builder for constructing test requests.
#[must_use]
#[derive(Debug)]
pub struct TestRequestBuilder {
    method: Method,
    uri: String,
    headers: Vec<(String, String)>,
    query: Vec<(String, String)>,
    body: Option<String>,
    is_base64_encoded: bool,
    request_id: Option<String>,
    error: Option<TestError>,
}

impl TestRequestBuilder {
    /// Creates a new request builder. A query string in `uri` is kept as-is.
    pub fn new(method: Method, uri: impl AsRef<str>) -> Self {
        Self {
            method,
            uri: uri.as_ref().to_string(),
            headers: Vec::new(),
            query: Vec::new(),
            body: None,
            is_base64_encoded: false,
            request_id: None,
            error: None,
        }
    }

    /// Adds a header. Repeated names produce multi-valued headers.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        let name = name.as_ref();
        if HeaderName::from_bytes(name.as_bytes()).is_err() {
            self.error
                .get_or_insert_with(|| TestError::InvalidHeader(name.to_string()));
            return self;
        }
        self.headers
            .push((name.to_string(), value.as_ref().to_string()));
        self
    }

    /// Adds a query parameter; the value is percent-encoded.
    pub fn query(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.query.push((
            name.as_ref().to_string(),
            urlencoding::encode(value.as_ref()).into_owned(),
        ));
        self
    }

    /// Sets the Content-Type header.
    pub fn content_type(self, content_type: impl AsRef<str>) -> Self {
        self.header(header::CONTENT_TYPE.as_str(), content_type)
    }

    /// Sets the Authorization header with a Bearer token.
    pub fn bearer_token(self, token: impl AsRef<str>) -> Self {
        self.header(
            header::AUTHORIZATION.as_str(),
            format!("Bearer {}", token.as_ref()),
        )
    }

    /// Sets the Origin header.
    pub fn origin(self, origin: impl AsRef<str>) -> Self {
        self.header(header::ORIGIN.as_str(), origin)
    }

    /// Sets the platform request id.
    pub fn request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }

    /// Sets the raw request body.
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self.is_base64_encoded = false;
        self
    }

    /// Sets a binary body, base64-encoded in the event.
    pub fn binary_body(mut self, bytes: impl AsRef<[u8]>) -> Self {
        self.body = Some(base64::engine::general_purpose::STANDARD.encode(bytes));
        self.is_base64_encoded = true;
        self
    }

    /// Sets the request body as JSON and the Content-Type header.
    pub fn json<T: Serialize>(mut self, value: &T) -> Self {
        match serde_json::to_string(value) {
            Ok(body) => {
                self.body = Some(body);
                self.is_base64_encoded = false;
                self.content_type("application/json")
            }
            Err(e) => {
                self.error.get_or_insert(TestError::Json(e));
                self
            }
        }
    }

    /// Builds the test request.
    pub fn build(self) -> Result<TestRequest, TestError> {
        if let Some(err) = self.error {
            return Err(err);
        }

        let (path, raw_query) = match self.uri.split_once('?') {
            Some((path, query)) => (path.to_string(), Some(query.to_string())),
            None => (self.uri, None),
        };
        if !path.starts_with('/') {
            return Err(TestError::RequestBuild(format!(
                "path must start with '/': {path:?}"
            )));
        }

        let mut query: Vec<(String, String)> = raw_query
            .iter()
            .flat_map(|q| q.split('&'))
            .filter(|pair| !pair.is_empty())
            .map(|pair| match pair.split_once('=') {
                Some((name, value)) => (name.to_string(), value.to_string()),
                None => (pair.to_string(), String::new()),
            })
            .collect();
        query.extend(self.query);

        Ok(TestRequest {
            method: self.method,
            path,
            headers: self.headers,
            query,
            body: self.body,
            is_base64_encoded: self.is_base64_encoded,
            request_id: self.request_id,
        })
    }
}
