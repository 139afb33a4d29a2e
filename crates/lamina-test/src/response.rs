//! Test response wrapper.

use std::fmt;

use http::{header, StatusCode};
use lamina_core::ProxyResponse;
use serde::de::DeserializeOwned;

use crate::error::TestError;

/// A response envelope with helper methods for assertions.
#[derive(Clone, PartialEq, Eq)]
pub struct TestResponse {
    inner: ProxyResponse,
}

impl TestResponse {
    /// Wraps a response envelope.
    pub fn new(inner: ProxyResponse) -> Self {
        Self { inner }
    }

    /// Returns the status code.
    ///
    /// Codes outside the valid range read as 500.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.inner.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Returns the status code as a u16.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        self.inner.status_code
    }

    /// Returns true if the status is successful (2xx).
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status().is_success()
    }

    /// Returns true if the status is a client error (4xx).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.status().is_client_error()
    }

    /// Returns true if the status is a server error (5xx).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status().is_server_error()
    }

    /// Gets a header value by name, case-insensitively.
    #[must_use]
    pub fn header(&self, name: impl AsRef<str>) -> Option<&str> {
        self.inner.header(name.as_ref())
    }

    /// Returns true if the header is present.
    #[must_use]
    pub fn has_header(&self, name: impl AsRef<str>) -> bool {
        self.header(name).is_some()
    }

    /// Returns the Content-Type header value.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header(header::CONTENT_TYPE.as_str())
    }

    /// Returns the serialized body.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.inner.body
    }

    /// Deserializes the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, TestError> {
        serde_json::from_str(&self.inner.body).map_err(TestError::Json)
    }

    /// Deserializes the body as a JSON Value.
    pub fn json_value(&self) -> Result<serde_json::Value, TestError> {
        self.json()
    }

    /// Returns the `error` code of a structured error body, if any.
    #[must_use]
    pub fn error_code(&self) -> Option<String> {
        let body: serde_json::Value = self.json().ok()?;
        body.get("error")?.as_str().map(ToString::to_string)
    }

    /// Returns the underlying envelope.
    #[must_use]
    pub fn into_inner(self) -> ProxyResponse {
        self.inner
    }

    // Assertion methods

    /// Asserts that the status code equals the expected value.
    ///
    /// # Panics
    ///
    /// Panics if the status code doesn't match.
    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(
            self.status(),
            expected,
            "Expected status {}, got {} with body: {}",
            expected,
            self.status(),
            self.inner.body
        );
        self
    }

    /// Asserts that the status code equals the expected u16 value.
    ///
    /// # Panics
    ///
    /// Panics if the status code doesn't match.
    pub fn assert_status_code(&self, expected: u16) -> &Self {
        assert_eq!(
            self.inner.status_code, expected,
            "Expected status {}, got {} with body: {}",
            expected, self.inner.status_code, self.inner.body
        );
        self
    }

    /// Asserts that the response is successful (2xx).
    ///
    /// # Panics
    ///
    /// Panics if the status is not 2xx.
    pub fn assert_success(&self) -> &Self {
        assert!(
            self.is_success(),
            "Expected success status, got {} with body: {}",
            self.inner.status_code,
            self.inner.body
        );
        self
    }

    /// Asserts that a header exists with the expected value.
    ///
    /// # Panics
    ///
    /// Panics if the header doesn't exist or doesn't match.
    pub fn assert_header(&self, name: impl AsRef<str>, expected: impl AsRef<str>) -> &Self {
        let name = name.as_ref();
        let expected = expected.as_ref();
        let actual = self
            .header(name)
            .unwrap_or_else(|| panic!("Header '{}' not found in {:?}", name, self.inner.headers));
        assert_eq!(
            actual, expected,
            "Header '{}': expected '{}', got '{}'",
            name, expected, actual
        );
        self
    }

    /// Asserts that a header is absent.
    ///
    /// # Panics
    ///
    /// Panics if the header exists.
    pub fn assert_no_header(&self, name: impl AsRef<str>) -> &Self {
        let name = name.as_ref();
        assert!(
            !self.has_header(name),
            "Header '{}' should be absent, got '{}'",
            name,
            self.header(name).unwrap_or_default()
        );
        self
    }

    /// Asserts that the body is empty.
    ///
    /// # Panics
    ///
    /// Panics if the body is not empty.
    pub fn assert_body_empty(&self) -> &Self {
        assert!(
            self.inner.body.is_empty(),
            "Body should be empty, got: {}",
            self.inner.body
        );
        self
    }

    /// Asserts that the body contains the expected substring.
    ///
    /// # Panics
    ///
    /// Panics if the body doesn't contain the substring.
    pub fn assert_body_contains(&self, expected: impl AsRef<str>) -> &Self {
        let expected = expected.as_ref();
        assert!(
            self.inner.body.contains(expected),
            "Body should contain '{}', got: {}",
            expected,
            self.inner.body
        );
        self
    }

    /// Asserts that the JSON body matches the expected value.
    ///
    /// # Panics
    ///
    /// Panics if the JSON doesn't match.
    pub fn assert_json_eq(&self, expected: &serde_json::Value) -> &Self {
        let actual: serde_json::Value = self.json().expect("Body should be valid JSON");
        assert_eq!(&actual, expected, "JSON body mismatch");
        self
    }

    /// Asserts that a JSON field exists and equals the expected value.
    ///
    /// `path` is dot-separated; numeric segments index arrays.
    ///
    /// # Panics
    ///
    /// Panics if the field doesn't exist or doesn't match.
    pub fn assert_json_field(&self, path: impl AsRef<str>, expected: &serde_json::Value) -> &Self {
        let path = path.as_ref();
        let json: serde_json::Value = self.json().expect("Body should be valid JSON");
        let actual = json_path(&json, path).unwrap_or_else(|| {
            panic!("JSON path '{}' not found in: {:?}", path, json);
        });
        assert_eq!(
            actual, expected,
            "JSON field '{}': expected {:?}, got {:?}",
            path, expected, actual
        );
        self
    }

    /// Asserts that the body is a structured error with the given code.
    ///
    /// # Panics
    ///
    /// Panics if the body is not an error body or the code differs.
    pub fn assert_error_code(&self, expected: impl AsRef<str>) -> &Self {
        let expected = expected.as_ref();
        let actual = self
            .error_code()
            .unwrap_or_else(|| panic!("Body is not an error body: {}", self.inner.body));
        assert_eq!(actual, expected, "Error code mismatch");
        self
    }
}

impl From<ProxyResponse> for TestResponse {
    fn from(inner: ProxyResponse) -> Self {
        Self::new(inner)
    }
}

impl fmt::Debug for TestResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestResponse")
            .field("status", &self.inner.status_code)
            .field("headers", &self.inner.headers)
            .field("body_len", &self.inner.body.len())
            .finish()
    }
}

/// Simple JSON path accessor.
fn json_path<'a>(value: &'a serde_json::Value, path: &str) -> Option<&'a serde_json::Value> {
    let mut current = value;
    for segment in path.split('.') {
        if segment.is_empty() {
            continue;
        }
        if let Ok(index) = segment.parse::<usize>() {
            current = current.get(index)?;
        } else {
            current = current.get(segment)?;
        }
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn create_response(status: u16, body: &str) -> TestResponse {
        let mut headers = BTreeMap::new();
        headers.insert("content-type".to_string(), "application/json".to_string());
        TestResponse::new(ProxyResponse {
            status_code: status,
            headers,
            body: body.to_string(),
            is_base64_encoded: false,
        })
    }

    #[test]
    fn test_status_helpers() {
        let response = create_response(201, "{}");
        assert_eq!(response.status(), StatusCode::CREATED);
        assert!(response.is_success());
        assert!(!response.is_client_error());

        let response = create_response(503, "{}");
        assert!(response.is_server_error());
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let response = create_response(200, "{}");
        assert_eq!(response.header("Content-Type"), Some("application/json"));
        assert_eq!(response.content_type(), Some("application/json"));
        assert!(!response.has_header("allow"));
        response.assert_no_header("allow");
    }

    #[test]
    fn test_json_field_paths() {
        let response = create_response(200, r#"{"user":{"tags":["a","b"]}}"#);
        response
            .assert_json_field("user.tags.1", &json!("b"))
            .assert_success();
        assert_eq!(json_path(&response.json_value().unwrap(), "user.missing"), None);
    }

    #[test]
    fn test_error_code() {
        let response = create_response(
            404,
            r#"{"error":"NOT_FOUND","message":"no route","status_code":404,"details":{}}"#,
        );
        assert_eq!(response.error_code().as_deref(), Some("NOT_FOUND"));
        response.assert_error_code("NOT_FOUND").assert_status_code(404);

        assert_eq!(create_response(204, "").error_code(), None);
    }

    #[test]
    #[should_panic(expected = "Expected status")]
    fn test_assert_status_panics() {
        create_response(400, "{}").assert_status(StatusCode::OK);
    }

    #[test]
    fn test_body_assertions() {
        create_response(204, "").assert_body_empty();
        create_response(200, r#"{"id":42}"#)
            .assert_body_contains("42")
            .assert_json_eq(&json!({"id": 42}));
    }
}
