//! Platform event and response envelopes.
//!
//! The inbound shape follows the API Gateway proxy integration: every field
//! is optional, and `null` maps are treated as empty. Only the method, path,
//! headers, query string, and body are required by dispatch; the rest is
//! carried for correlation.

use crate::error::{LaminaError, ParamSource, ValidationFailure};
use crate::request::{QueryParams, Request};
use crate::response::{Response, APPLICATION_JSON};
use http::header::CONTENT_TYPE;
use http::Method;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Inbound HTTP event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyEvent {
    /// HTTP method; `GET` when absent.
    #[serde(default)]
    pub http_method: Option<String>,
    /// Request path; `/` when absent.
    #[serde(default)]
    pub path: Option<String>,
    /// Single-valued headers.
    #[serde(default)]
    pub headers: Option<HashMap<String, String>>,
    /// Multi-valued headers; preferred over `headers` when present.
    #[serde(default)]
    pub multi_value_headers: Option<HashMap<String, Vec<String>>>,
    /// Single-valued query parameters.
    #[serde(default)]
    pub query_string_parameters: Option<HashMap<String, String>>,
    /// Multi-valued query parameters; preferred over the single-valued map.
    #[serde(default)]
    pub multi_value_query_string_parameters: Option<HashMap<String, Vec<String>>>,
    /// Parameters the platform extracted itself; not used for routing.
    #[serde(default)]
    pub path_parameters: Option<HashMap<String, String>>,
    /// Raw body.
    #[serde(default)]
    pub body: Option<String>,
    /// Whether `body` is base64-encoded.
    #[serde(default)]
    pub is_base64_encoded: bool,
    /// Platform request metadata.
    #[serde(default)]
    pub request_context: Option<ProxyRequestContext>,
}

/// The part of the platform request context Lamina reads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyRequestContext {
    /// Platform-assigned request id.
    #[serde(default)]
    pub request_id: Option<String>,
}

impl ProxyEvent {
    /// Normalizes the event into a [`Request`].
    ///
    /// Query values are percent-decoded once. An unparseable method is a
    /// validation failure.
    pub fn into_request(self) -> Result<Request, LaminaError> {
        let method = match self.http_method.as_deref() {
            None | Some("") => Method::GET,
            Some(raw) => Method::from_bytes(raw.to_ascii_uppercase().as_bytes()).map_err(|_| {
                LaminaError::Validation(
                    ValidationFailure::invalid_type(
                        "httpMethod",
                        ParamSource::Header,
                        Some(raw.into()),
                        "HTTP method",
                    )
                    .with_message(format!("unsupported HTTP method '{raw}'")),
                )
            })?,
        };
        let path = self
            .path
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| "/".to_string());

        let mut request = Request::new(method, path).with_query(decode_query(
            self.query_string_parameters,
            self.multi_value_query_string_parameters,
        ));

        if let Some(headers) = self.multi_value_headers {
            for (name, values) in sorted(headers) {
                for value in values {
                    request = request.with_header(&name, &value);
                }
            }
        } else if let Some(headers) = self.headers {
            for (name, value) in sorted(headers) {
                request = request.with_header(&name, &value);
            }
        }

        if let Some(body) = self.body {
            request = if self.is_base64_encoded {
                request.with_base64_body(body)
            } else {
                request.with_body(body)
            };
        }

        if let Some(id) = self.request_context.and_then(|ctx| ctx.request_id) {
            request = request.with_platform_request_id(id);
        }

        Ok(request)
    }
}

fn sorted<V>(map: HashMap<String, V>) -> BTreeMap<String, V> {
    map.into_iter().collect()
}

fn decode_query(
    single: Option<HashMap<String, String>>,
    multi: Option<HashMap<String, Vec<String>>>,
) -> QueryParams {
    let mut query = QueryParams::new();
    if let Some(multi) = multi {
        for (name, values) in sorted(multi) {
            query.set_all(name, values.iter().map(|v| percent_decode(v)).collect());
        }
    } else if let Some(single) = single {
        for (name, value) in sorted(single) {
            query.append(name, percent_decode(&value));
        }
    }
    query
}

fn percent_decode(value: &str) -> String {
    urlencoding::decode(value).map_or_else(|_| value.to_string(), |decoded| decoded.into_owned())
}

/// Outbound response envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyResponse {
    /// HTTP status code.
    pub status_code: u16,
    /// Response headers; repeated values are joined with `, `.
    pub headers: BTreeMap<String, String>,
    /// Serialized body; always present.
    pub body: String,
    /// Always `false`; bodies are text.
    pub is_base64_encoded: bool,
}

impl ProxyResponse {
    /// Returns a header by lowercase name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Parses the body as JSON.
    pub fn json_body(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

impl From<Response> for ProxyResponse {
    fn from(response: Response) -> Self {
        let mut headers: BTreeMap<String, String> = BTreeMap::new();
        for (name, value) in response.headers() {
            let Ok(value) = value.to_str() else {
                continue;
            };
            headers
                .entry(name.as_str().to_string())
                .and_modify(|existing| {
                    existing.push_str(", ");
                    existing.push_str(value);
                })
                .or_insert_with(|| value.to_string());
        }
        if response.body().is_structured() {
            headers
                .entry(CONTENT_TYPE.as_str().to_string())
                .or_insert_with(|| APPLICATION_JSON.to_string());
        }

        Self {
            status_code: response.status().as_u16(),
            headers,
            body: response.body().to_text(),
            is_base64_encoded: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;
    use serde_json::json;

    #[test]
    fn test_minimal_event_defaults() {
        let event: ProxyEvent = serde_json::from_value(json!({})).unwrap();
        let request = event.into_request().unwrap();
        assert_eq!(request.method(), Method::GET);
        assert_eq!(request.path(), "/");
        assert!(request.query().is_empty());
    }

    #[test]
    fn test_null_maps_are_empty() {
        let event: ProxyEvent = serde_json::from_value(json!({
            "httpMethod": "POST",
            "path": "/users",
            "headers": null,
            "queryStringParameters": null,
            "body": null
        }))
        .unwrap();
        let request = event.into_request().unwrap();
        assert_eq!(request.method(), Method::POST);
        assert!(request.headers().is_empty());
        assert!(request.raw_body().is_none());
    }

    #[test]
    fn test_query_is_percent_decoded() {
        let event: ProxyEvent = serde_json::from_value(json!({
            "path": "/search",
            "queryStringParameters": {"q": "hello%20world", "raw": "100%"}
        }))
        .unwrap();
        let request = event.into_request().unwrap();
        assert_eq!(request.query().get("q"), Some("hello world"));
        assert_eq!(request.query().get("raw"), Some("100%"));
    }

    #[test]
    fn test_multi_value_query_preferred() {
        let event: ProxyEvent = serde_json::from_value(json!({
            "queryStringParameters": {"tag": "b"},
            "multiValueQueryStringParameters": {"tag": ["a", "b"]}
        }))
        .unwrap();
        let request = event.into_request().unwrap();
        assert_eq!(request.query().get_all("tag"), ["a", "b"]);
    }

    #[test]
    fn test_request_context_id() {
        let event: ProxyEvent = serde_json::from_value(json!({
            "requestContext": {"requestId": "abc-123", "stage": "prod"}
        }))
        .unwrap();
        let request = event.into_request().unwrap();
        assert_eq!(request.platform_request_id(), Some("abc-123"));
    }

    #[test]
    fn test_bad_method() {
        let event = ProxyEvent {
            http_method: Some("GE T".into()),
            ..ProxyEvent::default()
        };
        let err = event.into_request().unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_response_envelope() {
        let response = Response::json(json!({"ok": true}))
            .with_status(StatusCode::CREATED)
            .with_header("x-trace", "t1");
        let envelope = ProxyResponse::from(response);
        assert_eq!(envelope.status_code, 201);
        assert_eq!(envelope.header("Content-Type"), Some("application/json"));
        assert_eq!(envelope.header("x-trace"), Some("t1"));
        assert_eq!(envelope.json_body().unwrap(), json!({"ok": true}));

        let serialized = serde_json::to_value(&envelope).unwrap();
        assert_eq!(serialized["statusCode"], 201);
        assert_eq!(serialized["isBase64Encoded"], false);
    }

    #[test]
    fn test_empty_body_is_present() {
        let envelope = ProxyResponse::from(Response::new(StatusCode::NO_CONTENT));
        assert_eq!(envelope.body, "");
        assert!(envelope.header("content-type").is_none());
    }
}
