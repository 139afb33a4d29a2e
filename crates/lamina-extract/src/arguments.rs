//! Resolved handler arguments.

use crate::value::ArgValue;
use indexmap::IndexMap;
use lamina_core::{Identity, LaminaError, ParamSource, Request, SharedIdentity, ValidationFailure};
use serde::de::DeserializeOwned;

/// The values resolved for one invocation, keyed by parameter name.
///
/// Typed getters return `None` when the parameter is undeclared, absent, or
/// of another type. [`get`](Self::get) deserializes into any type and reports
/// mismatches as errors.
///
/// # Example
///
/// ```rust
/// use lamina_core::Request;
/// use lamina_extract::{ArgValue, Arguments};
/// use http::Method;
///
/// let mut args = Arguments::new(Request::new(Method::GET, "/users/42"));
/// args.insert("user_id", ArgValue::Integer(42));
/// args.insert("q", ArgValue::Null);
///
/// assert_eq!(args.integer("user_id"), Some(42));
/// assert_eq!(args.get::<Option<String>>("q").unwrap(), None);
/// ```
#[derive(Debug, Clone)]
pub struct Arguments {
    values: IndexMap<String, ArgValue>,
    sources: IndexMap<String, ParamSource>,
    request: Request,
}

impl Arguments {
    /// Creates an empty set bound to `request`.
    pub fn new(request: Request) -> Self {
        Self {
            values: IndexMap::new(),
            sources: IndexMap::new(),
            request,
        }
    }

    /// Stores a value.
    pub fn insert(&mut self, name: impl Into<String>, value: ArgValue) {
        self.values.insert(name.into(), value);
    }

    pub(crate) fn insert_from(&mut self, name: &str, source: ParamSource, value: ArgValue) {
        self.sources.insert(name.to_string(), source);
        self.values.insert(name.to_string(), value);
    }

    /// Returns the raw resolved value.
    pub fn value(&self, name: &str) -> Option<&ArgValue> {
        self.values.get(name)
    }

    /// Returns `true` if `name` resolved to a non-null value.
    pub fn is_present(&self, name: &str) -> bool {
        self.values.get(name).is_some_and(|v| !v.is_null())
    }

    /// Returns an integer parameter.
    pub fn integer(&self, name: &str) -> Option<i64> {
        match self.values.get(name)? {
            ArgValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns a float parameter. Integers widen.
    #[allow(clippy::cast_precision_loss)]
    pub fn float(&self, name: &str) -> Option<f64> {
        match self.values.get(name)? {
            ArgValue::Float(n) => Some(*n),
            ArgValue::Integer(n) => Some(*n as f64),
            _ => None,
        }
    }

    /// Returns a string parameter.
    pub fn string(&self, name: &str) -> Option<&str> {
        match self.values.get(name)? {
            ArgValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Returns a boolean parameter.
    pub fn bool(&self, name: &str) -> Option<bool> {
        match self.values.get(name)? {
            ArgValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns a list parameter.
    pub fn list(&self, name: &str) -> Option<&[ArgValue]> {
        match self.values.get(name)? {
            ArgValue::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// Returns an identity parameter; `None` when optional authentication failed.
    pub fn identity(&self, name: &str) -> Option<&SharedIdentity> {
        match self.values.get(name)? {
            ArgValue::Identity(identity) => Some(identity),
            _ => None,
        }
    }

    /// Returns an identity parameter as its concrete type.
    pub fn identity_as<T: Identity>(&self, name: &str) -> Option<&T> {
        self.identity(name).and_then(|identity| identity.downcast_ref::<T>())
    }

    /// Deserializes a parameter into `T`.
    ///
    /// A value that does not fit `T` is a validation failure attributed to
    /// the parameter's source. An undeclared name is an internal error.
    pub fn get<T: DeserializeOwned>(&self, name: &str) -> Result<T, LaminaError> {
        let value = self
            .values
            .get(name)
            .ok_or_else(|| LaminaError::internal(format!("parameter '{name}' was not declared")))?;
        let json = value.to_json();
        serde_json::from_value(json.clone()).map_err(|e| {
            let source = self.sources.get(name).copied().unwrap_or(ParamSource::Body);
            ValidationFailure::invalid_type(name, source, Some(json), std::any::type_name::<T>())
                .with_message(format!("parameter '{name}' has an unexpected shape: {e}"))
                .into()
        })
    }

    /// Returns the normalized request.
    pub fn request(&self) -> &Request {
        &self.request
    }

    /// Consumes the arguments and returns the request.
    pub fn into_request(self) -> Request {
        self.request
    }

    /// Iterates `(name, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ArgValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns the number of resolved parameters.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if nothing was resolved.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;
    use lamina_core::BasicIdentity;
    use serde::Deserialize;
    use serde_json::json;
    use std::sync::Arc;

    fn args() -> Arguments {
        let mut args = Arguments::new(Request::new(Method::POST, "/users"));
        args.insert("limit", ArgValue::Integer(10));
        args.insert("ratio", ArgValue::Float(0.5));
        args.insert("name", ArgValue::String("alice".into()));
        args.insert("flag", ArgValue::Bool(true));
        args.insert(
            "ids",
            ArgValue::List(vec![ArgValue::Integer(1), ArgValue::Integer(2)]),
        );
        args.insert_from(
            "user",
            ParamSource::Body,
            ArgValue::Json(json!({"name": "bob", "age": 30})),
        );
        args
    }

    #[test]
    fn test_typed_getters() {
        let args = args();
        assert_eq!(args.integer("limit"), Some(10));
        assert_eq!(args.float("limit"), Some(10.0));
        assert_eq!(args.float("ratio"), Some(0.5));
        assert_eq!(args.string("name"), Some("alice"));
        assert_eq!(args.bool("flag"), Some(true));
        assert_eq!(args.list("ids").map(<[ArgValue]>::len), Some(2));
        assert_eq!(args.integer("name"), None);
        assert_eq!(args.integer("missing"), None);
        assert_eq!(args.len(), 6);
    }

    #[test]
    fn test_get_deserializes() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct User {
            name: String,
            age: u8,
        }

        let args = args();
        let user: User = args.get("user").unwrap();
        assert_eq!(
            user,
            User {
                name: "bob".into(),
                age: 30
            }
        );
        let ids: Vec<i64> = args.get("ids").unwrap();
        assert_eq!(ids, [1, 2]);
    }

    #[test]
    fn test_get_shape_mismatch_is_validation() {
        #[derive(Debug, Deserialize)]
        #[allow(dead_code)]
        struct Strict {
            email: String,
        }

        let err = args().get::<Strict>("user").unwrap_err();
        assert_eq!(err.status_code(), http::StatusCode::BAD_REQUEST);
        assert_eq!(err.details()["source"], "body");
    }

    #[test]
    fn test_get_undeclared_is_internal() {
        let err = args().get::<i64>("nope").unwrap_err();
        assert!(err.is_opaque());
    }

    #[test]
    fn test_identity_downcast() {
        let mut args = args();
        let shared: SharedIdentity = Arc::new(BasicIdentity::new("u-1").with_role("admin"));
        args.insert("caller", ArgValue::Identity(shared));

        assert_eq!(args.identity("caller").map(|i| i.subject()), Some("u-1"));
        assert_eq!(
            args.identity_as::<BasicIdentity>("caller").and_then(Identity::role),
            Some("admin")
        );
        assert!(args.identity("name").is_none());
    }

    #[test]
    fn test_request_access() {
        let args = args();
        assert_eq!(args.request().path(), "/users");
        assert_eq!(args.into_request().method(), Method::POST);
    }
}
