//! Resolved parameter values.

use lamina_core::SharedIdentity;
use serde_json::{json, Value};

/// A coerced parameter value.
#[derive(Debug, Clone)]
pub enum ArgValue {
    /// Absent optional parameter, or JSON `null`.
    Null,
    /// A boolean.
    Bool(bool),
    /// An integer.
    Integer(i64),
    /// A finite float.
    Float(f64),
    /// Text.
    String(String),
    /// A list of coerced items.
    List(Vec<ArgValue>),
    /// A JSON value: an object (coerced field by field) or unchecked JSON.
    Json(Value),
    /// The authenticated caller.
    Identity(SharedIdentity),
}

impl ArgValue {
    /// Returns `true` for [`ArgValue::Null`].
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Renders the value as JSON. Identities render as `{"subject", "role"}`.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(b) => Value::Bool(*b),
            Self::Integer(n) => Value::from(*n),
            Self::Float(n) => Value::from(*n),
            Self::String(s) => Value::from(s.as_str()),
            Self::List(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Json(value) => value.clone(),
            Self::Identity(identity) => json!({
                "subject": identity.subject(),
                "role": identity.role(),
            }),
        }
    }

    /// Returns the length a length bound is checked against.
    pub(crate) fn length(&self) -> Option<usize> {
        match self {
            Self::String(s) => Some(s.chars().count()),
            Self::List(items) => Some(items.len()),
            _ => None,
        }
    }

    /// Returns the number a numeric bound is checked against.
    #[allow(clippy::cast_precision_loss)]
    pub(crate) fn number(&self) -> Option<f64> {
        match self {
            Self::Integer(n) => Some(*n as f64),
            Self::Float(n) => Some(*n),
            _ => None,
        }
    }
}

impl PartialEq for ArgValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Identity(a), Self::Identity(b)) => std::sync::Arc::ptr_eq(a, b),
            (Self::Identity(_), _) | (_, Self::Identity(_)) => false,
            (a, b) => a.to_json() == b.to_json(),
        }
    }
}
