//! Type coercion.
//!
//! Text sources (path, query, header) deliver strings; the body delivers JSON.
//! Both are converted into [`ArgValue`]s of the declared [`ParamType`]. A value
//! that does not parse is a validation failure, never a silent zero.

use crate::param::{Field, ParamType};
use crate::value::ArgValue;
use lamina_core::{ParamSource, ValidationFailure};
use serde_json::{Map, Value};

const TRUTHY: [&str; 4] = ["true", "1", "yes", "on"];

/// Returns `true` for the case-insensitive tokens `true`, `1`, `yes`, `on`.
pub fn is_truthy(text: &str) -> bool {
    let text = text.trim();
    TRUTHY.iter().any(|token| text.eq_ignore_ascii_case(token))
}

/// Coerces one text value.
pub fn coerce_text(
    text: &str,
    ty: &ParamType,
    name: &str,
    source: ParamSource,
) -> Result<ArgValue, ValidationFailure> {
    let invalid = || ValidationFailure::invalid_type(name, source, Some(Value::from(text)), ty.name());

    match ty {
        ParamType::String => Ok(ArgValue::String(text.to_string())),
        ParamType::Integer => text
            .trim()
            .parse::<i64>()
            .map(ArgValue::Integer)
            .map_err(|_| invalid()),
        ParamType::Float => match text.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(ArgValue::Float(n)),
            _ => Err(invalid()),
        },
        ParamType::Boolean => Ok(ArgValue::Bool(is_truthy(text))),
        ParamType::List(inner) => coerce_many(&[text], inner, name, source),
        ParamType::Object(_) | ParamType::Json => {
            let parsed: Value = serde_json::from_str(text).map_err(|_| invalid())?;
            coerce_json(&parsed, ty, name, source)
        }
    }
}

/// Coerces every value of a multi-valued source into a list.
pub fn coerce_many<S: AsRef<str>>(
    values: &[S],
    inner: &ParamType,
    name: &str,
    source: ParamSource,
) -> Result<ArgValue, ValidationFailure> {
    values
        .iter()
        .enumerate()
        .map(|(i, text)| {
            coerce_text(text.as_ref(), inner, &format!("[{i}]"), source)
                .map_err(|failure| failure.nested_in(name))
        })
        .collect::<Result<Vec<_>, _>>()
        .map(ArgValue::List)
}

/// Coerces a JSON value, recursing into lists and declared object fields.
pub fn coerce_json(
    value: &Value,
    ty: &ParamType,
    name: &str,
    source: ParamSource,
) -> Result<ArgValue, ValidationFailure> {
    let invalid = || ValidationFailure::invalid_type(name, source, Some(value.clone()), ty.name());

    match (ty, value) {
        (ParamType::Json, _) => Ok(ArgValue::Json(value.clone())),
        (_, Value::Null) => Ok(ArgValue::Null),
        (ParamType::String, Value::String(s)) => Ok(ArgValue::String(s.clone())),
        (ParamType::Integer, Value::Number(n)) => n.as_i64().map(ArgValue::Integer).ok_or_else(invalid),
        (ParamType::Float, Value::Number(n)) => n.as_f64().map(ArgValue::Float).ok_or_else(invalid),
        (ParamType::Integer | ParamType::Float | ParamType::Boolean, Value::String(s)) => {
            coerce_text(s, ty, name, source)
        }
        (ParamType::Boolean, Value::Bool(b)) => Ok(ArgValue::Bool(*b)),
        (ParamType::Boolean, Value::Number(n)) => Ok(ArgValue::Bool(n.as_f64() != Some(0.0))),
        (ParamType::List(inner), Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(i, item)| coerce_item(item, inner, i, source).map_err(|failure| failure.nested_in(name)))
            .collect::<Result<Vec<_>, _>>()
            .map(ArgValue::List),
        (ParamType::Object(fields), Value::Object(map)) => {
            coerce_object(map, fields, source).map_err(|failure| failure.nested_in(name))
        }
        _ => Err(invalid()),
    }
}

/// List items carry no default, so `null` is only accepted for untyped JSON.
fn coerce_item(
    item: &Value,
    inner: &ParamType,
    index: usize,
    source: ParamSource,
) -> Result<ArgValue, ValidationFailure> {
    let name = format!("[{index}]");
    if item.is_null() && !matches!(inner, ParamType::Json) {
        return Err(ValidationFailure::invalid_type(name, source, Some(Value::Null), inner.name()));
    }
    coerce_json(item, inner, &name, source)
}

fn coerce_object(
    map: &Map<String, Value>,
    fields: &[Field],
    source: ParamSource,
) -> Result<ArgValue, ValidationFailure> {
    let mut out = map.clone();
    for field in fields {
        let coerced = match map.get(&field.name) {
            Some(value) if !value.is_null() => coerce_json(value, &field.ty, &field.name, source)?,
            _ => match &field.default {
                Some(default) => coerce_json(default, &field.ty, &field.name, source)?,
                None if field.optional => ArgValue::Null,
                None => return Err(ValidationFailure::missing(field.name.as_str(), source)),
            },
        };
        out.insert(field.name.clone(), coerced.to_json());
    }
    Ok(ArgValue::Json(Value::Object(out)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lamina_core::Constraint;
    use serde_json::json;

    #[test]
    fn test_integer_text() {
        assert_eq!(
            coerce_text("42", &ParamType::Integer, "id", ParamSource::Path).unwrap(),
            ArgValue::Integer(42)
        );
        let failure = coerce_text("abc", &ParamType::Integer, "limit", ParamSource::Query).unwrap_err();
        assert_eq!(failure.parameter(), "limit");
        assert_eq!(failure.raw_value(), Some(&json!("abc")));
        assert_eq!(
            failure.constraint(),
            &Constraint::Type {
                expected: "integer".into()
            }
        );
    }

    #[test]
    fn test_float_rejects_non_finite() {
        assert_eq!(
            coerce_text("2.5", &ParamType::Float, "x", ParamSource::Query).unwrap(),
            ArgValue::Float(2.5)
        );
        assert!(coerce_text("NaN", &ParamType::Float, "x", ParamSource::Query).is_err());
        assert!(coerce_text("inf", &ParamType::Float, "x", ParamSource::Query).is_err());
        assert!(coerce_text("", &ParamType::Float, "x", ParamSource::Query).is_err());
    }

    #[test]
    fn test_boolean_tokens() {
        for token in ["true", "TRUE", "1", "yes", "On"] {
            assert!(is_truthy(token), "{token} should be truthy");
        }
        for token in ["false", "0", "no", "off", "", "maybe"] {
            assert!(!is_truthy(token), "{token} should be falsy");
        }
        assert_eq!(
            coerce_text("nope", &ParamType::Boolean, "flag", ParamSource::Query).unwrap(),
            ArgValue::Bool(false)
        );
    }

    #[test]
    fn test_string_passes_through() {
        assert_eq!(
            coerce_text(" spaced ", &ParamType::String, "q", ParamSource::Query).unwrap(),
            ArgValue::String(" spaced ".into())
        );
    }

    #[test]
    fn test_many_names_bad_item() {
        let failure = coerce_many(&["1", "x"], &ParamType::Integer, "ids", ParamSource::Query).unwrap_err();
        assert_eq!(failure.parameter(), "ids[1]");

        let ok = coerce_many(&["1", "2"], &ParamType::Integer, "ids", ParamSource::Query).unwrap();
        assert_eq!(ok, ArgValue::List(vec![ArgValue::Integer(1), ArgValue::Integer(2)]));
    }

    #[test]
    fn test_json_numbers_and_strings() {
        let ty = ParamType::Integer;
        assert_eq!(
            coerce_json(&json!(7), &ty, "n", ParamSource::Body).unwrap(),
            ArgValue::Integer(7)
        );
        assert_eq!(
            coerce_json(&json!("8"), &ty, "n", ParamSource::Body).unwrap(),
            ArgValue::Integer(8)
        );
        assert!(coerce_json(&json!(1.5), &ty, "n", ParamSource::Body).is_err());
        assert!(coerce_json(&json!(true), &ty, "n", ParamSource::Body).is_err());
        assert!(coerce_json(&json!(3), &ParamType::String, "s", ParamSource::Body).is_err());
    }

    #[test]
    fn test_object_fields_recursive() {
        let ty = ParamType::object([
            Field::new("name", ParamType::String),
            Field::new("age", ParamType::Integer).optional(),
            Field::new("tags", ParamType::list(ParamType::String)).default(json!([])),
            Field::new(
                "address",
                ParamType::object([Field::new("city", ParamType::String)]),
            ),
        ]);

        let value = json!({
            "name": "alice",
            "age": "30",
            "address": {"city": "Osaka"},
            "extra": 1
        });
        let coerced = coerce_json(&value, &ty, "user", ParamSource::Body).unwrap();
        assert_eq!(
            coerced.to_json(),
            json!({
                "name": "alice",
                "age": 30,
                "tags": [],
                "address": {"city": "Osaka"},
                "extra": 1
            })
        );

        let missing = json!({"name": "bob", "address": {}});
        let failure = coerce_json(&missing, &ty, "user", ParamSource::Body).unwrap_err();
        assert_eq!(failure.parameter(), "user.address.city");
        assert_eq!(failure.constraint(), &Constraint::Required);
    }

    #[test]
    fn test_object_rejects_non_object() {
        let ty = ParamType::object([Field::new("name", ParamType::String)]);
        let failure = coerce_json(&json!([1]), &ty, "user", ParamSource::Body).unwrap_err();
        assert_eq!(failure.parameter(), "user");
    }

    #[test]
    fn test_list_item_path() {
        let ty = ParamType::list(ParamType::object([Field::new("id", ParamType::Integer)]));
        let failure =
            coerce_json(&json!([{"id": 1}, {"id": "x"}]), &ty, "items", ParamSource::Body)
                .unwrap_err();
        assert_eq!(failure.parameter(), "items[1].id");
    }

    #[test]
    fn test_null_list_item_is_type_failure() {
        let ty = ParamType::object([Field::new("ids", ParamType::list(ParamType::Integer))]);
        let failure = coerce_json(&json!({"ids": [1, null, 3]}), &ty, "order", ParamSource::Body)
            .unwrap_err();
        assert_eq!(failure.parameter(), "order.ids[1]");
        assert_eq!(
            failure.constraint(),
            &Constraint::Type {
                expected: "integer".into()
            }
        );

        let loose = ParamType::list(ParamType::Json);
        assert!(coerce_json(&json!([1, null]), &loose, "raw", ParamSource::Body).is_ok());
    }
}
