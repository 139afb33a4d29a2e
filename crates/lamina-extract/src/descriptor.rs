//! Compiled parameter descriptors.
//!
//! [`DescriptorSet::build`] runs once per route at registration. It settles
//! every parameter's source, compiles constraints, and coerces defaults, so
//! per-request resolution only reads the result.

use crate::coerce::coerce_json;
use crate::constraint::Constraints;
use crate::error::DescriptorError;
use crate::param::{IdentityRule, Param, ParamType};
use crate::value::ArgValue;
use lamina_core::ParamSource;

/// One parameter with its source resolved and its checks compiled.
#[derive(Debug, Clone)]
pub struct ParamDescriptor {
    name: String,
    ty: ParamType,
    source: ParamSource,
    key: Option<String>,
    default: Option<ArgValue>,
    optional: bool,
    constraints: Constraints,
    identity: Option<IdentityRule>,
}

impl ParamDescriptor {
    /// Returns the parameter name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the declared type.
    pub fn ty(&self) -> &ParamType {
        &self.ty
    }

    /// Returns the resolved source.
    pub fn source(&self) -> ParamSource {
        self.source
    }

    /// Returns the name the value is read under.
    ///
    /// For headers this is the alias or the `-`-separated name. For the body
    /// it is the aliased top-level key, or `None` for the whole body.
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Returns the coerced default.
    pub fn default_value(&self) -> Option<&ArgValue> {
        self.default.as_ref()
    }

    /// Returns `true` if an absent value is allowed.
    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// Returns the compiled constraints.
    pub fn constraints(&self) -> &Constraints {
        &self.constraints
    }

    /// Returns the identity rule for identity parameters.
    pub fn identity_rule(&self) -> Option<&IdentityRule> {
        self.identity.as_ref()
    }
}

/// The compiled parameters of one handler, in declaration order.
///
/// # Example
///
/// ```rust
/// use lamina_core::ParamSource;
/// use lamina_extract::{DescriptorSet, Field, Param, ParamType};
///
/// let set = DescriptorSet::build(
///     "/users/{user_id}",
///     &["user_id".to_string()],
///     vec![
///         Param::new("user_id", ParamType::Integer),
///         Param::new("verbose", ParamType::Boolean).default(false),
///         Param::new("patch", ParamType::object([Field::new("name", ParamType::String)])),
///     ],
/// )
/// .unwrap();
///
/// let sources: Vec<_> = set.iter().map(|d| d.source()).collect();
/// assert_eq!(sources, [ParamSource::Path, ParamSource::Query, ParamSource::Body]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct DescriptorSet {
    params: Vec<ParamDescriptor>,
}

impl DescriptorSet {
    /// An empty set, for handlers that only read the request.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Compiles declared parameters against a route's capture names.
    pub fn build(
        template: &str,
        captures: &[String],
        params: Vec<Param>,
    ) -> Result<Self, DescriptorError> {
        let mut compiled: Vec<ParamDescriptor> = Vec::with_capacity(params.len());
        let mut body_param: Option<String> = None;

        for param in params {
            if compiled.iter().any(|d| d.name == param.name) {
                return Err(DescriptorError::DuplicateName(param.name));
            }

            let source = param.source.unwrap_or_else(|| infer_source(&param, captures));

            if source == ParamSource::Body {
                if let Some(first) = &body_param {
                    return Err(DescriptorError::MultipleBodies {
                        first: first.clone(),
                        second: param.name,
                    });
                }
                body_param = Some(param.name.clone());
            }

            let key = match source {
                ParamSource::Path | ParamSource::Query => {
                    Some(param.alias.clone().unwrap_or_else(|| param.name.clone()))
                }
                ParamSource::Header => Some(
                    param
                        .alias
                        .clone()
                        .unwrap_or_else(|| param.name.replace('_', "-")),
                ),
                ParamSource::Body => param.alias.clone(),
                ParamSource::Identity => None,
            };

            if source == ParamSource::Path {
                let capture = key.as_deref().unwrap_or(&param.name);
                if !captures.iter().any(|c| c == capture) {
                    return Err(DescriptorError::UnknownCapture {
                        param: param.name,
                        template: template.to_string(),
                    });
                }
            }

            let constraints = Constraints::compile(&param.name, &param.ty, &param.bounds)?;

            let default = param
                .default
                .as_ref()
                .map(|value| {
                    coerce_json(value, &param.ty, &param.name, source).map_err(|failure| {
                        DescriptorError::InvalidDefault {
                            param: param.name.clone(),
                            reason: failure.message().to_string(),
                        }
                    })
                })
                .transpose()?;

            compiled.push(ParamDescriptor {
                name: param.name,
                ty: param.ty,
                source,
                key,
                default,
                optional: param.optional,
                constraints,
                identity: param.identity,
            });
        }

        Ok(Self { params: compiled })
    }

    /// Iterates descriptors in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &ParamDescriptor> {
        self.params.iter()
    }

    /// Returns the descriptor named `name`.
    pub fn get(&self, name: &str) -> Option<&ParamDescriptor> {
        self.params.iter().find(|d| d.name == name)
    }

    /// Returns the number of parameters.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Returns `true` if no parameters are declared.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Returns `true` if any parameter needs an authentication provider.
    pub fn needs_identity(&self) -> bool {
        self.params
            .iter()
            .any(|d| d.source == ParamSource::Identity)
    }
}

fn infer_source(param: &Param, captures: &[String]) -> ParamSource {
    if param.ty.is_structured() {
        ParamSource::Body
    } else if captures.iter().any(|c| *c == param.name) {
        ParamSource::Path
    } else {
        ParamSource::Query
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::param::Field;
    use serde_json::json;

    fn captures(names: &[&str]) -> Vec<String> {
        names.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_inference() {
        let set = DescriptorSet::build(
            "/orders/{order_id}",
            &captures(&["order_id"]),
            vec![
                Param::new("order_id", ParamType::Integer),
                Param::new("expand", ParamType::list(ParamType::String)),
                Param::new("payload", ParamType::Json),
            ],
        )
        .unwrap();

        assert_eq!(set.get("order_id").unwrap().source(), ParamSource::Path);
        assert_eq!(set.get("expand").unwrap().source(), ParamSource::Query);
        assert_eq!(set.get("payload").unwrap().source(), ParamSource::Body);
        assert!(!set.needs_identity());
    }

    #[test]
    fn test_explicit_source_wins() {
        let set = DescriptorSet::build(
            "/items/{id}",
            &captures(&["id"]),
            vec![
                Param::query("id", ParamType::String),
                Param::body("note", ParamType::String).alias("note"),
            ],
        )
        .unwrap();
        assert_eq!(set.get("id").unwrap().source(), ParamSource::Query);
        assert_eq!(set.get("note").unwrap().key(), Some("note"));
    }

    #[test]
    fn test_header_key() {
        let set = DescriptorSet::build(
            "/",
            &[],
            vec![
                Param::header("x_api_version", ParamType::String),
                Param::header("trace", ParamType::String).alias("X-Trace-Id"),
            ],
        )
        .unwrap();
        assert_eq!(set.get("x_api_version").unwrap().key(), Some("x-api-version"));
        assert_eq!(set.get("trace").unwrap().key(), Some("X-Trace-Id"));
    }

    #[test]
    fn test_two_bodies_rejected() {
        let object = ParamType::object([Field::new("a", ParamType::String)]);
        let err = DescriptorSet::build(
            "/",
            &[],
            vec![
                Param::new("first", object.clone()),
                Param::new("second", object),
            ],
        )
        .unwrap_err();
        assert_eq!(
            err,
            DescriptorError::MultipleBodies {
                first: "first".into(),
                second: "second".into()
            }
        );
    }

    #[test]
    fn test_unknown_capture_rejected() {
        let err = DescriptorSet::build(
            "/users/{id}",
            &captures(&["id"]),
            vec![Param::path("user_id", ParamType::Integer)],
        )
        .unwrap_err();
        assert!(matches!(err, DescriptorError::UnknownCapture { .. }));

        assert!(DescriptorSet::build(
            "/users/{id}",
            &captures(&["id"]),
            vec![Param::path("user_id", ParamType::Integer).alias("id")],
        )
        .is_ok());
    }

    #[test]
    fn test_default_is_coerced() {
        let set = DescriptorSet::build(
            "/",
            &[],
            vec![Param::new("limit", ParamType::Integer).default("10")],
        )
        .unwrap();
        assert_eq!(
            set.get("limit").unwrap().default_value(),
            Some(&ArgValue::Integer(10))
        );

        let err = DescriptorSet::build(
            "/",
            &[],
            vec![Param::new("limit", ParamType::Integer).default(json!("ten"))],
        )
        .unwrap_err();
        assert!(matches!(err, DescriptorError::InvalidDefault { .. }));
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let err = DescriptorSet::build(
            "/",
            &[],
            vec![
                Param::new("q", ParamType::String),
                Param::header("q", ParamType::String),
            ],
        )
        .unwrap_err();
        assert_eq!(err, DescriptorError::DuplicateName("q".into()));
    }

    #[test]
    fn test_identity_detected() {
        let set = DescriptorSet::build("/", &[], vec![Param::optional_identity("user")]).unwrap();
        assert!(set.needs_identity());
        assert_eq!(
            set.get("user").unwrap().identity_rule(),
            Some(&IdentityRule::Optional)
        );
    }
}
