//! Declared handler parameters.
//!
//! A handler declares its inputs as a list of [`Param`]s. Each one names a
//! target type and, optionally, an explicit source, a default, and
//! constraints. The list is compiled into a
//! [`DescriptorSet`](crate::DescriptorSet) once, when the route is
//! registered.

use lamina_core::ParamSource;
use serde_json::Value;
use std::fmt;

/// The type a raw value is coerced into.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamType {
    /// Text, passed through unchanged.
    String,
    /// A signed 64-bit integer.
    Integer,
    /// A finite 64-bit float.
    Float,
    /// `true` for `true`, `1`, `yes`, `on` (any case); `false` otherwise.
    Boolean,
    /// Every value of a multi-valued query parameter or header, or a JSON array.
    List(Box<ParamType>),
    /// A JSON object with declared fields, coerced field by field.
    Object(Vec<Field>),
    /// Any JSON value, unchecked.
    Json,
}

impl ParamType {
    /// Shorthand for [`ParamType::List`].
    pub fn list(inner: ParamType) -> Self {
        Self::List(Box::new(inner))
    }

    /// Shorthand for [`ParamType::Object`].
    pub fn object(fields: impl IntoIterator<Item = Field>) -> Self {
        Self::Object(fields.into_iter().collect())
    }

    /// Returns `true` for types with named sub-fields, which are read from the body.
    pub const fn is_structured(&self) -> bool {
        matches!(self, Self::Object(_) | Self::Json)
    }

    /// Returns `true` for [`ParamType::Integer`] and [`ParamType::Float`].
    pub const fn is_numeric(&self) -> bool {
        matches!(self, Self::Integer | Self::Float)
    }

    /// Returns `true` for types a length bound applies to.
    pub const fn has_length(&self) -> bool {
        matches!(self, Self::String | Self::List(_))
    }

    /// Returns the name used in error messages.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::List(_) => "list",
            Self::Object(_) => "object",
            Self::Json => "JSON value",
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::List(inner) => write!(f, "list of {inner}"),
            other => f.write_str(other.name()),
        }
    }
}

/// A named field of a [`ParamType::Object`].
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub(crate) name: String,
    pub(crate) ty: ParamType,
    pub(crate) optional: bool,
    pub(crate) default: Option<Value>,
}

impl Field {
    /// Declares a required field.
    pub fn new(name: impl Into<String>, ty: ParamType) -> Self {
        Self {
            name: name.into(),
            ty,
            optional: false,
            default: None,
        }
    }

    /// Lets the field be absent; it is then `null`.
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Uses `value` when the field is absent.
    #[must_use]
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Returns the field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the field type.
    pub fn ty(&self) -> &ParamType {
        &self.ty
    }
}

/// How an identity parameter treats the authentication result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityRule {
    /// Authentication must succeed.
    Required,
    /// Authentication must succeed and the identity's role must be listed.
    Roles(Vec<String>),
    /// Authentication failures yield `null`.
    Optional,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Bounds {
    pub(crate) gt: Option<f64>,
    pub(crate) ge: Option<f64>,
    pub(crate) lt: Option<f64>,
    pub(crate) le: Option<f64>,
    pub(crate) min_length: Option<usize>,
    pub(crate) max_length: Option<usize>,
    pub(crate) pattern: Option<String>,
}

/// One declared handler parameter.
///
/// # Example
///
/// ```rust
/// use lamina_extract::{Field, Param, ParamType};
///
/// let params = vec![
///     Param::path("user_id", ParamType::Integer).ge(1),
///     Param::query("limit", ParamType::Integer).default(10).ge(1).le(100),
///     Param::header("x_api_version", ParamType::String).optional(),
///     Param::new(
///         "profile",
///         ParamType::object([Field::new("name", ParamType::String)]),
///     ),
///     Param::identity_with_roles("caller", ["admin"]),
/// ];
/// assert_eq!(params.len(), 5);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub(crate) name: String,
    pub(crate) ty: ParamType,
    pub(crate) source: Option<ParamSource>,
    pub(crate) identity: Option<IdentityRule>,
    pub(crate) alias: Option<String>,
    pub(crate) default: Option<Value>,
    pub(crate) optional: bool,
    pub(crate) bounds: Bounds,
}

impl Param {
    /// Declares a parameter whose source is inferred at registration.
    ///
    /// Structured types come from the body, names matching a path capture
    /// come from the path, and everything else comes from the query string.
    pub fn new(name: impl Into<String>, ty: ParamType) -> Self {
        Self {
            name: name.into(),
            ty,
            source: None,
            identity: None,
            alias: None,
            default: None,
            optional: false,
            bounds: Bounds::default(),
        }
    }

    fn sourced(name: impl Into<String>, ty: ParamType, source: ParamSource) -> Self {
        Self {
            source: Some(source),
            ..Self::new(name, ty)
        }
    }

    /// Declares a path capture.
    pub fn path(name: impl Into<String>, ty: ParamType) -> Self {
        Self::sourced(name, ty, ParamSource::Path)
    }

    /// Declares a query string parameter.
    pub fn query(name: impl Into<String>, ty: ParamType) -> Self {
        Self::sourced(name, ty, ParamSource::Query)
    }

    /// Declares a header. Without an alias the header name is the parameter
    /// name with `_` replaced by `-`.
    pub fn header(name: impl Into<String>, ty: ParamType) -> Self {
        Self::sourced(name, ty, ParamSource::Header)
    }

    /// Declares the JSON body, or one top-level key of it when aliased.
    pub fn body(name: impl Into<String>, ty: ParamType) -> Self {
        Self::sourced(name, ty, ParamSource::Body)
    }

    fn identity_param(name: impl Into<String>, rule: IdentityRule) -> Self {
        Self {
            identity: Some(rule),
            ..Self::sourced(name, ParamType::Json, ParamSource::Identity)
        }
    }

    /// Declares the authenticated caller. Authentication failure is a 401.
    pub fn identity(name: impl Into<String>) -> Self {
        Self::identity_param(name, IdentityRule::Required)
    }

    /// Declares the authenticated caller, whose role must be one of `roles`.
    pub fn identity_with_roles<I, S>(name: impl Into<String>, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let roles = roles.into_iter().map(Into::into).collect();
        Self::identity_param(name, IdentityRule::Roles(roles))
    }

    /// Declares the caller if authentication succeeds, and `null` otherwise.
    pub fn optional_identity(name: impl Into<String>) -> Self {
        Self::identity_param(name, IdentityRule::Optional)
    }

    /// Reads the value under a different name than the parameter's own.
    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Uses `value` when the parameter is absent. Must coerce to the declared type.
    #[must_use]
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Lets the parameter be absent; it is then `null`.
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Requires `value > bound`.
    #[must_use]
    pub fn gt(mut self, bound: impl Into<f64>) -> Self {
        self.bounds.gt = Some(bound.into());
        self
    }

    /// Requires `value >= bound`.
    #[must_use]
    pub fn ge(mut self, bound: impl Into<f64>) -> Self {
        self.bounds.ge = Some(bound.into());
        self
    }

    /// Requires `value < bound`.
    #[must_use]
    pub fn lt(mut self, bound: impl Into<f64>) -> Self {
        self.bounds.lt = Some(bound.into());
        self
    }

    /// Requires `value <= bound`.
    #[must_use]
    pub fn le(mut self, bound: impl Into<f64>) -> Self {
        self.bounds.le = Some(bound.into());
        self
    }

    /// Requires at least `len` characters or list items.
    #[must_use]
    pub fn min_length(mut self, len: usize) -> Self {
        self.bounds.min_length = Some(len);
        self
    }

    /// Requires at most `len` characters or list items.
    #[must_use]
    pub fn max_length(mut self, len: usize) -> Self {
        self.bounds.max_length = Some(len);
        self
    }

    /// Requires the value to match `pattern` starting at its first character.
    #[must_use]
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.bounds.pattern = Some(pattern.into());
        self
    }

    /// Returns the parameter name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the declared type.
    pub fn ty(&self) -> &ParamType {
        &self.ty
    }

    /// Returns the explicit source, if one was declared.
    pub fn explicit_source(&self) -> Option<ParamSource> {
        self.source
    }
}
