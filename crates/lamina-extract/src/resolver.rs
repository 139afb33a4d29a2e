//! Per-request parameter resolution.
//!
//! The resolver walks a [`DescriptorSet`] in declaration order. Validation
//! failures are collected so a caller sees every bad parameter at once;
//! authentication and authorization failures stop resolution immediately.

use crate::arguments::Arguments;
use crate::coerce::{coerce_json, coerce_many, coerce_text};
use crate::descriptor::{DescriptorSet, ParamDescriptor};
use crate::param::{IdentityRule, ParamType};
use crate::value::ArgValue;
use lamina_core::{
    AuthProvider, ErrorKind, LaminaError, ParamSource, Request, SharedIdentity, ValidationFailure,
};

/// Default header carrying the credential passed to the [`AuthProvider`].
pub const DEFAULT_CREDENTIAL_HEADER: &str = "authorization";

/// Resolves declared parameters against a request.
///
/// # Example
///
/// ```rust
/// # tokio_test::block_on(async {
/// use lamina_core::Request;
/// use lamina_extract::{DescriptorSet, Param, ParamType, Resolver};
/// use http::Method;
///
/// let set = DescriptorSet::build(
///     "/search",
///     &[],
///     vec![Param::new("limit", ParamType::Integer).default(10).ge(1)],
/// )
/// .unwrap();
///
/// let request = Request::new(Method::GET, "/search").with_query_param("limit", "25");
/// let args = Resolver::new().resolve(&set, request).await.unwrap();
/// assert_eq!(args.integer("limit"), Some(25));
/// # });
/// ```
#[derive(Clone, Copy)]
pub struct Resolver<'a> {
    auth: Option<&'a dyn AuthProvider>,
    credential_header: &'a str,
}

impl std::fmt::Debug for Resolver<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("auth", &self.auth.is_some())
            .field("credential_header", &self.credential_header)
            .finish()
    }
}

impl Default for Resolver<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Resolver<'a> {
    /// Creates a resolver without an authentication provider.
    pub const fn new() -> Self {
        Self {
            auth: None,
            credential_header: DEFAULT_CREDENTIAL_HEADER,
        }
    }

    /// Sets the provider used for identity parameters.
    #[must_use]
    pub fn with_auth_provider(mut self, provider: &'a dyn AuthProvider) -> Self {
        self.auth = Some(provider);
        self
    }

    /// Sets the header whose value is passed to the provider.
    #[must_use]
    pub fn with_credential_header(mut self, header: &'a str) -> Self {
        self.credential_header = header;
        self
    }

    /// Resolves every parameter of `set` against `request`.
    ///
    /// # Errors
    ///
    /// - [`LaminaError::Validation`] for one bad parameter, or
    ///   [`LaminaError::ValidationSet`] for several
    /// - authentication, authorization, or provider errors from identity parameters
    pub async fn resolve(&self, set: &DescriptorSet, request: Request) -> Result<Arguments, LaminaError> {
        let mut args = Arguments::new(request);
        let mut failures: Vec<ValidationFailure> = Vec::new();
        let mut identity: Option<Authenticated> = None;

        for descriptor in set.iter() {
            let value = if descriptor.source() == ParamSource::Identity {
                self.resolve_identity(descriptor, args.request(), &mut identity)
                    .await?
            } else {
                match resolve_value(descriptor, args.request()) {
                    Ok(value) => value,
                    Err(failure) => {
                        tracing::debug!(
                            param = descriptor.name(),
                            source = %descriptor.source(),
                            error = %failure,
                            "parameter failed validation"
                        );
                        failures.push(failure);
                        continue;
                    }
                }
            };
            args.insert_from(descriptor.name(), descriptor.source(), value);
        }

        match failures.len() {
            0 => Ok(args),
            1 => Err(LaminaError::Validation(failures.remove(0))),
            _ => Err(LaminaError::validation_set(failures)),
        }
    }

    async fn resolve_identity(
        &self,
        descriptor: &ParamDescriptor,
        request: &Request,
        cached: &mut Option<Authenticated>,
    ) -> Result<ArgValue, LaminaError> {
        let rule = descriptor
            .identity_rule()
            .unwrap_or(&IdentityRule::Required);

        let outcome = match cached {
            Some(Authenticated::Caller(identity)) => Ok(identity.clone()),
            Some(Authenticated::Rejected(message)) => Err(LaminaError::authentication(message.clone())),
            None => {
                let provider = self.auth.ok_or_else(|| {
                    LaminaError::internal(format!(
                        "parameter '{}' needs an authentication provider",
                        descriptor.name()
                    ))
                })?;
                let outcome = provider
                    .authenticate(request.header(self.credential_header))
                    .await;
                match &outcome {
                    Ok(identity) => *cached = Some(Authenticated::Caller(identity.clone())),
                    Err(LaminaError::Authentication { message }) => {
                        *cached = Some(Authenticated::Rejected(message.clone()));
                    }
                    Err(_) => {}
                }
                outcome
            }
        };

        let identity = match (outcome, rule) {
            (Ok(identity), _) => identity,
            (Err(err), IdentityRule::Optional) if err.kind() == ErrorKind::Authentication => {
                tracing::debug!(param = descriptor.name(), error = %err, "optional identity absent");
                return Ok(ArgValue::Null);
            }
            (Err(err), _) => return Err(err),
        };

        if let IdentityRule::Roles(roles) = rule {
            let role = identity.role();
            if !role.is_some_and(|r| roles.iter().any(|allowed| allowed == r)) {
                return Err(LaminaError::role_denied(role, roles.iter().cloned()));
            }
        }

        Ok(ArgValue::Identity(identity))
    }
}

/// Provider outcome shared by every identity parameter of one invocation.
enum Authenticated {
    Caller(SharedIdentity),
    Rejected(String),
}

fn resolve_value(descriptor: &ParamDescriptor, request: &Request) -> Result<ArgValue, ValidationFailure> {
    let name = descriptor.name();
    let source = descriptor.source();
    let ty = descriptor.ty();

    let raw = match source {
        ParamSource::Path => descriptor
            .key()
            .and_then(|key| request.path_param(key))
            .map(|text| coerce_text(text, ty, name, source))
            .transpose()?,
        ParamSource::Query => {
            let values = descriptor
                .key()
                .map(|key| request.query().get_all(key))
                .unwrap_or_default();
            read_text(values, ty, name, source)?
        }
        ParamSource::Header => {
            let values = descriptor
                .key()
                .map(|key| request.header_all(key))
                .unwrap_or_default();
            read_text(values.as_slice(), ty, name, source)?
        }
        ParamSource::Body => {
            let body = request.json()?;
            let value = match descriptor.key() {
                Some(key) => body.and_then(|b| b.get(key)),
                None => body,
            };
            match value {
                Some(value) if !value.is_null() => Some(coerce_json(value, ty, name, source)?),
                _ => None,
            }
        }
        ParamSource::Identity => None,
    };

    let value = match raw {
        Some(value) => value,
        None => match descriptor.default_value() {
            Some(default) => return Ok(default.clone()),
            None if descriptor.is_optional() => return Ok(ArgValue::Null),
            None => return Err(ValidationFailure::missing(name, source)),
        },
    };

    descriptor.constraints().check(&value, name, source)?;
    Ok(value)
}

fn read_text<S: AsRef<str>>(
    values: &[S],
    ty: &ParamType,
    name: &str,
    source: ParamSource,
) -> Result<Option<ArgValue>, ValidationFailure> {
    match (ty, values) {
        (_, []) => Ok(None),
        (ParamType::List(inner), values) => coerce_many(values, inner, name, source).map(Some),
        (_, [first, ..]) => coerce_text(first.as_ref(), ty, name, source).map(Some),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::param::{Field, Param};
    use http::{Method, StatusCode};
    use lamina_core::{async_trait, bearer_token, BasicIdentity, Constraint};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct Tokens {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl AuthProvider for Tokens {
        async fn authenticate(&self, credential: Option<&str>) -> Result<SharedIdentity, LaminaError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match credential.and_then(bearer_token) {
                Some("admin-token") => Ok(Arc::new(BasicIdentity::new("a-1").with_role("admin"))),
                Some("user-token") => Ok(Arc::new(BasicIdentity::new("u-1").with_role("user"))),
                Some("down") => Err(LaminaError::provider_unavailable("auth", Some(5))),
                Some(_) => Err(LaminaError::authentication("invalid token")),
                None => Err(LaminaError::authentication("missing credentials")),
            }
        }
    }

    fn set(template: &str, captures: &[&str], params: Vec<Param>) -> DescriptorSet {
        let captures: Vec<String> = captures.iter().map(ToString::to_string).collect();
        DescriptorSet::build(template, &captures, params).unwrap()
    }

    fn with_path(path: &str, params: &[(&str, &str)]) -> Request {
        let mut request = Request::new(Method::GET, path);
        request.set_path_params(params.iter().copied().collect());
        request
    }

    #[tokio::test]
    async fn test_path_integer() {
        let set = set("/users/{user_id}", &["user_id"], vec![Param::new("user_id", ParamType::Integer)]);
        let args = Resolver::new()
            .resolve(&set, with_path("/users/42", &[("user_id", "42")]))
            .await
            .unwrap();
        assert_eq!(args.integer("user_id"), Some(42));
    }

    #[tokio::test]
    async fn test_non_numeric_query_is_400() {
        let set = set("/items", &[], vec![Param::new("limit", ParamType::Integer).default(10)]);
        let request = Request::new(Method::GET, "/items").with_query_param("limit", "abc");
        let err = Resolver::new().resolve(&set, request).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.details()["field"], "limit");
        assert_eq!(err.details()["value"], "abc");
    }

    #[tokio::test]
    async fn test_default_and_optional() {
        let set = set(
            "/items",
            &[],
            vec![
                Param::new("limit", ParamType::Integer).default(10),
                Param::new("q", ParamType::String).optional(),
            ],
        );
        let args = Resolver::new()
            .resolve(&set, Request::new(Method::GET, "/items"))
            .await
            .unwrap();
        assert_eq!(args.integer("limit"), Some(10));
        assert!(args.value("q").unwrap().is_null());
    }

    #[tokio::test]
    async fn test_missing_required() {
        let set = set("/items", &[], vec![Param::new("q", ParamType::String)]);
        let err = Resolver::new()
            .resolve(&set, Request::new(Method::GET, "/items"))
            .await
            .unwrap_err();
        assert_eq!(err.details()["constraint"], "required");
    }

    #[tokio::test]
    async fn test_failures_are_collected_in_order() {
        let set = set(
            "/items",
            &[],
            vec![
                Param::new("a", ParamType::Integer),
                Param::new("b", ParamType::Integer).ge(1),
                Param::new("c", ParamType::String),
            ],
        );
        let request = Request::new(Method::GET, "/items")
            .with_query_param("a", "x")
            .with_query_param("b", "0")
            .with_query_param("c", "ok");
        let err = Resolver::new().resolve(&set, request).await.unwrap_err();
        let errors = err.details()["errors"].clone();
        assert_eq!(errors[0]["field"], "a");
        assert_eq!(errors[1]["field"], "b");
        assert_eq!(errors[1]["constraint"], "ge");
        assert_eq!(errors.as_array().map(Vec::len), Some(2));
    }

    #[tokio::test]
    async fn test_ge_boundary_at_and_below() {
        let set = set("/items", &[], vec![Param::new("page", ParamType::Integer).ge(1)]);
        let at = Request::new(Method::GET, "/").with_query_param("page", "1");
        assert!(Resolver::new().resolve(&set, at).await.is_ok());

        let below = Request::new(Method::GET, "/").with_query_param("page", "0");
        let err = Resolver::new().resolve(&set, below).await.unwrap_err();
        match err {
            LaminaError::Validation(failure) => assert_eq!(failure.constraint(), &Constraint::Ge(1.0)),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_multi_valued_query_list() {
        let set = set("/items", &[], vec![Param::new("tag", ParamType::list(ParamType::String)).max_length(3)]);
        let request = Request::new(Method::GET, "/items")
            .with_query_param("tag", "a")
            .with_query_param("tag", "b");
        let args = Resolver::new().resolve(&set, request).await.unwrap();
        let tags: Vec<String> = args.get("tag").unwrap();
        assert_eq!(tags, ["a", "b"]);
    }

    #[tokio::test]
    async fn test_header_lookup() {
        let set = set(
            "/",
            &[],
            vec![
                Param::header("x_api_version", ParamType::Integer),
                Param::header("debug", ParamType::Boolean).alias("X-Debug").default(false),
            ],
        );
        let request = Request::new(Method::GET, "/")
            .with_header("X-Api-Version", "2")
            .with_header("x-debug", "yes");
        let args = Resolver::new().resolve(&set, request).await.unwrap();
        assert_eq!(args.integer("x_api_version"), Some(2));
        assert_eq!(args.bool("debug"), Some(true));
    }

    #[tokio::test]
    async fn test_non_ascii_header_is_type_failure() {
        let set = set("/", &[], vec![Param::header("x_count", ParamType::Integer)]);
        let request = Request::new(Method::GET, "/").with_header("x-count", "４２");
        let err = Resolver::new().resolve(&set, request).await.unwrap_err();
        assert_eq!(err.details()["field"], "x_count");
        assert_eq!(err.details()["value"], "４２");
        assert_eq!(err.details()["constraint"], "type");
    }

    #[tokio::test]
    async fn test_body_object_and_embedded_key() {
        let user = ParamType::object([
            Field::new("name", ParamType::String),
            Field::new("age", ParamType::Integer),
        ]);
        let set = set("/users", &[], vec![Param::new("user", user.clone())]);
        let request = Request::new(Method::POST, "/users").with_body(r#"{"name": "alice", "age": "31"}"#);
        let args = Resolver::new().resolve(&set, request).await.unwrap();
        assert_eq!(args.value("user").unwrap().to_json(), json!({"name": "alice", "age": 31}));

        let set = set_embedded(user);
        let request = Request::new(Method::POST, "/users").with_body(r#"{"user": {"name": "bob", "age": 2}}"#);
        let args = Resolver::new().resolve(&set, request).await.unwrap();
        assert_eq!(args.value("user").unwrap().to_json()["name"], "bob");
    }

    fn set_embedded(ty: ParamType) -> DescriptorSet {
        set("/users", &[], vec![Param::body("user", ty).alias("user")])
    }

    #[tokio::test]
    async fn test_body_field_failure_is_named() {
        let user = ParamType::object([Field::new("age", ParamType::Integer)]);
        let set = set("/users", &[], vec![Param::new("user", user)]);
        let request = Request::new(Method::POST, "/users").with_body(r#"{"age": "old"}"#);
        let err = Resolver::new().resolve(&set, request).await.unwrap_err();
        assert_eq!(err.details()["field"], "user.age");
        assert_eq!(err.details()["source"], "body");
    }

    #[tokio::test]
    async fn test_invalid_json_body() {
        let set = set("/users", &[], vec![Param::new("payload", ParamType::Json)]);
        let request = Request::new(Method::POST, "/users").with_body("{oops");
        let err = Resolver::new().resolve(&set, request).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_required_identity() {
        let tokens = Tokens::default();
        let set = set("/me", &[], vec![Param::identity("caller")]);
        let resolver = Resolver::new().with_auth_provider(&tokens);

        let ok = Request::new(Method::GET, "/me").with_header("Authorization", "Bearer user-token");
        let args = resolver.resolve(&set, ok).await.unwrap();
        assert_eq!(args.identity("caller").map(|i| i.subject()), Some("u-1"));

        let missing = Request::new(Method::GET, "/me");
        let err = resolver.resolve(&set, missing).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_role_gate() {
        let tokens = Tokens::default();
        let set = set("/admin", &[], vec![Param::identity_with_roles("caller", ["admin"])]);
        let resolver = Resolver::new().with_auth_provider(&tokens);

        let user = Request::new(Method::GET, "/admin").with_header("Authorization", "Bearer user-token");
        let err = resolver.resolve(&set, user).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(err.details()["user_role"], "user");

        let admin = Request::new(Method::GET, "/admin").with_header("Authorization", "Bearer admin-token");
        assert!(resolver.resolve(&set, admin).await.is_ok());
    }

    #[tokio::test]
    async fn test_optional_identity() {
        let tokens = Tokens::default();
        let set = set("/feed", &[], vec![Param::optional_identity("caller")]);
        let resolver = Resolver::new().with_auth_provider(&tokens);

        let anonymous = Request::new(Method::GET, "/feed");
        let args = resolver.resolve(&set, anonymous).await.unwrap();
        assert!(args.identity("caller").is_none());
        assert!(args.value("caller").unwrap().is_null());

        let outage = Request::new(Method::GET, "/feed").with_header("Authorization", "Bearer down");
        let err = resolver.resolve(&set, outage).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_custom_credential_header_and_single_call() {
        let tokens = Tokens::default();
        let set = set(
            "/",
            &[],
            vec![Param::identity("a"), Param::optional_identity("b")],
        );
        let resolver = Resolver::new()
            .with_auth_provider(&tokens)
            .with_credential_header("x-api-token");
        let request = Request::new(Method::GET, "/").with_header("X-Api-Token", "Bearer admin-token");
        let args = resolver.resolve(&set, request).await.unwrap();
        assert!(args.identity("b").is_some());
        assert_eq!(tokens.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_rejected_credential_is_not_retried() {
        let tokens = Tokens::default();
        let set = set(
            "/",
            &[],
            vec![Param::optional_identity("a"), Param::identity("b")],
        );
        let resolver = Resolver::new().with_auth_provider(&tokens);
        let request = Request::new(Method::GET, "/").with_header("Authorization", "Bearer forged");
        let err = resolver.resolve(&set, request).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.to_string(), "invalid token");
        assert_eq!(tokens.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_identity_without_provider_is_internal() {
        let set = set("/", &[], vec![Param::identity("caller")]);
        let err = Resolver::new()
            .resolve(&set, Request::new(Method::GET, "/"))
            .await
            .unwrap_err();
        assert!(err.is_opaque());
    }
}
