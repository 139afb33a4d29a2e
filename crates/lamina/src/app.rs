//! The application: compiled routes, dispatch, and platform entry points.
//!
//! # Dispatch
//!
//! ```text
//! ProxyEvent → Request → strip root path
//!   OPTIONS → CORS preflight (handler never runs)
//!   else    → RouteTable lookup
//!               Found            → middleware chain → resolve parameters → handler
//!               MethodNotAllowed → 405 (or 404 when disabled)
//!               NotFound         → 404
//!           → ErrorTranslator on failure → CORS annotation → ProxyResponse
//! ```

use std::fmt;
use std::sync::Arc;

use http::Method;
use lamina_config::LaminaConfig;
use lamina_core::{
    AuthProvider, LaminaError, ParamSource, ProxyEvent, ProxyResponse, Request, Response,
    ValidationFailure,
};
use lamina_extract::{DescriptorSet, Resolver, DEFAULT_CREDENTIAL_HEADER};
use lamina_middleware::{
    BoxedMiddleware, CorsPolicy, ErrorTranslator, InvocationContext, Middleware, MiddlewareChain,
    Outcome,
};
use lamina_router::{Lookup, PathTemplate, RouteTable};
use lamina_telemetry::{record_invocation, record_validation_failure, InFlightGuard};
use serde_json::Value;

use crate::handler::{self, SharedHandler};
use crate::route::{Route, RouteGroup};
use crate::{settings, ConfigurationError};

/// A compiled route. Read-only once built.
struct RouteEntry {
    template: String,
    handler: SharedHandler,
    descriptors: DescriptorSet,
    cors: Option<CorsPolicy>,
}

/// A built application, ready to handle events.
///
/// `App` is immutable; keep one per execution environment and reuse it
/// across warm invocations.
///
/// # Example
///
/// ```rust
/// use lamina::prelude::*;
/// use serde_json::json;
///
/// # tokio_test::block_on(async {
/// let app = App::builder()
///     .route(
///         Route::get("/users/{user_id}", |args: Arguments| async move {
///             json!({ "id": args.integer("user_id") })
///         })
///         .param(Param::path("user_id", ParamType::Integer)),
///     )
///     .build()
///     .unwrap();
///
/// let response = app
///     .handle_json(json!({ "httpMethod": "GET", "path": "/users/42" }))
///     .await;
///
/// assert_eq!(response.status_code, 200);
/// assert_eq!(response.json_body().unwrap(), json!({ "id": 42 }));
/// # });
/// ```
pub struct App {
    table: RouteTable<Arc<RouteEntry>>,
    chain: MiddlewareChain,
    translator: ErrorTranslator,
    cors: Option<CorsPolicy>,
    auth_provider: Option<Arc<dyn AuthProvider>>,
    credential_header: Arc<str>,
    root_path: String,
    method_not_allowed: bool,
}

impl App {
    /// Starts building an application.
    pub fn builder() -> AppBuilder {
        AppBuilder::new()
    }

    /// Handles a typed platform event.
    ///
    /// Always returns an envelope; failures become JSON error bodies.
    pub async fn handle(&self, event: ProxyEvent) -> ProxyResponse {
        let platform_id = event
            .request_context
            .as_ref()
            .and_then(|c| c.request_id.clone());

        match event.into_request() {
            Ok(request) => self.dispatch(request).await.into(),
            Err(error) => self.reject(&error, platform_id).into(),
        }
    }

    /// Handles a raw JSON event.
    ///
    /// An event that does not decode is answered with a 400 envelope.
    pub async fn handle_json(&self, event: Value) -> ProxyResponse {
        let platform_id = event
            .pointer("/requestContext/requestId")
            .and_then(Value::as_str)
            .map(ToString::to_string);

        match serde_json::from_value::<ProxyEvent>(event) {
            Ok(event) => self.handle(event).await,
            Err(e) => {
                let error = LaminaError::from(
                    ValidationFailure::invalid_type("event", ParamSource::Body, None, "proxy event")
                        .with_message(format!("malformed event: {e}")),
                );
                self.reject(&error, platform_id).into()
            }
        }
    }

    /// Dispatches a normalized request.
    pub async fn dispatch(&self, request: Request) -> Response {
        let _in_flight = InFlightGuard::new();

        let path = strip_root(&self.root_path, request.path()).to_string();
        let mut ctx = InvocationContext::new(request.method().clone(), path.as_str())
            .with_platform_request_id(request.platform_request_id().map(ToString::to_string));
        lamina_telemetry::log_invocation_start!(ctx.correlation_id(), ctx.method(), ctx.path());

        let origin = request.header("origin").map(ToString::to_string);

        let response = if *request.method() == Method::OPTIONS {
            self.preflight(&mut ctx, &path, origin.as_deref())
        } else {
            let (outcome, policy) = self.route(&mut ctx, request, &path).await;
            let mut response = outcome.unwrap_or_else(|error| self.translate(&error, &ctx));
            if let Some(policy) = policy {
                policy.annotate(&mut response, origin.as_deref());
            }
            response
        };

        self.finish(&ctx, response)
    }

    /// Iterates `(method, template)` pairs in registration order.
    pub fn routes(&self) -> impl Iterator<Item = (&Method, &str)> {
        self.table.iter().map(|(method, template, _)| (method, template.as_str()))
    }

    /// The normalized root path; empty when none is set.
    pub fn root_path(&self) -> &str {
        &self.root_path
    }

    /// The header the credential is read from.
    pub fn credential_header(&self) -> &str {
        &self.credential_header
    }

    fn preflight(
        &self,
        ctx: &mut InvocationContext,
        path: &str,
        origin: Option<&str>,
    ) -> Response {
        if let Some(found) = self.table.find_any(path) {
            ctx.set_route(found.template.as_str());
        }
        tracing::debug!(path, origin, "answering CORS preflight");
        self.path_policy(path)
            .map_or_else(Response::no_content, |policy| policy.preflight(origin))
    }

    async fn route(
        &self,
        ctx: &mut InvocationContext,
        mut request: Request,
        path: &str,
    ) -> (Outcome, Option<&CorsPolicy>) {
        match self.table.lookup(request.method(), path) {
            Lookup::Found(found) => {
                let entry = Arc::clone(found.value);
                let policy = found.value.cors.as_ref().or(self.cors.as_ref());
                ctx.set_route(entry.template.as_str());
                request.set_path_params(found.params);
                (self.run(ctx, request, entry).await, policy)
            }
            Lookup::MethodNotAllowed(allowed) => {
                let error = if self.method_not_allowed {
                    LaminaError::method_not_allowed(request.method(), allowed)
                } else {
                    not_found(&request)
                };
                (Err(error), self.path_policy(path))
            }
            Lookup::NotFound => (Err(not_found(&request)), self.cors.as_ref()),
        }
    }

    async fn run(&self, ctx: &mut InvocationContext, request: Request, entry: Arc<RouteEntry>) -> Outcome {
        let provider = self.auth_provider.clone();
        let header = Arc::clone(&self.credential_header);

        self.chain
            .run(ctx, request, move |_ctx, request| {
                Box::pin(async move {
                    let mut resolver = Resolver::new().with_credential_header(&header);
                    if let Some(provider) = provider.as_deref() {
                        resolver = resolver.with_auth_provider(provider);
                    }
                    let args = resolver.resolve(&entry.descriptors, request).await?;
                    handler::invoke(entry.handler.as_ref(), args).await
                })
            })
            .await
    }

    /// Policy for a path: the first matching route that has one, else the
    /// application policy.
    fn path_policy(&self, path: &str) -> Option<&CorsPolicy> {
        self.table
            .iter()
            .filter(|(_, template, _)| template.matches(path).is_some())
            .find_map(|(_, _, entry)| entry.cors.as_ref())
            .or(self.cors.as_ref())
    }

    fn translate(&self, error: &LaminaError, ctx: &InvocationContext) -> Response {
        match error {
            LaminaError::Validation(failure) => record_validation_failure(failure.source().as_str()),
            LaminaError::ValidationSet { failures, .. } => {
                for failure in failures {
                    record_validation_failure(failure.source().as_str());
                }
            }
            _ => {}
        }
        self.translator.translate(error, ctx)
    }

    /// Answers an event that never became a request.
    fn reject(&self, error: &LaminaError, platform_id: Option<String>) -> Response {
        let ctx = InvocationContext::new(Method::GET, "/").with_platform_request_id(platform_id);
        tracing::warn!(error = %error, "rejected undecodable event");
        let response = self.translate(error, &ctx);
        self.finish(&ctx, response)
    }

    fn finish(&self, ctx: &InvocationContext, response: Response) -> Response {
        let route = ctx.route().unwrap_or("unmatched");
        let status = response.status().as_u16();
        let elapsed = ctx.elapsed();
        let duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);

        record_invocation(route, status, elapsed);
        lamina_telemetry::log_invocation_complete!(ctx.correlation_id(), route, status, duration_ms);
        response
    }
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("routes", &self.table.len())
            .field("middleware", &self.chain)
            .field("cors", &self.cors.is_some())
            .field("auth_provider", &self.auth_provider.is_some())
            .field("credential_header", &self.credential_header)
            .field("root_path", &self.root_path)
            .field("method_not_allowed", &self.method_not_allowed)
            .finish_non_exhaustive()
    }
}

fn not_found(request: &Request) -> LaminaError {
    LaminaError::not_found(format!("no route matches {} {}", request.method(), request.path()))
}

/// Builder for [`App`].
///
/// Registration problems surface from [`build`](Self::build) as a
/// [`ConfigurationError`], never while handling a request.
pub struct AppBuilder {
    routes: Vec<Route>,
    chain: MiddlewareChain,
    translator: ErrorTranslator,
    cors: Option<CorsPolicy>,
    auth_provider: Option<Arc<dyn AuthProvider>>,
    credential_header: String,
    root_path: String,
    method_not_allowed: bool,
    pending: Option<ConfigurationError>,
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AppBuilder {
    /// Creates a builder with no routes and default settings.
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            chain: MiddlewareChain::new(),
            translator: ErrorTranslator::new(),
            cors: None,
            auth_provider: None,
            credential_header: DEFAULT_CREDENTIAL_HEADER.to_string(),
            root_path: String::new(),
            method_not_allowed: true,
            pending: None,
        }
    }

    /// Registers a route.
    #[must_use]
    pub fn route(mut self, route: Route) -> Self {
        self.routes.push(route);
        self
    }

    /// Registers every route of a group.
    #[must_use]
    pub fn include(mut self, group: RouteGroup) -> Self {
        self.routes.extend(group.into_routes());
        self
    }

    /// Appends a middleware stage. Stages run in registration order on the
    /// way in and reverse order on the way out.
    #[must_use]
    pub fn middleware<M: Middleware>(mut self, middleware: M) -> Self {
        self.chain.push(middleware);
        self
    }

    /// Appends an already shared middleware stage.
    #[must_use]
    pub fn shared_middleware(mut self, middleware: BoxedMiddleware) -> Self {
        self.chain.push_shared(middleware);
        self
    }

    /// Replaces the error translator.
    #[must_use]
    pub fn error_translator(mut self, translator: ErrorTranslator) -> Self {
        self.translator = translator;
        self
    }

    /// Sets the application-wide CORS policy.
    #[must_use]
    pub fn cors(mut self, policy: CorsPolicy) -> Self {
        self.cors = Some(policy);
        self
    }

    /// Installs the authentication provider used by identity parameters.
    #[must_use]
    pub fn auth_provider<P: AuthProvider>(self, provider: P) -> Self {
        self.shared_auth_provider(Arc::new(provider))
    }

    /// Installs an already shared authentication provider.
    #[must_use]
    pub fn shared_auth_provider(mut self, provider: Arc<dyn AuthProvider>) -> Self {
        self.auth_provider = Some(provider);
        self
    }

    /// Sets the header the credential is read from.
    #[must_use]
    pub fn credential_header(mut self, name: impl Into<String>) -> Self {
        self.credential_header = name.into();
        self
    }

    /// Sets a prefix stripped from incoming paths before matching.
    #[must_use]
    pub fn root_path(mut self, root_path: impl Into<String>) -> Self {
        self.root_path = root_path.into();
        self
    }

    /// Chooses between 405 (the default) and 404 for a method mismatch.
    #[must_use]
    pub fn method_not_allowed(mut self, enabled: bool) -> Self {
        self.method_not_allowed = enabled;
        self
    }

    /// Applies the `[app]` and `[cors]` sections of a configuration.
    ///
    /// An invalid `[cors]` section is reported by [`build`](Self::build).
    #[must_use]
    pub fn configure(mut self, config: &LaminaConfig) -> Self {
        self.root_path.clone_from(&config.app.root_path);
        self.credential_header.clone_from(&config.app.credential_header);
        self.method_not_allowed = config.app.method_not_allowed;

        match settings::cors_policy(&config.cors) {
            Ok(Some(policy)) => self.cors = Some(policy),
            Ok(None) => {}
            Err(error) => {
                self.pending.get_or_insert(error);
            }
        }
        self
    }

    /// Compiles every route.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigurationError`] found: an OPTIONS route, a
    /// template that does not parse, a parameter declaration that does not
    /// compile, an identity parameter without a provider, or a duplicate route.
    pub fn build(self) -> Result<App, ConfigurationError> {
        if let Some(error) = self.pending {
            return Err(error);
        }

        let mut table = RouteTable::new();
        for route in self.routes {
            let Route {
                method,
                path,
                handler,
                params,
                cors,
            } = route;

            if method == Method::OPTIONS {
                return Err(ConfigurationError::OptionsRoute { path });
            }

            let template = match PathTemplate::parse(&path) {
                Ok(template) => template,
                Err(source) => {
                    return Err(ConfigurationError::Template {
                        method,
                        path,
                        source,
                    })
                }
            };

            let descriptors =
                match DescriptorSet::build(template.as_str(), template.capture_names(), params) {
                    Ok(descriptors) => descriptors,
                    Err(source) => {
                        return Err(ConfigurationError::Descriptor {
                            method,
                            path,
                            source,
                        })
                    }
                };

            if descriptors.needs_identity() && self.auth_provider.is_none() {
                return Err(ConfigurationError::MissingAuthProvider { method, path });
            }

            let entry = Arc::new(RouteEntry {
                template: template.as_str().to_string(),
                handler,
                descriptors,
                cors,
            });
            table.insert(method, template, entry)?;
        }

        let app = App {
            table,
            chain: self.chain,
            translator: self.translator,
            cors: self.cors,
            auth_provider: self.auth_provider,
            credential_header: Arc::from(self.credential_header),
            root_path: normalize_root(&self.root_path),
            method_not_allowed: self.method_not_allowed,
        };
        tracing::debug!(
            routes = app.table.len(),
            middleware = ?app.chain.names(),
            root_path = %app.root_path,
            "application built"
        );
        Ok(app)
    }
}

impl fmt::Debug for AppBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppBuilder")
            .field("routes", &self.routes)
            .field("middleware", &self.chain)
            .field("root_path", &self.root_path)
            .finish_non_exhaustive()
    }
}

/// `"v1//api/"` becomes `"/v1/api"`; `""` and `"/"` mean no root path.
fn normalize_root(root: &str) -> String {
    let segments: Vec<&str> = root.split('/').filter(|s| !s.is_empty()).collect();
    if segments.is_empty() {
        String::new()
    } else {
        format!("/{}", segments.join("/"))
    }
}

fn strip_root<'a>(root: &str, path: &'a str) -> &'a str {
    if root.is_empty() {
        return path;
    }
    if path == root {
        return "/";
    }
    match path.strip_prefix(root) {
        Some(rest) if rest.starts_with('/') => rest,
        _ => path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lamina_core::{async_trait, BasicIdentity, SharedIdentity};
    use lamina_extract::{Arguments, Param, ParamType};

    async fn ok(_args: Arguments) -> &'static str {
        "ok"
    }

    struct AllowAll;

    #[async_trait]
    impl AuthProvider for AllowAll {
        async fn authenticate(&self, _credential: Option<&str>) -> Result<SharedIdentity, LaminaError> {
            Ok(Arc::new(BasicIdentity::new("anyone")))
        }
    }

    #[test]
    fn test_normalize_root() {
        assert_eq!(normalize_root(""), "");
        assert_eq!(normalize_root("/"), "");
        assert_eq!(normalize_root("prod"), "/prod");
        assert_eq!(normalize_root("/v1//api/"), "/v1/api");
    }

    #[test]
    fn test_strip_root() {
        assert_eq!(strip_root("", "/users"), "/users");
        assert_eq!(strip_root("/prod", "/prod"), "/");
        assert_eq!(strip_root("/prod", "/prod/users"), "/users");
        assert_eq!(strip_root("/prod", "/production/users"), "/production/users");
        assert_eq!(strip_root("/prod", "/users"), "/users");
    }

    #[test]
    fn test_build_collects_routes() {
        let app = App::builder()
            .route(Route::get("/a", ok))
            .route(Route::post("/a", ok))
            .root_path("v1/")
            .build()
            .unwrap();

        let routes: Vec<(Method, String)> = app
            .routes()
            .map(|(m, t)| (m.clone(), t.to_string()))
            .collect();
        assert_eq!(
            routes,
            vec![
                (Method::GET, "/a".to_string()),
                (Method::POST, "/a".to_string())
            ]
        );
        assert_eq!(app.root_path(), "/v1");
        assert_eq!(app.credential_header(), "authorization");
    }

    #[test]
    fn test_options_route_rejected() {
        let err = App::builder()
            .route(Route::new(Method::OPTIONS, "/a", ok))
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::OptionsRoute { path } if path == "/a"));
    }

    #[test]
    fn test_bad_template_rejected() {
        let err = App::builder()
            .route(Route::get("users", ok))
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::Template { .. }));
    }

    #[test]
    fn test_duplicate_route_rejected() {
        let err = App::builder()
            .route(Route::get("/a/{x}", ok))
            .route(Route::get("/a/{y}", ok))
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::Route(_)));
    }

    #[test]
    fn test_two_body_params_rejected() {
        let err = App::builder()
            .route(
                Route::post("/a", ok)
                    .param(Param::body("first", ParamType::Json))
                    .param(Param::body("second", ParamType::Json)),
            )
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::Descriptor { .. }));
    }

    #[test]
    fn test_identity_needs_provider() {
        let route = || Route::get("/me", ok).param(Param::identity("user"));

        let err = App::builder().route(route()).build().unwrap_err();
        assert!(matches!(err, ConfigurationError::MissingAuthProvider { .. }));

        assert!(App::builder()
            .auth_provider(AllowAll)
            .route(route())
            .build()
            .is_ok());
    }

    #[test]
    fn test_configure_applies_app_and_cors() {
        let mut config = LaminaConfig::default();
        config.app.root_path = "/stage".to_string();
        config.app.credential_header = "x-api-key".to_string();
        config.app.method_not_allowed = false;
        config.cors.enabled = true;

        let app = App::builder().configure(&config).build().unwrap();
        assert_eq!(app.root_path(), "/stage");
        assert_eq!(app.credential_header(), "x-api-key");
        assert!(!app.method_not_allowed);
        assert!(app.cors.is_some());
    }

    #[test]
    fn test_configure_defers_cors_errors_to_build() {
        let mut config = LaminaConfig::default();
        config.cors.enabled = true;
        config.cors.methods = vec!["NOT A METHOD".to_string()];

        let err = App::builder().configure(&config).build().unwrap_err();
        assert!(matches!(err, ConfigurationError::CorsMethod(_)));
    }
}
