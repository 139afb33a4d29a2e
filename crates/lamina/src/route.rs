//! Route declarations and route groups.

use std::fmt;
use std::sync::Arc;

use http::Method;
use lamina_extract::Param;
use lamina_middleware::CorsPolicy;

use crate::handler::{Handler, SharedHandler};

/// A route as declared: method, path template, handler, parameters and an
/// optional CORS policy.
///
/// Nothing is compiled until [`AppBuilder::build`](crate::AppBuilder::build).
///
/// ```rust
/// use lamina::{Arguments, Route};
/// use lamina::extract::{Param, ParamType};
///
/// let route = Route::get("/users/{user_id}", |args: Arguments| async move {
///     serde_json::json!({ "id": args.integer("user_id") })
/// })
/// .param(Param::path("user_id", ParamType::Integer).ge(1));
///
/// assert_eq!(route.path(), "/users/{user_id}");
/// ```
#[derive(Clone)]
pub struct Route {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) handler: SharedHandler,
    pub(crate) params: Vec<Param>,
    pub(crate) cors: Option<CorsPolicy>,
}

impl Route {
    /// Declares a route for any method.
    pub fn new(method: Method, path: impl Into<String>, handler: impl Handler) -> Self {
        Self {
            method,
            path: path.into(),
            handler: Arc::new(handler),
            params: Vec::new(),
            cors: None,
        }
    }

    /// Declares a `GET` route.
    pub fn get(path: impl Into<String>, handler: impl Handler) -> Self {
        Self::new(Method::GET, path, handler)
    }

    /// Declares a `POST` route.
    pub fn post(path: impl Into<String>, handler: impl Handler) -> Self {
        Self::new(Method::POST, path, handler)
    }

    /// Declares a `PUT` route.
    pub fn put(path: impl Into<String>, handler: impl Handler) -> Self {
        Self::new(Method::PUT, path, handler)
    }

    /// Declares a `PATCH` route.
    pub fn patch(path: impl Into<String>, handler: impl Handler) -> Self {
        Self::new(Method::PATCH, path, handler)
    }

    /// Declares a `DELETE` route.
    pub fn delete(path: impl Into<String>, handler: impl Handler) -> Self {
        Self::new(Method::DELETE, path, handler)
    }

    /// Declares one parameter. Parameters resolve in declaration order.
    #[must_use]
    pub fn param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    /// Declares several parameters.
    #[must_use]
    pub fn params(mut self, params: impl IntoIterator<Item = Param>) -> Self {
        self.params.extend(params);
        self
    }

    /// Sets a route-level CORS policy, overriding group and application policies.
    #[must_use]
    pub fn cors(mut self, policy: CorsPolicy) -> Self {
        self.cors = Some(policy);
        self
    }

    /// The route's method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The route's path template as declared.
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("params", &self.params.iter().map(Param::name).collect::<Vec<_>>())
            .field("cors", &self.cors.is_some())
            .finish_non_exhaustive()
    }
}

/// Routes sharing a path prefix and, optionally, a CORS policy.
///
/// ```rust
/// use lamina::{Arguments, Route, RouteGroup};
///
/// let group = RouteGroup::new("/admin")
///     .route(Route::get("/stats", |_args: Arguments| async { "ok" }));
///
/// assert_eq!(group.routes()[0].path(), "/admin/stats");
/// ```
#[derive(Debug, Clone, Default)]
pub struct RouteGroup {
    prefix: String,
    routes: Vec<Route>,
    cors: Option<CorsPolicy>,
}

impl RouteGroup {
    /// Creates an empty group. Member paths are appended to `prefix`.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into().trim_end_matches('/').to_string(),
            routes: Vec::new(),
            cors: None,
        }
    }

    /// Adds a route, prefixing its path.
    #[must_use]
    pub fn route(mut self, mut route: Route) -> Self {
        route.path = join(&self.prefix, &route.path);
        self.routes.push(route);
        self
    }

    /// Sets the policy for members that declare none of their own.
    #[must_use]
    pub fn cors(mut self, policy: CorsPolicy) -> Self {
        self.cors = Some(policy);
        self
    }

    /// The normalized prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Member routes with prefixed paths.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Consumes the group, applying its policy to members without one.
    pub(crate) fn into_routes(self) -> Vec<Route> {
        let cors = self.cors;
        self.routes
            .into_iter()
            .map(|mut route| {
                if route.cors.is_none() {
                    route.cors.clone_from(&cors);
                }
                route
            })
            .collect()
    }
}

fn join(prefix: &str, path: &str) -> String {
    match (prefix.is_empty(), path) {
        (true, _) => path.to_string(),
        (false, "" | "/") => prefix.to_string(),
        (false, _) => format!("{prefix}{path}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lamina_extract::ParamType;

    async fn ok(_args: lamina_extract::Arguments) -> &'static str {
        "ok"
    }

    #[test]
    fn test_route_builders() {
        let route = Route::post("/items", ok)
            .param(Param::body("item", ParamType::Json))
            .params([Param::header("x_trace", ParamType::String).optional()]);
        assert_eq!(route.method(), &Method::POST);
        assert_eq!(route.params.len(), 2);
        assert!(route.cors.is_none());

        assert_eq!(Route::put("/a", ok).method(), &Method::PUT);
        assert_eq!(Route::patch("/a", ok).method(), &Method::PATCH);
        assert_eq!(Route::delete("/a", ok).method(), &Method::DELETE);
    }

    #[test]
    fn test_group_prefixes_paths() {
        let group = RouteGroup::new("/v1/")
            .route(Route::get("/users", ok))
            .route(Route::get("/", ok));
        assert_eq!(group.prefix(), "/v1");
        let paths: Vec<&str> = group.routes().iter().map(Route::path).collect();
        assert_eq!(paths, vec!["/v1/users", "/v1"]);
    }

    #[test]
    fn test_empty_prefix_keeps_paths() {
        let group = RouteGroup::new("/").route(Route::get("/users", ok));
        assert_eq!(group.routes()[0].path(), "/users");
    }

    #[test]
    fn test_group_policy_fills_gaps_only() {
        let own = CorsPolicy::builder().allow_origin("https://own.test").build();
        let shared = CorsPolicy::builder().allow_origin("https://group.test").build();

        let routes = RouteGroup::new("/g")
            .cors(shared.clone())
            .route(Route::get("/a", ok).cors(own.clone()))
            .route(Route::get("/b", ok))
            .into_routes();

        assert_eq!(routes[0].cors.as_ref(), Some(&own));
        assert_eq!(routes[1].cors.as_ref(), Some(&shared));
    }
}
