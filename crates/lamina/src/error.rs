//! Registration-time errors.

use http::Method;
use lamina_extract::DescriptorError;
use lamina_router::{RouteError, TemplateError};
use thiserror::Error;

/// A problem with how the application was assembled.
///
/// Returned by [`AppBuilder::build`](crate::AppBuilder::build); never
/// produced while handling a request.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// A route's path does not compile.
    #[error("route {method} {path}: {source}")]
    Template {
        /// Method of the rejected route.
        method: Method,
        /// Path as registered.
        path: String,
        /// Why the template was rejected.
        #[source]
        source: TemplateError,
    },

    /// Two routes share a method and template shape.
    #[error(transparent)]
    Route(#[from] RouteError),

    /// A route's parameter declarations do not compile.
    #[error("route {method} {path}: {source}")]
    Descriptor {
        /// Method of the rejected route.
        method: Method,
        /// Path as registered.
        path: String,
        /// The declaration problem.
        #[source]
        source: DescriptorError,
    },

    /// A route declares an identity parameter but no provider is installed.
    #[error("route {method} {path} declares an identity parameter but no auth provider is configured")]
    MissingAuthProvider {
        /// Method of the rejected route.
        method: Method,
        /// Path as registered.
        path: String,
    },

    /// OPTIONS is answered by the CORS negotiator and cannot be routed.
    #[error("route OPTIONS {path}: OPTIONS requests are answered as CORS preflights")]
    OptionsRoute {
        /// Path as registered.
        path: String,
    },

    /// A configured CORS method is not an HTTP method token.
    #[error("invalid CORS method '{0}'")]
    CorsMethod(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_route() {
        let err = ConfigurationError::MissingAuthProvider {
            method: Method::GET,
            path: "/me".to_string(),
        };
        assert!(err.to_string().starts_with("route GET /me"));

        let err = ConfigurationError::OptionsRoute {
            path: "/items".to_string(),
        };
        assert!(err.to_string().contains("preflight"));
    }

    #[test]
    fn test_route_error_is_transparent() {
        let err: ConfigurationError = RouteError::Duplicate {
            method: Method::GET,
            template: "/a/{x}".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "duplicate route: GET /a/{x}");
    }
}
