//! Method-partitioned route table.
//!
//! Routes are split per HTTP method into literal templates, held in a hash
//! map keyed by the exact path, and capture templates, held in registration
//! order. Lookup tries the literal map first and then scans the capture list;
//! the first registered capture route that accepts the path wins.

use crate::params::PathParams;
use crate::template::PathTemplate;
use http::Method;
use std::collections::HashMap;
use thiserror::Error;

/// A registration rejected by the table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// The method already has a route with the same template shape.
    #[error("duplicate route: {method} {template}")]
    Duplicate {
        /// The method of the rejected route.
        method: Method,
        /// The template of the rejected route.
        template: String,
    },
}

#[derive(Debug)]
struct Entry<T> {
    method: Method,
    template: PathTemplate,
    value: T,
}

#[derive(Debug, Default)]
struct MethodRoutes {
    literal: HashMap<String, usize>,
    captured: Vec<usize>,
}

/// The result of a lookup.
#[derive(Debug)]
pub enum Lookup<'a, T> {
    /// A route matched.
    Found(RouteMatch<'a, T>),
    /// The path matched routes, but only under other methods.
    MethodNotAllowed(Vec<Method>),
    /// No route matched the path.
    NotFound,
}

/// A matched route with its captured parameters.
#[derive(Debug)]
pub struct RouteMatch<'a, T> {
    /// The value registered for the route.
    pub value: &'a T,
    /// The route's template.
    pub template: &'a PathTemplate,
    /// Values captured from the path.
    pub params: PathParams,
}

/// Routes keyed by method and path template.
///
/// # Example
///
/// ```rust
/// use lamina_router::{Lookup, PathTemplate, RouteTable};
/// use http::Method;
///
/// let mut table = RouteTable::new();
/// table.insert(Method::GET, PathTemplate::parse("/users/{id}").unwrap(), "get_user").unwrap();
/// table.insert(Method::GET, PathTemplate::parse("/users/me").unwrap(), "me").unwrap();
///
/// // Literal templates are resolved before capture templates.
/// match table.lookup(&Method::GET, "/users/me") {
///     Lookup::Found(found) => assert_eq!(*found.value, "me"),
///     _ => unreachable!(),
/// }
///
/// match table.lookup(&Method::GET, "/users/7") {
///     Lookup::Found(found) => assert_eq!(found.params.get("id"), Some("7")),
///     _ => unreachable!(),
/// }
///
/// assert!(matches!(table.lookup(&Method::DELETE, "/users/7"), Lookup::MethodNotAllowed(_)));
/// assert!(matches!(table.lookup(&Method::GET, "/posts"), Lookup::NotFound));
/// ```
#[derive(Debug)]
pub struct RouteTable<T> {
    entries: Vec<Entry<T>>,
    by_method: HashMap<Method, MethodRoutes>,
}

impl<T> Default for RouteTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RouteTable<T> {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            by_method: HashMap::new(),
        }
    }

    /// Registers a route.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::Duplicate`] when the method already has a route
    /// whose template has the same shape; `/a/{x}` and `/a/{y}` collide.
    pub fn insert(
        &mut self,
        method: Method,
        template: PathTemplate,
        value: T,
    ) -> Result<(), RouteError> {
        let shape = template.shape();
        let duplicate = self
            .entries
            .iter()
            .any(|e| e.method == method && e.template.shape() == shape);
        if duplicate {
            return Err(RouteError::Duplicate {
                method,
                template: template.as_str().to_string(),
            });
        }

        let index = self.entries.len();
        let routes = self.by_method.entry(method.clone()).or_default();
        if template.is_literal() {
            routes.literal.insert(template.as_str().to_string(), index);
        } else {
            routes.captured.push(index);
        }
        self.entries.push(Entry {
            method,
            template,
            value,
        });
        Ok(())
    }

    /// Resolves a method and path.
    #[must_use]
    pub fn lookup(&self, method: &Method, path: &str) -> Lookup<'_, T> {
        if let Some(found) = self.lookup_method(method, path) {
            return Lookup::Found(found);
        }

        let mut allowed: Vec<Method> = Vec::new();
        for entry in &self.entries {
            if &entry.method != method
                && !allowed.contains(&entry.method)
                && entry.template.matches(path).is_some()
            {
                allowed.push(entry.method.clone());
            }
        }

        if allowed.is_empty() {
            Lookup::NotFound
        } else {
            Lookup::MethodNotAllowed(allowed)
        }
    }

    /// Returns the first registered route, under any method, whose template
    /// accepts `path`.
    #[must_use]
    pub fn find_any(&self, path: &str) -> Option<RouteMatch<'_, T>> {
        self.entries.iter().find_map(|entry| {
            entry.template.matches(path).map(|params| RouteMatch {
                value: &entry.value,
                template: &entry.template,
                params,
            })
        })
    }

    /// Iterates routes in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&Method, &PathTemplate, &T)> {
        self.entries
            .iter()
            .map(|e| (&e.method, &e.template, &e.value))
    }

    /// Returns the number of routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no routes are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn lookup_method(&self, method: &Method, path: &str) -> Option<RouteMatch<'_, T>> {
        let routes = self.by_method.get(method)?;

        if let Some(&index) = routes.literal.get(path) {
            let entry = &self.entries[index];
            return Some(RouteMatch {
                value: &entry.value,
                template: &entry.template,
                params: PathParams::new(),
            });
        }

        routes.captured.iter().find_map(|&index| {
            let entry = &self.entries[index];
            entry.template.matches(path).map(|params| RouteMatch {
                value: &entry.value,
                template: &entry.template,
                params,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(routes: &[(Method, &'static str)]) -> RouteTable<&'static str> {
        let mut table = RouteTable::new();
        for (method, path) in routes {
            table
                .insert(method.clone(), PathTemplate::parse(path).unwrap(), *path)
                .unwrap();
        }
        table
    }

    fn found<'a>(lookup: Lookup<'a, &'static str>) -> RouteMatch<'a, &'static str> {
        match lookup {
            Lookup::Found(found) => found,
            other => panic!("expected a match, got {other:?}"),
        }
    }

    #[test]
    fn test_literal_lookup() {
        let table = table(&[(Method::GET, "/users"), (Method::POST, "/users")]);
        let m = found(table.lookup(&Method::GET, "/users"));
        assert_eq!(*m.value, "/users");
        assert!(m.params.is_empty());
        assert_eq!(m.template.as_str(), "/users");
    }

    #[test]
    fn test_capture_lookup() {
        let table = table(&[(Method::GET, "/users/{user_id}")]);
        let m = found(table.lookup(&Method::GET, "/users/42"));
        assert_eq!(m.params.get("user_id"), Some("42"));
    }

    #[test]
    fn test_literal_beats_earlier_capture() {
        let table = table(&[(Method::GET, "/items/{id}"), (Method::GET, "/items/special")]);
        let m = found(table.lookup(&Method::GET, "/items/special"));
        assert_eq!(*m.value, "/items/special");

        let m = found(table.lookup(&Method::GET, "/items/7"));
        assert_eq!(*m.value, "/items/{id}");
    }

    #[test]
    fn test_first_registered_capture_wins() {
        let table = table(&[
            (Method::GET, "/items/{id}/detail"),
            (Method::GET, "/items/{name}/{view}"),
        ]);
        let m = found(table.lookup(&Method::GET, "/items/7/detail"));
        assert_eq!(*m.value, "/items/{id}/detail");

        let table = table_reversed();
        let m = found(table.lookup(&Method::GET, "/items/7/detail"));
        assert_eq!(*m.value, "/items/{name}/{view}");
    }

    fn table_reversed() -> RouteTable<&'static str> {
        table(&[
            (Method::GET, "/items/{name}/{view}"),
            (Method::GET, "/items/{id}/detail"),
        ])
    }

    #[test]
    fn test_method_not_allowed_lists_methods() {
        let table = table(&[
            (Method::GET, "/users/{id}"),
            (Method::DELETE, "/users/{id}"),
            (Method::GET, "/users"),
        ]);
        match table.lookup(&Method::PUT, "/users/9") {
            Lookup::MethodNotAllowed(allowed) => {
                assert_eq!(allowed, vec![Method::GET, Method::DELETE]);
            }
            other => panic!("expected 405, got {other:?}"),
        }
    }

    #[test]
    fn test_not_found() {
        let table = table(&[(Method::GET, "/users/{id}")]);
        assert!(matches!(table.lookup(&Method::GET, "/users"), Lookup::NotFound));
        assert!(matches!(
            table.lookup(&Method::GET, "/users/1/2"),
            Lookup::NotFound
        ));
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut table = table(&[(Method::GET, "/items/{id}")]);
        let err = table
            .insert(Method::GET, PathTemplate::parse("/items/{key}").unwrap(), "dup")
            .unwrap_err();
        assert_eq!(
            err,
            RouteError::Duplicate {
                method: Method::GET,
                template: "/items/{key}".into()
            }
        );

        table
            .insert(Method::POST, PathTemplate::parse("/items/{id}").unwrap(), "post")
            .unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_find_any_ignores_method() {
        let table = table(&[(Method::POST, "/upload"), (Method::GET, "/files/{name}")]);
        let m = table.find_any("/files/a.txt").unwrap();
        assert_eq!(*m.value, "/files/{name}");
        assert!(table.find_any("/missing").is_none());
    }

    #[test]
    fn test_iter_in_registration_order() {
        let table = table(&[(Method::POST, "/b"), (Method::GET, "/a")]);
        let order: Vec<_> = table.iter().map(|(_, t, _)| t.as_str()).collect();
        assert_eq!(order, ["/b", "/a"]);
    }
}
