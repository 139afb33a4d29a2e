//! Path matching for Lamina.
//!
//! Routes are registered as `{name}`-style templates and partitioned by HTTP
//! method. Fully literal templates resolve through a hash lookup; templates
//! with captures are scanned in registration order and the first one that
//! accepts the path wins.
//!
//! # Example
//!
//! ```rust
//! use lamina_router::{Lookup, PathTemplate, RouteTable};
//! use http::Method;
//!
//! let mut table = RouteTable::new();
//! table.insert(Method::GET, PathTemplate::parse("/users").unwrap(), "list_users").unwrap();
//! table.insert(Method::GET, PathTemplate::parse("/users/{user_id}").unwrap(), "get_user").unwrap();
//!
//! let Lookup::Found(found) = table.lookup(&Method::GET, "/users/42") else {
//!     panic!("route should match");
//! };
//! assert_eq!(*found.value, "get_user");
//! assert_eq!(found.params.get("user_id"), Some("42"));
//! ```
//!
//! # Matching rules
//!
//! ```text
//!   template   /orgs/{org}/users/{id}
//!   segments   ""  "orgs"  {org}  "users"  {id}
//!   path       /orgs/acme/users/42
//!   segments   ""  "orgs"  "acme" "users"  "42"
//! ```
//!
//! Segment counts must be equal, literal segments byte-identical, and each
//! capture takes one non-empty segment.

mod params;
mod table;
mod template;

pub use params::PathParams;
pub use table::{Lookup, RouteError, RouteMatch, RouteTable};
pub use template::{PathTemplate, TemplateError};
