//! # Lamina Extract
//!
//! Declared handler parameters, resolved from the request before the handler
//! runs.
//!
//! A handler lists its inputs as [`Param`]s. At registration the list is
//! compiled into a [`DescriptorSet`]: each parameter gets a fixed source,
//! its constraints are compiled, and its default is coerced. Per request the
//! [`Resolver`] reads raw values, coerces them, checks constraints, and
//! produces [`Arguments`].
//!
//! ## Sources
//!
//! | Declared as | Reads |
//! |-------------|-------|
//! | [`Param::path`] | a template capture |
//! | [`Param::query`] | the query string (all values for lists) |
//! | [`Param::header`] | a header, `_` in the name read as `-` |
//! | [`Param::body`] | the JSON body, or one top-level key when aliased |
//! | [`Param::identity`] | the caller, via the [`AuthProvider`](lamina_core::AuthProvider) |
//! | [`Param::new`] | inferred: structured types from the body, capture names from the path, else the query |
//!
//! ## Coercion
//!
//! Integers and floats that do not parse are validation failures, never
//! zero. Booleans are `true` for `true`, `1`, `yes`, `on` in any case and
//! `false` otherwise. Object fields are coerced recursively and failures name
//! the full field path (`user.address.city`).
//!
//! ## Example
//!
//! ```rust
//! # tokio_test::block_on(async {
//! use lamina_core::Request;
//! use lamina_extract::{DescriptorSet, Param, ParamType, Resolver};
//! use http::Method;
//!
//! let set = DescriptorSet::build(
//!     "/users/{user_id}",
//!     &["user_id".to_string()],
//!     vec![
//!         Param::new("user_id", ParamType::Integer).ge(1),
//!         Param::new("verbose", ParamType::Boolean).default(false),
//!     ],
//! )
//! .unwrap();
//!
//! let mut request = Request::new(Method::GET, "/users/42").with_query_param("verbose", "on");
//! request.set_path_params([("user_id", "42")].into_iter().collect());
//!
//! let args = Resolver::new().resolve(&set, request).await.unwrap();
//! assert_eq!(args.integer("user_id"), Some(42));
//! assert_eq!(args.bool("verbose"), Some(true));
//! # });
//! ```

#![doc(html_root_url = "https://docs.rs/lamina-extract/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod arguments;
mod coerce;
mod constraint;
mod descriptor;
mod error;
mod param;
mod resolver;
mod value;

pub use arguments::Arguments;
pub use coerce::{coerce_json, coerce_many, coerce_text, is_truthy};
pub use constraint::{Constraints, Pattern};
pub use descriptor::{DescriptorSet, ParamDescriptor};
pub use error::DescriptorError;
pub use param::{Field, IdentityRule, Param, ParamType};
pub use resolver::{Resolver, DEFAULT_CREDENTIAL_HEADER};
pub use value::ArgValue;
