//! # Lamina Test
//!
//! In-memory invocation helpers for Lamina applications. Requests are built
//! as platform proxy events and fed straight into
//! [`App::handle`](lamina::App::handle), so routing, parameter resolution,
//! middleware, CORS and error rendering all run exactly as they do on the
//! platform.
//!
//! ## Example
//!
//! ```rust
//! use lamina::prelude::*;
//! use lamina_test::TestClient;
//! use serde_json::json;
//!
//! # tokio_test::block_on(async {
//! let app = App::builder()
//!     .route(
//!         Route::get("/users/{user_id}", |args: Arguments| async move {
//!             json!({ "id": args.integer("user_id") })
//!         })
//!         .param(Param::path("user_id", ParamType::Integer)),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let client = TestClient::new(app);
//!
//! client
//!     .get("/users/42")
//!     .send()
//!     .await
//!     .assert_status_code(200)
//!     .assert_json_field("id", &json!(42));
//!
//! client
//!     .get("/users/abc")
//!     .send()
//!     .await
//!     .assert_status_code(400)
//!     .assert_error_code("VALIDATION_ERROR");
//! # });
//! ```

#![doc(html_root_url = "https://docs.rs/lamina-test/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod error;
mod request;
mod response;

pub use client::{TestClient, TestClientRequest};
pub use error::TestError;
pub use request::{TestRequest, TestRequestBuilder};
pub use response::TestResponse;
