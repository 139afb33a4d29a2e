//! CORS negotiation through the dispatcher.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use http::Method;
use lamina::prelude::*;
use lamina_test::TestClient;

fn site_policy() -> CorsPolicy {
    CorsPolicy::builder()
        .allow_origins(["https://app.example.com"])
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(["content-type", "authorization"])
        .expose_headers(["x-request-id"])
        .allow_credentials(true)
        .max_age(Duration::from_secs(600))
        .build()
}

#[tokio::test]
async fn test_preflight_never_runs_handler() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let app = App::builder()
        .cors(site_policy())
        .route(Route::post("/orders", move |_args: Arguments| {
            counter.fetch_add(1, Ordering::SeqCst);
            async { "created" }
        }))
        .build()
        .unwrap();
    let client = TestClient::new(app);

    client
        .options("/orders")
        .origin("https://app.example.com")
        .header("access-control-request-method", "POST")
        .send()
        .await
        .assert_status_code(204)
        .assert_body_empty()
        .assert_header("access-control-allow-origin", "https://app.example.com")
        .assert_header("access-control-allow-methods", "GET, POST")
        .assert_header("access-control-allow-headers", "content-type, authorization")
        .assert_header("access-control-allow-credentials", "true")
        .assert_header("access-control-max-age", "600")
        .assert_header("vary", "Origin");

    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_preflight_for_unknown_path_still_answers() {
    let app = App::builder()
        .cors(site_policy())
        .route(Route::get("/orders", |_args: Arguments| async { "list" }))
        .build()
        .unwrap();
    let client = TestClient::new(app);

    client
        .options("/anything")
        .origin("https://app.example.com")
        .send()
        .await
        .assert_status_code(204);
}

#[tokio::test]
async fn test_preflight_without_policy_is_bare() {
    let app = App::builder()
        .route(Route::get("/orders", |_args: Arguments| async { "list" }))
        .build()
        .unwrap();
    let client = TestClient::new(app);

    client
        .options("/orders")
        .origin("https://app.example.com")
        .send()
        .await
        .assert_status_code(204)
        .assert_no_header("access-control-allow-origin");
}

#[tokio::test]
async fn test_unlisted_origin_gets_no_allow_origin() {
    let app = App::builder()
        .cors(site_policy())
        .route(Route::get("/orders", |_args: Arguments| async { "list" }))
        .build()
        .unwrap();
    let client = TestClient::new(app);

    client
        .get("/orders")
        .origin("https://evil.example.net")
        .send()
        .await
        .assert_success()
        .assert_no_header("access-control-allow-origin");
}

#[tokio::test]
async fn test_actual_response_is_annotated() {
    let app = App::builder()
        .cors(site_policy())
        .route(Route::get("/orders", |_args: Arguments| async { "list" }))
        .build()
        .unwrap();
    let client = TestClient::new(app);

    client
        .get("/orders")
        .origin("https://app.example.com")
        .send()
        .await
        .assert_success()
        .assert_header("access-control-allow-origin", "https://app.example.com")
        .assert_header("access-control-expose-headers", "x-request-id")
        .assert_header("access-control-allow-credentials", "true");
}

#[tokio::test]
async fn test_error_responses_carry_cors_headers() {
    let app = App::builder()
        .cors(CorsPolicy::builder().allow_any_origin().build())
        .route(
            Route::get("/items", |args: Arguments| async move {
                serde_json::json!({ "limit": args.integer("limit") })
            })
            .param(Param::query("limit", ParamType::Integer)),
        )
        .build()
        .unwrap();
    let client = TestClient::new(app);

    client
        .get("/items?limit=x")
        .origin("https://anywhere.test")
        .send()
        .await
        .assert_status_code(400)
        .assert_header("access-control-allow-origin", "*");

    client
        .get("/missing")
        .origin("https://anywhere.test")
        .send()
        .await
        .assert_status_code(404)
        .assert_header("access-control-allow-origin", "*");

    client
        .post("/items")
        .origin("https://anywhere.test")
        .send()
        .await
        .assert_status_code(405)
        .assert_header("access-control-allow-origin", "*");
}

#[tokio::test]
async fn test_route_and_group_policies_override_app() {
    let app = App::builder()
        .cors(site_policy())
        .include(
            RouteGroup::new("/partner")
                .cors(CorsPolicy::builder().allow_origin("https://partner.test").build())
                .route(Route::get("/feed", |_args: Arguments| async { "feed" }))
                .route(
                    Route::get("/public", |_args: Arguments| async { "public" })
                        .cors(CorsPolicy::builder().allow_any_origin().build()),
                ),
        )
        .route(Route::get("/orders", |_args: Arguments| async { "list" }))
        .build()
        .unwrap();
    let client = TestClient::new(app);

    client
        .get("/partner/feed")
        .origin("https://partner.test")
        .send()
        .await
        .assert_header("access-control-allow-origin", "https://partner.test");
    client
        .get("/partner/feed")
        .origin("https://app.example.com")
        .send()
        .await
        .assert_no_header("access-control-allow-origin");

    client
        .options("/partner/public")
        .origin("https://elsewhere.test")
        .send()
        .await
        .assert_header("access-control-allow-origin", "*");

    client
        .get("/orders")
        .origin("https://app.example.com")
        .send()
        .await
        .assert_header("access-control-allow-origin", "https://app.example.com");
}

#[test]
fn test_options_route_is_rejected() {
    let result = App::builder()
        .route(Route::new(Method::OPTIONS, "/orders", |_args: Arguments| async { "no" }))
        .build();
    assert!(matches!(result, Err(ConfigurationError::OptionsRoute { .. })));
}
