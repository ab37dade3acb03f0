//! Request helpers for driving the router in-process.

use axum::body::{to_bytes, Body};
use axum::http::{header::CONTENT_TYPE, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use signup_core::kernel::TestDependencies;
use signup_core::server::{build_app, AppOptions};
use tower::ServiceExt;

/// Router over mock services, without rate limiting (there is no peer address in oneshot)
pub fn test_app(deps: TestDependencies) -> Router {
    build_app(
        deps.into_server_deps(),
        AppOptions {
            allowed_origins: Vec::new(),
            rate_limit_enabled: false,
        },
    )
}

/// Send a request and return status plus raw body text
pub async fn send(app: &Router, method: Method, uri: &str, body: Option<&str>) -> (StatusCode, String) {
    let mut builder = Request::builder().method(method).uri(uri);
    if body.is_some() {
        builder = builder.header(CONTENT_TYPE, "application/json");
    }
    let request = builder
        .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

/// POST a raw body and parse the JSON response
pub async fn post_json(app: &Router, uri: &str, body: &str) -> (StatusCode, Value) {
    let (status, text) = send(app, Method::POST, uri, Some(body)).await;
    (status, serde_json::from_str(&text).unwrap())
}

pub async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let (status, text) = send(app, Method::GET, uri, None).await;
    (status, serde_json::from_str(&text).unwrap())
}
