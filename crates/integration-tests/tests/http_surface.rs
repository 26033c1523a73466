//! HTTP surface tests that run without a database.
//!
//! Everything here fails or succeeds before any query executes: health,
//! routing, bearer-token rejection, and request validation.

#![allow(clippy::unwrap_used)]

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use paperback_integration_tests::test_app;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_returns_ok() {
    let app = test_app();

    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"ok");
}

#[tokio::test]
async fn unknown_route_is_404() {
    let app = test_app();

    let response = app
        .oneshot(Request::get("/api/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn cart_requires_authentication() {
    let app = test_app();

    let response = app
        .oneshot(Request::get("/api/cart").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await;
    assert!(body["timestamp"].is_string());
    assert_eq!(body["errors"][0], "authentication required");
}

#[tokio::test]
async fn garbage_bearer_token_is_rejected() {
    let app = test_app();

    let response = app
        .oneshot(
            Request::get("/api/orders")
                .header(header::AUTHORIZATION, "Bearer not.a.token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await;
    assert_eq!(body["errors"][0], "invalid or expired token");
}

#[tokio::test]
async fn wrong_auth_scheme_is_rejected() {
    let app = test_app();

    let response = app
        .oneshot(
            Request::post("/api/orders")
                .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn book_mutations_require_a_token() {
    let app = test_app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/books",
            json!({
                "title": "The Name of the Wind",
                "author": "Patrick Rothfuss",
                "isbn": "9780756404079",
                "price": "9.99"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn order_status_update_requires_a_token() {
    let app = test_app();

    let response = app
        .oneshot(json_request(
            "PATCH",
            "/api/orders/1",
            json!({ "status": "PAID" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn register_rejects_blank_names() {
    let app = test_app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/auth/register",
            json!({
                "email": "reader@example.com",
                "password": "hunter2hunter2",
                "repeat_password": "hunter2hunter2",
                "first_name": "  ",
                "last_name": ""
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    let errors = body["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0], "first_name must not be blank");
    assert_eq!(errors[1], "last_name must not be blank");
}

#[tokio::test]
async fn register_rejects_invalid_email() {
    let app = test_app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/auth/register",
            json!({
                "email": "not-an-email",
                "password": "hunter2hunter2",
                "repeat_password": "hunter2hunter2",
                "first_name": "Kvothe",
                "last_name": "Lackless"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn register_rejects_short_password() {
    let app = test_app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/auth/register",
            json!({
                "email": "reader@example.com",
                "password": "short",
                "repeat_password": "short",
                "first_name": "Kvothe",
                "last_name": "Lackless"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert!(
        body["errors"][0]
            .as_str()
            .unwrap()
            .contains("at least 8 characters")
    );
}

#[tokio::test]
async fn register_rejects_mismatched_passwords() {
    let app = test_app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/auth/register",
            json!({
                "email": "reader@example.com",
                "password": "hunter2hunter2",
                "repeat_password": "hunter2hunter3",
                "first_name": "Kvothe",
                "last_name": "Lackless"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["errors"][0], "the password fields must match");
}
