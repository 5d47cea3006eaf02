// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API authentication, role and CORS tests.
//!
//! These tests verify that:
//! 1. Protected routes reject requests without valid tokens
//! 2. Trainer and admin routes reject the wrong role before any handler runs
//! 3. CORS preflight requests return correct headers

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use homefit::middleware::auth::{create_jwt, Role, SESSION_COOKIE};
use tower::ServiceExt;

mod common;
use common::{create_test_app, create_test_jwt};

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_protected_route_without_token() {
    let (app, _) = create_test_app();

    let response = app.oneshot(get("/api/me", None)).await.unwrap();

    // Should return 401 Unauthorized without token
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_route_with_invalid_token() {
    let (app, _) = create_test_app();

    let response = app
        .oneshot(get("/api/me/bookings", Some("invalid.token.here")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_signed_with_other_key_rejected() {
    let (app, _) = create_test_app();
    let token = create_jwt(
        "client-1",
        Role::Client,
        None,
        None,
        b"some_other_key_that_is_32_bytes",
    )
    .unwrap();

    let response = app.oneshot(get("/api/me", Some(&token))).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_route_with_valid_token() {
    let (app, _) = create_test_app();
    let token = create_test_jwt("client-1", Role::Client);

    let response = app
        .oneshot(get("/api/me/bookings", Some(&token)))
        .await
        .unwrap();

    // With valid token: 200 if Firestore available, 500 if Firestore unavailable
    // The key check is that we DON'T get 401 (authentication succeeded)
    let status = response.status();
    assert!(
        status == StatusCode::OK || status == StatusCode::INTERNAL_SERVER_ERROR,
        "Expected 200 or 500, got {}. Auth should pass, Firestore may fail without emulator.",
        status
    );
}

#[tokio::test]
async fn test_session_cookie_accepted() {
    let (app, _) = create_test_app();
    let token = create_test_jwt("client-1", Role::Client);

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/me/bookings")
                .header(header::COOKIE, format!("{}={}", SESSION_COOKIE, token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_ne!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_client_cannot_reach_trainer_routes() {
    let (app, _) = create_test_app();
    let token = create_test_jwt("client-1", Role::Client);

    let response = app
        .oneshot(get("/api/trainer/bookings", Some(&token)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_trainer_cannot_reach_admin_routes() {
    let (app, _) = create_test_app();
    let token = create_test_jwt("trainer-1", Role::Trainer);

    let response = app
        .oneshot(get("/api/admin/bookings", Some(&token)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_passes_trainer_role_check() {
    let (app, _) = create_test_app();
    let token = create_test_jwt("admin-1", Role::Admin);

    let response = app
        .oneshot(get("/api/trainer/bookings", Some(&token)))
        .await
        .unwrap();

    let status = response.status();
    assert!(
        status == StatusCode::OK || status == StatusCode::INTERNAL_SERVER_ERROR,
        "Expected 200 or 500, got {}",
        status
    );
}

#[tokio::test]
async fn test_admin_route_without_token() {
    let (app, _) = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/admin/bookings/b1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_cors_preflight() {
    let (app, _) = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/admin/bookings/b1")
                .header(header::ORIGIN, "http://localhost:5173")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "PATCH")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // OPTIONS should return 200 (CORS preflight success)
    assert_eq!(response.status(), StatusCode::OK);

    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_METHODS));
}

#[tokio::test]
async fn test_public_route_no_auth_required() {
    let (app, _) = create_test_app();

    let response = app.oneshot(get("/health", None)).await.unwrap();

    // Health should be accessible without auth
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CACHE_CONTROL).unwrap(),
        "no-store"
    );
}

#[tokio::test]
async fn test_catalog_is_public() {
    let (app, _) = create_test_app();

    let response = app.oneshot(get("/api/catalog", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["zone_radius_km"], 1.0);
    assert_eq!(json["zones"].as_array().unwrap().len(), 5);
    assert!(json["categories"]
        .as_array()
        .unwrap()
        .iter()
        .any(|c| c["name"] == "Pro Training" && c["price"] == 399));
}
