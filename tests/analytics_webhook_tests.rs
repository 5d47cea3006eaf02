// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Analytics webhook delivery tests.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use homefit::config::Config;
use homefit::middleware::auth::Role;
use homefit::models::Booking;
use homefit::routes::create_router;
use homefit::services::{AnalyticsEvent, AnalyticsWebhook};
use serde_json::json;
use std::time::Duration;
use tower::ServiceExt;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;
use common::{create_test_jwt, test_db_offline, test_state_with};

fn booking() -> Booking {
    serde_json::from_value(json!({
        "id": "b-analytics",
        "userId": "client-1",
        "category": "Weight Loss",
        "date": "2026-10-23",
        "time": "07:00 PM",
        "status": "confirmed",
        "price": 349,
        "address": "5 Agara Lake Road",
        "userName": "Asha",
        "userPhone": "9876543210",
        "paymentId": "pay_test_9",
        "createdAt": 0
    }))
    .unwrap()
}

#[tokio::test]
async fn test_booking_event_posted_with_action_tag() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/hook"))
        .and(body_partial_json(json!({
            "action": "create_booking",
            "bookingId": "b-analytics",
            "price": 349,
            "paymentId": "pay_test_9"
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let webhook = AnalyticsWebhook::new(Some(format!("{}/hook", mock_server.uri())));
    webhook.send(AnalyticsEvent::booking_created(&booking())).await;
}

#[tokio::test]
async fn test_notify_delivers_in_background() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let webhook = AnalyticsWebhook::new(Some(mock_server.uri()));
    webhook.notify(AnalyticsEvent::booking_created(&booking()));

    let mut received = Vec::new();
    for _ in 0..50 {
        received = mock_server.received_requests().await.unwrap_or_default();
        if !received.is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    assert_eq!(received.len(), 1);
    let body: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
    assert_eq!(body["action"], "create_booking");
}

#[tokio::test]
async fn test_failing_webhook_is_ignored() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    let webhook = AnalyticsWebhook::new(Some(mock_server.uri()));
    // Completes without error even though the sheet rejected the event.
    webhook.send(AnalyticsEvent::booking_created(&booking())).await;
}

#[tokio::test]
async fn test_rejected_closure_sends_nothing() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = Config {
        analytics_webhook_url: Some(mock_server.uri()),
        ..Config::test_default()
    };
    let app = create_router(test_state_with(config, test_db_offline()));
    let token = create_test_jwt("trainer-1", Role::Trainer);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/trainer/bookings/b1/close")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({ "activitiesDone": "Too short", "comfortLevel": 3 }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[test]
fn test_disabled_webhook() {
    assert!(!AnalyticsWebhook::disabled().is_enabled());
    assert!(!AnalyticsWebhook::new(None).is_enabled());
}
