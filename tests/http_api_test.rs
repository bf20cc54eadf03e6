// ABOUTME: HTTP-level integration tests driving the assembled router with oneshot requests
// ABOUTME: Verifies the authorization guard, public endpoints and response envelopes
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Reserva Project

//! HTTP API integration tests
//!
//! Drives the full axum router without binding a socket, covering the
//! bearer-token guard, the public endpoints and the success/error envelopes.

mod common;

use anyhow::Result;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use common::{bearer_token, create_test_resources, seed_service, RecordingMailer};
use reserva_server::{
    models::{UserContext, UserRole},
    resources::ServerResources,
    server::BookingServer,
};
use std::sync::Arc;
use tower::ServiceExt;

async fn test_app() -> Result<(Router, Arc<ServerResources>, Arc<RecordingMailer>)> {
    let mailer = RecordingMailer::new();
    let resources = create_test_resources(mailer.clone()).await?;
    let app = BookingServer::new(resources.clone()).router();
    Ok((app, resources, mailer))
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Result<Request<Body>> {
    Ok(Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))?)
}

async fn response_json(response: axum::response::Response) -> Result<serde_json::Value> {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[tokio::test]
async fn test_booking_creation_is_public() -> Result<()> {
    let (app, resources, _mailer) = test_app().await?;
    let service = seed_service(&resources.database, "Haircut", 35.0).await?;

    let request = json_request(
        "POST",
        "/api/service-bookings",
        serde_json::json!({
            "customerName": "Alice Martin",
            "email": "alice@example.com",
            "serviceId": service.id
        }),
    )?;

    let response = app.oneshot(request).await?;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response_json(response).await?;
    assert_eq!(body["status"], 201);
    assert_eq!(body["message"], "Booking created successfully");
    assert_eq!(body["data"]["status"], "PENDING");
    assert_eq!(body["data"]["customerName"], "Alice Martin");
    Ok(())
}

#[tokio::test]
async fn test_listing_requires_bearer_token() -> Result<()> {
    let (app, _resources, _mailer) = test_app().await?;

    let request = Request::builder()
        .uri("/api/service-bookings")
        .body(Body::empty())?;

    let response = app.oneshot(request).await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = response_json(response).await?;
    assert_eq!(body["code"], "AUTH_REQUIRED");
    Ok(())
}

#[tokio::test]
async fn test_garbage_and_expired_tokens_are_unauthorized() -> Result<()> {
    let (app, resources, _mailer) = test_app().await?;

    let request = Request::builder()
        .uri("/api/service-bookings")
        .header(header::AUTHORIZATION, "Bearer not-a-jwt")
        .body(Body::empty())?;
    let response = app.clone().oneshot(request).await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let expired = resources.auth_manager.generate_token_with_expiry(
        1,
        "staff@reserva.test",
        UserRole::Manager,
        UserContext::Mt,
        -2,
    )?;
    let request = Request::builder()
        .uri("/api/service-bookings")
        .header(header::AUTHORIZATION, format!("Bearer {expired}"))
        .body(Body::empty())?;
    let response = app.oneshot(request).await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn test_guard_rejects_identities_outside_the_allow_list() -> Result<()> {
    let (app, resources, _mailer) = test_app().await?;

    // Right context, wrong role
    let client = bearer_token(&resources, 2, UserRole::Client, UserContext::Mt)?;
    let request = Request::builder()
        .uri("/api/service-bookings")
        .header(header::AUTHORIZATION, &client)
        .body(Body::empty())?;
    let response = app.clone().oneshot(request).await?;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let body = response_json(response).await?;
    assert_eq!(body["code"], "PERMISSION_DENIED");

    // Right role, wrong context
    let wrong_context = bearer_token(&resources, 3, UserRole::Manager, UserContext::Client)?;
    let request = Request::builder()
        .uri("/api/service-bookings")
        .header(header::AUTHORIZATION, &wrong_context)
        .body(Body::empty())?;
    let response = app.oneshot(request).await?;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn test_each_allow_listed_role_can_list() -> Result<()> {
    let (app, resources, _mailer) = test_app().await?;

    for role in [UserRole::Manager, UserRole::Admin, UserRole::Developer] {
        let token = bearer_token(&resources, 1, role, UserContext::Mt)?;
        let request = Request::builder()
            .uri("/api/service-bookings?page=1&limit=10")
            .header(header::AUTHORIZATION, &token)
            .body(Body::empty())?;

        let response = app.clone().oneshot(request).await?;
        assert_eq!(response.status(), StatusCode::OK);

        let body = response_json(response).await?;
        assert_eq!(body["message"], "Bookings retrieved successfully");
        assert_eq!(body["totalCount"], 0);
        assert_eq!(body["page"], 1);
        assert_eq!(body["limit"], 10);
    }
    Ok(())
}

#[tokio::test]
async fn test_status_read_is_public_and_maps_not_found() -> Result<()> {
    let (app, resources, _mailer) = test_app().await?;
    let service = seed_service(&resources.database, "Haircut", 35.0).await?;

    let booking = resources
        .bookings
        .create(reserva_server::models::CreateBookingRequest {
            customer_name: "Alice".into(),
            phone: None,
            email: "alice@example.com".into(),
            service_id: service.id,
            status: None,
        })
        .await?;

    let request = Request::builder()
        .uri(format!("/api/service-bookings/get-status/{}", booking.id))
        .body(Body::empty())?;
    let response = app.clone().oneshot(request).await?;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await?;
    assert_eq!(body["data"], "PENDING");

    let request = Request::builder()
        .uri("/api/service-bookings/get-status/9999")
        .body(Body::empty())?;
    let response = app.oneshot(request).await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = response_json(response).await?;
    assert_eq!(body["code"], "RESOURCE_NOT_FOUND");
    Ok(())
}

#[tokio::test]
async fn test_status_transition_over_http_sends_confirmation() -> Result<()> {
    let (app, resources, mailer) = test_app().await?;
    let service = seed_service(&resources.database, "Haircut", 35.0).await?;

    let booking = resources
        .bookings
        .create(reserva_server::models::CreateBookingRequest {
            customer_name: "Alice".into(),
            phone: None,
            email: "alice@example.com".into(),
            service_id: service.id,
            status: None,
        })
        .await?;

    let token = bearer_token(&resources, 5, UserRole::Admin, UserContext::Mt)?;
    let mut request = json_request(
        "PUT",
        &format!("/api/service-bookings/{}/status", booking.id),
        serde_json::json!({ "status": "CONFIRMED" }),
    )?;
    request
        .headers_mut()
        .insert(header::AUTHORIZATION, token.parse()?);

    let response = app.oneshot(request).await?;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await?;
    assert_eq!(body["message"], "Booking status updated successfully");
    assert_eq!(body["data"]["status"], "CONFIRMED");

    assert_eq!(mailer.sent_count(), 1);
    assert_eq!(mailer.sent()[0].to, "alice@example.com");

    // Audit entries are attributed to the token's subject
    let logs = resources.database.list_action_logs("SERVICE_BOOKING", booking.id).await?;
    assert!(logs.iter().all(|l| l.actor_user_id == 5));
    Ok(())
}

#[tokio::test]
async fn test_invalid_transition_body_is_bad_request() -> Result<()> {
    let (app, resources, _mailer) = test_app().await?;
    let service = seed_service(&resources.database, "Haircut", 35.0).await?;

    let booking = resources
        .bookings
        .create(reserva_server::models::CreateBookingRequest {
            customer_name: "Alice".into(),
            phone: None,
            email: "alice@example.com".into(),
            service_id: service.id,
            status: None,
        })
        .await?;

    let token = bearer_token(&resources, 5, UserRole::Manager, UserContext::Mt)?;
    let mut request = json_request(
        "PUT",
        &format!("/api/service-bookings/{}/status", booking.id),
        serde_json::json!({ "status": "DONE" }),
    )?;
    request
        .headers_mut()
        .insert(header::AUTHORIZATION, token.parse()?);

    let response = app.oneshot(request).await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = response_json(response).await?;
    assert_eq!(body["code"], "INVALID_INPUT");
    Ok(())
}

#[tokio::test]
async fn test_delete_returns_confirmation_envelope() -> Result<()> {
    let (app, resources, _mailer) = test_app().await?;
    let service = seed_service(&resources.database, "Haircut", 35.0).await?;

    let booking = resources
        .bookings
        .create(reserva_server::models::CreateBookingRequest {
            customer_name: "Alice".into(),
            phone: None,
            email: "alice@example.com".into(),
            service_id: service.id,
            status: None,
        })
        .await?;

    let token = bearer_token(&resources, 5, UserRole::Manager, UserContext::Mt)?;
    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/api/service-bookings/{}", booking.id))
        .header(header::AUTHORIZATION, &token)
        .body(Body::empty())?;

    let response = app.oneshot(request).await?;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await?;
    assert_eq!(body["message"], "Booking deleted successfully");
    assert!(body.get("data").is_none());
    Ok(())
}

#[tokio::test]
async fn test_health_endpoints_respond() -> Result<()> {
    let (app, _resources, _mailer) = test_app().await?;

    for uri in ["/health", "/ready"] {
        let request = Request::builder().uri(uri).body(Body::empty())?;
        let response = app.clone().oneshot(request).await?;
        assert_eq!(response.status(), StatusCode::OK);
    }
    Ok(())
}
