// ABOUTME: Booking resource route handlers for creation, listing, status transition and deletion
// ABOUTME: Applies the authorization guard to staff operations and attributes audits to the caller
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Reserva Project

//! Booking management routes
//!
//! Creation and the status-only read are public; every other operation
//! requires a verified bearer token whose `(role, context)` pair is in the
//! staff allow-list. The authenticated caller's id attributes the audit
//! entries written by the workflow.

use crate::errors::AppError;
use crate::middleware::STAFF_MT_POLICY;
use crate::models::{CreateBookingRequest, UpdateBookingRequest, UpdateBookingStatusRequest};
use crate::pagination::PaginationParams;
use crate::resources::ServerResources;
use crate::routes::{Envelope, PageEnvelope};
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use std::sync::Arc;

/// Booking management routes
pub struct BookingRoutes;

impl BookingRoutes {
    /// Create all booking routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/service-bookings", post(Self::handle_create))
            .route("/api/service-bookings", get(Self::handle_list))
            .route(
                "/api/service-bookings/get-status/:id",
                get(Self::handle_get_status),
            )
            .route("/api/service-bookings/:id", get(Self::handle_get))
            .route("/api/service-bookings/:id", put(Self::handle_update))
            .route(
                "/api/service-bookings/:id/status",
                put(Self::handle_transition_status),
            )
            .route("/api/service-bookings/:id", delete(Self::handle_delete))
            .with_state(resources)
    }

    /// Handle booking creation (public)
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        Json(request): Json<CreateBookingRequest>,
    ) -> Result<Response, AppError> {
        let booking = resources.bookings.create(request).await?;

        Ok((
            StatusCode::CREATED,
            Json(Envelope::created("Booking created successfully", booking)),
        )
            .into_response())
    }

    /// Handle paginated booking listing
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(params): Query<PaginationParams>,
    ) -> Result<Response, AppError> {
        resources
            .auth_middleware
            .authenticate_and_authorize(&headers, STAFF_MT_POLICY)?;

        let page = resources.bookings.list(&params).await?;

        Ok((
            StatusCode::OK,
            Json(PageEnvelope::ok("Bookings retrieved successfully", page)),
        )
            .into_response())
    }

    /// Handle fetching one booking
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<i64>,
    ) -> Result<Response, AppError> {
        resources
            .auth_middleware
            .authenticate_and_authorize(&headers, STAFF_MT_POLICY)?;

        let booking = resources.bookings.get(id).await?;

        Ok((
            StatusCode::OK,
            Json(Envelope::ok("Booking fetched successfully", booking)),
        )
            .into_response())
    }

    /// Handle the status-only read (public)
    async fn handle_get_status(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<i64>,
    ) -> Result<Response, AppError> {
        let status = resources.bookings.get_status(id).await?;

        Ok((
            StatusCode::OK,
            Json(Envelope::ok("Booking fetched successfully", status)),
        )
            .into_response())
    }

    /// Handle a partial booking update
    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<i64>,
        Json(request): Json<UpdateBookingRequest>,
    ) -> Result<Response, AppError> {
        let issuer = resources
            .auth_middleware
            .authenticate_and_authorize(&headers, STAFF_MT_POLICY)?;

        let booking = resources.bookings.update(id, request, issuer.id).await?;

        Ok((
            StatusCode::OK,
            Json(Envelope::ok("Booking updated successfully", booking)),
        )
            .into_response())
    }

    /// Handle the dedicated status-transition operation
    async fn handle_transition_status(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<i64>,
        Json(request): Json<UpdateBookingStatusRequest>,
    ) -> Result<Response, AppError> {
        let issuer = resources
            .auth_middleware
            .authenticate_and_authorize(&headers, STAFF_MT_POLICY)?;

        let booking = resources
            .bookings
            .transition_status(id, &request.status, issuer.id)
            .await?;

        Ok((
            StatusCode::OK,
            Json(Envelope::ok("Booking status updated successfully", booking)),
        )
            .into_response())
    }

    /// Handle booking deletion
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<i64>,
    ) -> Result<Response, AppError> {
        let issuer = resources
            .auth_middleware
            .authenticate_and_authorize(&headers, STAFF_MT_POLICY)?;

        resources.bookings.delete(id, issuer.id).await?;

        Ok((
            StatusCode::OK,
            Json(Envelope::message("Booking deleted successfully")),
        )
            .into_response())
    }
}
