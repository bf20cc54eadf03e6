// ABOUTME: Service catalogue route handlers for managing bookable services
// ABOUTME: Reads are public while catalogue mutations require the staff allow-list
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Reserva Project

//! Service catalogue routes
//!
//! The catalogue is browsable without a token so the booking form can list
//! what is offered; creating, updating and deleting services is restricted to
//! the staff allow-list.

use crate::errors::AppError;
use crate::middleware::STAFF_MT_POLICY;
use crate::models::{CreateServiceRequest, UpdateServiceRequest};
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

/// Service catalogue routes
pub struct ServiceRoutes;

impl ServiceRoutes {
    /// Create all service catalogue routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/services", post(Self::handle_create))
            .route("/api/services", get(Self::handle_list))
            .route("/api/services/:id", get(Self::handle_get))
            .route("/api/services/:id", put(Self::handle_update))
            .route("/api/services/:id", delete(Self::handle_delete))
            .with_state(resources)
    }

    /// Handle service creation
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<CreateServiceRequest>,
    ) -> Result<Response, AppError> {
        let issuer = resources
            .auth_middleware
            .authenticate_and_authorize(&headers, STAFF_MT_POLICY)?;

        let service = resources.services.create(request, issuer.id).await?;

        Ok((
            StatusCode::CREATED,
            Json(Envelope::created("Service created successfully", service)),
        )
            .into_response())
    }

    /// Handle paginated catalogue listing (public)
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        Query(params): Query<PaginationParams>,
    ) -> Result<Response, AppError> {
        let page = resources.services.list(&params).await?;

        Ok((
            StatusCode::OK,
            Json(PageEnvelope::ok("Services retrieved successfully", page)),
        )
            .into_response())
    }

    /// Handle fetching one service (public)
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<i64>,
    ) -> Result<Response, AppError> {
        let service = resources.services.get(id).await?;

        Ok((
            StatusCode::OK,
            Json(Envelope::ok("Service fetched successfully", service)),
        )
            .into_response())
    }

    /// Handle a partial service update
    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<i64>,
        Json(request): Json<UpdateServiceRequest>,
    ) -> Result<Response, AppError> {
        let issuer = resources
            .auth_middleware
            .authenticate_and_authorize(&headers, STAFF_MT_POLICY)?;

        let service = resources.services.update(id, request, issuer.id).await?;

        Ok((
            StatusCode::OK,
            Json(Envelope::ok("Service updated successfully", service)),
        )
            .into_response())
    }

    /// Handle service deletion
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<i64>,
    ) -> Result<Response, AppError> {
        let issuer = resources
            .auth_middleware
            .authenticate_and_authorize(&headers, STAFF_MT_POLICY)?;

        resources.services.delete(id, issuer.id).await?;

        Ok((
            StatusCode::OK,
            Json(Envelope::message("Service deleted successfully")),
        )
            .into_response())
    }
}
