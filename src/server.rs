// ABOUTME: HTTP server assembly binding the resource routers onto one listener
// ABOUTME: Configures CORS, request tracing and graceful shutdown around the axum router
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Reserva Project

//! # Server Module
//!
//! Assembles the booking, service catalogue and health routers into a single
//! axum application and runs it with CORS, request tracing and graceful
//! shutdown on SIGINT.

use crate::resources::ServerResources;
use crate::routes::{bookings::BookingRoutes, health::HealthRoutes, services::ServiceRoutes};
use anyhow::{Context, Result};
use axum::Router;
use http::{header::HeaderName, HeaderValue, Method};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Booking backend HTTP server
pub struct BookingServer {
    resources: Arc<ServerResources>,
}

impl BookingServer {
    /// Create a new server from shared resources
    #[must_use]
    pub const fn new(resources: Arc<ServerResources>) -> Self {
        Self { resources }
    }

    /// Build the full application router
    ///
    /// Exposed separately from `run` so tests can drive the router with
    /// `tower::ServiceExt::oneshot` without binding a socket.
    #[must_use]
    pub fn router(&self) -> Router {
        Router::new()
            .merge(HealthRoutes::routes())
            .merge(BookingRoutes::routes(self.resources.clone()))
            .merge(ServiceRoutes::routes(self.resources.clone()))
            .layer(setup_cors(&self.resources.config.cors_origins))
            .layer(TraceLayer::new_for_http())
    }

    /// Bind the configured port and serve until shutdown
    ///
    /// # Errors
    ///
    /// Returns an error if the listener fails to bind or the server loop
    /// terminates abnormally.
    pub async fn run(self, port: u16) -> Result<()> {
        let app = self.router();

        let listener = TcpListener::bind(format!("0.0.0.0:{port}"))
            .await
            .with_context(|| format!("Failed to bind HTTP port {port}"))?;

        info!("Booking server listening on port {}", port);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("HTTP server terminated abnormally")?;

        info!("Booking server shut down");
        Ok(())
    }
}

/// Configure CORS from the comma-parsed origin list
///
/// An empty list or a lone `*` entry allows any origin; otherwise only the
/// listed origins that parse as header values are permitted.
pub fn setup_cors(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.is_empty() || origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|o| HeaderValue::from_str(o.trim()).ok())
            .collect();

        if parsed.is_empty() {
            AllowOrigin::any()
        } else {
            AllowOrigin::list(parsed)
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_headers([
            HeaderName::from_static("content-type"),
            HeaderName::from_static("authorization"),
            HeaderName::from_static("accept"),
            HeaderName::from_static("origin"),
            HeaderName::from_static("x-requested-with"),
        ])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install shutdown signal handler: {}", e);
    }
    info!("Shutdown signal received");
}
