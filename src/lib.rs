// ABOUTME: Main library entry point for the Reserva booking platform
// ABOUTME: Provides the REST API, booking workflow, auth guard and audit plumbing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Reserva Project

#![deny(unsafe_code)]

//! # Reserva Booking Server
//!
//! A CRUD backend for managing services and service bookings with JWT
//! authentication, role/context authorization, append-only audit logging and
//! transactional confirmation email on booking status change.
//!
//! ## Architecture
//!
//! The server follows a modular architecture:
//! - **Routes**: Axum routers per resource (`service-bookings`, `services`)
//! - **Managers**: Booking and service workflows behind the HTTP layer
//! - **Database**: SQLite persistence through `sqlx`
//! - **Middleware**: Bearer-token authentication and role/context guards
//! - **Audit**: Action and error log sinks backing every mutating operation
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use reserva_server::config::environment::ServerConfig;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::from_env()?;
//!     println!("Reserva server configured with port: HTTP={}", config.http_port);
//!     Ok(())
//! }
//! ```

// ── Public API ──────────────────────────────────────────────────────────
// These modules are used by the server binary (src/bin/) and integration
// tests (tests/). They must remain `pub` so external consumers can access them.

/// Action and error log sinks for mutation traceability
pub mod audit;

/// JWT token generation and validation
pub mod auth;

/// Booking lifecycle workflow (create, list, status transition, delete)
pub mod bookings;

/// Configuration management loaded from the environment
pub mod config;

/// SQLite persistence gateway for bookings, services and log sinks
pub mod database;

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Production logging and structured output
pub mod logging;

/// HTTP middleware for bearer-token authentication and role guards
pub mod middleware;

/// Common data models for services, bookings and identities
pub mod models;

/// Confirmation email delivery over SMTP
pub mod notifications;

/// Offset pagination parameters for list endpoints
pub mod pagination;

/// Centralized resource container for dependency injection
pub mod resources;

/// `HTTP` routes for booking and service resources
pub mod routes;

/// HTTP server assembly and lifecycle
pub mod server;

/// Service catalogue workflow (CRUD over bookable services)
pub mod services;
