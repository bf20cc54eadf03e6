// ABOUTME: Centralized resource container for dependency injection across routes
// ABOUTME: Holds the shared database, auth managers, workflows and configuration
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Reserva Project

//! # Server Resources Module
//!
//! Centralized resource container for dependency injection. Expensive shared
//! objects (database pool, auth manager, mailer) are constructed once and
//! Arc-shared into the route handlers.

use crate::audit::{ActionLogger, ErrorLogger};
use crate::auth::AuthManager;
use crate::bookings::BookingManager;
use crate::config::environment::ServerConfig;
use crate::database::Database;
use crate::middleware::AuthMiddleware;
use crate::notifications::EmailSender;
use crate::services::ServiceManager;
use std::sync::Arc;

/// Centralized resource container for dependency injection
#[derive(Clone)]
pub struct ServerResources {
    pub database: Arc<Database>,
    pub auth_manager: Arc<AuthManager>,
    pub auth_middleware: AuthMiddleware,
    pub bookings: BookingManager,
    pub services: ServiceManager,
    pub config: Arc<ServerConfig>,
}

impl ServerResources {
    /// Create new server resources with proper Arc sharing
    #[must_use]
    pub fn new(
        database: Database,
        auth_manager: AuthManager,
        mailer: Arc<dyn EmailSender>,
        config: Arc<ServerConfig>,
    ) -> Self {
        let database = Arc::new(database);
        let auth_manager = Arc::new(auth_manager);

        let action_logger = ActionLogger::new(database.clone());
        let error_logger = ErrorLogger::new(database.clone());

        let bookings = BookingManager::new(
            database.clone(),
            action_logger.clone(),
            error_logger.clone(),
            mailer,
        );
        let services = ServiceManager::new(database.clone(), action_logger, error_logger);

        Self {
            database,
            auth_middleware: AuthMiddleware::new(auth_manager.clone()),
            auth_manager,
            bookings,
            services,
            config,
        }
    }
}
