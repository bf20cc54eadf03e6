// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides in-memory database, resource container and recording mailer helpers
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Reserva Project
#![allow(dead_code, clippy::missing_errors_doc, clippy::must_use_candidate)]

//! Shared test utilities for `reserva_server`
//!
//! Common setup helpers so each integration test gets an isolated in-memory
//! database, a resource container and a recording mailer double.

use anyhow::Result;
use async_trait::async_trait;
use reserva_server::{
    auth::AuthManager,
    config::environment::{
        AuthConfig, DatabaseConfig, DatabaseUrl, ServerConfig, SmtpConfig,
    },
    database::{Database, NewService},
    models::{ServiceRecord, UserContext, UserRole},
    notifications::{EmailSender, NotificationError},
    resources::ServerResources,
};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex, Once,
};

static INIT_LOGGER: Once = Once::new();

pub const TEST_JWT_SECRET: &str = "test-jwt-secret-for-integration-tests";

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// One captured confirmation email
#[derive(Debug, Clone, PartialEq)]
pub struct SentEmail {
    pub to: String,
    pub booking_id: i64,
    pub service_name: String,
    pub price: f64,
}

/// Mailer double that records every delivery attempt
///
/// With `fail_next` set, attempts return a delivery error instead of
/// recording nothing; the attempt is still captured.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<SentEmail>>,
    fail: AtomicBool,
}

impl RecordingMailer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make every subsequent send attempt fail
    pub fn fail_sends(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<SentEmail> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl EmailSender for RecordingMailer {
    async fn send_confirmation_email(
        &self,
        to: &str,
        booking_id: i64,
        service_name: &str,
        price: f64,
    ) -> Result<(), NotificationError> {
        self.sent.lock().unwrap().push(SentEmail {
            to: to.to_owned(),
            booking_id,
            service_name: service_name.to_owned(),
            price,
        });

        if self.fail.load(Ordering::SeqCst) {
            return Err(NotificationError::Delivery(
                "connection refused by test double".into(),
            ));
        }
        Ok(())
    }
}

/// Standard test database setup (fresh in-memory SQLite per call)
pub async fn create_test_database() -> Result<Arc<Database>> {
    init_test_logging();
    Ok(Arc::new(Database::new("sqlite::memory:").await?))
}

/// Configuration pointing at the in-memory database with test secrets
pub fn create_test_config() -> ServerConfig {
    ServerConfig {
        http_port: 8081,
        database: DatabaseConfig {
            url: DatabaseUrl::Memory,
            auto_migrate: true,
        },
        auth: AuthConfig {
            jwt_secret: TEST_JWT_SECRET.into(),
            jwt_expiry_hours: 24,
        },
        smtp: SmtpConfig {
            host: "localhost".into(),
            port: 587,
            username: String::new(),
            password: String::new(),
            from_email: "no-reply@reserva.test".into(),
            from_name: "Reserva Test".into(),
        },
        cors_origins: vec!["*".into()],
    }
}

/// Full resource container wired to a fresh database and the given mailer
pub async fn create_test_resources(mailer: Arc<RecordingMailer>) -> Result<Arc<ServerResources>> {
    init_test_logging();

    let config = create_test_config();
    let database = Database::new("sqlite::memory:").await?;
    let auth_manager = AuthManager::new(
        config.auth.jwt_secret.clone().into_bytes(),
        config.auth.jwt_expiry_hours,
    );

    Ok(Arc::new(ServerResources::new(
        database,
        auth_manager,
        mailer,
        Arc::new(config),
    )))
}

/// Insert a service to book against
pub async fn seed_service(database: &Database, name: &str, price: f64) -> Result<ServiceRecord> {
    database
        .create_service(&NewService {
            name: name.to_owned(),
            category: "general".to_owned(),
            price,
            description: format!("{name} service"),
            is_active: true,
        })
        .await
}

/// Bearer token for the given identity, signed with the test secret
pub fn bearer_token(
    resources: &ServerResources,
    user_id: i64,
    role: UserRole,
    context: UserContext,
) -> Result<String> {
    let token = resources
        .auth_manager
        .generate_token(user_id, "staff@reserva.test", role, context)
        .map_err(|e| anyhow::anyhow!("token generation failed: {e}"))?;
    Ok(format!("Bearer {token}"))
}
