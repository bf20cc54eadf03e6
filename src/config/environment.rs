// ABOUTME: Environment-based configuration for the Reserva booking server
// ABOUTME: Loads database, auth and SMTP settings into typed sections at startup
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Reserva Project

//! Environment-only configuration.
//!
//! All settings come from environment variables; the resulting
//! [`ServerConfig`] is constructed once at startup and passed down to the
//! resource container. No ambient mutable globals.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Database connection target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DatabaseUrl {
    /// SQLite database file
    SQLite { path: PathBuf },
    /// In-memory SQLite database (tests and ephemeral deployments)
    Memory,
}

impl DatabaseUrl {
    /// Parse from a connection string
    #[must_use]
    pub fn parse(url: &str) -> Self {
        if url == "sqlite::memory:" {
            Self::Memory
        } else if let Some(path) = url.strip_prefix("sqlite:") {
            Self::SQLite {
                path: PathBuf::from(path),
            }
        } else {
            Self::SQLite {
                path: PathBuf::from(url),
            }
        }
    }

    /// Convert to a `sqlx` connection string
    #[must_use]
    pub fn to_connection_string(&self) -> String {
        match self {
            Self::SQLite { path } => format!("sqlite:{}", path.display()),
            Self::Memory => "sqlite::memory:".to_string(),
        }
    }

    /// Check if this is an in-memory database
    #[must_use]
    pub const fn is_memory(&self) -> bool {
        matches!(self, Self::Memory)
    }
}

impl Default for DatabaseUrl {
    fn default() -> Self {
        Self::SQLite {
            path: PathBuf::from("./data/reserva.db"),
        }
    }
}

impl std::fmt::Display for DatabaseUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_connection_string())
    }
}

/// Top-level server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP API port
    pub http_port: u16,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Authentication configuration
    pub auth: AuthConfig,
    /// SMTP configuration for confirmation emails
    pub smtp: SmtpConfig,
    /// CORS allowed origins
    pub cors_origins: Vec<String>,
}

/// Database settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database URL (SQLite path or in-memory)
    pub url: DatabaseUrl,
    /// Run schema creation on startup
    pub auto_migrate: bool,
}

/// JWT authentication settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HS256 signing secret
    pub jwt_secret: String,
    /// Token expiry in hours
    pub jwt_expiry_hours: i64,
}

/// SMTP delivery settings for the notification sender
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    /// Sender address used in the From header
    pub from_email: String,
    /// Sender display name used in the From header
    pub from_name: String,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error when `JWT_SECRET` is missing or a numeric variable
    /// fails to parse.
    pub fn from_env() -> Result<Self> {
        let http_port = env_parse("HTTP_PORT", 8081)?;

        let database = DatabaseConfig {
            url: DatabaseUrl::parse(
                &env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:./data/reserva.db".into()),
            ),
            auto_migrate: env::var("AUTO_MIGRATE")
                .map(|v| v != "false")
                .unwrap_or(true),
        };

        let auth = AuthConfig {
            jwt_secret: env::var("JWT_SECRET")
                .context("JWT_SECRET environment variable is required")?,
            jwt_expiry_hours: env_parse("JWT_EXPIRY_HOURS", 24)?,
        };

        let smtp = SmtpConfig {
            host: env::var("SMTP_HOST").unwrap_or_else(|_| "localhost".into()),
            port: env_parse("SMTP_PORT", 587)?,
            username: env::var("SMTP_USER").unwrap_or_default(),
            password: env::var("SMTP_PASS").unwrap_or_default(),
            from_email: env::var("SMTP_FROM_EMAIL")
                .unwrap_or_else(|_| "no-reply@reserva.local".into()),
            from_name: env::var("SMTP_FROM_NAME").unwrap_or_else(|_| "Reserva Booking".into()),
        };

        let cors_origins = env::var("CORS_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_else(|_| vec!["*".to_string()]);

        Ok(Self {
            http_port,
            database,
            auth,
            smtp,
            cors_origins,
        })
    }

    /// One-line startup summary safe to log (no secrets)
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "http_port={} database={} smtp_host={} smtp_from={} jwt_expiry_hours={}",
            self.http_port,
            self.database.url,
            self.smtp.host,
            self.smtp.from_email,
            self.auth.jwt_expiry_hours
        )
    }
}

/// Parse an environment variable with a fallback default
fn env_parse<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(value) => value
            .parse::<T>()
            .with_context(|| format!("Invalid value for {name}: {value}")),
        Err(_) => Ok(default),
    }
}
