// ABOUTME: Action and error log sinks backing every mutating operation
// ABOUTME: Appends immutable audit entries and records structured failures with normalized responses
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Reserva Project

//! # Audit Logging
//!
//! Two sinks used by the workflows:
//!
//! - [`ActionLogger`] appends an immutable action entry for every mutating
//!   operation, attributed to the acting user.
//! - [`ErrorLogger`] records a structured failure and hands back the
//!   normalized error the operation returns to the HTTP layer, so every
//!   unexpected fault leaves a diagnostic trail.

use crate::database::Database;
use crate::errors::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Kind of mutating action being audited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
}

impl AuditAction {
    /// Canonical uppercase name as stored in the database
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuditAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CREATE" => Ok(Self::Create),
            "UPDATE" => Ok(Self::Update),
            "DELETE" => Ok(Self::Delete),
            other => Err(format!("Unknown audit action: {other}")),
        }
    }
}

/// An action entry before it is appended to the log
#[derive(Debug, Clone)]
pub struct AuditEntry {
    /// Id of the record the action applied to
    pub reference_id: i64,
    /// Kind of record, e.g. `SERVICE_BOOKING`
    pub reference_type: String,
    pub action: AuditAction,
    /// Originating operation, e.g. `BookingManager::update`
    pub context: String,
    pub description: String,
    pub additional_info: Option<serde_json::Value>,
}

/// A stored action log row
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecord {
    pub id: i64,
    pub reference_id: i64,
    pub reference_type: String,
    pub action: AuditAction,
    pub context: String,
    pub description: String,
    pub additional_info: Option<serde_json::Value>,
    pub actor_user_id: i64,
    pub created_at: DateTime<Utc>,
}

/// Append-only audit sink for mutating operations
#[derive(Clone)]
pub struct ActionLogger {
    database: Arc<Database>,
}

impl ActionLogger {
    /// Create a new action logger over the shared database
    #[must_use]
    pub fn new(database: Arc<Database>) -> Self {
        Self { database }
    }

    /// Append an action entry attributed to the acting user
    ///
    /// # Errors
    ///
    /// Returns an error when the underlying insert fails; callers treat
    /// that as a persistence fault of the enclosing operation.
    pub async fn log_action(&self, entry: &AuditEntry, actor_user_id: i64) -> anyhow::Result<()> {
        let id = self.database.insert_action_log(entry, actor_user_id).await?;
        tracing::debug!(
            audit_id = id,
            reference_id = entry.reference_id,
            action = %entry.action,
            actor = actor_user_id,
            "Action logged"
        );
        Ok(())
    }
}

/// Structured failure sink returning normalized error responses
#[derive(Clone)]
pub struct ErrorLogger {
    database: Arc<Database>,
}

impl ErrorLogger {
    /// Create a new error logger over the shared database
    #[must_use]
    pub fn new(database: Arc<Database>) -> Self {
        Self { database }
    }

    /// Record a failure and return the normalized error for the caller
    ///
    /// The returned `AppError` carries the public message only; the detail
    /// goes to the log sink and tracing. A sink write failure must not mask
    /// the original fault, so it is traced and swallowed.
    pub async fn log(&self, message: &str, detail: &str, context: &str) -> AppError {
        tracing::error!(context = context, detail = detail, "{message}");

        if let Err(sink_err) = self.database.insert_error_log(message, detail, context).await {
            tracing::error!(
                context = context,
                "Failed to write error log entry: {sink_err}"
            );
        }

        AppError::database(message)
    }
}
