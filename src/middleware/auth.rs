// ABOUTME: Request authentication middleware verifying bearer tokens and attaching identity
// ABOUTME: Enforces declarative role/context allow-lists for guarded operations
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Reserva Project

//! # Authorization Guard
//!
//! Two-stage guard over a single request:
//! `Unauthenticated → TokenVerified → Authorized | Rejected`.
//!
//! Stage one extracts and verifies the bearer token, attaching the resolved
//! identity. Stage two checks the identity's `(role, context)` pair against
//! the route's static allow-list. Public operations skip both stages.

use crate::auth::AuthManager;
use crate::errors::{AppError, AppResult};
use crate::models::{AuthenticatedUser, UserContext, UserRole};
use axum::http::HeaderMap;
use std::sync::Arc;

/// Static allow-list of `(role, context)` pairs permitted for an operation
pub type RolePolicy = &'static [(UserRole, UserContext)];

/// Internal staff permitted to mutate and read booking/service resources
pub const STAFF_MT_POLICY: RolePolicy = &[
    (UserRole::Manager, UserContext::Mt),
    (UserRole::Admin, UserContext::Mt),
    (UserRole::Developer, UserContext::Mt),
];

/// Middleware for bearer-token authentication
#[derive(Clone)]
pub struct AuthMiddleware {
    auth_manager: Arc<AuthManager>,
}

impl AuthMiddleware {
    /// Create new auth middleware
    #[must_use]
    pub fn new(auth_manager: Arc<AuthManager>) -> Self {
        Self { auth_manager }
    }

    /// Authenticate a request from its authorization header value
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The authorization header is missing or not a bearer scheme
    /// - JWT token validation fails (expired, invalid signature, malformed)
    /// - The token subject is not a numeric user id
    pub fn authenticate_request(&self, auth_header: Option<&str>) -> AppResult<AuthenticatedUser> {
        let Some(auth_str) = auth_header else {
            tracing::warn!("Authentication failed: Missing authorization header");
            return Err(AppError::auth_required());
        };

        let Some(token) = auth_str.strip_prefix("Bearer ") else {
            tracing::warn!("Authentication failed: Invalid authorization header format");
            return Err(AppError::auth_invalid(
                "Invalid authorization header format - must be 'Bearer <token>'",
            ));
        };

        let user = self.auth_manager.resolve_user(token)?;
        tracing::debug!(user_id = user.id, "Bearer token authentication successful");
        Ok(user)
    }

    /// Authenticate a request from its header map
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Self::authenticate_request`].
    pub fn authenticate_headers(&self, headers: &HeaderMap) -> AppResult<AuthenticatedUser> {
        let auth_header = headers.get("authorization").and_then(|h| h.to_str().ok());
        self.authenticate_request(auth_header)
    }

    /// Check the identity against a route's role/context allow-list
    ///
    /// # Errors
    ///
    /// Returns `PermissionDenied` when the `(role, context)` pair is not in
    /// the allow-list.
    pub fn authorize(user: &AuthenticatedUser, policy: RolePolicy) -> AppResult<()> {
        if policy
            .iter()
            .any(|(role, context)| *role == user.role && *context == user.context)
        {
            return Ok(());
        }

        tracing::warn!(
            user_id = user.id,
            role = ?user.role,
            context = ?user.context,
            "Authorization failed: role/context not in allow-list"
        );
        Err(AppError::permission_denied(
            "Role is not permitted to perform this operation",
        ))
    }

    /// Run both guard stages: token verification and policy membership
    ///
    /// # Errors
    ///
    /// Returns 401-class errors from stage one and `PermissionDenied` from
    /// stage two.
    pub fn authenticate_and_authorize(
        &self,
        headers: &HeaderMap,
        policy: RolePolicy,
    ) -> AppResult<AuthenticatedUser> {
        let user = self.authenticate_headers(headers)?;
        Self::authorize(&user, policy)?;
        Ok(user)
    }
}
