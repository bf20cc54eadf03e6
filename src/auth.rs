// ABOUTME: JWT-based user authentication token generation and validation
// ABOUTME: Handles HS256 token encoding, expiry checks and detailed validation errors
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Reserva Project

//! # Authentication Token Management
//!
//! This module provides JWT token generation and validation for the Reserva
//! booking server. Token issuance endpoints are out of scope; the manager
//! exists so the guard can verify inbound bearer tokens and so tests and
//! operational tooling can mint tokens.

use crate::errors::{AppError, AppResult};
use crate::models::{AuthenticatedUser, UserContext, UserRole};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// `JWT` validation error with detailed information
#[derive(Debug, Clone)]
pub enum JwtValidationError {
    /// Token has expired
    TokenExpired {
        /// When the token expired
        expired_at: DateTime<Utc>,
        /// Current time for reference
        current_time: DateTime<Utc>,
    },
    /// Token signature is invalid
    TokenInvalid {
        /// Reason for invalidity
        reason: String,
    },
    /// Token is malformed (not proper `JWT` format)
    TokenMalformed {
        /// Details about malformation
        details: String,
    },
}

impl std::fmt::Display for JwtValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TokenExpired {
                expired_at,
                current_time,
            } => {
                let duration_expired = current_time.signed_duration_since(*expired_at);
                write!(
                    f,
                    "JWT token expired {} minutes ago at {}",
                    duration_expired.num_minutes(),
                    expired_at.format("%Y-%m-%d %H:%M:%S UTC")
                )
            }
            Self::TokenInvalid { reason } => {
                write!(f, "JWT token signature is invalid: {reason}")
            }
            Self::TokenMalformed { details } => {
                write!(f, "JWT token is malformed: {details}")
            }
        }
    }
}

impl std::error::Error for JwtValidationError {}

impl From<JwtValidationError> for AppError {
    fn from(error: JwtValidationError) -> Self {
        match error {
            JwtValidationError::TokenExpired { .. } => Self::auth_expired(),
            JwtValidationError::TokenInvalid { .. } | JwtValidationError::TokenMalformed { .. } => {
                Self::auth_invalid(error.to_string())
            }
        }
    }
}

/// `JWT` claims carried by a staff or client token
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User `ID`
    pub sub: String,
    /// User email
    pub email: String,
    /// Role within the organization
    pub role: UserRole,
    /// Organizational context the role applies to
    pub context: UserContext,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
}

/// Token manager holding the HS256 signing secret
#[derive(Clone)]
pub struct AuthManager {
    secret: Vec<u8>,
    token_expiry_hours: i64,
}

impl AuthManager {
    /// Create a new auth manager
    #[must_use]
    pub fn new(secret: Vec<u8>, token_expiry_hours: i64) -> Self {
        Self {
            secret,
            token_expiry_hours,
        }
    }

    /// Generate a `JWT` token for the given identity
    ///
    /// # Errors
    ///
    /// Returns an error if JWT encoding fails.
    pub fn generate_token(
        &self,
        user_id: i64,
        email: &str,
        role: UserRole,
        context: UserContext,
    ) -> AppResult<String> {
        self.generate_token_with_expiry(user_id, email, role, context, self.token_expiry_hours)
    }

    /// Generate a token with an explicit expiry offset in hours
    ///
    /// Negative offsets produce already-expired tokens, which the tests use
    /// to exercise the rejection path.
    ///
    /// # Errors
    ///
    /// Returns an error if JWT encoding fails.
    pub fn generate_token_with_expiry(
        &self,
        user_id: i64,
        email: &str,
        role: UserRole,
        context: UserContext,
        expiry_hours: i64,
    ) -> AppResult<String> {
        let now = Utc::now();
        let expiry = now + Duration::hours(expiry_hours);

        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_owned(),
            role,
            context,
            iat: now.timestamp(),
            exp: expiry.timestamp(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(&self.secret),
        )
        .map_err(|e| AppError::internal(format!("JWT encoding failed: {e}")))
    }

    /// Validate a bearer token and return its claims
    ///
    /// # Errors
    ///
    /// Returns a [`JwtValidationError`] distinguishing expired, invalid and
    /// malformed tokens.
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtValidationError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(&self.secret),
            &validation,
        )
        .map_err(|e| Self::convert_jwt_error(&e, token))?;

        Ok(token_data.claims)
    }

    /// Resolve a validated token into the request identity
    ///
    /// # Errors
    ///
    /// Returns an auth error when validation fails or the subject is not a
    /// numeric user id.
    pub fn resolve_user(&self, token: &str) -> AppResult<AuthenticatedUser> {
        let claims = self.validate_token(token)?;

        let id = claims
            .sub
            .parse::<i64>()
            .map_err(|_| AppError::auth_invalid("Invalid user ID in token"))?;

        Ok(AuthenticatedUser {
            id,
            email: claims.email,
            role: claims.role,
            context: claims.context,
        })
    }

    /// Convert JWT library errors to detailed validation errors
    fn convert_jwt_error(e: &jsonwebtoken::errors::Error, token: &str) -> JwtValidationError {
        use jsonwebtoken::errors::ErrorKind;

        match e.kind() {
            ErrorKind::ExpiredSignature => {
                // Best effort: recover the exp claim for the error detail
                let expired_at = decode_expiry_unverified(token).unwrap_or_else(Utc::now);
                tracing::warn!(
                    "JWT token expired at {}",
                    expired_at.format("%Y-%m-%d %H:%M:%S UTC")
                );
                JwtValidationError::TokenExpired {
                    expired_at,
                    current_time: Utc::now(),
                }
            }
            ErrorKind::InvalidSignature => {
                tracing::warn!("JWT token signature verification failed");
                JwtValidationError::TokenInvalid {
                    reason: "Token signature verification failed".into(),
                }
            }
            ErrorKind::InvalidToken => JwtValidationError::TokenMalformed {
                details: "Token format is invalid".into(),
            },
            ErrorKind::Base64(base64_err) => JwtValidationError::TokenMalformed {
                details: format!("Token encoding is invalid: {base64_err}"),
            },
            ErrorKind::Json(json_err) => JwtValidationError::TokenMalformed {
                details: format!("Token claims are invalid: {json_err}"),
            },
            _ => JwtValidationError::TokenInvalid {
                reason: e.to_string(),
            },
        }
    }
}

/// Decode the `exp` claim without verifying the signature, for error detail only
fn decode_expiry_unverified(token: &str) -> Option<DateTime<Utc>> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;

    let data = decode::<Claims>(token, &DecodingKey::from_secret(b""), &validation).ok()?;
    DateTime::<Utc>::from_timestamp(data.claims.exp, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> AuthManager {
        AuthManager::new(b"test-secret-key".to_vec(), 24)
    }

    #[test]
    fn test_generate_and_validate_roundtrip() {
        let auth = manager();
        let token = auth
            .generate_token(7, "staff@example.com", UserRole::Manager, UserContext::Mt)
            .unwrap();

        let claims = auth.validate_token(&token).unwrap();
        assert_eq!(claims.sub, "7");
        assert_eq!(claims.email, "staff@example.com");
        assert_eq!(claims.role, UserRole::Manager);
        assert_eq!(claims.context, UserContext::Mt);
    }

    #[test]
    fn test_expired_token_rejected() {
        let auth = manager();
        let token = auth
            .generate_token_with_expiry(
                7,
                "staff@example.com",
                UserRole::Admin,
                UserContext::Mt,
                -2,
            )
            .unwrap();

        let err = auth.validate_token(&token).unwrap_err();
        assert!(matches!(err, JwtValidationError::TokenExpired { .. }));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let auth = manager();
        let token = auth
            .generate_token(7, "staff@example.com", UserRole::Admin, UserContext::Mt)
            .unwrap();

        let other = AuthManager::new(b"different-secret".to_vec(), 24);
        assert!(other.validate_token(&token).is_err());
    }

    #[test]
    fn test_malformed_token_rejected() {
        let auth = manager();
        let err = auth.validate_token("not-a-jwt").unwrap_err();
        assert!(matches!(
            err,
            JwtValidationError::TokenMalformed { .. } | JwtValidationError::TokenInvalid { .. }
        ));
    }

    #[test]
    fn test_resolve_user_parses_subject() {
        let auth = manager();
        let token = auth
            .generate_token(42, "dev@example.com", UserRole::Developer, UserContext::Mt)
            .unwrap();

        let user = auth.resolve_user(&token).unwrap();
        assert_eq!(user.id, 42);
        assert_eq!(user.role, UserRole::Developer);
    }
}
