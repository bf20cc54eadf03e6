// ABOUTME: HTTP route module root with the shared success envelope types
// ABOUTME: Groups the booking, service and health routers merged by the server
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Reserva Project

//! # HTTP Routes
//!
//! One router per resource, assembled by the server module. Success
//! responses share the `{status, message, ...}` envelope; errors are
//! serialized by `AppError`'s `IntoResponse` impl.

/// Booking resource endpoints
pub mod bookings;

/// Health check endpoints
pub mod health;

/// Service catalogue endpoints
pub mod services;

use serde::Serialize;

/// Success envelope carrying an optional data payload
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub status: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> Envelope<T> {
    /// 200-style envelope with a data payload
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            status: 200,
            message: message.into(),
            data: Some(data),
        }
    }

    /// 201-style envelope with the created record
    pub fn created(message: impl Into<String>, data: T) -> Self {
        Self {
            status: 201,
            message: message.into(),
            data: Some(data),
        }
    }
}

impl Envelope<()> {
    /// Envelope with no data payload (delete confirmations)
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            status: 200,
            message: message.into(),
            data: None,
        }
    }
}

/// Success envelope for paginated lists; the page fields are flattened in
#[derive(Debug, Serialize)]
pub struct PageEnvelope<T: Serialize> {
    pub status: u16,
    pub message: String,
    #[serde(flatten)]
    pub page: T,
}

impl<T: Serialize> PageEnvelope<T> {
    /// 200-style list envelope
    pub fn ok(message: impl Into<String>, page: T) -> Self {
        Self {
            status: 200,
            message: message.into(),
            page,
        }
    }
}
