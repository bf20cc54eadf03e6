// ABOUTME: Notification sender abstraction for booking confirmation emails
// ABOUTME: Defines the EmailSender trait implemented by the SMTP mailer and test doubles
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Reserva Project

//! # Notifications
//!
//! The booking workflow talks to an [`EmailSender`] rather than a concrete
//! transport, so tests can substitute a recording sender and deployments can
//! disable delivery. Production uses the SMTP mailer in [`email`].

/// SMTP confirmation email delivery via lettre
pub mod email;

pub use email::SmtpMailer;

use async_trait::async_trait;
use thiserror::Error;

/// Failure reported by a notification sender
#[derive(Debug, Error)]
pub enum NotificationError {
    /// Message could not be constructed (bad address, template failure)
    #[error("Invalid message: {0}")]
    InvalidMessage(String),
    /// Transport-level delivery failure
    #[error("Delivery failed: {0}")]
    Delivery(String),
}

/// Synchronous-delivery notification sender
///
/// The call blocks the request until the provider reports success or
/// failure; there is no retry. Failure is non-fatal to the enclosing
/// status transition.
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Attempt delivery of a booking confirmation email
    ///
    /// # Errors
    ///
    /// Returns a [`NotificationError`] when the message cannot be built or
    /// the transport reports a failure.
    async fn send_confirmation_email(
        &self,
        to: &str,
        booking_id: i64,
        service_name: &str,
        price: f64,
    ) -> Result<(), NotificationError>;
}
