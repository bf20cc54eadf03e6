// ABOUTME: SMTP confirmation email delivery using the lettre transport
// ABOUTME: Builds the HTML booking confirmation and sends it off the async runtime
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Reserva Project

use crate::config::environment::SmtpConfig;
use crate::notifications::{EmailSender, NotificationError};
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

/// SMTP mailer for booking confirmations
///
/// A new transport is built per send to avoid connection pooling issues;
/// the blocking send runs on the blocking thread pool.
#[derive(Clone)]
pub struct SmtpMailer {
    config: SmtpConfig,
}

impl SmtpMailer {
    /// Create a new mailer from SMTP settings
    #[must_use]
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }

    fn build_transport(&self) -> Result<SmtpTransport, NotificationError> {
        SmtpTransport::relay(&self.config.host)
            .map_err(|e| NotificationError::Delivery(format!("SMTP relay error: {e}")))
            .map(|builder| {
                builder
                    .port(self.config.port)
                    .credentials(Credentials::new(
                        self.config.username.clone(),
                        self.config.password.clone(),
                    ))
                    .build()
            })
    }

    fn from_header(&self) -> String {
        format!("{} <{}>", self.config.from_name, self.config.from_email)
    }

    fn confirmation_body(booking_id: i64, service_name: &str, price: f64) -> String {
        format!(
            "<h3>Hello,</h3>\
             <p>Your booking for <b>{service_name}</b> has been <b>confirmed</b>.</p>\
             <ul>\
               <li>Booking ID: <b>{booking_id}</b></li>\
               <li>Price: <b>${price:.2}</b></li>\
             </ul>\
             <p>Thank you for choosing our service.</p>"
        )
    }
}

#[async_trait]
impl EmailSender for SmtpMailer {
    async fn send_confirmation_email(
        &self,
        to: &str,
        booking_id: i64,
        service_name: &str,
        price: f64,
    ) -> Result<(), NotificationError> {
        let message = Message::builder()
            .from(
                self.from_header()
                    .parse()
                    .map_err(|e| NotificationError::InvalidMessage(format!("From header: {e}")))?,
            )
            .to(to
                .parse()
                .map_err(|e| NotificationError::InvalidMessage(format!("To address: {e}")))?)
            .subject("Booking Confirmation")
            .header(ContentType::TEXT_HTML)
            .body(Self::confirmation_body(booking_id, service_name, price))
            .map_err(|e| NotificationError::InvalidMessage(e.to_string()))?;

        let transport = self.build_transport()?;

        // lettre's SmtpTransport is blocking; keep it off the async runtime
        let result = tokio::task::spawn_blocking(move || transport.send(&message))
            .await
            .map_err(|e| NotificationError::Delivery(format!("Send task failed: {e}")))?;

        match result {
            Ok(response) => {
                tracing::info!(
                    booking_id = booking_id,
                    code = %response.code(),
                    "Confirmation email sent"
                );
                Ok(())
            }
            Err(e) => Err(NotificationError::Delivery(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirmation_body_contains_details() {
        let body = SmtpMailer::confirmation_body(42, "Deep Clean", 79.5);
        assert!(body.contains("Deep Clean"));
        assert!(body.contains("42"));
        assert!(body.contains("$79.50"));
    }
}
