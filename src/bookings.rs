// ABOUTME: Booking lifecycle workflow covering creation, listing, status transition and deletion
// ABOUTME: Orchestrates persistence, conditional confirmation email and audit logging
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Reserva Project

//! # Booking Lifecycle Workflow
//!
//! The manager owns the decision of when a booking's status transitions and
//! when a notification goes out. Persistence faults are intercepted at each
//! operation boundary and routed through the error log sink, so callers get
//! a normalized error rather than an unhandled fault. Email delivery failure
//! is non-fatal: the status change stands, only the failure is logged.

use crate::audit::{ActionLogger, AuditAction, AuditEntry, ErrorLogger};
use crate::database::{Database, NewBooking};
use crate::errors::{AppError, AppResult};
use crate::models::{
    BookingStatus, BookingWithService, CreateBookingRequest, ServiceBooking, UpdateBookingRequest,
};
use crate::notifications::EmailSender;
use crate::pagination::PaginationParams;
use serde::Serialize;
use std::sync::Arc;

const REFERENCE_TYPE: &str = "SERVICE_BOOKING";

/// One page of bookings with the total count under the same filter
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingPage {
    pub page: i64,
    pub limit: i64,
    pub total_count: i64,
    pub bookings: Vec<BookingWithService>,
}

/// Booking workflow manager
#[derive(Clone)]
pub struct BookingManager {
    database: Arc<Database>,
    action_logger: ActionLogger,
    error_logger: ErrorLogger,
    mailer: Arc<dyn EmailSender>,
}

impl BookingManager {
    /// Create a new booking manager
    #[must_use]
    pub fn new(
        database: Arc<Database>,
        action_logger: ActionLogger,
        error_logger: ErrorLogger,
        mailer: Arc<dyn EmailSender>,
    ) -> Self {
        Self {
            database,
            action_logger,
            error_logger,
            mailer,
        }
    }

    /// Route a persistence fault through the error sink
    async fn fault(&self, message: &str, context: &str, err: &anyhow::Error) -> AppError {
        self.error_logger
            .log(message, &format!("{err:#}"), context)
            .await
    }

    /// Create a booking; status defaults to PENDING when absent
    ///
    /// No notification is sent on creation.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for a bad status value or unknown service id,
    /// `MissingRequiredField` for an empty customer name or email, and a
    /// database error on storage failure.
    pub async fn create(&self, request: CreateBookingRequest) -> AppResult<ServiceBooking> {
        const CTX: &str = "BookingManager::create";

        let status = match request.status.as_deref() {
            Some(raw) => raw
                .parse::<BookingStatus>()
                .map_err(AppError::invalid_input)?,
            None => BookingStatus::Pending,
        };

        if request.customer_name.trim().is_empty() {
            return Err(AppError::missing_required_field("Customer name"));
        }
        if request.email.trim().is_empty() {
            return Err(AppError::missing_required_field("Email"));
        }

        let service = match self.database.get_service(request.service_id).await {
            Ok(service) => service,
            Err(e) => return Err(self.fault("Failed to create booking", CTX, &e).await),
        };
        if service.is_none() {
            return Err(AppError::invalid_input(format!(
                "Unknown service id: {}",
                request.service_id
            )));
        }

        let new_booking = NewBooking {
            customer_name: request.customer_name,
            phone: request.phone,
            email: request.email,
            service_id: request.service_id,
            status,
        };

        match self.database.create_booking(&new_booking).await {
            Ok(booking) => {
                tracing::info!(booking_id = booking.id, "Booking created");
                Ok(booking)
            }
            Err(e) => Err(self.fault("Failed to create booking", CTX, &e).await),
        }
    }

    /// Paginated list of bookings ordered by descending id
    ///
    /// The status filter is upper-cased before matching; an unmatched value
    /// yields an empty page, not an error.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for page/limit below 1 and a database error on
    /// storage failure.
    pub async fn list(&self, params: &PaginationParams) -> AppResult<BookingPage> {
        const CTX: &str = "BookingManager::list";

        let window = params.resolve()?;
        let status = window.status.as_deref();

        let bookings = match self
            .database
            .list_bookings(window.skip, window.limit, status)
            .await
        {
            Ok(bookings) => bookings,
            Err(e) => return Err(self.fault("Error fetching bookings", CTX, &e).await),
        };

        let total_count = match self.database.count_bookings(status).await {
            Ok(count) => count,
            Err(e) => return Err(self.fault("Error fetching bookings", CTX, &e).await),
        };

        Ok(BookingPage {
            page: window.page,
            limit: window.limit,
            total_count,
            bookings,
        })
    }

    /// Fetch one booking joined with its service
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` for a missing id and a database error on
    /// storage failure.
    pub async fn get(&self, id: i64) -> AppResult<BookingWithService> {
        const CTX: &str = "BookingManager::get";

        match self.database.get_booking_with_service(id).await {
            Ok(Some(booking)) => Ok(booking),
            Ok(None) => Err(AppError::not_found(format!("Booking {id}"))),
            Err(e) => Err(self.fault("Error fetching booking by ID", CTX, &e).await),
        }
    }

    /// Fetch only the status of a booking
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` for a missing id and a database error on
    /// storage failure.
    pub async fn get_status(&self, id: i64) -> AppResult<BookingStatus> {
        const CTX: &str = "BookingManager::get_status";

        match self.database.get_booking(id).await {
            Ok(Some(booking)) => Ok(booking.status),
            Ok(None) => Err(AppError::not_found(format!("Booking {id}"))),
            Err(e) => Err(self.fault("Error fetching booking by ID", CTX, &e).await),
        }
    }

    /// Apply a partial update and append an UPDATE audit entry
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` for a missing id, `InvalidInput` for a bad
    /// status value, and a database error on storage failure.
    pub async fn update(
        &self,
        id: i64,
        request: UpdateBookingRequest,
        actor_id: i64,
    ) -> AppResult<ServiceBooking> {
        const CTX: &str = "BookingManager::update";

        let existing = match self.database.get_booking(id).await {
            Ok(Some(booking)) => booking,
            Ok(None) => return Err(AppError::not_found(format!("Booking {id}"))),
            Err(e) => return Err(self.fault("Failed to update booking", CTX, &e).await),
        };

        let status = match request.status.as_deref() {
            Some(raw) => raw
                .parse::<BookingStatus>()
                .map_err(AppError::invalid_input)?,
            None => existing.status,
        };

        // Only supplied fields are applied; the rest keep their stored values
        let updated = ServiceBooking {
            id: existing.id,
            customer_name: request.customer_name.unwrap_or(existing.customer_name),
            phone: request.phone.or(existing.phone),
            email: request.email.unwrap_or(existing.email),
            service_id: request.service_id.unwrap_or(existing.service_id),
            status,
            created_at: existing.created_at,
        };

        if let Err(e) = self.database.update_booking(&updated).await {
            return Err(self.fault("Failed to update booking", CTX, &e).await);
        }

        let entry = AuditEntry {
            reference_id: updated.id,
            reference_type: REFERENCE_TYPE.into(),
            action: AuditAction::Update,
            context: CTX.into(),
            description: format!("Booking {} updated", updated.id),
            additional_info: None,
        };
        if let Err(e) = self.action_logger.log_action(&entry, actor_id).await {
            return Err(self.fault("Failed to update booking", CTX, &e).await);
        }

        Ok(updated)
    }

    /// Transition a booking's status, notifying the customer on confirmation
    ///
    /// The status is persisted unconditionally (any state may move to any
    /// other, including a no-op). When the new status is CONFIRMED and the
    /// booking carries a non-empty email, exactly one confirmation email is
    /// attempted using the state read before the write. Delivery failure is
    /// recorded in the error log and never rolls back the status change.
    /// The status-change audit entry is always appended last.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for a status outside the enum (nothing is
    /// persisted), `ResourceNotFound` for a missing id, and a database error
    /// on storage failure.
    pub async fn transition_status(
        &self,
        id: i64,
        raw_status: &str,
        actor_id: i64,
    ) -> AppResult<ServiceBooking> {
        const CTX: &str = "BookingManager::transition_status";

        let new_status = raw_status
            .parse::<BookingStatus>()
            .map_err(|_| AppError::invalid_input("Invalid status value"))?;

        let existing = match self.database.get_booking_with_service(id).await {
            Ok(Some(booking)) => booking,
            Ok(None) => return Err(AppError::not_found(format!("Booking {id}"))),
            Err(e) => {
                return Err(self.fault("Failed to update booking status", CTX, &e).await);
            }
        };

        if let Err(e) = self.database.update_booking_status(id, new_status).await {
            return Err(self.fault("Failed to update booking status", CTX, &e).await);
        }

        let mut updated = existing.booking.clone();
        updated.status = new_status;

        if new_status == BookingStatus::Confirmed && !existing.booking.email.is_empty() {
            // Uses the pre-write read; never re-fetched after persisting
            match self
                .mailer
                .send_confirmation_email(
                    &existing.booking.email,
                    updated.id,
                    &existing.service.name,
                    existing.service.price,
                )
                .await
            {
                Ok(()) => {
                    let entry = AuditEntry {
                        reference_id: updated.id,
                        reference_type: REFERENCE_TYPE.into(),
                        action: AuditAction::Update,
                        context: format!("{CTX} email"),
                        description: format!("Email sent to {}", existing.booking.email),
                        additional_info: None,
                    };
                    // The status is already persisted; a failed audit write
                    // here is recorded but does not fail the transition
                    if let Err(e) = self.action_logger.log_action(&entry, actor_id).await {
                        self.error_logger
                            .log(
                                "Failed to record email audit entry",
                                &format!("{e:#}"),
                                &format!("{CTX} email"),
                            )
                            .await;
                    }
                }
                Err(e) => {
                    // Logged only; the confirmed status stands
                    self.error_logger
                        .log(
                            &format!("Email send failed to {}", existing.booking.email),
                            &e.to_string(),
                            &format!("{CTX} email"),
                        )
                        .await;
                }
            }
        }

        let entry = AuditEntry {
            reference_id: updated.id,
            reference_type: REFERENCE_TYPE.into(),
            action: AuditAction::Update,
            context: CTX.into(),
            description: format!("Booking status updated to \"{new_status}\""),
            additional_info: None,
        };
        if let Err(e) = self.action_logger.log_action(&entry, actor_id).await {
            return Err(self.fault("Failed to update booking status", CTX, &e).await);
        }

        tracing::info!(
            booking_id = updated.id,
            status = %new_status,
            "Booking status updated"
        );
        Ok(updated)
    }

    /// Delete a booking and append a DELETE audit entry
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` for a missing id (the audit sink is left
    /// untouched) and a database error on storage failure.
    pub async fn delete(&self, id: i64, actor_id: i64) -> AppResult<()> {
        const CTX: &str = "BookingManager::delete";

        let existing = match self.database.get_booking(id).await {
            Ok(Some(booking)) => booking,
            Ok(None) => return Err(AppError::not_found(format!("Booking {id}"))),
            Err(e) => return Err(self.fault("Failed to delete booking", CTX, &e).await),
        };

        if let Err(e) = self.database.delete_booking(id).await {
            return Err(self.fault("Failed to delete booking", CTX, &e).await);
        }

        let entry = AuditEntry {
            reference_id: existing.id,
            reference_type: REFERENCE_TYPE.into(),
            action: AuditAction::Delete,
            context: CTX.into(),
            description: format!("Booking {} deleted", existing.id),
            additional_info: None,
        };
        if let Err(e) = self.action_logger.log_action(&entry, actor_id).await {
            return Err(self.fault("Failed to delete booking", CTX, &e).await);
        }

        tracing::info!(booking_id = id, "Booking deleted");
        Ok(())
    }
}
