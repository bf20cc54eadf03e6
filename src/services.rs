// ABOUTME: Service catalogue workflow covering CRUD over bookable services
// ABOUTME: Validates pricing, persists changes and appends audit entries for mutations
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Reserva Project

//! # Service Catalogue Workflow
//!
//! CRUD over the services customers can book. Mirrors the booking workflow's
//! error policy: validation and not-found results return locally, persistence
//! faults pass through the error log sink.

use crate::audit::{ActionLogger, AuditAction, AuditEntry, ErrorLogger};
use crate::database::{Database, NewService};
use crate::errors::{AppError, AppResult};
use crate::models::{CreateServiceRequest, ServiceRecord, UpdateServiceRequest};
use crate::pagination::PaginationParams;
use serde::Serialize;
use std::sync::Arc;

const REFERENCE_TYPE: &str = "SERVICE";

/// One page of services with the total count
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServicePage {
    pub page: i64,
    pub limit: i64,
    pub total_count: i64,
    pub services: Vec<ServiceRecord>,
}

/// Service catalogue manager
#[derive(Clone)]
pub struct ServiceManager {
    database: Arc<Database>,
    action_logger: ActionLogger,
    error_logger: ErrorLogger,
}

impl ServiceManager {
    /// Create a new service manager
    #[must_use]
    pub fn new(
        database: Arc<Database>,
        action_logger: ActionLogger,
        error_logger: ErrorLogger,
    ) -> Self {
        Self {
            database,
            action_logger,
            error_logger,
        }
    }

    async fn fault(&self, message: &str, context: &str, err: &anyhow::Error) -> AppError {
        self.error_logger
            .log(message, &format!("{err:#}"), context)
            .await
    }

    /// Create a service and append a CREATE audit entry
    ///
    /// # Errors
    ///
    /// Returns `MissingRequiredField` for an empty name, `ValueOutOfRange`
    /// for a negative price and a database error on storage failure.
    pub async fn create(
        &self,
        request: CreateServiceRequest,
        actor_id: i64,
    ) -> AppResult<ServiceRecord> {
        const CTX: &str = "ServiceManager::create";

        if request.name.trim().is_empty() {
            return Err(AppError::missing_required_field("Service name"));
        }
        if request.price < 0.0 {
            return Err(AppError::value_out_of_range("Price must be non-negative"));
        }

        let new_service = NewService {
            name: request.name,
            category: request.category,
            price: request.price,
            description: request.description,
            is_active: request.is_active.unwrap_or(true),
        };

        let service = match self.database.create_service(&new_service).await {
            Ok(service) => service,
            Err(e) => return Err(self.fault("Failed to create service", CTX, &e).await),
        };

        let entry = AuditEntry {
            reference_id: service.id,
            reference_type: REFERENCE_TYPE.into(),
            action: AuditAction::Create,
            context: CTX.into(),
            description: format!("Service {} created", service.id),
            additional_info: None,
        };
        if let Err(e) = self.action_logger.log_action(&entry, actor_id).await {
            return Err(self.fault("Failed to create service", CTX, &e).await);
        }

        tracing::info!(service_id = service.id, "Service created");
        Ok(service)
    }

    /// Paginated list of services ordered by descending id
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for page/limit below 1 and a database error on
    /// storage failure.
    pub async fn list(&self, params: &PaginationParams) -> AppResult<ServicePage> {
        const CTX: &str = "ServiceManager::list";

        let window = params.resolve()?;

        let services = match self.database.list_services(window.skip, window.limit).await {
            Ok(services) => services,
            Err(e) => return Err(self.fault("Error fetching services", CTX, &e).await),
        };

        let total_count = match self.database.count_services().await {
            Ok(count) => count,
            Err(e) => return Err(self.fault("Error fetching services", CTX, &e).await),
        };

        Ok(ServicePage {
            page: window.page,
            limit: window.limit,
            total_count,
            services,
        })
    }

    /// Fetch one service
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` for a missing id and a database error on
    /// storage failure.
    pub async fn get(&self, id: i64) -> AppResult<ServiceRecord> {
        const CTX: &str = "ServiceManager::get";

        match self.database.get_service(id).await {
            Ok(Some(service)) => Ok(service),
            Ok(None) => Err(AppError::not_found(format!("Service {id}"))),
            Err(e) => Err(self.fault("Error fetching service by ID", CTX, &e).await),
        }
    }

    /// Apply a partial update and append an UPDATE audit entry
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` for a missing id, `ValueOutOfRange` for a
    /// negative price, and a database error on storage failure.
    pub async fn update(
        &self,
        id: i64,
        request: UpdateServiceRequest,
        actor_id: i64,
    ) -> AppResult<ServiceRecord> {
        const CTX: &str = "ServiceManager::update";

        let existing = match self.database.get_service(id).await {
            Ok(Some(service)) => service,
            Ok(None) => return Err(AppError::not_found(format!("Service {id}"))),
            Err(e) => return Err(self.fault("Failed to update service", CTX, &e).await),
        };

        if let Some(price) = request.price {
            if price < 0.0 {
                return Err(AppError::value_out_of_range("Price must be non-negative"));
            }
        }

        let updated = ServiceRecord {
            id: existing.id,
            name: request.name.unwrap_or(existing.name),
            category: request.category.unwrap_or(existing.category),
            price: request.price.unwrap_or(existing.price),
            description: request.description.unwrap_or(existing.description),
            is_active: request.is_active.unwrap_or(existing.is_active),
            created_at: existing.created_at,
        };

        if let Err(e) = self.database.update_service(&updated).await {
            return Err(self.fault("Failed to update service", CTX, &e).await);
        }

        let entry = AuditEntry {
            reference_id: updated.id,
            reference_type: REFERENCE_TYPE.into(),
            action: AuditAction::Update,
            context: CTX.into(),
            description: format!("Service {} updated", updated.id),
            additional_info: None,
        };
        if let Err(e) = self.action_logger.log_action(&entry, actor_id).await {
            return Err(self.fault("Failed to update service", CTX, &e).await);
        }

        Ok(updated)
    }

    /// Delete a service and append a DELETE audit entry
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` for a missing id and a database error on
    /// storage failure.
    pub async fn delete(&self, id: i64, actor_id: i64) -> AppResult<()> {
        const CTX: &str = "ServiceManager::delete";

        let existing = match self.database.get_service(id).await {
            Ok(Some(service)) => service,
            Ok(None) => return Err(AppError::not_found(format!("Service {id}"))),
            Err(e) => return Err(self.fault("Failed to delete service", CTX, &e).await),
        };

        if let Err(e) = self.database.delete_service(id).await {
            return Err(self.fault("Failed to delete service", CTX, &e).await);
        }

        let entry = AuditEntry {
            reference_id: existing.id,
            reference_type: REFERENCE_TYPE.into(),
            action: AuditAction::Delete,
            context: CTX.into(),
            description: format!("Service {} deleted", existing.id),
            additional_info: None,
        };
        if let Err(e) = self.action_logger.log_action(&entry, actor_id).await {
            return Err(self.fault("Failed to delete service", CTX, &e).await);
        }

        tracing::info!(service_id = id, "Service deleted");
        Ok(())
    }
}
