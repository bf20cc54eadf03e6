// ABOUTME: SQLite persistence gateway for services, bookings and the log sinks
// ABOUTME: Owns schema creation and all CRUD, count and filtered-find queries
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Reserva Project

//! # Database Management
//!
//! This module provides database functionality for the Reserva booking
//! server. It owns durability: booking and service rows, the append-only
//! action log, and the structured error log.

use crate::audit::{AuditAction, AuditEntry, AuditRecord};
use crate::models::{BookingStatus, BookingWithService, ServiceBooking, ServiceRecord};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite, SqlitePool};

/// New booking row as computed by the workflow before insertion
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub customer_name: String,
    pub phone: Option<String>,
    pub email: String,
    pub service_id: i64,
    pub status: BookingStatus,
}

/// New service row as computed by the workflow before insertion
#[derive(Debug, Clone)]
pub struct NewService {
    pub name: String,
    pub category: String,
    pub price: f64,
    pub description: String,
    pub is_active: bool,
}

/// Database manager for booking and service storage
#[derive(Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Create a new database connection and run schema creation
    ///
    /// # Errors
    ///
    /// Returns an error when the pool cannot connect or DDL fails.
    pub async fn new(database_url: &str) -> Result<Self> {
        // Ensure SQLite creates the database file if it doesn't exist
        let connection_options = if database_url.starts_with("sqlite:")
            && !database_url.contains(":memory:")
        {
            format!("{database_url}?mode=rwc")
        } else {
            database_url.to_string()
        };

        let pool = SqlitePool::connect(&connection_options)
            .await
            .with_context(|| format!("Failed to connect to database: {database_url}"))?;

        let db = Self { pool };
        db.migrate().await?;

        Ok(db)
    }

    /// Run database schema creation (idempotent)
    ///
    /// # Errors
    ///
    /// Returns an error when any DDL statement fails.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS services (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                category TEXT NOT NULL,
                price REAL NOT NULL,
                description TEXT NOT NULL,
                is_active BOOLEAN NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS service_bookings (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                customer_name TEXT NOT NULL,
                phone TEXT,
                email TEXT NOT NULL,
                service_id INTEGER NOT NULL REFERENCES services (id),
                status TEXT NOT NULL DEFAULT 'PENDING',
                created_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_service_bookings_status ON service_bookings(status)",
        )
        .execute(&self.pool)
        .await?;

        // Append-only action log; rows are never updated or deleted
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS action_logs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                reference_id INTEGER NOT NULL,
                reference_type TEXT NOT NULL,
                action TEXT NOT NULL,
                context TEXT NOT NULL,
                description TEXT NOT NULL,
                additional_info TEXT,
                actor_user_id INTEGER NOT NULL,
                created_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS error_logs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                message TEXT NOT NULL,
                detail TEXT NOT NULL,
                context TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // ── Bookings ────────────────────────────────────────────────────────

    /// Insert a new booking and return the stored record
    ///
    /// # Errors
    ///
    /// Returns an error when the insert fails.
    pub async fn create_booking(&self, booking: &NewBooking) -> Result<ServiceBooking> {
        let created_at = Utc::now();
        let result = sqlx::query(
            r"
            INSERT INTO service_bookings (customer_name, phone, email, service_id, status, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(&booking.customer_name)
        .bind(&booking.phone)
        .bind(&booking.email)
        .bind(booking.service_id)
        .bind(booking.status.as_str())
        .bind(created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(ServiceBooking {
            id: result.last_insert_rowid(),
            customer_name: booking.customer_name.clone(),
            phone: booking.phone.clone(),
            email: booking.email.clone(),
            service_id: booking.service_id,
            status: booking.status,
            created_at,
        })
    }

    /// Fetch a booking without its service join
    ///
    /// # Errors
    ///
    /// Returns an error when the query fails.
    pub async fn get_booking(&self, id: i64) -> Result<Option<ServiceBooking>> {
        let row = sqlx::query(
            "SELECT id, customer_name, phone, email, service_id, status, created_at
             FROM service_bookings WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(booking_from_row).transpose()
    }

    /// Fetch a booking joined with its owning service
    ///
    /// # Errors
    ///
    /// Returns an error when the query fails.
    pub async fn get_booking_with_service(&self, id: i64) -> Result<Option<BookingWithService>> {
        let row = sqlx::query(&format!(
            "{BOOKING_JOIN_SELECT} WHERE b.id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(booking_with_service_from_row).transpose()
    }

    /// Page of bookings ordered by descending id, joined with their services
    ///
    /// An unmatched status filter yields an empty page, not an error.
    ///
    /// # Errors
    ///
    /// Returns an error when the query fails.
    pub async fn list_bookings(
        &self,
        skip: i64,
        limit: i64,
        status: Option<&str>,
    ) -> Result<Vec<BookingWithService>> {
        let rows = match status {
            Some(status) => {
                sqlx::query(&format!(
                    "{BOOKING_JOIN_SELECT} WHERE b.status = ? ORDER BY b.id DESC LIMIT ? OFFSET ?"
                ))
                .bind(status)
                .bind(limit)
                .bind(skip)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(&format!(
                    "{BOOKING_JOIN_SELECT} ORDER BY b.id DESC LIMIT ? OFFSET ?"
                ))
                .bind(limit)
                .bind(skip)
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.iter().map(booking_with_service_from_row).collect()
    }

    /// Count bookings under the same filter as [`Self::list_bookings`]
    ///
    /// # Errors
    ///
    /// Returns an error when the query fails.
    pub async fn count_bookings(&self, status: Option<&str>) -> Result<i64> {
        let count: i64 = match status {
            Some(status) => {
                sqlx::query_scalar("SELECT COUNT(*) FROM service_bookings WHERE status = ?")
                    .bind(status)
                    .fetch_one(&self.pool)
                    .await?
            }
            None => {
                sqlx::query_scalar("SELECT COUNT(*) FROM service_bookings")
                    .fetch_one(&self.pool)
                    .await?
            }
        };
        Ok(count)
    }

    /// Persist the full mutable field set of a booking
    ///
    /// # Errors
    ///
    /// Returns an error when the update fails.
    pub async fn update_booking(&self, booking: &ServiceBooking) -> Result<()> {
        sqlx::query(
            r"
            UPDATE service_bookings
            SET customer_name = ?, phone = ?, email = ?, service_id = ?, status = ?
            WHERE id = ?
            ",
        )
        .bind(&booking.customer_name)
        .bind(&booking.phone)
        .bind(&booking.email)
        .bind(booking.service_id)
        .bind(booking.status.as_str())
        .bind(booking.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Persist a status change for a booking
    ///
    /// # Errors
    ///
    /// Returns an error when the update fails.
    pub async fn update_booking_status(&self, id: i64, status: BookingStatus) -> Result<()> {
        sqlx::query("UPDATE service_bookings SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Delete a booking row
    ///
    /// # Errors
    ///
    /// Returns an error when the delete fails.
    pub async fn delete_booking(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM service_bookings WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // ── Services ────────────────────────────────────────────────────────

    /// Insert a new service and return the stored record
    ///
    /// # Errors
    ///
    /// Returns an error when the insert fails.
    pub async fn create_service(&self, service: &NewService) -> Result<ServiceRecord> {
        let created_at = Utc::now();
        let result = sqlx::query(
            r"
            INSERT INTO services (name, category, price, description, is_active, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(&service.name)
        .bind(&service.category)
        .bind(service.price)
        .bind(&service.description)
        .bind(service.is_active)
        .bind(created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(ServiceRecord {
            id: result.last_insert_rowid(),
            name: service.name.clone(),
            category: service.category.clone(),
            price: service.price,
            description: service.description.clone(),
            is_active: service.is_active,
            created_at,
        })
    }

    /// Fetch a service by id
    ///
    /// # Errors
    ///
    /// Returns an error when the query fails.
    pub async fn get_service(&self, id: i64) -> Result<Option<ServiceRecord>> {
        let row = sqlx::query(
            "SELECT id, name, category, price, description, is_active, created_at
             FROM services WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(service_from_row).transpose()
    }

    /// Page of services ordered by descending id
    ///
    /// # Errors
    ///
    /// Returns an error when the query fails.
    pub async fn list_services(&self, skip: i64, limit: i64) -> Result<Vec<ServiceRecord>> {
        let rows = sqlx::query(
            "SELECT id, name, category, price, description, is_active, created_at
             FROM services ORDER BY id DESC LIMIT ? OFFSET ?",
        )
        .bind(limit)
        .bind(skip)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(service_from_row).collect()
    }

    /// Total number of services
    ///
    /// # Errors
    ///
    /// Returns an error when the query fails.
    pub async fn count_services(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM services")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Persist the full mutable field set of a service
    ///
    /// # Errors
    ///
    /// Returns an error when the update fails.
    pub async fn update_service(&self, service: &ServiceRecord) -> Result<()> {
        sqlx::query(
            r"
            UPDATE services
            SET name = ?, category = ?, price = ?, description = ?, is_active = ?
            WHERE id = ?
            ",
        )
        .bind(&service.name)
        .bind(&service.category)
        .bind(service.price)
        .bind(&service.description)
        .bind(service.is_active)
        .bind(service.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Delete a service row
    ///
    /// # Errors
    ///
    /// Returns an error when the delete fails.
    pub async fn delete_service(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM services WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // ── Log sinks ───────────────────────────────────────────────────────

    /// Append an action log entry; rows here are immutable
    ///
    /// # Errors
    ///
    /// Returns an error when the insert fails.
    pub async fn insert_action_log(&self, entry: &AuditEntry, actor_user_id: i64) -> Result<i64> {
        let result = sqlx::query(
            r"
            INSERT INTO action_logs
                (reference_id, reference_type, action, context, description, additional_info, actor_user_id, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(entry.reference_id)
        .bind(&entry.reference_type)
        .bind(entry.action.as_str())
        .bind(&entry.context)
        .bind(&entry.description)
        .bind(entry.additional_info.as_ref().map(ToString::to_string))
        .bind(actor_user_id)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Action log entries for one record, oldest first
    ///
    /// Keyed by `(reference_type, reference_id)`: a service and a booking
    /// sharing a numeric id have independent trails.
    ///
    /// # Errors
    ///
    /// Returns an error when the query fails.
    pub async fn list_action_logs(
        &self,
        reference_type: &str,
        reference_id: i64,
    ) -> Result<Vec<AuditRecord>> {
        let rows = sqlx::query(
            "SELECT id, reference_id, reference_type, action, context, description,
                    additional_info, actor_user_id, created_at
             FROM action_logs WHERE reference_type = ? AND reference_id = ? ORDER BY id ASC",
        )
        .bind(reference_type)
        .bind(reference_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(audit_record_from_row).collect()
    }

    /// Total number of action log entries
    ///
    /// # Errors
    ///
    /// Returns an error when the query fails.
    pub async fn count_action_logs(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM action_logs")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Record a structured failure
    ///
    /// # Errors
    ///
    /// Returns an error when the insert fails.
    pub async fn insert_error_log(
        &self,
        message: &str,
        detail: &str,
        context: &str,
    ) -> Result<i64> {
        let result = sqlx::query(
            "INSERT INTO error_logs (message, detail, context, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(message)
        .bind(detail)
        .bind(context)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Total number of error log entries
    ///
    /// # Errors
    ///
    /// Returns an error when the query fails.
    pub async fn count_error_logs(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM error_logs")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

/// Shared SELECT for booking rows joined with their owning service
const BOOKING_JOIN_SELECT: &str = r"
    SELECT b.id, b.customer_name, b.phone, b.email, b.service_id, b.status, b.created_at,
           s.id AS svc_id, s.name AS svc_name, s.category AS svc_category,
           s.price AS svc_price, s.description AS svc_description,
           s.is_active AS svc_is_active, s.created_at AS svc_created_at
    FROM service_bookings b
    JOIN services s ON s.id = b.service_id";

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(value)
        .with_context(|| format!("Invalid timestamp in database: {value}"))?
        .with_timezone(&Utc))
}

fn booking_from_row(row: &SqliteRow) -> Result<ServiceBooking> {
    let status: String = row.try_get("status")?;
    let created_at: String = row.try_get("created_at")?;

    Ok(ServiceBooking {
        id: row.try_get("id")?,
        customer_name: row.try_get("customer_name")?,
        phone: row.try_get("phone")?,
        email: row.try_get("email")?,
        service_id: row.try_get("service_id")?,
        status: status
            .parse()
            .map_err(|e: String| anyhow::anyhow!("Invalid status in database: {e}"))?,
        created_at: parse_timestamp(&created_at)?,
    })
}

fn service_from_row(row: &SqliteRow) -> Result<ServiceRecord> {
    let created_at: String = row.try_get("created_at")?;

    Ok(ServiceRecord {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        category: row.try_get("category")?,
        price: row.try_get("price")?,
        description: row.try_get("description")?,
        is_active: row.try_get("is_active")?,
        created_at: parse_timestamp(&created_at)?,
    })
}

fn booking_with_service_from_row(row: &SqliteRow) -> Result<BookingWithService> {
    let booking = booking_from_row(row)?;

    let status_created: String = row.try_get("svc_created_at")?;
    let service = ServiceRecord {
        id: row.try_get("svc_id")?,
        name: row.try_get("svc_name")?,
        category: row.try_get("svc_category")?,
        price: row.try_get("svc_price")?,
        description: row.try_get("svc_description")?,
        is_active: row.try_get("svc_is_active")?,
        created_at: parse_timestamp(&status_created)?,
    };

    Ok(BookingWithService { booking, service })
}

fn audit_record_from_row(row: &SqliteRow) -> Result<AuditRecord> {
    let action: String = row.try_get("action")?;
    let created_at: String = row.try_get("created_at")?;
    let additional_info: Option<String> = row.try_get("additional_info")?;

    Ok(AuditRecord {
        id: row.try_get("id")?,
        reference_id: row.try_get("reference_id")?,
        reference_type: row.try_get("reference_type")?,
        action: action
            .parse::<AuditAction>()
            .map_err(|e| anyhow::anyhow!("Invalid action in database: {e}"))?,
        context: row.try_get("context")?,
        description: row.try_get("description")?,
        additional_info: additional_info
            .map(|raw| serde_json::from_str(&raw))
            .transpose()
            .context("Invalid additional_info JSON in database")?,
        actor_user_id: row.try_get("actor_user_id")?,
        created_at: parse_timestamp(&created_at)?,
    })
}
