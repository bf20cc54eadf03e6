// ABOUTME: Common data models for services, bookings, identities and audit records
// ABOUTME: Defines the three-state booking status and the wire DTOs consumed by the API
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Reserva Project

//! # Data Models
//!
//! Domain records persisted by the database gateway plus the request DTOs
//! accepted at the HTTP boundary. Wire field names are camelCase to match
//! the consumed response envelope.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of a service booking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BookingStatus {
    /// Awaiting staff confirmation (default on creation)
    Pending,
    /// Confirmed by staff; triggers the customer notification
    Confirmed,
    /// Cancelled by staff or customer
    Cancelled,
}

impl BookingStatus {
    /// Canonical uppercase name as stored in the database
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Confirmed => "CONFIRMED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    /// Case-insensitive parse; callers may supply lowercase at the boundary
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PENDING" => Ok(Self::Pending),
            "CONFIRMED" => Ok(Self::Confirmed),
            "CANCELLED" => Ok(Self::Cancelled),
            other => Err(format!("Invalid status value: {other}")),
        }
    }
}

/// A bookable service offered on the platform
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRecord {
    pub id: i64,
    pub name: String,
    pub category: String,
    /// Non-negative price in the platform currency
    pub price: f64,
    pub description: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// A customer's reservation of a service
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceBooking {
    pub id: i64,
    pub customer_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub email: String,
    pub service_id: i64,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

/// Booking joined with its owning service, as returned by list/get reads
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingWithService {
    #[serde(flatten)]
    pub booking: ServiceBooking,
    pub service: ServiceRecord,
}

/// Staff role carried in the JWT
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    Manager,
    Admin,
    Developer,
    Client,
}

/// Organizational scope of a role: internal multi-tenant staff or client side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserContext {
    /// Internal multi-tenant staff
    Mt,
    /// Customer-facing accounts
    Client,
}

/// Identity resolved from a verified bearer token
///
/// Attached to the request after the authorization guard succeeds and used
/// downstream for audit attribution.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: i64,
    pub email: String,
    pub role: UserRole,
    pub context: UserContext,
}

/// Request body for creating a booking
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub customer_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub email: String,
    pub service_id: i64,
    /// Optional initial status; defaults to PENDING when absent
    #[serde(default)]
    pub status: Option<String>,
}

/// Partial update for a booking; only supplied fields are applied
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookingRequest {
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub service_id: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Request body for the dedicated status-transition operation
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateBookingStatusRequest {
    pub status: String,
}

/// Request body for creating a service
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateServiceRequest {
    pub name: String,
    pub category: String,
    pub price: f64,
    pub description: String,
    /// Defaults to active when absent
    #[serde(default)]
    pub is_active: Option<bool>,
}

/// Partial update for a service; only supplied fields are applied
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateServiceRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}
