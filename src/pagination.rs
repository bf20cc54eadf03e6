// ABOUTME: Offset pagination parameters shared by the booking and service list endpoints
// ABOUTME: Validates page/limit bounds and computes the row offset for SQL queries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Reserva Project

use crate::errors::{AppError, AppResult};
use serde::Deserialize;

const DEFAULT_PAGE: i64 = 1;
const DEFAULT_LIMIT: i64 = 10;

/// Query parameters for paginated list endpoints
///
/// `page` and `limit` default to 1 and 10 and must both be at least 1.
/// `status` optionally filters bookings; it is upper-cased at the boundary
/// so lowercase caller input matches the stored enum values.
#[derive(Debug, Clone, Deserialize)]
pub struct PaginationParams {
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
}

impl PaginationParams {
    /// Resolve defaults and validate bounds
    ///
    /// # Errors
    ///
    /// Returns an `InvalidInput` error when page or limit is below 1.
    pub fn resolve(&self) -> AppResult<ResolvedPagination> {
        let page = self.page.unwrap_or(DEFAULT_PAGE);
        let limit = self.limit.unwrap_or(DEFAULT_LIMIT);

        if page < 1 {
            return Err(AppError::invalid_input("Page must be at least 1"));
        }
        if limit < 1 {
            return Err(AppError::invalid_input("Limit must be at least 1"));
        }

        // Caller-supplied values; the offset must not overflow i64
        let skip = page
            .checked_sub(1)
            .and_then(|p| p.checked_mul(limit))
            .ok_or_else(|| AppError::invalid_input("Page window is out of range"))?;

        Ok(ResolvedPagination {
            page,
            limit,
            skip,
            status: self
                .status
                .as_deref()
                .map(|s| s.trim().to_ascii_uppercase())
                .filter(|s| !s.is_empty()),
        })
    }
}

/// Validated pagination window with the status filter normalized to uppercase
#[derive(Debug, Clone)]
pub struct ResolvedPagination {
    pub page: i64,
    pub limit: i64,
    /// Row offset for the SQL query: `(page - 1) * limit`, overflow-checked
    pub skip: i64,
    pub status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_applied() {
        let params = PaginationParams {
            page: None,
            limit: None,
            status: None,
        };
        let resolved = params.resolve().unwrap();
        assert_eq!(resolved.page, 1);
        assert_eq!(resolved.limit, 10);
        assert_eq!(resolved.skip, 0);
    }

    #[test]
    fn test_skip_computation() {
        let params = PaginationParams {
            page: Some(3),
            limit: Some(10),
            status: None,
        };
        assert_eq!(params.resolve().unwrap().skip, 20);
    }

    #[test]
    fn test_huge_page_rejected_instead_of_overflowing() {
        let params = PaginationParams {
            page: Some(i64::MAX),
            limit: Some(10),
            status: None,
        };
        let err = params.resolve().unwrap_err();
        assert_eq!(err.http_status(), 400);

        let params = PaginationParams {
            page: Some(2),
            limit: Some(i64::MAX),
            status: None,
        };
        assert!(params.resolve().is_err());
    }

    #[test]
    fn test_rejects_out_of_range() {
        let params = PaginationParams {
            page: Some(0),
            limit: Some(10),
            status: None,
        };
        assert!(params.resolve().is_err());

        let params = PaginationParams {
            page: Some(1),
            limit: Some(0),
            status: None,
        };
        assert!(params.resolve().is_err());
    }

    #[test]
    fn test_status_filter_uppercased() {
        let params = PaginationParams {
            page: None,
            limit: None,
            status: Some("confirmed".into()),
        };
        let resolved = params.resolve().unwrap();
        assert_eq!(resolved.status.as_deref(), Some("CONFIRMED"));
    }

    #[test]
    fn test_blank_status_dropped() {
        let params = PaginationParams {
            page: None,
            limit: None,
            status: Some("  ".into()),
        };
        assert!(params.resolve().unwrap().status.is_none());
    }
}
