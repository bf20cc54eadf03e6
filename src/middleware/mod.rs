// ABOUTME: HTTP middleware module for authentication and authorization guards
// ABOUTME: Re-exports the bearer-token guard and the role/context policy check
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Reserva Project

/// Bearer-token authentication and role/context authorization
pub mod auth;

pub use auth::{AuthMiddleware, RolePolicy, STAFF_MT_POLICY};
