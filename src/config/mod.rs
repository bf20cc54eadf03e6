// ABOUTME: Configuration module root for environment-driven server settings
// ABOUTME: Groups the typed configuration sections constructed once at startup
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Reserva Project

/// Environment-based server configuration
pub mod environment;
