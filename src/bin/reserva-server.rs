// ABOUTME: Main server binary wiring configuration, storage, auth and mail into the HTTP server
// ABOUTME: Loads environment configuration, runs migrations and serves the booking API
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Reserva Project

//! # Reserva Booking Server Binary
//!
//! Starts the booking backend: loads environment configuration, opens the
//! SQLite database, prepares the JWT validator and SMTP mailer, and serves
//! the HTTP API.

use anyhow::Result;
use clap::Parser;
use reserva_server::{
    auth::AuthManager, config::environment::ServerConfig, database::Database, logging,
    notifications::SmtpMailer, resources::ServerResources, server::BookingServer,
};
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "reserva-server")]
#[command(about = "Reserva - service booking backend with audit trail and email confirmations")]
pub struct Args {
    /// Override the HTTP port from the environment
    #[arg(long)]
    http_port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    logging::init_from_env()?;

    let mut config = ServerConfig::from_env()?;
    if let Some(port) = args.http_port {
        config.http_port = port;
    }
    info!("Configuration loaded: {}", config.summary());

    let database = Database::new(&config.database.url.to_connection_string()).await?;
    if config.database.auto_migrate {
        database.migrate().await?;
        info!("Database schema ready");
    }

    let auth_manager = AuthManager::new(
        config.auth.jwt_secret.clone().into_bytes(),
        config.auth.jwt_expiry_hours,
    );

    let mailer = Arc::new(SmtpMailer::new(config.smtp.clone()));

    let config = Arc::new(config);
    let resources = Arc::new(ServerResources::new(
        database,
        auth_manager,
        mailer,
        config.clone(),
    ));

    info!("Starting booking server on port {}", config.http_port);
    BookingServer::new(resources).run(config.http_port).await
}
