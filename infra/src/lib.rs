//! # Infrastructure Layer
//!
//! This crate implements the infrastructure layer for the Matchday backend.
//! It provides the concrete implementations behind the core's boundary
//! contracts:
//!
//! - **Database**: MySQL implementation of the user repository using SQLx
//! - **Email**: Outbound email providers (SendGrid HTTP API, mock) and the
//!   adapter implementing the core's notification-sink trait

pub mod database;
pub mod email;

use thiserror::Error;

pub use database::connection::create_pool;
pub use database::mysql::MySqlUserRepository;
pub use email::{create_email_service, EmailService, MailerAdapter, MockEmailService};

use md_shared::config::{AppConfig, DatabaseConfig, EmailConfig};

/// Load application configuration from the environment, reading a `.env`
/// file when one is present
pub fn load_config() -> AppConfig {
    dotenvy::dotenv().ok();
    let mut config = AppConfig::from_env();
    config.database = DatabaseConfig::from_env();
    config.email = EmailConfig::from_env();
    config
}

/// Errors raised by infrastructure services
#[derive(Error, Debug)]
pub enum InfrastructureError {
    /// Database connection or query error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// HTTP request error for external services
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Email delivery error
    #[error("Email error: {0}")]
    Email(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
