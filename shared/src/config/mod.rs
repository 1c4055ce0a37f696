//! Configuration module with business-specific sub-modules
//!
//! This module organizes configuration into logical business areas:
//! - `auth` - Password policy, token lifetimes, redirect targets
//! - `database` - Database connection and pool configuration
//! - `email` - Outbound email provider configuration
//! - `environment` - Environment detection
//! - `rate_limit` - Rate limiting presets for the authentication flows

pub mod auth;
pub mod database;
pub mod email;
pub mod environment;
pub mod rate_limit;

use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use auth::AuthConfig;
pub use database::DatabaseConfig;
pub use email::EmailConfig;
pub use environment::Environment;
pub use rate_limit::RateLimitConfig;

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Authentication configuration
    pub auth: AuthConfig,

    /// Outbound email configuration
    pub email: EmailConfig,

    /// Rate limiting configuration
    pub rate_limit: RateLimitConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            database: DatabaseConfig::default(),
            auth: AuthConfig::default(),
            email: EmailConfig::default(),
            rate_limit: RateLimitConfig::default(),
        }
    }
}

impl AppConfig {
    /// Create configuration for development environment
    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig::new("mysql://localhost:3306/matchday_dev"),
            auth: AuthConfig::default(),
            email: EmailConfig::mock(),
            rate_limit: RateLimitConfig::development(),
        }
    }

    /// Create configuration for production environment
    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig::new("mysql://prod-db:3306/matchday").with_max_connections(50),
            auth: AuthConfig::default(),
            email: EmailConfig::from_env(),
            rate_limit: RateLimitConfig::production(),
        }
    }

    /// Load configuration from environment
    pub fn from_env() -> Self {
        match Environment::from_env() {
            Environment::Production => Self::production(),
            Environment::Staging => {
                let mut config = Self::development();
                config.environment = Environment::Staging;
                config
            }
            Environment::Development => Self::development(),
        }
    }
}
