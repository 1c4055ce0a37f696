//! Outbound email provider configuration

use serde::{Deserialize, Serialize};

/// Email service configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EmailConfig {
    /// Email provider ("sendgrid" or "mock")
    pub provider: String,

    /// Provider API key
    pub api_key: String,

    /// Sender address shown to recipients
    pub from_address: String,

    /// Sender display name
    pub from_name: String,

    /// Base URL used to build verification/reset links
    pub public_base_url: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self::mock()
    }
}

impl EmailConfig {
    /// Mock configuration for development: messages are logged, not sent
    pub fn mock() -> Self {
        Self {
            provider: String::from("mock"),
            api_key: String::new(),
            from_address: String::from("no-reply@matchday.local"),
            from_name: String::from("Matchday"),
            public_base_url: String::from("http://localhost:3000"),
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Self {
        Self {
            provider: std::env::var("EMAIL_PROVIDER").unwrap_or_else(|_| "mock".to_string()),
            api_key: std::env::var("EMAIL_API_KEY").unwrap_or_default(),
            from_address: std::env::var("EMAIL_FROM_ADDRESS")
                .unwrap_or_else(|_| "no-reply@matchday.local".to_string()),
            from_name: std::env::var("EMAIL_FROM_NAME").unwrap_or_else(|_| "Matchday".to_string()),
            public_base_url: std::env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
        }
    }
}
