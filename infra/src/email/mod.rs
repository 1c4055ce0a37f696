//! Email Service Module
//!
//! Outbound email delivery for verification and password reset links.
//!
//! ## Features
//!
//! - **EmailService trait**: common interface for all providers
//! - **Mock implementation**: log output for development
//! - **SendGrid support**: production delivery via the v3 HTTP API
//! - **Core adapter**: bridges any provider to the core's mailer contract

pub mod core_adapter;
pub mod email_service;
pub mod mock_email;
pub mod sendgrid;


pub use core_adapter::MailerAdapter;
pub use email_service::EmailService;
pub use mock_email::MockEmailService;
pub use sendgrid::{SendGridConfig, SendGridEmailService};

use std::sync::Arc;

use md_shared::config::email::EmailConfig;

/// Create an email service based on configuration
///
/// Returns the provider named in the configuration, falling back to the
/// mock when the provider cannot be initialized.
pub fn create_email_service(config: &EmailConfig) -> Arc<dyn EmailService> {
    match config.provider.as_str() {
        "sendgrid" => {
            let sendgrid_config = SendGridConfig {
                api_key: config.api_key.clone(),
                from_address: config.from_address.clone(),
                from_name: config.from_name.clone(),
                ..SendGridConfig::default()
            };
            match SendGridEmailService::new(sendgrid_config) {
                Ok(service) => Arc::new(service),
                Err(e) => {
                    tracing::error!("Failed to initialize SendGrid email service: {}", e);
                    tracing::warn!("Falling back to mock email service");
                    Arc::new(MockEmailService::new())
                }
            }
        }
        "mock" => Arc::new(MockEmailService::new()),
        other => {
            tracing::warn!(provider = other, "Unknown email provider, using mock");
            Arc::new(MockEmailService::new())
        }
    }
}
