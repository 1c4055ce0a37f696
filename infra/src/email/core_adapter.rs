//! Adapter bridging any [`EmailService`] provider to the core's
//! notification-sink contract.
//!
//! Message composition (subjects, link URLs) lives here so providers stay a
//! plain transport. The token parameter is the plaintext secret: it goes
//! into the link and nowhere else.

use async_trait::async_trait;
use std::sync::Arc;

use md_core::services::auth::MailerTrait;
use md_shared::config::email::EmailConfig;

use super::email_service::EmailService;

/// Implements the core mailer trait over a configured email provider
pub struct MailerAdapter {
    service: Arc<dyn EmailService>,
    config: EmailConfig,
}

impl MailerAdapter {
    /// Create a new adapter
    pub fn new(service: Arc<dyn EmailService>, config: EmailConfig) -> Self {
        Self { service, config }
    }

    fn verification_link(&self, token: &str) -> String {
        format!("{}/verify-email?token={}", self.config.public_base_url, token)
    }

    fn reset_link(&self, token: &str) -> String {
        format!("{}/reset-password?token={}", self.config.public_base_url, token)
    }
}

#[async_trait]
impl MailerTrait for MailerAdapter {
    async fn send_verification_email(
        &self,
        email: &str,
        name: &str,
        token: &str,
    ) -> Result<String, String> {
        let link = self.verification_link(token);
        let html = format!(
            "<p>Hi {},</p>\
             <p>Welcome to Matchday! Confirm your email address to activate \
             your account:</p>\
             <p><a href=\"{}\">Verify my email</a></p>\
             <p>This link expires in one hour. If you did not create an \
             account, you can ignore this message.</p>",
            name, link
        );

        self.service
            .send_email(email, "Verify your Matchday email", &html)
            .await
            .map_err(|e| e.to_string())
    }

    async fn send_password_reset_email(
        &self,
        email: &str,
        name: &str,
        token: &str,
    ) -> Result<String, String> {
        let link = self.reset_link(token);
        let html = format!(
            "<p>Hi {},</p>\
             <p>We received a request to reset your Matchday password:</p>\
             <p><a href=\"{}\">Choose a new password</a></p>\
             <p>This link expires in one hour. If you did not request a \
             reset, you can ignore this message.</p>",
            name, link
        );

        self.service
            .send_email(email, "Reset your Matchday password", &html)
            .await
            .map_err(|e| e.to_string())
    }
}
