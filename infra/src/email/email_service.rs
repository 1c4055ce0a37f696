//! Email Service Interface
//!
//! Defines the trait for email provider implementations that deliver
//! verification and password reset messages.

use async_trait::async_trait;

use crate::InfrastructureError;

/// Email service trait for sending messages
///
/// Implementations include:
/// - SendGrid HTTP API
/// - Mock implementation for development
#[async_trait]
pub trait EmailService: Send + Sync {
    /// Send an email
    ///
    /// # Arguments
    ///
    /// * `to` - Recipient address
    /// * `subject` - Message subject
    /// * `html_body` - HTML message body
    ///
    /// # Returns
    ///
    /// * `Ok(message_id)` - Provider identifier for the sent message
    /// * `Err(InfrastructureError)` - If sending fails
    async fn send_email(
        &self,
        to: &str,
        subject: &str,
        html_body: &str,
    ) -> Result<String, InfrastructureError>;

    /// Get the service provider name
    fn provider_name(&self) -> &str;

    /// Check if the service is available
    ///
    /// Default implementation always returns true.
    async fn is_available(&self) -> bool {
        true
    }
}
