//! Notification sink trait for outbound authentication email

use async_trait::async_trait;

/// Trait for email delivery integration
///
/// Implementations live in the infrastructure layer. The token passed in is
/// the plaintext secret; the mailer embeds it in a link and MUST NOT log or
/// persist it.
#[async_trait]
pub trait MailerTrait: Send + Sync {
    /// Send an email verification link
    ///
    /// # Returns
    /// * `Ok(message_id)` - Provider identifier for the sent message
    /// * `Err(String)` - Delivery failed
    async fn send_verification_email(
        &self,
        email: &str,
        name: &str,
        token: &str,
    ) -> Result<String, String>;

    /// Send a password reset link
    async fn send_password_reset_email(
        &self,
        email: &str,
        name: &str,
        token: &str,
    ) -> Result<String, String>;
}
