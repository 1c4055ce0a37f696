//! SendGrid Email Service Implementation
//!
//! Delivers email through the SendGrid v3 HTTP API with retry and timeout
//! handling. Recipient addresses are masked in logs; message bodies carry
//! single-use secrets and are never logged.

use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use md_core::services::auth::mask_email;

use super::email_service::EmailService;
use crate::InfrastructureError;

const SENDGRID_SEND_URL: &str = "https://api.sendgrid.com/v3/mail/send";

/// SendGrid service configuration
#[derive(Debug, Clone)]
pub struct SendGridConfig {
    /// SendGrid API key
    pub api_key: String,
    /// Sender address (must be a verified sender)
    pub from_address: String,
    /// Sender display name
    pub from_name: String,
    /// Maximum retry attempts for failed requests
    pub max_retries: u32,
    /// Initial retry delay in milliseconds
    pub retry_delay_ms: u64,
    /// Timeout for API requests in seconds
    pub request_timeout_secs: u64,
}

impl Default for SendGridConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            from_address: String::from("no-reply@matchday.local"),
            from_name: String::from("Matchday"),
            max_retries: 3,
            retry_delay_ms: 1000,
            request_timeout_secs: 30,
        }
    }
}

impl SendGridConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self, InfrastructureError> {
        let api_key = std::env::var("SENDGRID_API_KEY")
            .map_err(|_| InfrastructureError::Config("SENDGRID_API_KEY not set".to_string()))?;
        let from_address = std::env::var("SENDGRID_FROM_ADDRESS")
            .map_err(|_| InfrastructureError::Config("SENDGRID_FROM_ADDRESS not set".to_string()))?;

        Ok(Self {
            api_key,
            from_address,
            from_name: std::env::var("SENDGRID_FROM_NAME")
                .unwrap_or_else(|_| "Matchday".to_string()),
            ..Default::default()
        })
    }
}

/// SendGrid email service implementation
pub struct SendGridEmailService {
    client: reqwest::Client,
    config: SendGridConfig,
}

impl SendGridEmailService {
    /// Create a new SendGrid email service
    pub fn new(config: SendGridConfig) -> Result<Self, InfrastructureError> {
        if config.api_key.is_empty() {
            return Err(InfrastructureError::Config(
                "SendGrid API key is empty".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        info!(
            from = %mask_email(&config.from_address),
            "SendGrid email service initialized"
        );

        Ok(Self { client, config })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self, InfrastructureError> {
        Self::new(SendGridConfig::from_env()?)
    }

    /// Send with retry and exponential backoff
    async fn send_with_retry(
        &self,
        to: &str,
        subject: &str,
        html_body: &str,
    ) -> Result<String, InfrastructureError> {
        let payload = json!({
            "personalizations": [{ "to": [{ "email": to }] }],
            "from": {
                "email": self.config.from_address,
                "name": self.config.from_name,
            },
            "subject": subject,
            "content": [{ "type": "text/html", "value": html_body }],
        });

        let mut attempts = 0;
        let mut delay = Duration::from_millis(self.config.retry_delay_ms);

        loop {
            attempts += 1;
            debug!(
                to = %mask_email(to),
                attempt = attempts,
                max_attempts = self.config.max_retries,
                "Sending email via SendGrid"
            );

            let response = self
                .client
                .post(SENDGRID_SEND_URL)
                .bearer_auth(&self.config.api_key)
                .json(&payload)
                .send()
                .await;

            match response {
                Ok(response) if response.status().is_success() => {
                    let message_id = response
                        .headers()
                        .get("x-message-id")
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string)
                        .unwrap_or_else(|| format!("sendgrid-{}", Uuid::new_v4()));
                    info!(
                        to = %mask_email(to),
                        message_id = %message_id,
                        "Email accepted by SendGrid"
                    );
                    return Ok(message_id);
                }
                Ok(response) => {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    // 4xx responses are not retryable; the request itself is wrong
                    if status.is_client_error() {
                        error!(status = %status, "SendGrid rejected the request");
                        return Err(InfrastructureError::Email(format!(
                            "SendGrid rejected the request with status {}: {}",
                            status, body
                        )));
                    }
                    warn!(
                        status = %status,
                        attempt = attempts,
                        "SendGrid server error, will retry"
                    );
                }
                Err(e) => {
                    warn!(error = %e, attempt = attempts, "SendGrid request failed, will retry");
                }
            }

            if attempts >= self.config.max_retries {
                error!(
                    to = %mask_email(to),
                    attempts = attempts,
                    "Email delivery failed after all retries"
                );
                return Err(InfrastructureError::Email(format!(
                    "Delivery failed after {} attempts",
                    attempts
                )));
            }

            tokio::time::sleep(delay).await;
            delay *= 2;
        }
    }
}

#[async_trait]
impl EmailService for SendGridEmailService {
    async fn send_email(
        &self,
        to: &str,
        subject: &str,
        html_body: &str,
    ) -> Result<String, InfrastructureError> {
        self.send_with_retry(to, subject, html_body).await
    }

    fn provider_name(&self) -> &str {
        "SendGrid"
    }
}
