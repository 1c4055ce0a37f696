//! Error type definitions for authentication, token handling, and validation.
//!
//! Failure messages here are caller-visible. The login failures for an
//! unknown email and a wrong password share one variant so the two cases
//! cannot be told apart by message or shape; account-state failures
//! (suspended, inactive, unverified) stay distinct because the caller
//! already supplied the correct identity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Authentication-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Generic credential failure: unknown email and wrong password both map
    /// here with an identical message. The remaining-attempts count is
    /// structured data for client UX, not part of the message.
    #[error("Invalid email or password")]
    InvalidCredentials { remaining_attempts: Option<u32> },

    #[error("Too many requests. Please try again in {retry_after_seconds} seconds")]
    RateLimited { retry_after_seconds: u64 },

    #[error("Too many failed attempts. Please try again in {retry_after_seconds} seconds")]
    LockedOut { retry_after_seconds: u64 },

    #[error("This account has been suspended")]
    AccountSuspended,

    #[error("This account is not active")]
    AccountInactive,

    #[error("Please verify your email address before logging in")]
    EmailNotVerified { email: String },

    /// Duplicate email and duplicate phone produce this same variant; the
    /// response must not reveal which field collided.
    #[error("An account with these details already exists")]
    DuplicateAccount,

    #[error("Current password is incorrect")]
    InvalidCurrentPassword { remaining_attempts: Option<u32> },

    #[error("New password must be different from your current password")]
    PasswordReuse,

    #[error("New password and confirmation do not match")]
    PasswordMismatch,

    #[error("User not found")]
    UserNotFound,

    #[error("Unable to send email. Please try again later")]
    EmailDeliveryFailure,
}

/// Single-use security token errors (email verification, password reset)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token is missing")]
    Missing,

    #[error("Token format is invalid")]
    Malformed,

    #[error("Token is invalid or has already been used")]
    InvalidOrUsed,

    /// The stored token fields are cleared when this is raised; the email is
    /// carried (when known) so the UI can offer a resend action.
    #[error("Token has expired. Please request a new one")]
    Expired { email: Option<String> },
}

/// Input validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field: {field}")]
    RequiredField { field: String },

    #[error("Invalid format for field: {field}")]
    InvalidFormat { field: String },

    #[error("Invalid length for field: {field} (min: {min}, max: {max})")]
    InvalidLength {
        field: String,
        min: usize,
        max: usize,
    },

    #[error("Invalid email format")]
    InvalidEmail,

    #[error("Invalid phone number format")]
    InvalidPhone,
}

/// Unified error response structure for API responses
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// Additional error details if available
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, serde_json::Value>>,
    /// Timestamp when the error occurred
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(error: impl ToString, message: impl ToString) -> Self {
        Self {
            error: error.to_string(),
            message: message.to_string(),
            details: None,
            timestamp: Utc::now(),
        }
    }

    /// Add a single detail to the error response
    pub fn with_detail(mut self, key: impl ToString, value: serde_json::Value) -> Self {
        let mut details = self.details.unwrap_or_default();
        details.insert(key.to_string(), value);
        self.details = Some(details);
        self
    }
}

/// Convert AuthError to ErrorResponse
impl From<AuthError> for ErrorResponse {
    fn from(err: AuthError) -> Self {
        let error_code = match &err {
            AuthError::InvalidCredentials { .. } => "INVALID_CREDENTIALS",
            AuthError::RateLimited { .. } => "RATE_LIMITED",
            AuthError::LockedOut { .. } => "LOCKED_OUT",
            AuthError::AccountSuspended => "ACCOUNT_SUSPENDED",
            AuthError::AccountInactive => "ACCOUNT_INACTIVE",
            AuthError::EmailNotVerified { .. } => "EMAIL_NOT_VERIFIED",
            AuthError::DuplicateAccount => "DUPLICATE_ACCOUNT",
            AuthError::InvalidCurrentPassword { .. } => "INVALID_CURRENT_PASSWORD",
            AuthError::PasswordReuse => "PASSWORD_REUSE",
            AuthError::PasswordMismatch => "PASSWORD_MISMATCH",
            AuthError::UserNotFound => "USER_NOT_FOUND",
            AuthError::EmailDeliveryFailure => "EMAIL_DELIVERY_FAILURE",
        };

        let message = err.to_string();
        let mut response = ErrorResponse::new(error_code, message);

        match err {
            AuthError::InvalidCredentials {
                remaining_attempts: Some(remaining),
            }
            | AuthError::InvalidCurrentPassword {
                remaining_attempts: Some(remaining),
            } => {
                response = response.with_detail("remaining_attempts", serde_json::json!(remaining));
            }
            AuthError::RateLimited {
                retry_after_seconds,
            }
            | AuthError::LockedOut {
                retry_after_seconds,
            } => {
                response = response
                    .with_detail("retry_after_seconds", serde_json::json!(retry_after_seconds));
            }
            AuthError::EmailNotVerified { email } => {
                response = response.with_detail("email", serde_json::json!(email));
            }
            _ => {}
        }

        response
    }
}

/// Convert TokenError to ErrorResponse
impl From<TokenError> for ErrorResponse {
    fn from(err: TokenError) -> Self {
        let error_code = match &err {
            TokenError::Missing => "TOKEN_MISSING",
            TokenError::Malformed => "TOKEN_MALFORMED",
            TokenError::InvalidOrUsed => "TOKEN_INVALID_OR_USED",
            TokenError::Expired { .. } => "TOKEN_EXPIRED",
        };

        let message = err.to_string();
        let mut response = ErrorResponse::new(error_code, message);
        if let TokenError::Expired { email: Some(email) } = err {
            response = response.with_detail("email", serde_json::json!(email));
        }
        response
    }
}

/// Convert ValidationError to ErrorResponse
impl From<ValidationError> for ErrorResponse {
    fn from(err: ValidationError) -> Self {
        let error_code = match &err {
            ValidationError::RequiredField { .. } => "REQUIRED_FIELD",
            ValidationError::InvalidFormat { .. } => "INVALID_FORMAT",
            ValidationError::InvalidLength { .. } => "INVALID_LENGTH",
            ValidationError::InvalidEmail => "INVALID_EMAIL",
            ValidationError::InvalidPhone => "INVALID_PHONE",
        };

        ErrorResponse::new(error_code, err.to_string())
    }
}
