//! Domain-specific error types and error handling.

mod types;

// Re-export all error types and utilities
pub use types::{AuthError, ErrorResponse, TokenError, ValidationError};

use thiserror::Error;

/// Core domain errors (general purpose)
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("Unauthorized access")]
    Unauthorized,

    #[error("Internal error: {message}")]
    Internal { message: String },

    // Bridge to specific error types
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    ValidationErr(#[from] ValidationError),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    /// Machine-readable reason code for redirect-style flows (email
    /// verification arrives from a browser following a link, so failures are
    /// communicated as a redirect carrying this code rather than as JSON).
    pub fn redirect_reason(&self) -> &'static str {
        match self {
            DomainError::Auth(AuthError::RateLimited { .. })
            | DomainError::Auth(AuthError::LockedOut { .. }) => "rate-limit",
            DomainError::Auth(AuthError::AccountSuspended) => "blocked",
            DomainError::Auth(AuthError::UserNotFound) => "user-not-found",
            DomainError::Token(TokenError::Missing) => "missing-token",
            DomainError::Token(TokenError::Malformed) => "invalid-token",
            DomainError::Token(TokenError::InvalidOrUsed) => "invalid-or-used",
            DomainError::Token(TokenError::Expired { .. }) => "expired",
            DomainError::NotFound { .. } => "user-not-found",
            _ => "server-error",
        }
    }
}
