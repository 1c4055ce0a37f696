//! Password hashing helpers
//!
//! bcrypt work takes hundreds of milliseconds, so both operations run on
//! the blocking thread pool rather than on the async runtime.

use crate::errors::{DomainError, DomainResult};

/// Hash a password with the given bcrypt cost factor
pub async fn hash_password(password: String, cost: u32) -> DomainResult<String> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| DomainError::Internal {
            message: format!("Password hashing task failed: {}", e),
        })?
        .map_err(|e| DomainError::Internal {
            message: format!("Password hashing failed: {}", e),
        })
}

/// Verify a password against a stored bcrypt hash
pub async fn verify_password(password: String, hash: String) -> DomainResult<bool> {
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| DomainError::Internal {
            message: format!("Password verification task failed: {}", e),
        })?
        .map_err(|e| DomainError::Internal {
            message: format!("Password verification failed: {}", e),
        })
}
