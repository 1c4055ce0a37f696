//! User repository trait defining the interface for credential persistence.
//!
//! This is the contract the authentication flows program against. The
//! concrete database implementation lives in the infrastructure layer; an
//! in-memory mock ships next to this trait for tests.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::user::User;
use crate::errors::DomainError;

/// Repository trait for User entity persistence operations
///
/// Token lookups take the SHA-256 *hash* of the presented secret, never the
/// plaintext. Email lookups take the normalized (trimmed, lowercased) form.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by normalized email
    ///
    /// # Returns
    /// * `Ok(Some(User))` - User found
    /// * `Ok(None)` - No user with that email
    /// * `Err(DomainError)` - Database or other error occurred
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;

    /// Find a user by their unique identifier
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError>;

    /// Find a user by phone number
    async fn find_by_phone(&self, phone_number: &str) -> Result<Option<User>, DomainError>;

    /// Find the user holding the given email verification token hash
    async fn find_by_verification_token_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<User>, DomainError>;

    /// Find the user holding the given password reset token hash
    async fn find_by_reset_token_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<User>, DomainError>;

    /// Create a new user
    ///
    /// # Returns
    /// * `Ok(User)` - The created user
    /// * `Err(DomainError)` - Creation failed (e.g. duplicate email or phone)
    async fn create(&self, user: User) -> Result<User, DomainError>;

    /// Update an existing user
    async fn update(&self, user: User) -> Result<User, DomainError>;

    /// Atomically store a new password hash and clear both reset-token
    /// fields for the user.
    ///
    /// The two writes must be one unit of work: a crash must not leave a
    /// cleared token with an unchanged password or vice versa.
    async fn update_password_and_clear_reset_token(
        &self,
        id: Uuid,
        password_hash: &str,
    ) -> Result<(), DomainError>;

    /// Check whether a user exists with the given normalized email
    async fn exists_by_email(&self, email: &str) -> Result<bool, DomainError>;

    /// Check whether a user exists with the given phone number
    async fn exists_by_phone(&self, phone_number: &str) -> Result<bool, DomainError>;
}
