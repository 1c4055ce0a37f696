//! User entity representing a registered account in the Matchday system.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::address::Address;

/// Role assigned to a user account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    /// Full platform control, including role management
    SuperAdmin,
    /// Operational administration of users
    Admin,
    /// Read-only oversight of users and tournaments
    Moderator,
    /// Match scoring staff
    Scorer,
    /// Regular registered participant
    User,
}

impl UserRole {
    /// Stable string form used for persistence
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::SuperAdmin => "SUPER_ADMIN",
            UserRole::Admin => "ADMIN",
            UserRole::Moderator => "MODERATOR",
            UserRole::Scorer => "SCORER",
            UserRole::User => "USER",
        }
    }

    /// Parse the persisted string form
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "SUPER_ADMIN" => Some(UserRole::SuperAdmin),
            "ADMIN" => Some(UserRole::Admin),
            "MODERATOR" => Some(UserRole::Moderator),
            "SCORER" => Some(UserRole::Scorer),
            "USER" => Some(UserRole::User),
            _ => None,
        }
    }
}

/// User entity representing a registered account
///
/// Email is stored normalized (trimmed, lowercased); token fields hold only
/// SHA-256 hashes of the single-use secrets, never the plaintext.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier for the user
    pub id: Uuid,

    /// Normalized email address (unique)
    pub email: String,

    /// Phone number (unique)
    pub phone_number: String,

    /// bcrypt hash of the password
    pub password_hash: String,

    /// Role governing what this account may do
    pub role: UserRole,

    /// First name
    pub first_name: String,

    /// Last name
    pub last_name: String,

    /// Optional secondary contact number
    pub alternate_number: Option<String>,

    /// Optional postal address
    pub address: Option<Address>,

    /// When the email was verified; None until verified
    pub email_verified_at: Option<DateTime<Utc>>,

    /// SHA-256 hash of the live email verification token
    pub verification_token_hash: Option<String>,

    /// Expiry of the live email verification token
    pub verification_token_expires_at: Option<DateTime<Utc>>,

    /// SHA-256 hash of the live password reset token
    pub password_reset_token_hash: Option<String>,

    /// Expiry of the live password reset token
    pub password_reset_token_expires_at: Option<DateTime<Utc>>,

    /// Whether the account may authenticate
    pub is_active: bool,

    /// Whether the account has been suspended by an administrator
    pub is_blocked: bool,

    /// Timestamp when the user was created
    pub created_at: DateTime<Utc>,

    /// Timestamp when the user was last updated
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Creates a new unverified, inactive user with the `User` role.
    /// Activation happens through email verification.
    pub fn new(
        email: String,
        phone_number: String,
        password_hash: String,
        first_name: String,
        last_name: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email,
            phone_number,
            password_hash,
            role: UserRole::User,
            first_name,
            last_name,
            alternate_number: None,
            address: None,
            email_verified_at: None,
            verification_token_hash: None,
            verification_token_expires_at: None,
            password_reset_token_hash: None,
            password_reset_token_expires_at: None,
            is_active: false,
            is_blocked: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Full display name
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Checks whether the email has been verified
    pub fn is_email_verified(&self) -> bool {
        self.email_verified_at.is_some()
    }

    /// Stores a new verification token hash, replacing any prior one.
    /// Issuing a new token invalidates the old one by overwrite.
    pub fn set_verification_token(&mut self, token_hash: String, expires_at: DateTime<Utc>) {
        self.verification_token_hash = Some(token_hash);
        self.verification_token_expires_at = Some(expires_at);
        self.updated_at = Utc::now();
    }

    /// Clears the verification token fields
    pub fn clear_verification_token(&mut self) {
        self.verification_token_hash = None;
        self.verification_token_expires_at = None;
        self.updated_at = Utc::now();
    }

    /// Marks the email as verified, activates the account, and clears the
    /// spent token
    pub fn mark_email_verified(&mut self) {
        self.email_verified_at = Some(Utc::now());
        self.is_active = true;
        self.verification_token_hash = None;
        self.verification_token_expires_at = None;
        self.updated_at = Utc::now();
    }

    /// Stores a new password reset token hash, replacing any prior one
    pub fn set_reset_token(&mut self, token_hash: String, expires_at: DateTime<Utc>) {
        self.password_reset_token_hash = Some(token_hash);
        self.password_reset_token_expires_at = Some(expires_at);
        self.updated_at = Utc::now();
    }

    /// Clears the password reset token fields
    pub fn clear_reset_token(&mut self) {
        self.password_reset_token_hash = None;
        self.password_reset_token_expires_at = None;
        self.updated_at = Utc::now();
    }

    /// Replaces the stored password hash
    pub fn set_password_hash(&mut self, password_hash: String) {
        self.password_hash = password_hash;
        self.updated_at = Utc::now();
    }

    /// Blocks the user account
    pub fn block(&mut self) {
        self.is_blocked = true;
        self.updated_at = Utc::now();
    }

    /// Unblocks the user account
    pub fn unblock(&mut self) {
        self.is_blocked = false;
        self.updated_at = Utc::now();
    }

    /// Whether the account is in a state that permits credential operations
    /// (login, password change, password reset)
    pub fn can_authenticate(&self) -> bool {
        !self.is_blocked && self.is_active
    }
}
