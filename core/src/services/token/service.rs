//! Security token generation and validation

use chrono::{DateTime, Duration, Utc};
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};

/// Number of random bytes in a token (256 bits of entropy)
const TOKEN_BYTES: usize = 32;

/// Length of the hex-rendered plaintext token
pub const TOKEN_LENGTH: usize = TOKEN_BYTES * 2;

use super::config::TokenServiceConfig;

/// What a single-use token is for. Determines the TTL; generation and
/// hashing are identical across purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenPurpose {
    /// Email verification link
    EmailVerification,
    /// Password reset link
    PasswordReset,
}

/// A freshly issued token
///
/// The plaintext is delivered out of band (email) and never persisted; only
/// the hash and expiry are stored on the user record.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// The secret to put in the link. Fixed-length lowercase hex.
    pub plaintext: String,

    /// SHA-256 hex digest of the plaintext, for storage and lookup
    pub hash: String,

    /// When the token stops being accepted
    pub expires_at: DateTime<Utc>,
}

/// Service issuing and validating single-use security tokens
#[derive(Debug, Clone, Default)]
pub struct SecurityTokenService {
    config: TokenServiceConfig,
}

impl SecurityTokenService {
    /// Create a new token service
    pub fn new(config: TokenServiceConfig) -> Self {
        Self { config }
    }

    /// Issue a new token for the given purpose
    ///
    /// Generates 32 bytes from the OS CSPRNG, renders them as 64 hex
    /// characters, and computes the storage hash and expiry.
    pub fn issue(&self, purpose: TokenPurpose) -> IssuedToken {
        let mut bytes = [0u8; TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);
        let plaintext = hex::encode(bytes);
        let hash = Self::hash(&plaintext);
        let expires_at = Utc::now() + Duration::minutes(self.ttl_minutes(purpose));

        IssuedToken {
            plaintext,
            hash,
            expires_at,
        }
    }

    /// Check that a presented token has the exact expected shape before any
    /// store lookup is attempted. Malformed input is rejected without
    /// touching the store.
    pub fn validate_format(token: &str) -> bool {
        token.len() == TOKEN_LENGTH && token.bytes().all(|b| b.is_ascii_hexdigit())
    }

    /// Hash a plaintext token for storage or lookup. Pure and deterministic;
    /// used identically at issuance and at verification time.
    pub fn hash(token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Constant-time check of a presented plaintext against a stored hash.
    /// Callers that hold both values compare through this instead of string
    /// equality.
    pub fn matches_hash(token: &str, stored_hash: &str) -> bool {
        constant_time_eq::constant_time_eq(Self::hash(token).as_bytes(), stored_hash.as_bytes())
    }

    /// Whether a stored expiry has passed at `now`
    pub fn is_expired(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now > expires_at
    }

    fn ttl_minutes(&self, purpose: TokenPurpose) -> i64 {
        match purpose {
            TokenPurpose::EmailVerification => self.config.verification_ttl_minutes,
            TokenPurpose::PasswordReset => self.config.reset_ttl_minutes,
        }
    }
}
