//! Authentication configuration

use serde::{Deserialize, Serialize};

/// Password policy and credential hashing configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PasswordConfig {
    /// Minimum password length in characters
    pub min_length: usize,

    /// Maximum password length in characters
    pub max_length: usize,

    /// bcrypt cost factor used when hashing new passwords
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            min_length: 8,
            max_length: 100,
            bcrypt_cost: default_bcrypt_cost(),
        }
    }
}

/// Single-use security token configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SecurityTokenConfig {
    /// Email verification token lifetime in minutes
    pub verification_ttl_minutes: i64,

    /// Password reset token lifetime in minutes
    pub reset_ttl_minutes: i64,
}

impl Default for SecurityTokenConfig {
    fn default() -> Self {
        Self {
            verification_ttl_minutes: 60,
            reset_ttl_minutes: 60,
        }
    }
}

/// Authentication configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// Password policy
    #[serde(default)]
    pub password: PasswordConfig,

    /// Security token lifetimes
    #[serde(default)]
    pub tokens: SecurityTokenConfig,

    /// Redirect target after a successful login with no callback URL
    #[serde(default = "default_login_redirect")]
    pub default_login_redirect: String,

    /// Whether new registrations are accepted
    #[serde(default = "default_allow_registration")]
    pub allow_registration: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            password: PasswordConfig::default(),
            tokens: SecurityTokenConfig::default(),
            default_login_redirect: default_login_redirect(),
            allow_registration: default_allow_registration(),
        }
    }
}

impl AuthConfig {
    /// Set the bcrypt cost factor
    pub fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.password.bcrypt_cost = cost;
        self
    }

    /// Set both token lifetimes in minutes
    pub fn with_token_ttl_minutes(mut self, minutes: i64) -> Self {
        self.tokens.verification_ttl_minutes = minutes;
        self.tokens.reset_ttl_minutes = minutes;
        self
    }
}

fn default_bcrypt_cost() -> u32 {
    12
}

fn default_login_redirect() -> String {
    String::from("/dashboard")
}

fn default_allow_registration() -> bool {
    true
}
