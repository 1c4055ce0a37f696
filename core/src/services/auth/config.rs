//! Configuration for the authentication service

use md_shared::config::auth::AuthConfig;
use md_shared::config::rate_limit::RateLimitConfig;

/// Configuration for the authentication service
#[derive(Debug, Clone, Default)]
pub struct AuthServiceConfig {
    /// Rate limit presets consulted by every flow
    pub rate_limit: RateLimitConfig,

    /// Password policy, token lifetimes, redirect defaults
    pub auth: AuthConfig,
}

impl AuthServiceConfig {
    /// Minimum accepted password length
    pub fn password_min_length(&self) -> usize {
        self.auth.password.min_length
    }

    /// Maximum accepted password length
    pub fn password_max_length(&self) -> usize {
        self.auth.password.max_length
    }

    /// bcrypt cost factor for new password hashes
    pub fn bcrypt_cost(&self) -> u32 {
        self.auth.password.bcrypt_cost
    }
}
