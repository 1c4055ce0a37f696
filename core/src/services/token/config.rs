//! Configuration for the security token service

use md_shared::config::auth::SecurityTokenConfig;

/// Configuration for the security token service
#[derive(Debug, Clone)]
pub struct TokenServiceConfig {
    /// Email verification token lifetime in minutes
    pub verification_ttl_minutes: i64,

    /// Password reset token lifetime in minutes
    pub reset_ttl_minutes: i64,
}

impl Default for TokenServiceConfig {
    fn default() -> Self {
        Self {
            verification_ttl_minutes: 60,
            reset_ttl_minutes: 60,
        }
    }
}

impl From<&SecurityTokenConfig> for TokenServiceConfig {
    fn from(config: &SecurityTokenConfig) -> Self {
        Self {
            verification_ttl_minutes: config.verification_ttl_minutes,
            reset_ttl_minutes: config.reset_ttl_minutes,
        }
    }
}
