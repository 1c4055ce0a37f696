//! Rate limiting configuration module
//!
//! One preset per throttled purpose. Every flow handler resolves its policy
//! through [`RateLimitConfig::policy_for`] so the window/lockout numbers live
//! here rather than being scattered across call sites.

use serde::{Deserialize, Serialize};

/// The purposes the rate limiter distinguishes. Doubles as the first segment
/// of the limiter keyspace (`purpose:identity[:ip]`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RateLimitPurpose {
    /// Login attempts, keyed by normalized email
    Login,
    /// Registration requests, keyed by client IP
    Register,
    /// Forgot-password requests, keyed by normalized email
    ForgotPassword,
    /// Password reset completion attempts, keyed by client IP
    ResetPassword,
    /// Authenticated password change attempts, keyed by user id
    ChangePassword,
    /// Email verification link hits, keyed by client IP
    VerifyEmail,
    /// Verification email resend requests, keyed by normalized email
    ResendVerification,
    /// Read-heavy admin listing endpoints, keyed by user id
    AdminListing,
}

impl RateLimitPurpose {
    /// Stable string used as the key prefix
    pub fn as_str(&self) -> &'static str {
        match self {
            RateLimitPurpose::Login => "login",
            RateLimitPurpose::Register => "register",
            RateLimitPurpose::ForgotPassword => "forgot-password",
            RateLimitPurpose::ResetPassword => "reset-password",
            RateLimitPurpose::ChangePassword => "change-password",
            RateLimitPurpose::VerifyEmail => "verify-email",
            RateLimitPurpose::ResendVerification => "resend-verification",
            RateLimitPurpose::AdminListing => "admin-listing",
        }
    }
}

/// A single preset: window, attempt ceiling, optional lockout escalation
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct LimitPreset {
    /// Window length in seconds
    pub window_seconds: u64,

    /// Maximum attempts inside one window
    pub max_requests: u32,

    /// Lockout duration in seconds once the ceiling is hit; None disables
    /// lockout escalation for this purpose
    pub lockout_seconds: Option<u64>,
}

impl LimitPreset {
    /// Create a preset without lockout escalation
    pub fn new(window_seconds: u64, max_requests: u32) -> Self {
        Self {
            window_seconds,
            max_requests,
            lockout_seconds: None,
        }
    }

    /// Add a lockout duration to the preset
    pub fn with_lockout(mut self, lockout_seconds: u64) -> Self {
        self.lockout_seconds = Some(lockout_seconds);
        self
    }
}

/// Authentication attempt limits (tighter: these guard credentials)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthRateLimits {
    /// Login attempts per email
    pub login: LimitPreset,

    /// Registration requests per IP
    pub register: LimitPreset,

    /// Forgot-password requests per email
    pub forgot_password: LimitPreset,

    /// Reset completion attempts per IP
    pub reset_password: LimitPreset,

    /// Password change attempts per user
    pub change_password: LimitPreset,

    /// Verification link hits per IP
    pub verify_email: LimitPreset,

    /// Verification resend requests per email
    pub resend_verification: LimitPreset,
}

impl Default for AuthRateLimits {
    fn default() -> Self {
        Self {
            login: LimitPreset::new(900, 10).with_lockout(900),
            register: LimitPreset::new(3600, 5),
            forgot_password: LimitPreset::new(3600, 3),
            reset_password: LimitPreset::new(3600, 10).with_lockout(1800),
            change_password: LimitPreset::new(900, 5).with_lockout(900),
            verify_email: LimitPreset::new(3600, 10),
            resend_verification: LimitPreset::new(3600, 3),
        }
    }
}

/// Limits for read-heavy endpoints (looser: these guard capacity, not
/// credentials)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiRateLimits {
    /// Admin listing requests per user
    pub admin_listing: LimitPreset,
}

impl Default for ApiRateLimits {
    fn default() -> Self {
        Self {
            admin_listing: LimitPreset::new(60, 120),
        }
    }
}

/// Rate limiting configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    /// Enable rate limiting
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Authentication attempt limits
    #[serde(default)]
    pub auth: AuthRateLimits,

    /// API read limits
    #[serde(default)]
    pub api: ApiRateLimits,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            auth: AuthRateLimits::default(),
            api: ApiRateLimits::default(),
        }
    }
}

impl RateLimitConfig {
    /// Resolve the preset for a purpose
    pub fn policy_for(&self, purpose: RateLimitPurpose) -> LimitPreset {
        match purpose {
            RateLimitPurpose::Login => self.auth.login,
            RateLimitPurpose::Register => self.auth.register,
            RateLimitPurpose::ForgotPassword => self.auth.forgot_password,
            RateLimitPurpose::ResetPassword => self.auth.reset_password,
            RateLimitPurpose::ChangePassword => self.auth.change_password,
            RateLimitPurpose::VerifyEmail => self.auth.verify_email,
            RateLimitPurpose::ResendVerification => self.auth.resend_verification,
            RateLimitPurpose::AdminListing => self.api.admin_listing,
        }
    }

    /// Create a development configuration (more lenient limits)
    pub fn development() -> Self {
        Self {
            enabled: true,
            auth: AuthRateLimits {
                login: LimitPreset::new(900, 100).with_lockout(60),
                register: LimitPreset::new(3600, 100),
                forgot_password: LimitPreset::new(3600, 50),
                reset_password: LimitPreset::new(3600, 100),
                change_password: LimitPreset::new(900, 50),
                verify_email: LimitPreset::new(3600, 100),
                resend_verification: LimitPreset::new(3600, 50),
            },
            api: ApiRateLimits {
                admin_listing: LimitPreset::new(60, 1000),
            },
        }
    }

    /// Create a production configuration (stricter limits)
    pub fn production() -> Self {
        Self::default()
    }
}

fn default_enabled() -> bool {
    true
}
