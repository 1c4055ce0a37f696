//! Request payloads accepted by the authentication flows

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::user::UserRole;
use crate::domain::value_objects::address::Address;

/// Login attempt
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    /// Optional post-login redirect target; only same-site relative paths
    /// are honored
    pub callback_url: Option<String>,
}

/// New account registration
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub phone_number: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub alternate_number: Option<String>,
    pub address: Option<Address>,
    /// Client IP used for registration throttling
    pub client_ip: Option<String>,
}

/// Email verification link hit (token arrives as a URL query parameter, so
/// it may be absent entirely)
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyEmailRequest {
    pub token: Option<String>,
    pub client_ip: String,
}

/// Forgot-password request
#[derive(Debug, Clone, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

/// Password reset completion
#[derive(Debug, Clone, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub new_password: String,
    pub client_ip: String,
}

/// Authenticated password change. The account acted on comes from the
/// session [`Identity`], never from the payload.
#[derive(Debug, Clone, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

/// Verification email resend request
#[derive(Debug, Clone, Deserialize)]
pub struct ResendVerificationRequest {
    pub email: String,
}

/// Caller identity established by the session layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: Uuid,
    pub email: String,
    pub role: UserRole,
}

impl From<&Identity> for crate::services::ability::AbilityContext {
    fn from(identity: &Identity) -> Self {
        Self {
            user_id: identity.user_id,
            role: identity.role,
        }
    }
}
