//! Success payloads returned by the authentication flows.
//!
//! Failures travel as [`crate::errors::DomainError`]; these types carry what
//! the presentation layer needs on the happy path.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Returned by a successful login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginSuccess {
    /// Authenticated user id
    pub user_id: Uuid,

    /// Where the client should navigate next: the validated callback URL if
    /// one was supplied, otherwise the configured default
    pub redirect_to: String,
}

/// Returned by a successful registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterSuccess {
    /// Newly created user id
    pub user_id: Uuid,

    /// Human-readable next step ("check your inbox")
    pub message: String,
}

/// Terminal state of the email verification flow
///
/// Both variants are successes for redirect purposes; the distinction only
/// drives messaging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmailVerificationOutcome {
    /// The token was consumed and the account activated
    Verified { email: String },

    /// The account was already verified; the request is idempotent
    AlreadyVerified { email: String },
}

impl EmailVerificationOutcome {
    /// Email of the affected account
    pub fn email(&self) -> &str {
        match self {
            EmailVerificationOutcome::Verified { email }
            | EmailVerificationOutcome::AlreadyVerified { email } => email,
        }
    }
}

/// Returned by the forgot-password flow.
///
/// The message is identical whether or not the account exists; the flow's
/// anti-enumeration contract lives here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordResetRequested {
    pub message: String,
}

impl PasswordResetRequested {
    /// The one caller-visible response for every forgot-password request
    pub fn uniform() -> Self {
        Self {
            message: String::from(
                "If an account exists for that email, you will receive a password reset link.",
            ),
        }
    }
}

/// Returned by the resend-verification flow; uniform for the same reason as
/// [`PasswordResetRequested`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResendRequested {
    pub message: String,
}

impl VerificationResendRequested {
    /// The one caller-visible response for every resend request
    pub fn uniform() -> Self {
        Self {
            message: String::from(
                "If an account exists for that email and still needs verification, \
                 a new link is on its way.",
            ),
        }
    }
}

/// Returned by a successful password reset completion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordResetCompleted {
    pub user_id: Uuid,
    pub message: String,
}

/// Returned by a successful authenticated password change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordChanged {
    pub user_id: Uuid,

    /// The session-owning layer must invalidate the current session and
    /// force a fresh login when this is set
    pub reauthentication_required: bool,

    pub message: String,
}
