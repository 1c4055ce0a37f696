//! Authentication service module
//!
//! This module provides the complete authentication flow surface:
//! - Login with throttling and lockout
//! - Registration with email verification
//! - Email verification and resend
//! - Password reset (request and completion)
//! - Authenticated password change

mod config;
mod email_utils;
mod mailer;
mod password;
mod requests;
mod service;

#[cfg(test)]
mod tests;

pub use config::AuthServiceConfig;
pub use mailer::MailerTrait;
pub use requests::{
    ChangePasswordRequest, ForgotPasswordRequest, Identity, LoginRequest, RegisterRequest,
    ResendVerificationRequest, ResetPasswordRequest, VerifyEmailRequest,
};
pub use service::AuthService;

// Export selected helpers for public use
pub use email_utils::mask_email;
pub use password::{hash_password, verify_password};
