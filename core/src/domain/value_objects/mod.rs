//! Value objects used by flow results and entities

pub mod address;
pub mod auth_outcome;

pub use address::Address;
pub use auth_outcome::{
    EmailVerificationOutcome, LoginSuccess, PasswordChanged, PasswordResetCompleted,
    PasswordResetRequested, RegisterSuccess, VerificationResendRequested,
};
