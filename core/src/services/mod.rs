//! Business services containing domain logic and use cases.

pub mod ability;
pub mod auth;
pub mod rate_limit;
pub mod token;

// Re-export commonly used types
pub use ability::{Ability, AbilityContext, Action, Subject, SubjectKind, UserField};
pub use auth::{AuthService, AuthServiceConfig, MailerTrait};
pub use rate_limit::{RateLimitDecision, RateLimiter};
pub use token::{IssuedToken, SecurityTokenService, TokenPurpose, TokenServiceConfig};
