//! In-memory sliding-window rate limiting
//!
//! One limiter instance is shared by every flow; keys follow the
//! `purpose:identity[:ip]` convention so policy lives in configuration
//! rather than in per-flow private maps.

mod limiter;

#[cfg(test)]
mod tests;

pub use limiter::{rate_limit_key, RateLimitDecision, RateLimiter};
