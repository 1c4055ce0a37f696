//! Shared utilities and common types for the Matchday server
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration types
//! - Response structures
//! - Validation utilities

pub mod config;
pub mod types;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, AuthConfig, DatabaseConfig, EmailConfig, Environment, RateLimitConfig,
};
pub use types::ApiResponse;
pub use utils::validation;
