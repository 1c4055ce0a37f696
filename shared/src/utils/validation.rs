//! Common validation utilities

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap());

static PHONE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+?[0-9]{10,15}$").unwrap());

/// Validation error with field-level details
#[derive(Debug, Clone, Serialize)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub code: String,
}

impl ValidationError {
    pub fn new(
        field: impl Into<String>,
        message: impl Into<String>,
        code: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            code: code.into(),
        }
    }
}

/// Collection of validation errors
#[derive(Debug, Default)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_error(
        &mut self,
        field: impl Into<String>,
        message: impl Into<String>,
        code: impl Into<String>,
    ) {
        self.add(ValidationError::new(field, message, code));
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn to_field_errors(&self) -> HashMap<String, Vec<String>> {
        let mut field_errors: HashMap<String, Vec<String>> = HashMap::new();
        for error in &self.errors {
            field_errors
                .entry(error.field.clone())
                .or_default()
                .push(error.message.clone());
        }
        field_errors
    }
}

/// Trait for types that can be validated
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationErrors>;
}

/// Normalize an email address for storage and lookup: trimmed, lowercased.
/// Uniqueness and identity comparisons operate on the normalized form only.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Common validation functions
pub mod validators {
    use super::{EMAIL_PATTERN, PHONE_PATTERN};

    /// Check if a string is not empty
    pub fn not_empty(value: &str) -> bool {
        !value.trim().is_empty()
    }

    /// Check if a string length is within bounds (inclusive)
    pub fn length_between(value: &str, min: usize, max: usize) -> bool {
        let len = value.chars().count();
        len >= min && len <= max
    }

    /// Check if an email address is structurally valid
    pub fn is_valid_email(email: &str) -> bool {
        EMAIL_PATTERN.is_match(email)
    }

    /// Check if a phone number is structurally valid (10-15 digits,
    /// optional leading '+')
    pub fn is_valid_phone(phone: &str) -> bool {
        PHONE_PATTERN.is_match(phone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_email_trims_and_lowercases() {
        assert_eq!(normalize_email("  Alice@Example.COM "), "alice@example.com");
        assert_eq!(normalize_email("bob@x.io"), "bob@x.io");
    }

    #[test]
    fn email_validation() {
        assert!(validators::is_valid_email("a@x.com"));
        assert!(validators::is_valid_email("first.last+tag@sub.domain.org"));
        assert!(!validators::is_valid_email("not-an-email"));
        assert!(!validators::is_valid_email("missing@tld"));
    }

    #[test]
    fn phone_validation() {
        assert!(validators::is_valid_phone("9998887776"));
        assert!(validators::is_valid_phone("+619998887776"));
        assert!(!validators::is_valid_phone("12345"));
        assert!(!validators::is_valid_phone("abc1234567"));
    }

    #[test]
    fn length_bounds_are_inclusive() {
        assert!(validators::length_between("12345678", 8, 100));
        assert!(!validators::length_between("1234567", 8, 100));
        assert!(validators::length_between(&"x".repeat(100), 8, 100));
        assert!(!validators::length_between(&"x".repeat(101), 8, 100));
    }

    #[test]
    fn collects_field_errors() {
        let mut errors = ValidationErrors::new();
        errors.add_error("email", "Invalid email format", "INVALID_EMAIL");
        errors.add_error("password", "Too short", "INVALID_LENGTH");
        errors.add_error("password", "Must differ from current", "PASSWORD_REUSE");

        let by_field = errors.to_field_errors();
        assert_eq!(by_field["password"].len(), 2);
        assert_eq!(by_field["email"].len(), 1);
    }
}
