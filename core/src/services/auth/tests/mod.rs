//! Tests for the authentication flows


mod login_tests;
mod password_reset_tests;
