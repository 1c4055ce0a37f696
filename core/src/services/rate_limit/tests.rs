//! Rate limiter behavior tests
//!
//! Time-sensitive cases drive the `*_at` entry points with fabricated
//! instants instead of sleeping.

use chrono::{Duration, Utc};

use md_shared::config::rate_limit::{LimitPreset, RateLimitPurpose};

use super::limiter::{rate_limit_key, RateLimiter};

fn preset() -> LimitPreset {
    LimitPreset::new(60, 3)
}

fn preset_with_lockout() -> LimitPreset {
    LimitPreset::new(60, 3).with_lockout(300)
}

#[test]
fn key_convention_is_purpose_identity_ip() {
    assert_eq!(
        rate_limit_key(RateLimitPurpose::Login, "a@x.com", None),
        "login:a@x.com"
    );
    assert_eq!(
        rate_limit_key(RateLimitPurpose::ResetPassword, "a@x.com", Some("10.0.0.1")),
        "reset-password:a@x.com:10.0.0.1"
    );
}

#[test]
fn unknown_key_is_allowed_with_full_budget() {
    let limiter = RateLimiter::new();
    let decision = limiter.check("login:a@x.com", &preset());
    assert!(decision.allowed);
    assert_eq!(decision.remaining, 3);
    assert!(decision.retry_after_seconds.is_none());
}

#[test]
fn check_is_a_pure_read() {
    let limiter = RateLimiter::new();
    for _ in 0..10 {
        limiter.check("login:a@x.com", &preset());
    }
    // No entry is created by checks alone
    assert_eq!(limiter.tracked_keys(), 0);
}

#[test]
fn denies_after_max_requests_and_allows_again_after_clear() {
    let limiter = RateLimiter::new();
    let preset = preset();
    let key = "login:a@x.com";

    for _ in 0..3 {
        assert!(limiter.check(key, &preset).allowed);
        limiter.increment(key, &preset);
    }

    let denied = limiter.check(key, &preset);
    assert!(!denied.allowed);
    assert!(denied.retry_after_seconds.unwrap() >= 1);

    limiter.clear(key);
    let fresh = limiter.check(key, &preset);
    assert!(fresh.allowed);
    assert_eq!(fresh.remaining, 3);
}

#[test]
fn remaining_counts_down_per_attempt() {
    let limiter = RateLimiter::new();
    let preset = preset();
    let key = "login:a@x.com";

    limiter.increment(key, &preset);
    assert_eq!(limiter.check(key, &preset).remaining, 2);
    limiter.increment(key, &preset);
    assert_eq!(limiter.check(key, &preset).remaining, 1);
}

#[test]
fn window_resets_lazily_after_expiry() {
    let limiter = RateLimiter::new();
    let preset = preset();
    let key = "login:a@x.com";
    let start = Utc::now();

    for _ in 0..3 {
        limiter.increment_at(key, &preset, start);
    }
    assert!(!limiter.check_at(key, &preset, start).allowed);

    // Past the 60s window the same entry reads as fresh
    let later = start + Duration::seconds(61);
    let decision = limiter.check_at(key, &preset, later);
    assert!(decision.allowed);
    assert_eq!(decision.remaining, 3);

    // And an increment rewrites it with a new window
    limiter.increment_at(key, &preset, later);
    assert_eq!(limiter.check_at(key, &preset, later).remaining, 2);
}

#[test]
fn lockout_engages_at_ceiling_and_outlives_the_window() {
    let limiter = RateLimiter::new();
    let preset = preset_with_lockout();
    let key = "login:a@x.com";
    let start = Utc::now();

    for _ in 0..3 {
        limiter.increment_at(key, &preset, start);
    }

    let denied = limiter.check_at(key, &preset, start);
    assert!(!denied.allowed);
    assert!(denied.locked);
    assert!(denied.retry_after_seconds.unwrap() > 0);
    assert!(denied.retry_after_seconds.unwrap() <= 300);

    // The window has expired but the lockout still holds
    let after_window = start + Duration::seconds(120);
    let still_denied = limiter.check_at(key, &preset, after_window);
    assert!(!still_denied.allowed);
    assert!(still_denied.locked);

    // After the lockout passes the key is usable again
    let after_lockout = start + Duration::seconds(301);
    assert!(limiter.check_at(key, &preset, after_lockout).allowed);
}

#[test]
fn no_lockout_without_configured_duration() {
    let limiter = RateLimiter::new();
    let preset = preset();
    let key = "login:a@x.com";
    let start = Utc::now();

    for _ in 0..5 {
        limiter.increment_at(key, &preset, start);
    }

    let denied = limiter.check_at(key, &preset, start);
    assert!(!denied.allowed);
    assert!(!denied.locked);
    // Denial lifts with the window
    assert!(limiter.check_at(key, &preset, start + Duration::seconds(61)).allowed);
}

#[test]
fn keys_are_independent() {
    let limiter = RateLimiter::new();
    let preset = preset();

    for _ in 0..3 {
        limiter.increment("login:a@x.com", &preset);
    }

    assert!(!limiter.check("login:a@x.com", &preset).allowed);
    assert!(limiter.check("login:b@x.com", &preset).allowed);
}

#[test]
fn sweep_evicts_dead_entries_but_keeps_locked_ones() {
    let limiter = RateLimiter::new();
    let plain = preset();
    let locking = preset_with_lockout();
    let start = Utc::now();

    // A locked key and a plain expired key
    for _ in 0..3 {
        limiter.increment_at("login:locked@x.com", &locking, start);
    }
    limiter.increment_at("register:1.2.3.4", &plain, start);
    assert_eq!(limiter.tracked_keys(), 2);

    // Drive enough increments past the window to trigger a sweep
    let later = start + Duration::seconds(90);
    for i in 0..64 {
        limiter.increment_at(&format!("verify-email:host-{}", i), &plain, later);
    }

    // The expired unlocked entry is gone; the locked entry survives its
    // window because the lockout is still live
    let keys = limiter.tracked_keys();
    assert!(keys >= 64);
    assert!(!limiter
        .check_at("login:locked@x.com", &locking, later)
        .allowed);
    assert!(limiter.check_at("register:1.2.3.4", &plain, later).allowed);
}

#[test]
fn concurrent_increments_on_one_key_are_not_lost() {
    use std::sync::Arc;

    let limiter = Arc::new(RateLimiter::new());
    let preset = LimitPreset::new(60, 1000);
    let mut handles = Vec::new();

    for _ in 0..8 {
        let limiter = Arc::clone(&limiter);
        let preset = preset;
        handles.push(std::thread::spawn(move || {
            for _ in 0..50 {
                limiter.increment("login:a@x.com", &preset);
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    // 400 attempts recorded, none raced away
    assert_eq!(limiter.check("login:a@x.com", &preset).remaining, 1000 - 400);
}
