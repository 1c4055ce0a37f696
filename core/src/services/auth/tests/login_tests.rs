//! Login flow tests

use md_shared::config::rate_limit::{LimitPreset, RateLimitConfig, RateLimitPurpose};

use crate::errors::{AuthError, DomainError};
use crate::repositories::UserRepository;
use crate::services::auth::tests::mocks::{login_request, test_config, TestHarness};
use crate::services::auth::LoginRequest;

#[tokio::test]
async fn successful_login_returns_default_redirect() {
    let harness = TestHarness::new();
    let user_id = harness.register_verified_sample().await;

    let success = harness
        .service
        .login(login_request("a@x.com", "Passw0rd!"))
        .await
        .unwrap();

    assert_eq!(success.user_id, user_id);
    assert_eq!(success.redirect_to, "/dashboard");
}

#[tokio::test]
async fn email_lookup_is_normalized() {
    let harness = TestHarness::new();
    harness.register_verified_sample().await;

    let success = harness
        .service
        .login(login_request("  A@X.COM  ", "Passw0rd!"))
        .await;
    assert!(success.is_ok());
}

#[tokio::test]
async fn safe_callback_is_honored_and_absolute_urls_are_not() {
    let harness = TestHarness::new();
    harness.register_verified_sample().await;

    let success = harness
        .service
        .login(LoginRequest {
            email: "a@x.com".to_string(),
            password: "Passw0rd!".to_string(),
            callback_url: Some("/tournaments/42".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(success.redirect_to, "/tournaments/42");

    let fallback = harness
        .service
        .login(LoginRequest {
            email: "a@x.com".to_string(),
            password: "Passw0rd!".to_string(),
            callback_url: Some("https://evil.example/phish".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(fallback.redirect_to, "/dashboard");
}

#[tokio::test]
async fn unknown_email_and_wrong_password_are_indistinguishable() {
    let harness = TestHarness::new();
    harness.register_verified_sample().await;

    let wrong_password = harness
        .service
        .login(login_request("a@x.com", "not-the-password"))
        .await
        .unwrap_err();
    let unknown_email = harness
        .service
        .login(login_request("ghost@x.com", "whatever123"))
        .await
        .unwrap_err();

    // Byte-identical messages and identical structured shape
    assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    match (&wrong_password, &unknown_email) {
        (
            DomainError::Auth(AuthError::InvalidCredentials {
                remaining_attempts: a,
            }),
            DomainError::Auth(AuthError::InvalidCredentials {
                remaining_attempts: b,
            }),
        ) => assert_eq!(a, b),
        other => panic!("expected two InvalidCredentials failures, got {:?}", other),
    }
}

#[tokio::test]
async fn failure_surfaces_remaining_attempts() {
    let harness = TestHarness::new();
    harness.register_verified_sample().await;

    // Default login preset allows 10 attempts
    let first = harness
        .service
        .login(login_request("a@x.com", "wrong"))
        .await
        .unwrap_err();
    let second = harness
        .service
        .login(login_request("a@x.com", "wrong"))
        .await
        .unwrap_err();

    let remaining = |err: &DomainError| match err {
        DomainError::Auth(AuthError::InvalidCredentials { remaining_attempts }) => {
            remaining_attempts.unwrap()
        }
        other => panic!("expected InvalidCredentials, got {:?}", other),
    };
    assert_eq!(remaining(&first), 9);
    assert_eq!(remaining(&second), 8);
}

#[tokio::test]
async fn suspended_account_gets_a_distinct_failure() {
    let harness = TestHarness::new();
    let user_id = harness.register_verified_sample().await;

    let mut user = harness.repo.find_by_id(user_id).await.unwrap().unwrap();
    user.block();
    harness.repo.update(user).await.unwrap();

    let err = harness
        .service
        .login(login_request("a@x.com", "Passw0rd!"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::Auth(AuthError::AccountSuspended)
    ));
}

#[tokio::test]
async fn unverified_account_is_asked_to_verify_without_password_check() {
    let harness = TestHarness::new();
    harness.register_sample().await;

    // Even the correct password is refused before verification
    let err = harness
        .service
        .login(login_request("a@x.com", "Passw0rd!"))
        .await
        .unwrap_err();
    match err {
        DomainError::Auth(AuthError::EmailNotVerified { email }) => {
            assert_eq!(email, "a@x.com");
        }
        other => panic!("expected EmailNotVerified, got {:?}", other),
    }
}

#[tokio::test]
async fn deactivated_verified_account_gets_inactive_failure() {
    let harness = TestHarness::new();
    let user_id = harness.register_verified_sample().await;

    let mut user = harness.repo.find_by_id(user_id).await.unwrap().unwrap();
    user.is_active = false;
    harness.repo.update(user).await.unwrap();

    let err = harness
        .service
        .login(login_request("a@x.com", "Passw0rd!"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Auth(AuthError::AccountInactive)));
}

#[tokio::test]
async fn lockout_engages_after_the_attempt_ceiling() {
    // Tight preset so the test stays quick: 3 attempts, 5 minute lockout
    let mut config = test_config();
    config.rate_limit.auth.login = LimitPreset::new(900, 3).with_lockout(300);

    let harness = TestHarness::with_config(config);
    harness.register_verified_sample().await;

    for _ in 0..2 {
        let err = harness
            .service
            .login(login_request("a@x.com", "wrong"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::Auth(AuthError::InvalidCredentials { .. })
        ));
    }

    // Third failure crosses the ceiling and reports the lockout duration
    let third = harness
        .service
        .login(login_request("a@x.com", "wrong"))
        .await
        .unwrap_err();
    match third {
        DomainError::Auth(AuthError::LockedOut {
            retry_after_seconds,
        }) => assert!(retry_after_seconds > 0 && retry_after_seconds <= 300),
        other => panic!("expected LockedOut, got {:?}", other),
    }

    // Even the correct password is refused while locked
    let while_locked = harness
        .service
        .login(login_request("a@x.com", "Passw0rd!"))
        .await
        .unwrap_err();
    assert!(matches!(
        while_locked,
        DomainError::Auth(AuthError::LockedOut { .. })
    ));
}

#[tokio::test]
async fn success_clears_earlier_failures() {
    let harness = TestHarness::new();
    harness.register_verified_sample().await;

    for _ in 0..3 {
        let _ = harness
            .service
            .login(login_request("a@x.com", "wrong"))
            .await;
    }

    harness
        .service
        .login(login_request("a@x.com", "Passw0rd!"))
        .await
        .unwrap();

    // The limiter entry for this identity is gone entirely
    let preset = RateLimitConfig::default().policy_for(RateLimitPurpose::Login);
    let decision = harness.limiter.check("login:a@x.com", &preset);
    assert!(decision.allowed);
    assert_eq!(decision.remaining, 10);

    // The next failure starts from a clean window
    let err = harness
        .service
        .login(login_request("a@x.com", "wrong"))
        .await
        .unwrap_err();
    match err {
        DomainError::Auth(AuthError::InvalidCredentials { remaining_attempts }) => {
            assert_eq!(remaining_attempts, Some(9));
        }
        other => panic!("expected InvalidCredentials, got {:?}", other),
    }
}
