//! End-to-end authentication scenario over the in-memory collaborators:
//! register, refuse unverified login, verify, log in, then lock the account
//! out after repeated failures.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use md_core::domain::value_objects::auth_outcome::EmailVerificationOutcome;
use md_core::errors::{AuthError, DomainError};
use md_core::repositories::{MockUserRepository, UserRepository};
use md_core::services::auth::{
    AuthService, AuthServiceConfig, LoginRequest, MailerTrait, RegisterRequest,
    VerifyEmailRequest,
};
use md_core::services::rate_limit::RateLimiter;
use md_core::services::token::SecurityTokenService;
use md_shared::config::auth::AuthConfig;
use md_shared::config::rate_limit::RateLimitConfig;

/// Captures the last token of each kind handed to the notification sink
#[derive(Default)]
struct CapturingMailer {
    verification_tokens: Mutex<Vec<String>>,
    reset_tokens: Mutex<Vec<String>>,
    deliveries: AtomicUsize,
}

#[async_trait]
impl MailerTrait for CapturingMailer {
    async fn send_verification_email(
        &self,
        _email: &str,
        _name: &str,
        token: &str,
    ) -> Result<String, String> {
        self.verification_tokens
            .lock()
            .unwrap()
            .push(token.to_string());
        let n = self.deliveries.fetch_add(1, Ordering::SeqCst);
        Ok(format!("message-{}", n))
    }

    async fn send_password_reset_email(
        &self,
        _email: &str,
        _name: &str,
        token: &str,
    ) -> Result<String, String> {
        self.reset_tokens.lock().unwrap().push(token.to_string());
        let n = self.deliveries.fetch_add(1, Ordering::SeqCst);
        Ok(format!("message-{}", n))
    }
}

fn build_service() -> (
    Arc<MockUserRepository>,
    Arc<CapturingMailer>,
    AuthService<MockUserRepository, CapturingMailer>,
) {
    let repo = Arc::new(MockUserRepository::new());
    let mailer = Arc::new(CapturingMailer::default());
    let limiter = Arc::new(RateLimiter::new());
    let config = AuthServiceConfig {
        rate_limit: RateLimitConfig::default(),
        auth: AuthConfig::default().with_bcrypt_cost(4),
    };
    let service = AuthService::new(
        Arc::clone(&repo),
        Arc::clone(&mailer),
        limiter,
        SecurityTokenService::default(),
        config,
    );
    (repo, mailer, service)
}

fn login(email: &str, password: &str) -> LoginRequest {
    LoginRequest {
        email: email.to_string(),
        password: password.to_string(),
        callback_url: None,
    }
}

#[tokio::test]
async fn full_registration_verification_login_and_lockout_scenario() {
    let (repo, mailer, service) = build_service();

    // Register
    let registered = service
        .register(RegisterRequest {
            email: "a@x.com".to_string(),
            phone_number: "9998887776".to_string(),
            password: "Passw0rd!".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            alternate_number: None,
            address: None,
            client_ip: Some("10.0.0.1".to_string()),
        })
        .await
        .expect("registration should succeed");

    let user = repo
        .find_by_id(registered.user_id)
        .await
        .unwrap()
        .expect("user should be persisted");
    assert!(user.email_verified_at.is_none());
    assert!(user.verification_token_hash.is_some());

    // Login before verification is refused without a credential check
    let early = service
        .login(login("a@x.com", "Passw0rd!"))
        .await
        .unwrap_err();
    assert!(matches!(
        early,
        DomainError::Auth(AuthError::EmailNotVerified { .. })
    ));

    // Verify using the token that went out by email
    let token = mailer
        .verification_tokens
        .lock()
        .unwrap()
        .last()
        .cloned()
        .expect("verification email should carry a token");
    let outcome = service
        .verify_email(VerifyEmailRequest {
            token: Some(token),
            client_ip: "10.0.0.1".to_string(),
        })
        .await
        .expect("verification should succeed");
    assert!(matches!(outcome, EmailVerificationOutcome::Verified { .. }));

    let user = repo
        .find_by_id(registered.user_id)
        .await
        .unwrap()
        .unwrap();
    assert!(user.email_verified_at.is_some());
    assert!(user.is_active);

    // Login with the correct password lands on the default redirect
    let success = service
        .login(login("a@x.com", "Passw0rd!"))
        .await
        .expect("login should succeed after verification");
    assert_eq!(success.user_id, registered.user_id);
    assert_eq!(success.redirect_to, "/dashboard");

    // Ten wrong passwords inside the window exhaust the login preset
    for attempt in 1..=10u32 {
        let err = service
            .login(login("a@x.com", "wrong-password"))
            .await
            .unwrap_err();
        match err {
            DomainError::Auth(AuthError::InvalidCredentials { remaining_attempts }) => {
                assert!(attempt < 10, "attempt {} should not still be generic", attempt);
                assert_eq!(remaining_attempts, Some(10 - attempt));
            }
            DomainError::Auth(AuthError::LockedOut {
                retry_after_seconds,
            }) => {
                assert_eq!(attempt, 10, "lockout should engage exactly at the ceiling");
                assert!(retry_after_seconds > 0);
            }
            other => panic!("unexpected login failure: {:?}", other),
        }
    }

    // The eleventh attempt is refused up front with a positive retry-after,
    // even with the correct password
    let eleventh = service
        .login(login("a@x.com", "Passw0rd!"))
        .await
        .unwrap_err();
    match eleventh {
        DomainError::Auth(AuthError::LockedOut {
            retry_after_seconds,
        }) => assert!(retry_after_seconds > 0),
        other => panic!("expected LockedOut, got {:?}", other),
    }
}
