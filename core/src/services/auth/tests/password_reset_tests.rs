//! Forgot-password and reset-completion flow tests

use chrono::{Duration, Utc};

use crate::errors::{AuthError, DomainError, TokenError, ValidationError};
use crate::repositories::UserRepository;
use crate::services::auth::tests::mocks::{login_request, EmailKind, TestHarness};
use crate::services::auth::{ForgotPasswordRequest, ResetPasswordRequest};
use crate::services::token::{SecurityTokenService, TOKEN_LENGTH};

fn forgot(email: &str) -> ForgotPasswordRequest {
    ForgotPasswordRequest {
        email: email.to_string(),
    }
}

fn reset(token: &str, new_password: &str) -> ResetPasswordRequest {
    ResetPasswordRequest {
        token: token.to_string(),
        new_password: new_password.to_string(),
        client_ip: "10.0.0.1".to_string(),
    }
}

#[tokio::test]
async fn unknown_and_known_emails_get_the_same_response() {
    let harness = TestHarness::new();
    harness.register_verified_sample().await;

    let known = harness
        .service
        .request_password_reset(forgot("a@x.com"))
        .await
        .unwrap();
    let unknown = harness
        .service
        .request_password_reset(forgot("ghost@x.com"))
        .await
        .unwrap();

    assert_eq!(known, unknown);
}

#[tokio::test]
async fn reset_request_stores_only_the_hash_of_the_mailed_token() {
    let harness = TestHarness::new();
    let user_id = harness.register_verified_sample().await;

    harness
        .service
        .request_password_reset(forgot("a@x.com"))
        .await
        .unwrap();

    let token = harness.mailer.last_token(EmailKind::PasswordReset).unwrap();
    assert_eq!(token.len(), TOKEN_LENGTH);

    let user = harness.repo.find_by_id(user_id).await.unwrap().unwrap();
    assert_eq!(
        user.password_reset_token_hash.as_deref(),
        Some(SecurityTokenService::hash(&token).as_str())
    );
    assert!(user.password_reset_token_expires_at.is_some());
}

#[tokio::test]
async fn a_new_request_invalidates_the_previous_token_by_overwrite() {
    let harness = TestHarness::new();
    harness.register_verified_sample().await;

    harness
        .service
        .request_password_reset(forgot("a@x.com"))
        .await
        .unwrap();
    let first = harness.mailer.last_token(EmailKind::PasswordReset).unwrap();

    harness
        .service
        .request_password_reset(forgot("a@x.com"))
        .await
        .unwrap();

    // The first token's hash was overwritten, so it no longer resolves
    let err = harness
        .service
        .reset_password(reset(&first, "NewPassw0rd!"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Token(TokenError::InvalidOrUsed)));
}

#[tokio::test]
async fn suspended_account_gets_the_uniform_response_and_no_email() {
    let harness = TestHarness::new();
    let user_id = harness.register_verified_sample().await;

    let mut user = harness.repo.find_by_id(user_id).await.unwrap().unwrap();
    user.block();
    harness.repo.update(user).await.unwrap();

    let sent_before = harness.mailer.sent_count();
    let response = harness
        .service
        .request_password_reset(forgot("a@x.com"))
        .await
        .unwrap();
    let unknown = harness
        .service
        .request_password_reset(forgot("ghost@x.com"))
        .await
        .unwrap();

    assert_eq!(response, unknown);
    assert_eq!(harness.mailer.sent_count(), sent_before);
}

#[tokio::test]
async fn delivery_failure_rolls_the_persisted_token_back() {
    let harness = TestHarness::new();
    let user_id = harness.register_verified_sample().await;
    harness.mailer.set_failing(true);

    let err = harness
        .service
        .request_password_reset(forgot("a@x.com"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::Auth(AuthError::EmailDeliveryFailure)
    ));

    // No dead token lingers
    let user = harness.repo.find_by_id(user_id).await.unwrap().unwrap();
    assert!(user.password_reset_token_hash.is_none());
    assert!(user.password_reset_token_expires_at.is_none());
}

#[tokio::test]
async fn completion_replaces_the_password_and_consumes_the_token() {
    let harness = TestHarness::new();
    let user_id = harness.register_verified_sample().await;
    harness
        .service
        .request_password_reset(forgot("a@x.com"))
        .await
        .unwrap();
    let token = harness.mailer.last_token(EmailKind::PasswordReset).unwrap();

    let completed = harness
        .service
        .reset_password(reset(&token, "NewPassw0rd!"))
        .await
        .unwrap();
    assert_eq!(completed.user_id, user_id);

    // Token fields were cleared together with the password write
    let user = harness.repo.find_by_id(user_id).await.unwrap().unwrap();
    assert!(user.password_reset_token_hash.is_none());
    assert!(user.password_reset_token_expires_at.is_none());

    // Old credential is dead, new one works
    assert!(harness
        .service
        .login(login_request("a@x.com", "Passw0rd!"))
        .await
        .is_err());
    assert!(harness
        .service
        .login(login_request("a@x.com", "NewPassw0rd!"))
        .await
        .is_ok());

    // And the consumed token cannot be replayed
    let replay = harness
        .service
        .reset_password(reset(&token, "YetAnother1!"))
        .await
        .unwrap_err();
    assert!(matches!(replay, DomainError::Token(TokenError::InvalidOrUsed)));
}

#[tokio::test]
async fn reusing_the_current_password_is_refused_without_mutation() {
    let harness = TestHarness::new();
    let user_id = harness.register_verified_sample().await;
    harness
        .service
        .request_password_reset(forgot("a@x.com"))
        .await
        .unwrap();
    let token = harness.mailer.last_token(EmailKind::PasswordReset).unwrap();

    let before = harness.repo.find_by_id(user_id).await.unwrap().unwrap();

    // Same plaintext as the current password; caught by hash comparison
    let err = harness
        .service
        .reset_password(reset(&token, "Passw0rd!"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Auth(AuthError::PasswordReuse)));

    let after = harness.repo.find_by_id(user_id).await.unwrap().unwrap();
    assert_eq!(before.password_hash, after.password_hash);
    // The token survives for a corrected retry
    assert_eq!(
        before.password_reset_token_hash,
        after.password_reset_token_hash
    );
}

#[tokio::test]
async fn expired_reset_token_is_cleared_and_distinct_from_invalid() {
    let harness = TestHarness::new();
    let user_id = harness.register_verified_sample().await;
    harness
        .service
        .request_password_reset(forgot("a@x.com"))
        .await
        .unwrap();
    let token = harness.mailer.last_token(EmailKind::PasswordReset).unwrap();

    let mut user = harness.repo.find_by_id(user_id).await.unwrap().unwrap();
    user.password_reset_token_expires_at = Some(Utc::now() - Duration::minutes(1));
    harness.repo.update(user).await.unwrap();

    let err = harness
        .service
        .reset_password(reset(&token, "NewPassw0rd!"))
        .await
        .unwrap_err();
    match &err {
        DomainError::Token(TokenError::Expired { email }) => {
            assert_eq!(email.as_deref(), Some("a@x.com"))
        }
        other => panic!("expected Expired, got {:?}", other),
    }

    let user = harness.repo.find_by_id(user_id).await.unwrap().unwrap();
    assert!(user.password_reset_token_hash.is_none());
}

#[tokio::test]
async fn blocked_and_inactive_holders_cannot_complete_even_with_a_valid_token() {
    let harness = TestHarness::new();
    let user_id = harness.register_verified_sample().await;
    harness
        .service
        .request_password_reset(forgot("a@x.com"))
        .await
        .unwrap();
    let token = harness.mailer.last_token(EmailKind::PasswordReset).unwrap();

    let mut user = harness.repo.find_by_id(user_id).await.unwrap().unwrap();
    user.block();
    harness.repo.update(user).await.unwrap();

    let err = harness
        .service
        .reset_password(reset(&token, "NewPassw0rd!"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::Auth(AuthError::AccountSuspended)
    ));

    let mut user = harness.repo.find_by_id(user_id).await.unwrap().unwrap();
    user.unblock();
    user.is_active = false;
    harness.repo.update(user).await.unwrap();

    let err = harness
        .service
        .reset_password(reset(&token, "NewPassw0rd!"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Auth(AuthError::AccountInactive)));
}

#[tokio::test]
async fn malformed_input_is_rejected_before_lookup() {
    let harness = TestHarness::new();

    let err = harness
        .service
        .reset_password(reset("", "NewPassw0rd!"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Token(TokenError::Missing)));

    let err = harness
        .service
        .reset_password(reset("zz-not-hex", "NewPassw0rd!"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Token(TokenError::Malformed)));

    let err = harness
        .service
        .reset_password(reset(&"a".repeat(TOKEN_LENGTH), "short"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::ValidationErr(ValidationError::InvalidLength { .. })
    ));
}
