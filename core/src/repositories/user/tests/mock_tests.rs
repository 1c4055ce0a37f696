//! Tests for the in-memory user repository

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::domain::entities::user::User;
use crate::errors::{AuthError, DomainError};
use crate::repositories::user::{MockUserRepository, UserRepository};

fn sample_user(email: &str, phone: &str) -> User {
    User::new(
        email.to_string(),
        phone.to_string(),
        "$2b$12$fakehashfakehashfakehash".to_string(),
        "Test".to_string(),
        "User".to_string(),
    )
}

#[tokio::test]
async fn create_and_find_by_email() {
    let repo = MockUserRepository::new();
    let user = sample_user("a@x.com", "9998887776");
    let created = repo.create(user.clone()).await.unwrap();

    let found = repo.find_by_email("a@x.com").await.unwrap().unwrap();
    assert_eq!(found.id, created.id);
    assert!(repo.find_by_email("b@x.com").await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_email_and_duplicate_phone_raise_the_same_error() {
    let repo = MockUserRepository::new();
    repo.create(sample_user("a@x.com", "9998887776"))
        .await
        .unwrap();

    let email_clash = repo
        .create(sample_user("a@x.com", "1112223334"))
        .await
        .unwrap_err();
    let phone_clash = repo
        .create(sample_user("b@x.com", "9998887776"))
        .await
        .unwrap_err();

    let email_msg = email_clash.to_string();
    let phone_msg = phone_clash.to_string();
    assert_eq!(email_msg, phone_msg);
    assert!(matches!(
        email_clash,
        DomainError::Auth(AuthError::DuplicateAccount)
    ));
}

#[tokio::test]
async fn find_by_token_hashes() {
    let repo = MockUserRepository::new();
    let mut user = sample_user("a@x.com", "9998887776");
    let expiry = Utc::now() + Duration::hours(1);
    user.set_verification_token("verify-hash".to_string(), expiry);
    user.set_reset_token("reset-hash".to_string(), expiry);
    repo.create(user.clone()).await.unwrap();

    assert_eq!(
        repo.find_by_verification_token_hash("verify-hash")
            .await
            .unwrap()
            .unwrap()
            .id,
        user.id
    );
    assert_eq!(
        repo.find_by_reset_token_hash("reset-hash")
            .await
            .unwrap()
            .unwrap()
            .id,
        user.id
    );
    assert!(repo
        .find_by_verification_token_hash("unknown")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn update_rejects_unknown_user() {
    let repo = MockUserRepository::new();
    let user = sample_user("a@x.com", "9998887776");
    let err = repo.update(user).await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));
}

#[tokio::test]
async fn password_update_clears_reset_token_atomically() {
    let repo = MockUserRepository::new();
    let mut user = sample_user("a@x.com", "9998887776");
    user.set_reset_token("reset-hash".to_string(), Utc::now() + Duration::hours(1));
    repo.create(user.clone()).await.unwrap();

    repo.update_password_and_clear_reset_token(user.id, "new-hash")
        .await
        .unwrap();

    let stored = repo.find_by_id(user.id).await.unwrap().unwrap();
    assert_eq!(stored.password_hash, "new-hash");
    assert!(stored.password_reset_token_hash.is_none());
    assert!(stored.password_reset_token_expires_at.is_none());

    let missing = repo
        .update_password_and_clear_reset_token(Uuid::new_v4(), "hash")
        .await;
    assert!(missing.is_err());
}
