// ABOUTME: Integration tests for user accounts and JWT authentication
// ABOUTME: Covers registration constraints, token lifecycle, and subscription flag
//
// SPDX-License-Identifier: MIT OR Apache-2.0

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use chef_fridge::auth::AuthManager;
use chef_fridge::errors::ErrorCode;
use chef_fridge::models::User;
use uuid::Uuid;

fn create_auth_manager() -> AuthManager {
    AuthManager::new(b"integration-test-secret".to_vec(), 24)
}

#[tokio::test]
async fn test_create_and_load_user() {
    let database = common::create_test_database().await.unwrap();
    let user = common::create_test_user(&database).await.unwrap();

    let by_id = database.users().get(user.id).await.unwrap().unwrap();
    assert_eq!(by_id.email, user.email);
    assert!(!by_id.is_subscribed);
    assert!(!by_id.local_migrated);

    let by_email = database
        .users()
        .get_by_email(&user.email)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_email.id, user.id);
}

#[tokio::test]
async fn test_duplicate_email_rejected() {
    let database = common::create_test_database().await.unwrap();
    let user = common::create_test_user(&database).await.unwrap();

    let duplicate = User::new(user.email.clone(), "other_hash".into(), None);
    let err = database.users().create(&duplicate).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceAlreadyExists);
}

#[tokio::test]
async fn test_token_roundtrip_against_stored_user() {
    let database = common::create_test_database().await.unwrap();
    let user = common::create_test_user(&database).await.unwrap();
    let auth_manager = create_auth_manager();

    let token = auth_manager.generate_token(&user).unwrap();
    let user_id = auth_manager.extract_user_id(&token).unwrap();
    assert_eq!(user_id, user.id);

    let loaded = database.users().get(user_id).await.unwrap().unwrap();
    assert_eq!(loaded.email, user.email);
}

#[tokio::test]
async fn test_password_hash_roundtrip() {
    let hash = AuthManager::hash_password("correct horse battery staple").unwrap();
    assert!(AuthManager::verify_password("correct horse battery staple", &hash).unwrap());
    assert!(!AuthManager::verify_password("wrong password", &hash).unwrap());
}

#[tokio::test]
async fn test_subscription_flag_flips() {
    let database = common::create_test_database().await.unwrap();
    let user = common::create_test_user(&database).await.unwrap();

    database.users().set_subscribed(user.id, true).await.unwrap();
    let loaded = database.users().get(user.id).await.unwrap().unwrap();
    assert!(loaded.is_subscribed);

    database
        .users()
        .set_subscribed(user.id, false)
        .await
        .unwrap();
    let loaded = database.users().get(user.id).await.unwrap().unwrap();
    assert!(!loaded.is_subscribed);
}

#[tokio::test]
async fn test_set_subscribed_unknown_user() {
    let database = common::create_test_database().await.unwrap();
    let err = database
        .users()
        .set_subscribed(Uuid::new_v4(), true)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
}

#[tokio::test]
async fn test_accounts_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite:{}/chef_fridge.db", dir.path().display());

    let user = {
        let database = chef_fridge::database::Database::new(&url).await.unwrap();
        common::create_test_user(&database).await.unwrap()
    };

    let reopened = chef_fridge::database::Database::new(&url).await.unwrap();
    let loaded = reopened.users().get(user.id).await.unwrap().unwrap();
    assert_eq!(loaded.email, user.email);
}

#[tokio::test]
async fn test_mark_local_migrated_consumed_once() {
    let database = common::create_test_database().await.unwrap();
    let user = common::create_test_user(&database).await.unwrap();

    assert!(database.users().mark_local_migrated(user.id).await.unwrap());
    assert!(!database.users().mark_local_migrated(user.id).await.unwrap());
}
