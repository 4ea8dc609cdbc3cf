// ABOUTME: Integration tests for webhook-driven subscription changes
// ABOUTME: Verifies signature checks gate every state mutation
//
// SPDX-License-Identifier: MIT OR Apache-2.0

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use chef_fridge::billing::BillingService;
use chef_fridge::config::environment::BillingConfig;
use chef_fridge::database::Database;
use chef_fridge::errors::ErrorCode;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use uuid::Uuid;

const WEBHOOK_SECRET: &str = "whsec_integration_test";

fn billing_service(database: Database) -> BillingService {
    let config = BillingConfig {
        gateway_base_url: "http://127.0.0.1:1".into(),
        gateway_secret_key: "sk_test".into(),
        webhook_secret: WEBHOOK_SECRET.into(),
        subscription_price_cents: 499,
        currency: "usd".into(),
    };
    BillingService::new(config, database)
}

fn sign(payload: &[u8]) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(WEBHOOK_SECRET.as_bytes()).unwrap();
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

fn event_payload(event_type: &str, user_id: Uuid) -> Vec<u8> {
    serde_json::json!({"type": event_type, "user_id": user_id})
        .to_string()
        .into_bytes()
}

#[tokio::test]
async fn test_payment_succeeded_activates_subscription() {
    let database = common::create_test_database().await.unwrap();
    let user = common::create_test_user(&database).await.unwrap();
    let billing = billing_service(database.clone());

    let payload = event_payload("payment_intent.succeeded", user.id);
    billing
        .process_webhook(&payload, &sign(&payload))
        .await
        .unwrap();

    let loaded = database.users().get(user.id).await.unwrap().unwrap();
    assert!(loaded.is_subscribed);
}

#[tokio::test]
async fn test_cancellation_clears_subscription() {
    let database = common::create_test_database().await.unwrap();
    let user = common::create_test_user(&database).await.unwrap();
    let billing = billing_service(database.clone());

    database.users().set_subscribed(user.id, true).await.unwrap();

    let payload = event_payload("subscription.canceled", user.id);
    billing
        .process_webhook(&payload, &sign(&payload))
        .await
        .unwrap();

    let loaded = database.users().get(user.id).await.unwrap().unwrap();
    assert!(!loaded.is_subscribed);
}

#[tokio::test]
async fn test_bad_signature_never_mutates_state() {
    let database = common::create_test_database().await.unwrap();
    let user = common::create_test_user(&database).await.unwrap();
    let billing = billing_service(database.clone());

    let payload = event_payload("payment_intent.succeeded", user.id);
    let err = billing
        .process_webhook(&payload, "deadbeef")
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::PermissionDenied);

    let loaded = database.users().get(user.id).await.unwrap().unwrap();
    assert!(!loaded.is_subscribed);
}

#[tokio::test]
async fn test_unknown_event_acknowledged() {
    let database = common::create_test_database().await.unwrap();
    let user = common::create_test_user(&database).await.unwrap();
    let billing = billing_service(database.clone());

    let payload = event_payload("invoice.finalized", user.id);
    billing
        .process_webhook(&payload, &sign(&payload))
        .await
        .unwrap();

    let loaded = database.users().get(user.id).await.unwrap().unwrap();
    assert!(!loaded.is_subscribed);
}
