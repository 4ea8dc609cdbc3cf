// ABOUTME: Payment gateway client and webhook handling for the subscription flag
// ABOUTME: Webhook payloads are HMAC-SHA256 verified before any state changes
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Billing
//!
//! Two halves: creating payment intents against the gateway, and processing
//! the gateway's webhooks. The webhook is the only code path that flips a
//! user's subscription flag, and it verifies the `HMAC` signature in constant
//! time before reading a single field of the payload.

use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::environment::BillingConfig;
use crate::database::Database;
use crate::errors::{AppError, AppResult, ErrorCode};

type HmacSha256 = Hmac<Sha256>;

/// Webhook signature header name
pub const SIGNATURE_HEADER: &str = "x-webhook-signature";

/// A created payment intent, returned to the client for checkout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntent {
    /// Gateway-assigned intent id
    pub id: String,
    /// Client secret the app uses to confirm the payment
    pub client_secret: String,
    /// Amount in the smallest currency unit
    pub amount_cents: u32,
    /// ISO currency code
    pub currency: String,
}

/// Gateway response shape for intent creation
#[derive(Debug, Deserialize)]
struct GatewayIntentResponse {
    id: String,
    client_secret: String,
}

/// Incoming webhook event payload
#[derive(Debug, Deserialize)]
pub struct WebhookEvent {
    /// Event type ("payment_intent.succeeded", "subscription.canceled")
    #[serde(rename = "type")]
    pub event_type: String,
    /// The account the event concerns, carried in intent metadata
    pub user_id: Uuid,
}

/// Payment gateway client
pub struct BillingService {
    client: Client,
    config: BillingConfig,
    database: Database,
}

impl BillingService {
    /// Create a billing service
    #[must_use]
    pub fn new(config: BillingConfig, database: Database) -> Self {
        Self {
            client: Client::new(),
            config,
            database,
        }
    }

    /// Create a payment intent for the subscription price
    ///
    /// # Errors
    ///
    /// Returns an external service error if the gateway call fails
    pub async fn create_payment_intent(&self, user_id: Uuid) -> AppResult<PaymentIntent> {
        let url = format!("{}/v1/payment_intents", self.config.gateway_base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.gateway_secret_key)
            .json(&serde_json::json!({
                "amount": self.config.subscription_price_cents,
                "currency": self.config.currency,
                "metadata": {"user_id": user_id.to_string()}
            }))
            .send()
            .await
            .map_err(|e| {
                AppError::external_service("billing", format!("Gateway request failed: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::external_service(
                "billing",
                format!("Gateway returned {status}: {body}"),
            ));
        }

        let intent: GatewayIntentResponse = response.json().await.map_err(|e| {
            AppError::external_service("billing", format!("Invalid gateway response: {e}"))
        })?;

        info!(user_id = %user_id, intent_id = %intent.id, "Created payment intent");

        Ok(PaymentIntent {
            id: intent.id,
            client_secret: intent.client_secret,
            amount_cents: self.config.subscription_price_cents,
            currency: self.config.currency.clone(),
        })
    }

    /// Verify and process a webhook payload
    ///
    /// Verification happens before parsing: a payload with a bad signature is
    /// rejected with `PermissionDenied` and no state is touched. Unknown event
    /// types are acknowledged and ignored so the gateway stops retrying them.
    ///
    /// # Errors
    ///
    /// Returns `PermissionDenied` for a bad signature, `InvalidInput` for an
    /// unparseable payload, or a database error
    pub async fn process_webhook(&self, payload: &[u8], signature: &str) -> AppResult<()> {
        verify_signature(self.config.webhook_secret.as_bytes(), payload, signature)?;

        let event: WebhookEvent = serde_json::from_slice(payload)
            .map_err(|e| AppError::invalid_input(format!("Unparseable webhook payload: {e}")))?;

        match event.event_type.as_str() {
            "payment_intent.succeeded" => {
                self.database
                    .users()
                    .set_subscribed(event.user_id, true)
                    .await?;
                info!(user_id = %event.user_id, "Subscription activated");
            }
            "subscription.canceled" => {
                self.database
                    .users()
                    .set_subscribed(event.user_id, false)
                    .await?;
                info!(user_id = %event.user_id, "Subscription canceled");
            }
            other => {
                warn!(event_type = %other, "Ignoring unhandled webhook event");
            }
        }

        Ok(())
    }
}

/// Verify a hex-encoded HMAC-SHA256 signature over the raw payload bytes
///
/// Comparison is constant-time; hex decoding errors and length mismatches are
/// treated the same as a wrong signature.
///
/// # Errors
///
/// Returns `PermissionDenied` when the signature does not match
pub fn verify_signature(secret: &[u8], payload: &[u8], signature_hex: &str) -> AppResult<()> {
    let provided = hex::decode(signature_hex.trim()).map_err(|_| {
        AppError::new(ErrorCode::PermissionDenied, "Invalid webhook signature")
    })?;

    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| AppError::internal(format!("Invalid webhook secret: {e}")))?;
    mac.update(payload);
    let expected = mac.finalize().into_bytes();

    if expected.ct_eq(provided.as_slice()).into() {
        Ok(())
    } else {
        Err(AppError::new(
            ErrorCode::PermissionDenied,
            "Invalid webhook signature",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign(secret: &[u8], payload: &[u8]) -> String {
        let mut mac = HmacSha256::new_from_slice(secret).unwrap();
        mac.update(payload);
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn test_valid_signature_accepted() {
        let secret = b"whsec_test";
        let payload = br#"{"type":"payment_intent.succeeded"}"#;
        let signature = sign(secret, payload);
        assert!(verify_signature(secret, payload, &signature).is_ok());
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let secret = b"whsec_test";
        let signature = sign(secret, b"original");
        let err = verify_signature(secret, b"tampered", &signature).unwrap_err();
        assert_eq!(err.code, ErrorCode::PermissionDenied);
    }

    #[test]
    fn test_garbage_signature_rejected() {
        let err = verify_signature(b"whsec_test", b"payload", "not-hex").unwrap_err();
        assert_eq!(err.code, ErrorCode::PermissionDenied);

        // Truncated but valid hex fails the length comparison the same way
        let err = verify_signature(b"whsec_test", b"payload", "deadbeef").unwrap_err();
        assert_eq!(err.code, ErrorCode::PermissionDenied);
    }
}
