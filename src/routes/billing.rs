// ABOUTME: Route handlers for payment intents and the gateway webhook
// ABOUTME: The webhook takes the raw body so the HMAC covers exactly what was sent
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Billing routes

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};

use crate::billing::SIGNATURE_HEADER;
use crate::errors::{AppError, ErrorCode};
use crate::resources::ServerResources;
use crate::routes::authenticate;

/// Billing routes handler
pub struct BillingRoutes;

impl BillingRoutes {
    /// Create all billing routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/billing/intent", post(Self::handle_create_intent))
            .route("/api/billing/webhook", post(Self::handle_webhook))
            .with_state(resources)
    }

    /// Handle POST /api/billing/intent - start a subscription checkout
    async fn handle_create_intent(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let user = authenticate(&headers, &resources).await?;

        if user.is_subscribed {
            return Err(AppError::new(
                ErrorCode::ResourceAlreadyExists,
                "Account is already subscribed",
            ));
        }

        let intent = resources.billing.create_payment_intent(user.id).await?;
        Ok((StatusCode::CREATED, Json(intent)).into_response())
    }

    /// Handle POST /api/billing/webhook - gateway event delivery
    ///
    /// Unauthenticated by design; trust comes from the HMAC signature over
    /// the raw body, verified before anything is parsed or mutated.
    async fn handle_webhook(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        body: Bytes,
    ) -> Result<Response, AppError> {
        let signature = headers
            .get(SIGNATURE_HEADER)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| {
                AppError::new(ErrorCode::PermissionDenied, "Missing webhook signature")
            })?;

        resources.billing.process_webhook(&body, signature).await?;
        Ok(StatusCode::OK.into_response())
    }
}
