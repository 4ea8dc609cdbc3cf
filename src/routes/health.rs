// ABOUTME: Health check endpoints for liveness and LLM provider readiness
// ABOUTME: Unauthenticated, used by deployment probes
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Health routes

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::errors::AppError;
use crate::llm::LlmProvider;
use crate::resources::ServerResources;

/// Basic health response
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
}

/// Provider readiness response
#[derive(Debug, Serialize)]
struct LlmHealthResponse {
    status: &'static str,
    provider: &'static str,
    model: String,
}

/// Health routes handler
pub struct HealthRoutes;

impl HealthRoutes {
    /// Create all health routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/health", get(Self::handle_health))
            .route("/health/llm", get(Self::handle_llm_health))
            .with_state(resources)
    }

    /// Handle GET /health
    async fn handle_health() -> Response {
        (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok",
                service: env!("CARGO_PKG_NAME"),
                version: env!("CARGO_PKG_VERSION"),
            }),
        )
            .into_response()
    }

    /// Handle GET /health/llm - verifies the provider can accept requests
    async fn handle_llm_health(
        State(resources): State<Arc<ServerResources>>,
    ) -> Result<Response, AppError> {
        resources.provider.health_check().await?;
        Ok((
            StatusCode::OK,
            Json(LlmHealthResponse {
                status: "ok",
                provider: resources.provider.name(),
                model: resources.provider.default_model().to_owned(),
            }),
        )
            .into_response())
    }
}
