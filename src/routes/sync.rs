// ABOUTME: Route handlers for device sync, one-time migration and debounced snapshot writes
// ABOUTME: Reconcile runs synchronously; snapshot writes are acknowledged then debounced
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sync routes

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{post, put},
    Json, Router,
};
use serde::Serialize;

use crate::errors::AppError;
use crate::resources::ServerResources;
use crate::routes::authenticate;
use crate::sync::{LocalSnapshot, SyncOutcome};

/// Reconcile response
#[derive(Debug, Serialize)]
pub struct ReconcileResponse {
    /// What the reconcile decided
    pub outcome: SyncOutcome,
}

/// Sync routes handler
pub struct SyncRoutes;

impl SyncRoutes {
    /// Create all sync routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/sync/reconcile", post(Self::handle_reconcile))
            .route("/api/sync/snapshot", put(Self::handle_snapshot))
            .with_state(resources)
    }

    /// Handle POST /api/sync/reconcile - one-time migration decision
    async fn handle_reconcile(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(snapshot): Json<LocalSnapshot>,
    ) -> Result<Response, AppError> {
        let user = authenticate(&headers, &resources).await?;
        let outcome = resources.sync.reconcile(user.id, &snapshot).await?;
        Ok((StatusCode::OK, Json(ReconcileResponse { outcome })).into_response())
    }

    /// Handle PUT /api/sync/snapshot - queue a debounced whole-snapshot write
    ///
    /// Returns 202 immediately; the write lands after the debounce window.
    async fn handle_snapshot(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(snapshot): Json<LocalSnapshot>,
    ) -> Result<Response, AppError> {
        let user = authenticate(&headers, &resources).await?;
        resources.sync.queue_write(user.id, snapshot);
        Ok(StatusCode::ACCEPTED.into_response())
    }
}
