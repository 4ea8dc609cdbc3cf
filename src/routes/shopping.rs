// ABOUTME: Route handlers for the persisted shopping list
// ABOUTME: Items arrive from plan derivations and get checked off while shopping
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shopping list routes

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::ShoppingItem;
use crate::resources::ServerResources;
use crate::routes::authenticate;

/// Request body for promoting plan items into the persisted list
#[derive(Debug, Deserialize)]
pub struct AddItemsBody {
    /// Items from a derived shopping list
    pub items: Vec<ShoppingItem>,
}

/// Request body for marking an entry bought
#[derive(Debug, Deserialize)]
pub struct SetBoughtBody {
    /// New bought state
    pub bought: bool,
}

/// Shopping routes handler
pub struct ShoppingRoutes;

impl ShoppingRoutes {
    /// Create all shopping routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/shopping", get(Self::handle_list))
            .route("/api/shopping", post(Self::handle_add_items))
            .route("/api/shopping/bought", delete(Self::handle_clear_bought))
            .route("/api/shopping/:id", delete(Self::handle_remove))
            .route("/api/shopping/:id/bought", post(Self::handle_set_bought))
            .with_state(resources)
    }

    /// Handle GET /api/shopping
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let user = authenticate(&headers, &resources).await?;
        let entries = resources.database.shopping().list(user.id).await?;
        Ok((StatusCode::OK, Json(entries)).into_response())
    }

    /// Handle POST /api/shopping - promote derived items into the list
    async fn handle_add_items(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<AddItemsBody>,
    ) -> Result<Response, AppError> {
        let user = authenticate(&headers, &resources).await?;

        if body.items.is_empty() {
            return Err(AppError::invalid_input("No items to add"));
        }

        let entries = resources
            .database
            .shopping()
            .add_items(user.id, &body.items)
            .await?;
        Ok((StatusCode::CREATED, Json(entries)).into_response())
    }

    /// Handle POST /api/shopping/:id/bought
    async fn handle_set_bought(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<Uuid>,
        Json(body): Json<SetBoughtBody>,
    ) -> Result<Response, AppError> {
        let user = authenticate(&headers, &resources).await?;
        resources
            .database
            .shopping()
            .set_bought(user.id, id, body.bought)
            .await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }

    /// Handle DELETE /api/shopping/:id
    async fn handle_remove(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let user = authenticate(&headers, &resources).await?;
        resources.database.shopping().remove(user.id, id).await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }

    /// Handle DELETE /api/shopping/bought - clear checked-off entries
    async fn handle_clear_bought(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let user = authenticate(&headers, &resources).await?;
        let removed = resources.database.shopping().clear_bought(user.id).await?;
        Ok((StatusCode::OK, Json(serde_json::json!({"removed": removed}))).into_response())
    }
}
