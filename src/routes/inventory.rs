// ABOUTME: Route handlers for the ingredient inventory REST API
// ABOUTME: CRUD plus photo recognition, all scoped to the authenticated user
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inventory routes
//!
//! Ingredient names are unique per inventory regardless of case; adding a
//! name that already exists returns the stored row instead of duplicating it.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::llm::ImageInput;
use crate::models::{Ingredient, IngredientCategory};
use crate::resources::ServerResources;
use crate::routes::authenticate;

/// Request body for adding or updating an ingredient
#[derive(Debug, Deserialize)]
pub struct IngredientBody {
    /// Ingredient name
    pub name: String,
    /// Category; defaults to "other"
    #[serde(default)]
    pub category: Option<String>,
}

/// Request body for photo recognition
#[derive(Debug, Deserialize)]
pub struct RecognizeBody {
    /// Base64-encoded photo
    pub image_base64: String,
    /// MIME type of the photo
    #[serde(default = "default_mime_type")]
    pub mime_type: String,
}

fn default_mime_type() -> String {
    "image/jpeg".to_owned()
}

/// Response after recognition: what was added and what was already there
#[derive(Debug, Serialize)]
pub struct RecognizeResponse {
    /// Newly added ingredients
    pub added: Vec<Ingredient>,
    /// Total inventory size after the scan
    pub inventory_count: u64,
}

/// Inventory routes handler
pub struct InventoryRoutes;

impl InventoryRoutes {
    /// Create all inventory routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/inventory", get(Self::handle_list))
            .route("/api/inventory", post(Self::handle_add))
            .route("/api/inventory/:id", put(Self::handle_update))
            .route("/api/inventory/:id", delete(Self::handle_remove))
            .route("/api/inventory/recognize", post(Self::handle_recognize))
            .with_state(resources)
    }

    /// Handle GET /api/inventory
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let user = authenticate(&headers, &resources).await?;
        let ingredients = resources.database.inventory().list(user.id).await?;
        Ok((StatusCode::OK, Json(ingredients)).into_response())
    }

    /// Handle POST /api/inventory
    async fn handle_add(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<IngredientBody>,
    ) -> Result<Response, AppError> {
        let user = authenticate(&headers, &resources).await?;

        let name = body.name.trim();
        if name.is_empty() {
            return Err(AppError::invalid_input("Ingredient name cannot be empty"));
        }

        let category = body
            .category
            .as_deref()
            .map_or(IngredientCategory::Other, IngredientCategory::parse);
        let ingredient = Ingredient::new(name, category);

        let stored = resources
            .database
            .inventory()
            .add(user.id, &ingredient)
            .await?;
        let status = if stored.id == ingredient.id {
            StatusCode::CREATED
        } else {
            StatusCode::OK
        };
        Ok((status, Json(stored)).into_response())
    }

    /// Handle PUT /api/inventory/:id
    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<Uuid>,
        Json(body): Json<IngredientBody>,
    ) -> Result<Response, AppError> {
        let user = authenticate(&headers, &resources).await?;

        let name = body.name.trim();
        if name.is_empty() {
            return Err(AppError::invalid_input("Ingredient name cannot be empty"));
        }

        let category = body
            .category
            .as_deref()
            .map_or(IngredientCategory::Other, IngredientCategory::parse);

        resources
            .database
            .inventory()
            .update(user.id, id, name, category)
            .await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }

    /// Handle DELETE /api/inventory/:id
    async fn handle_remove(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let user = authenticate(&headers, &resources).await?;
        resources.database.inventory().remove(user.id, id).await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }

    /// Handle POST /api/inventory/recognize - add ingredients from a photo
    async fn handle_recognize(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<RecognizeBody>,
    ) -> Result<Response, AppError> {
        let user = authenticate(&headers, &resources).await?;

        if body.image_base64.is_empty() {
            return Err(AppError::invalid_input("An image is required"));
        }

        let existing = resources.database.inventory().list(user.id).await?;
        let recognized = resources
            .recognizer
            .recognize(
                ImageInput {
                    data_base64: body.image_base64,
                    mime_type: body.mime_type,
                },
                &existing,
            )
            .await?;

        let added = resources
            .database
            .inventory()
            .add_missing(user.id, &recognized)
            .await?;
        let inventory_count = resources.database.inventory().count(user.id).await?;

        Ok((
            StatusCode::OK,
            Json(RecognizeResponse {
                added,
                inventory_count,
            }),
        )
            .into_response())
    }
}
