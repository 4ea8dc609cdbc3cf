// ABOUTME: Route handlers for saving and listing recipes kept from generated plans
// ABOUTME: Recipe payloads are stored as-is; there is no recipe editing
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Saved recipe routes

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::Recipe;
use crate::resources::ServerResources;
use crate::routes::authenticate;

/// Saved recipe routes handler
pub struct RecipesRoutes;

impl RecipesRoutes {
    /// Create all recipe routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/recipes", get(Self::handle_list))
            .route("/api/recipes", post(Self::handle_save))
            .route("/api/recipes/:id", delete(Self::handle_delete))
            .with_state(resources)
    }

    /// Handle GET /api/recipes
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let user = authenticate(&headers, &resources).await?;
        let recipes = resources.database.recipes().list(user.id).await?;
        Ok((StatusCode::OK, Json(recipes)).into_response())
    }

    /// Handle POST /api/recipes - save a recipe from a generated plan
    async fn handle_save(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(recipe): Json<Recipe>,
    ) -> Result<Response, AppError> {
        let user = authenticate(&headers, &resources).await?;

        if recipe.name.trim().is_empty() {
            return Err(AppError::invalid_input("Recipe name cannot be empty"));
        }

        let saved = resources.database.recipes().save(user.id, &recipe).await?;
        Ok((StatusCode::CREATED, Json(saved)).into_response())
    }

    /// Handle DELETE /api/recipes/:id
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let user = authenticate(&headers, &resources).await?;
        resources.database.recipes().delete(user.id, id).await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }
}
