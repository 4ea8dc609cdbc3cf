// ABOUTME: Route handlers for meal plan generation and shopping list derivation
// ABOUTME: Generation reads the hosted inventory and family, never client-supplied state
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plan routes
//!
//! Generated plans are ephemeral: the response is the plan, and nothing is
//! persisted until the user saves a recipe or promotes shopping items. The
//! derivation endpoint re-filters a plan's shopping list under the client's
//! current selection and exclusions.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::llm::prompts::PlanPromptOptions;
use crate::models::{ChefPlan, MealType, ShoppingItem};
use crate::planner::{derive_shopping_list, ShoppingSelection};
use crate::resources::ServerResources;
use crate::routes::authenticate;

/// Request body for plan generation
#[derive(Debug, Default, Deserialize)]
pub struct GeneratePlanBody {
    /// Only propose recipes that need no shopping
    #[serde(default)]
    pub only_use_inventory: bool,
    /// Restrict recipes to these meal categories
    #[serde(default)]
    pub meal_types: Vec<String>,
    /// How many recipes to generate (1-10)
    #[serde(default)]
    pub recipe_count: Option<u8>,
    /// Free-form note for the model
    #[serde(default)]
    pub note: Option<String>,
    /// Look up photos for generated recipes
    #[serde(default)]
    pub include_photos: bool,
}

/// Request body for shopping list derivation
#[derive(Debug, Deserialize)]
pub struct DeriveShoppingBody {
    /// The plan to derive from
    pub plan: ChefPlan,
    /// Current recipe selection and item exclusions
    #[serde(default)]
    pub selection: ShoppingSelection,
}

/// Derived shopping list response
#[derive(Debug, Serialize)]
pub struct DeriveShoppingResponse {
    /// Items left after selection and exclusions
    pub items: Vec<ShoppingItem>,
}

/// Plan routes handler
pub struct PlanRoutes;

impl PlanRoutes {
    /// Create all plan routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/plan", post(Self::handle_generate))
            .route("/api/plan/shopping", post(Self::handle_derive_shopping))
            .with_state(resources)
    }

    /// Handle POST /api/plan - generate a meal plan
    async fn handle_generate(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<GeneratePlanBody>,
    ) -> Result<Response, AppError> {
        let user = authenticate(&headers, &resources).await?;

        if let Some(count) = body.recipe_count {
            if !(1..=10).contains(&count) {
                return Err(AppError::invalid_input(
                    "recipe_count must be between 1 and 10",
                ));
            }
        }

        let inventory = resources.database.inventory().list(user.id).await?;
        let family = resources.database.family().list(user.id).await?;

        let options = PlanPromptOptions {
            only_use_inventory: body.only_use_inventory,
            meal_types: body
                .meal_types
                .iter()
                .filter_map(|s| MealType::parse(s))
                .collect(),
            recipe_count: body.recipe_count,
            note: body.note,
        };

        let mut plan = resources
            .planner
            .generate(&inventory, &family, &options)
            .await?;

        if body.include_photos && resources.image_search.is_configured() {
            for recipe in &mut plan.recipes {
                recipe.photo_url = resources.image_search.find_photo(&recipe.name).await;
            }
        }

        Ok((StatusCode::OK, Json(plan)).into_response())
    }

    /// Handle POST /api/plan/shopping - derive the effective shopping list
    async fn handle_derive_shopping(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<DeriveShoppingBody>,
    ) -> Result<Response, AppError> {
        authenticate(&headers, &resources).await?;
        let items = derive_shopping_list(&body.plan, &body.selection);
        Ok((StatusCode::OK, Json(DeriveShoppingResponse { items })).into_response())
    }
}
