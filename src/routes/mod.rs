// ABOUTME: HTTP route modules and the shared bearer-token authentication helper
// ABOUTME: Every authenticated handler resolves the user through authenticate()
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # HTTP Routes
//!
//! REST endpoints grouped by domain. Each module exposes a `*Routes` struct
//! whose `routes()` builds an axum `Router` over shared [`ServerResources`].

pub mod auth;
pub mod billing;
pub mod family;
pub mod health;
pub mod inventory;
pub mod plan;
pub mod recipes;
pub mod shopping;
pub mod sync;

pub use auth::AuthRoutes;
pub use billing::BillingRoutes;
pub use family::FamilyRoutes;
pub use health::HealthRoutes;
pub use inventory::InventoryRoutes;
pub use plan::PlanRoutes;
pub use recipes::RecipesRoutes;
pub use shopping::ShoppingRoutes;
pub use sync::SyncRoutes;

use std::sync::Arc;

use axum::http::HeaderMap;

use crate::errors::{AppError, AppResult};
use crate::models::User;
use crate::resources::ServerResources;

/// Resolve the authenticated user from the Authorization header
///
/// Validates the bearer token, loads the account, and bumps its last-active
/// timestamp. Handlers get the full `User` so subscription checks never rely
/// on stale token claims.
pub(crate) async fn authenticate(
    headers: &HeaderMap,
    resources: &Arc<ServerResources>,
) -> AppResult<User> {
    let auth_header = headers
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(AppError::auth_required)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::auth_invalid("Authorization header must be a bearer token"))?;

    let user_id = resources.auth_manager.extract_user_id(token)?;

    let user = resources
        .database
        .users()
        .get(user_id)
        .await?
        .ok_or_else(|| AppError::auth_invalid("Token refers to an unknown account"))?;

    resources.database.users().touch_last_active(user_id).await?;

    Ok(user)
}
