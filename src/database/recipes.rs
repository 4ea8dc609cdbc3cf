// ABOUTME: Database operations for recipes the user chose to save from generated plans
// ABOUTME: Recipe payloads are immutable once generated and stored whole as JSON
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::errors::{AppError, AppResult};
use crate::models::{Recipe, SavedRecipe};
use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

/// Saved recipe database operations manager
pub struct RecipesManager {
    pool: SqlitePool,
}

impl RecipesManager {
    /// Create a new recipes manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Save a generated recipe for later
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the database operation fails
    pub async fn save(&self, user_id: Uuid, recipe: &Recipe) -> AppResult<SavedRecipe> {
        let saved = SavedRecipe {
            id: Uuid::new_v4(),
            user_id,
            recipe: recipe.clone(),
            created_at: Utc::now(),
        };
        let recipe_json = serde_json::to_string(recipe)?;

        sqlx::query(
            r"
            INSERT INTO saved_recipes (id, user_id, name, recipe_json, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(saved.id.to_string())
        .bind(user_id.to_string())
        .bind(&recipe.name)
        .bind(&recipe_json)
        .bind(saved.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to save recipe: {e}")))?;

        Ok(saved)
    }

    /// List a user's saved recipes, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn list(&self, user_id: Uuid) -> AppResult<Vec<SavedRecipe>> {
        let rows = sqlx::query(
            r"
            SELECT id, user_id, recipe_json, created_at
            FROM saved_recipes
            WHERE user_id = $1
            ORDER BY created_at DESC
            ",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list recipes: {e}")))?;

        rows.iter().map(row_to_saved_recipe).collect()
    }

    /// Delete a saved recipe
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the recipe does not belong to the user
    pub async fn delete(&self, user_id: Uuid, recipe_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM saved_recipes WHERE id = $1 AND user_id = $2")
            .bind(recipe_id.to_string())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete recipe: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Saved recipe {recipe_id}")));
        }
        Ok(())
    }

    /// Replace all saved recipes in one transaction, used by the sync layer
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction fails
    pub async fn replace_all(&self, user_id: Uuid, recipes: &[Recipe]) -> AppResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        sqlx::query("DELETE FROM saved_recipes WHERE user_id = $1")
            .bind(user_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to clear recipes: {e}")))?;

        let now = Utc::now().to_rfc3339();
        for recipe in recipes {
            let recipe_json = serde_json::to_string(recipe)?;
            sqlx::query(
                r"
                INSERT INTO saved_recipes (id, user_id, name, recipe_json, created_at)
                VALUES ($1, $2, $3, $4, $5)
                ",
            )
            .bind(Uuid::new_v4().to_string())
            .bind(user_id.to_string())
            .bind(&recipe.name)
            .bind(&recipe_json)
            .bind(&now)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to insert recipe: {e}")))?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit recipes: {e}")))?;
        Ok(())
    }

    /// Number of saved recipes for a user
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn count(&self, user_id: Uuid) -> AppResult<u64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM saved_recipes WHERE user_id = $1")
                .bind(user_id.to_string())
                .fetch_one(&self.pool)
                .await
                .map_err(|e| AppError::database(format!("Failed to count recipes: {e}")))?;
        Ok(count.unsigned_abs())
    }
}

fn row_to_saved_recipe(row: &SqliteRow) -> AppResult<SavedRecipe> {
    let id_str: String = row
        .try_get("id")
        .map_err(|e| AppError::database(format!("Missing id column: {e}")))?;
    let user_id_str: String = row
        .try_get("user_id")
        .map_err(|e| AppError::database(format!("Missing user_id column: {e}")))?;
    let recipe_json: String = row
        .try_get("recipe_json")
        .map_err(|e| AppError::database(format!("Missing recipe_json column: {e}")))?;
    let created_at_str: String = row
        .try_get("created_at")
        .map_err(|e| AppError::database(format!("Missing created_at column: {e}")))?;

    Ok(SavedRecipe {
        id: Uuid::parse_str(&id_str)
            .map_err(|e| AppError::database(format!("Invalid recipe id in database: {e}")))?,
        user_id: Uuid::parse_str(&user_id_str)
            .map_err(|e| AppError::database(format!("Invalid user id in database: {e}")))?,
        recipe: serde_json::from_str(&recipe_json)?,
        created_at: DateTime::parse_from_rfc3339(&created_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| AppError::database(format!("Invalid timestamp in database: {e}")))?,
    })
}
