// ABOUTME: Database operations for the per-user ingredient inventory
// ABOUTME: Enforces case-insensitive name uniqueness and supports bulk replacement for sync
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::errors::{AppError, AppResult, ErrorCode};
use crate::models::{Ingredient, IngredientCategory};
use chrono::Utc;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

/// Ingredient inventory database operations manager
pub struct InventoryManager {
    pool: SqlitePool,
}

impl InventoryManager {
    /// Create a new inventory manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// List all ingredients for a user, ordered by name
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn list(&self, user_id: Uuid) -> AppResult<Vec<Ingredient>> {
        let rows = sqlx::query(
            r"
            SELECT id, name, category
            FROM ingredients
            WHERE user_id = $1
            ORDER BY name COLLATE NOCASE
            ",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list inventory: {e}")))?;

        rows.iter().map(row_to_ingredient).collect()
    }

    /// Add one ingredient, idempotently under case-insensitive name matching
    ///
    /// Adding "Milk" when "milk" exists is a no-op that returns the stored
    /// row, so re-entering a known ingredient never duplicates it.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn add(&self, user_id: Uuid, ingredient: &Ingredient) -> AppResult<Ingredient> {
        let result = sqlx::query(
            r"
            INSERT OR IGNORE INTO ingredients (id, user_id, name, category, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(ingredient.id.to_string())
        .bind(user_id.to_string())
        .bind(&ingredient.name)
        .bind(ingredient.category.as_str())
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to add ingredient: {e}")))?;

        if result.rows_affected() > 0 {
            return Ok(ingredient.clone());
        }

        self.get_by_name(user_id, &ingredient.name)
            .await?
            .ok_or_else(|| {
                AppError::database(format!(
                    "Ingredient '{}' conflicted but cannot be loaded",
                    ingredient.name
                ))
            })
    }

    /// Look up an ingredient by name, case-insensitively
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn get_by_name(&self, user_id: Uuid, name: &str) -> AppResult<Option<Ingredient>> {
        let row = sqlx::query(
            r"
            SELECT id, name, category
            FROM ingredients
            WHERE user_id = $1 AND name = $2
            ",
        )
        .bind(user_id.to_string())
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to look up ingredient: {e}")))?;

        row.as_ref().map(row_to_ingredient).transpose()
    }

    /// Add several ingredients, skipping names already present (case-insensitive)
    ///
    /// Used by vision recognition, where re-scanning the same fridge must not
    /// produce duplicates. Returns the ingredients that were actually inserted.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn add_missing(
        &self,
        user_id: Uuid,
        ingredients: &[Ingredient],
    ) -> AppResult<Vec<Ingredient>> {
        let mut added = Vec::new();
        for ingredient in ingredients {
            let result = sqlx::query(
                r"
                INSERT OR IGNORE INTO ingredients (id, user_id, name, category, created_at)
                VALUES ($1, $2, $3, $4, $5)
                ",
            )
            .bind(ingredient.id.to_string())
            .bind(user_id.to_string())
            .bind(&ingredient.name)
            .bind(ingredient.category.as_str())
            .bind(Utc::now().to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to add ingredient: {e}")))?;

            if result.rows_affected() > 0 {
                added.push(ingredient.clone());
            }
        }
        Ok(added)
    }

    /// Update an ingredient's name and category
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the ingredient does not belong to the user,
    /// `ResourceAlreadyExists` if the new name collides, or a database error
    pub async fn update(
        &self,
        user_id: Uuid,
        ingredient_id: Uuid,
        name: &str,
        category: IngredientCategory,
    ) -> AppResult<()> {
        let result = sqlx::query(
            r"
            UPDATE ingredients
            SET name = $1, category = $2
            WHERE id = $3 AND user_id = $4
            ",
        )
        .bind(name)
        .bind(category.as_str())
        .bind(ingredient_id.to_string())
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await;

        match result {
            Ok(r) if r.rows_affected() == 0 => {
                Err(AppError::not_found(format!("Ingredient {ingredient_id}")))
            }
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(AppError::new(
                ErrorCode::ResourceAlreadyExists,
                format!("'{name}' is already in the inventory"),
            )),
            Err(e) => Err(AppError::database(format!(
                "Failed to update ingredient: {e}"
            ))),
        }
    }

    /// Remove an ingredient
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the ingredient does not belong to the user
    pub async fn remove(&self, user_id: Uuid, ingredient_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM ingredients WHERE id = $1 AND user_id = $2")
            .bind(ingredient_id.to_string())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to remove ingredient: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Ingredient {ingredient_id}")));
        }
        Ok(())
    }

    /// Replace the entire inventory in one transaction
    ///
    /// The sync layer uses this for imports and debounced whole-list writes.
    /// Duplicate names within the payload keep the first occurrence.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction fails
    pub async fn replace_all(&self, user_id: Uuid, ingredients: &[Ingredient]) -> AppResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        sqlx::query("DELETE FROM ingredients WHERE user_id = $1")
            .bind(user_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to clear inventory: {e}")))?;

        let now = Utc::now().to_rfc3339();
        for ingredient in ingredients {
            sqlx::query(
                r"
                INSERT OR IGNORE INTO ingredients (id, user_id, name, category, created_at)
                VALUES ($1, $2, $3, $4, $5)
                ",
            )
            .bind(ingredient.id.to_string())
            .bind(user_id.to_string())
            .bind(&ingredient.name)
            .bind(ingredient.category.as_str())
            .bind(&now)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to insert ingredient: {e}")))?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit inventory: {e}")))?;
        Ok(())
    }

    /// Number of ingredients in a user's inventory
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn count(&self, user_id: Uuid) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM ingredients WHERE user_id = $1")
            .bind(user_id.to_string())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to count inventory: {e}")))?;
        Ok(count.unsigned_abs())
    }
}

fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(error, sqlx::Error::Database(db) if db.message().contains("UNIQUE constraint failed"))
}

fn row_to_ingredient(row: &SqliteRow) -> AppResult<Ingredient> {
    let id_str: String = row
        .try_get("id")
        .map_err(|e| AppError::database(format!("Missing id column: {e}")))?;
    let category_str: String = row
        .try_get("category")
        .map_err(|e| AppError::database(format!("Missing category column: {e}")))?;

    Ok(Ingredient {
        id: Uuid::parse_str(&id_str)
            .map_err(|e| AppError::database(format!("Invalid ingredient id in database: {e}")))?,
        name: row
            .try_get("name")
            .map_err(|e| AppError::database(format!("Missing name column: {e}")))?,
        category: IngredientCategory::parse(&category_str),
    })
}
