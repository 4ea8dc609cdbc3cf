// ABOUTME: Database operations for the persisted per-user shopping list
// ABOUTME: Entries are promoted from plan shopping items and can be marked bought
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::errors::{AppError, AppResult};
use crate::models::{ShoppingItem, ShoppingListEntry};
use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

/// Shopping list database operations manager
pub struct ShoppingManager {
    pool: SqlitePool,
}

impl ShoppingManager {
    /// Create a new shopping manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// List a user's shopping entries, oldest first
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn list(&self, user_id: Uuid) -> AppResult<Vec<ShoppingListEntry>> {
        let rows = sqlx::query(
            r"
            SELECT id, user_id, name, quantity, recipe_name, bought, created_at
            FROM shopping_list
            WHERE user_id = $1
            ORDER BY created_at, name
            ",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list shopping entries: {e}")))?;

        rows.iter().map(row_to_entry).collect()
    }

    /// Append plan shopping items to the persisted list
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction fails
    pub async fn add_items(
        &self,
        user_id: Uuid,
        items: &[ShoppingItem],
    ) -> AppResult<Vec<ShoppingListEntry>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        let now = Utc::now();
        let mut entries = Vec::with_capacity(items.len());
        for item in items {
            let entry = ShoppingListEntry {
                id: Uuid::new_v4(),
                user_id,
                name: item.name.clone(),
                quantity: item.quantity.clone(),
                recipe_name: item.reason.clone(),
                bought: false,
                created_at: now,
            };
            sqlx::query(
                r"
                INSERT INTO shopping_list (
                    id, user_id, name, quantity, recipe_name, bought, created_at
                ) VALUES ($1, $2, $3, $4, $5, $6, $7)
                ",
            )
            .bind(entry.id.to_string())
            .bind(user_id.to_string())
            .bind(&entry.name)
            .bind(&entry.quantity)
            .bind(&entry.recipe_name)
            .bind(entry.bought)
            .bind(now.to_rfc3339())
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to insert shopping entry: {e}")))?;
            entries.push(entry);
        }

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit shopping entries: {e}")))?;
        Ok(entries)
    }

    /// Mark an entry bought or unbought
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the entry does not belong to the user
    pub async fn set_bought(&self, user_id: Uuid, entry_id: Uuid, bought: bool) -> AppResult<()> {
        let result = sqlx::query("UPDATE shopping_list SET bought = $1 WHERE id = $2 AND user_id = $3")
            .bind(bought)
            .bind(entry_id.to_string())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to update shopping entry: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Shopping entry {entry_id}")));
        }
        Ok(())
    }

    /// Remove one entry
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the entry does not belong to the user
    pub async fn remove(&self, user_id: Uuid, entry_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM shopping_list WHERE id = $1 AND user_id = $2")
            .bind(entry_id.to_string())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to remove shopping entry: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Shopping entry {entry_id}")));
        }
        Ok(())
    }

    /// Remove all bought entries
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn clear_bought(&self, user_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM shopping_list WHERE user_id = $1 AND bought = 1")
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to clear bought entries: {e}")))?;
        Ok(result.rows_affected())
    }

    /// Remove every entry for a user
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn clear(&self, user_id: Uuid) -> AppResult<()> {
        sqlx::query("DELETE FROM shopping_list WHERE user_id = $1")
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to clear shopping list: {e}")))?;
        Ok(())
    }
}

fn row_to_entry(row: &SqliteRow) -> AppResult<ShoppingListEntry> {
    let id_str: String = row
        .try_get("id")
        .map_err(|e| AppError::database(format!("Missing id column: {e}")))?;
    let user_id_str: String = row
        .try_get("user_id")
        .map_err(|e| AppError::database(format!("Missing user_id column: {e}")))?;
    let created_at_str: String = row
        .try_get("created_at")
        .map_err(|e| AppError::database(format!("Missing created_at column: {e}")))?;

    Ok(ShoppingListEntry {
        id: Uuid::parse_str(&id_str)
            .map_err(|e| AppError::database(format!("Invalid entry id in database: {e}")))?,
        user_id: Uuid::parse_str(&user_id_str)
            .map_err(|e| AppError::database(format!("Invalid user id in database: {e}")))?,
        name: row
            .try_get("name")
            .map_err(|e| AppError::database(format!("Missing name column: {e}")))?,
        quantity: row
            .try_get("quantity")
            .map_err(|e| AppError::database(format!("Missing quantity column: {e}")))?,
        recipe_name: row
            .try_get("recipe_name")
            .map_err(|e| AppError::database(format!("Missing recipe_name column: {e}")))?,
        bought: row
            .try_get("bought")
            .map_err(|e| AppError::database(format!("Missing bought column: {e}")))?,
        created_at: DateTime::parse_from_rfc3339(&created_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| AppError::database(format!("Invalid timestamp in database: {e}")))?,
    })
}
