// ABOUTME: Database connection management and schema migrations for the fridge datastore
// ABOUTME: Exposes per-domain managers that share one SQLite connection pool
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Database Management
//!
//! SQLite-backed storage for users, inventory, family profiles, saved recipes,
//! and the persisted shopping list. Each domain gets its own manager; all of
//! them share the pool owned by [`Database`].

use crate::errors::{AppError, AppResult};
use sqlx::SqlitePool;

pub mod family;
pub mod inventory;
pub mod recipes;
pub mod shopping;
pub mod users;

pub use family::FamilyManager;
pub use inventory::InventoryManager;
pub use recipes::RecipesManager;
pub use shopping::ShoppingManager;
pub use users::UserManager;

/// Database manager owning the connection pool
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Create a new database connection and run migrations
    ///
    /// # Errors
    ///
    /// Returns an error if the connection fails or a migration statement fails
    pub async fn new(database_url: &str) -> AppResult<Self> {
        // Ensure SQLite creates the database file if it doesn't exist
        let connection_options = if database_url.starts_with("sqlite:") {
            format!("{database_url}?mode=rwc")
        } else {
            database_url.to_string()
        };

        let pool = SqlitePool::connect(&connection_options)
            .await
            .map_err(|e| AppError::database(format!("Failed to connect to database: {e}")))?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Run database migrations
    ///
    /// # Errors
    ///
    /// Returns an error if any schema statement fails
    pub async fn migrate(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                email TEXT UNIQUE NOT NULL,
                display_name TEXT,
                password_hash TEXT NOT NULL,
                is_subscribed INTEGER NOT NULL DEFAULT 0,
                local_migrated INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                last_active TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create users table: {e}")))?;

        // Ingredient names are unique per user, case-insensitively
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS ingredients (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                name TEXT NOT NULL COLLATE NOCASE,
                category TEXT NOT NULL,
                created_at TEXT NOT NULL,
                UNIQUE (user_id, name),
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create ingredients table: {e}")))?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS family_members (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                name TEXT NOT NULL,
                age INTEGER NOT NULL,
                gender TEXT NOT NULL,
                height_cm REAL NOT NULL,
                weight_kg REAL NOT NULL,
                activity_level TEXT NOT NULL,
                goal TEXT NOT NULL,
                preferences TEXT NOT NULL DEFAULT '[]',
                deadline TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create family_members table: {e}")))?;

        // Recipes are immutable generated payloads, stored as JSON
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS saved_recipes (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                name TEXT NOT NULL,
                recipe_json TEXT NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create saved_recipes table: {e}")))?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS shopping_list (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                name TEXT NOT NULL,
                quantity TEXT NOT NULL,
                recipe_name TEXT NOT NULL,
                bought INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create shopping_list table: {e}")))?;

        Ok(())
    }

    /// User account operations
    #[must_use]
    pub fn users(&self) -> UserManager {
        UserManager::new(self.pool.clone())
    }

    /// Ingredient inventory operations
    #[must_use]
    pub fn inventory(&self) -> InventoryManager {
        InventoryManager::new(self.pool.clone())
    }

    /// Family member profile operations
    #[must_use]
    pub fn family(&self) -> FamilyManager {
        FamilyManager::new(self.pool.clone())
    }

    /// Saved recipe operations
    #[must_use]
    pub fn recipes(&self) -> RecipesManager {
        RecipesManager::new(self.pool.clone())
    }

    /// Persisted shopping list operations
    #[must_use]
    pub fn shopping(&self) -> ShoppingManager {
        ShoppingManager::new(self.pool.clone())
    }

    /// Access the underlying pool, mainly for tests
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
