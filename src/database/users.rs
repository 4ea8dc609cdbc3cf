// ABOUTME: Database operations for user accounts, subscription state and migration flags
// ABOUTME: Backs registration, login, the payment webhook and the one-time local sync
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::errors::{AppError, AppResult, ErrorCode};
use crate::models::User;
use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

/// User account database operations manager
pub struct UserManager {
    pool: SqlitePool,
}

impl UserManager {
    /// Create a new user manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new user account
    ///
    /// # Errors
    ///
    /// Returns `ResourceAlreadyExists` if the email is taken, or a database error
    pub async fn create(&self, user: &User) -> AppResult<()> {
        let result = sqlx::query(
            r"
            INSERT INTO users (
                id, email, display_name, password_hash, is_subscribed,
                local_migrated, created_at, last_active
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ",
        )
        .bind(user.id.to_string())
        .bind(&user.email)
        .bind(&user.display_name)
        .bind(&user.password_hash)
        .bind(user.is_subscribed)
        .bind(user.local_migrated)
        .bind(user.created_at.to_rfc3339())
        .bind(user.last_active.to_rfc3339())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(AppError::new(
                ErrorCode::ResourceAlreadyExists,
                format!("An account with email '{}' already exists", user.email),
            )),
            Err(e) => Err(AppError::database(format!("Failed to create user: {e}"))),
        }
    }

    /// Look up a user by email (for login)
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn get_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let row = sqlx::query(
            r"
            SELECT id, email, display_name, password_hash, is_subscribed,
                   local_migrated, created_at, last_active
            FROM users
            WHERE email = $1
            ",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get user by email: {e}")))?;

        row.map(|r| row_to_user(&r)).transpose()
    }

    /// Look up a user by id (for authenticated requests)
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn get(&self, user_id: Uuid) -> AppResult<Option<User>> {
        let row = sqlx::query(
            r"
            SELECT id, email, display_name, password_hash, is_subscribed,
                   local_migrated, created_at, last_active
            FROM users
            WHERE id = $1
            ",
        )
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get user: {e}")))?;

        row.map(|r| row_to_user(&r)).transpose()
    }

    /// Update the last-active timestamp
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn touch_last_active(&self, user_id: Uuid) -> AppResult<()> {
        sqlx::query("UPDATE users SET last_active = $1 WHERE id = $2")
            .bind(Utc::now().to_rfc3339())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to update last_active: {e}")))?;
        Ok(())
    }

    /// Set the subscription flag, called only from the verified payment webhook
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if no such user exists, or a database error
    pub async fn set_subscribed(&self, user_id: Uuid, subscribed: bool) -> AppResult<()> {
        let result = sqlx::query("UPDATE users SET is_subscribed = $1 WHERE id = $2")
            .bind(subscribed)
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to update subscription: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("User {user_id}")));
        }
        Ok(())
    }

    /// Mark the one-time local data migration as completed
    ///
    /// Returns `true` if the flag was newly set, `false` if it was already set.
    /// The compare-and-set in SQL keeps concurrent sync calls from importing twice.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn mark_local_migrated(&self, user_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE users SET local_migrated = 1 WHERE id = $1 AND local_migrated = 0",
        )
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to set migration flag: {e}")))?;

        Ok(result.rows_affected() > 0)
    }
}

/// Detect the SQLite unique-constraint violation for friendlier conflict errors
fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(error, sqlx::Error::Database(db) if db.message().contains("UNIQUE constraint failed"))
}

fn row_to_user(row: &SqliteRow) -> AppResult<User> {
    let id_str: String = row
        .try_get("id")
        .map_err(|e| AppError::database(format!("Missing id column: {e}")))?;
    let created_at_str: String = row
        .try_get("created_at")
        .map_err(|e| AppError::database(format!("Missing created_at column: {e}")))?;
    let last_active_str: String = row
        .try_get("last_active")
        .map_err(|e| AppError::database(format!("Missing last_active column: {e}")))?;

    Ok(User {
        id: Uuid::parse_str(&id_str)
            .map_err(|e| AppError::database(format!("Invalid user id in database: {e}")))?,
        email: row
            .try_get("email")
            .map_err(|e| AppError::database(format!("Missing email column: {e}")))?,
        display_name: row
            .try_get("display_name")
            .map_err(|e| AppError::database(format!("Missing display_name column: {e}")))?,
        password_hash: row
            .try_get("password_hash")
            .map_err(|e| AppError::database(format!("Missing password_hash column: {e}")))?,
        is_subscribed: row
            .try_get("is_subscribed")
            .map_err(|e| AppError::database(format!("Missing is_subscribed column: {e}")))?,
        local_migrated: row
            .try_get("local_migrated")
            .map_err(|e| AppError::database(format!("Missing local_migrated column: {e}")))?,
        created_at: parse_timestamp(&created_at_str)?,
        last_active: parse_timestamp(&last_active_str)?,
    })
}

fn parse_timestamp(s: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AppError::database(format!("Invalid timestamp in database: {e}")))
}
