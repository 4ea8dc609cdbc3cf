// ABOUTME: Database operations for family member profiles used to personalize plans
// ABOUTME: Stores physical stats, activity level, goals and dietary preferences
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::errors::{AppError, AppResult};
use crate::models::{ActivityLevel, FamilyMember, Gender, NutritionGoal};
use chrono::{NaiveDate, Utc};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

/// Family member database operations manager
pub struct FamilyManager {
    pool: SqlitePool,
}

impl FamilyManager {
    /// Create a new family manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// List all family members for a user
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn list(&self, user_id: Uuid) -> AppResult<Vec<FamilyMember>> {
        let rows = sqlx::query(
            r"
            SELECT id, name, age, gender, height_cm, weight_kg,
                   activity_level, goal, preferences, deadline
            FROM family_members
            WHERE user_id = $1
            ORDER BY created_at
            ",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list family members: {e}")))?;

        rows.iter().map(row_to_member).collect()
    }

    /// Get one family member
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn get(&self, user_id: Uuid, member_id: Uuid) -> AppResult<Option<FamilyMember>> {
        let row = sqlx::query(
            r"
            SELECT id, name, age, gender, height_cm, weight_kg,
                   activity_level, goal, preferences, deadline
            FROM family_members
            WHERE id = $1 AND user_id = $2
            ",
        )
        .bind(member_id.to_string())
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get family member: {e}")))?;

        row.map(|r| row_to_member(&r)).transpose()
    }

    /// Create a family member
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn create(&self, user_id: Uuid, member: &FamilyMember) -> AppResult<()> {
        let now = Utc::now().to_rfc3339();
        let preferences_json = serde_json::to_string(&member.preferences)?;

        sqlx::query(
            r"
            INSERT INTO family_members (
                id, user_id, name, age, gender, height_cm, weight_kg,
                activity_level, goal, preferences, deadline, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $12)
            ",
        )
        .bind(member.id.to_string())
        .bind(user_id.to_string())
        .bind(&member.name)
        .bind(i64::from(member.age))
        .bind(member.gender.as_str())
        .bind(member.height_cm)
        .bind(member.weight_kg)
        .bind(member.activity_level.as_str())
        .bind(member.goal.as_str())
        .bind(&preferences_json)
        .bind(member.deadline.map(|d| d.to_string()))
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create family member: {e}")))?;
        Ok(())
    }

    /// Update a family member's profile
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the member does not belong to the user
    pub async fn update(&self, user_id: Uuid, member: &FamilyMember) -> AppResult<()> {
        let preferences_json = serde_json::to_string(&member.preferences)?;

        let result = sqlx::query(
            r"
            UPDATE family_members
            SET name = $1, age = $2, gender = $3, height_cm = $4, weight_kg = $5,
                activity_level = $6, goal = $7, preferences = $8, deadline = $9,
                updated_at = $10
            WHERE id = $11 AND user_id = $12
            ",
        )
        .bind(&member.name)
        .bind(i64::from(member.age))
        .bind(member.gender.as_str())
        .bind(member.height_cm)
        .bind(member.weight_kg)
        .bind(member.activity_level.as_str())
        .bind(member.goal.as_str())
        .bind(&preferences_json)
        .bind(member.deadline.map(|d| d.to_string()))
        .bind(Utc::now().to_rfc3339())
        .bind(member.id.to_string())
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update family member: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Family member {}", member.id)));
        }
        Ok(())
    }

    /// Delete a family member
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the member does not belong to the user
    pub async fn delete(&self, user_id: Uuid, member_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM family_members WHERE id = $1 AND user_id = $2")
            .bind(member_id.to_string())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete family member: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Family member {member_id}")));
        }
        Ok(())
    }

    /// Replace all family members in one transaction, used by the sync layer
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction fails
    pub async fn replace_all(&self, user_id: Uuid, members: &[FamilyMember]) -> AppResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        sqlx::query("DELETE FROM family_members WHERE user_id = $1")
            .bind(user_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to clear family members: {e}")))?;

        let now = Utc::now().to_rfc3339();
        for member in members {
            let preferences_json = serde_json::to_string(&member.preferences)?;
            sqlx::query(
                r"
                INSERT INTO family_members (
                    id, user_id, name, age, gender, height_cm, weight_kg,
                    activity_level, goal, preferences, deadline, created_at, updated_at
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $12)
                ",
            )
            .bind(member.id.to_string())
            .bind(user_id.to_string())
            .bind(&member.name)
            .bind(i64::from(member.age))
            .bind(member.gender.as_str())
            .bind(member.height_cm)
            .bind(member.weight_kg)
            .bind(member.activity_level.as_str())
            .bind(member.goal.as_str())
            .bind(&preferences_json)
            .bind(member.deadline.map(|d| d.to_string()))
            .bind(&now)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to insert family member: {e}")))?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit family members: {e}")))?;
        Ok(())
    }
}

#[allow(clippy::cast_sign_loss)]
fn row_to_member(row: &SqliteRow) -> AppResult<FamilyMember> {
    let id_str: String = row
        .try_get("id")
        .map_err(|e| AppError::database(format!("Missing id column: {e}")))?;
    let gender_str: String = row
        .try_get("gender")
        .map_err(|e| AppError::database(format!("Missing gender column: {e}")))?;
    let activity_str: String = row
        .try_get("activity_level")
        .map_err(|e| AppError::database(format!("Missing activity_level column: {e}")))?;
    let goal_str: String = row
        .try_get("goal")
        .map_err(|e| AppError::database(format!("Missing goal column: {e}")))?;
    let preferences_json: String = row
        .try_get("preferences")
        .map_err(|e| AppError::database(format!("Missing preferences column: {e}")))?;
    let age: i64 = row
        .try_get("age")
        .map_err(|e| AppError::database(format!("Missing age column: {e}")))?;
    let deadline_str: Option<String> = row
        .try_get("deadline")
        .map_err(|e| AppError::database(format!("Missing deadline column: {e}")))?;

    Ok(FamilyMember {
        id: Uuid::parse_str(&id_str)
            .map_err(|e| AppError::database(format!("Invalid member id in database: {e}")))?,
        name: row
            .try_get("name")
            .map_err(|e| AppError::database(format!("Missing name column: {e}")))?,
        age: u32::try_from(age).unwrap_or(0),
        gender: Gender::parse(&gender_str),
        height_cm: row
            .try_get("height_cm")
            .map_err(|e| AppError::database(format!("Missing height_cm column: {e}")))?,
        weight_kg: row
            .try_get("weight_kg")
            .map_err(|e| AppError::database(format!("Missing weight_kg column: {e}")))?,
        activity_level: ActivityLevel::parse(&activity_str),
        goal: NutritionGoal::parse(&goal_str),
        preferences: serde_json::from_str(&preferences_json)?,
        deadline: deadline_str.and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()),
    })
}
