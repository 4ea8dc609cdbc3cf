// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides common database and user creation helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::module_name_repetitions
)]

//! Shared test utilities for `chef_fridge` integration tests.

use anyhow::Result;
use std::sync::Once;

use chef_fridge::{
    database::Database,
    models::{
        ActivityLevel, Difficulty, FamilyMember, Gender, NutritionGoal, Recipe, RecipeNutrition,
        User,
    },
};
use uuid::Uuid;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Standard test database setup over in-memory SQLite
pub async fn create_test_database() -> Result<Database> {
    init_test_logging();
    let database = Database::new("sqlite::memory:").await?;
    Ok(database)
}

/// Create and persist a test user, returning it
pub async fn create_test_user(database: &Database) -> Result<User> {
    let unique = Uuid::new_v4().simple().to_string();
    let user = User::new(
        format!("test_{unique}@example.com"),
        "hashed_password_123".into(),
        Some("Test User".into()),
    );
    database.users().create(&user).await?;
    Ok(user)
}

/// A family member with the reference stats (male, 80kg, 180cm, 30y)
pub fn reference_member() -> FamilyMember {
    FamilyMember {
        id: Uuid::new_v4(),
        name: "Alex".into(),
        age: 30,
        gender: Gender::Male,
        height_cm: 180.0,
        weight_kg: 80.0,
        activity_level: ActivityLevel::ModeratelyActive,
        goal: NutritionGoal::Maintain,
        preferences: vec![],
        deadline: None,
    }
}

/// A minimal recipe payload for persistence tests
pub fn sample_recipe(name: &str) -> Recipe {
    Recipe {
        name: name.into(),
        description: "A test recipe".into(),
        prep_time_minutes: 10,
        cook_time_minutes: 20,
        difficulty: Difficulty::Easy,
        ingredients_to_use: vec!["eggs".into()],
        missing_ingredients: vec![],
        nutrition: RecipeNutrition {
            calories: 450.0,
            protein_g: Some(20.0),
            carbs_g: None,
            fat_g: None,
        },
        instructions: vec!["Cook it".into()],
        meal_types: vec![],
        family_suitability: vec![],
        photo_url: None,
    }
}
