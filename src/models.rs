// ABOUTME: Core domain models for users, inventory, family profiles and generated plans
// ABOUTME: Serde representations match the JSON exchanged with clients and the LLM schema
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Data Models
//!
//! Domain data structures shared across database managers, the planner, and HTTP
//! routes. AI-facing types (`Recipe`, `ChefPlan`, `ShoppingItem`) serialize as
//! camelCase because the same shapes appear in the LLM response schema.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Users
// ============================================================================

/// A registered account (one per household)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: Uuid,
    /// Email address (unique)
    pub email: String,
    /// Optional display name
    pub display_name: Option<String>,
    /// Bcrypt password hash
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Whether the subscription flag has been set by a verified payment event
    pub is_subscribed: bool,
    /// Whether the one-time local-to-hosted migration has already run
    pub local_migrated: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last activity timestamp
    pub last_active: DateTime<Utc>,
}

impl User {
    /// Create a new user with a fresh id
    #[must_use]
    pub fn new(email: String, password_hash: String, display_name: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email,
            display_name,
            password_hash,
            is_subscribed: false,
            local_migrated: false,
            created_at: now,
            last_active: now,
        }
    }
}

// ============================================================================
// Inventory
// ============================================================================

/// Category an inventory ingredient belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum IngredientCategory {
    /// Fruit and vegetables
    Produce,
    /// Milk, cheese, yogurt
    Dairy,
    /// Meat, poultry, fish
    Meat,
    /// Shelf-stable goods
    Pantry,
    /// Frozen goods
    Frozen,
    /// Anything else
    #[default]
    Other,
}

impl IngredientCategory {
    /// Convert to database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Produce => "produce",
            Self::Dairy => "dairy",
            Self::Meat => "meat",
            Self::Pantry => "pantry",
            Self::Frozen => "frozen",
            Self::Other => "other",
        }
    }

    /// Parse from database string representation
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "produce" => Self::Produce,
            "dairy" => Self::Dairy,
            "meat" => Self::Meat,
            "pantry" => Self::Pantry,
            "frozen" => Self::Frozen,
            _ => Self::Other,
        }
    }
}

/// One ingredient in a household's inventory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ingredient {
    /// Unique identifier
    pub id: Uuid,
    /// Display name; unique per inventory, case-insensitive
    pub name: String,
    /// Category for grouping
    pub category: IngredientCategory,
}

impl Ingredient {
    /// Create a new ingredient with a fresh id
    #[must_use]
    pub fn new(name: impl Into<String>, category: IngredientCategory) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            category,
        }
    }
}

// ============================================================================
// Family
// ============================================================================

/// Gender used for BMR calculation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    /// Male (higher BMR constant)
    Male,
    /// Female (lower BMR constant)
    Female,
}

impl Gender {
    /// Convert to database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
        }
    }

    /// Parse from database string representation
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "male" | "m" => Self::Male,
            _ => Self::Female,
        }
    }
}

/// Weekly activity level used for the TDEE multiplier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    /// Little or no exercise
    Sedentary,
    /// Exercise 1-3 days/week
    LightlyActive,
    /// Exercise 3-5 days/week
    #[default]
    ModeratelyActive,
    /// Exercise 6-7 days/week
    VeryActive,
    /// Hard training twice a day
    ExtraActive,
}

impl ActivityLevel {
    /// Convert to database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Sedentary => "sedentary",
            Self::LightlyActive => "lightly_active",
            Self::ModeratelyActive => "moderately_active",
            Self::VeryActive => "very_active",
            Self::ExtraActive => "extra_active",
        }
    }

    /// Parse from database string representation
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "sedentary" => Self::Sedentary,
            "lightly_active" => Self::LightlyActive,
            "very_active" => Self::VeryActive,
            "extra_active" => Self::ExtraActive,
            _ => Self::ModeratelyActive,
        }
    }
}

/// Nutritional goal for a family member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NutritionGoal {
    /// Caloric deficit
    LoseWeight,
    /// Caloric balance
    #[default]
    Maintain,
    /// Caloric surplus
    GainMuscle,
}

impl NutritionGoal {
    /// Convert to database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::LoseWeight => "lose_weight",
            Self::Maintain => "maintain",
            Self::GainMuscle => "gain_muscle",
        }
    }

    /// Parse from database string representation
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "lose_weight" => Self::LoseWeight,
            "gain_muscle" => Self::GainMuscle,
            _ => Self::Maintain,
        }
    }
}

/// A household member whose goals shape the generated plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FamilyMember {
    /// Unique identifier
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// Age in years
    pub age: u32,
    /// Gender for BMR
    pub gender: Gender,
    /// Height in centimeters
    pub height_cm: f64,
    /// Weight in kilograms
    pub weight_kg: f64,
    /// Weekly activity level
    pub activity_level: ActivityLevel,
    /// Nutritional goal
    pub goal: NutritionGoal,
    /// Free-form dietary preferences and restrictions
    #[serde(default)]
    pub preferences: Vec<String>,
    /// Optional goal deadline
    pub deadline: Option<NaiveDate>,
}

// ============================================================================
// Plans & Recipes (AI-facing shapes, camelCase on the wire)
// ============================================================================

/// Recipe difficulty as produced by the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Minimal prep, few steps
    Easy,
    /// Some technique required
    #[default]
    Medium,
    /// Involved preparation
    Hard,
}

/// Meal category a recipe fits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    /// Morning meal
    Breakfast,
    /// Midday meal
    Lunch,
    /// Evening meal
    Dinner,
    /// Between-meal snack
    Snack,
    /// Sweet course
    Dessert,
}

impl MealType {
    /// Names as they appear in prompts and query parameters
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Breakfast => "breakfast",
            Self::Lunch => "lunch",
            Self::Dinner => "dinner",
            Self::Snack => "snack",
            Self::Dessert => "dessert",
        }
    }

    /// Parse from a query-parameter string
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "breakfast" => Some(Self::Breakfast),
            "lunch" => Some(Self::Lunch),
            "dinner" => Some(Self::Dinner),
            "snack" => Some(Self::Snack),
            "dessert" => Some(Self::Dessert),
            _ => None,
        }
    }
}

/// Nutrition summary for one recipe serving
///
/// Calories are always present; the macro breakdown is optional because older
/// generated payloads omit it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeNutrition {
    /// Calories per serving (kcal)
    pub calories: f64,
    /// Protein grams per serving
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protein_g: Option<f64>,
    /// Carbohydrate grams per serving
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carbs_g: Option<f64>,
    /// Fat grams per serving
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fat_g: Option<f64>,
}

/// One AI-generated recipe; immutable once generated
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    /// Recipe name; shopping item reasons cross-reference this
    pub name: String,
    /// Short description
    pub description: String,
    /// Preparation time in minutes
    pub prep_time_minutes: u32,
    /// Cooking time in minutes
    pub cook_time_minutes: u32,
    /// Difficulty rating
    #[serde(default)]
    pub difficulty: Difficulty,
    /// Inventory ingredients this recipe uses
    pub ingredients_to_use: Vec<String>,
    /// Ingredients that must be bought
    #[serde(default)]
    pub missing_ingredients: Vec<String>,
    /// Per-serving nutrition
    pub nutrition: RecipeNutrition,
    /// Step-by-step instructions
    pub instructions: Vec<String>,
    /// Meal categories this recipe fits
    #[serde(default)]
    pub meal_types: Vec<MealType>,
    /// Names of family members this recipe suits and why
    #[serde(default)]
    pub family_suitability: Vec<String>,
    /// Optional photo found via image search (never model-generated)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

/// One item on the plan's flat shopping list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingItem {
    /// Item to buy
    pub name: String,
    /// Quantity description ("2 lbs", "1 bunch")
    pub quantity: String,
    /// Name of the recipe requiring the item
    pub reason: String,
}

/// Root object returned by one generation call; ephemeral unless saved
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChefPlan {
    /// Plan-level summary text
    pub summary: String,
    /// Generated recipes
    pub recipes: Vec<Recipe>,
    /// Flat shopping list across all recipes
    pub shopping_list: Vec<ShoppingItem>,
}

/// A recipe the user chose to keep
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedRecipe {
    /// Database-assigned identifier
    pub id: Uuid,
    /// Owning user
    pub user_id: Uuid,
    /// The immutable generated recipe payload
    pub recipe: Recipe,
    /// When the recipe was saved
    pub created_at: DateTime<Utc>,
}

/// A shopping item promoted into the persisted per-user shopping list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShoppingListEntry {
    /// Database-assigned identifier
    pub id: Uuid,
    /// Owning user
    pub user_id: Uuid,
    /// Item to buy
    pub name: String,
    /// Quantity description
    pub quantity: String,
    /// Recipe this item belongs to
    pub recipe_name: String,
    /// Whether the item has been bought
    pub bought: bool,
    /// When the entry was created
    pub created_at: DateTime<Utc>,
}
