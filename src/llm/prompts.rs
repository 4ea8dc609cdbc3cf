// ABOUTME: Prompt construction and response schemas for plan generation and photo recognition
// ABOUTME: Keeps all LLM-facing text and JSON schema definitions in one place
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Prompts and Response Schemas
//!
//! Builders that turn inventory, family profiles and request options into the
//! system/user prompts sent to the LLM, plus the JSON schemas the responses
//! are constrained to.

use serde_json::{json, Value};
use std::fmt::Write as _;

use crate::intelligence::EnergyNeeds;
use crate::models::{FamilyMember, Ingredient, MealType};

/// System prompt for meal plan generation
pub const PLAN_SYSTEM_PROMPT: &str = "\
You are a practical home-cooking meal planner. You build realistic meal plans \
from the ingredients a household already has, minimizing waste and extra \
shopping. Recipes must be achievable by a busy home cook. Respond only with \
JSON matching the provided schema. Every shopping list item's reason must be \
the exact name of one of the recipes in your response.";

/// System prompt for fridge photo ingredient recognition
pub const RECOGNITION_SYSTEM_PROMPT: &str = "\
You identify food ingredients visible in a photo of a fridge, pantry or \
groceries. List each distinct ingredient once with a category. Ignore \
non-food items, brands and packaging. Respond only with JSON matching the \
provided schema.";

/// Options influencing the plan prompt
#[derive(Debug, Clone, Default)]
pub struct PlanPromptOptions {
    /// Only propose recipes that need no shopping
    pub only_use_inventory: bool,
    /// Restrict recipes to these meal categories (empty = any)
    pub meal_types: Vec<MealType>,
    /// How many recipes to generate
    pub recipe_count: Option<u8>,
    /// Free-form user note ("something quick", "no oven")
    pub note: Option<String>,
}

/// Build the user prompt for plan generation
///
/// Family needs come pre-computed so the model receives concrete calorie
/// targets rather than raw stats it would have to estimate itself.
#[must_use]
pub fn build_plan_prompt(
    inventory: &[Ingredient],
    family: &[(FamilyMember, EnergyNeeds)],
    options: &PlanPromptOptions,
) -> String {
    let mut prompt = String::from("Available ingredients:\n");
    for ingredient in inventory {
        let _ = writeln!(
            prompt,
            "- {} ({})",
            ingredient.name,
            ingredient.category.as_str()
        );
    }

    if family.is_empty() {
        prompt.push_str("\nNo household profiles are available; plan for a general adult.\n");
    } else {
        prompt.push_str("\nHousehold members:\n");
        for (member, needs) in family {
            let _ = writeln!(
                prompt,
                "- {}: {} years old, goal {}, daily target {:.0} kcal{}",
                member.name,
                member.age,
                member.goal.as_str().replace('_', " "),
                needs.target_kcal,
                if member.preferences.is_empty() {
                    String::new()
                } else {
                    format!(", preferences: {}", member.preferences.join(", "))
                }
            );
        }
    }

    let recipe_count = options.recipe_count.unwrap_or(3);
    let _ = writeln!(prompt, "\nGenerate {recipe_count} recipes.");

    if options.only_use_inventory {
        prompt.push_str(
            "Only use ingredients from the list above. Leave missingIngredients and the shopping list empty.\n",
        );
    } else {
        prompt.push_str(
            "Prefer ingredients from the list above; anything else goes into missingIngredients and the shopping list.\n",
        );
    }

    if !options.meal_types.is_empty() {
        let categories: Vec<&str> = options.meal_types.iter().map(MealType::as_str).collect();
        let _ = writeln!(prompt, "Only generate: {}.", categories.join(", "));
    }

    if let Some(note) = &options.note {
        let _ = writeln!(prompt, "Additional request: {note}");
    }

    prompt
}

/// JSON schema for the generated plan
///
/// The shopping list is flat; each item names the recipe it belongs to in
/// `reason` so clients can group it without a nested structure.
#[must_use]
pub fn plan_response_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "summary": {"type": "string"},
            "recipes": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "name": {"type": "string"},
                        "description": {"type": "string"},
                        "prepTimeMinutes": {"type": "integer"},
                        "cookTimeMinutes": {"type": "integer"},
                        "difficulty": {"type": "string", "enum": ["easy", "medium", "hard"]},
                        "ingredientsToUse": {"type": "array", "items": {"type": "string"}},
                        "missingIngredients": {"type": "array", "items": {"type": "string"}},
                        "nutrition": {
                            "type": "object",
                            "properties": {
                                "calories": {"type": "number"},
                                "proteinG": {"type": "number"},
                                "carbsG": {"type": "number"},
                                "fatG": {"type": "number"}
                            },
                            "required": ["calories"]
                        },
                        "instructions": {"type": "array", "items": {"type": "string"}},
                        "mealTypes": {
                            "type": "array",
                            "items": {
                                "type": "string",
                                "enum": ["breakfast", "lunch", "dinner", "snack", "dessert"]
                            }
                        },
                        "familySuitability": {"type": "array", "items": {"type": "string"}}
                    },
                    "required": [
                        "name", "description", "prepTimeMinutes", "cookTimeMinutes",
                        "difficulty", "ingredientsToUse", "missingIngredients",
                        "nutrition", "instructions"
                    ]
                }
            },
            "shoppingList": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "name": {"type": "string"},
                        "quantity": {"type": "string"},
                        "reason": {"type": "string"}
                    },
                    "required": ["name", "quantity", "reason"]
                }
            }
        },
        "required": ["summary", "recipes", "shoppingList"]
    })
}

/// User prompt for fridge photo recognition
#[must_use]
pub fn build_recognition_prompt() -> String {
    "List every distinct food ingredient visible in this photo.".to_owned()
}

/// JSON schema for recognized ingredients
#[must_use]
pub fn recognition_response_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "ingredients": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "name": {"type": "string"},
                        "category": {
                            "type": "string",
                            "enum": ["produce", "dairy", "meat", "pantry", "frozen", "other"]
                        }
                    },
                    "required": ["name", "category"]
                }
            }
        },
        "required": ["ingredients"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ActivityLevel, Gender, IngredientCategory, NutritionGoal};
    use uuid::Uuid;

    fn member(name: &str) -> FamilyMember {
        FamilyMember {
            id: Uuid::new_v4(),
            name: name.into(),
            age: 30,
            gender: Gender::Male,
            height_cm: 180.0,
            weight_kg: 80.0,
            activity_level: ActivityLevel::ModeratelyActive,
            goal: NutritionGoal::Maintain,
            preferences: vec!["no cilantro".into()],
            deadline: None,
        }
    }

    #[test]
    fn test_plan_prompt_includes_inventory_and_targets() {
        let inventory = vec![Ingredient::new("Eggs", IngredientCategory::Dairy)];
        let m = member("Alex");
        let needs = EnergyNeeds::for_member(&m).unwrap();
        let prompt = build_plan_prompt(
            &inventory,
            &[(m, needs)],
            &PlanPromptOptions::default(),
        );
        assert!(prompt.contains("Eggs"));
        assert!(prompt.contains("Alex"));
        assert!(prompt.contains("2759"));
        assert!(prompt.contains("no cilantro"));
    }

    #[test]
    fn test_inventory_only_flag_changes_instructions() {
        let inventory = vec![Ingredient::new("Rice", IngredientCategory::Pantry)];
        let options = PlanPromptOptions {
            only_use_inventory: true,
            ..Default::default()
        };
        let prompt = build_plan_prompt(&inventory, &[], &options);
        assert!(prompt.contains("Only use ingredients"));
        assert!(prompt.contains("general adult"));
    }

    #[test]
    fn test_plan_schema_requires_flat_shopping_list() {
        let schema = plan_response_schema();
        assert_eq!(schema["properties"]["shoppingList"]["type"], "array");
        let required = schema["required"].as_array().unwrap();
        assert!(required.iter().any(|v| v == "shoppingList"));
    }
}
