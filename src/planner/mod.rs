// ABOUTME: Meal plan generation pipeline from inventory and family profiles to a ChefPlan
// ABOUTME: Validates inputs before any LLM call and parses schema-constrained JSON responses
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Meal Planner
//!
//! Turns the household's inventory and family profiles into a generated plan.
//! Validation happens before any tokens are spent: an empty inventory is a
//! hard rejection, an empty family list only downgrades personalization.
//!
//! Responses are parsed tolerantly. Providers in JSON mode normally return a
//! clean document, but some wrap it in a markdown code fence; the parser
//! strips that before deserializing. Anything that still fails to parse
//! surfaces as a generation error, never a panic.

pub mod shopping;

pub use shopping::{derive_shopping_list, ShoppingSelection};

use std::sync::Arc;

use tracing::{info, warn};

use crate::errors::{AppError, AppResult};
use crate::intelligence::EnergyNeeds;
use crate::llm::prompts::{
    build_plan_prompt, plan_response_schema, PlanPromptOptions, PLAN_SYSTEM_PROMPT,
};
use crate::llm::{ChatMessage, ChatRequest, LlmProvider};
use crate::models::{ChefPlan, FamilyMember, Ingredient};

/// Maximum tokens for a plan generation response
const PLAN_MAX_TOKENS: u32 = 8192;

/// Meal plan generator backed by a configured LLM provider
pub struct MealPlanner {
    provider: Arc<dyn LlmProvider>,
    model: Option<String>,
    temperature: Option<f32>,
}

impl MealPlanner {
    /// Create a planner using the provider's default model
    #[must_use]
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self {
            provider,
            model: None,
            temperature: None,
        }
    }

    /// Override the model used for generation
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Override the sampling temperature
    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Generate a meal plan from the current inventory and family profiles
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the inventory is empty (checked before any
    /// outbound call), `GenerationFailed` if the model's output cannot be
    /// parsed, or the provider's error for transport and quota failures
    pub async fn generate(
        &self,
        inventory: &[Ingredient],
        family: &[FamilyMember],
        options: &PlanPromptOptions,
    ) -> AppResult<ChefPlan> {
        if inventory.is_empty() {
            return Err(AppError::invalid_input(
                "Cannot generate a plan from an empty inventory. Add some ingredients first.",
            ));
        }

        if family.is_empty() {
            warn!("No family profiles found; generating an unpersonalized plan");
        }

        // Members with out-of-range stats are skipped rather than failing the
        // whole request; their profile can be fixed independently.
        let family_needs: Vec<(FamilyMember, EnergyNeeds)> = family
            .iter()
            .filter_map(|member| match EnergyNeeds::for_member(member) {
                Ok(needs) => Some((member.clone(), needs)),
                Err(e) => {
                    warn!(member = %member.name, error = %e, "Skipping member with invalid stats");
                    None
                }
            })
            .collect();

        let prompt = build_plan_prompt(inventory, &family_needs, options);
        let mut request = ChatRequest::new(vec![
            ChatMessage::system(PLAN_SYSTEM_PROMPT),
            ChatMessage::user(prompt),
        ])
        .with_max_tokens(PLAN_MAX_TOKENS)
        .with_response_schema(plan_response_schema());

        if let Some(model) = &self.model {
            request = request.with_model(model.clone());
        }
        if let Some(temperature) = self.temperature {
            request = request.with_temperature(temperature);
        }

        let response = self.provider.complete(&request).await?;
        let plan = parse_plan_json(&response.content)?;
        check_shopping_references(&plan);

        info!(
            recipes = plan.recipes.len(),
            shopping_items = plan.shopping_list.len(),
            "Generated meal plan"
        );

        Ok(plan)
    }
}

/// Parse a plan from raw model output, tolerating markdown code fences
///
/// # Errors
///
/// Returns `GenerationFailed` if no JSON document can be extracted or it does
/// not match the plan shape
pub fn parse_plan_json(raw: &str) -> AppResult<ChefPlan> {
    let json_text = extract_json(raw);
    serde_json::from_str(json_text).map_err(|e| {
        warn!(error = %e, "Model returned malformed plan JSON");
        AppError::generation_failed(format!("Model returned malformed plan JSON: {e}"))
    })
}

/// Strip surrounding markdown fences and any text outside the outermost braces
fn extract_json(raw: &str) -> &str {
    let trimmed = raw.trim();
    let start = trimmed.find('{');
    let end = trimmed.rfind('}');
    match (start, end) {
        (Some(start), Some(end)) if start < end => &trimmed[start..=end],
        _ => trimmed,
    }
}

/// Warn about shopping items whose reason names no generated recipe
///
/// The schema asks for exact recipe names but models occasionally drift;
/// items are kept so the user still sees what to buy.
fn check_shopping_references(plan: &ChefPlan) {
    for item in &plan.shopping_list {
        if !plan.recipes.iter().any(|r| r.name == item.reason) {
            warn!(
                item = %item.name,
                reason = %item.reason,
                "Shopping item references an unknown recipe"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;
    use crate::llm::{ChatResponse, LlmCapabilities};
    use crate::models::IngredientCategory;
    use async_trait::async_trait;

    const PLAN_JSON: &str = r#"{
        "summary": "Two easy dinners",
        "recipes": [{
            "name": "Fried Rice",
            "description": "Weeknight staple",
            "prepTimeMinutes": 10,
            "cookTimeMinutes": 15,
            "difficulty": "easy",
            "ingredientsToUse": ["rice", "eggs"],
            "missingIngredients": ["soy sauce"],
            "nutrition": {"calories": 550, "proteinG": 18},
            "instructions": ["Cook rice", "Fry everything"]
        }],
        "shoppingList": [
            {"name": "soy sauce", "quantity": "1 bottle", "reason": "Fried Rice"}
        ]
    }"#;

    struct FakeProvider {
        response: String,
    }

    #[async_trait]
    impl LlmProvider for FakeProvider {
        fn name(&self) -> &'static str {
            "fake"
        }
        fn display_name(&self) -> &'static str {
            "Fake"
        }
        fn capabilities(&self) -> LlmCapabilities {
            LlmCapabilities::full_featured()
        }
        fn default_model(&self) -> &str {
            "fake-1"
        }
        async fn complete(&self, _request: &ChatRequest) -> Result<ChatResponse, AppError> {
            Ok(ChatResponse {
                content: self.response.clone(),
                model: "fake-1".into(),
                usage: None,
                finish_reason: Some("stop".into()),
            })
        }
        async fn health_check(&self) -> Result<(), AppError> {
            Ok(())
        }
    }

    fn planner(response: &str) -> MealPlanner {
        MealPlanner::new(Arc::new(FakeProvider {
            response: response.to_owned(),
        }))
    }

    #[tokio::test]
    async fn test_empty_inventory_rejected_before_call() {
        let result = planner(PLAN_JSON)
            .generate(&[], &[], &PlanPromptOptions::default())
            .await;
        let err = result.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);
    }

    #[tokio::test]
    async fn test_plan_generation_parses_response() {
        let inventory = vec![
            Ingredient::new("rice", IngredientCategory::Pantry),
            Ingredient::new("eggs", IngredientCategory::Dairy),
        ];
        let plan = planner(PLAN_JSON)
            .generate(&inventory, &[], &PlanPromptOptions::default())
            .await
            .unwrap();
        assert_eq!(plan.recipes.len(), 1);
        assert_eq!(plan.shopping_list[0].reason, "Fried Rice");
    }

    #[tokio::test]
    async fn test_malformed_response_is_generation_error() {
        let inventory = vec![Ingredient::new("rice", IngredientCategory::Pantry)];
        let result = planner("I couldn't think of any recipes, sorry!")
            .generate(&inventory, &[], &PlanPromptOptions::default())
            .await;
        let err = result.unwrap_err();
        assert_eq!(err.code, ErrorCode::GenerationFailed);
    }

    #[test]
    fn test_parse_strips_markdown_fence() {
        let fenced = format!("```json\n{PLAN_JSON}\n```");
        let plan = parse_plan_json(&fenced).unwrap();
        assert_eq!(plan.summary, "Two easy dinners");
    }

    #[test]
    fn test_parse_tolerates_leading_prose() {
        let noisy = format!("Here is your plan:\n{PLAN_JSON}");
        assert!(parse_plan_json(&noisy).is_ok());
    }
}
