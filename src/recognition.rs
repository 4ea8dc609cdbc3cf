// ABOUTME: Fridge photo ingredient recognition using a vision-capable LLM provider
// ABOUTME: Recognized items are deduplicated against the existing inventory case-insensitively
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Ingredient Recognition
//!
//! Turns a photo of a fridge or groceries into inventory ingredients. The
//! provider must support vision input; non-vision providers reject the
//! request up front. Re-scanning the same fridge is expected, so results are
//! filtered against what the inventory already holds.

use std::collections::HashSet;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::Deserialize;
use tracing::{info, warn};

use crate::errors::{AppError, AppResult};
use crate::llm::prompts::{
    build_recognition_prompt, recognition_response_schema, RECOGNITION_SYSTEM_PROMPT,
};
use crate::llm::{ChatMessage, ChatRequest, ImageInput, LlmProvider};
use crate::models::{Ingredient, IngredientCategory};

/// Maximum tokens for a recognition response
const RECOGNITION_MAX_TOKENS: u32 = 2048;

/// Largest accepted photo after base64 decoding, in bytes
const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// One recognized ingredient as returned by the model
#[derive(Debug, Deserialize)]
struct RecognizedIngredient {
    name: String,
    category: String,
}

/// Root of the recognition response
#[derive(Debug, Deserialize)]
struct RecognitionResponse {
    ingredients: Vec<RecognizedIngredient>,
}

/// Ingredient recognizer backed by a vision-capable LLM provider
pub struct IngredientRecognizer {
    provider: Arc<dyn LlmProvider>,
}

impl IngredientRecognizer {
    /// Create a recognizer
    #[must_use]
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self { provider }
    }

    /// Recognize ingredients in a photo, skipping names already in the inventory
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the configured provider cannot process
    /// images or the payload is not a valid photo, `GenerationFailed` if the
    /// response cannot be parsed, or the provider's error for transport
    /// failures
    pub async fn recognize(
        &self,
        image: ImageInput,
        existing_inventory: &[Ingredient],
    ) -> AppResult<Vec<Ingredient>> {
        if !self.provider.capabilities().supports_vision() {
            return Err(AppError::invalid_input(format!(
                "The configured AI provider ({}) does not support photo recognition",
                self.provider.display_name()
            )));
        }
        validate_image_payload(&image)?;

        let request = ChatRequest::new(vec![
            ChatMessage::system(RECOGNITION_SYSTEM_PROMPT),
            ChatMessage::user(build_recognition_prompt()),
        ])
        .with_max_tokens(RECOGNITION_MAX_TOKENS)
        .with_response_schema(recognition_response_schema())
        .with_image(image);

        let response = self.provider.complete(&request).await?;
        let recognized = parse_recognition_json(&response.content)?;

        let existing_names: HashSet<String> = existing_inventory
            .iter()
            .map(|i| i.name.to_lowercase())
            .collect();

        // Dedupe both against the inventory and within the response itself
        let mut seen = existing_names;
        let mut ingredients = Vec::new();
        for item in recognized.ingredients {
            let name = item.name.trim();
            if name.is_empty() {
                continue;
            }
            if !seen.insert(name.to_lowercase()) {
                continue;
            }
            ingredients.push(Ingredient::new(
                name,
                IngredientCategory::parse(&item.category),
            ));
        }

        info!(recognized = ingredients.len(), "Recognized new ingredients");
        Ok(ingredients)
    }
}

/// Reject payloads that are not base64 or are too large before any provider call
fn validate_image_payload(image: &ImageInput) -> AppResult<()> {
    let decoded = BASE64
        .decode(image.data_base64.as_bytes())
        .map_err(|_| AppError::invalid_input("Image payload is not valid base64"))?;
    if decoded.is_empty() {
        return Err(AppError::invalid_input("Image payload is empty"));
    }
    if decoded.len() > MAX_IMAGE_BYTES {
        return Err(AppError::invalid_input(format!(
            "Image is too large ({} bytes, limit {MAX_IMAGE_BYTES})",
            decoded.len()
        )));
    }
    Ok(())
}

/// Parse a recognition response, tolerating markdown code fences
fn parse_recognition_json(raw: &str) -> AppResult<RecognitionResponse> {
    let trimmed = raw.trim();
    let json_text = match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if start < end => &trimmed[start..=end],
        _ => trimmed,
    };
    serde_json::from_str(json_text).map_err(|e| {
        warn!(error = %e, "Model returned malformed recognition JSON");
        AppError::generation_failed(format!("Model returned malformed recognition JSON: {e}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{ChatResponse, LlmCapabilities};
    use async_trait::async_trait;

    struct FakeVisionProvider {
        response: String,
        capabilities: LlmCapabilities,
    }

    #[async_trait]
    impl LlmProvider for FakeVisionProvider {
        fn name(&self) -> &'static str {
            "fake"
        }
        fn display_name(&self) -> &'static str {
            "Fake"
        }
        fn capabilities(&self) -> LlmCapabilities {
            self.capabilities
        }
        fn default_model(&self) -> &str {
            "fake-1"
        }
        async fn complete(&self, _request: &ChatRequest) -> Result<ChatResponse, AppError> {
            Ok(ChatResponse {
                content: self.response.clone(),
                model: "fake-1".into(),
                usage: None,
                finish_reason: None,
            })
        }
        async fn health_check(&self) -> Result<(), AppError> {
            Ok(())
        }
    }

    fn image() -> ImageInput {
        ImageInput {
            data_base64: "aGVsbG8=".into(),
            mime_type: "image/jpeg".into(),
        }
    }

    #[tokio::test]
    async fn test_recognition_dedupes_against_inventory() {
        let recognizer = IngredientRecognizer::new(Arc::new(FakeVisionProvider {
            response: r#"{"ingredients": [
                {"name": "Eggs", "category": "dairy"},
                {"name": "Spinach", "category": "produce"},
                {"name": "spinach", "category": "produce"}
            ]}"#
            .into(),
            capabilities: LlmCapabilities::full_featured(),
        }));
        let existing = vec![Ingredient::new("eggs", IngredientCategory::Dairy)];

        let recognized = recognizer.recognize(image(), &existing).await.unwrap();
        assert_eq!(recognized.len(), 1);
        assert_eq!(recognized[0].name, "Spinach");
        assert_eq!(recognized[0].category, IngredientCategory::Produce);
    }

    #[tokio::test]
    async fn test_rejects_non_base64_payload() {
        let recognizer = IngredientRecognizer::new(Arc::new(FakeVisionProvider {
            response: String::new(),
            capabilities: LlmCapabilities::full_featured(),
        }));
        let bad = ImageInput {
            data_base64: "not base64!!".into(),
            mime_type: "image/jpeg".into(),
        };
        let err = recognizer.recognize(bad, &[]).await.unwrap_err();
        assert_eq!(err.code, crate::errors::ErrorCode::InvalidInput);
    }

    #[tokio::test]
    async fn test_non_vision_provider_rejected() {
        let recognizer = IngredientRecognizer::new(Arc::new(FakeVisionProvider {
            response: String::new(),
            capabilities: LlmCapabilities::SYSTEM_MESSAGES,
        }));
        let result = recognizer.recognize(image(), &[]).await;
        assert!(result.is_err());
    }
}
