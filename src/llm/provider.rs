// ABOUTME: Unified LLM provider selector for runtime provider switching
// ABOUTME: Abstracts over Gemini and OpenAI-compatible providers based on environment configuration
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # LLM Provider Selector
//!
//! This module provides a unified interface for LLM providers that can be
//! configured at runtime via environment variables.
//!
//! ## Configuration
//!
//! Set `CHEF_LLM_PROVIDER` environment variable:
//! - `gemini` (default): Use Google Gemini (requires `GEMINI_API_KEY`)
//! - `openai`: Use an `OpenAI`-compatible endpoint (`OPENAI_API_KEY` etc.)

use async_trait::async_trait;
use tracing::{debug, info};

use super::{
    ChatRequest, ChatResponse, GeminiProvider, LlmCapabilities, LlmProvider,
    OpenAiCompatibleProvider,
};
use crate::config::environment::LlmProviderType;
use crate::errors::AppError;

/// Unified chat provider that wraps Gemini or an `OpenAI`-compatible endpoint
///
/// This enum provides a consistent interface regardless of which
/// underlying provider is configured.
pub enum ChatProvider {
    /// Google Gemini provider with vision and schema-constrained JSON
    Gemini(GeminiProvider),
    /// `OpenAI`-compatible provider (hosted `OpenAI`, Ollama, vLLM)
    OpenAiCompatible(OpenAiCompatibleProvider),
}

impl ChatProvider {
    /// Create a provider from environment configuration
    ///
    /// Reads `CHEF_LLM_PROVIDER` to determine which provider to use:
    /// - `gemini` (default): Creates `GeminiProvider` (requires `GEMINI_API_KEY`)
    /// - `openai`/`openai_compatible`: Creates `OpenAiCompatibleProvider`
    ///
    /// # Errors
    ///
    /// Returns an error if the required API key environment variable is missing
    pub fn from_env() -> Result<Self, AppError> {
        let provider_type = LlmProviderType::from_env();

        info!(
            "Initializing LLM provider: {} (set {} to change)",
            provider_type,
            LlmProviderType::ENV_VAR
        );

        let provider = match provider_type {
            LlmProviderType::Gemini => Self::Gemini(GeminiProvider::from_env()?),
            LlmProviderType::OpenAiCompatible => {
                Self::OpenAiCompatible(OpenAiCompatibleProvider::from_env()?)
            }
        };

        debug!(
            "Provider {} initialized with model: {}",
            provider.display_name(),
            provider.default_model()
        );
        Ok(provider)
    }

    fn inner(&self) -> &dyn LlmProvider {
        match self {
            Self::Gemini(p) => p,
            Self::OpenAiCompatible(p) => p,
        }
    }
}

#[async_trait]
impl LlmProvider for ChatProvider {
    fn name(&self) -> &'static str {
        self.inner().name()
    }

    fn display_name(&self) -> &'static str {
        self.inner().display_name()
    }

    fn capabilities(&self) -> LlmCapabilities {
        self.inner().capabilities()
    }

    fn default_model(&self) -> &str {
        self.inner().default_model()
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError> {
        self.inner().complete(request).await
    }

    async fn health_check(&self) -> Result<(), AppError> {
        self.inner().health_check().await
    }
}
