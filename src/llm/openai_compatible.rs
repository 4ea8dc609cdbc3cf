// ABOUTME: Generic OpenAI-compatible LLM provider for local and cloud endpoints
// ABOUTME: Supports Ollama, vLLM, OpenAI itself, and any compatible chat completions API
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # `OpenAI`-Compatible Provider
//!
//! Generic implementation for any `OpenAI`-compatible LLM endpoint, from the
//! hosted `OpenAI` API down to a local Ollama instance.
//!
//! ## Configuration
//!
//! - `OPENAI_BASE_URL`: Base URL (default: <https://api.openai.com/v1>)
//! - `OPENAI_MODEL`: Model to use (default: `gpt-4o-mini`)
//! - `OPENAI_API_KEY`: API key (optional, empty for local servers)
//!
//! Schema-constrained requests use `response_format: json_schema`; vision
//! requests embed the image as a `data:` URI content part.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::env;
use std::time::Duration;
use tracing::{debug, error, instrument};

use super::{
    ChatRequest, ChatResponse, LlmCapabilities, LlmProvider, MessageRole, TokenUsage,
};
use crate::errors::{AppError, ErrorCode};

// ============================================================================
// Configuration Constants
// ============================================================================

/// Environment variable for the base URL
const OPENAI_BASE_URL_ENV: &str = "OPENAI_BASE_URL";

/// Environment variable for the model
const OPENAI_MODEL_ENV: &str = "OPENAI_MODEL";

/// Environment variable for the API key (optional for local servers)
const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Default base URL (hosted `OpenAI`)
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default model
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Connection timeout
const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Request timeout (local inference can be slow)
const REQUEST_TIMEOUT_SECS: u64 = 300;

// ============================================================================
// API Request/Response Types (OpenAI-compatible format)
// ============================================================================

/// OpenAI-compatible API request structure
#[derive(Debug, Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<Value>,
}

/// Message in OpenAI format; content is either a plain string or an array of
/// content parts when an image is attached
#[derive(Debug, Serialize)]
struct OpenAiMessage {
    role: String,
    content: Value,
}

/// Chat completion response structure
#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
    model: Option<String>,
    usage: Option<OpenAiUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    #[serde(rename = "prompt_tokens")]
    prompt: u32,
    #[serde(rename = "completion_tokens")]
    completion: u32,
    #[serde(rename = "total_tokens")]
    total: u32,
}

/// Error response structure
#[derive(Debug, Deserialize)]
struct OpenAiErrorResponse {
    error: OpenAiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorDetail {
    message: String,
}

// ============================================================================
// Provider Configuration
// ============================================================================

/// Configuration for the `OpenAI`-compatible provider
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleConfig {
    /// Base URL for the API (e.g., <https://api.openai.com/v1>)
    pub base_url: String,
    /// API key (optional for local servers)
    pub api_key: Option<String>,
    /// Default model to use
    pub default_model: String,
    /// Provider name for display/logging
    pub provider_name: String,
    /// Provider display name
    pub display_name: String,
    /// Capabilities of this provider
    pub capabilities: LlmCapabilities,
}

impl OpenAiCompatibleConfig {
    /// Create configuration for a local Ollama instance
    #[must_use]
    pub fn ollama(model: &str) -> Self {
        Self {
            base_url: "http://localhost:11434/v1".to_owned(),
            api_key: None,
            default_model: model.to_owned(),
            provider_name: "ollama".to_owned(),
            display_name: "Ollama (Local)".to_owned(),
            capabilities: LlmCapabilities::JSON_MODE | LlmCapabilities::SYSTEM_MESSAGES,
        }
    }
}

impl Default for OpenAiCompatibleConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            api_key: None,
            default_model: DEFAULT_MODEL.to_owned(),
            provider_name: "openai".to_owned(),
            display_name: "OpenAI".to_owned(),
            capabilities: LlmCapabilities::full_featured(),
        }
    }
}

// ============================================================================
// Provider Implementation
// ============================================================================

/// Generic `OpenAI`-compatible LLM provider
///
/// Works with any endpoint that implements the `OpenAI` chat completions API.
pub struct OpenAiCompatibleProvider {
    client: Client,
    config: OpenAiCompatibleConfig,
}

impl OpenAiCompatibleProvider {
    /// Create a new provider with the given configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: OpenAiCompatibleConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// Create a provider from `OPENAI_*` environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn from_env() -> Result<Self, AppError> {
        let config = OpenAiCompatibleConfig {
            base_url: env::var(OPENAI_BASE_URL_ENV)
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_owned()),
            api_key: env::var(OPENAI_API_KEY_ENV).ok().filter(|k| !k.is_empty()),
            default_model: env::var(OPENAI_MODEL_ENV).unwrap_or_else(|_| DEFAULT_MODEL.to_owned()),
            ..OpenAiCompatibleConfig::default()
        };
        Self::new(config)
    }

    /// Convert chat messages to OpenAI format, attaching the request image
    /// (if any) to the last user message as a data URI
    fn convert_messages(request: &ChatRequest) -> Vec<OpenAiMessage> {
        let mut messages: Vec<OpenAiMessage> = request
            .messages
            .iter()
            .map(|m| OpenAiMessage {
                role: m.role.as_str().to_owned(),
                content: Value::String(m.content.clone()),
            })
            .collect();

        if let Some(image) = &request.image {
            if let Some(last_user) = messages
                .iter_mut()
                .rev()
                .find(|m| m.role == MessageRole::User.as_str())
            {
                let text = last_user.content.as_str().unwrap_or_default().to_owned();
                let data_uri = format!("data:{};base64,{}", image.mime_type, image.data_base64);
                last_user.content = serde_json::json!([
                    {"type": "text", "text": text},
                    {"type": "image_url", "image_url": {"url": data_uri}}
                ]);
            }
        }

        messages
    }

    /// Build the request body, mapping the response schema to
    /// `response_format: json_schema` when present
    fn build_request(&self, request: &ChatRequest) -> OpenAiRequest {
        let response_format = request.response_schema.as_ref().map(|schema| {
            serde_json::json!({
                "type": "json_schema",
                "json_schema": {
                    "name": "response",
                    "strict": true,
                    "schema": schema
                }
            })
        });

        OpenAiRequest {
            model: request
                .model
                .clone()
                .unwrap_or_else(|| self.config.default_model.clone()),
            messages: Self::convert_messages(request),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            response_format,
        }
    }

    /// Map API error status to appropriate error type
    fn map_api_error(&self, status: u16, response_text: &str) -> AppError {
        let message = serde_json::from_str::<OpenAiErrorResponse>(response_text)
            .map_or_else(|_| response_text.to_owned(), |e| e.error.message);

        match status {
            429 => AppError::new(
                ErrorCode::ExternalRateLimited,
                "AI service quota exceeded. Please wait a moment and try again.",
            ),
            _ => AppError::external_service(
                self.config.provider_name.clone(),
                format!("API error ({status}): {message}"),
            ),
        }
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.api_key {
            Some(api_key) => request.header("Authorization", format!("Bearer {api_key}")),
            None => request,
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &'static str {
        "openai_compatible"
    }

    fn display_name(&self) -> &'static str {
        "OpenAI-Compatible"
    }

    fn capabilities(&self) -> LlmCapabilities {
        self.config.capabilities
    }

    fn default_model(&self) -> &str {
        &self.config.default_model
    }

    #[instrument(skip(self, request), fields(provider = %self.config.provider_name))]
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError> {
        let url = format!("{}/chat/completions", self.config.base_url);
        let body = self.build_request(request);

        debug!(model = %body.model, "Sending chat completion request");

        let response = self
            .authorize(self.client.post(&url))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                AppError::external_service(
                    self.config.provider_name.clone(),
                    format!("HTTP request failed: {e}"),
                )
            })?;

        let status = response.status();
        let response_text = response.text().await.map_err(|e| {
            AppError::external_service(
                self.config.provider_name.clone(),
                format!("Failed to read response: {e}"),
            )
        })?;

        if !status.is_success() {
            error!(status = %status, provider = %self.config.provider_name, "LLM API error");
            return Err(self.map_api_error(status.as_u16(), &response_text));
        }

        let api_response: OpenAiResponse = serde_json::from_str(&response_text).map_err(|e| {
            error!(error = %e, "Failed to parse chat completion response");
            AppError::internal(format!("Failed to parse LLM response: {e}"))
        })?;

        let choice = api_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AppError::internal("LLM response contained no choices"))?;
        let content = choice
            .message
            .content
            .ok_or_else(|| AppError::internal("LLM response contained no content"))?;

        Ok(ChatResponse {
            content,
            model: api_response.model.unwrap_or_else(|| body.model.clone()),
            usage: api_response.usage.map(|u| TokenUsage {
                prompt_tokens: u.prompt,
                completion_tokens: u.completion,
                total_tokens: u.total,
            }),
            finish_reason: choice.finish_reason,
        })
    }

    async fn health_check(&self) -> Result<(), AppError> {
        let url = format!("{}/models", self.config.base_url);
        let response = self
            .authorize(self.client.get(&url))
            .send()
            .await
            .map_err(|e| {
                AppError::external_service(
                    self.config.provider_name.clone(),
                    format!("Health check failed: {e}"),
                )
            })?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(AppError::external_service(
                self.config.provider_name.clone(),
                format!("Health check returned {}", response.status()),
            ))
        }
    }
}
