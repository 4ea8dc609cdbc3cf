// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Handles environment variables, deployment modes, and runtime configuration parsing
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Environment-based configuration management for production deployment

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;

/// Environment type for security and other configurations
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development mode
    #[default]
    Development,
    /// Production deployment
    Production,
    /// Test runs
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// Which LLM provider backs plan generation and ingredient recognition
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LlmProviderType {
    /// Google Gemini (native JSON schema constraints and vision)
    #[default]
    Gemini,
    /// Any `OpenAI`-compatible endpoint (`OpenAI`, Groq, Ollama, vLLM)
    OpenAiCompatible,
}

impl LlmProviderType {
    /// Environment variable that selects the provider
    pub const ENV_VAR: &'static str = "CHEF_LLM_PROVIDER";

    /// Read the provider selection from the environment
    #[must_use]
    pub fn from_env() -> Self {
        match env::var(Self::ENV_VAR).as_deref() {
            Ok("openai" | "openai-compatible" | "groq" | "ollama") => Self::OpenAiCompatible,
            _ => Self::Gemini,
        }
    }
}

impl fmt::Display for LlmProviderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gemini => write!(f, "gemini"),
            Self::OpenAiCompatible => write!(f, "openai-compatible"),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Connection URL (`sqlite:chef_fridge.db` or `sqlite::memory:`)
    pub url: String,
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// JWT signing secret
    pub jwt_secret: String,
    /// JWT expiry in hours
    pub jwt_expiry_hours: u32,
}

/// LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Which provider to use
    pub provider: LlmProviderType,
    /// Optional model override (falls back to the provider default)
    pub model: Option<String>,
    /// Temperature for plan generation
    pub temperature: f32,
}

/// Payment gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillingConfig {
    /// Gateway API base URL
    pub gateway_base_url: String,
    /// Gateway secret key for server-initiated calls
    pub gateway_secret_key: String,
    /// Shared secret for inbound webhook signature verification
    pub webhook_secret: String,
    /// Monthly subscription price in minor currency units (cents)
    pub subscription_price_cents: u32,
    /// ISO currency code
    pub currency: String,
}

/// Optional external services
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalServicesConfig {
    /// Image-search API key for recipe photos (feature disabled when empty)
    pub image_search_api_key: Option<String>,
    /// Image-search API base URL
    pub image_search_base_url: String,
}

/// Complete server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP listen port
    pub http_port: u16,
    /// Deployment environment
    pub environment: Environment,
    /// Database settings
    pub database: DatabaseConfig,
    /// Auth settings
    pub auth: AuthConfig,
    /// LLM settings
    pub llm: LlmConfig,
    /// Billing settings
    pub billing: BillingConfig,
    /// Optional external services
    pub external: ExternalServicesConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing in production or a
    /// numeric variable fails to parse.
    pub fn from_env() -> Result<Self> {
        let environment =
            Environment::from_str_or_default(&env_var_or("ENVIRONMENT", "development"));

        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) => secret,
            Err(_) if environment.is_production() => {
                anyhow::bail!("JWT_SECRET must be set in production")
            }
            // Development fallback; tokens do not survive restarts
            Err(_) => generate_dev_secret(),
        };

        Ok(Self {
            http_port: env_var_or("HTTP_PORT", "8081")
                .parse()
                .context("Invalid HTTP_PORT")?,
            environment,
            database: DatabaseConfig {
                url: env_var_or("DATABASE_URL", "sqlite:chef_fridge.db"),
            },
            auth: AuthConfig {
                jwt_secret,
                jwt_expiry_hours: env_var_or("JWT_EXPIRY_HOURS", "24")
                    .parse()
                    .context("Invalid JWT_EXPIRY_HOURS")?,
            },
            llm: LlmConfig {
                provider: LlmProviderType::from_env(),
                model: env::var("CHEF_LLM_MODEL").ok(),
                temperature: env_var_or("CHEF_LLM_TEMPERATURE", "0.7")
                    .parse()
                    .context("Invalid CHEF_LLM_TEMPERATURE")?,
            },
            billing: BillingConfig {
                gateway_base_url: env_var_or(
                    "PAYMENT_GATEWAY_BASE_URL",
                    "https://api.payment-gateway.example.com/v1",
                ),
                gateway_secret_key: env_var_or("PAYMENT_GATEWAY_SECRET_KEY", ""),
                webhook_secret: env_var_or("PAYMENT_WEBHOOK_SECRET", ""),
                subscription_price_cents: env_var_or("SUBSCRIPTION_PRICE_CENTS", "499")
                    .parse()
                    .context("Invalid SUBSCRIPTION_PRICE_CENTS")?,
                currency: env_var_or("SUBSCRIPTION_CURRENCY", "usd"),
            },
            external: ExternalServicesConfig {
                image_search_api_key: env::var("IMAGE_SEARCH_API_KEY").ok(),
                image_search_base_url: env_var_or(
                    "IMAGE_SEARCH_BASE_URL",
                    "https://api.pexels.com/v1",
                ),
            },
        })
    }

    /// One-line-per-setting summary for startup logging (secrets omitted)
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Chef Fridge Server Configuration:\n\
             - HTTP Port: {}\n\
             - Environment: {}\n\
             - Database: {}\n\
             - LLM Provider: {}\n\
             - LLM Model: {}\n\
             - Billing Gateway: {}\n\
             - Image Search: {}",
            self.http_port,
            self.environment,
            if self.database.url.contains(":memory:") {
                "SQLite (in-memory)"
            } else {
                "SQLite"
            },
            self.llm.provider,
            self.llm.model.as_deref().unwrap_or("(provider default)"),
            if self.billing.gateway_secret_key.is_empty() {
                "disabled"
            } else {
                "enabled"
            },
            if self.external.image_search_api_key.is_some() {
                "enabled"
            } else {
                "disabled"
            },
        )
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_port: 8081,
            environment: Environment::Testing,
            database: DatabaseConfig {
                url: "sqlite::memory:".into(),
            },
            auth: AuthConfig {
                jwt_secret: generate_dev_secret(),
                jwt_expiry_hours: 24,
            },
            llm: LlmConfig {
                provider: LlmProviderType::Gemini,
                model: None,
                temperature: 0.7,
            },
            billing: BillingConfig {
                gateway_base_url: "https://api.payment-gateway.example.com/v1".into(),
                gateway_secret_key: String::new(),
                webhook_secret: String::new(),
                subscription_price_cents: 499,
                currency: "usd".into(),
            },
            external: ExternalServicesConfig {
                image_search_api_key: None,
                image_search_base_url: "https://api.pexels.com/v1".into(),
            },
        }
    }
}

/// Read an environment variable with a default
fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Random per-process secret for development runs
fn generate_dev_secret() -> String {
    use rand::RngCore;
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_parsing() {
        assert_eq!(
            Environment::from_str_or_default("prod"),
            Environment::Production
        );
        assert_eq!(
            Environment::from_str_or_default("nonsense"),
            Environment::Development
        );
    }

    #[test]
    fn test_default_config_summary() {
        let config = ServerConfig::default();
        let summary = config.summary();
        assert!(summary.contains("8081"));
        assert!(summary.contains("gemini"));
        assert!(!summary.contains(&config.auth.jwt_secret));
    }
}
