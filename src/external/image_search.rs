// ABOUTME: Image search client that finds a representative photo for a generated recipe
// ABOUTME: Strictly best-effort, every failure degrades to no photo
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recipe Photo Lookup
//!
//! Recipes look better with a photo, but a plan without photos is still a
//! plan. This client wraps a web image search API and treats every failure
//! mode (missing key, timeout, quota, empty results) as "no photo" so plan
//! generation never fails on imagery. Photos are searched, never generated.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::environment::ExternalServicesConfig;
use crate::errors::{AppError, AppResult};

/// Request timeout; photo lookup must never hold up a plan response for long
const SEARCH_TIMEOUT_SECS: u64 = 5;

/// One result from the image search API
#[derive(Debug, Deserialize)]
struct ImageResult {
    #[serde(rename = "imageUrl")]
    image_url: String,
}

/// Image search response body
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    images: Vec<ImageResult>,
}

/// Best-effort image search client
pub struct ImageSearchClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl ImageSearchClient {
    /// Create a client from the external services config
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created
    pub fn new(config: &ExternalServicesConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(SEARCH_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: config.image_search_api_key.clone(),
            base_url: config.image_search_base_url.clone(),
        })
    }

    /// Whether a photo lookup is configured at all
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Find a photo URL for a recipe name, or `None`
    ///
    /// Never returns an error: lookup failures are logged and swallowed.
    pub async fn find_photo(&self, recipe_name: &str) -> Option<String> {
        let api_key = self.api_key.as_ref()?;

        let query = format!("{recipe_name} dish food");
        let result = self
            .client
            .get(format!("{}/images", self.base_url))
            .header("X-API-KEY", api_key)
            .query(&[("q", query.as_str()), ("num", "1")])
            .send()
            .await;

        let response = match result {
            Ok(r) if r.status().is_success() => r,
            Ok(r) => {
                warn!(recipe = %recipe_name, status = %r.status(), "Image search returned an error");
                return None;
            }
            Err(e) => {
                warn!(recipe = %recipe_name, error = %e, "Image search request failed");
                return None;
            }
        };

        match response.json::<SearchResponse>().await {
            Ok(body) => {
                let url = body.images.into_iter().next().map(|i| i.image_url);
                if url.is_none() {
                    debug!(recipe = %recipe_name, "Image search returned no results");
                }
                url
            }
            Err(e) => {
                warn!(recipe = %recipe_name, error = %e, "Unparseable image search response");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unconfigured_client_returns_none() {
        let client = ImageSearchClient::new(&ExternalServicesConfig {
            image_search_api_key: None,
            image_search_base_url: "https://example.invalid".into(),
        })
        .unwrap();
        assert!(!client.is_configured());
        assert!(client.find_photo("Pasta").await.is_none());
    }
}
