// ABOUTME: Shared server resources injected into every route handler
// ABOUTME: Built once at startup and passed around behind an Arc
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Server Resources
//!
//! One container for everything handlers need: the database, the auth
//! manager, the configured LLM provider, and the services built on top of
//! them. Constructed once in the binary and shared as `Arc<ServerResources>`.

use std::sync::Arc;

use crate::auth::AuthManager;
use crate::billing::BillingService;
use crate::config::environment::ServerConfig;
use crate::database::Database;
use crate::errors::AppResult;
use crate::external::ImageSearchClient;
use crate::llm::ChatProvider;
use crate::planner::MealPlanner;
use crate::recognition::IngredientRecognizer;
use crate::sync::SyncService;

/// Shared resources for all HTTP handlers
pub struct ServerResources {
    /// Database connection pool and managers
    pub database: Database,
    /// JWT and password handling
    pub auth_manager: AuthManager,
    /// Server configuration
    pub config: Arc<ServerConfig>,
    /// Configured LLM provider
    pub provider: Arc<ChatProvider>,
    /// Meal plan generator
    pub planner: MealPlanner,
    /// Fridge photo recognizer
    pub recognizer: IngredientRecognizer,
    /// Local-to-hosted sync service
    pub sync: SyncService,
    /// Payment gateway and webhook handling
    pub billing: BillingService,
    /// Best-effort recipe photo lookup
    pub image_search: ImageSearchClient,
}

impl ServerResources {
    /// Assemble resources from the initialized database, provider and config
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client cannot be created
    pub fn new(
        database: Database,
        provider: ChatProvider,
        config: ServerConfig,
    ) -> AppResult<Self> {
        let provider = Arc::new(provider);
        let auth_manager = AuthManager::new(
            config.auth.jwt_secret.as_bytes().to_vec(),
            i64::from(config.auth.jwt_expiry_hours),
        );

        let mut planner =
            MealPlanner::new(provider.clone()).with_temperature(config.llm.temperature);
        if let Some(model) = &config.llm.model {
            planner = planner.with_model(model.clone());
        }

        let recognizer = IngredientRecognizer::new(provider.clone());
        let sync = SyncService::new(database.clone());
        let billing = BillingService::new(config.billing.clone(), database.clone());
        let image_search = ImageSearchClient::new(&config.external)?;

        Ok(Self {
            database,
            auth_manager,
            config: Arc::new(config),
            provider,
            planner,
            recognizer,
            sync,
            billing,
            image_search,
        })
    }
}
