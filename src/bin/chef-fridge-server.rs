// ABOUTME: Main server binary wiring config, database, LLM provider, and HTTP routes
// ABOUTME: Production entry point for the Chef Fridge backend
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Chef Fridge Server Binary
//!
//! Starts the meal-planning API with user authentication, the configured
//! LLM provider, and SQLite-backed storage.

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};

use chef_fridge::{
    config::environment::ServerConfig,
    database::Database,
    llm::ChatProvider,
    logging,
    resources::ServerResources,
    server::HttpServer,
};

#[derive(Parser)]
#[command(name = "chef-fridge-server")]
#[command(about = "Chef Fridge - meal plans and shopping lists from your fridge inventory")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }

    logging::init_from_env()?;

    info!("Starting Chef Fridge server");
    info!("{}", config.summary());

    let database = Database::new(&config.database.url).await?;
    info!("Database initialized: {}", config.database.url);

    let provider = ChatProvider::from_env()?;

    let resources = Arc::new(ServerResources::new(database, provider, config.clone())?);
    let server = HttpServer::new(resources);

    display_available_endpoints(&config);

    if let Err(e) = server.run().await {
        error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}

/// Display all available API endpoints with their port
#[allow(clippy::cognitive_complexity)]
fn display_available_endpoints(config: &ServerConfig) {
    let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = config.http_port;

    info!("=== Available API Endpoints ===");
    info!("Health:");
    info!("   Server Health:     GET  http://{host}:{port}/health");
    info!("   LLM Health:        GET  http://{host}:{port}/health/llm");
    info!("Authentication:");
    info!("   Register:          POST http://{host}:{port}/api/auth/register");
    info!("   Login:             POST http://{host}:{port}/api/auth/login");
    info!("   Current User:      GET  http://{host}:{port}/api/auth/me");
    info!("Inventory:");
    info!("   List Ingredients:  GET  http://{host}:{port}/api/inventory");
    info!("   Add Ingredient:    POST http://{host}:{port}/api/inventory");
    info!("   Update Ingredient: PUT  http://{host}:{port}/api/inventory/{{id}}");
    info!("   Remove Ingredient: DELETE http://{host}:{port}/api/inventory/{{id}}");
    info!("   Recognize Photo:   POST http://{host}:{port}/api/inventory/recognize");
    info!("Family:");
    info!("   List Members:      GET  http://{host}:{port}/api/family");
    info!("   Add Member:        POST http://{host}:{port}/api/family");
    info!("   Get Member:        GET  http://{host}:{port}/api/family/{{id}}");
    info!("   Update Member:     PUT  http://{host}:{port}/api/family/{{id}}");
    info!("   Remove Member:     DELETE http://{host}:{port}/api/family/{{id}}");
    info!("Planning:");
    info!("   Generate Plan:     POST http://{host}:{port}/api/plan");
    info!("   Shopping From Plan: POST http://{host}:{port}/api/plan/shopping");
    info!("Recipes & Shopping:");
    info!("   Saved Recipes:     GET/POST http://{host}:{port}/api/recipes");
    info!("   Shopping List:     GET/POST http://{host}:{port}/api/shopping");
    info!("Sync:");
    info!("   Reconcile:         POST http://{host}:{port}/api/sync/reconcile");
    info!("   Snapshot:          PUT  http://{host}:{port}/api/sync/snapshot");
    info!("Billing:");
    info!("   Payment Intent:    POST http://{host}:{port}/api/billing/intent");
    info!("   Webhook:           POST http://{host}:{port}/api/billing/webhook");
    info!("=== End of Endpoint List ===");
}
