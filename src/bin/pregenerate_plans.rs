// ABOUTME: Batch job that pre-generates meal plans for sample pantry profiles
// ABOUTME: Stores the generated recipes under a content account for reuse
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plan pre-generation batch job.
//!
//! Runs a handful of representative pantry profiles through the configured
//! LLM provider and stores the resulting recipes as saved recipes under a
//! dedicated content account. Intended to run on a schedule (cron) so the
//! public recipe pages always have fresh material.
//!
//! Usage:
//! ```bash
//! # Generate plans for all sample profiles (uses env configuration)
//! cargo run --bin pregenerate-plans
//!
//! # Only the first N profiles
//! cargo run --bin pregenerate-plans -- --limit 2
//! ```

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::{info, warn};

use chef_fridge::{
    config::environment::ServerConfig,
    database::Database,
    llm::{prompts::PlanPromptOptions, ChatProvider},
    logging,
    models::{Ingredient, IngredientCategory, User},
    planner::MealPlanner,
};

/// Email of the account that owns pre-generated content
const CONTENT_ACCOUNT_EMAIL: &str = "content@chef-fridge.internal";

#[derive(Parser)]
#[command(
    name = "pregenerate-plans",
    about = "Chef Fridge plan pre-generation batch job"
)]
struct Args {
    /// Only process the first N sample profiles
    #[arg(long)]
    limit: Option<usize>,

    /// Enable verbose logging
    #[arg(long, short = 'v')]
    verbose: bool,
}

/// A representative pantry plus a theme note for the prompt
struct SampleProfile {
    name: &'static str,
    note: &'static str,
    ingredients: &'static [(&'static str, IngredientCategory)],
}

const SAMPLE_PROFILES: &[SampleProfile] = &[
    SampleProfile {
        name: "weeknight-basics",
        note: "Quick weeknight dinners, 30 minutes or less",
        ingredients: &[
            ("chicken breast", IngredientCategory::Meat),
            ("rice", IngredientCategory::Pantry),
            ("broccoli", IngredientCategory::Produce),
            ("garlic", IngredientCategory::Produce),
            ("soy sauce", IngredientCategory::Pantry),
            ("eggs", IngredientCategory::Dairy),
        ],
    },
    SampleProfile {
        name: "vegetarian-pantry",
        note: "Vegetarian meals for a family",
        ingredients: &[
            ("chickpeas", IngredientCategory::Pantry),
            ("spinach", IngredientCategory::Produce),
            ("feta cheese", IngredientCategory::Dairy),
            ("tomatoes", IngredientCategory::Produce),
            ("pasta", IngredientCategory::Pantry),
            ("olive oil", IngredientCategory::Pantry),
        ],
    },
    SampleProfile {
        name: "freezer-staples",
        note: "Meals built around frozen staples",
        ingredients: &[
            ("frozen salmon fillets", IngredientCategory::Frozen),
            ("frozen peas", IngredientCategory::Frozen),
            ("potatoes", IngredientCategory::Produce),
            ("lemon", IngredientCategory::Produce),
            ("butter", IngredientCategory::Dairy),
        ],
    },
];

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.verbose {
        std::env::set_var("RUST_LOG", "debug");
    }
    logging::init_from_env()?;

    info!("=== Chef Fridge Plan Pre-Generation ===");

    let config = ServerConfig::from_env()?;
    let database = Database::new(&config.database.url).await?;
    let provider = ChatProvider::from_env()?;

    let mut planner =
        MealPlanner::new(Arc::new(provider)).with_temperature(config.llm.temperature);
    if let Some(model) = &config.llm.model {
        planner = planner.with_model(model.clone());
    }

    let content_user = find_or_create_content_account(&database).await?;
    info!("Content account: {}", content_user.email);

    let limit = args.limit.unwrap_or(SAMPLE_PROFILES.len());
    let mut generated = 0u32;
    let mut saved = 0u32;

    for profile in SAMPLE_PROFILES.iter().take(limit) {
        info!("Generating plan for profile '{}'", profile.name);

        let inventory: Vec<Ingredient> = profile
            .ingredients
            .iter()
            .map(|(name, category)| Ingredient::new(*name, *category))
            .collect();

        let options = PlanPromptOptions {
            note: Some(profile.note.to_owned()),
            ..PlanPromptOptions::default()
        };

        let plan = match planner.generate(&inventory, &[], &options).await {
            Ok(plan) => plan,
            Err(e) => {
                warn!("Profile '{}' failed, skipping: {}", profile.name, e);
                continue;
            }
        };

        generated += 1;
        for recipe in &plan.recipes {
            match database.recipes().save(content_user.id, recipe).await {
                Ok(_) => {
                    info!("  ✓ {}", recipe.name);
                    saved += 1;
                }
                Err(e) => warn!("  ✗ {} - {}", recipe.name, e),
            }
        }
    }

    info!("");
    info!("=== Pre-Generation Complete ===");
    info!("Plans generated: {}, recipes saved: {}", generated, saved);

    Ok(())
}

/// Look up the content account, creating it on first run
///
/// The account is never logged into; it gets a random password hash so the
/// login path can never match it.
async fn find_or_create_content_account(database: &Database) -> Result<User> {
    if let Some(user) = database.users().get_by_email(CONTENT_ACCOUNT_EMAIL).await? {
        return Ok(user);
    }

    let placeholder = uuid::Uuid::new_v4().to_string();
    let password_hash = chef_fridge::auth::AuthManager::hash_password(&placeholder)?;
    let user = User::new(
        CONTENT_ACCOUNT_EMAIL.to_owned(),
        password_hash,
        Some("Content".to_owned()),
    );
    database.users().create(&user).await?;
    info!("Created content account {}", CONTENT_ACCOUNT_EMAIL);

    Ok(user)
}
