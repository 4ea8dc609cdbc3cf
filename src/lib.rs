// ABOUTME: Main library entry point for the Chef Fridge meal-planning platform
// ABOUTME: Exposes inventory, family, planning, sync, and billing modules
//
// SPDX-License-Identifier: MIT OR Apache-2.0

#![deny(unsafe_code)]

//! # Chef Fridge Server
//!
//! A meal-planning backend that turns a household's fridge inventory and
//! family profiles into LLM-generated weekly meal plans with derived
//! shopping lists.
//!
//! ## Features
//!
//! - **Inventory**: case-insensitive ingredient tracking per account
//! - **Family profiles**: per-member energy needs via Mifflin-St Jeor
//! - **Meal plans**: schema-constrained JSON generation (Gemini or any
//!   OpenAI-compatible endpoint)
//! - **Shopping lists**: derived from a plan with recipe selection and
//!   item exclusions
//! - **Local sync**: one-time import of on-device data plus debounced
//!   snapshot writes
//! - **Billing**: payment-intent creation and HMAC-verified webhooks
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use chef_fridge::config::environment::ServerConfig;
//! use chef_fridge::errors::AppResult;
//!
//! #[tokio::main]
//! async fn main() -> AppResult<()> {
//!     let config = ServerConfig::from_env()?;
//!     println!("Chef Fridge configured with port: HTTP={}", config.http_port);
//!     Ok(())
//! }
//! ```

// ── Public API ──────────────────────────────────────────────────────────
// These modules are used by binary crates (src/bin/) and integration tests
// (tests/). They must remain `pub` so external consumers can access them.

/// Authentication and session management
pub mod auth;

/// Payment gateway client and webhook processing
pub mod billing;

/// Configuration management and persistence
pub mod config;

/// Per-account database managers over `SQLite`
pub mod database;

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// External API clients (recipe image search)
pub mod external;

/// Nutrition estimation (BMR, TDEE, daily calorie targets)
pub mod intelligence;

/// LLM provider abstraction and prompt construction
pub mod llm;

/// Logging configuration and initialization
pub mod logging;

/// Common data structures for accounts, ingredients, recipes, and plans
pub mod models;

/// Meal plan generation and shopping list derivation
pub mod planner;

/// Photo-based ingredient recognition
pub mod recognition;

/// Shared server resources for dependency injection
pub mod resources;

/// `HTTP` route handlers grouped by domain
pub mod routes;

/// `HTTP` server assembly and serving loop
pub mod server;

/// Local-to-hosted migration and debounced snapshot writes
pub mod sync;
