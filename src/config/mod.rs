// ABOUTME: Configuration management for deployment-specific settings
// ABOUTME: Environment-variable driven, with typed sections per concern
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration management

/// Environment-based server configuration
pub mod environment;

pub use environment::{
    BillingConfig, DatabaseConfig, Environment, ExternalServicesConfig, LlmConfig,
    LlmProviderType, ServerConfig,
};
