// ABOUTME: HTTP server assembly binding every route group onto one listener
// ABOUTME: Applies CORS and request tracing layers around the merged router
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # HTTP Server
//!
//! Builds the full axum router from the per-domain route groups and serves it
//! on the configured port. One process, one port, all endpoints.

use std::sync::Arc;

use axum::Router;
use http::{header::HeaderName, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::errors::{AppError, AppResult};
use crate::resources::ServerResources;
use crate::routes::{
    AuthRoutes, BillingRoutes, FamilyRoutes, HealthRoutes, InventoryRoutes, PlanRoutes,
    RecipesRoutes, ShoppingRoutes, SyncRoutes,
};

/// HTTP server over shared [`ServerResources`]
pub struct HttpServer {
    resources: Arc<ServerResources>,
}

impl HttpServer {
    /// Create a server from initialized resources
    #[must_use]
    pub const fn new(resources: Arc<ServerResources>) -> Self {
        Self { resources }
    }

    /// Build the complete application router
    #[must_use]
    pub fn router(&self) -> Router {
        Router::new()
            .merge(HealthRoutes::routes(self.resources.clone()))
            .merge(AuthRoutes::routes(self.resources.clone()))
            .merge(InventoryRoutes::routes(self.resources.clone()))
            .merge(FamilyRoutes::routes(self.resources.clone()))
            .merge(PlanRoutes::routes(self.resources.clone()))
            .merge(RecipesRoutes::routes(self.resources.clone()))
            .merge(ShoppingRoutes::routes(self.resources.clone()))
            .merge(SyncRoutes::routes(self.resources.clone()))
            .merge(BillingRoutes::routes(self.resources.clone()))
            .layer(setup_cors())
            .layer(TraceLayer::new_for_http())
    }

    /// Bind the configured port and serve until the process is stopped
    ///
    /// # Errors
    ///
    /// Returns an error if the port cannot be bound or the server loop fails.
    pub async fn run(self) -> AppResult<()> {
        let port = self.resources.config.http_port;
        let app = self.router();

        let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
            .await
            .map_err(|e| AppError::internal(format!("Failed to bind port {port}: {e}")))?;

        info!("HTTP server listening on port {}", port);

        axum::serve(listener, app)
            .await
            .map_err(|e| AppError::internal(format!("HTTP server error: {e}")))
    }
}

/// Configure CORS from the `CORS_ALLOWED_ORIGINS` environment variable
///
/// Empty or `*` allows any origin; otherwise a comma-separated origin list.
fn setup_cors() -> CorsLayer {
    let configured = std::env::var("CORS_ALLOWED_ORIGINS").unwrap_or_default();

    let allow_origin = if configured.is_empty() || configured == "*" {
        AllowOrigin::any()
    } else {
        let origins: Vec<HeaderValue> = configured
            .split(',')
            .filter_map(|s| {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    HeaderValue::from_str(trimmed).ok()
                }
            })
            .collect();

        if origins.is_empty() {
            AllowOrigin::any()
        } else {
            AllowOrigin::list(origins)
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_headers([
            HeaderName::from_static("content-type"),
            HeaderName::from_static("authorization"),
            HeaderName::from_static("accept"),
            HeaderName::from_static("origin"),
            HeaderName::from_static("x-requested-with"),
            HeaderName::from_static("x-webhook-signature"),
        ])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
}
