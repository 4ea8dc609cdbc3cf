// ABOUTME: Route handlers for account registration, login, and the current-user endpoint
// ABOUTME: Issues JWT session tokens backed by bcrypt password verification
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Authentication routes

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::auth::AuthManager;
use crate::errors::AppError;
use crate::models::User;
use crate::resources::ServerResources;
use crate::routes::authenticate;

/// Minimum password length for registration
const MIN_PASSWORD_LENGTH: usize = 8;

/// Registration request body
#[derive(Debug, Deserialize)]
pub struct RegisterBody {
    /// Email address
    pub email: String,
    /// Plaintext password, hashed before storage
    pub password: String,
    /// Optional display name
    pub display_name: Option<String>,
}

/// Login request body
#[derive(Debug, Deserialize)]
pub struct LoginBody {
    /// Email address
    pub email: String,
    /// Plaintext password
    pub password: String,
}

/// Successful auth response with a session token
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    /// JWT session token
    pub token: String,
    /// The authenticated user
    pub user: UserResponse,
}

/// Public view of a user account
#[derive(Debug, Serialize)]
pub struct UserResponse {
    /// User id
    pub id: String,
    /// Email address
    pub email: String,
    /// Display name
    pub display_name: Option<String>,
    /// Subscription state
    pub is_subscribed: bool,
    /// Whether local data has been migrated
    pub local_migrated: bool,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email,
            display_name: user.display_name,
            is_subscribed: user.is_subscribed,
            local_migrated: user.local_migrated,
        }
    }
}

/// Authentication routes handler
pub struct AuthRoutes;

impl AuthRoutes {
    /// Create all authentication routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/auth/register", post(Self::handle_register))
            .route("/api/auth/login", post(Self::handle_login))
            .route("/api/auth/me", get(Self::handle_me))
            .with_state(resources)
    }

    /// Handle POST /api/auth/register
    async fn handle_register(
        State(resources): State<Arc<ServerResources>>,
        Json(body): Json<RegisterBody>,
    ) -> Result<Response, AppError> {
        let email = body.email.trim().to_lowercase();
        if !email.contains('@') {
            return Err(AppError::invalid_input("A valid email address is required"));
        }
        if body.password.len() < MIN_PASSWORD_LENGTH {
            return Err(AppError::invalid_input(format!(
                "Password must be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }

        let password_hash = AuthManager::hash_password(&body.password)?;
        let user = User::new(email, password_hash, body.display_name);
        resources.database.users().create(&user).await?;

        let token = resources.auth_manager.generate_token(&user)?;
        let response = AuthResponse {
            token,
            user: user.into(),
        };
        Ok((StatusCode::CREATED, Json(response)).into_response())
    }

    /// Handle POST /api/auth/login
    async fn handle_login(
        State(resources): State<Arc<ServerResources>>,
        Json(body): Json<LoginBody>,
    ) -> Result<Response, AppError> {
        let email = body.email.trim().to_lowercase();

        // Same error for unknown email and wrong password
        let user = resources
            .database
            .users()
            .get_by_email(&email)
            .await?
            .ok_or_else(|| AppError::auth_invalid("Invalid email or password"))?;

        if !AuthManager::verify_password(&body.password, &user.password_hash)? {
            return Err(AppError::auth_invalid("Invalid email or password"));
        }

        resources.database.users().touch_last_active(user.id).await?;

        let token = resources.auth_manager.generate_token(&user)?;
        let response = AuthResponse {
            token,
            user: user.into(),
        };
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle GET /api/auth/me
    async fn handle_me(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let user = authenticate(&headers, &resources).await?;
        let response: UserResponse = user.into();
        Ok((StatusCode::OK, Json(response)).into_response())
    }
}
