// ABOUTME: JWT-based user authentication with bcrypt password hashing
// ABOUTME: Handles registration credentials, token generation and validation
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Authentication
//!
//! HS256 JWT session tokens plus bcrypt password handling. Tokens carry the
//! user id and email; routes resolve the rest from the database so a stale
//! token never serves stale subscription state.

use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::models::User;

/// Token audience claim
const TOKEN_AUDIENCE: &str = "chef-fridge";

/// Convert a duration to a human-readable format
fn humanize_duration(duration: Duration) -> String {
    let total_secs = duration.num_seconds().abs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;

    if hours > 0 {
        format!("{hours} hours")
    } else if minutes > 0 {
        format!("{minutes} minutes")
    } else {
        format!("{total_secs} seconds")
    }
}

/// Detailed JWT validation errors for better error messages
#[derive(Debug, Clone)]
pub enum JwtValidationError {
    /// Token has expired
    TokenExpired {
        /// When the token expired
        expired_at: DateTime<Utc>,
        /// Current time for reference
        current_time: DateTime<Utc>,
    },
    /// Token signature is invalid
    TokenInvalid {
        /// Reason for invalidity
        reason: String,
    },
    /// Token is malformed (not proper `JWT` format)
    TokenMalformed {
        /// Details about malformation
        details: String,
    },
}

impl std::fmt::Display for JwtValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TokenExpired {
                expired_at,
                current_time,
            } => {
                let expired_for = current_time.signed_duration_since(*expired_at);
                write!(
                    f,
                    "JWT token expired {} ago at {}",
                    humanize_duration(expired_for),
                    expired_at.format("%Y-%m-%d %H:%M:%S UTC")
                )
            }
            Self::TokenInvalid { reason } => {
                write!(f, "JWT token signature is invalid: {reason}")
            }
            Self::TokenMalformed { details } => {
                write!(f, "JWT token is malformed: {details}")
            }
        }
    }
}

impl std::error::Error for JwtValidationError {}

impl From<JwtValidationError> for AppError {
    fn from(error: JwtValidationError) -> Self {
        match error {
            JwtValidationError::TokenExpired { .. } => Self::auth_expired(),
            JwtValidationError::TokenInvalid { .. } | JwtValidationError::TokenMalformed { .. } => {
                Self::auth_invalid(error.to_string())
            }
        }
    }
}

/// `JWT` claims for user authentication
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    /// User email
    pub email: String,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
    /// Audience (who the token is intended for)
    pub aud: String,
}

/// Authentication manager for `JWT` tokens and passwords
pub struct AuthManager {
    jwt_secret: Vec<u8>,
    token_expiry_hours: i64,
}

impl AuthManager {
    /// Create a new auth manager
    #[must_use]
    pub fn new(jwt_secret: Vec<u8>, token_expiry_hours: i64) -> Self {
        Self {
            jwt_secret,
            token_expiry_hours,
        }
    }

    /// Hash a password for storage
    ///
    /// # Errors
    ///
    /// Returns an error if hashing fails
    pub fn hash_password(password: &str) -> AppResult<String> {
        hash(password, DEFAULT_COST)
            .map_err(|e| AppError::internal(format!("Failed to hash password: {e}")))
    }

    /// Verify a password against a stored hash
    ///
    /// # Errors
    ///
    /// Returns an error if the hash is malformed
    pub fn verify_password(password: &str, password_hash: &str) -> AppResult<bool> {
        verify(password, password_hash)
            .map_err(|e| AppError::internal(format!("Failed to verify password: {e}")))
    }

    /// Generate a session token for a user
    ///
    /// # Errors
    ///
    /// Returns an error if token encoding fails
    pub fn generate_token(&self, user: &User) -> AppResult<String> {
        let now = Utc::now();
        let expiry = now + Duration::hours(self.token_expiry_hours);

        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            iat: now.timestamp(),
            exp: expiry.timestamp(),
            aud: TOKEN_AUDIENCE.to_owned(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(&self.jwt_secret),
        )
        .map_err(|e| AppError::internal(format!("Failed to generate token: {e}")))
    }

    /// Validate a token and return its claims
    ///
    /// # Errors
    ///
    /// Returns a [`JwtValidationError`] describing expiry, bad signature, or
    /// malformed structure
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtValidationError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[TOKEN_AUDIENCE]);

        match decode::<Claims>(
            token,
            &DecodingKey::from_secret(&self.jwt_secret),
            &validation,
        ) {
            Ok(data) => Ok(data.claims),
            Err(e) => Err(Self::convert_jwt_error(&e, token)),
        }
    }

    /// Extract the user id from a validated token
    ///
    /// # Errors
    ///
    /// Returns a validation error for a bad token, or `TokenMalformed` if the
    /// subject is not a UUID
    pub fn extract_user_id(&self, token: &str) -> Result<Uuid, JwtValidationError> {
        let claims = self.validate_token(token)?;
        Uuid::parse_str(&claims.sub).map_err(|e| JwtValidationError::TokenMalformed {
            details: format!("Subject is not a valid user id: {e}"),
        })
    }

    /// Map jsonwebtoken errors to our detailed error type
    fn convert_jwt_error(e: &jsonwebtoken::errors::Error, token: &str) -> JwtValidationError {
        use jsonwebtoken::errors::ErrorKind;

        match e.kind() {
            ErrorKind::ExpiredSignature => {
                // Decode without expiry validation to report when it expired
                let expired_at = Self::decode_expiry(token).unwrap_or_else(Utc::now);
                JwtValidationError::TokenExpired {
                    expired_at,
                    current_time: Utc::now(),
                }
            }
            ErrorKind::InvalidSignature => JwtValidationError::TokenInvalid {
                reason: "signature verification failed".to_owned(),
            },
            ErrorKind::InvalidToken => JwtValidationError::TokenMalformed {
                details: "token structure is invalid".to_owned(),
            },
            ErrorKind::Base64(base64_err) => JwtValidationError::TokenMalformed {
                details: format!("invalid base64 encoding: {base64_err}"),
            },
            ErrorKind::Json(json_err) => JwtValidationError::TokenMalformed {
                details: format!("invalid JSON in claims: {json_err}"),
            },
            _ => JwtValidationError::TokenInvalid {
                reason: e.to_string(),
            },
        }
    }

    /// Best-effort decode of the `exp` claim from an expired token
    fn decode_expiry(token: &str) -> Option<DateTime<Utc>> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.insecure_disable_signature_validation();

        decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)
            .ok()
            .and_then(|data| DateTime::from_timestamp(data.claims.exp, 0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> AuthManager {
        AuthManager::new(b"test-secret-key-for-unit-tests".to_vec(), 24)
    }

    fn test_user() -> User {
        User::new(
            "cook@example.com".into(),
            "hash".into(),
            Some("Cook".into()),
        )
    }

    #[test]
    fn test_token_roundtrip() {
        let manager = manager();
        let user = test_user();
        let token = manager.generate_token(&user).unwrap();
        let claims = manager.validate_token(&token).unwrap();
        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.email, user.email);
        assert_eq!(claims.aud, TOKEN_AUDIENCE);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = manager().generate_token(&test_user()).unwrap();
        let other = AuthManager::new(b"a-different-secret-entirely".to_vec(), 24);
        assert!(matches!(
            other.validate_token(&token),
            Err(JwtValidationError::TokenInvalid { .. })
        ));
    }

    #[test]
    fn test_expired_token_reports_expiry() {
        let manager = AuthManager::new(b"test-secret-key-for-unit-tests".to_vec(), -1);
        let token = manager.generate_token(&test_user()).unwrap();
        match manager.validate_token(&token) {
            Err(JwtValidationError::TokenExpired { expired_at, .. }) => {
                assert!(expired_at < Utc::now());
            }
            other => panic!("expected expired error, got {other:?}"),
        }
    }

    #[test]
    fn test_garbage_token_is_malformed() {
        assert!(matches!(
            manager().validate_token("not-a-jwt"),
            Err(JwtValidationError::TokenMalformed { .. })
        ));
    }

    #[test]
    fn test_password_roundtrip() {
        let hash = AuthManager::hash_password("hunter2hunter2").unwrap();
        assert!(AuthManager::verify_password("hunter2hunter2", &hash).unwrap());
        assert!(!AuthManager::verify_password("wrong", &hash).unwrap());
    }
}
