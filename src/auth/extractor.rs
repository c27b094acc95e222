use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use chrono::Utc;
use uuid::Uuid;

use crate::auth::{jwt, token};
use crate::db;
use crate::error::AppError;
use crate::models::{ADMIN, MANAGER};
use crate::state::SharedState;

/// The caller behind a valid, unrevoked bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub username: String,
    pub roles: Vec<String>,
    pub token_id: Uuid,
}

impl AuthUser {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn require_any(&self, roles: &[&str]) -> Result<(), AppError> {
        if roles.iter().any(|role| self.has_role(role)) {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "One of the following roles is required: {}",
                roles.join(", ")
            )))
        }
    }

    pub fn require_admin(&self) -> Result<(), AppError> {
        self.require_any(&[ADMIN])
    }

    pub fn require_admin_or_manager(&self) -> Result<(), AppError> {
        self.require_any(&[ADMIN, MANAGER])
    }

    /// Any assigned role is enough.
    pub fn require_role(&self) -> Result<(), AppError> {
        if self.roles.is_empty() {
            Err(AppError::Forbidden("A role is required".to_string()))
        } else {
            Ok(())
        }
    }
}

impl FromRequestParts<SharedState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .ok_or_else(|| AppError::Unauthorized("Missing authentication token".to_string()))?;

        let auth_str = auth_header
            .to_str()
            .map_err(|_| AppError::Unauthorized("Invalid authorization header".to_string()))?;

        let bearer = auth_str
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Unauthorized("Missing authentication token".to_string()))?;

        let claims = jwt::decode_token(bearer, &state.config.jwt)
            .map_err(|_| AppError::Unauthorized("Invalid or expired token".to_string()))?;

        // Logout deletes the row, which revokes the token before it expires.
        let stored = db::user_tokens::find_by_access_hash(&state.pool, &token::hash_token(bearer))
            .await?
            .filter(|t| t.id == claims.jti && t.user_id == claims.sub && t.is_access_valid(Utc::now()))
            .ok_or_else(|| AppError::Unauthorized("Token has been revoked".to_string()))?;

        Ok(AuthUser {
            user_id: claims.sub,
            username: claims.name,
            roles: claims.roles,
            token_id: stored.id,
        })
    }
}
