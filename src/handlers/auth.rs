use axum::{response::Json, Extension};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{self, Claims};
use crate::config;
use crate::database::manager::DatabaseManager;
use crate::database::store::users;
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// POST /auth/login - Authenticate user credentials and receive a JWT
pub async fn login(Json(payload): Json<LoginRequest>) -> Result<Json<Value>, ApiError> {
    let username = payload
        .username
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| ApiError::validation("username is required"))?;
    let password = payload
        .password
        .ok_or_else(|| ApiError::validation("password is required"))?;

    let pool = DatabaseManager::pool().await?;
    let user = users::find_by_username(pool, &username)
        .await?
        .ok_or_else(|| ApiError::unauthorized("invalid credentials"))?;

    if !auth::verify_password(&password, &user.password_digest) {
        // Same message for unknown user and wrong password
        return Err(ApiError::unauthorized("invalid credentials"));
    }

    let claims = Claims::new(user.id, user.username.clone(), user.role);
    let token = auth::generate_jwt(claims).map_err(|e| {
        tracing::error!("JWT generation failed: {}", e);
        ApiError::internal_server_error("failed to issue token")
    })?;

    let expires_in = config::config().security.jwt_expiry_hours * 3600;
    tracing::info!(username = %user.username, role = %user.role, "login");

    Ok(Json(json!({
        "success": true,
        "data": {
            "token": token,
            "user": {
                "id": user.id,
                "username": user.username,
                "name": user.name,
                "role": user.role,
            },
            "expires_in": expires_in
        }
    })))
}

/// GET /api/auth/whoami - Identity behind the current token
pub async fn whoami(Extension(user): Extension<AuthUser>) -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "id": user.id,
            "username": user.username,
            "role": user.role,
        }
    }))
}
