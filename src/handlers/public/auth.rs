use axum::response::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{self, password, Claims};
use crate::config;
use crate::database::manager::DatabaseManager;
use crate::database::models::User;
use crate::error::ApiError;
use crate::middleware::response::{ApiResponse, ApiResult};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /auth/login - Authenticate a user and receive a JWT token
///
/// The same 401 message is returned for an unknown email and a wrong
/// password so the endpoint does not leak which accounts exist.
pub async fn login(Json(payload): Json<LoginRequest>) -> ApiResult<Value> {
    if payload.email.trim().is_empty() {
        return Err(ApiError::missing_field("email"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::missing_field("password"));
    }

    let pool = DatabaseManager::pool().await?;
    let user: Option<User> = sqlx::query_as(
        "SELECT id, name, email, password_hash, role, created_at, updated_at \
         FROM users WHERE email = $1",
    )
    .bind(payload.email.trim())
    .fetch_optional(&pool)
    .await?;

    let Some(user) = user else {
        return Err(ApiError::unauthorized("Invalid email or password"));
    };

    let verified =
        password::verify_password(&payload.password, &user.password_hash).map_err(|e| {
            tracing::error!("Password verification failed for '{}': {}", user.email, e);
            ApiError::internal_server_error("An error occurred while processing your request")
        })?;
    if !verified {
        return Err(ApiError::unauthorized("Invalid email or password"));
    }

    let claims = Claims::new(user.id, user.name.clone(), user.role.clone());
    let token = auth::generate_jwt(claims)?;
    let expires_in = config::config().security.jwt_expiry_hours * 3600;

    tracing::info!("User '{}' logged in", user.email);

    Ok(ApiResponse::success(json!({
        "token": token,
        "user": {
            "id": user.id,
            "name": user.name,
            "email": user.email,
            "role": user.role,
        },
        "expires_in": expires_in,
    })))
}
