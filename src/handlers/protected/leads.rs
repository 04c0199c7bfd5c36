use axum::extract::{Extension, Path};
use axum::response::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::config;
use crate::database::manager::DatabaseManager;
use crate::database::models::Lead;
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::middleware::response::{ApiResponse, ApiResult};

const LEAD_COLUMNS: &str = "id, client_name, client_phone, branch, pipeline, product_stage, \
     created_by, created_at, updated_at";

#[derive(Debug, Deserialize)]
pub struct CreateLead {
    pub client_name: String,
    pub client_phone: String,
    pub branch: String,
    pub pipeline: String,
    pub product_stage: String,
}

/// POST /api/leads - Register a new lead
pub async fn create(
    Extension(auth_user): Extension<AuthUser>,
    Json(payload): Json<CreateLead>,
) -> ApiResult<Lead> {
    if payload.client_name.trim().is_empty() {
        return Err(ApiError::missing_field("client_name"));
    }
    if payload.client_phone.trim().is_empty() {
        return Err(ApiError::missing_field("client_phone"));
    }

    let pool = DatabaseManager::pool().await?;
    let sql = format!(
        "INSERT INTO leads (id, client_name, client_phone, branch, pipeline, \
         product_stage, created_by) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         RETURNING {LEAD_COLUMNS}"
    );
    let lead: Lead = sqlx::query_as(&sql)
        .bind(Uuid::new_v4())
        .bind(payload.client_name.trim())
        .bind(payload.client_phone.trim())
        .bind(&payload.branch)
        .bind(&payload.pipeline)
        .bind(&payload.product_stage)
        .bind(auth_user.user_id)
        .fetch_one(&pool)
        .await?;

    Ok(ApiResponse::created(lead))
}

/// GET /api/leads/:id
pub async fn get_by_id(Path(id): Path<Uuid>) -> ApiResult<Lead> {
    let pool = DatabaseManager::pool().await?;
    let sql = format!("SELECT {LEAD_COLUMNS} FROM leads WHERE id = $1");
    let lead: Option<Lead> = sqlx::query_as(&sql).bind(id).fetch_optional(&pool).await?;

    match lead {
        Some(lead) => Ok(ApiResponse::success(lead)),
        None => Err(ApiError::not_found("Lead not found")),
    }
}

/// GET /api/leads - Newest leads first
pub async fn list() -> ApiResult<Vec<Lead>> {
    let pool = DatabaseManager::pool().await?;
    let page_size = config::config().api.default_page_size;
    let sql = format!("SELECT {LEAD_COLUMNS} FROM leads ORDER BY created_at DESC LIMIT $1");
    let leads: Vec<Lead> = sqlx::query_as(&sql).bind(page_size).fetch_all(&pool).await?;
    Ok(ApiResponse::success(leads))
}
