use axum::extract::{Extension, Path};
use axum::response::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::models::Label;
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::middleware::response::{ApiResponse, ApiResult};

const LABEL_COLUMNS: &str = "id, name, color, pipeline, created_by, created_at, updated_at";

#[derive(Debug, Deserialize)]
pub struct CreateLabel {
    pub name: String,
    #[serde(default)]
    pub color: String,
    pub pipeline: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateLabel {
    pub name: String,
    #[serde(default)]
    pub color: String,
    pub pipeline: String,
}

/// GET /api/labels/pipeline/:pipeline - Labels scoped to one pipeline
pub async fn by_pipeline(Path(pipeline): Path<String>) -> ApiResult<Vec<Label>> {
    let pool = DatabaseManager::pool().await?;
    let sql = format!("SELECT {LABEL_COLUMNS} FROM labels WHERE pipeline = $1 ORDER BY name");
    let labels: Vec<Label> = sqlx::query_as(&sql).bind(&pipeline).fetch_all(&pool).await?;

    if labels.is_empty() {
        return Err(ApiError::not_found("No labels found for this pipeline"));
    }
    Ok(ApiResponse::success(labels))
}

/// POST /api/labels/create - Create a new label
pub async fn create(
    Extension(auth_user): Extension<AuthUser>,
    Json(payload): Json<CreateLabel>,
) -> ApiResult<Label> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::missing_field("name"));
    }
    if payload.pipeline.trim().is_empty() {
        return Err(ApiError::missing_field("pipeline"));
    }

    let pool = DatabaseManager::pool().await?;
    let sql = format!(
        "INSERT INTO labels (id, name, color, pipeline, created_by) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING {LABEL_COLUMNS}"
    );
    let label: Label = sqlx::query_as(&sql)
        .bind(Uuid::new_v4())
        .bind(payload.name.trim())
        .bind(&payload.color)
        .bind(payload.pipeline.trim())
        .bind(auth_user.user_id)
        .fetch_one(&pool)
        .await?;

    Ok(ApiResponse::created(label))
}

/// GET /api/labels/all - Every label
pub async fn all() -> ApiResult<Vec<Label>> {
    let pool = DatabaseManager::pool().await?;
    let sql = format!("SELECT {LABEL_COLUMNS} FROM labels ORDER BY created_at DESC");
    let labels: Vec<Label> = sqlx::query_as(&sql).fetch_all(&pool).await?;
    Ok(ApiResponse::success(labels))
}

/// GET /api/labels/:id
pub async fn get_by_id(Path(id): Path<Uuid>) -> ApiResult<Label> {
    let pool = DatabaseManager::pool().await?;
    let sql = format!("SELECT {LABEL_COLUMNS} FROM labels WHERE id = $1");
    let label: Option<Label> = sqlx::query_as(&sql).bind(id).fetch_optional(&pool).await?;

    match label {
        Some(label) => Ok(ApiResponse::success(label)),
        None => Err(ApiError::not_found("Label not found")),
    }
}

/// PUT /api/labels/:id - Replace the mutable fields and stamp updated_at
pub async fn update(Path(id): Path<Uuid>, Json(payload): Json<UpdateLabel>) -> ApiResult<Label> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::missing_field("name"));
    }
    if payload.pipeline.trim().is_empty() {
        return Err(ApiError::missing_field("pipeline"));
    }

    let pool = DatabaseManager::pool().await?;
    let sql = format!(
        "UPDATE labels SET name = $1, color = $2, pipeline = $3, updated_at = NOW() \
         WHERE id = $4 \
         RETURNING {LABEL_COLUMNS}"
    );
    let label: Option<Label> = sqlx::query_as(&sql)
        .bind(payload.name.trim())
        .bind(&payload.color)
        .bind(payload.pipeline.trim())
        .bind(id)
        .fetch_optional(&pool)
        .await?;

    match label {
        Some(label) => Ok(ApiResponse::success(label)),
        None => Err(ApiError::not_found("Label not found")),
    }
}

/// DELETE /api/labels/:id
pub async fn delete(Path(id): Path<Uuid>) -> ApiResult<serde_json::Value> {
    let pool = DatabaseManager::pool().await?;
    let result = sqlx::query("DELETE FROM labels WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Label not found"));
    }
    Ok(ApiResponse::success(
        serde_json::json!({ "message": "Label deleted successfully" }),
    ))
}
