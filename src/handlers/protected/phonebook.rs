use axum::extract::{Extension, Path};
use axum::response::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::models::{PhonebookComment, PhonebookEntry, CALSTATUS_BLOCKED};
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::middleware::response::{ApiResponse, ApiResult};

const ENTRY_COLUMNS: &str = "id, number, user_id, calstatus, created_at, updated_at";
const COMMENT_COLUMNS: &str = "id, phonebook_id, user_id, comment, created_at";

#[derive(Debug, Deserialize)]
pub struct CreateEntry {
    pub number: String,
    pub user_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCalstatus {
    pub calstatus: String,
}

#[derive(Debug, Deserialize)]
pub struct AddComment {
    pub phonebook_id: Uuid,
    pub comment: String,
}

/// POST /api/phonebook/create - Register a number against an agent
pub async fn create(Json(payload): Json<CreateEntry>) -> ApiResult<PhonebookEntry> {
    if payload.number.trim().is_empty() {
        return Err(ApiError::missing_field("number"));
    }

    let pool = DatabaseManager::pool().await?;
    let user: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE id = $1")
        .bind(payload.user_id)
        .fetch_optional(&pool)
        .await?;
    if user.is_none() {
        return Err(ApiError::not_found("User not found"));
    }

    let sql = format!(
        "INSERT INTO phonebook_entries (id, number, user_id) \
         VALUES ($1, $2, $3) \
         RETURNING {ENTRY_COLUMNS}"
    );
    let entry: PhonebookEntry = sqlx::query_as(&sql)
        .bind(Uuid::new_v4())
        .bind(payload.number.trim())
        .bind(payload.user_id)
        .fetch_one(&pool)
        .await?;

    Ok(ApiResponse::created(entry))
}

/// GET /api/phonebook/get-all-phonebook - Every entry with its comments
/// joined in, newest entry first
pub async fn get_all() -> ApiResult<Vec<Value>> {
    let pool = DatabaseManager::pool().await?;

    let sql = format!("SELECT {ENTRY_COLUMNS} FROM phonebook_entries ORDER BY created_at DESC");
    let entries: Vec<PhonebookEntry> = sqlx::query_as(&sql).fetch_all(&pool).await?;

    let ids: Vec<Uuid> = entries.iter().map(|e| e.id).collect();
    let sql = format!(
        "SELECT {COMMENT_COLUMNS} FROM phonebook_comments \
         WHERE phonebook_id = ANY($1) ORDER BY created_at"
    );
    let comments: Vec<PhonebookComment> =
        sqlx::query_as(&sql).bind(&ids).fetch_all(&pool).await?;

    let mut by_entry: HashMap<Uuid, Vec<PhonebookComment>> = HashMap::new();
    for comment in comments {
        by_entry.entry(comment.phonebook_id).or_default().push(comment);
    }

    let data = entries
        .into_iter()
        .map(|entry| {
            let comments = by_entry.remove(&entry.id).unwrap_or_default();
            json!({
                "id": entry.id,
                "number": entry.number,
                "user_id": entry.user_id,
                "calstatus": entry.calstatus,
                "created_at": entry.created_at,
                "updated_at": entry.updated_at,
                "comments": comments,
            })
        })
        .collect();

    Ok(ApiResponse::success(data))
}

/// GET /api/phonebook/get-blocked-numbers
pub async fn get_blocked() -> ApiResult<Vec<PhonebookEntry>> {
    let pool = DatabaseManager::pool().await?;
    let sql = format!(
        "SELECT {ENTRY_COLUMNS} FROM phonebook_entries \
         WHERE calstatus = $1 ORDER BY updated_at DESC"
    );
    let entries: Vec<PhonebookEntry> = sqlx::query_as(&sql)
        .bind(CALSTATUS_BLOCKED)
        .fetch_all(&pool)
        .await?;
    Ok(ApiResponse::success(entries))
}

/// PUT /api/phonebook/update-calstatus/:id - Record the outcome of a call
pub async fn update_calstatus(
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCalstatus>,
) -> ApiResult<PhonebookEntry> {
    if payload.calstatus.trim().is_empty() {
        return Err(ApiError::missing_field("calstatus"));
    }

    let pool = DatabaseManager::pool().await?;
    let sql = format!(
        "UPDATE phonebook_entries SET calstatus = $1, updated_at = NOW() \
         WHERE id = $2 \
         RETURNING {ENTRY_COLUMNS}"
    );
    let entry: Option<PhonebookEntry> = sqlx::query_as(&sql)
        .bind(payload.calstatus.trim())
        .bind(id)
        .fetch_optional(&pool)
        .await?;

    match entry {
        Some(entry) => Ok(ApiResponse::success(entry)),
        None => Err(ApiError::not_found("Phonebook entry not found")),
    }
}

/// POST /api/phonebook/add-comment - Comment on an entry as the caller
pub async fn add_comment(
    Extension(auth_user): Extension<AuthUser>,
    Json(payload): Json<AddComment>,
) -> ApiResult<PhonebookComment> {
    if payload.comment.trim().is_empty() {
        return Err(ApiError::missing_field("comment"));
    }

    let pool = DatabaseManager::pool().await?;
    let entry: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM phonebook_entries WHERE id = $1")
        .bind(payload.phonebook_id)
        .fetch_optional(&pool)
        .await?;
    if entry.is_none() {
        return Err(ApiError::not_found("Phonebook entry not found"));
    }

    let sql = format!(
        "INSERT INTO phonebook_comments (id, phonebook_id, user_id, comment) \
         VALUES ($1, $2, $3, $4) \
         RETURNING {COMMENT_COLUMNS}"
    );
    let comment: PhonebookComment = sqlx::query_as(&sql)
        .bind(Uuid::new_v4())
        .bind(payload.phonebook_id)
        .bind(auth_user.user_id)
        .bind(payload.comment.trim())
        .fetch_one(&pool)
        .await?;

    Ok(ApiResponse::created(comment))
}
