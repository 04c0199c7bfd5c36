use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// The calstatus value that marks a number as blocked
pub const CALSTATUS_BLOCKED: &str = "Blocked";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PhonebookEntry {
    pub id: Uuid,
    pub number: String,
    pub user_id: Uuid,
    pub calstatus: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PhonebookComment {
    pub id: Uuid,
    pub phonebook_id: Uuid,
    pub user_id: Uuid,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}
