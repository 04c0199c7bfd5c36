use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A sales prospect moving through pipeline stages.
/// Branch, pipeline and product stage are opaque identifiers carried through
/// from the upstream sales process configuration.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Lead {
    pub id: Uuid,
    pub client_name: String,
    pub client_phone: String,
    pub branch: String,
    pub pipeline: String,
    pub product_stage: String,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
