use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Decision state of a lead reassignment request.
///
/// Starts at `Pending` and transitions exactly once to `Accept` or `Decline`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "request_action")]
pub enum RequestAction {
    Pending,
    Accept,
    Decline,
}

impl RequestAction {
    /// A request is terminal once a receiver has accepted or declined it
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RequestAction::Pending)
    }
}

/// A proposed reassignment of a lead's branch/pipeline/stage, awaiting
/// approval by one of the listed receivers.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LeadRequest {
    pub id: Uuid,
    pub sender: Uuid,
    pub receivers: Vec<Uuid>,
    pub lead_id: Uuid,
    pub branch: String,
    pub pipeline: String,
    pub product_stage: String,
    pub message: String,
    pub request_type: String,
    pub action: RequestAction,
    pub action_changed_by: Option<Uuid>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// List-view row with the sender's display name joined in
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LeadRequestWithSender {
    pub id: Uuid,
    pub sender: Uuid,
    pub sender_name: String,
    pub receivers: Vec<Uuid>,
    pub lead_id: Uuid,
    pub branch: String,
    pub pipeline: String,
    pub product_stage: String,
    pub message: String,
    pub request_type: String,
    pub action: RequestAction,
    pub action_changed_by: Option<Uuid>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
