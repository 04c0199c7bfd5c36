use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{LeadRequest, LeadRequestWithSender, RequestAction};

/// Column list shared by every query that materializes a full request row
const REQUEST_COLUMNS: &str = "id, sender, receivers, lead_id, branch, pipeline, \
     product_stage, message, request_type, action, action_changed_by, read, \
     created_at, updated_at";

#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("{0}")]
    Validation(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Caller is not a receiver of this request")]
    NotReceiver,
    #[error("Caller is not the sender of this request")]
    NotSender,
    #[error("Request has already been decided")]
    AlreadyDecided,
    #[error("Request is still pending")]
    StillPending,
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl From<sqlx::Error> for RequestError {
    fn from(err: sqlx::Error) -> Self {
        RequestError::Database(DatabaseError::Sqlx(err))
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateRequest {
    pub receivers: Vec<Uuid>,
    pub lead_id: Uuid,
    pub branch: String,
    pub pipeline: String,
    pub product_stage: String,
    #[serde(default)]
    pub message: String,
    pub request_type: String,
}

/// Pending/unread tallies surfaced next to the request list
#[derive(Debug, serde::Serialize, sqlx::FromRow)]
pub struct RequestCounts {
    pub pending: i64,
    pub unread_actioned: i64,
}

/// Lead reassignment request workflow.
///
/// Both mutations are single conditional UPDATEs: the state precondition is
/// part of the WHERE clause, so concurrent callers acting on the same row
/// cannot both win. The loser observes the already-mutated row and gets a
/// precise error back.
pub struct RequestService {
    pool: PgPool,
}

impl RequestService {
    pub async fn new() -> Result<Self, RequestError> {
        let pool = DatabaseManager::pool().await?;
        Ok(Self { pool })
    }

    /// Persist a new request with action = Pending, read = false.
    ///
    /// Rejects an empty receiver list, and requires the lead and every
    /// receiver to resolve.
    pub async fn create(
        &self,
        sender: Uuid,
        params: CreateRequest,
    ) -> Result<LeadRequest, RequestError> {
        let mut receivers = params.receivers.clone();
        receivers.sort();
        receivers.dedup();

        if receivers.is_empty() {
            return Err(RequestError::Validation(
                "A request must name at least one receiver".to_string(),
            ));
        }
        if params.request_type.trim().is_empty() {
            return Err(RequestError::Validation(
                "Request type is required".to_string(),
            ));
        }

        let lead_exists: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM leads WHERE id = $1")
            .bind(params.lead_id)
            .fetch_optional(&self.pool)
            .await?;
        if lead_exists.is_none() {
            return Err(RequestError::NotFound(format!(
                "Lead {} not found",
                params.lead_id
            )));
        }

        let (known_receivers,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM users WHERE id = ANY($1)")
                .bind(&receivers)
                .fetch_one(&self.pool)
                .await?;
        if known_receivers != receivers.len() as i64 {
            return Err(RequestError::NotFound(
                "One or more receivers do not exist".to_string(),
            ));
        }

        let sql = format!(
            "INSERT INTO requests (id, sender, receivers, lead_id, branch, pipeline, \
             product_stage, message, request_type) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {REQUEST_COLUMNS}"
        );
        let request: LeadRequest = sqlx::query_as(&sql)
            .bind(Uuid::new_v4())
            .bind(sender)
            .bind(&receivers)
            .bind(params.lead_id)
            .bind(&params.branch)
            .bind(&params.pipeline)
            .bind(&params.product_stage)
            .bind(&params.message)
            .bind(&params.request_type)
            .fetch_one(&self.pool)
            .await?;

        Ok(request)
    }

    /// All requests where the caller is sender or receiver, newest first
    pub async fn list_for_user(
        &self,
        caller: Uuid,
    ) -> Result<Vec<LeadRequestWithSender>, RequestError> {
        let rows: Vec<LeadRequestWithSender> = sqlx::query_as(
            "SELECT r.id, r.sender, u.name AS sender_name, r.receivers, r.lead_id, \
             r.branch, r.pipeline, r.product_stage, r.message, r.request_type, \
             r.action, r.action_changed_by, r.read, r.created_at, r.updated_at \
             FROM requests r \
             JOIN users u ON u.id = r.sender \
             WHERE r.sender = $1 OR $1 = ANY(r.receivers) \
             ORDER BY r.created_at DESC",
        )
        .bind(caller)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Derived counts: requests waiting on the caller's decision, and the
    /// caller's own decided-but-unread requests.
    pub async fn counts_for_user(&self, caller: Uuid) -> Result<RequestCounts, RequestError> {
        let counts: RequestCounts = sqlx::query_as(
            "SELECT \
             COUNT(*) FILTER (WHERE $1 = ANY(receivers) AND action = 'Pending') AS pending, \
             COUNT(*) FILTER (WHERE sender = $1 AND action <> 'Pending' AND read = false) \
                 AS unread_actioned \
             FROM requests",
        )
        .bind(caller)
        .fetch_one(&self.pool)
        .await?;

        Ok(counts)
    }

    /// Transition a pending request to Accept or Decline.
    ///
    /// Only a listed receiver may decide, and only while the request is
    /// pending. On Accept the proposed branch/pipeline/stage are applied to
    /// the lead in the same transaction.
    pub async fn change_action(
        &self,
        caller: Uuid,
        request_id: Uuid,
        action: RequestAction,
    ) -> Result<LeadRequest, RequestError> {
        if !action.is_terminal() {
            return Err(RequestError::Validation(
                "Action must be Accept or Decline".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "UPDATE requests \
             SET action = $1, action_changed_by = $2, updated_at = NOW() \
             WHERE id = $3 AND action = 'Pending' AND $2 = ANY(receivers) \
             RETURNING {REQUEST_COLUMNS}"
        );
        let updated: Option<LeadRequest> = sqlx::query_as(&sql)
            .bind(action)
            .bind(caller)
            .bind(request_id)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(request) = updated else {
            // The conditional update matched nothing; re-read to say why
            let sql = format!("SELECT {REQUEST_COLUMNS} FROM requests WHERE id = $1");
            let existing: Option<LeadRequest> = sqlx::query_as(&sql)
                .bind(request_id)
                .fetch_optional(&mut *tx)
                .await?;
            return Err(classify_decision_failure(caller, request_id, existing));
        };

        if request.action == RequestAction::Accept {
            sqlx::query(
                "UPDATE leads \
                 SET branch = $1, pipeline = $2, product_stage = $3, updated_at = NOW() \
                 WHERE id = $4",
            )
            .bind(&request.branch)
            .bind(&request.pipeline)
            .bind(&request.product_stage)
            .bind(request.lead_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::info!(
            "Request {} {:?} by {}",
            request.id,
            request.action,
            caller
        );
        Ok(request)
    }

    /// Sender acknowledges a decided request. Idempotent once read.
    pub async fn mark_read(
        &self,
        caller: Uuid,
        request_id: Uuid,
    ) -> Result<LeadRequest, RequestError> {
        let sql = format!(
            "UPDATE requests \
             SET read = true, updated_at = NOW() \
             WHERE id = $1 AND sender = $2 AND action <> 'Pending' \
             RETURNING {REQUEST_COLUMNS}"
        );
        let updated: Option<LeadRequest> = sqlx::query_as(&sql)
            .bind(request_id)
            .bind(caller)
            .fetch_optional(&self.pool)
            .await?;

        match updated {
            Some(request) => Ok(request),
            None => {
                let sql = format!("SELECT {REQUEST_COLUMNS} FROM requests WHERE id = $1");
                let existing: Option<LeadRequest> = sqlx::query_as(&sql)
                    .bind(request_id)
                    .fetch_optional(&self.pool)
                    .await?;
                Err(classify_read_failure(caller, request_id, existing))
            }
        }
    }
}

/// Explain why the change-action update matched no row.
/// Receiver membership is checked before decidedness so an outsider gets 403
/// even on an already-decided request.
fn classify_decision_failure(
    caller: Uuid,
    request_id: Uuid,
    existing: Option<LeadRequest>,
) -> RequestError {
    match existing {
        None => RequestError::NotFound(format!("Request {} not found", request_id)),
        Some(r) if !r.receivers.contains(&caller) => RequestError::NotReceiver,
        Some(_) => RequestError::AlreadyDecided,
    }
}

/// Explain why the mark-read update matched no row
fn classify_read_failure(
    caller: Uuid,
    request_id: Uuid,
    existing: Option<LeadRequest>,
) -> RequestError {
    match existing {
        None => RequestError::NotFound(format!("Request {} not found", request_id)),
        Some(r) if r.sender != caller => RequestError::NotSender,
        Some(_) => RequestError::StillPending,
    }
}
