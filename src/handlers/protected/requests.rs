use axum::extract::{Extension, Path};
use axum::response::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::{LeadRequest, LeadRequestWithSender, RequestAction};
use crate::middleware::auth::AuthUser;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::request_service::{CreateRequest, RequestCounts, RequestService};

#[derive(Debug, Deserialize)]
pub struct ChangeActionRequest {
    pub action: RequestAction,
}

/// POST /api/request - Propose moving a lead to a different
/// branch/pipeline/stage. The caller becomes the sender.
pub async fn create(
    Extension(auth_user): Extension<AuthUser>,
    Json(payload): Json<CreateRequest>,
) -> ApiResult<LeadRequest> {
    let service = RequestService::new().await?;
    let request = service.create(auth_user.user_id, payload).await?;
    Ok(ApiResponse::created(request))
}

/// GET /api/request/my-requests - All requests involving the caller,
/// most recent first
pub async fn my_requests(
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<Vec<LeadRequestWithSender>> {
    let service = RequestService::new().await?;
    let requests = service.list_for_user(auth_user.user_id).await?;
    Ok(ApiResponse::success(requests))
}

/// GET /api/request/counts - Pending-on-me and my-unread-decided tallies
pub async fn counts(Extension(auth_user): Extension<AuthUser>) -> ApiResult<RequestCounts> {
    let service = RequestService::new().await?;
    let counts = service.counts_for_user(auth_user.user_id).await?;
    Ok(ApiResponse::success(counts))
}

/// PUT /api/request/change-action/:id - Receiver accepts or declines
pub async fn change_action(
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ChangeActionRequest>,
) -> ApiResult<LeadRequest> {
    let service = RequestService::new().await?;
    let request = service
        .change_action(auth_user.user_id, id, payload.action)
        .await?;
    Ok(ApiResponse::success(request))
}

/// PUT /api/request/mark-read/:id - Sender acknowledges the decision
pub async fn mark_read(
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<LeadRequest> {
    let service = RequestService::new().await?;
    let request = service.mark_read(auth_user.user_id, id).await?;
    Ok(ApiResponse::success(request))
}
