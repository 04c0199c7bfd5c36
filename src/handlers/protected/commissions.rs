use axum::extract::Path;
use axum::response::Json;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::{CommissionPayment, CommissionRecord};
use crate::error::ApiError;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::commission_service::{CommissionInput, CommissionService};

#[derive(Debug, Deserialize)]
pub struct StoreCommissionsRequest {
    pub deal_id: Uuid,
    pub commission_data: Vec<CommissionInput>,
}

#[derive(Debug, Deserialize)]
pub struct PayCommissionRequest {
    pub user_id: Uuid,
    pub deal_id: Uuid,
    pub payment_amount: Decimal,
}

/// POST /api/commission/store-commissions - Open ledger rows for a deal
pub async fn store(Json(payload): Json<StoreCommissionsRequest>) -> ApiResult<Vec<CommissionPayment>> {
    let service = CommissionService::new().await?;
    let payments = service
        .store_commissions(payload.deal_id, &payload.commission_data)
        .await?;
    Ok(ApiResponse::created(payments))
}

/// PUT /api/commission/commissions/pay - Apply a payment against a
/// user's commission for a deal
pub async fn pay(Json(payload): Json<PayCommissionRequest>) -> ApiResult<CommissionPayment> {
    let service = CommissionService::new().await?;
    let payment = service
        .pay(payload.user_id, payload.deal_id, payload.payment_amount)
        .await?;
    Ok(ApiResponse::success(payment))
}

/// GET /api/commission/commissions - All ledger rows with deal and user
/// details joined in
pub async fn list_all() -> ApiResult<Vec<CommissionRecord>> {
    let service = CommissionService::new().await?;
    let records = service.list_all().await?;
    Ok(ApiResponse::success(records))
}

/// GET /api/commission/commissions/deal/:deal_id
pub async fn list_by_deal(Path(deal_id): Path<Uuid>) -> ApiResult<Vec<CommissionRecord>> {
    let service = CommissionService::new().await?;
    let records = service.list_by_deal(deal_id).await?;

    if records.is_empty() {
        return Err(ApiError::not_found("No commissions found for this deal"));
    }
    Ok(ApiResponse::success(records))
}

/// GET /api/commission/commissions/user/:user_id
pub async fn list_by_user(Path(user_id): Path<Uuid>) -> ApiResult<Vec<CommissionRecord>> {
    let service = CommissionService::new().await?;
    let records = service.list_by_user(user_id).await?;

    if records.is_empty() {
        return Err(ApiError::not_found("No commissions found for this user"));
    }
    Ok(ApiResponse::success(records))
}
