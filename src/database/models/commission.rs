use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Per-deal, per-user commission ledger row.
///
/// Invariant: paid_amount + remaining_commission == total_commission.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CommissionPayment {
    pub id: Uuid,
    pub deal_id: Uuid,
    pub user_id: Uuid,
    pub total_commission: Decimal,
    pub paid_amount: Decimal,
    pub remaining_commission: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// List-view row with deal and user details joined in, replacing the
/// document-store populate with an explicit read-time join.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CommissionRecord {
    pub id: Uuid,
    pub deal_id: Uuid,
    pub user_id: Uuid,
    pub total_commission: Decimal,
    pub paid_amount: Decimal,
    pub remaining_commission: Decimal,
    pub deal_status: String,
    pub client_name: String,
    pub client_email: String,
    pub user_name: String,
    pub user_email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
