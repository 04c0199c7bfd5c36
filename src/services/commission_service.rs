use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{CommissionPayment, CommissionRecord};

const PAYMENT_COLUMNS: &str =
    "id, deal_id, user_id, total_commission, paid_amount, remaining_commission, \
     created_at, updated_at";

const RECORD_QUERY: &str =
    "SELECT cp.id, cp.deal_id, cp.user_id, cp.total_commission, cp.paid_amount, \
     cp.remaining_commission, d.status AS deal_status, d.client_name, d.client_email, \
     u.name AS user_name, u.email AS user_email, cp.created_at, cp.updated_at \
     FROM commission_payments cp \
     JOIN deals d ON d.id = cp.deal_id \
     JOIN users u ON u.id = cp.user_id";

#[derive(Debug, thiserror::Error)]
pub enum CommissionError {
    #[error("Deal not found")]
    DealNotFound,
    #[error("User {0} not found")]
    UserNotFound(Uuid),
    #[error("No commission record for this user and deal")]
    NoRecord,
    #[error("Payment exceeds remaining commission")]
    ExceedsRemaining,
    #[error("Commission amounts must be non-negative")]
    NegativeAmount,
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl From<sqlx::Error> for CommissionError {
    fn from(err: sqlx::Error) -> Self {
        CommissionError::Database(DatabaseError::Sqlx(err))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommissionInput {
    pub user_id: Uuid,
    pub commission: Decimal,
}

/// Per-deal, per-user commission ledger.
///
/// Every successful write preserves
/// paid_amount + remaining_commission == total_commission; a payment is a
/// single conditional UPDATE that only matches while the remaining amount
/// covers it.
pub struct CommissionService {
    pool: PgPool,
}

impl CommissionService {
    pub async fn new() -> Result<Self, CommissionError> {
        let pool = DatabaseManager::pool().await?;
        Ok(Self { pool })
    }

    /// Open one ledger row per user for a deal, all rows in one transaction.
    /// Paid starts at zero, remaining at the full commission.
    pub async fn store_commissions(
        &self,
        deal_id: Uuid,
        commission_data: &[CommissionInput],
    ) -> Result<Vec<CommissionPayment>, CommissionError> {
        if commission_data
            .iter()
            .any(|c| c.commission < Decimal::ZERO)
        {
            return Err(CommissionError::NegativeAmount);
        }

        let deal: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM deals WHERE id = $1")
            .bind(deal_id)
            .fetch_optional(&self.pool)
            .await?;
        if deal.is_none() {
            return Err(CommissionError::DealNotFound);
        }

        let mut tx = self.pool.begin().await?;
        let mut payments = Vec::with_capacity(commission_data.len());

        for input in commission_data {
            let user: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE id = $1")
                .bind(input.user_id)
                .fetch_optional(&mut *tx)
                .await?;
            if user.is_none() {
                return Err(CommissionError::UserNotFound(input.user_id));
            }

            let sql = format!(
                "INSERT INTO commission_payments \
                 (id, deal_id, user_id, total_commission, paid_amount, remaining_commission) \
                 VALUES ($1, $2, $3, $4, 0, $4) \
                 RETURNING {PAYMENT_COLUMNS}"
            );
            let payment: CommissionPayment = sqlx::query_as(&sql)
                .bind(Uuid::new_v4())
                .bind(deal_id)
                .bind(input.user_id)
                .bind(input.commission)
                .fetch_one(&mut *tx)
                .await?;
            payments.push(payment);
        }

        tx.commit().await?;
        Ok(payments)
    }

    /// Apply a payment against a user's commission for a deal.
    ///
    /// The overdraft check lives in the UPDATE's WHERE clause, so two
    /// concurrent payments cannot drive the remaining amount negative.
    pub async fn pay(
        &self,
        user_id: Uuid,
        deal_id: Uuid,
        payment_amount: Decimal,
    ) -> Result<CommissionPayment, CommissionError> {
        if payment_amount < Decimal::ZERO {
            return Err(CommissionError::NegativeAmount);
        }

        let sql = format!(
            "UPDATE commission_payments \
             SET paid_amount = paid_amount + $3, \
                 remaining_commission = remaining_commission - $3, \
                 updated_at = NOW() \
             WHERE user_id = $1 AND deal_id = $2 AND remaining_commission >= $3 \
             RETURNING {PAYMENT_COLUMNS}"
        );
        let updated: Option<CommissionPayment> = sqlx::query_as(&sql)
            .bind(user_id)
            .bind(deal_id)
            .bind(payment_amount)
            .fetch_optional(&self.pool)
            .await?;

        match updated {
            Some(payment) => Ok(payment),
            None => {
                let exists: Option<(Uuid,)> = sqlx::query_as(
                    "SELECT id FROM commission_payments WHERE user_id = $1 AND deal_id = $2",
                )
                .bind(user_id)
                .bind(deal_id)
                .fetch_optional(&self.pool)
                .await?;
                match exists {
                    None => Err(CommissionError::NoRecord),
                    Some(_) => Err(CommissionError::ExceedsRemaining),
                }
            }
        }
    }

    /// All ledger rows with deal and user details joined in
    pub async fn list_all(&self) -> Result<Vec<CommissionRecord>, CommissionError> {
        let sql = format!("{RECORD_QUERY} ORDER BY cp.created_at DESC");
        Ok(sqlx::query_as(&sql).fetch_all(&self.pool).await?)
    }

    pub async fn list_by_deal(
        &self,
        deal_id: Uuid,
    ) -> Result<Vec<CommissionRecord>, CommissionError> {
        let sql = format!("{RECORD_QUERY} WHERE cp.deal_id = $1 ORDER BY cp.created_at DESC");
        Ok(sqlx::query_as(&sql)
            .bind(deal_id)
            .fetch_all(&self.pool)
            .await?)
    }

    pub async fn list_by_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<CommissionRecord>, CommissionError> {
        let sql = format!("{RECORD_QUERY} WHERE cp.user_id = $1 ORDER BY cp.created_at DESC");
        Ok(sqlx::query_as(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?)
    }
}
