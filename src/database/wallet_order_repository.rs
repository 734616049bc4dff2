use crate::database::error::DatabaseError;
use crate::database::repository::TransactionalRepository;
use bigdecimal::BigDecimal;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

/// Reconciliation record for a mobile-wallet payment order
///
/// Created when the remote order is placed; the webhook callback updates
/// `status` and `last_status_code`. `order_id` is the provider's identifier
/// and is what the callback carries.
#[derive(Debug, Clone, FromRow, serde::Serialize)]
pub struct WalletOrder {
    pub id: Uuid,
    pub order_id: String,
    pub invoice_id: Uuid,
    pub payment_id: Uuid,
    pub domain: String,
    pub amount: BigDecimal,
    pub status: String,
    pub last_status_code: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

pub struct WalletOrderRepository {
    pool: PgPool,
}

impl WalletOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        order_id: &str,
        invoice_id: Uuid,
        payment_id: Uuid,
        domain: &str,
        amount: BigDecimal,
    ) -> Result<WalletOrder, DatabaseError> {
        sqlx::query_as::<_, WalletOrder>(
            "INSERT INTO wallet_orders (order_id, invoice_id, payment_id, domain, amount, status)
             VALUES ($1, $2, $3, $4, $5, 'created')
             RETURNING id, order_id, invoice_id, payment_id, domain, amount, status, last_status_code, created_at, updated_at",
        )
        .bind(order_id)
        .bind(invoice_id)
        .bind(payment_id)
        .bind(domain)
        .bind(amount)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)
    }

    pub async fn find_by_order_id(
        &self,
        order_id: &str,
    ) -> Result<Option<WalletOrder>, DatabaseError> {
        sqlx::query_as::<_, WalletOrder>(
            "SELECT id, order_id, invoice_id, payment_id, domain, amount, status, last_status_code, created_at, updated_at
             FROM wallet_orders WHERE order_id = $1",
        )
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)
    }

    pub async fn record_callback(
        &self,
        id: Uuid,
        status: &str,
        status_code: &str,
    ) -> Result<WalletOrder, DatabaseError> {
        sqlx::query_as::<_, WalletOrder>(
            "UPDATE wallet_orders SET status = $2, last_status_code = $3, updated_at = NOW()
             WHERE id = $1
             RETURNING id, order_id, invoice_id, payment_id, domain, amount, status, last_status_code, created_at, updated_at",
        )
        .bind(id)
        .bind(status)
        .bind(status_code)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)?
        .ok_or_else(|| DatabaseError::not_found("WalletOrder", id))
    }
}

impl TransactionalRepository for WalletOrderRepository {
    fn pool(&self) -> &PgPool {
        &self.pool
    }
}
