use crate::database::error::DatabaseError;
use crate::database::repository::{Repository, TransactionalRepository};
use async_trait::async_trait;
use bigdecimal::BigDecimal;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

/// Payment entity
///
/// `evidence_url` holds the public screenshot URL for bank-transfer
/// payments; card and wallet payments carry the gateway reference instead.
#[derive(Debug, Clone, FromRow, serde::Serialize)]
pub struct Payment {
    pub id: Uuid,
    pub invoice_id: Uuid,
    pub method: String,
    pub status: String,
    pub amount: BigDecimal,
    pub reference: Option<String>,
    pub evidence_url: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// New payment fields
#[derive(Debug, Clone)]
pub struct PaymentInput {
    pub invoice_id: Uuid,
    pub method: String,
    pub status: String,
    pub amount: BigDecimal,
    pub reference: Option<String>,
    pub evidence_url: Option<String>,
}

pub struct PaymentRepository {
    pool: PgPool,
}

impl PaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, input: &PaymentInput) -> Result<Payment, DatabaseError> {
        sqlx::query_as::<_, Payment>(
            "INSERT INTO payments (invoice_id, method, status, amount, reference, evidence_url)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING id, invoice_id, method, status, amount, reference, evidence_url, created_at, updated_at",
        )
        .bind(input.invoice_id)
        .bind(&input.method)
        .bind(&input.status)
        .bind(&input.amount)
        .bind(&input.reference)
        .bind(&input.evidence_url)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<Payment>, DatabaseError> {
        sqlx::query_as::<_, Payment>(
            "SELECT id, invoice_id, method, status, amount, reference, evidence_url, created_at, updated_at
             FROM payments WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)
    }

    pub async fn find_by_invoice(&self, invoice_id: Uuid) -> Result<Vec<Payment>, DatabaseError> {
        sqlx::query_as::<_, Payment>(
            "SELECT id, invoice_id, method, status, amount, reference, evidence_url, created_at, updated_at
             FROM payments WHERE invoice_id = $1 ORDER BY created_at DESC",
        )
        .bind(invoice_id)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)
    }

    pub async fn set_status(&self, id: Uuid, status: &str) -> Result<Payment, DatabaseError> {
        sqlx::query_as::<_, Payment>(
            "UPDATE payments SET status = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING id, invoice_id, method, status, amount, reference, evidence_url, created_at, updated_at",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)?
        .ok_or_else(|| DatabaseError::not_found("Payment", id))
    }
}

#[async_trait]
impl Repository for PaymentRepository {
    type Entity = Payment;

    async fn find_by_id(&self, id: &str) -> Result<Option<Self::Entity>, DatabaseError> {
        let uuid = Uuid::parse_str(id).map_err(|e| {
            DatabaseError::new(crate::database::error::DatabaseErrorKind::Unknown {
                message: format!("Invalid UUID: {}", e),
            })
        })?;
        self.find(uuid).await
    }

    async fn find_all(&self) -> Result<Vec<Self::Entity>, DatabaseError> {
        sqlx::query_as::<_, Payment>(
            "SELECT id, invoice_id, method, status, amount, reference, evidence_url, created_at, updated_at
             FROM payments ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)
    }

    async fn delete(&self, id: &str) -> Result<bool, DatabaseError> {
        let uuid = Uuid::parse_str(id).map_err(|e| {
            DatabaseError::new(crate::database::error::DatabaseErrorKind::Unknown {
                message: format!("Invalid UUID: {}", e),
            })
        })?;
        let result = sqlx::query("DELETE FROM payments WHERE id = $1")
            .bind(uuid)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::from_sqlx)?;
        Ok(result.rows_affected() > 0)
    }
}

impl TransactionalRepository for PaymentRepository {
    fn pool(&self) -> &PgPool {
        &self.pool
    }
}
