use crate::database::error::DatabaseError;
use crate::database::repository::{Repository, TransactionalRepository};
use async_trait::async_trait;
use bigdecimal::BigDecimal;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

/// Invoice entity
#[derive(Debug, Clone, FromRow, serde::Serialize)]
pub struct Invoice {
    pub id: Uuid,
    pub client_id: Uuid,
    pub invoice_number: String,
    pub status: String,
    pub issue_date: chrono::NaiveDate,
    pub due_date: Option<chrono::NaiveDate>,
    pub total: BigDecimal,
    pub notes: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Invoice line item entity
#[derive(Debug, Clone, FromRow, serde::Serialize)]
pub struct InvoiceItem {
    pub id: Uuid,
    pub invoice_id: Uuid,
    pub description: String,
    pub quantity: BigDecimal,
    pub unit_price: BigDecimal,
    pub amount: BigDecimal,
}

/// Line item fields for inserts
#[derive(Debug, Clone)]
pub struct InvoiceItemInput {
    pub description: String,
    pub quantity: BigDecimal,
    pub unit_price: BigDecimal,
}

/// New invoice fields; `total` is computed from the items by the service layer
#[derive(Debug, Clone)]
pub struct InvoiceInput {
    pub client_id: Uuid,
    pub invoice_number: String,
    pub issue_date: chrono::NaiveDate,
    pub due_date: Option<chrono::NaiveDate>,
    pub notes: Option<String>,
}

pub struct InvoiceRepository {
    pool: PgPool,
}

impl InvoiceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert the invoice and its line items in one transaction
    pub async fn create_with_items(
        &self,
        input: &InvoiceInput,
        items: &[InvoiceItemInput],
        total: BigDecimal,
    ) -> Result<Invoice, DatabaseError> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::from_sqlx)?;

        let invoice = sqlx::query_as::<_, Invoice>(
            "INSERT INTO invoices (client_id, invoice_number, status, issue_date, due_date, total, notes)
             VALUES ($1, $2, 'pending', $3, $4, $5, $6)
             RETURNING id, client_id, invoice_number, status, issue_date, due_date, total, notes, created_at, updated_at",
        )
        .bind(input.client_id)
        .bind(&input.invoice_number)
        .bind(input.issue_date)
        .bind(input.due_date)
        .bind(&total)
        .bind(&input.notes)
        .fetch_one(&mut *tx)
        .await
        .map_err(DatabaseError::from_sqlx)?;

        for item in items {
            let amount = &item.quantity * &item.unit_price;
            sqlx::query(
                "INSERT INTO invoice_items (invoice_id, description, quantity, unit_price, amount)
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(invoice.id)
            .bind(&item.description)
            .bind(&item.quantity)
            .bind(&item.unit_price)
            .bind(amount)
            .execute(&mut *tx)
            .await
            .map_err(DatabaseError::from_sqlx)?;
        }

        tx.commit().await.map_err(DatabaseError::from_sqlx)?;
        Ok(invoice)
    }

    /// Replace header fields and line items of an existing invoice
    pub async fn update_with_items(
        &self,
        id: Uuid,
        input: &InvoiceInput,
        items: &[InvoiceItemInput],
        total: BigDecimal,
    ) -> Result<Invoice, DatabaseError> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::from_sqlx)?;

        let invoice = sqlx::query_as::<_, Invoice>(
            "UPDATE invoices
             SET client_id = $2, invoice_number = $3, issue_date = $4, due_date = $5, total = $6,
                 notes = $7, updated_at = NOW()
             WHERE id = $1
             RETURNING id, client_id, invoice_number, status, issue_date, due_date, total, notes, created_at, updated_at",
        )
        .bind(id)
        .bind(input.client_id)
        .bind(&input.invoice_number)
        .bind(input.issue_date)
        .bind(input.due_date)
        .bind(&total)
        .bind(&input.notes)
        .fetch_optional(&mut *tx)
        .await
        .map_err(DatabaseError::from_sqlx)?;

        let invoice = match invoice {
            Some(invoice) => invoice,
            None => {
                tx.rollback().await.map_err(DatabaseError::from_sqlx)?;
                return Err(DatabaseError::not_found("Invoice", id));
            }
        };

        sqlx::query("DELETE FROM invoice_items WHERE invoice_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(DatabaseError::from_sqlx)?;

        for item in items {
            let amount = &item.quantity * &item.unit_price;
            sqlx::query(
                "INSERT INTO invoice_items (invoice_id, description, quantity, unit_price, amount)
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(id)
            .bind(&item.description)
            .bind(&item.quantity)
            .bind(&item.unit_price)
            .bind(amount)
            .execute(&mut *tx)
            .await
            .map_err(DatabaseError::from_sqlx)?;
        }

        tx.commit().await.map_err(DatabaseError::from_sqlx)?;
        Ok(invoice)
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<Invoice>, DatabaseError> {
        sqlx::query_as::<_, Invoice>(
            "SELECT id, client_id, invoice_number, status, issue_date, due_date, total, notes, created_at, updated_at
             FROM invoices WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)
    }

    pub async fn find_items(&self, invoice_id: Uuid) -> Result<Vec<InvoiceItem>, DatabaseError> {
        sqlx::query_as::<_, InvoiceItem>(
            "SELECT id, invoice_id, description, quantity, unit_price, amount
             FROM invoice_items WHERE invoice_id = $1 ORDER BY id ASC",
        )
        .bind(invoice_id)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)
    }

    pub async fn find_by_client(&self, client_id: Uuid) -> Result<Vec<Invoice>, DatabaseError> {
        sqlx::query_as::<_, Invoice>(
            "SELECT id, client_id, invoice_number, status, issue_date, due_date, total, notes, created_at, updated_at
             FROM invoices WHERE client_id = $1 ORDER BY issue_date DESC",
        )
        .bind(client_id)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)
    }

    pub async fn set_status(&self, id: Uuid, status: &str) -> Result<Invoice, DatabaseError> {
        sqlx::query_as::<_, Invoice>(
            "UPDATE invoices SET status = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING id, client_id, invoice_number, status, issue_date, due_date, total, notes, created_at, updated_at",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)?
        .ok_or_else(|| DatabaseError::not_found("Invoice", id))
    }

    /// Count of payment rows in any state attached to the invoice
    pub async fn payment_count(&self, id: Uuid) -> Result<i64, DatabaseError> {
        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM payments WHERE invoice_id = $1")
                .bind(id)
                .fetch_one(&self.pool)
                .await
                .map_err(DatabaseError::from_sqlx)?;
        Ok(count.0)
    }

    /// Sum of payments that have reached `paid`
    pub async fn paid_total(&self, id: Uuid) -> Result<BigDecimal, DatabaseError> {
        let total: (Option<BigDecimal>,) = sqlx::query_as(
            "SELECT SUM(amount) FROM payments WHERE invoice_id = $1 AND status = 'paid'",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)?;
        Ok(total.0.unwrap_or_else(|| BigDecimal::from(0)))
    }
}

#[async_trait]
impl Repository for InvoiceRepository {
    type Entity = Invoice;

    async fn find_by_id(&self, id: &str) -> Result<Option<Self::Entity>, DatabaseError> {
        let uuid = Uuid::parse_str(id).map_err(|e| {
            DatabaseError::new(crate::database::error::DatabaseErrorKind::Unknown {
                message: format!("Invalid UUID: {}", e),
            })
        })?;
        self.find(uuid).await
    }

    async fn find_all(&self) -> Result<Vec<Self::Entity>, DatabaseError> {
        sqlx::query_as::<_, Invoice>(
            "SELECT id, client_id, invoice_number, status, issue_date, due_date, total, notes, created_at, updated_at
             FROM invoices ORDER BY created_at DESC",
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
        let mut tx = self.pool.begin().await.map_err(DatabaseError::from_sqlx)?;
        sqlx::query("DELETE FROM invoice_items WHERE invoice_id = $1")
            .bind(uuid)
            .execute(&mut *tx)
            .await
            .map_err(DatabaseError::from_sqlx)?;
        let result = sqlx::query("DELETE FROM invoices WHERE id = $1")
            .bind(uuid)
            .execute(&mut *tx)
            .await
            .map_err(DatabaseError::from_sqlx)?;
        tx.commit().await.map_err(DatabaseError::from_sqlx)?;
        Ok(result.rows_affected() > 0)
    }
}

impl TransactionalRepository for InvoiceRepository {
    fn pool(&self) -> &PgPool {
        &self.pool
    }
}
