use crate::database::error::DatabaseError;
use crate::database::repository::{Repository, TransactionalRepository};
use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

/// Client entity
#[derive(Debug, Clone, FromRow, serde::Serialize)]
pub struct Client {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub tax_number: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// New or updated client fields
#[derive(Debug, Clone)]
pub struct ClientInput {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub tax_number: Option<String>,
}

pub struct ClientRepository {
    pool: PgPool,
}

impl ClientRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, input: &ClientInput) -> Result<Client, DatabaseError> {
        sqlx::query_as::<_, Client>(
            "INSERT INTO clients (name, email, phone, address, tax_number)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id, name, email, phone, address, tax_number, created_at, updated_at",
        )
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.address)
        .bind(&input.tax_number)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)
    }

    pub async fn update(&self, id: Uuid, input: &ClientInput) -> Result<Client, DatabaseError> {
        sqlx::query_as::<_, Client>(
            "UPDATE clients
             SET name = $2, email = $3, phone = $4, address = $5, tax_number = $6, updated_at = NOW()
             WHERE id = $1
             RETURNING id, name, email, phone, address, tax_number, created_at, updated_at",
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.address)
        .bind(&input.tax_number)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)?
        .ok_or_else(|| DatabaseError::not_found("Client", id))
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<Client>, DatabaseError> {
        sqlx::query_as::<_, Client>(
            "SELECT id, name, email, phone, address, tax_number, created_at, updated_at
             FROM clients WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)
    }

    /// Number of invoices attached to the client, deletability guard input
    pub async fn invoice_count(&self, id: Uuid) -> Result<i64, DatabaseError> {
        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM invoices WHERE client_id = $1")
                .bind(id)
                .fetch_one(&self.pool)
                .await
                .map_err(DatabaseError::from_sqlx)?;
        Ok(count.0)
    }
}

#[async_trait]
impl Repository for ClientRepository {
    type Entity = Client;

    async fn find_by_id(&self, id: &str) -> Result<Option<Self::Entity>, DatabaseError> {
        let uuid = Uuid::parse_str(id).map_err(|e| {
            DatabaseError::new(crate::database::error::DatabaseErrorKind::Unknown {
                message: format!("Invalid UUID: {}", e),
            })
        })?;
        self.find(uuid).await
    }

    async fn find_all(&self) -> Result<Vec<Self::Entity>, DatabaseError> {
        sqlx::query_as::<_, Client>(
            "SELECT id, name, email, phone, address, tax_number, created_at, updated_at
             FROM clients ORDER BY name ASC",
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
        let result = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(uuid)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::from_sqlx)?;
        Ok(result.rows_affected() > 0)
    }
}

impl TransactionalRepository for ClientRepository {
    fn pool(&self) -> &PgPool {
        &self.pool
    }
}
