use crate::database::error::DatabaseError;
use crate::database::repository::{Repository, TransactionalRepository};
use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

/// Bank account entity, shown to payers for manual transfers
#[derive(Debug, Clone, FromRow, serde::Serialize)]
pub struct BankAccount {
    pub id: Uuid,
    pub bank_name: String,
    pub account_title: String,
    pub account_number: String,
    pub iban: Option<String>,
    pub is_active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// New or updated bank account fields
#[derive(Debug, Clone)]
pub struct BankAccountInput {
    pub bank_name: String,
    pub account_title: String,
    pub account_number: String,
    pub iban: Option<String>,
    pub is_active: bool,
}

pub struct BankAccountRepository {
    pool: PgPool,
}

impl BankAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, input: &BankAccountInput) -> Result<BankAccount, DatabaseError> {
        sqlx::query_as::<_, BankAccount>(
            "INSERT INTO bank_accounts (bank_name, account_title, account_number, iban, is_active)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id, bank_name, account_title, account_number, iban, is_active, created_at, updated_at",
        )
        .bind(&input.bank_name)
        .bind(&input.account_title)
        .bind(&input.account_number)
        .bind(&input.iban)
        .bind(input.is_active)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)
    }

    pub async fn update(
        &self,
        id: Uuid,
        input: &BankAccountInput,
    ) -> Result<BankAccount, DatabaseError> {
        sqlx::query_as::<_, BankAccount>(
            "UPDATE bank_accounts
             SET bank_name = $2, account_title = $3, account_number = $4, iban = $5,
                 is_active = $6, updated_at = NOW()
             WHERE id = $1
             RETURNING id, bank_name, account_title, account_number, iban, is_active, created_at, updated_at",
        )
        .bind(id)
        .bind(&input.bank_name)
        .bind(&input.account_title)
        .bind(&input.account_number)
        .bind(&input.iban)
        .bind(input.is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)?
        .ok_or_else(|| DatabaseError::not_found("BankAccount", id))
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<BankAccount>, DatabaseError> {
        sqlx::query_as::<_, BankAccount>(
            "SELECT id, bank_name, account_title, account_number, iban, is_active, created_at, updated_at
             FROM bank_accounts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)
    }
}

#[async_trait]
impl Repository for BankAccountRepository {
    type Entity = BankAccount;

    async fn find_by_id(&self, id: &str) -> Result<Option<Self::Entity>, DatabaseError> {
        let uuid = Uuid::parse_str(id).map_err(|e| {
            DatabaseError::new(crate::database::error::DatabaseErrorKind::Unknown {
                message: format!("Invalid UUID: {}", e),
            })
        })?;
        self.find(uuid).await
    }

    async fn find_all(&self) -> Result<Vec<Self::Entity>, DatabaseError> {
        sqlx::query_as::<_, BankAccount>(
            "SELECT id, bank_name, account_title, account_number, iban, is_active, created_at, updated_at
             FROM bank_accounts ORDER BY bank_name ASC",
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
        let result = sqlx::query("DELETE FROM bank_accounts WHERE id = $1")
            .bind(uuid)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::from_sqlx)?;
        Ok(result.rows_affected() > 0)
    }
}

impl TransactionalRepository for BankAccountRepository {
    fn pool(&self) -> &PgPool {
        &self.pool
    }
}
