use crate::database::error::DatabaseError;
use crate::database::repository::{Repository, TransactionalRepository};
use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

/// Recurring billing plan entity
///
/// `items` is the line-item template (description/quantity/unit_price
/// objects) used to generate each invoice.
#[derive(Debug, Clone, FromRow, serde::Serialize)]
pub struct RecurringPlan {
    pub id: Uuid,
    pub client_id: Uuid,
    pub name: String,
    pub frequency: String,
    pub items: serde_json::Value,
    pub next_run_at: chrono::NaiveDate,
    pub is_active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// New or updated plan fields
#[derive(Debug, Clone)]
pub struct RecurringPlanInput {
    pub client_id: Uuid,
    pub name: String,
    pub frequency: String,
    pub items: serde_json::Value,
    pub next_run_at: chrono::NaiveDate,
    pub is_active: bool,
}

pub struct RecurringPlanRepository {
    pool: PgPool,
}

impl RecurringPlanRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, input: &RecurringPlanInput) -> Result<RecurringPlan, DatabaseError> {
        sqlx::query_as::<_, RecurringPlan>(
            "INSERT INTO recurring_plans (client_id, name, frequency, items, next_run_at, is_active)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING id, client_id, name, frequency, items, next_run_at, is_active, created_at, updated_at",
        )
        .bind(input.client_id)
        .bind(&input.name)
        .bind(&input.frequency)
        .bind(&input.items)
        .bind(input.next_run_at)
        .bind(input.is_active)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)
    }

    pub async fn update(
        &self,
        id: Uuid,
        input: &RecurringPlanInput,
    ) -> Result<RecurringPlan, DatabaseError> {
        sqlx::query_as::<_, RecurringPlan>(
            "UPDATE recurring_plans
             SET client_id = $2, name = $3, frequency = $4, items = $5, next_run_at = $6,
                 is_active = $7, updated_at = NOW()
             WHERE id = $1
             RETURNING id, client_id, name, frequency, items, next_run_at, is_active, created_at, updated_at",
        )
        .bind(id)
        .bind(input.client_id)
        .bind(&input.name)
        .bind(&input.frequency)
        .bind(&input.items)
        .bind(input.next_run_at)
        .bind(input.is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)?
        .ok_or_else(|| DatabaseError::not_found("RecurringPlan", id))
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<RecurringPlan>, DatabaseError> {
        sqlx::query_as::<_, RecurringPlan>(
            "SELECT id, client_id, name, frequency, items, next_run_at, is_active, created_at, updated_at
             FROM recurring_plans WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)
    }

    /// Advance the plan's next run date after an invoice was generated
    pub async fn set_next_run(
        &self,
        id: Uuid,
        next_run_at: chrono::NaiveDate,
    ) -> Result<RecurringPlan, DatabaseError> {
        sqlx::query_as::<_, RecurringPlan>(
            "UPDATE recurring_plans SET next_run_at = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING id, client_id, name, frequency, items, next_run_at, is_active, created_at, updated_at",
        )
        .bind(id)
        .bind(next_run_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)?
        .ok_or_else(|| DatabaseError::not_found("RecurringPlan", id))
    }
}

#[async_trait]
impl Repository for RecurringPlanRepository {
    type Entity = RecurringPlan;

    async fn find_by_id(&self, id: &str) -> Result<Option<Self::Entity>, DatabaseError> {
        let uuid = Uuid::parse_str(id).map_err(|e| {
            DatabaseError::new(crate::database::error::DatabaseErrorKind::Unknown {
                message: format!("Invalid UUID: {}", e),
            })
        })?;
        self.find(uuid).await
    }

    async fn find_all(&self) -> Result<Vec<Self::Entity>, DatabaseError> {
        sqlx::query_as::<_, RecurringPlan>(
            "SELECT id, client_id, name, frequency, items, next_run_at, is_active, created_at, updated_at
             FROM recurring_plans ORDER BY next_run_at ASC",
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
        let result = sqlx::query("DELETE FROM recurring_plans WHERE id = $1")
            .bind(uuid)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::from_sqlx)?;
        Ok(result.rows_affected() > 0)
    }
}

impl TransactionalRepository for RecurringPlanRepository {
    fn pool(&self) -> &PgPool {
        &self.pool
    }
}
