use crate::database::error::DatabaseError;
use crate::database::repository::TransactionalRepository;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

/// Audit trail entry
#[derive(Debug, Clone, FromRow, serde::Serialize)]
pub struct AuditLog {
    pub id: Uuid,
    pub action: String,
    pub entity_type: String,
    pub entity_id: Option<String>,
    pub details: serde_json::Value,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

pub struct AuditLogRepository {
    pool: PgPool,
}

impl AuditLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(
        &self,
        action: &str,
        entity_type: &str,
        entity_id: Option<&str>,
        details: serde_json::Value,
    ) -> Result<AuditLog, DatabaseError> {
        sqlx::query_as::<_, AuditLog>(
            "INSERT INTO audit_logs (action, entity_type, entity_id, details)
             VALUES ($1, $2, $3, $4)
             RETURNING id, action, entity_type, entity_id, details, created_at",
        )
        .bind(action)
        .bind(entity_type)
        .bind(entity_id)
        .bind(details)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)
    }

    pub async fn list_recent(&self, limit: i64) -> Result<Vec<AuditLog>, DatabaseError> {
        sqlx::query_as::<_, AuditLog>(
            "SELECT id, action, entity_type, entity_id, details, created_at
             FROM audit_logs ORDER BY created_at DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)
    }

    pub async fn list_for_entity(
        &self,
        entity_type: &str,
        entity_id: &str,
        limit: i64,
    ) -> Result<Vec<AuditLog>, DatabaseError> {
        sqlx::query_as::<_, AuditLog>(
            "SELECT id, action, entity_type, entity_id, details, created_at
             FROM audit_logs WHERE entity_type = $1 AND entity_id = $2
             ORDER BY created_at DESC LIMIT $3",
        )
        .bind(entity_type)
        .bind(entity_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)
    }
}

impl TransactionalRepository for AuditLogRepository {
    fn pool(&self) -> &PgPool {
        &self.pool
    }
}
