//! Audit trail recording
//!
//! Every mutation and every webhook event leaves an audit row. Recording is
//! best-effort: a failed insert is logged and never fails the request that
//! triggered it.

use crate::database::audit_log_repository::{AuditLog, AuditLogRepository};
use crate::error::AppError;
use sqlx::PgPool;
use tracing::warn;

pub struct AuditService {
    repository: AuditLogRepository,
}

impl AuditService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: AuditLogRepository::new(pool),
        }
    }

    /// Record an audit event, swallowing storage failures
    pub async fn record(
        &self,
        action: &str,
        entity_type: &str,
        entity_id: Option<&str>,
        details: serde_json::Value,
    ) {
        if let Err(e) = self
            .repository
            .insert(action, entity_type, entity_id, details)
            .await
        {
            warn!(action = %action, entity_type = %entity_type, error = %e, "failed to record audit event");
        }
    }

    pub async fn list_recent(&self, limit: i64) -> Result<Vec<AuditLog>, AppError> {
        Ok(self.repository.list_recent(limit).await?)
    }

    pub async fn list_for_entity(
        &self,
        entity_type: &str,
        entity_id: &str,
        limit: i64,
    ) -> Result<Vec<AuditLog>, AppError> {
        Ok(self
            .repository
            .list_for_entity(entity_type, entity_id, limit)
            .await?)
    }
}
