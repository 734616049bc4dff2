//! Audit log read handlers

use crate::database::audit_log_repository::AuditLog;
use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

const DEFAULT_LIMIT: i64 = 100;
const MAX_LIMIT: i64 = 500;

#[derive(Debug, Deserialize)]
pub struct AuditLogQuery {
    pub limit: Option<i64>,
    pub entity_type: Option<String>,
    pub entity_id: Option<String>,
}

/// `GET /api/audit-logs?limit=..&entity_type=..&entity_id=..`
pub async fn list_audit_logs(
    State(state): State<AppState>,
    Query(query): Query<AuditLogQuery>,
) -> Result<Json<Vec<AuditLog>>, AppError> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

    let logs = match (query.entity_type, query.entity_id) {
        (Some(entity_type), Some(entity_id)) => {
            state
                .audit
                .list_for_entity(&entity_type, &entity_id, limit)
                .await?
        }
        _ => state.audit.list_recent(limit).await?,
    };

    Ok(Json(logs))
}
