//! Recurring plan handlers

use crate::database::recurring_plan_repository::{RecurringPlan, RecurringPlanInput};
use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct RecurringPlanRequest {
    pub client_id: Uuid,
    pub name: String,
    pub frequency: String,
    /// Line-item template: `[{ "description", "quantity", "unit_price" }]`
    /// with string amounts
    pub items: serde_json::Value,
    pub next_run_at: chrono::NaiveDate,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl From<RecurringPlanRequest> for RecurringPlanInput {
    fn from(request: RecurringPlanRequest) -> Self {
        RecurringPlanInput {
            client_id: request.client_id,
            name: request.name,
            frequency: request.frequency,
            items: request.items,
            next_run_at: request.next_run_at,
            is_active: request.is_active,
        }
    }
}

pub async fn create_plan(
    State(state): State<AppState>,
    Json(payload): Json<RecurringPlanRequest>,
) -> Result<impl IntoResponse, AppError> {
    let plan = state.recurring.create(payload.into()).await?;
    Ok((StatusCode::CREATED, Json(plan)))
}

pub async fn list_plans(
    State(state): State<AppState>,
) -> Result<Json<Vec<RecurringPlan>>, AppError> {
    Ok(Json(state.recurring.list().await?))
}

pub async fn get_plan(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RecurringPlan>, AppError> {
    Ok(Json(state.recurring.get(id).await?))
}

pub async fn update_plan(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RecurringPlanRequest>,
) -> Result<Json<RecurringPlan>, AppError> {
    Ok(Json(state.recurring.update(id, payload.into()).await?))
}

pub async fn delete_plan(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    state.recurring.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Generate the plan's next invoice
pub async fn run_plan(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let invoice = state.recurring.run(id).await?;
    Ok((StatusCode::CREATED, Json(invoice)))
}
