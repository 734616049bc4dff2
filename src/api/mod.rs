//! HTTP surface: route table, health endpoints, middleware stack

pub mod audit;
pub mod bank_accounts;
pub mod clients;
pub mod invoices;
pub mod payments;
pub mod recurring;
pub mod webhooks;

use crate::middleware::{attach_request_id_middleware, request_logging_middleware};
use crate::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

/// Build the full application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(banner))
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .route("/health/live", get(liveness))
        .route(
            "/api/clients",
            post(clients::create_client).get(clients::list_clients),
        )
        .route(
            "/api/clients/{id}",
            get(clients::get_client)
                .put(clients::update_client)
                .delete(clients::delete_client),
        )
        .route(
            "/api/invoices",
            post(invoices::create_invoice).get(invoices::list_invoices),
        )
        .route(
            "/api/invoices/{id}",
            get(invoices::get_invoice)
                .put(invoices::update_invoice)
                .delete(invoices::delete_invoice),
        )
        .route("/api/invoices/{id}/editable", get(invoices::invoice_editable))
        .route("/api/invoices/{id}/payments", get(invoices::invoice_payments))
        .route(
            "/api/recurring-plans",
            post(recurring::create_plan).get(recurring::list_plans),
        )
        .route(
            "/api/recurring-plans/{id}",
            get(recurring::get_plan)
                .put(recurring::update_plan)
                .delete(recurring::delete_plan),
        )
        .route("/api/recurring-plans/{id}/run", post(recurring::run_plan))
        .route(
            "/api/bank-accounts",
            post(bank_accounts::create_bank_account).get(bank_accounts::list_bank_accounts),
        )
        .route(
            "/api/bank-accounts/{id}",
            get(bank_accounts::get_bank_account)
                .put(bank_accounts::update_bank_account)
                .delete(bank_accounts::delete_bank_account),
        )
        .route("/api/payments/card-link", post(payments::create_card_link))
        .route(
            "/api/payments/bank-transfer",
            post(payments::submit_bank_transfer),
        )
        .route(
            "/api/payments/wallet-order",
            post(payments::create_wallet_order),
        )
        .route("/api/audit-logs", get(audit::list_audit_logs))
        .route("/webhooks/easypay", get(webhooks::easypay_callback))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(TraceLayer::new_for_http())
                .layer(axum::middleware::from_fn(request_logging_middleware))
                .layer(axum::middleware::from_fn(attach_request_id_middleware)),
        )
        .with_state(state)
}

async fn banner() -> impl IntoResponse {
    Json(json!({
        "service": "billfold-backend",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let status = state.health.check_health().await;
    let code = if status.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, Json(status))
}

async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    match crate::database::health_check(&state.pool).await {
        Ok(()) => (StatusCode::OK, Json(json!({ "ready": true }))),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "ready": false, "error": e.to_string() })),
        ),
    }
}

async fn liveness() -> impl IntoResponse {
    Json(json!({ "alive": true }))
}
