//! Wallet provider webhook endpoint
//!
//! The provider confirms wallet orders with a GET callback carrying the
//! order id, its status code, the merchant domain, and an HMAC signature
//! over all three. The endpoint is unauthenticated; the signature is the
//! only authenticity check.

use crate::error::{AppError, ValidationError};
use crate::middleware::get_request_id_from_headers;
use crate::services::CallbackOutcome;
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct EasyPayCallbackQuery {
    #[serde(rename = "orderId")]
    pub order_id: String,
    pub hash: String,
    pub status: String,
    // echoed by the provider; verification uses the domain stored with the order
    #[serde(default)]
    pub domain: Option<String>,
}

/// `GET /webhooks/easypay?orderId=..&hash=..&status=..&domain=..`
pub async fn easypay_callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<EasyPayCallbackQuery>,
) -> Result<impl IntoResponse, AppError> {
    // rejections on this path are logged with the request id attached so a
    // provider-reported failure can be traced back to its callback
    let request_id = get_request_id_from_headers(&headers);
    let tag = |err: AppError| match &request_id {
        Some(id) => err.with_request_id(id),
        None => err,
    };

    if query.order_id.trim().is_empty() {
        return Err(tag(ValidationError::MissingField {
            field: "orderId".to_string(),
        }
        .into()));
    }
    if query.hash.trim().is_empty() {
        return Err(tag(ValidationError::MissingField {
            field: "hash".to_string(),
        }
        .into()));
    }

    let outcome: CallbackOutcome = state
        .webhooks
        .process_easypay_callback(&query.order_id, &query.status, &query.hash)
        .await
        .map_err(tag)?;

    Ok(Json(outcome))
}
