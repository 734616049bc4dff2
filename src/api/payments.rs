//! Payment intake handlers

use crate::error::{AppError, ValidationError};
use crate::state::AppState;
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CardLinkRequest {
    pub invoice_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct WalletOrderRequest {
    pub invoice_id: Uuid,
    pub mobile_number: Option<String>,
}

/// `POST /api/payments/card-link`
pub async fn create_card_link(
    State(state): State<AppState>,
    Json(payload): Json<CardLinkRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (payment, link) = state.payments.create_card_link(payload.invoice_id).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "payment": payment,
            "payment_url": link.payment_url,
            "transaction_id": link.transaction_id,
            "amount": link.amount,
        })),
    ))
}

/// `POST /api/payments/wallet-order`
pub async fn create_wallet_order(
    State(state): State<AppState>,
    Json(payload): Json<WalletOrderRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (order, quote) = state
        .payments
        .create_wallet_order(payload.invoice_id, payload.mobile_number)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "order": order,
            "redirect_url": quote.redirect_url,
        })),
    ))
}

/// `POST /api/payments/bank-transfer` (multipart)
///
/// Fields: `invoice_id` (required), `file` (required screenshot), optional
/// `amount` and `reference`.
pub async fn submit_bank_transfer(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut invoice_id: Option<Uuid> = None;
    let mut amount: Option<String> = None;
    let mut reference: Option<String> = None;
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "invoice_id" => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| multipart_error(e.to_string()))?;
                let parsed =
                    Uuid::parse_str(raw.trim()).map_err(|_| ValidationError::InvalidField {
                        field: "invoice_id".to_string(),
                        reason: format!("'{}' is not a UUID", raw),
                    })?;
                invoice_id = Some(parsed);
            }
            "amount" => {
                amount = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| multipart_error(e.to_string()))?,
                );
            }
            "reference" => {
                reference = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| multipart_error(e.to_string()))?,
                );
            }
            "file" => {
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| multipart_error(e.to_string()))?;
                file = Some((content_type, bytes.to_vec()));
            }
            _ => {}
        }
    }

    let invoice_id = invoice_id.ok_or_else(|| ValidationError::MissingField {
        field: "invoice_id".to_string(),
    })?;
    let (content_type, bytes) = file.ok_or_else(|| ValidationError::MissingField {
        field: "file".to_string(),
    })?;

    let payment = state
        .payments
        .record_bank_transfer(invoice_id, amount, reference, &content_type, bytes)
        .await?;

    Ok((StatusCode::CREATED, Json(payment)))
}

fn multipart_error(message: String) -> AppError {
    ValidationError::InvalidField {
        field: "multipart".to_string(),
        reason: message,
    }
    .into()
}
