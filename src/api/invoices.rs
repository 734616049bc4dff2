//! Invoice CRUD handlers
//!
//! Monetary fields travel as strings in request bodies to preserve NUMERIC
//! precision through JSON.

use crate::database::invoice_repository::{Invoice, InvoiceInput, InvoiceItem, InvoiceItemInput};
use crate::error::{AppError, ValidationError};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct InvoiceItemRequest {
    pub description: String,
    pub quantity: String,
    pub unit_price: String,
}

#[derive(Debug, Deserialize)]
pub struct InvoiceRequest {
    pub client_id: Uuid,
    pub invoice_number: String,
    pub issue_date: chrono::NaiveDate,
    pub due_date: Option<chrono::NaiveDate>,
    pub notes: Option<String>,
    pub items: Vec<InvoiceItemRequest>,
}

#[derive(Debug, Serialize)]
pub struct InvoiceDetail {
    #[serde(flatten)]
    pub invoice: Invoice,
    pub items: Vec<InvoiceItem>,
}

impl InvoiceRequest {
    fn into_parts(self) -> Result<(InvoiceInput, Vec<InvoiceItemInput>), AppError> {
        if self.invoice_number.trim().is_empty() {
            return Err(ValidationError::MissingField {
                field: "invoice_number".to_string(),
            }
            .into());
        }

        let items = self
            .items
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                Ok(InvoiceItemInput {
                    description: item.description,
                    quantity: parse_decimal(&item.quantity, &format!("items[{}].quantity", index))?,
                    unit_price: parse_decimal(
                        &item.unit_price,
                        &format!("items[{}].unit_price", index),
                    )?,
                })
            })
            .collect::<Result<Vec<_>, AppError>>()?;

        Ok((
            InvoiceInput {
                client_id: self.client_id,
                invoice_number: self.invoice_number,
                issue_date: self.issue_date,
                due_date: self.due_date,
                notes: self.notes,
            },
            items,
        ))
    }
}

fn parse_decimal(raw: &str, field: &str) -> Result<BigDecimal, AppError> {
    BigDecimal::from_str(raw.trim()).map_err(|_| {
        ValidationError::InvalidField {
            field: field.to_string(),
            reason: format!("'{}' is not a decimal number", raw),
        }
        .into()
    })
}

pub async fn create_invoice(
    State(state): State<AppState>,
    Json(payload): Json<InvoiceRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (input, items) = payload.into_parts()?;
    let (invoice, items) = state.invoices.create(input, items).await?;
    Ok((StatusCode::CREATED, Json(InvoiceDetail { invoice, items })))
}

pub async fn list_invoices(State(state): State<AppState>) -> Result<Json<Vec<Invoice>>, AppError> {
    Ok(Json(state.invoices.list().await?))
}

pub async fn get_invoice(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<InvoiceDetail>, AppError> {
    let (invoice, items) = state.invoices.get(id).await?;
    Ok(Json(InvoiceDetail { invoice, items }))
}

pub async fn update_invoice(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<InvoiceRequest>,
) -> Result<Json<InvoiceDetail>, AppError> {
    let (input, items) = payload.into_parts()?;
    let (invoice, items) = state.invoices.update(id, input, items).await?;
    Ok(Json(InvoiceDetail { invoice, items }))
}

pub async fn delete_invoice(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    state.invoices.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn invoice_editable(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let editable = state.invoices.is_editable(id).await?;
    Ok(Json(json!({ "invoice_id": id, "editable": editable })))
}

pub async fn invoice_payments(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let payments = state.invoices.payments_for(id).await?;
    Ok(Json(payments))
}
