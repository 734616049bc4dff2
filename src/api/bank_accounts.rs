//! Bank account handlers

use crate::database::bank_account_repository::{BankAccount, BankAccountInput};
use crate::database::repository::Repository;
use crate::error::{AppError, DomainError, ValidationError};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct BankAccountRequest {
    pub bank_name: String,
    pub account_title: String,
    pub account_number: String,
    pub iban: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl BankAccountRequest {
    fn into_input(self) -> Result<BankAccountInput, AppError> {
        for (field, value) in [
            ("bank_name", &self.bank_name),
            ("account_title", &self.account_title),
            ("account_number", &self.account_number),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::MissingField {
                    field: field.to_string(),
                }
                .into());
            }
        }
        Ok(BankAccountInput {
            bank_name: self.bank_name,
            account_title: self.account_title,
            account_number: self.account_number,
            iban: self.iban,
            is_active: self.is_active,
        })
    }
}

pub async fn create_bank_account(
    State(state): State<AppState>,
    Json(payload): Json<BankAccountRequest>,
) -> Result<impl IntoResponse, AppError> {
    let input = payload.into_input()?;
    let account = state.bank_accounts.create(&input).await?;

    state
        .audit
        .record(
            "bank_account.created",
            "bank_account",
            Some(&account.id.to_string()),
            json!({ "bank_name": account.bank_name }),
        )
        .await;

    Ok((StatusCode::CREATED, Json(account)))
}

pub async fn list_bank_accounts(
    State(state): State<AppState>,
) -> Result<Json<Vec<BankAccount>>, AppError> {
    Ok(Json(state.bank_accounts.find_all().await?))
}

pub async fn get_bank_account(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BankAccount>, AppError> {
    let account = state
        .bank_accounts
        .find(id)
        .await?
        .ok_or_else(|| DomainError::BankAccountNotFound {
            account_id: id.to_string(),
        })?;
    Ok(Json(account))
}

pub async fn update_bank_account(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<BankAccountRequest>,
) -> Result<Json<BankAccount>, AppError> {
    let input = payload.into_input()?;
    let account = state.bank_accounts.update(id, &input).await?;

    state
        .audit
        .record(
            "bank_account.updated",
            "bank_account",
            Some(&id.to_string()),
            json!({ "is_active": account.is_active }),
        )
        .await;

    Ok(Json(account))
}

pub async fn delete_bank_account(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    if !state.bank_accounts.delete(&id.to_string()).await? {
        return Err(DomainError::BankAccountNotFound {
            account_id: id.to_string(),
        }
        .into());
    }

    state
        .audit
        .record(
            "bank_account.deleted",
            "bank_account",
            Some(&id.to_string()),
            json!({}),
        )
        .await;

    Ok(StatusCode::NO_CONTENT)
}
