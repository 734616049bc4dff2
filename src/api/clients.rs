//! Client CRUD handlers

use crate::database::client_repository::{Client, ClientInput};
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
pub struct ClientRequest {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub tax_number: Option<String>,
}

impl ClientRequest {
    fn into_input(self) -> Result<ClientInput, AppError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField {
                field: "name".to_string(),
            }
            .into());
        }
        Ok(ClientInput {
            name: self.name,
            email: self.email,
            phone: self.phone,
            address: self.address,
            tax_number: self.tax_number,
        })
    }
}

pub async fn create_client(
    State(state): State<AppState>,
    Json(payload): Json<ClientRequest>,
) -> Result<impl IntoResponse, AppError> {
    let input = payload.into_input()?;
    let client = state.clients.create(&input).await?;

    state
        .audit
        .record(
            "client.created",
            "client",
            Some(&client.id.to_string()),
            json!({ "name": client.name }),
        )
        .await;

    Ok((StatusCode::CREATED, Json(client)))
}

pub async fn list_clients(State(state): State<AppState>) -> Result<Json<Vec<Client>>, AppError> {
    Ok(Json(state.clients.find_all().await?))
}

pub async fn get_client(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Client>, AppError> {
    let client = state
        .clients
        .find(id)
        .await?
        .ok_or_else(|| DomainError::ClientNotFound {
            client_id: id.to_string(),
        })?;
    Ok(Json(client))
}

pub async fn update_client(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ClientRequest>,
) -> Result<Json<Client>, AppError> {
    let input = payload.into_input()?;
    let client = state.clients.update(id, &input).await?;

    state
        .audit
        .record(
            "client.updated",
            "client",
            Some(&id.to_string()),
            json!({ "name": client.name }),
        )
        .await;

    Ok(Json(client))
}

/// Delete a client; rejected while any invoice still references it
pub async fn delete_client(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    if state.clients.find(id).await?.is_none() {
        return Err(DomainError::ClientNotFound {
            client_id: id.to_string(),
        }
        .into());
    }

    let invoice_count = state.clients.invoice_count(id).await?;
    if invoice_count > 0 {
        return Err(DomainError::ClientHasInvoices {
            client_id: id.to_string(),
            count: invoice_count,
        }
        .into());
    }

    state.clients.delete(&id.to_string()).await?;
    state
        .audit
        .record("client.deleted", "client", Some(&id.to_string()), json!({}))
        .await;

    Ok(StatusCode::NO_CONTENT)
}
