//! Error response formatting
//!
//! Every failure leaves the API as the same JSON shape: a machine-readable
//! code, a user-safe message, the request id, and a retry hint.

use crate::error::{AppError, ErrorCode};
use axum::{
    body::{to_bytes, Body},
    extract::Request,
    http::{header::CONTENT_LENGTH, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

// error bodies are small JSON documents
const MAX_ERROR_BODY_BYTES: usize = 64 * 1024;

/// Standardized error response structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Machine-readable error code
    pub error: ErrorCode,

    /// Human-readable error message
    pub message: String,

    /// Request ID for debugging and support
    pub request_id: Option<String>,

    /// ISO 8601 timestamp of the error
    pub timestamp: String,

    /// Whether the client should retry the request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retryable: Option<bool>,
}

impl ErrorResponse {
    pub fn from_app_error(error: &AppError) -> Self {
        Self {
            error: error.error_code(),
            message: error.user_message(),
            request_id: error.request_id.clone(),
            timestamp: Utc::now().to_rfc3339(),
            retryable: Some(error.is_retryable()),
        }
    }

    pub fn internal_error(request_id: Option<String>) -> Self {
        Self {
            error: ErrorCode::InternalError,
            message: "An internal server error occurred. Please try again later.".to_string(),
            request_id,
            timestamp: Utc::now().to_rfc3339(),
            retryable: Some(false),
        }
    }
}

/// Convert AppError into an HTTP response with proper status code and JSON body
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status_code =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status_code.is_server_error() {
            tracing::error!(
                error = ?self,
                request_id = ?self.request_id,
                status = %status_code.as_u16(),
                "Server error occurred"
            );
        } else {
            tracing::warn!(
                error = ?self,
                request_id = ?self.request_id,
                status = %status_code.as_u16(),
                "Client error occurred"
            );
        }

        let error_response = ErrorResponse::from_app_error(&self);
        (status_code, Json(error_response)).into_response()
    }
}

/// Helper to extract request ID from request headers
pub fn get_request_id_from_headers(headers: &axum::http::HeaderMap) -> Option<String> {
    headers
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}

/// Fill `request_id` in error bodies from the propagated `x-request-id`.
///
/// Most `AppError` values are built in the service layer where the header is
/// not in scope, so the id is stamped here once the response exists.
pub async fn attach_request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = get_request_id_from_headers(request.headers());
    let response = next.run(request).await;

    let status = response.status();
    if !(status.is_client_error() || status.is_server_error()) {
        return response;
    }
    let Some(request_id) = request_id else {
        return response;
    };

    let (mut parts, body) = response.into_parts();
    let bytes = match to_bytes(body, MAX_ERROR_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(_) => {
            let fallback = ErrorResponse::internal_error(Some(request_id));
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(fallback)).into_response();
        }
    };

    // only rewrite bodies in the standardized shape that carry no id yet;
    // framework rejections and already-tagged bodies pass through untouched
    let patched = match serde_json::from_slice::<ErrorResponse>(&bytes) {
        Ok(mut error_body) if error_body.request_id.is_none() => {
            error_body.request_id = Some(request_id);
            serde_json::to_vec(&error_body).unwrap_or_else(|_| bytes.to_vec())
        }
        _ => bytes.to_vec(),
    };

    parts.headers.remove(CONTENT_LENGTH);
    Response::from_parts(parts, Body::from(patched))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppErrorKind, DomainError, ValidationError};

    #[test]
    fn error_response_carries_code_and_request_id() {
        let app_error = AppError::new(AppErrorKind::Domain(DomainError::InvoiceNotDeletable {
            invoice_id: "inv_1".to_string(),
            status: "paid".to_string(),
        }))
        .with_request_id("req_123");

        let error_response = ErrorResponse::from_app_error(&app_error);

        assert_eq!(error_response.error, ErrorCode::InvoiceNotDeletable);
        assert_eq!(error_response.request_id, Some("req_123".to_string()));
        assert!(error_response.message.contains("cannot be deleted"));
    }

    #[test]
    fn validation_error_becomes_bad_request() {
        let app_error = AppError::new(AppErrorKind::Validation(ValidationError::InvalidAmount {
            amount: "-100".to_string(),
            reason: "must be positive".to_string(),
        }));

        let response = app_error.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn invalid_signature_becomes_unauthorized() {
        let app_error = AppError::new(AppErrorKind::Domain(DomainError::InvalidWebhookSignature {
            order_id: "ord_1".to_string(),
        }));

        let response = app_error.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn internal_error_response_is_not_retryable_by_default() {
        let error = ErrorResponse::internal_error(Some("req_456".to_string()));
        assert_eq!(error.error, ErrorCode::InternalError);
        assert_eq!(error.retryable, Some(false));
    }

    #[tokio::test]
    async fn error_bodies_carry_the_propagated_request_id() {
        use axum::routing::get;
        use tower::ServiceExt;

        async fn failing() -> Result<(), AppError> {
            Err(AppError::new(AppErrorKind::Domain(
                DomainError::OrderNotFound {
                    order_id: "ord_1".to_string(),
                },
            )))
        }

        let app = axum::Router::new()
            .route("/fail", get(failing))
            .layer(axum::middleware::from_fn(attach_request_id_middleware));

        let request = axum::http::Request::builder()
            .uri("/fail")
            .header("x-request-id", "req_789")
            .body(Body::empty())
            .expect("request");

        let response = app.oneshot(request).await.expect("response");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let bytes = to_bytes(response.into_body(), MAX_ERROR_BODY_BYTES)
            .await
            .expect("body");
        let body: serde_json::Value = serde_json::from_slice(&bytes).expect("json");
        assert_eq!(body["error"], "ORDER_NOT_FOUND");
        assert_eq!(body["request_id"], "req_789");
    }

    #[tokio::test]
    async fn successful_responses_pass_through_unpatched() {
        use axum::routing::get;
        use tower::ServiceExt;

        let app = axum::Router::new()
            .route("/ok", get(|| async { Json(serde_json::json!({ "ok": true })) }))
            .layer(axum::middleware::from_fn(attach_request_id_middleware));

        let request = axum::http::Request::builder()
            .uri("/ok")
            .header("x-request-id", "req_1")
            .body(Body::empty())
            .expect("request");

        let response = app.oneshot(request).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), MAX_ERROR_BODY_BYTES)
            .await
            .expect("body");
        let body: serde_json::Value = serde_json::from_slice(&bytes).expect("json");
        assert_eq!(body, serde_json::json!({ "ok": true }));
    }
}
