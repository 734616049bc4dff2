//! Unified error handling for the billing back office
//!
//! Provides a single error type with HTTP status mapping, user-friendly
//! messages, and structured error codes for client handling.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Machine-readable error codes for programmatic handling
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ErrorCode {
    // Domain errors (4xx)
    #[serde(rename = "CLIENT_NOT_FOUND")]
    ClientNotFound,
    #[serde(rename = "CLIENT_HAS_INVOICES")]
    ClientHasInvoices,
    #[serde(rename = "INVOICE_NOT_FOUND")]
    InvoiceNotFound,
    #[serde(rename = "INVOICE_NOT_EDITABLE")]
    InvoiceNotEditable,
    #[serde(rename = "INVOICE_NOT_DELETABLE")]
    InvoiceNotDeletable,
    #[serde(rename = "INVOICE_ALREADY_PAID")]
    InvoiceAlreadyPaid,
    #[serde(rename = "PAYMENT_NOT_FOUND")]
    PaymentNotFound,
    #[serde(rename = "PLAN_NOT_FOUND")]
    PlanNotFound,
    #[serde(rename = "PLAN_INACTIVE")]
    PlanInactive,
    #[serde(rename = "BANK_ACCOUNT_NOT_FOUND")]
    BankAccountNotFound,
    #[serde(rename = "ORDER_NOT_FOUND")]
    OrderNotFound,
    #[serde(rename = "INVALID_WEBHOOK_SIGNATURE")]
    InvalidWebhookSignature,

    // Infrastructure errors (5xx)
    #[serde(rename = "DATABASE_ERROR")]
    DatabaseError,
    #[serde(rename = "STORAGE_ERROR")]
    StorageError,
    #[serde(rename = "CONFIGURATION_ERROR")]
    ConfigurationError,

    // External errors (502, 503)
    #[serde(rename = "PAYMENT_GATEWAY_ERROR")]
    PaymentGatewayError,
    #[serde(rename = "GATEWAY_DECLINED")]
    GatewayDeclined,

    // Generic
    #[serde(rename = "INTERNAL_ERROR")]
    InternalError,
    #[serde(rename = "VALIDATION_ERROR")]
    ValidationError,
}

/// Domain-specific business logic errors
#[derive(Debug, Clone)]
pub enum DomainError {
    /// Client with given id doesn't exist
    ClientNotFound { client_id: String },
    /// Client still has invoices attached and cannot be removed
    ClientHasInvoices { client_id: String, count: i64 },
    /// Invoice with given id doesn't exist
    InvoiceNotFound { invoice_id: String },
    /// Invoice has recorded payments and may no longer be modified
    InvoiceNotEditable { invoice_id: String },
    /// Paid or partially paid invoices are never deletable
    InvoiceNotDeletable { invoice_id: String, status: String },
    /// Operation requires an unpaid invoice
    InvoiceAlreadyPaid { invoice_id: String },
    /// Payment with given id doesn't exist
    PaymentNotFound { payment_id: String },
    /// Recurring plan with given id doesn't exist
    PlanNotFound { plan_id: String },
    /// Recurring plan is deactivated
    PlanInactive { plan_id: String },
    /// Bank account with given id doesn't exist
    BankAccountNotFound { account_id: String },
    /// Wallet order referenced by a callback doesn't exist
    OrderNotFound { order_id: String },
    /// Webhook callback hash did not match the recomputed signature
    InvalidWebhookSignature { order_id: String },
}

/// Infrastructure-level errors (database, storage, configuration)
#[derive(Debug, Clone)]
pub enum InfrastructureError {
    /// Database connection or query failure
    Database { message: String, is_retryable: bool },
    /// Object storage upload or fetch failure
    Storage { message: String },
    /// Missing or invalid configuration
    Configuration { message: String },
}

/// External service errors (payment gateways)
#[derive(Debug, Clone)]
pub enum ExternalError {
    /// Card processor or wallet provider error
    Gateway {
        gateway: String,
        message: String,
        is_retryable: bool,
    },
    /// The gateway rejected the charge or order
    Declined {
        gateway: String,
        code: Option<String>,
        message: String,
    },
}

/// Input validation errors
#[derive(Debug, Clone)]
pub enum ValidationError {
    /// Invalid amount (format or value)
    InvalidAmount { amount: String, reason: String },
    /// Required field missing
    MissingField { field: String },
    /// Field value is malformed
    InvalidField { field: String, reason: String },
}

/// Unified application error type
#[derive(Debug, Clone)]
pub struct AppError {
    pub kind: AppErrorKind,
    pub request_id: Option<String>,
    pub context: Option<String>,
}

#[derive(Debug, Clone)]
pub enum AppErrorKind {
    Domain(DomainError),
    Infrastructure(InfrastructureError),
    External(ExternalError),
    Validation(ValidationError),
}

impl AppError {
    pub fn new(kind: AppErrorKind) -> Self {
        Self {
            kind,
            request_id: None,
            context: None,
        }
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Map error to HTTP status code
    pub fn status_code(&self) -> u16 {
        match &self.kind {
            AppErrorKind::Domain(err) => match err {
                DomainError::ClientNotFound { .. } => 404,
                DomainError::ClientHasInvoices { .. } => 400,
                DomainError::InvoiceNotFound { .. } => 404,
                DomainError::InvoiceNotEditable { .. } => 400,
                DomainError::InvoiceNotDeletable { .. } => 400,
                DomainError::InvoiceAlreadyPaid { .. } => 400,
                DomainError::PaymentNotFound { .. } => 404,
                DomainError::PlanNotFound { .. } => 404,
                DomainError::PlanInactive { .. } => 400,
                DomainError::BankAccountNotFound { .. } => 404,
                DomainError::OrderNotFound { .. } => 404,
                DomainError::InvalidWebhookSignature { .. } => 401,
            },
            AppErrorKind::Infrastructure(err) => match err {
                InfrastructureError::Database { .. } => 500,
                InfrastructureError::Storage { .. } => 500,
                InfrastructureError::Configuration { .. } => 500,
            },
            AppErrorKind::External(err) => match err {
                ExternalError::Gateway { .. } => 502,
                ExternalError::Declined { .. } => 400,
            },
            AppErrorKind::Validation(_) => 400,
        }
    }

    /// Map error to machine-readable code
    pub fn error_code(&self) -> ErrorCode {
        match &self.kind {
            AppErrorKind::Domain(err) => match err {
                DomainError::ClientNotFound { .. } => ErrorCode::ClientNotFound,
                DomainError::ClientHasInvoices { .. } => ErrorCode::ClientHasInvoices,
                DomainError::InvoiceNotFound { .. } => ErrorCode::InvoiceNotFound,
                DomainError::InvoiceNotEditable { .. } => ErrorCode::InvoiceNotEditable,
                DomainError::InvoiceNotDeletable { .. } => ErrorCode::InvoiceNotDeletable,
                DomainError::InvoiceAlreadyPaid { .. } => ErrorCode::InvoiceAlreadyPaid,
                DomainError::PaymentNotFound { .. } => ErrorCode::PaymentNotFound,
                DomainError::PlanNotFound { .. } => ErrorCode::PlanNotFound,
                DomainError::PlanInactive { .. } => ErrorCode::PlanInactive,
                DomainError::BankAccountNotFound { .. } => ErrorCode::BankAccountNotFound,
                DomainError::OrderNotFound { .. } => ErrorCode::OrderNotFound,
                DomainError::InvalidWebhookSignature { .. } => ErrorCode::InvalidWebhookSignature,
            },
            AppErrorKind::Infrastructure(err) => match err {
                InfrastructureError::Database { .. } => ErrorCode::DatabaseError,
                InfrastructureError::Storage { .. } => ErrorCode::StorageError,
                InfrastructureError::Configuration { .. } => ErrorCode::ConfigurationError,
            },
            AppErrorKind::External(err) => match err {
                ExternalError::Gateway { .. } => ErrorCode::PaymentGatewayError,
                ExternalError::Declined { .. } => ErrorCode::GatewayDeclined,
            },
            AppErrorKind::Validation(_) => ErrorCode::ValidationError,
        }
    }

    /// User-facing message, safe to return to API clients
    pub fn user_message(&self) -> String {
        match &self.kind {
            AppErrorKind::Domain(err) => match err {
                DomainError::ClientNotFound { client_id } => {
                    format!("Client {} not found", client_id)
                }
                DomainError::ClientHasInvoices { count, .. } => {
                    format!("Client has {} invoice(s) and cannot be deleted", count)
                }
                DomainError::InvoiceNotFound { invoice_id } => {
                    format!("Invoice {} not found", invoice_id)
                }
                DomainError::InvoiceNotEditable { .. } => {
                    "Invoice has recorded payments and can no longer be edited".to_string()
                }
                DomainError::InvoiceNotDeletable { status, .. } => {
                    format!("Invoices with status '{}' cannot be deleted", status)
                }
                DomainError::InvoiceAlreadyPaid { .. } => {
                    "Invoice is already paid".to_string()
                }
                DomainError::PaymentNotFound { payment_id } => {
                    format!("Payment {} not found", payment_id)
                }
                DomainError::PlanNotFound { plan_id } => {
                    format!("Recurring plan {} not found", plan_id)
                }
                DomainError::PlanInactive { .. } => "Recurring plan is inactive".to_string(),
                DomainError::BankAccountNotFound { account_id } => {
                    format!("Bank account {} not found", account_id)
                }
                DomainError::OrderNotFound { order_id } => {
                    format!("Payment order {} not found", order_id)
                }
                DomainError::InvalidWebhookSignature { .. } => {
                    "Invalid webhook signature".to_string()
                }
            },
            AppErrorKind::Infrastructure(err) => match err {
                InfrastructureError::Database { .. } => {
                    "A database error occurred. Please try again later.".to_string()
                }
                InfrastructureError::Storage { .. } => {
                    "File storage is temporarily unavailable".to_string()
                }
                InfrastructureError::Configuration { .. } => {
                    "Service is misconfigured".to_string()
                }
            },
            AppErrorKind::External(err) => match err {
                ExternalError::Gateway { gateway, .. } => {
                    format!("Payment gateway '{}' returned an error", gateway)
                }
                ExternalError::Declined { message, .. } => message.clone(),
            },
            AppErrorKind::Validation(err) => match err {
                ValidationError::InvalidAmount { amount, reason } => {
                    format!("Invalid amount '{}': {}", amount, reason)
                }
                ValidationError::MissingField { field } => {
                    format!("Required field '{}' is missing", field)
                }
                ValidationError::InvalidField { field, reason } => {
                    format!("Invalid value for '{}': {}", field, reason)
                }
            },
        }
    }

    /// Whether the client may retry the request unchanged
    pub fn is_retryable(&self) -> bool {
        match &self.kind {
            AppErrorKind::Domain(_) => false,
            AppErrorKind::Infrastructure(err) => match err {
                InfrastructureError::Database { is_retryable, .. } => *is_retryable,
                InfrastructureError::Storage { .. } => true,
                InfrastructureError::Configuration { .. } => false,
            },
            AppErrorKind::External(err) => match err {
                ExternalError::Gateway { is_retryable, .. } => *is_retryable,
                ExternalError::Declined { .. } => false,
            },
            AppErrorKind::Validation(_) => false,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.user_message())?;
        if let Some(ctx) = &self.context {
            write!(f, " ({})", ctx)?;
        }
        Ok(())
    }
}

impl std::error::Error for AppError {}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        AppError::new(AppErrorKind::Domain(err))
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::new(AppErrorKind::Validation(err))
    }
}

impl From<crate::database::error::DatabaseError> for AppError {
    fn from(err: crate::database::error::DatabaseError) -> Self {
        use crate::database::error::DatabaseErrorKind;

        match err.kind() {
            DatabaseErrorKind::NotFound { entity, id } => {
                AppError::new(AppErrorKind::Domain(match entity.as_str() {
                    "Client" => DomainError::ClientNotFound {
                        client_id: id.clone(),
                    },
                    "Invoice" => DomainError::InvoiceNotFound {
                        invoice_id: id.clone(),
                    },
                    "Payment" => DomainError::PaymentNotFound {
                        payment_id: id.clone(),
                    },
                    "RecurringPlan" => DomainError::PlanNotFound {
                        plan_id: id.clone(),
                    },
                    "BankAccount" => DomainError::BankAccountNotFound {
                        account_id: id.clone(),
                    },
                    "WalletOrder" => DomainError::OrderNotFound {
                        order_id: id.clone(),
                    },
                    _ => {
                        return AppError::new(AppErrorKind::Infrastructure(
                            InfrastructureError::Database {
                                message: err.to_string(),
                                is_retryable: false,
                            },
                        ))
                    }
                }))
            }
            _ => AppError::new(AppErrorKind::Infrastructure(InfrastructureError::Database {
                message: err.to_string(),
                is_retryable: err.is_retryable(),
            })),
        }
    }
}

impl From<crate::gateways::error::GatewayError> for AppError {
    fn from(err: crate::gateways::error::GatewayError) -> Self {
        use crate::gateways::error::GatewayError;

        match err {
            GatewayError::ValidationError { message, field } => {
                AppError::new(AppErrorKind::Validation(ValidationError::InvalidField {
                    field: field.unwrap_or_else(|| "request".to_string()),
                    reason: message,
                }))
            }
            GatewayError::Declined {
                gateway,
                code,
                message,
            } => AppError::new(AppErrorKind::External(ExternalError::Declined {
                gateway,
                code,
                message,
            })),
            other => {
                let retryable = other.is_retryable();
                AppError::new(AppErrorKind::External(ExternalError::Gateway {
                    gateway: other.gateway_name(),
                    message: other.to_string(),
                    is_retryable: retryable,
                }))
            }
        }
    }
}

impl From<crate::storage::StorageError> for AppError {
    fn from(err: crate::storage::StorageError) -> Self {
        AppError::new(AppErrorKind::Infrastructure(InfrastructureError::Storage {
            message: err.to_string(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_map_to_expected_status_codes() {
        let not_found = AppError::new(AppErrorKind::Domain(DomainError::InvoiceNotFound {
            invoice_id: "inv_1".to_string(),
        }));
        assert_eq!(not_found.status_code(), 404);

        let not_deletable = AppError::new(AppErrorKind::Domain(DomainError::InvoiceNotDeletable {
            invoice_id: "inv_1".to_string(),
            status: "paid".to_string(),
        }));
        assert_eq!(not_deletable.status_code(), 400);

        let bad_signature =
            AppError::new(AppErrorKind::Domain(DomainError::InvalidWebhookSignature {
                order_id: "ord_1".to_string(),
            }));
        assert_eq!(bad_signature.status_code(), 401);
        assert_eq!(bad_signature.error_code(), ErrorCode::InvalidWebhookSignature);
    }

    #[test]
    fn retryable_flags_follow_error_kind() {
        let db = AppError::new(AppErrorKind::Infrastructure(InfrastructureError::Database {
            message: "timeout".to_string(),
            is_retryable: true,
        }));
        assert!(db.is_retryable());

        let declined = AppError::new(AppErrorKind::External(ExternalError::Declined {
            gateway: "nmi".to_string(),
            code: Some("2".to_string()),
            message: "declined".to_string(),
        }));
        assert!(!declined.is_retryable());
        assert_eq!(declined.status_code(), 400);
    }

    #[test]
    fn request_id_is_attached() {
        let err = AppError::new(AppErrorKind::Validation(ValidationError::MissingField {
            field: "invoice_id".to_string(),
        }))
        .with_request_id("req_1");
        assert_eq!(err.request_id.as_deref(), Some("req_1"));
        assert!(err.user_message().contains("invoice_id"));
    }
}
