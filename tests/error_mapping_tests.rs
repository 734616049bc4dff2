#[cfg(test)]
mod error_mapping_tests {
    use billfold_backend::database::error::DatabaseError;
    use billfold_backend::error::{
        AppError, AppErrorKind, DomainError, ErrorCode, ValidationError,
    };
    use billfold_backend::gateways::error::GatewayError;
    use billfold_backend::middleware::ErrorResponse;

    #[test]
    fn delete_guards_are_client_errors() {
        let paid = AppError::new(AppErrorKind::Domain(DomainError::InvoiceNotDeletable {
            invoice_id: "inv_1".to_string(),
            status: "paid".to_string(),
        }));
        assert_eq!(paid.status_code(), 400);
        assert_eq!(paid.error_code(), ErrorCode::InvoiceNotDeletable);
        assert!(!paid.is_retryable());

        let has_invoices = AppError::new(AppErrorKind::Domain(DomainError::ClientHasInvoices {
            client_id: "cl_1".to_string(),
            count: 3,
        }));
        assert_eq!(has_invoices.status_code(), 400);
        assert!(has_invoices.user_message().contains("3 invoice"));
    }

    #[test]
    fn invalid_webhook_signature_is_401() {
        let err = AppError::new(AppErrorKind::Domain(DomainError::InvalidWebhookSignature {
            order_id: "ord_1".to_string(),
        }));
        assert_eq!(err.status_code(), 401);
        assert_eq!(err.error_code(), ErrorCode::InvalidWebhookSignature);
    }

    #[test]
    fn unknown_order_is_404() {
        let err = AppError::new(AppErrorKind::Domain(DomainError::OrderNotFound {
            order_id: "ord_missing".to_string(),
        }));
        assert_eq!(err.status_code(), 404);
    }

    #[test]
    fn database_not_found_maps_to_domain_error() {
        let err: AppError = DatabaseError::not_found("Invoice", "inv_9").into();
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.error_code(), ErrorCode::InvoiceNotFound);

        let err: AppError = DatabaseError::not_found("WalletOrder", "ord_9").into();
        assert_eq!(err.error_code(), ErrorCode::OrderNotFound);
    }

    #[test]
    fn gateway_decline_becomes_400_and_network_502() {
        let declined: AppError = GatewayError::Declined {
            gateway: "nmi".to_string(),
            code: Some("2".to_string()),
            message: "DECLINE".to_string(),
        }
        .into();
        assert_eq!(declined.status_code(), 400);
        assert_eq!(declined.error_code(), ErrorCode::GatewayDeclined);

        let network: AppError = GatewayError::NetworkError {
            gateway: "easypay".to_string(),
            message: "timeout".to_string(),
        }
        .into();
        assert_eq!(network.status_code(), 502);
        assert!(network.is_retryable());
    }

    #[test]
    fn error_response_uses_screaming_snake_codes() {
        let err = AppError::new(AppErrorKind::Domain(DomainError::InvoiceNotDeletable {
            invoice_id: "inv_1".to_string(),
            status: "partial".to_string(),
        }))
        .with_request_id("req_42");

        let body = serde_json::to_value(ErrorResponse::from_app_error(&err)).expect("serialize");
        assert_eq!(body["error"], "INVOICE_NOT_DELETABLE");
        assert_eq!(body["request_id"], "req_42");
        assert_eq!(body["retryable"], false);
        assert!(body["message"].as_str().is_some());
    }

    #[test]
    fn validation_errors_name_the_field() {
        let err = AppError::new(AppErrorKind::Validation(ValidationError::InvalidAmount {
            amount: "-1".to_string(),
            reason: "must be positive".to_string(),
        }));
        assert_eq!(err.status_code(), 400);
        assert!(err.user_message().contains("-1"));
    }
}
