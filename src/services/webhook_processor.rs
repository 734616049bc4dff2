//! Wallet callback processing
//!
//! The provider confirms wallet orders with a signed GET callback. This is
//! the only path by which wallet payments and their invoices change state,
//! so processing is strict: unknown orders 404, bad signatures 401 with a
//! distinct audit event, and replays of terminal orders are acknowledged
//! without touching anything.

use crate::database::invoice_repository::InvoiceRepository;
use crate::database::payment_repository::PaymentRepository;
use crate::database::wallet_order_repository::WalletOrderRepository;
use crate::error::{AppError, DomainError};
use crate::gateways::easypay::EasyPayGateway;
use crate::gateways::types::WalletStatus;
use crate::services::audit::AuditService;
use crate::services::invoices::InvoiceService;
use serde::Serialize;
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{info, warn};

/// Result of handling a callback, returned to the provider as JSON
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum CallbackOutcome {
    /// Terminal status applied to the payment and invoice
    Processed {
        payment_status: String,
        invoice_status: String,
    },
    /// Callback for an order an earlier callback already settled
    AlreadyProcessed,
    /// Non-terminal status code; nothing to apply yet
    Pending,
}

pub struct WebhookProcessor {
    wallet_orders: WalletOrderRepository,
    payments: PaymentRepository,
    invoices: InvoiceRepository,
    invoice_service: Arc<InvoiceService>,
    easypay: Arc<EasyPayGateway>,
    audit: Arc<AuditService>,
}

impl WebhookProcessor {
    pub fn new(
        pool: PgPool,
        invoice_service: Arc<InvoiceService>,
        easypay: Arc<EasyPayGateway>,
        audit: Arc<AuditService>,
    ) -> Self {
        Self {
            wallet_orders: WalletOrderRepository::new(pool.clone()),
            payments: PaymentRepository::new(pool.clone()),
            invoices: InvoiceRepository::new(pool),
            invoice_service,
            easypay,
            audit,
        }
    }

    pub async fn process_easypay_callback(
        &self,
        order_id: &str,
        status_code: &str,
        hash: &str,
    ) -> Result<CallbackOutcome, AppError> {
        let order = self
            .wallet_orders
            .find_by_order_id(order_id)
            .await?
            .ok_or_else(|| DomainError::OrderNotFound {
                order_id: order_id.to_string(),
            })?;

        if !self
            .easypay
            .verify_callback(order_id, status_code, &order.domain, hash)
        {
            warn!(order_id = %order_id, "wallet callback rejected: signature mismatch");
            self.audit
                .record(
                    "webhook.invalid_signature",
                    "wallet_order",
                    Some(order_id),
                    json!({ "status_code": status_code }),
                )
                .await;
            return Err(DomainError::InvalidWebhookSignature {
                order_id: order_id.to_string(),
            }
            .into());
        }

        // once a callback has settled the order, no later callback may change
        // it again, even one carrying a different terminal code
        if WalletStatus::is_terminal_status(&order.status) {
            info!(order_id = %order_id, status = %order.status, "wallet callback replayed, order already settled");
            self.audit
                .record(
                    "webhook.replayed",
                    "wallet_order",
                    Some(order_id),
                    json!({ "status_code": status_code, "settled_status": order.status }),
                )
                .await;
            return Ok(CallbackOutcome::AlreadyProcessed);
        }

        let status = WalletStatus::from_code(status_code);

        if !status.is_terminal() {
            // keep the order state, only note the latest code seen
            self.wallet_orders
                .record_callback(order.id, &order.status, status_code)
                .await?;
            self.audit
                .record(
                    "webhook.processed",
                    "wallet_order",
                    Some(order_id),
                    json!({ "status_code": status_code, "outcome": "pending" }),
                )
                .await;
            return Ok(CallbackOutcome::Pending);
        }

        let payment = self
            .payments
            .set_status(order.payment_id, status.payment_status())
            .await?;

        let invoice = match status {
            // completion feeds the paid-sum aggregation so partial wallet
            // payments leave the invoice `partial` rather than `paid`
            WalletStatus::Completed => {
                self.invoice_service
                    .recompute_from_payments(order.invoice_id)
                    .await?
            }
            _ => {
                self.invoices
                    .set_status(order.invoice_id, status.invoice_status())
                    .await?
            }
        };

        self.wallet_orders
            .record_callback(order.id, status.payment_status(), status_code)
            .await?;

        info!(
            order_id = %order_id,
            payment_status = %payment.status,
            invoice_status = %invoice.status,
            "wallet callback processed"
        );
        self.audit
            .record(
                "webhook.processed",
                "wallet_order",
                Some(order_id),
                json!({
                    "status_code": status_code,
                    "payment_status": payment.status,
                    "invoice_status": invoice.status,
                }),
            )
            .await;

        Ok(CallbackOutcome::Processed {
            payment_status: payment.status,
            invoice_status: invoice.status,
        })
    }
}
