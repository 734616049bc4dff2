//! Payment intake across the three integrations
//!
//! Card links and wallet orders create a `pending` payment row up front so
//! the gateway reference is always reconcilable; bank transfers record the
//! uploaded evidence URL on a `pending` row awaiting review.

use crate::database::invoice_repository::{Invoice, InvoiceRepository};
use crate::database::payment_repository::{Payment, PaymentInput, PaymentRepository};
use crate::database::wallet_order_repository::{WalletOrder, WalletOrderRepository};
use crate::error::{AppError, DomainError, ValidationError};
use crate::gateways::easypay::EasyPayGateway;
use crate::gateways::nmi::NmiGateway;
use crate::gateways::types::{CardLink, WalletOrderQuote};
use crate::services::audit::AuditService;
use crate::storage::ObjectStorageClient;
use bigdecimal::BigDecimal;
use serde_json::json;
use sqlx::PgPool;
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

pub struct PaymentService {
    invoices: InvoiceRepository,
    payments: PaymentRepository,
    wallet_orders: WalletOrderRepository,
    nmi: Arc<NmiGateway>,
    easypay: Arc<EasyPayGateway>,
    storage: Arc<ObjectStorageClient>,
    audit: Arc<AuditService>,
}

impl PaymentService {
    pub fn new(
        pool: PgPool,
        nmi: Arc<NmiGateway>,
        easypay: Arc<EasyPayGateway>,
        storage: Arc<ObjectStorageClient>,
        audit: Arc<AuditService>,
    ) -> Self {
        Self {
            invoices: InvoiceRepository::new(pool.clone()),
            payments: PaymentRepository::new(pool.clone()),
            wallet_orders: WalletOrderRepository::new(pool),
            nmi,
            easypay,
            storage,
            audit,
        }
    }

    /// Request a hosted card-payment link for the invoice's outstanding amount
    pub async fn create_card_link(
        &self,
        invoice_id: Uuid,
    ) -> Result<(Payment, CardLink), AppError> {
        let invoice = self.require_payable(invoice_id).await?;
        let outstanding = self.outstanding_amount(&invoice).await?;

        let link = self
            .nmi
            .create_payment_link(&invoice.invoice_number, &amount_string(&outstanding))
            .await?;

        let payment = self
            .payments
            .create(&PaymentInput {
                invoice_id,
                method: "card".to_string(),
                status: "pending".to_string(),
                amount: outstanding,
                reference: Some(link.transaction_id.clone()),
                evidence_url: None,
            })
            .await?;

        info!(invoice_id = %invoice_id, payment_id = %payment.id, "card payment link issued");
        self.audit
            .record(
                "payment.card_link_created",
                "payment",
                Some(&payment.id.to_string()),
                json!({ "invoice_id": invoice_id.to_string(), "transaction_id": link.transaction_id }),
            )
            .await;

        Ok((payment, link))
    }

    /// Record a bank transfer with its screenshot evidence.
    ///
    /// The paid-invoice guard runs before the upload so no file is stored
    /// for a rejected submission.
    pub async fn record_bank_transfer(
        &self,
        invoice_id: Uuid,
        amount: Option<String>,
        reference: Option<String>,
        content_type: &str,
        file: Vec<u8>,
    ) -> Result<Payment, AppError> {
        let invoice = self.require_payable(invoice_id).await?;
        let amount = match amount {
            Some(raw) => parse_amount(&raw)?,
            None => self.outstanding_amount(&invoice).await?,
        };

        let evidence_url = self
            .storage
            .upload_evidence(&invoice_id.to_string(), content_type, file)
            .await?;

        let payment = self
            .payments
            .create(&PaymentInput {
                invoice_id,
                method: "bank_transfer".to_string(),
                status: "pending".to_string(),
                amount,
                reference,
                evidence_url: Some(evidence_url),
            })
            .await?;

        info!(invoice_id = %invoice_id, payment_id = %payment.id, "bank transfer submitted");
        self.audit
            .record(
                "payment.bank_transfer_submitted",
                "payment",
                Some(&payment.id.to_string()),
                json!({ "invoice_id": invoice_id.to_string(), "amount": payment.amount.to_string() }),
            )
            .await;

        Ok(payment)
    }

    /// Create a wallet order at the provider and its local reconciliation row
    pub async fn create_wallet_order(
        &self,
        invoice_id: Uuid,
        mobile_number: Option<String>,
    ) -> Result<(WalletOrder, WalletOrderQuote), AppError> {
        let invoice = self.require_payable(invoice_id).await?;
        let outstanding = self.outstanding_amount(&invoice).await?;

        let quote = self
            .easypay
            .create_order(
                &invoice.invoice_number,
                &amount_string(&outstanding),
                mobile_number.as_deref(),
            )
            .await?;

        let payment = self
            .payments
            .create(&PaymentInput {
                invoice_id,
                method: "wallet".to_string(),
                status: "pending".to_string(),
                amount: outstanding.clone(),
                reference: Some(quote.order_id.clone()),
                evidence_url: None,
            })
            .await?;

        let order = self
            .wallet_orders
            .create(
                &quote.order_id,
                invoice_id,
                payment.id,
                self.easypay.domain(),
                outstanding,
            )
            .await?;

        info!(invoice_id = %invoice_id, order_id = %order.order_id, "wallet order created");
        self.audit
            .record(
                "payment.wallet_order_created",
                "wallet_order",
                Some(&order.order_id),
                json!({ "invoice_id": invoice_id.to_string(), "payment_id": payment.id.to_string() }),
            )
            .await;

        Ok((order, quote))
    }

    /// Load the invoice and reject attempts to pay an already-paid one
    async fn require_payable(&self, invoice_id: Uuid) -> Result<Invoice, AppError> {
        let invoice = self
            .invoices
            .find(invoice_id)
            .await?
            .ok_or_else(|| DomainError::InvoiceNotFound {
                invoice_id: invoice_id.to_string(),
            })?;

        if invoice.status == "paid" {
            return Err(DomainError::InvoiceAlreadyPaid {
                invoice_id: invoice_id.to_string(),
            }
            .into());
        }

        Ok(invoice)
    }

    async fn outstanding_amount(&self, invoice: &Invoice) -> Result<BigDecimal, AppError> {
        let paid = self.invoices.paid_total(invoice.id).await?;
        let outstanding = &invoice.total - &paid;
        if outstanding <= BigDecimal::from(0) {
            return Err(DomainError::InvoiceAlreadyPaid {
                invoice_id: invoice.id.to_string(),
            }
            .into());
        }
        Ok(outstanding)
    }
}

fn amount_string(amount: &BigDecimal) -> String {
    amount.with_scale(2).to_string()
}

pub(crate) fn parse_amount(raw: &str) -> Result<BigDecimal, AppError> {
    let amount = BigDecimal::from_str(raw.trim()).map_err(|_| ValidationError::InvalidAmount {
        amount: raw.to_string(),
        reason: "not a decimal number".to_string(),
    })?;
    if amount <= BigDecimal::from(0) {
        return Err(ValidationError::InvalidAmount {
            amount: raw.to_string(),
            reason: "must be positive".to_string(),
        }
        .into());
    }
    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amounts_are_formatted_with_two_decimals() {
        assert_eq!(amount_string(&BigDecimal::from(150)), "150.00");
        assert_eq!(
            amount_string(&BigDecimal::from_str("99.5").unwrap()),
            "99.50"
        );
    }

    #[test]
    fn amount_parsing_accepts_positive_decimals() {
        assert_eq!(
            parse_amount("150.25").unwrap(),
            BigDecimal::from_str("150.25").unwrap()
        );
        assert_eq!(parse_amount(" 10 ").unwrap(), BigDecimal::from(10));
    }

    #[test]
    fn amount_parsing_rejects_invalid_input() {
        assert!(parse_amount("").is_err());
        assert!(parse_amount("abc").is_err());
        assert!(parse_amount("0").is_err());
        assert!(parse_amount("-5").is_err());
    }
}
