//! Invoice lifecycle rules
//!
//! The deletability, editability, and payment-aggregation rules live here
//! rather than in the database so every caller goes through the same checks.

use crate::database::invoice_repository::{
    Invoice, InvoiceInput, InvoiceItem, InvoiceItemInput, InvoiceRepository,
};
use crate::database::payment_repository::{Payment, PaymentRepository};
use crate::database::repository::Repository;
use crate::error::{AppError, DomainError, ValidationError};
use crate::services::audit::AuditService;
use bigdecimal::BigDecimal;
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Invoice statuses that block deletion
const UNDELETABLE_STATUSES: &[&str] = &["paid", "partial"];

pub struct InvoiceService {
    invoices: InvoiceRepository,
    payments: PaymentRepository,
    audit: Arc<AuditService>,
}

impl InvoiceService {
    pub fn new(pool: PgPool, audit: Arc<AuditService>) -> Self {
        Self {
            invoices: InvoiceRepository::new(pool.clone()),
            payments: PaymentRepository::new(pool),
            audit,
        }
    }

    pub async fn create(
        &self,
        input: InvoiceInput,
        items: Vec<InvoiceItemInput>,
    ) -> Result<(Invoice, Vec<InvoiceItem>), AppError> {
        validate_items(&items)?;
        let total = items_total(&items);

        let invoice = self.invoices.create_with_items(&input, &items, total).await?;
        let items = self.invoices.find_items(invoice.id).await?;

        info!(invoice_id = %invoice.id, invoice_number = %invoice.invoice_number, "invoice created");
        self.audit
            .record(
                "invoice.created",
                "invoice",
                Some(&invoice.id.to_string()),
                json!({ "invoice_number": invoice.invoice_number, "total": invoice.total.to_string() }),
            )
            .await;

        Ok((invoice, items))
    }

    /// Update header and line items; rejected once any payment exists
    pub async fn update(
        &self,
        id: Uuid,
        input: InvoiceInput,
        items: Vec<InvoiceItemInput>,
    ) -> Result<(Invoice, Vec<InvoiceItem>), AppError> {
        validate_items(&items)?;
        self.require_editable(id).await?;

        let total = items_total(&items);
        let invoice = self
            .invoices
            .update_with_items(id, &input, &items, total)
            .await?;
        let items = self.invoices.find_items(id).await?;

        self.audit
            .record(
                "invoice.updated",
                "invoice",
                Some(&id.to_string()),
                json!({ "total": invoice.total.to_string() }),
            )
            .await;

        Ok((invoice, items))
    }

    /// Delete an invoice. Paid and partially paid invoices are rejected
    /// before any delete statement is issued.
    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let invoice = self
            .invoices
            .find(id)
            .await?
            .ok_or_else(|| DomainError::InvoiceNotFound {
                invoice_id: id.to_string(),
            })?;

        if UNDELETABLE_STATUSES.contains(&invoice.status.as_str()) {
            return Err(DomainError::InvoiceNotDeletable {
                invoice_id: id.to_string(),
                status: invoice.status,
            }
            .into());
        }

        self.invoices.delete(&id.to_string()).await?;

        info!(invoice_id = %id, "invoice deleted");
        self.audit
            .record(
                "invoice.deleted",
                "invoice",
                Some(&id.to_string()),
                json!({ "invoice_number": invoice.invoice_number }),
            )
            .await;

        Ok(())
    }

    pub async fn get(&self, id: Uuid) -> Result<(Invoice, Vec<InvoiceItem>), AppError> {
        let invoice = self
            .invoices
            .find(id)
            .await?
            .ok_or_else(|| DomainError::InvoiceNotFound {
                invoice_id: id.to_string(),
            })?;
        let items = self.invoices.find_items(id).await?;
        Ok((invoice, items))
    }

    pub async fn list(&self) -> Result<Vec<Invoice>, AppError> {
        Ok(self.invoices.find_all().await?)
    }

    /// An invoice is editable iff it has zero associated payments
    pub async fn is_editable(&self, id: Uuid) -> Result<bool, AppError> {
        if self.invoices.find(id).await?.is_none() {
            return Err(DomainError::InvoiceNotFound {
                invoice_id: id.to_string(),
            }
            .into());
        }
        Ok(self.invoices.payment_count(id).await? == 0)
    }

    pub async fn payments_for(&self, id: Uuid) -> Result<Vec<Payment>, AppError> {
        if self.invoices.find(id).await?.is_none() {
            return Err(DomainError::InvoiceNotFound {
                invoice_id: id.to_string(),
            }
            .into());
        }
        Ok(self.payments.find_by_invoice(id).await?)
    }

    /// Recompute the invoice status from the sum of paid payments.
    ///
    /// `paid` when the sum covers the total, `partial` when positive but
    /// short, otherwise the status is left as-is.
    pub async fn recompute_from_payments(&self, id: Uuid) -> Result<Invoice, AppError> {
        let invoice = self
            .invoices
            .find(id)
            .await?
            .ok_or_else(|| DomainError::InvoiceNotFound {
                invoice_id: id.to_string(),
            })?;

        let paid = self.invoices.paid_total(id).await?;
        let next_status = if paid >= invoice.total {
            Some("paid")
        } else if paid > BigDecimal::from(0) {
            Some("partial")
        } else {
            None
        };

        match next_status {
            Some(status) if status != invoice.status => {
                Ok(self.invoices.set_status(id, status).await?)
            }
            _ => Ok(invoice),
        }
    }

    async fn require_editable(&self, id: Uuid) -> Result<(), AppError> {
        if self.invoices.find(id).await?.is_none() {
            return Err(DomainError::InvoiceNotFound {
                invoice_id: id.to_string(),
            }
            .into());
        }
        if self.invoices.payment_count(id).await? > 0 {
            return Err(DomainError::InvoiceNotEditable {
                invoice_id: id.to_string(),
            }
            .into());
        }
        Ok(())
    }
}

pub(crate) fn items_total(items: &[InvoiceItemInput]) -> BigDecimal {
    items
        .iter()
        .map(|item| &item.quantity * &item.unit_price)
        .fold(BigDecimal::from(0), |acc, amount| acc + amount)
}

fn validate_items(items: &[InvoiceItemInput]) -> Result<(), AppError> {
    if items.is_empty() {
        return Err(ValidationError::MissingField {
            field: "items".to_string(),
        }
        .into());
    }
    for (index, item) in items.iter().enumerate() {
        if item.description.trim().is_empty() {
            return Err(ValidationError::InvalidField {
                field: format!("items[{}].description", index),
                reason: "description is required".to_string(),
            }
            .into());
        }
        if item.quantity <= BigDecimal::from(0) {
            return Err(ValidationError::InvalidField {
                field: format!("items[{}].quantity", index),
                reason: "quantity must be positive".to_string(),
            }
            .into());
        }
        if item.unit_price < BigDecimal::from(0) {
            return Err(ValidationError::InvalidField {
                field: format!("items[{}].unit_price", index),
                reason: "unit price cannot be negative".to_string(),
            }
            .into());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn item(quantity: &str, unit_price: &str) -> InvoiceItemInput {
        InvoiceItemInput {
            description: "Consulting".to_string(),
            quantity: BigDecimal::from_str(quantity).unwrap(),
            unit_price: BigDecimal::from_str(unit_price).unwrap(),
        }
    }

    #[test]
    fn total_sums_quantity_times_unit_price() {
        let items = vec![item("2", "100.50"), item("1", "49.00")];
        assert_eq!(items_total(&items), BigDecimal::from_str("250.00").unwrap());
    }

    #[test]
    fn empty_item_list_is_rejected() {
        assert!(validate_items(&[]).is_err());
    }

    #[test]
    fn non_positive_quantity_is_rejected() {
        assert!(validate_items(&[item("0", "10")]).is_err());
        assert!(validate_items(&[item("-1", "10")]).is_err());
        assert!(validate_items(&[item("1", "10")]).is_ok());
    }

    #[test]
    fn negative_unit_price_is_rejected() {
        assert!(validate_items(&[item("1", "-0.01")]).is_err());
        // zero-priced lines are allowed (discounts, included services)
        assert!(validate_items(&[item("1", "0")]).is_ok());
    }
}
