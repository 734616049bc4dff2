//! Recurring plan invoice generation
//!
//! A plan is a template: client, line items, interval. There is no
//! in-process scheduler; `run` is an explicit call that generates the next
//! invoice and advances the plan's next run date.

use crate::database::invoice_repository::{Invoice, InvoiceInput, InvoiceItemInput};
use crate::database::recurring_plan_repository::{
    RecurringPlan, RecurringPlanInput, RecurringPlanRepository,
};
use crate::database::repository::Repository;
use crate::error::{AppError, DomainError, ValidationError};
use crate::services::audit::AuditService;
use crate::services::invoices::InvoiceService;
use bigdecimal::BigDecimal;
use chrono::{Months, NaiveDate};
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

const FREQUENCIES: &[&str] = &["weekly", "monthly", "quarterly", "yearly"];

/// Line-item template entry stored in the plan's `items` JSON.
/// Amounts are strings to keep NUMERIC precision through JSON.
#[derive(Debug, Deserialize)]
struct PlanItemTemplate {
    description: String,
    quantity: String,
    unit_price: String,
}

pub struct RecurringPlanService {
    plans: RecurringPlanRepository,
    invoice_service: Arc<InvoiceService>,
    audit: Arc<AuditService>,
}

impl RecurringPlanService {
    pub fn new(
        pool: PgPool,
        invoice_service: Arc<InvoiceService>,
        audit: Arc<AuditService>,
    ) -> Self {
        Self {
            plans: RecurringPlanRepository::new(pool),
            invoice_service,
            audit,
        }
    }

    pub async fn create(&self, input: RecurringPlanInput) -> Result<RecurringPlan, AppError> {
        validate_plan(&input)?;
        let plan = self.plans.create(&input).await?;

        info!(plan_id = %plan.id, name = %plan.name, "recurring plan created");
        self.audit
            .record(
                "recurring_plan.created",
                "recurring_plan",
                Some(&plan.id.to_string()),
                json!({ "name": plan.name, "frequency": plan.frequency }),
            )
            .await;

        Ok(plan)
    }

    pub async fn update(
        &self,
        id: Uuid,
        input: RecurringPlanInput,
    ) -> Result<RecurringPlan, AppError> {
        validate_plan(&input)?;
        let plan = self.plans.update(id, &input).await?;

        self.audit
            .record(
                "recurring_plan.updated",
                "recurring_plan",
                Some(&id.to_string()),
                json!({ "name": plan.name, "is_active": plan.is_active }),
            )
            .await;

        Ok(plan)
    }

    pub async fn get(&self, id: Uuid) -> Result<RecurringPlan, AppError> {
        self.plans.find(id).await?.ok_or_else(|| {
            DomainError::PlanNotFound {
                plan_id: id.to_string(),
            }
            .into()
        })
    }

    pub async fn list(&self) -> Result<Vec<RecurringPlan>, AppError> {
        Ok(self.plans.find_all().await?)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        if !self.plans.delete(&id.to_string()).await? {
            return Err(DomainError::PlanNotFound {
                plan_id: id.to_string(),
            }
            .into());
        }
        self.audit
            .record(
                "recurring_plan.deleted",
                "recurring_plan",
                Some(&id.to_string()),
                json!({}),
            )
            .await;
        Ok(())
    }

    /// Generate the plan's next invoice and advance `next_run_at`
    pub async fn run(&self, id: Uuid) -> Result<Invoice, AppError> {
        let plan = self.get(id).await?;
        if !plan.is_active {
            return Err(DomainError::PlanInactive {
                plan_id: id.to_string(),
            }
            .into());
        }

        let items = parse_plan_items(&plan.items)?;
        let invoice_number = next_invoice_number(plan.next_run_at);

        let (invoice, _) = self
            .invoice_service
            .create(
                InvoiceInput {
                    client_id: plan.client_id,
                    invoice_number,
                    issue_date: plan.next_run_at,
                    due_date: None,
                    notes: Some(format!("Generated from plan '{}'", plan.name)),
                },
                items,
            )
            .await
            .map_err(|e| e.with_context(format!("generating invoice for plan {}", id)))?;

        let next = advance_run_date(plan.next_run_at, &plan.frequency);
        self.plans.set_next_run(id, next).await?;

        info!(plan_id = %id, invoice_id = %invoice.id, next_run = %next, "recurring plan run");
        self.audit
            .record(
                "recurring_plan.run",
                "recurring_plan",
                Some(&id.to_string()),
                json!({ "invoice_id": invoice.id.to_string(), "next_run_at": next.to_string() }),
            )
            .await;

        Ok(invoice)
    }
}

fn validate_plan(input: &RecurringPlanInput) -> Result<(), AppError> {
    if input.name.trim().is_empty() {
        return Err(ValidationError::MissingField {
            field: "name".to_string(),
        }
        .into());
    }
    if !FREQUENCIES.contains(&input.frequency.as_str()) {
        return Err(ValidationError::InvalidField {
            field: "frequency".to_string(),
            reason: format!("must be one of: {}", FREQUENCIES.join(", ")),
        }
        .into());
    }
    // templates must be parseable now, not at run time
    parse_plan_items(&input.items)?;
    Ok(())
}

fn parse_plan_items(value: &serde_json::Value) -> Result<Vec<InvoiceItemInput>, AppError> {
    let templates: Vec<PlanItemTemplate> =
        serde_json::from_value(value.clone()).map_err(|e| ValidationError::InvalidField {
            field: "items".to_string(),
            reason: format!("malformed item template: {}", e),
        })?;

    if templates.is_empty() {
        return Err(ValidationError::MissingField {
            field: "items".to_string(),
        }
        .into());
    }

    templates
        .into_iter()
        .map(|template| {
            let quantity = BigDecimal::from_str(&template.quantity).map_err(|_| {
                ValidationError::InvalidField {
                    field: "items.quantity".to_string(),
                    reason: format!("'{}' is not a decimal number", template.quantity),
                }
            })?;
            let unit_price = BigDecimal::from_str(&template.unit_price).map_err(|_| {
                ValidationError::InvalidField {
                    field: "items.unit_price".to_string(),
                    reason: format!("'{}' is not a decimal number", template.unit_price),
                }
            })?;
            Ok(InvoiceItemInput {
                description: template.description,
                quantity,
                unit_price,
            })
        })
        .collect()
}

fn next_invoice_number(run_date: NaiveDate) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("INV-{}-{}", run_date.format("%Y%m%d"), &suffix[..6])
}

fn advance_run_date(current: NaiveDate, frequency: &str) -> NaiveDate {
    match frequency {
        "weekly" => current + chrono::Duration::days(7),
        "quarterly" => current.checked_add_months(Months::new(3)).unwrap_or(current),
        "yearly" => current.checked_add_months(Months::new(12)).unwrap_or(current),
        // monthly, and the safe default for anything unexpected
        _ => current.checked_add_months(Months::new(1)).unwrap_or(current),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn run_dates_advance_by_frequency() {
        assert_eq!(advance_run_date(date(2026, 1, 15), "weekly"), date(2026, 1, 22));
        assert_eq!(advance_run_date(date(2026, 1, 15), "monthly"), date(2026, 2, 15));
        assert_eq!(advance_run_date(date(2026, 1, 15), "quarterly"), date(2026, 4, 15));
        assert_eq!(advance_run_date(date(2026, 1, 15), "yearly"), date(2027, 1, 15));
    }

    #[test]
    fn month_end_advances_clamp() {
        assert_eq!(advance_run_date(date(2026, 1, 31), "monthly"), date(2026, 2, 28));
    }

    #[test]
    fn plan_items_parse_into_invoice_items() {
        let value = serde_json::json!([
            { "description": "Hosting", "quantity": "1", "unit_price": "25.00" },
            { "description": "Support hours", "quantity": "2.5", "unit_price": "80" }
        ]);
        let items = parse_plan_items(&value).expect("should parse");
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].quantity, BigDecimal::from_str("2.5").unwrap());
    }

    #[test]
    fn malformed_plan_items_are_rejected() {
        assert!(parse_plan_items(&serde_json::json!([])).is_err());
        assert!(parse_plan_items(&serde_json::json!({"not": "a list"})).is_err());
        assert!(parse_plan_items(&serde_json::json!([
            { "description": "x", "quantity": "one", "unit_price": "10" }
        ]))
        .is_err());
    }

    #[test]
    fn invoice_numbers_embed_the_run_date() {
        let number = next_invoice_number(date(2026, 3, 1));
        assert!(number.starts_with("INV-20260301-"));
    }
}
