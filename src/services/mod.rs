//! Business logic layer between the HTTP handlers and the repositories

pub mod audit;
pub mod invoices;
pub mod payments;
pub mod recurring;
pub mod webhook_processor;

pub use audit::AuditService;
pub use invoices::InvoiceService;
pub use payments::PaymentService;
pub use recurring::RecurringPlanService;
pub use webhook_processor::{CallbackOutcome, WebhookProcessor};
