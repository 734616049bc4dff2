//! Shared application state handed to every handler

use crate::database::bank_account_repository::BankAccountRepository;
use crate::database::client_repository::ClientRepository;
use crate::gateways::easypay::EasyPayGateway;
use crate::gateways::nmi::NmiGateway;
use crate::health::HealthChecker;
use crate::services::{
    AuditService, InvoiceService, PaymentService, RecurringPlanService, WebhookProcessor,
};
use crate::storage::ObjectStorageClient;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub clients: Arc<ClientRepository>,
    pub bank_accounts: Arc<BankAccountRepository>,
    pub invoices: Arc<InvoiceService>,
    pub payments: Arc<PaymentService>,
    pub recurring: Arc<RecurringPlanService>,
    pub webhooks: Arc<WebhookProcessor>,
    pub audit: Arc<AuditService>,
    pub health: HealthChecker,
}

impl AppState {
    pub fn new(
        pool: PgPool,
        nmi: Arc<NmiGateway>,
        easypay: Arc<EasyPayGateway>,
        storage: Arc<ObjectStorageClient>,
    ) -> Self {
        let audit = Arc::new(AuditService::new(pool.clone()));
        let invoices = Arc::new(InvoiceService::new(pool.clone(), audit.clone()));
        let payments = Arc::new(PaymentService::new(
            pool.clone(),
            nmi,
            easypay.clone(),
            storage,
            audit.clone(),
        ));
        let recurring = Arc::new(RecurringPlanService::new(
            pool.clone(),
            invoices.clone(),
            audit.clone(),
        ));
        let webhooks = Arc::new(WebhookProcessor::new(
            pool.clone(),
            invoices.clone(),
            easypay,
            audit.clone(),
        ));

        Self {
            clients: Arc::new(ClientRepository::new(pool.clone())),
            bank_accounts: Arc::new(BankAccountRepository::new(pool.clone())),
            invoices,
            payments,
            recurring,
            webhooks,
            audit,
            health: HealthChecker::new(pool.clone()),
            pool,
        }
    }
}
