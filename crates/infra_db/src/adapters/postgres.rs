//! PostgreSQL Invoicing Adapter
//!
//! Implements every invoicing port over the repositories in this crate.
//! Database errors are translated at this boundary:
//! - unique and foreign key violations become `InvoicingError::Conflict`
//! - everything else becomes `InvoicingError::Persistence`
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::adapters::PostgresInvoicingAdapter;
//! use domain_invoicing::InvoiceService;
//! use std::sync::Arc;
//!
//! let adapter = Arc::new(PostgresInvoicingAdapter::new(pool));
//! let service = InvoiceService::new(adapter.clone(), adapter);
//! ```

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, error, instrument, warn};

use core_kernel::{InvoiceId, PartId, RateId, TaxRateId, TransactionId, UserId};
use domain_invoicing::{
    closed_invoice, BillableItem, CatalogPort, Invoice, InvoicePort, InvoicingError, Part, Payment, PaymentPort,
    ProfileChanges, Rate, TaxRate, User, UserPort, UserProfile,
};

use crate::error::DatabaseError;
use crate::repositories::{
    CatalogRepository, GuardedWrite, InvoiceRepository, PaymentRepository, UserRepository,
};

/// PostgreSQL-backed implementation of the invoicing ports
#[derive(Debug, Clone)]
pub struct PostgresInvoicingAdapter {
    catalog: CatalogRepository,
    invoices: InvoiceRepository,
    payments: PaymentRepository,
    users: UserRepository,
}

impl PostgresInvoicingAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            catalog: CatalogRepository::new(pool.clone()),
            invoices: InvoiceRepository::new(pool.clone()),
            payments: PaymentRepository::new(pool.clone()),
            users: UserRepository::new(pool),
        }
    }

    /// Catalog maintenance that is not part of any port
    pub fn catalog(&self) -> &CatalogRepository {
        &self.catalog
    }
}

fn db_error(error: DatabaseError) -> InvoicingError {
    if error.is_connection_error() {
        error!(error = %error, "Database unreachable");
    } else {
        warn!(error = %error, "Database operation failed");
    }
    error.into()
}

fn guarded(outcome: GuardedWrite, id: InvoiceId) -> Result<(), InvoicingError> {
    match outcome {
        GuardedWrite::Applied => Ok(()),
        GuardedWrite::Missing => Err(InvoicingError::not_found("Invoice", id)),
        GuardedWrite::Closed(status) => Err(closed_invoice(id, status)),
    }
}

#[async_trait]
impl CatalogPort for PostgresInvoicingAdapter {
    #[instrument(skip(self), fields(rate_id = %id))]
    async fn find_rate(&self, id: RateId) -> Result<Option<Rate>, InvoicingError> {
        self.catalog.find_rate(id).await.map_err(db_error)
    }

    #[instrument(skip(self), fields(part_id = %id))]
    async fn find_part(&self, id: PartId) -> Result<Option<Part>, InvoicingError> {
        self.catalog.find_part(id).await.map_err(db_error)
    }

    #[instrument(skip(self), fields(tax_rate_id = %id))]
    async fn find_tax_rate(&self, id: TaxRateId) -> Result<Option<TaxRate>, InvoicingError> {
        self.catalog.find_tax_rate(id).await.map_err(db_error)
    }
}

#[async_trait]
impl InvoicePort for PostgresInvoicingAdapter {
    #[instrument(skip(self, invoice, items), fields(invoice_id = %invoice.id, items = items.len()))]
    async fn create_invoice(
        &self,
        invoice: &Invoice,
        items: &[BillableItem],
    ) -> Result<(), InvoicingError> {
        debug!("Inserting invoice with items");
        self.invoices.insert(invoice, items).await.map_err(db_error)
    }

    #[instrument(skip(self), fields(invoice_id = %id))]
    async fn get_invoice(&self, id: InvoiceId) -> Result<Option<Invoice>, InvoicingError> {
        self.invoices.get(id).await.map_err(db_error)
    }

    #[instrument(skip(self, invoice, items), fields(invoice_id = %invoice.id, items = items.len()))]
    async fn replace_invoice(
        &self,
        invoice: &Invoice,
        items: &[BillableItem],
    ) -> Result<(), InvoicingError> {
        debug!("Replacing invoice items");
        let outcome = self.invoices.replace(invoice, items).await.map_err(db_error)?;
        guarded(outcome, invoice.id)
    }

    #[instrument(skip(self), fields(invoice_id = %id))]
    async fn billable_items(&self, id: InvoiceId) -> Result<Vec<BillableItem>, InvoicingError> {
        self.invoices.items(id).await.map_err(db_error)
    }
}

#[async_trait]
impl PaymentPort for PostgresInvoicingAdapter {
    #[instrument(skip(self, payment), fields(invoice_id = %payment.invoice_id, transaction_id = %payment.transaction_id))]
    async fn record_payment(&self, payment: &Payment) -> Result<(), InvoicingError> {
        debug!("Recording payment");
        let outcome = self.payments.record(payment).await.map_err(db_error)?;
        guarded(outcome, payment.invoice_id)
    }

    #[instrument(skip(self), fields(transaction_id = %transaction_id))]
    async fn find_by_transaction_id(
        &self,
        transaction_id: TransactionId,
    ) -> Result<Option<Payment>, InvoicingError> {
        self.payments
            .find_by_transaction_id(transaction_id)
            .await
            .map_err(db_error)
    }
}

#[async_trait]
impl UserPort for PostgresInvoicingAdapter {
    #[instrument(skip(self, email))]
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, InvoicingError> {
        self.users.find_by_email(email).await.map_err(db_error)
    }

    #[instrument(skip(self, user, profile), fields(user_id = %user.id))]
    async fn create_user(&self, user: &User, profile: &UserProfile) -> Result<(), InvoicingError> {
        match self.users.insert(user, profile).await {
            Ok(()) => Ok(()),
            Err(DatabaseError::DuplicateEntry(_)) => {
                Err(InvoicingError::Conflict("Email is already in use.".to_string()))
            }
            Err(e) => Err(db_error(e)),
        }
    }

    #[instrument(skip(self, changes), fields(user_id = %user_id))]
    async fn update_profile(
        &self,
        user_id: UserId,
        changes: ProfileChanges,
    ) -> Result<Option<UserProfile>, InvoicingError> {
        self.users
            .update_profile(user_id, &changes)
            .await
            .map_err(db_error)
    }
}
