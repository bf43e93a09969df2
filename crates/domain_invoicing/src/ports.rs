//! Invoicing Domain Ports
//!
//! Port traits describe what the invoicing services need from the data
//! store. The PostgreSQL adapter in `infra_db` implements all of them; the
//! in-memory adapter in [`crate::adapters::memory`] backs tests and local runs.
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_invoicing::{InvoiceService, CatalogPort, InvoicePort};
//! use std::sync::Arc;
//!
//! let store = Arc::new(PostgresInvoicingAdapter::new(pool));
//! let service = InvoiceService::new(store.clone(), store);
//! ```
//!
//! Lookups return `Ok(None)` when a record does not exist. `Err` is reserved
//! for a store that could not answer.

use async_trait::async_trait;

use core_kernel::{InvoiceId, PartId, RateId, TaxRateId, TransactionId, UserId};

use crate::catalog::{Part, Rate, TaxRate};
use crate::error::InvoicingError;
use crate::invoice::{BillableItem, Invoice};
use crate::payment::Payment;
use crate::user::{ProfileChanges, User, UserProfile};

/// Point lookups into the rate, part and tax rate catalog
#[async_trait]
pub trait CatalogPort: Send + Sync {
    async fn find_rate(&self, id: RateId) -> Result<Option<Rate>, InvoicingError>;

    async fn find_part(&self, id: PartId) -> Result<Option<Part>, InvoicingError>;

    async fn find_tax_rate(&self, id: TaxRateId) -> Result<Option<TaxRate>, InvoicingError>;
}

/// Invoice persistence
#[async_trait]
pub trait InvoicePort: Send + Sync {
    /// Writes the invoice and all of its items as one atomic unit
    async fn create_invoice(
        &self,
        invoice: &Invoice,
        items: &[BillableItem],
    ) -> Result<(), InvoicingError>;

    async fn get_invoice(&self, id: InvoiceId) -> Result<Option<Invoice>, InvoicingError>;

    /// Overwrites the invoice's price and tax rate and swaps its items, atomically
    ///
    /// # Errors
    ///
    /// `NotFound` if the invoice is gone, `Conflict` if it was closed
    /// (paid or cancelled) in the meantime.
    async fn replace_invoice(
        &self,
        invoice: &Invoice,
        items: &[BillableItem],
    ) -> Result<(), InvoicingError>;

    async fn billable_items(&self, id: InvoiceId) -> Result<Vec<BillableItem>, InvoicingError>;
}

/// Payment persistence
#[async_trait]
pub trait PaymentPort: Send + Sync {
    /// Stores the payment and moves its invoice to `SENT` in one transaction
    ///
    /// # Errors
    ///
    /// `NotFound` if the invoice does not exist or belongs to another user
    /// than `payment.user_id`, `Conflict` if it is paid or cancelled.
    async fn record_payment(&self, payment: &Payment) -> Result<(), InvoicingError>;

    async fn find_by_transaction_id(
        &self,
        transaction_id: TransactionId,
    ) -> Result<Option<Payment>, InvoicingError>;
}

/// Account and profile persistence
#[async_trait]
pub trait UserPort: Send + Sync {
    /// Looks up a user by normalized email
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, InvoicingError>;

    /// Creates the user together with its profile
    ///
    /// # Errors
    ///
    /// `Conflict` if the email is already registered.
    async fn create_user(&self, user: &User, profile: &UserProfile) -> Result<(), InvoicingError>;

    /// Applies the present fields and returns the stored profile, `None` if
    /// the user has no profile
    async fn update_profile(
        &self,
        user_id: UserId,
        changes: ProfileChanges,
    ) -> Result<Option<UserProfile>, InvoicingError>;
}
