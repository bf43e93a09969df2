//! In-memory implementation of the invoicing ports
//!
//! All state sits behind a single lock so multi-record writes are atomic in
//! the same way a database transaction would make them.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use core_kernel::{InvoiceId, PartId, RateId, TaxRateId, TransactionId, UserId};

use crate::catalog::{Part, Rate, TaxRate};
use crate::error::InvoicingError;
use crate::invoice::{closed_invoice, BillableItem, Invoice, InvoiceStatus};
use crate::payment::Payment;
use crate::ports::{CatalogPort, InvoicePort, PaymentPort, UserPort};
use crate::user::{normalize_email, ProfileChanges, User, UserProfile};

#[derive(Debug, Default)]
struct State {
    rates: HashMap<RateId, Rate>,
    parts: HashMap<PartId, Part>,
    tax_rates: HashMap<TaxRateId, TaxRate>,
    invoices: HashMap<InvoiceId, Invoice>,
    items: HashMap<InvoiceId, Vec<BillableItem>>,
    payments: Vec<Payment>,
    users: HashMap<UserId, User>,
    profiles: HashMap<UserId, UserProfile>,
}

/// In-memory store implementing every invoicing port
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<State>>,
    fail_writes: bool,
}

impl InMemoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose writes all fail, for exercising error propagation
    pub fn with_failing_writes() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    pub async fn add_rate(&self, rate: Rate) {
        self.state.write().await.rates.insert(rate.id, rate);
    }

    pub async fn add_part(&self, part: Part) {
        self.state.write().await.parts.insert(part.id, part);
    }

    pub async fn add_tax_rate(&self, tax_rate: TaxRate) {
        self.state.write().await.tax_rates.insert(tax_rate.id, tax_rate);
    }

    /// Overrides an invoice's status, as a settlement or cancellation would
    pub async fn set_invoice_status(&self, id: InvoiceId, status: InvoiceStatus) -> bool {
        match self.state.write().await.invoices.get_mut(&id) {
            Some(invoice) => {
                invoice.status = status;
                true
            }
            None => false,
        }
    }

    /// Number of stored invoices
    pub async fn invoice_count(&self) -> usize {
        self.state.read().await.invoices.len()
    }

    /// Number of stored billable items across all invoices
    pub async fn item_count(&self) -> usize {
        self.state.read().await.items.values().map(Vec::len).sum()
    }

    fn check_writable(&self) -> Result<(), InvoicingError> {
        if self.fail_writes {
            return Err(InvoicingError::persistence("store is read-only"));
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogPort for InMemoryStore {
    async fn find_rate(&self, id: RateId) -> Result<Option<Rate>, InvoicingError> {
        Ok(self.state.read().await.rates.get(&id).cloned())
    }

    async fn find_part(&self, id: PartId) -> Result<Option<Part>, InvoicingError> {
        Ok(self.state.read().await.parts.get(&id).cloned())
    }

    async fn find_tax_rate(&self, id: TaxRateId) -> Result<Option<TaxRate>, InvoicingError> {
        Ok(self.state.read().await.tax_rates.get(&id).cloned())
    }
}

#[async_trait]
impl InvoicePort for InMemoryStore {
    async fn create_invoice(
        &self,
        invoice: &Invoice,
        items: &[BillableItem],
    ) -> Result<(), InvoicingError> {
        self.check_writable()?;
        let mut state = self.state.write().await;
        if state.invoices.contains_key(&invoice.id) {
            return Err(InvoicingError::Conflict(format!("invoice {} already exists", invoice.id)));
        }
        state.invoices.insert(invoice.id, invoice.clone());
        state.items.insert(invoice.id, items.to_vec());
        Ok(())
    }

    async fn get_invoice(&self, id: InvoiceId) -> Result<Option<Invoice>, InvoicingError> {
        Ok(self.state.read().await.invoices.get(&id).cloned())
    }

    async fn replace_invoice(
        &self,
        invoice: &Invoice,
        items: &[BillableItem],
    ) -> Result<(), InvoicingError> {
        self.check_writable()?;
        let mut state = self.state.write().await;
        let stored = state
            .invoices
            .get_mut(&invoice.id)
            .ok_or_else(|| InvoicingError::not_found("Invoice", invoice.id))?;
        if !stored.is_editable() {
            return Err(closed_invoice(stored.id, stored.status));
        }
        stored.tax_rate_id = invoice.tax_rate_id;
        stored.total_amount = invoice.total_amount;
        stored.updated_at = invoice.updated_at;
        state.items.insert(invoice.id, items.to_vec());
        Ok(())
    }

    async fn billable_items(&self, id: InvoiceId) -> Result<Vec<BillableItem>, InvoicingError> {
        Ok(self.state.read().await.items.get(&id).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl PaymentPort for InMemoryStore {
    async fn record_payment(&self, payment: &Payment) -> Result<(), InvoicingError> {
        self.check_writable()?;
        let mut state = self.state.write().await;
        let invoice = state
            .invoices
            .get_mut(&payment.invoice_id)
            .filter(|invoice| invoice.user_id == payment.user_id)
            .ok_or_else(|| InvoicingError::not_found("Invoice", payment.invoice_id))?;
        invoice.mark_sent()?;
        state.payments.push(payment.clone());
        Ok(())
    }

    async fn find_by_transaction_id(
        &self,
        transaction_id: TransactionId,
    ) -> Result<Option<Payment>, InvoicingError> {
        Ok(self
            .state
            .read()
            .await
            .payments
            .iter()
            .find(|p| p.transaction_id == transaction_id)
            .cloned())
    }
}

#[async_trait]
impl UserPort for InMemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, InvoicingError> {
        let email = normalize_email(email);
        Ok(self
            .state
            .read()
            .await
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn create_user(&self, user: &User, profile: &UserProfile) -> Result<(), InvoicingError> {
        self.check_writable()?;
        let mut state = self.state.write().await;
        if state.users.values().any(|u| u.email == user.email) {
            return Err(InvoicingError::Conflict("Email is already in use.".to_string()));
        }
        state.users.insert(user.id, user.clone());
        state.profiles.insert(user.id, profile.clone());
        Ok(())
    }

    async fn update_profile(
        &self,
        user_id: UserId,
        changes: ProfileChanges,
    ) -> Result<Option<UserProfile>, InvoicingError> {
        self.check_writable()?;
        let mut state = self.state.write().await;
        Ok(state.profiles.get_mut(&user_id).map(|profile| {
            changes.apply_to(profile);
            profile.clone()
        }))
    }
}
