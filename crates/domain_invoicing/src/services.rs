//! Invoicing application services
//!
//! These services orchestrate the pricing engine and the ports. Each call
//! is one pass: validate, look up, compute, write. Nothing is retried and
//! nothing is compensated beyond the atomic writes the ports guarantee.

use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{info, warn};

use core_kernel::{ensure_non_negative, CoreError, Currency, InvoiceId, TaxRateId, TransactionId, UserId};

use crate::error::InvoicingError;
use crate::invoice::{parse_due_date, BillableItem, Invoice};
use crate::payment::{payment_url, Payment, PaymentVerification};
use crate::ports::{CatalogPort, InvoicePort, PaymentPort, UserPort};
use crate::pricing::{price, validate_lines, PartLine, PriceBreakdown, ServiceLine};
use crate::user::{ProfileChanges, User, UserProfile};

/// Input for creating an invoice
#[derive(Debug, Clone)]
pub struct CreateInvoice {
    pub user_id: UserId,
    pub services: Vec<ServiceLine>,
    pub parts: Vec<PartLine>,
    pub tax_rate_id: TaxRateId,
    /// Due date as sent by the caller, `YYYY-MM-DD`
    pub due_date: String,
}

/// Input for re-pricing an existing invoice
#[derive(Debug, Clone)]
pub struct UpdateInvoice {
    pub services: Vec<ServiceLine>,
    pub parts: Vec<PartLine>,
    pub tax_rate_id: TaxRateId,
    /// Subtotal the caller expects; compared, never stored
    pub expected_subtotal: Option<Decimal>,
    /// Total the caller expects; compared, never stored
    pub expected_total: Option<Decimal>,
}

/// An invoice as written, with the items and breakdown that priced it
#[derive(Debug, Clone)]
pub struct PricedInvoice {
    pub invoice: Invoice,
    pub items: Vec<BillableItem>,
    pub breakdown: PriceBreakdown,
}

/// Service for creating and re-pricing invoices
#[derive(Clone)]
pub struct InvoiceService {
    catalog: Arc<dyn CatalogPort>,
    invoices: Arc<dyn InvoicePort>,
}

impl InvoiceService {
    pub fn new(catalog: Arc<dyn CatalogPort>, invoices: Arc<dyn InvoicePort>) -> Self {
        Self { catalog, invoices }
    }

    /// Prices and stores a new draft invoice
    ///
    /// This method:
    /// 1. Parses the due date (nothing is looked up or written if it is malformed)
    /// 2. Prices services, parts and tax through the catalog
    /// 3. Writes the invoice and one billable item per line in one unit
    ///
    /// # Errors
    ///
    /// `DateParse` for a malformed due date, `Validation` for negative
    /// hours or costs, `Persistence` if the store fails.
    pub async fn create_invoice(&self, request: CreateInvoice) -> Result<PricedInvoice, InvoicingError> {
        let due_date = parse_due_date(&request.due_date)?;
        validate_lines(&request.services, &request.parts)?;

        let breakdown = price(
            &request.services,
            &request.parts,
            request.tax_rate_id,
            self.catalog.as_ref(),
        )
        .await?;

        let invoice = Invoice::draft(request.user_id, due_date, request.tax_rate_id, breakdown.total);
        let items = BillableItem::for_lines(invoice.id, &request.services, &request.parts);

        self.invoices.create_invoice(&invoice, &items).await?;

        info!(
            invoice_id = %invoice.id,
            user_id = %invoice.user_id,
            items = items.len(),
            total = %breakdown.total,
            "Invoice created"
        );

        Ok(PricedInvoice {
            invoice,
            items,
            breakdown,
        })
    }

    /// Replaces the lines and tax rate of one of `caller`'s invoices and
    /// re-prices it
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown invoice or one issued by another user,
    /// `Conflict` if it is paid or cancelled, `Persistence` if the store fails.
    pub async fn update_invoice(
        &self,
        id: InvoiceId,
        caller: UserId,
        request: UpdateInvoice,
    ) -> Result<PricedInvoice, InvoicingError> {
        validate_lines(&request.services, &request.parts)?;

        let mut invoice = self
            .invoices
            .get_invoice(id)
            .await?
            .filter(|invoice| invoice.user_id == caller)
            .ok_or_else(|| InvoicingError::not_found("Invoice", id))?;

        let breakdown = price(
            &request.services,
            &request.parts,
            request.tax_rate_id,
            self.catalog.as_ref(),
        )
        .await?;

        if let Some(expected) = request.expected_subtotal.filter(|e| *e != breakdown.subtotal) {
            warn!(invoice_id = %id, %expected, computed = %breakdown.subtotal, "Caller subtotal differs from computed subtotal");
        }
        if let Some(expected) = request.expected_total.filter(|e| *e != breakdown.total) {
            warn!(invoice_id = %id, %expected, computed = %breakdown.total, "Caller total differs from computed total");
        }

        invoice.reprice(request.tax_rate_id, breakdown.total)?;
        let items = BillableItem::for_lines(invoice.id, &request.services, &request.parts);

        self.invoices.replace_invoice(&invoice, &items).await?;

        info!(invoice_id = %invoice.id, items = items.len(), total = %breakdown.total, "Invoice updated");

        Ok(PricedInvoice {
            invoice,
            items,
            breakdown,
        })
    }
}

/// Input for starting a payment
#[derive(Debug, Clone)]
pub struct InitiatePayment {
    pub invoice_id: InvoiceId,
    pub user_id: UserId,
    pub payment_method: String,
    pub amount: Decimal,
    pub currency: String,
}

/// A recorded payment and where the payer completes it
#[derive(Debug, Clone)]
pub struct PaymentInitiation {
    pub payment: Payment,
    pub payment_url: String,
}

/// Service for initiating and verifying payments
#[derive(Clone)]
pub struct PaymentService {
    payments: Arc<dyn PaymentPort>,
    gateway_url: String,
}

impl PaymentService {
    /// Creates a payment service handing payers off to `gateway_url`
    pub fn new(payments: Arc<dyn PaymentPort>, gateway_url: impl Into<String>) -> Self {
        Self {
            payments,
            gateway_url: gateway_url.into(),
        }
    }

    /// Records a payment for one of `request.user_id`'s invoices and marks
    /// the invoice as sent
    ///
    /// # Errors
    ///
    /// `Validation` for a negative amount, unknown currency or empty payment
    /// method; `NotFound` if the invoice does not exist or belongs to another
    /// user; `Conflict` if it is paid or cancelled.
    pub async fn initiate(&self, request: InitiatePayment) -> Result<PaymentInitiation, InvoicingError> {
        let amount = ensure_non_negative("amount", request.amount)?;
        let currency: Currency = request.currency.parse()?;
        let method = request.payment_method.trim();
        if method.is_empty() {
            return Err(CoreError::validation("payment_method must not be empty").into());
        }

        let payment = Payment::new(request.invoice_id, request.user_id, amount, currency, method);
        self.payments.record_payment(&payment).await?;

        info!(
            invoice_id = %payment.invoice_id,
            transaction_id = %payment.transaction_id,
            amount = %payment.amount,
            currency = %payment.currency,
            "Payment initiated"
        );

        let payment_url = payment_url(&self.gateway_url, payment.transaction_id);
        Ok(PaymentInitiation { payment, payment_url })
    }

    /// Reports the settlement state of a transaction
    ///
    /// Unknown or malformed transaction ids verify as failed rather than
    /// erroring.
    pub async fn verify(&self, transaction_id: &str) -> Result<PaymentVerification, InvoicingError> {
        let payment = match transaction_id.parse::<TransactionId>() {
            Ok(id) => self.payments.find_by_transaction_id(id).await?,
            Err(_) => None,
        };
        Ok(PaymentVerification::for_payment(transaction_id, payment.as_ref()))
    }
}

/// Input for registering an account
#[derive(Debug, Clone, Default)]
pub struct Registration {
    pub email: String,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub company_name: Option<String>,
    pub address: Option<String>,
    pub tax_id: Option<String>,
}

/// Service for accounts and profiles
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserPort>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserPort>) -> Self {
        Self { users }
    }

    /// Creates an account and its profile
    ///
    /// # Errors
    ///
    /// `Conflict` if the email is already registered.
    pub async fn register(&self, registration: Registration) -> Result<User, InvoicingError> {
        if self.users.find_by_email(&registration.email).await?.is_some() {
            return Err(InvoicingError::Conflict("Email is already in use.".to_string()));
        }

        let user = User::new(registration.email, registration.password_hash);
        let profile = UserProfile {
            user_id: user.id,
            first_name: registration.first_name,
            last_name: registration.last_name,
            company_name: registration.company_name,
            address: registration.address,
            tax_id: registration.tax_id,
        };
        self.users.create_user(&user, &profile).await?;

        info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Finds the user for `email` and checks the password with `password_matches`
    ///
    /// Unknown emails and wrong passwords fail the same way.
    pub async fn authenticate<F>(&self, email: &str, password_matches: F) -> Result<User, InvoicingError>
    where
        F: FnOnce(&User) -> bool,
    {
        match self.users.find_by_email(email).await? {
            Some(user) if password_matches(&user) => Ok(user),
            _ => Err(InvoicingError::Unauthorized(
                "Invalid authentication credentials.".to_string(),
            )),
        }
    }

    /// Updates the profile of the authenticated user
    ///
    /// # Errors
    ///
    /// `NotFound` if the user has no profile.
    pub async fn update_profile(
        &self,
        user_id: UserId,
        changes: ProfileChanges,
    ) -> Result<UserProfile, InvoicingError> {
        let profile = self
            .users
            .update_profile(user_id, changes)
            .await?
            .ok_or_else(|| InvoicingError::not_found("UserProfile", user_id))?;

        info!(user_id = %user_id, "Profile updated");
        Ok(profile)
    }
}
