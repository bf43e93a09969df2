//! Invoicing Domain
//!
//! This crate prices and records invoices for billable work, and manages the
//! payments and user profiles that hang off them.
//!
//! # Pricing Model
//!
//! An invoice total is built from catalog lookups:
//!
//! - **Services**: `hours × rate.amount` per line
//! - **Parts**: `quantity × (cost + cost × markup% / 100)` per line
//! - **Tax**: `subtotal × tax_rate% / 100`
//!
//! A line whose rate or part cannot be found contributes zero, and so does a
//! missing tax rate.
//!
//! # Examples
//!
//! ```rust
//! use domain_invoicing::{InMemoryStore, ServiceLine, Rate, TaxRate, price};
//! use core_kernel::{RateId, ServiceId, TaxRateId};
//! use rust_decimal_macros::dec;
//!
//! # tokio_test_block(async {
//! let store = InMemoryStore::new();
//! let rate_id = RateId::new();
//! let tax_id = TaxRateId::new();
//! store.add_rate(Rate::new(rate_id, dec!(50))).await;
//! store.add_tax_rate(TaxRate::new(tax_id, dec!(8))).await;
//!
//! let services = vec![ServiceLine::new(ServiceId::new(), dec!(10), rate_id)];
//! let breakdown = price(&services, &[], tax_id, &store).await.unwrap();
//! assert_eq!(breakdown.total, dec!(540));
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

pub mod catalog;
pub mod pricing;
pub mod invoice;
pub mod payment;
pub mod user;
pub mod error;
pub mod ports;
pub mod adapters;
pub mod services;

pub use catalog::{Part, Rate, TaxRate};
pub use pricing::{
    compute_parts_subtotal, compute_service_subtotal, compute_tax, price, validate_lines,
    PartLine, PriceBreakdown, ServiceLine,
};
pub use invoice::{closed_invoice, parse_due_date, BillableItem, Invoice, InvoiceStatus, DUE_DATE_FORMAT};
pub use payment::{payment_url, Payment, PaymentVerification, SettlementStatus};
pub use user::{normalize_email, ProfileChanges, User, UserProfile};
pub use error::InvoicingError;
pub use ports::{CatalogPort, InvoicePort, PaymentPort, UserPort};
pub use adapters::InMemoryStore;
pub use services::{
    CreateInvoice, InitiatePayment, InvoiceService, PaymentInitiation, PaymentService,
    PricedInvoice, Registration, UpdateInvoice, UserService,
};
