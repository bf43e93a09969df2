//! Port adapters
//!
//! Implementations of the invoicing domain ports backed by PostgreSQL.
//!
//! ```rust,ignore
//! use infra_db::adapters::PostgresInvoicingAdapter;
//! use domain_invoicing::InvoicePort;
//!
//! let adapter = PostgresInvoicingAdapter::new(pool);
//! let invoice = adapter.get_invoice(invoice_id).await?;
//! ```

pub mod postgres;

pub use postgres::PostgresInvoicingAdapter;
