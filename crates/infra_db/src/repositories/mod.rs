//! Repository implementations
//!
//! Each repository owns the SQL for one group of tables and maps rows to
//! domain types. Multi-row writes run inside a single transaction.

pub mod catalog;
pub mod invoice;
pub mod payment;
pub mod user;

pub use catalog::CatalogRepository;
pub use invoice::{GuardedWrite, InvoiceRepository};
pub use payment::PaymentRepository;
pub use user::UserRepository;
