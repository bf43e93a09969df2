//! Infrastructure Database Layer
//!
//! PostgreSQL persistence for the invoicing backend using SQLx.
//!
//! # Architecture
//!
//! Repositories hold the SQL and row mapping for each group of tables. The
//! [`adapters::PostgresInvoicingAdapter`] composes them and implements the
//! domain ports, translating database errors into domain errors.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, run_migrations, DatabaseConfig, PostgresInvoicingAdapter};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/invoicing")).await?;
//! run_migrations(&pool).await?;
//! let adapter = PostgresInvoicingAdapter::new(pool);
//! ```

pub mod pool;
pub mod error;
pub mod repositories;
pub mod adapters;

pub use pool::{create_lazy_pool, create_pool, ping, run_migrations, DatabaseConfig, DatabasePool};
pub use error::DatabaseError;
pub use adapters::PostgresInvoicingAdapter;
