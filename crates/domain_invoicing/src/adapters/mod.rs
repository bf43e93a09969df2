//! Adapters for the invoicing ports that live alongside the domain
//!
//! - **InMemoryStore**: implements every port over in-process maps, for
//!   tests and for running the services without a database
//!
//! The PostgreSQL adapter lives in `infra_db`.

pub mod memory;

pub use memory::InMemoryStore;
