//! Request and response bodies
//!
//! Field casing follows each endpoint's existing clients: invoice creation,
//! profile update and verification speak camelCase; registration, invoice
//! update and payment initiation speak snake_case.

pub mod invoices;
pub mod payments;
pub mod users;
