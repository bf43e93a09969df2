//! Core Kernel - Foundational types shared by the invoicing crates
//!
//! This crate provides the building blocks used across the workspace:
//! - Strongly-typed identifiers for every persisted entity
//! - ISO 4217 currency codes and amount checks
//! - The common kernel error type

pub mod money;
pub mod identifiers;
pub mod error;

pub use money::{Currency, MoneyError, ensure_non_negative};
pub use identifiers::{
    UserId, InvoiceId, BillableItemId, ServiceId, RateId, PartId,
    TaxRateId, PaymentId, TransactionId,
};
pub use error::CoreError;
