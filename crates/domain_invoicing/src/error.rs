//! Invoicing domain errors

use thiserror::Error;

use core_kernel::{CoreError, MoneyError};

/// Errors that can occur in the invoicing domain
///
/// A catalog lookup that finds nothing is not an error: unresolved rates,
/// parts and tax rates contribute zero to an invoice.
#[derive(Debug, Error)]
pub enum InvoicingError {
    /// The due date did not match `YYYY-MM-DD`
    #[error("Invalid due date '{value}': expected YYYY-MM-DD")]
    DateParse {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    /// The underlying store failed to read or write
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// A record addressed directly by the caller does not exist
    #[error("{entity} not found: {id}")]
    NotFound {
        entity: &'static str,
        id: String,
    },

    /// The operation collides with existing data or the record's status
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Input rejected before touching the store
    #[error(transparent)]
    Validation(#[from] CoreError),

    /// Credentials did not match
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

impl InvoicingError {
    /// Creates a not found error for an entity type and identifier
    pub fn not_found(entity: &'static str, id: impl std::fmt::Display) -> Self {
        InvoicingError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Creates a persistence error from any store failure
    pub fn persistence(err: impl std::fmt::Display) -> Self {
        InvoicingError::Persistence(err.to_string())
    }

    /// Creates a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        InvoicingError::Validation(CoreError::validation(message))
    }

    /// Checks if this error indicates a record was not found
    pub fn is_not_found(&self) -> bool {
        matches!(self, InvoicingError::NotFound { .. })
    }
}

impl From<MoneyError> for InvoicingError {
    fn from(err: MoneyError) -> Self {
        InvoicingError::Validation(CoreError::Money(err))
    }
}
