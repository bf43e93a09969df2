//! Payment initiation and verification
//!
//! A payment is recorded when the payer is handed off to the payment
//! gateway. Verification later reads it back by the gateway transaction id.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{Currency, InvoiceId, PaymentId, TransactionId, UserId};

/// A payment record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: PaymentId,
    /// Invoice being paid
    pub invoice_id: InvoiceId,
    /// Who is paying
    pub user_id: UserId,
    pub amount: Decimal,
    pub currency: Currency,
    /// Free-form method chosen by the payer ("card", "bank_transfer", ...)
    pub payment_method: String,
    /// Reference handed to the payment gateway
    pub transaction_id: TransactionId,
    pub payment_date: DateTime<Utc>,
}

impl Payment {
    /// Creates a new payment with a fresh gateway transaction id
    pub fn new(
        invoice_id: InvoiceId,
        user_id: UserId,
        amount: Decimal,
        currency: Currency,
        payment_method: impl Into<String>,
    ) -> Self {
        Self {
            id: PaymentId::new_v7(),
            invoice_id,
            user_id,
            amount,
            currency,
            payment_method: payment_method.into(),
            transaction_id: TransactionId::new(),
            payment_date: Utc::now(),
        }
    }

    /// Settlement state as seen by verification
    ///
    /// A recorded payment with a positive amount counts as completed;
    /// a zero amount is still pending.
    pub fn settlement_status(&self) -> SettlementStatus {
        if self.amount > Decimal::ZERO {
            SettlementStatus::Completed
        } else {
            SettlementStatus::Pending
        }
    }
}

/// Outcome of verifying a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SettlementStatus {
    Completed,
    Pending,
    /// No payment carries the transaction id
    Failed,
}

impl SettlementStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SettlementStatus::Completed => "Completed",
            SettlementStatus::Pending => "Pending",
            SettlementStatus::Failed => "Failed",
        }
    }
}

/// Result of looking up a transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentVerification {
    pub transaction_id: String,
    pub status: SettlementStatus,
    pub error_message: Option<String>,
}

impl PaymentVerification {
    /// Verification result for a payment found (or not) under `transaction_id`
    pub fn for_payment(transaction_id: impl Into<String>, payment: Option<&Payment>) -> Self {
        let transaction_id = transaction_id.into();
        let Some(payment) = payment else {
            return Self {
                transaction_id,
                status: SettlementStatus::Failed,
                error_message: Some("Transaction not found".to_string()),
            };
        };

        let status = payment.settlement_status();
        let error_message = match status {
            SettlementStatus::Completed => None,
            _ => Some("Payment is pending or incomplete".to_string()),
        };
        Self {
            transaction_id,
            status,
            error_message,
        }
    }
}

/// Where the payer completes a transaction on the gateway
pub fn payment_url(gateway_base_url: &str, transaction_id: TransactionId) -> String {
    format!(
        "{}/complete_payment/{}",
        gateway_base_url.trim_end_matches('/'),
        transaction_id.as_uuid()
    )
}
