//! Payment DTOs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use domain_invoicing::{PaymentInitiation, PaymentVerification};

#[derive(Debug, Deserialize, Validate)]
pub struct InitiatePaymentRequest {
    pub invoice_id: Uuid,
    /// Must match the authenticated user
    pub user_id: Uuid,
    #[validate(length(min = 1, message = "payment_method cannot be empty"))]
    pub payment_method: String,
    pub amount: Decimal,
    #[validate(length(equal = 3, message = "currency must be a 3-letter ISO 4217 code"))]
    pub currency: String,
}

#[derive(Debug, Serialize)]
pub struct InitiatePaymentResponse {
    pub transaction_id: Uuid,
    pub status: String,
    pub message: String,
    pub payment_url: String,
}

impl From<PaymentInitiation> for InitiatePaymentResponse {
    fn from(initiation: PaymentInitiation) -> Self {
        Self {
            transaction_id: *initiation.payment.transaction_id.as_uuid(),
            status: "Initiated".to_string(),
            message: "Payment has been initiated. Please complete the payment process.".to_string(),
            payment_url: initiation.payment_url,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentResponse {
    pub transaction_id: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl From<PaymentVerification> for VerifyPaymentResponse {
    fn from(verification: PaymentVerification) -> Self {
        Self {
            transaction_id: verification.transaction_id,
            status: verification.status.as_str().to_string(),
            error_message: verification.error_message,
        }
    }
}
