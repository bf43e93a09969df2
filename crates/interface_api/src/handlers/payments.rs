//! Payment handlers

use axum::{
    extract::{Path, State},
    Extension, Json,
};

use core_kernel::{InvoiceId, UserId};
use domain_invoicing::InitiatePayment;

use crate::auth::Claims;
use crate::dto::payments::*;
use crate::extract::ValidatedJson;
use crate::{error::ApiError, AppState};

/// Records a payment and returns where the payer completes it
pub async fn initiate_payment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ValidatedJson(request): ValidatedJson<InitiatePaymentRequest>,
) -> Result<Json<InitiatePaymentResponse>, ApiError> {
    let user_id = claims.user_id()?;
    if UserId::from_uuid(request.user_id) != user_id {
        return Err(ApiError::Forbidden(
            "Payments can only be initiated by the authenticated user".to_string(),
        ));
    }

    let initiation = state
        .payments
        .initiate(InitiatePayment {
            invoice_id: InvoiceId::from_uuid(request.invoice_id),
            user_id,
            payment_method: request.payment_method,
            amount: request.amount,
            currency: request.currency,
        })
        .await?;

    Ok(Json(initiation.into()))
}

/// Reports the settlement state of a transaction
pub async fn verify_payment(
    State(state): State<AppState>,
    Path(transaction_id): Path<String>,
) -> Result<Json<VerifyPaymentResponse>, ApiError> {
    let verification = state.payments.verify(&transaction_id).await?;
    Ok(Json(verification.into()))
}
