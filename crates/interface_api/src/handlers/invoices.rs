//! Invoice handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;

use core_kernel::{InvoiceId, TaxRateId, UserId};
use domain_invoicing::{CreateInvoice, UpdateInvoice};

use crate::auth::Claims;
use crate::dto::invoices::*;
use crate::extract::ValidatedJson;
use crate::{error::ApiError, AppState};

/// Prices and stores a new invoice for the authenticated user
pub async fn create_invoice(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ValidatedJson(request): ValidatedJson<CreateInvoiceRequest>,
) -> Result<(StatusCode, Json<CreateInvoiceResponse>), ApiError> {
    let user_id = claims.user_id()?;
    if let Some(requested) = request.user_id.map(UserId::from_uuid) {
        if requested != user_id {
            return Err(ApiError::Forbidden(
                "Invoices can only be created for the authenticated user".to_string(),
            ));
        }
    }

    let priced = state
        .invoices
        .create_invoice(CreateInvoice {
            user_id,
            services: request.services.into_iter().map(Into::into).collect(),
            parts: request.parts.into_iter().map(Into::into).collect(),
            tax_rate_id: TaxRateId::from_uuid(request.tax_rate_id),
            due_date: request.due_date,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(CreateInvoiceResponse::from(&priced))))
}

/// Replaces the lines of one of the caller's invoices and re-prices it
pub async fn update_invoice(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateInvoiceRequest>,
) -> Result<Json<UpdateInvoiceResponse>, ApiError> {
    let priced = state
        .invoices
        .update_invoice(
            InvoiceId::from_uuid(id),
            claims.user_id()?,
            UpdateInvoice {
                services: request.services.into_iter().map(Into::into).collect(),
                parts: request.parts.into_iter().map(Into::into).collect(),
                tax_rate_id: TaxRateId::from_uuid(request.tax_rate_id),
                expected_subtotal: request.subtotal,
                expected_total: request.total,
            },
        )
        .await?;

    Ok(Json(UpdateInvoiceResponse::from(&priced)))
}
