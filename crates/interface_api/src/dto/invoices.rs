//! Invoice DTOs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use core_kernel::{PartId, RateId, ServiceId};
use domain_invoicing::{PartLine, PricedInvoice, ServiceLine};

/// A billed service line, accepted in either casing
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceLineDto {
    #[serde(alias = "service_id")]
    pub service_id: Uuid,
    pub hours: Decimal,
    #[serde(alias = "rate_id")]
    pub rate_id: Uuid,
}

impl From<ServiceLineDto> for ServiceLine {
    fn from(dto: ServiceLineDto) -> Self {
        ServiceLine::new(
            ServiceId::from_uuid(dto.service_id),
            dto.hours,
            RateId::from_uuid(dto.rate_id),
        )
    }
}

/// A used part line, accepted in either casing
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartLineDto {
    #[serde(alias = "part_id")]
    pub part_id: Uuid,
    pub quantity: u32,
    #[serde(default)]
    pub cost: Decimal,
}

impl From<PartLineDto> for PartLine {
    fn from(dto: PartLineDto) -> Self {
        PartLine::new(PartId::from_uuid(dto.part_id), dto.quantity, dto.cost)
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvoiceRequest {
    /// Must match the authenticated user when present
    pub user_id: Option<Uuid>,
    #[serde(default)]
    pub services: Vec<ServiceLineDto>,
    #[serde(default)]
    pub parts: Vec<PartLineDto>,
    pub tax_rate_id: Uuid,
    #[validate(length(min = 1, message = "dueDate is required"))]
    pub due_date: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvoiceResponse {
    pub invoice_id: Uuid,
    pub status: String,
    pub total_amount: Decimal,
}

impl From<&PricedInvoice> for CreateInvoiceResponse {
    fn from(priced: &PricedInvoice) -> Self {
        Self {
            invoice_id: *priced.invoice.id.as_uuid(),
            status: priced.invoice.status.to_string(),
            total_amount: priced.invoice.total_amount,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateInvoiceRequest {
    #[serde(default)]
    pub services: Vec<ServiceLineDto>,
    #[serde(default)]
    pub parts: Vec<PartLineDto>,
    pub tax_rate_id: Uuid,
    /// Advisory; the invoice is always re-priced
    pub subtotal: Option<Decimal>,
    /// Advisory; the invoice is always re-priced
    pub total: Option<Decimal>,
}

#[derive(Debug, Serialize)]
pub struct UpdatedInvoice {
    pub id: Uuid,
    pub status: String,
    pub total_amount: Decimal,
}

#[derive(Debug, Serialize)]
pub struct UpdateInvoiceResponse {
    pub success: bool,
    pub message: String,
    pub updated_invoice: UpdatedInvoice,
}

impl From<&PricedInvoice> for UpdateInvoiceResponse {
    fn from(priced: &PricedInvoice) -> Self {
        Self {
            success: true,
            message: "Invoice updated successfully".to_string(),
            updated_invoice: UpdatedInvoice {
                id: *priced.invoice.id.as_uuid(),
                status: priced.invoice.status.to_string(),
                total_amount: priced.invoice.total_amount,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_create_request_uses_camel_case() {
        let body = serde_json::json!({
            "services": [{"serviceId": Uuid::nil(), "hours": 10, "rateId": Uuid::nil()}],
            "parts": [{"partId": Uuid::nil(), "quantity": 2, "cost": "25.00"}],
            "taxRateId": Uuid::nil(),
            "dueDate": "2024-12-31"
        });

        let request: CreateInvoiceRequest = serde_json::from_value(body).unwrap();
        assert!(request.user_id.is_none());
        assert_eq!(request.services[0].hours, dec!(10));
        assert_eq!(request.parts[0].cost, dec!(25));
    }

    #[test]
    fn test_update_request_accepts_snake_case_lines() {
        let body = serde_json::json!({
            "services": [{"service_id": Uuid::nil(), "hours": 1.5, "rate_id": Uuid::nil()}],
            "parts": [{"part_id": Uuid::nil(), "quantity": 1}],
            "tax_rate_id": Uuid::nil(),
            "total": 12.5
        });

        let request: UpdateInvoiceRequest = serde_json::from_value(body).unwrap();
        assert_eq!(request.services[0].hours, dec!(1.5));
        assert_eq!(request.parts[0].cost, Decimal::ZERO);
        assert_eq!(request.total, Some(dec!(12.5)));
        assert!(request.subtotal.is_none());
    }
}
