//! Invoice pricing engine
//!
//! Turns billed services, used parts and a tax rate reference into the
//! subtotal, tax and total of an invoice.
//!
//! # Pricing rules
//!
//! - A service line costs `rate.amount × hours`.
//! - A part line costs `(part.cost + part.cost × part.markup_percentage / 100) × quantity`,
//!   always using the *stored* part cost; the cost carried on the line is advisory.
//! - Tax is `subtotal × tax_rate.percentage / 100`.
//! - `total = service_subtotal + parts_subtotal + tax`.
//!
//! A rate, part or tax rate that cannot be resolved contributes zero. A
//! failing store aborts pricing, and so does an amount outside the range of
//! `Decimal` (reported as a validation error).
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_invoicing::pricing::{price, ServiceLine, PartLine};
//!
//! let breakdown = price(&services, &parts, tax_rate_id, &catalog).await?;
//! assert_eq!(breakdown.total, breakdown.subtotal + breakdown.tax);
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use core_kernel::{CoreError, PartId, RateId, ServiceId, TaxRateId};

use crate::error::InvoicingError;
use crate::ports::CatalogPort;

/// A billed service: hours worked at a referenced rate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceLine {
    pub service_id: ServiceId,
    pub hours: Decimal,
    pub rate_id: RateId,
}

impl ServiceLine {
    pub fn new(service_id: ServiceId, hours: Decimal, rate_id: RateId) -> Self {
        Self {
            service_id,
            hours,
            rate_id,
        }
    }
}

/// A used part: a quantity of a referenced catalog part
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartLine {
    pub part_id: PartId,
    pub quantity: u32,
    /// Cost quoted by the caller; never used for pricing
    pub cost: Decimal,
}

impl PartLine {
    pub fn new(part_id: PartId, quantity: u32, cost: Decimal) -> Self {
        Self {
            part_id,
            quantity,
            cost,
        }
    }
}

/// Amounts produced by pricing one invoice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceBreakdown {
    pub service_subtotal: Decimal,
    pub parts_subtotal: Decimal,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

impl PriceBreakdown {
    fn from_parts(
        service_subtotal: Decimal,
        parts_subtotal: Decimal,
        tax: Decimal,
    ) -> Result<Self, InvoicingError> {
        let subtotal = checked_sum(service_subtotal, parts_subtotal, "subtotal")?;
        let total = checked_sum(subtotal, tax, "total")?;
        Ok(Self {
            service_subtotal,
            parts_subtotal,
            subtotal,
            tax,
            total,
        })
    }
}

fn out_of_range(what: &str) -> InvoicingError {
    InvoicingError::validation(format!("{} exceeds the supported amount range", what))
}

fn checked_sum(a: Decimal, b: Decimal, what: &str) -> Result<Decimal, InvoicingError> {
    a.checked_add(b).ok_or_else(|| out_of_range(what))
}

/// Rejects lines that cannot be priced (negative hours or advisory costs)
pub fn validate_lines(services: &[ServiceLine], parts: &[PartLine]) -> Result<(), CoreError> {
    if let Some(line) = services.iter().find(|s| s.hours.is_sign_negative() && !s.hours.is_zero()) {
        return Err(CoreError::validation(format!(
            "hours for service {} must not be negative, got {}",
            line.service_id, line.hours
        )));
    }
    if let Some(line) = parts.iter().find(|p| p.cost.is_sign_negative() && !p.cost.is_zero()) {
        return Err(CoreError::validation(format!(
            "cost for part {} must not be negative, got {}",
            line.part_id, line.cost
        )));
    }
    Ok(())
}

/// Sums `rate.amount × hours` over every service whose rate resolves
pub async fn compute_service_subtotal<C>(
    services: &[ServiceLine],
    catalog: &C,
) -> Result<Decimal, InvoicingError>
where
    C: CatalogPort + ?Sized,
{
    let mut total = Decimal::ZERO;
    for line in services {
        match catalog.find_rate(line.rate_id).await? {
            Some(rate) => {
                let charge = rate
                    .charge_for(line.hours)
                    .ok_or_else(|| out_of_range("service charge"))?;
                total = checked_sum(total, charge, "service subtotal")?;
            }
            None => debug!(rate_id = %line.rate_id, service_id = %line.service_id, "Rate not found, service contributes nothing"),
        }
    }
    Ok(total)
}

/// Sums marked-up stored part cost × quantity over every part that resolves
pub async fn compute_parts_subtotal<C>(parts: &[PartLine], catalog: &C) -> Result<Decimal, InvoicingError>
where
    C: CatalogPort + ?Sized,
{
    let mut total = Decimal::ZERO;
    for line in parts {
        match catalog.find_part(line.part_id).await? {
            Some(part) => {
                let charge = part
                    .charge_for(line.quantity)
                    .ok_or_else(|| out_of_range("part charge"))?;
                total = checked_sum(total, charge, "parts subtotal")?;
            }
            None => debug!(part_id = %line.part_id, "Part not found, line contributes nothing"),
        }
    }
    Ok(total)
}

/// Tax owed on `subtotal`, zero when the tax rate does not resolve
pub async fn compute_tax<C>(
    subtotal: Decimal,
    tax_rate_id: TaxRateId,
    catalog: &C,
) -> Result<Decimal, InvoicingError>
where
    C: CatalogPort + ?Sized,
{
    match catalog.find_tax_rate(tax_rate_id).await? {
        Some(rate) => rate.tax_on(subtotal).ok_or_else(|| out_of_range("tax")),
        None => {
            debug!(tax_rate_id = %tax_rate_id, "Tax rate not found, no tax applied");
            Ok(Decimal::ZERO)
        }
    }
}

/// Prices a full invoice
pub async fn price<C>(
    services: &[ServiceLine],
    parts: &[PartLine],
    tax_rate_id: TaxRateId,
    catalog: &C,
) -> Result<PriceBreakdown, InvoicingError>
where
    C: CatalogPort + ?Sized,
{
    let service_subtotal = compute_service_subtotal(services, catalog).await?;
    let parts_subtotal = compute_parts_subtotal(parts, catalog).await?;
    let subtotal = checked_sum(service_subtotal, parts_subtotal, "subtotal")?;
    let tax = compute_tax(subtotal, tax_rate_id, catalog).await?;

    PriceBreakdown::from_parts(service_subtotal, parts_subtotal, tax)
}
