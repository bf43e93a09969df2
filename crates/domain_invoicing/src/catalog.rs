//! Catalog entities referenced by invoice lines
//!
//! Rates, parts and tax rates are owned by the data store. The pricing
//! engine only reads them through [`crate::ports::CatalogPort`].

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use core_kernel::{PartId, RateId, TaxRateId};

/// Hourly billing price for a category of service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rate {
    pub id: RateId,
    /// Price per billable hour
    pub amount: Decimal,
}

impl Rate {
    pub fn new(id: RateId, amount: Decimal) -> Self {
        Self { id, amount }
    }

    /// Price of `hours` billed at this rate, `None` on overflow
    pub fn charge_for(&self, hours: Decimal) -> Option<Decimal> {
        self.amount.checked_mul(hours)
    }
}

/// A physical component with a base cost and a markup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    pub id: PartId,
    pub cost: Decimal,
    /// Markup applied on top of `cost`, in percent (20 means +20%)
    pub markup_percentage: Decimal,
}

impl Part {
    pub fn new(id: PartId, cost: Decimal, markup_percentage: Decimal) -> Self {
        Self {
            id,
            cost,
            markup_percentage,
        }
    }

    /// Stored cost plus markup, the price of a single unit
    pub fn unit_price(&self) -> Option<Decimal> {
        let markup = self.cost.checked_mul(self.markup_percentage)?.checked_div(dec!(100))?;
        self.cost.checked_add(markup)
    }

    /// Price of `quantity` units
    pub fn charge_for(&self, quantity: u32) -> Option<Decimal> {
        self.unit_price()?.checked_mul(Decimal::from(quantity))
    }
}

/// Jurisdiction-specific tax percentage applied to a subtotal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxRate {
    pub id: TaxRateId,
    pub percentage: Decimal,
}

impl TaxRate {
    pub fn new(id: TaxRateId, percentage: Decimal) -> Self {
        Self { id, percentage }
    }

    /// Tax owed on `subtotal`
    pub fn tax_on(&self, subtotal: Decimal) -> Option<Decimal> {
        subtotal.checked_mul(self.percentage)?.checked_div(dec!(100))
    }
}
