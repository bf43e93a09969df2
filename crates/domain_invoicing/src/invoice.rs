//! Invoices and their billable items
//!
//! An invoice is written together with its billable items as one unit and
//! starts out as a draft. Its total is fixed when it is priced and is never
//! re-derived from the items afterwards.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{BillableItemId, InvoiceId, PartId, RateId, ServiceId, TaxRateId, UserId};

use crate::error::InvoicingError;
use crate::pricing::{PartLine, ServiceLine};

/// Due dates are accepted as ISO calendar dates only
pub const DUE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses a due date in `YYYY-MM-DD` form
///
/// # Errors
///
/// Returns `InvoicingError::DateParse` for any other shape, including
/// impossible dates such as `2024-02-30`.
pub fn parse_due_date(value: &str) -> Result<NaiveDate, InvoicingError> {
    NaiveDate::parse_from_str(value, DUE_DATE_FORMAT).map_err(|source| InvoicingError::DateParse {
        value: value.to_string(),
        source,
    })
}

/// Invoice status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceStatus {
    /// Invoice is being drafted
    Draft,
    /// Payment has been initiated
    Sent,
    /// Fully paid
    Paid,
    /// Past due date
    Overdue,
    /// Cancelled/voided
    Cancelled,
}

impl InvoiceStatus {
    /// Stored and wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "DRAFT",
            InvoiceStatus::Sent => "SENT",
            InvoiceStatus::Paid => "PAID",
            InvoiceStatus::Overdue => "OVERDUE",
            InvoiceStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvoiceStatus {
    type Err = InvoicingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DRAFT" => Ok(InvoiceStatus::Draft),
            "SENT" => Ok(InvoiceStatus::Sent),
            "PAID" => Ok(InvoiceStatus::Paid),
            "OVERDUE" => Ok(InvoiceStatus::Overdue),
            "CANCELLED" => Ok(InvoiceStatus::Cancelled),
            other => Err(InvoicingError::persistence(format!(
                "unknown invoice status '{}'",
                other
            ))),
        }
    }
}

/// An invoice issued by a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: InvoiceId,
    /// The user issuing the invoice
    pub user_id: UserId,
    pub due_date: NaiveDate,
    /// Subtotal plus tax, fixed at pricing time
    pub total_amount: Decimal,
    pub tax_rate_id: TaxRateId,
    pub status: InvoiceStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    /// Creates a new draft invoice
    pub fn draft(
        user_id: UserId,
        due_date: NaiveDate,
        tax_rate_id: TaxRateId,
        total_amount: Decimal,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: InvoiceId::new_v7(),
            user_id,
            due_date,
            total_amount,
            tax_rate_id,
            status: InvoiceStatus::Draft,
            created_at: now,
            updated_at: now,
        }
    }

    /// Paid and cancelled invoices are closed to changes
    pub fn is_editable(&self) -> bool {
        !matches!(self.status, InvoiceStatus::Paid | InvoiceStatus::Cancelled)
    }

    /// Applies a new price and tax rate
    ///
    /// # Errors
    ///
    /// Returns `InvoicingError::Conflict` if the invoice is closed
    pub fn reprice(&mut self, tax_rate_id: TaxRateId, total_amount: Decimal) -> Result<(), InvoicingError> {
        self.ensure_editable()?;
        self.tax_rate_id = tax_rate_id;
        self.total_amount = total_amount;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Marks the invoice as sent once payment is initiated
    ///
    /// # Errors
    ///
    /// Returns `InvoicingError::Conflict` if the invoice is closed
    pub fn mark_sent(&mut self) -> Result<(), InvoicingError> {
        self.ensure_editable()?;
        self.status = InvoiceStatus::Sent;
        self.updated_at = Utc::now();
        Ok(())
    }

    fn ensure_editable(&self) -> Result<(), InvoicingError> {
        if self.is_editable() {
            Ok(())
        } else {
            Err(closed_invoice(self.id, self.status))
        }
    }
}

/// Conflict raised when a closed invoice is asked to change
pub fn closed_invoice(id: InvoiceId, status: InvoiceStatus) -> InvoicingError {
    InvoicingError::Conflict(format!(
        "invoice {} is {} and can no longer be updated",
        id, status
    ))
}

/// A single invoice line, tied to either a service at a rate or to a part
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BillableItem {
    Service {
        id: BillableItemId,
        invoice_id: InvoiceId,
        service_id: ServiceId,
        rate_id: RateId,
    },
    Part {
        id: BillableItemId,
        invoice_id: InvoiceId,
        part_id: PartId,
    },
}

impl BillableItem {
    pub fn service(invoice_id: InvoiceId, line: &ServiceLine) -> Self {
        BillableItem::Service {
            id: BillableItemId::new_v7(),
            invoice_id,
            service_id: line.service_id,
            rate_id: line.rate_id,
        }
    }

    pub fn part(invoice_id: InvoiceId, line: &PartLine) -> Self {
        BillableItem::Part {
            id: BillableItemId::new_v7(),
            invoice_id,
            part_id: line.part_id,
        }
    }

    /// One item per service line followed by one per part line
    pub fn for_lines(invoice_id: InvoiceId, services: &[ServiceLine], parts: &[PartLine]) -> Vec<Self> {
        services
            .iter()
            .map(|line| Self::service(invoice_id, line))
            .chain(parts.iter().map(|line| Self::part(invoice_id, line)))
            .collect()
    }

    pub fn id(&self) -> BillableItemId {
        match self {
            BillableItem::Service { id, .. } | BillableItem::Part { id, .. } => *id,
        }
    }

    pub fn invoice_id(&self) -> InvoiceId {
        match self {
            BillableItem::Service { invoice_id, .. } | BillableItem::Part { invoice_id, .. } => *invoice_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_due_date() {
        assert_eq!(
            parse_due_date("2024-12-31").unwrap(),
            NaiveDate::from_ymd_opt(2024, 12, 31).unwrap()
        );
    }

    #[test]
    fn test_parse_due_date_rejects_other_formats() {
        for bad in ["13/45/2024", "2024-13-01", "2024-02-30", "31-12-2024", "", "2024-12-31T00:00:00"] {
            let err = parse_due_date(bad).unwrap_err();
            assert!(matches!(err, InvoicingError::DateParse { .. }), "accepted {bad:?}");
        }
    }

    #[test]
    fn test_status_round_trips_through_storage_form() {
        for status in [
            InvoiceStatus::Draft,
            InvoiceStatus::Sent,
            InvoiceStatus::Paid,
            InvoiceStatus::Overdue,
            InvoiceStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<InvoiceStatus>().unwrap(), status);
        }
        assert!("UPDATED".parse::<InvoiceStatus>().is_err());
    }

    #[test]
    fn test_paid_invoice_cannot_be_repriced() {
        let mut invoice = Invoice::draft(
            UserId::new(),
            NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
            TaxRateId::new(),
            dec!(100),
        );
        invoice.status = InvoiceStatus::Paid;

        let err = invoice.reprice(TaxRateId::new(), dec!(50)).unwrap_err();
        assert!(matches!(err, InvoicingError::Conflict(_)));
        assert_eq!(invoice.total_amount, dec!(100));
    }

    #[test]
    fn test_closed_invoice_cannot_be_sent_again() {
        let mut invoice = Invoice::draft(
            UserId::new(),
            NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
            TaxRateId::new(),
            dec!(100),
        );
        invoice.mark_sent().unwrap();
        assert_eq!(invoice.status, InvoiceStatus::Sent);

        for closed in [InvoiceStatus::Paid, InvoiceStatus::Cancelled] {
            invoice.status = closed;
            let err = invoice.mark_sent().unwrap_err();
            assert!(matches!(err, InvoicingError::Conflict(_)));
            assert_eq!(invoice.status, closed);
        }
    }

    #[test]
    fn test_items_follow_line_order() {
        let invoice_id = InvoiceId::new();
        let services = vec![ServiceLine::new(ServiceId::new(), dec!(1), RateId::new())];
        let parts = vec![
            PartLine::new(PartId::new(), 1, dec!(1)),
            PartLine::new(PartId::new(), 2, dec!(1)),
        ];

        let items = BillableItem::for_lines(invoice_id, &services, &parts);

        assert_eq!(items.len(), 3);
        assert!(matches!(items[0], BillableItem::Service { .. }));
        assert!(matches!(items[1], BillableItem::Part { part_id, .. } if part_id == parts[0].part_id));
        assert!(items.iter().all(|item| item.invoice_id() == invoice_id));
    }
}
