//! Invoice repository implementation
//!
//! Invoices and their billable items are always written together inside one
//! transaction. Items keep their insertion order through a `position` column.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use core_kernel::{BillableItemId, InvoiceId, PartId, RateId, ServiceId, TaxRateId, UserId};
use domain_invoicing::{BillableItem, Invoice, InvoiceStatus};

use crate::error::DatabaseError;

/// Outcome of an update guarded by invoice status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardedWrite {
    Applied,
    /// No such invoice, or not one of the expected owner's
    Missing,
    /// The invoice exists but is paid or cancelled
    Closed(InvoiceStatus),
}

/// Repository for invoices and billable items
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    pool: PgPool,
}

impl InvoiceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts an invoice and all of its items in a single transaction
    pub async fn insert(&self, invoice: &Invoice, items: &[BillableItem]) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO invoices (
                id, user_id, due_date, total_amount, tax_rate_id,
                status, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(*invoice.id.as_uuid())
        .bind(*invoice.user_id.as_uuid())
        .bind(invoice.due_date)
        .bind(invoice.total_amount)
        .bind(*invoice.tax_rate_id.as_uuid())
        .bind(invoice.status.as_str())
        .bind(invoice.created_at)
        .bind(invoice.updated_at)
        .execute(&mut *tx)
        .await?;

        insert_items(&mut tx, items).await?;

        tx.commit().await?;
        Ok(())
    }

    pub async fn get(&self, id: InvoiceId) -> Result<Option<Invoice>, DatabaseError> {
        let row = sqlx::query_as::<_, InvoiceRow>(
            r#"
            SELECT id, user_id, due_date, total_amount, tax_rate_id,
                   status, created_at, updated_at
            FROM invoices
            WHERE id = $1
            "#,
        )
        .bind(*id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Invoice::try_from).transpose()
    }

    /// Overwrites price and tax rate and swaps the items of an open invoice
    ///
    /// The status check and the writes happen in the same transaction, so an
    /// invoice closed concurrently is never modified.
    pub async fn replace(
        &self,
        invoice: &Invoice,
        items: &[BillableItem],
    ) -> Result<GuardedWrite, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE invoices
            SET tax_rate_id = $2, total_amount = $3, updated_at = $4
            WHERE id = $1 AND status NOT IN ('PAID', 'CANCELLED')
            "#,
        )
        .bind(*invoice.id.as_uuid())
        .bind(*invoice.tax_rate_id.as_uuid())
        .bind(invoice.total_amount)
        .bind(invoice.updated_at)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if updated == 0 {
            let outcome = rejected_write(&mut tx, invoice.id, None).await?;
            tx.rollback().await?;
            return Ok(outcome);
        }

        sqlx::query("DELETE FROM billable_items WHERE invoice_id = $1")
            .bind(*invoice.id.as_uuid())
            .execute(&mut *tx)
            .await?;
        insert_items(&mut tx, items).await?;

        tx.commit().await?;
        Ok(GuardedWrite::Applied)
    }

    /// Moves one of `owner`'s open invoices to `SENT` inside an open transaction
    ///
    /// Paid and cancelled invoices keep their status.
    pub async fn mark_sent(
        tx: &mut Transaction<'_, Postgres>,
        id: InvoiceId,
        owner: UserId,
    ) -> Result<GuardedWrite, DatabaseError> {
        let updated = sqlx::query(
            r#"
            UPDATE invoices
            SET status = $3, updated_at = NOW()
            WHERE id = $1 AND user_id = $2 AND status NOT IN ('PAID', 'CANCELLED')
            "#,
        )
        .bind(*id.as_uuid())
        .bind(*owner.as_uuid())
        .bind(InvoiceStatus::Sent.as_str())
        .execute(&mut **tx)
        .await?
        .rows_affected();

        if updated == 0 {
            return rejected_write(tx, id, Some(owner)).await;
        }
        Ok(GuardedWrite::Applied)
    }

    pub async fn items(&self, id: InvoiceId) -> Result<Vec<BillableItem>, DatabaseError> {
        let rows = sqlx::query_as::<_, BillableItemRow>(
            r#"
            SELECT id, invoice_id, kind, service_id, rate_id, part_id
            FROM billable_items
            WHERE invoice_id = $1
            ORDER BY position
            "#,
        )
        .bind(*id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(BillableItem::try_from).collect()
    }
}

/// Explains why a status-guarded update touched no row
async fn rejected_write(
    tx: &mut Transaction<'_, Postgres>,
    id: InvoiceId,
    owner: Option<UserId>,
) -> Result<GuardedWrite, DatabaseError> {
    let status: Option<String> = sqlx::query_scalar(
        "SELECT status FROM invoices WHERE id = $1 AND ($2::uuid IS NULL OR user_id = $2)",
    )
    .bind(*id.as_uuid())
    .bind(owner.map(|owner| *owner.as_uuid()))
    .fetch_optional(&mut **tx)
    .await?;

    match status {
        None => Ok(GuardedWrite::Missing),
        Some(status) => Ok(GuardedWrite::Closed(parse_status(&status)?)),
    }
}

async fn insert_items(
    tx: &mut Transaction<'_, Postgres>,
    items: &[BillableItem],
) -> Result<(), DatabaseError> {
    for (position, item) in items.iter().enumerate() {
        let (kind, service_id, rate_id, part_id) = match item {
            BillableItem::Service {
                service_id, rate_id, ..
            } => ("service", Some(*service_id.as_uuid()), Some(*rate_id.as_uuid()), None),
            BillableItem::Part { part_id, .. } => ("part", None, None, Some(*part_id.as_uuid())),
        };

        sqlx::query(
            r#"
            INSERT INTO billable_items (
                id, invoice_id, position, kind, service_id, rate_id, part_id
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(*item.id().as_uuid())
        .bind(*item.invoice_id().as_uuid())
        .bind(position as i32)
        .bind(kind)
        .bind(service_id)
        .bind(rate_id)
        .bind(part_id)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

fn parse_status(value: &str) -> Result<InvoiceStatus, DatabaseError> {
    value
        .parse::<InvoiceStatus>()
        .map_err(|_| DatabaseError::corrupt("invoices.status", value))
}

#[derive(Debug, sqlx::FromRow)]
struct InvoiceRow {
    id: Uuid,
    user_id: Uuid,
    due_date: NaiveDate,
    total_amount: Decimal,
    tax_rate_id: Uuid,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<InvoiceRow> for Invoice {
    type Error = DatabaseError;

    fn try_from(row: InvoiceRow) -> Result<Self, Self::Error> {
        Ok(Invoice {
            id: InvoiceId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            due_date: row.due_date,
            total_amount: row.total_amount,
            tax_rate_id: TaxRateId::from_uuid(row.tax_rate_id),
            status: parse_status(&row.status)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct BillableItemRow {
    id: Uuid,
    invoice_id: Uuid,
    kind: String,
    service_id: Option<Uuid>,
    rate_id: Option<Uuid>,
    part_id: Option<Uuid>,
}

impl TryFrom<BillableItemRow> for BillableItem {
    type Error = DatabaseError;

    fn try_from(row: BillableItemRow) -> Result<Self, Self::Error> {
        let id = BillableItemId::from_uuid(row.id);
        let invoice_id = InvoiceId::from_uuid(row.invoice_id);

        match (row.kind.as_str(), row.service_id, row.rate_id, row.part_id) {
            ("service", Some(service_id), Some(rate_id), None) => Ok(BillableItem::Service {
                id,
                invoice_id,
                service_id: ServiceId::from_uuid(service_id),
                rate_id: RateId::from_uuid(rate_id),
            }),
            ("part", None, None, Some(part_id)) => Ok(BillableItem::Part {
                id,
                invoice_id,
                part_id: PartId::from_uuid(part_id),
            }),
            _ => Err(DatabaseError::corrupt("billable_items.kind", &row.kind)),
        }
    }
}
