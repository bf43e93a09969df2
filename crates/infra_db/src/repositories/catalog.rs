//! Catalog repository implementation
//!
//! Point lookups into the `rates`, `parts` and `tax_rates` tables, plus the
//! inserts used to maintain them.

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use core_kernel::{PartId, RateId, TaxRateId};
use domain_invoicing::{Part, Rate, TaxRate};

use crate::error::DatabaseError;

/// Repository for rates, parts and tax rates
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: PgPool,
}

impl CatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_rate(&self, id: RateId) -> Result<Option<Rate>, DatabaseError> {
        let row = sqlx::query_as::<_, RateRow>("SELECT id, amount FROM rates WHERE id = $1")
            .bind(*id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Rate::from))
    }

    pub async fn find_part(&self, id: PartId) -> Result<Option<Part>, DatabaseError> {
        let row = sqlx::query_as::<_, PartRow>(
            "SELECT id, cost, markup_percentage FROM parts WHERE id = $1",
        )
        .bind(*id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Part::from))
    }

    pub async fn find_tax_rate(&self, id: TaxRateId) -> Result<Option<TaxRate>, DatabaseError> {
        let row = sqlx::query_as::<_, TaxRateRow>(
            "SELECT id, percentage FROM tax_rates WHERE id = $1",
        )
        .bind(*id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(TaxRate::from))
    }

    /// Inserts or overwrites a rate
    pub async fn upsert_rate(&self, rate: &Rate) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO rates (id, amount) VALUES ($1, $2)
            ON CONFLICT (id) DO UPDATE SET amount = EXCLUDED.amount
            "#,
        )
        .bind(*rate.id.as_uuid())
        .bind(rate.amount)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Inserts or overwrites a part
    pub async fn upsert_part(&self, part: &Part) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO parts (id, cost, markup_percentage) VALUES ($1, $2, $3)
            ON CONFLICT (id) DO UPDATE
                SET cost = EXCLUDED.cost, markup_percentage = EXCLUDED.markup_percentage
            "#,
        )
        .bind(*part.id.as_uuid())
        .bind(part.cost)
        .bind(part.markup_percentage)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Inserts or overwrites a tax rate
    pub async fn upsert_tax_rate(&self, tax_rate: &TaxRate) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO tax_rates (id, percentage) VALUES ($1, $2)
            ON CONFLICT (id) DO UPDATE SET percentage = EXCLUDED.percentage
            "#,
        )
        .bind(*tax_rate.id.as_uuid())
        .bind(tax_rate.percentage)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[derive(Debug, sqlx::FromRow)]
struct RateRow {
    id: Uuid,
    amount: Decimal,
}

impl From<RateRow> for Rate {
    fn from(row: RateRow) -> Self {
        Rate::new(RateId::from_uuid(row.id), row.amount)
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PartRow {
    id: Uuid,
    cost: Decimal,
    markup_percentage: Decimal,
}

impl From<PartRow> for Part {
    fn from(row: PartRow) -> Self {
        Part::new(PartId::from_uuid(row.id), row.cost, row.markup_percentage)
    }
}

#[derive(Debug, sqlx::FromRow)]
struct TaxRateRow {
    id: Uuid,
    percentage: Decimal,
}

impl From<TaxRateRow> for TaxRate {
    fn from(row: TaxRateRow) -> Self {
        TaxRate::new(TaxRateId::from_uuid(row.id), row.percentage)
    }
}
