//! Payment repository implementation

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use core_kernel::{Currency, InvoiceId, PaymentId, TransactionId, UserId};
use domain_invoicing::Payment;

use crate::error::DatabaseError;
use crate::repositories::invoice::{GuardedWrite, InvoiceRepository};

/// Repository for payment records
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    pool: PgPool,
}

impl PaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Stores a payment and moves its invoice to `SENT` in one transaction
    ///
    /// Writes nothing unless the invoice belongs to the paying user and is
    /// still open.
    pub async fn record(&self, payment: &Payment) -> Result<GuardedWrite, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let outcome = InvoiceRepository::mark_sent(&mut tx, payment.invoice_id, payment.user_id).await?;
        if outcome != GuardedWrite::Applied {
            tx.rollback().await?;
            return Ok(outcome);
        }

        sqlx::query(
            r#"
            INSERT INTO payments (
                id, invoice_id, user_id, amount, currency,
                payment_method, transaction_id, payment_date
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(*payment.id.as_uuid())
        .bind(*payment.invoice_id.as_uuid())
        .bind(*payment.user_id.as_uuid())
        .bind(payment.amount)
        .bind(payment.currency.code())
        .bind(&payment.payment_method)
        .bind(*payment.transaction_id.as_uuid())
        .bind(payment.payment_date)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(GuardedWrite::Applied)
    }

    pub async fn find_by_transaction_id(
        &self,
        transaction_id: TransactionId,
    ) -> Result<Option<Payment>, DatabaseError> {
        let row = sqlx::query_as::<_, PaymentRow>(
            r#"
            SELECT id, invoice_id, user_id, amount, currency,
                   payment_method, transaction_id, payment_date
            FROM payments
            WHERE transaction_id = $1
            "#,
        )
        .bind(*transaction_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Payment::try_from).transpose()
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PaymentRow {
    id: Uuid,
    invoice_id: Uuid,
    user_id: Uuid,
    amount: Decimal,
    currency: String,
    payment_method: String,
    transaction_id: Uuid,
    payment_date: DateTime<Utc>,
}

impl TryFrom<PaymentRow> for Payment {
    type Error = DatabaseError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        let currency: Currency = row
            .currency
            .parse()
            .map_err(|_| DatabaseError::corrupt("payments.currency", &row.currency))?;

        Ok(Payment {
            id: PaymentId::from_uuid(row.id),
            invoice_id: InvoiceId::from_uuid(row.invoice_id),
            user_id: UserId::from_uuid(row.user_id),
            amount: row.amount,
            currency,
            payment_method: row.payment_method,
            transaction_id: TransactionId::from_uuid(row.transaction_id),
            payment_date: row.payment_date,
        })
    }
}
