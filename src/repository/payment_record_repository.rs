use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, Sqlite, SqlitePool, Transaction};
use uuid::Uuid;

use crate::{
    domain::{rollup, Booking, PaymentRecord, PaymentRecordStatus, PaymentType},
    error::{AppError, Result},
    repository::{
        booking_repository::payment_status_to_str, BookingRepository, PaymentRecordRepository,
        SqliteBookingRepository,
    },
};

#[derive(FromRow)]
struct PaymentRecordRow {
    payment_id: String,
    booking_id: String,
    amount_cents: i64,
    currency: String,
    payment_type: String,
    deposit_percentage: Option<i64>,
    status: String,
    payment_link_id: Option<String>,
    checkout_session_id: Option<String>,
    payment_intent_id: Option<String>,
    link_sent_at: Option<NaiveDateTime>,
    received_at: Option<NaiveDateTime>,
    created_by: String,
    notes: Option<String>,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

const PAYMENT_COLUMNS: &str = r#"
    payment_id, booking_id, amount_cents, currency, payment_type,
    deposit_percentage, status, payment_link_id, checkout_session_id,
    payment_intent_id, link_sent_at, received_at, created_by, notes,
    created_at, updated_at
"#;

pub struct SqlitePaymentRecordRepository {
    pool: SqlitePool,
}

impl SqlitePaymentRecordRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_record(row: PaymentRecordRow) -> Result<PaymentRecord> {
        Ok(PaymentRecord {
            payment_id: row.payment_id,
            booking_id: Uuid::parse_str(&row.booking_id)
                .map_err(|e| AppError::Database(e.to_string()))?,
            amount_cents: row.amount_cents,
            currency: row.currency,
            payment_type: Self::parse_payment_type(&row.payment_type)?,
            deposit_percentage: row.deposit_percentage,
            status: Self::parse_status(&row.status)?,
            payment_link_id: row.payment_link_id,
            checkout_session_id: row.checkout_session_id,
            payment_intent_id: row.payment_intent_id,
            link_sent_at: row
                .link_sent_at
                .map(|dt| DateTime::from_naive_utc_and_offset(dt, Utc)),
            received_at: row
                .received_at
                .map(|dt| DateTime::from_naive_utc_and_offset(dt, Utc)),
            created_by: row.created_by,
            notes: row.notes,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
        })
    }

    fn parse_status(s: &str) -> Result<PaymentRecordStatus> {
        match s {
            "Pending" => Ok(PaymentRecordStatus::Pending),
            "Paid" => Ok(PaymentRecordStatus::Paid),
            "Failed" => Ok(PaymentRecordStatus::Failed),
            "Expired" => Ok(PaymentRecordStatus::Expired),
            "Refunded" => Ok(PaymentRecordStatus::Refunded),
            _ => Err(AppError::Database(format!("Invalid payment status: {}", s))),
        }
    }

    fn status_to_str(status: &PaymentRecordStatus) -> &'static str {
        match status {
            PaymentRecordStatus::Pending => "Pending",
            PaymentRecordStatus::Paid => "Paid",
            PaymentRecordStatus::Failed => "Failed",
            PaymentRecordStatus::Expired => "Expired",
            PaymentRecordStatus::Refunded => "Refunded",
        }
    }

    fn parse_payment_type(s: &str) -> Result<PaymentType> {
        match s {
            "Deposit" => Ok(PaymentType::Deposit),
            "Full" => Ok(PaymentType::Full),
            _ => Err(AppError::Database(format!("Invalid payment type: {}", s))),
        }
    }

    fn payment_type_to_str(payment_type: &PaymentType) -> &'static str {
        match payment_type {
            PaymentType::Deposit => "Deposit",
            PaymentType::Full => "Full",
        }
    }

    /// Re-derive the booking rollup from its payment records and mirror it
    /// onto the booking row, inside the caller's transaction.
    async fn refresh_rollup(tx: &mut Transaction<'_, Sqlite>, booking_id: Uuid) -> Result<()> {
        let rows = sqlx::query_as::<_, PaymentRecordRow>(&format!(
            "SELECT {} FROM payment_records WHERE booking_id = ? ORDER BY created_at ASC",
            PAYMENT_COLUMNS
        ))
        .bind(booking_id.to_string())
        .fetch_all(&mut **tx)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        let records = rows
            .into_iter()
            .map(Self::row_to_record)
            .collect::<Result<Vec<_>>>()?;
        let rollup = rollup::recompute(&records);

        sqlx::query(
            r#"
            UPDATE bookings
            SET payment_status = ?, total_paid_cents = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(payment_status_to_str(&rollup.payment_status))
        .bind(rollup.total_paid_cents)
        .bind(Utc::now().naive_utc())
        .bind(booking_id.to_string())
        .execute(&mut **tx)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl PaymentRecordRepository for SqlitePaymentRecordRepository {
    async fn create(&self, record: PaymentRecord) -> Result<PaymentRecord> {
        let now = Utc::now().naive_utc();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO payment_records (
                payment_id, booking_id, amount_cents, currency, payment_type,
                deposit_percentage, status, payment_link_id, checkout_session_id,
                payment_intent_id, link_sent_at, received_at, created_by, notes,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.payment_id)
        .bind(record.booking_id.to_string())
        .bind(record.amount_cents)
        .bind(&record.currency)
        .bind(Self::payment_type_to_str(&record.payment_type))
        .bind(record.deposit_percentage)
        .bind(Self::status_to_str(&record.status))
        .bind(&record.payment_link_id)
        .bind(&record.checkout_session_id)
        .bind(&record.payment_intent_id)
        .bind(record.link_sent_at.map(|dt| dt.naive_utc()))
        .bind(record.received_at.map(|dt| dt.naive_utc()))
        .bind(&record.created_by)
        .bind(&record.notes)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        // A fresh Pending record already changes what the booking rollup
        // reports, so refresh it in the same transaction.
        Self::refresh_rollup(&mut tx, record.booking_id).await?;

        tx.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_payment_id(&record.payment_id)
            .await?
            .ok_or_else(|| {
                AppError::Database("Failed to retrieve created payment record".to_string())
            })
    }

    async fn find_by_payment_id(&self, payment_id: &str) -> Result<Option<PaymentRecord>> {
        let row = sqlx::query_as::<_, PaymentRecordRow>(&format!(
            "SELECT {} FROM payment_records WHERE payment_id = ?",
            PAYMENT_COLUMNS
        ))
        .bind(payment_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_record(r)?)),
            None => Ok(None),
        }
    }

    async fn find_by_correlation_id(&self, correlation_id: &str) -> Result<Option<PaymentRecord>> {
        let row = sqlx::query_as::<_, PaymentRecordRow>(&format!(
            r#"
            SELECT {} FROM payment_records
            WHERE payment_link_id = ? OR checkout_session_id = ? OR payment_intent_id = ?
            "#,
            PAYMENT_COLUMNS
        ))
        .bind(correlation_id)
        .bind(correlation_id)
        .bind(correlation_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_record(r)?)),
            None => Ok(None),
        }
    }

    async fn list_by_booking(&self, booking_id: Uuid) -> Result<Vec<PaymentRecord>> {
        let rows = sqlx::query_as::<_, PaymentRecordRow>(&format!(
            "SELECT {} FROM payment_records WHERE booking_id = ? ORDER BY created_at ASC",
            PAYMENT_COLUMNS
        ))
        .bind(booking_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_record).collect()
    }

    async fn transition(
        &self,
        correlation_id: &str,
        new_status: PaymentRecordStatus,
        paid_amount_cents: Option<i64>,
    ) -> Result<(PaymentRecord, Booking)> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let row = sqlx::query_as::<_, PaymentRecordRow>(&format!(
            r#"
            SELECT {} FROM payment_records
            WHERE payment_link_id = ? OR checkout_session_id = ? OR payment_intent_id = ?
            "#,
            PAYMENT_COLUMNS
        ))
        .bind(correlation_id)
        .bind(correlation_id)
        .bind(correlation_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "No payment record for correlation id {}",
                correlation_id
            ))
        })?;

        let current = Self::row_to_record(row)?;

        if !current.status.can_transition_to(&new_status) {
            return Err(AppError::InvalidTransition(format!(
                "Payment {} cannot move from {:?} to {:?}",
                current.payment_id, current.status, new_status
            )));
        }

        let now = Utc::now();
        // The processor's captured amount is authoritative when it reports
        // a settlement.
        let amount_cents = match (&new_status, paid_amount_cents) {
            (PaymentRecordStatus::Paid, Some(paid)) => paid,
            _ => current.amount_cents,
        };
        let received_at = if new_status == PaymentRecordStatus::Paid {
            Some(now.naive_utc())
        } else {
            current.received_at.map(|dt| dt.naive_utc())
        };

        sqlx::query(
            r#"
            UPDATE payment_records
            SET status = ?, amount_cents = ?, received_at = ?, updated_at = ?
            WHERE payment_id = ?
            "#,
        )
        .bind(Self::status_to_str(&new_status))
        .bind(amount_cents)
        .bind(received_at)
        .bind(now.naive_utc())
        .bind(&current.payment_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Self::refresh_rollup(&mut tx, current.booking_id).await?;

        tx.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let record = self
            .find_by_payment_id(&current.payment_id)
            .await?
            .ok_or_else(|| {
                AppError::Database("Failed to retrieve updated payment record".to_string())
            })?;

        let booking_repo = SqliteBookingRepository::new(self.pool.clone());
        let booking = booking_repo
            .find_by_id(current.booking_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Booking {} not found", current.booking_id))
            })?;

        Ok((record, booking))
    }
}
