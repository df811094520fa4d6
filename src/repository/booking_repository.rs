use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{
        new_booking_ref, Booking, BookingPaymentStatus, BookingStatus, CreateBookingRequest,
    },
    error::{AppError, Result},
    repository::BookingRepository,
};

#[derive(FromRow)]
struct BookingRow {
    id: String,
    booking_ref: String,
    guest_email: String,
    guest_name: String,
    date: NaiveDate,
    tee_time: Option<String>,
    players: i64,
    total_cents: i64,
    currency: String,
    club: String,
    status: String,
    is_tour_operator: bool,
    deposit_percentage: Option<i64>,
    payment_status: String,
    total_paid_cents: i64,
    note: Option<String>,
    updated_by: Option<String>,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

const BOOKING_COLUMNS: &str = r#"
    id, booking_ref, guest_email, guest_name, date, tee_time, players,
    total_cents, currency, club, status, is_tour_operator, deposit_percentage,
    payment_status, total_paid_cents, note, updated_by, created_at, updated_at
"#;

pub struct SqliteBookingRepository {
    pool: SqlitePool,
}

impl SqliteBookingRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_booking(row: BookingRow) -> Result<Booking> {
        Ok(Booking {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            booking_ref: row.booking_ref,
            guest_email: row.guest_email,
            guest_name: row.guest_name,
            date: row.date,
            tee_time: row.tee_time,
            players: row.players,
            total_cents: row.total_cents,
            currency: row.currency,
            club: row.club,
            status: parse_booking_status(&row.status)?,
            is_tour_operator: row.is_tour_operator,
            deposit_percentage: row.deposit_percentage,
            payment_status: parse_payment_status(&row.payment_status)?,
            total_paid_cents: row.total_paid_cents,
            note: row.note,
            updated_by: row.updated_by,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
        })
    }
}

pub(crate) fn parse_booking_status(s: &str) -> Result<BookingStatus> {
    match s {
        "Inquiry" => Ok(BookingStatus::Inquiry),
        "Requested" => Ok(BookingStatus::Requested),
        "Confirmed" => Ok(BookingStatus::Confirmed),
        "Booked" => Ok(BookingStatus::Booked),
        "Rejected" => Ok(BookingStatus::Rejected),
        "Cancelled" => Ok(BookingStatus::Cancelled),
        _ => Err(AppError::Database(format!("Invalid booking status: {}", s))),
    }
}

pub(crate) fn booking_status_to_str(status: &BookingStatus) -> &'static str {
    match status {
        BookingStatus::Inquiry => "Inquiry",
        BookingStatus::Requested => "Requested",
        BookingStatus::Confirmed => "Confirmed",
        BookingStatus::Booked => "Booked",
        BookingStatus::Rejected => "Rejected",
        BookingStatus::Cancelled => "Cancelled",
    }
}

pub(crate) fn parse_payment_status(s: &str) -> Result<BookingPaymentStatus> {
    match s {
        "NotRequested" => Ok(BookingPaymentStatus::NotRequested),
        "Pending" => Ok(BookingPaymentStatus::Pending),
        "DepositPaid" => Ok(BookingPaymentStatus::DepositPaid),
        "FullyPaid" => Ok(BookingPaymentStatus::FullyPaid),
        "Failed" => Ok(BookingPaymentStatus::Failed),
        _ => Err(AppError::Database(format!(
            "Invalid booking payment status: {}",
            s
        ))),
    }
}

pub(crate) fn payment_status_to_str(status: &BookingPaymentStatus) -> &'static str {
    match status {
        BookingPaymentStatus::NotRequested => "NotRequested",
        BookingPaymentStatus::Pending => "Pending",
        BookingPaymentStatus::DepositPaid => "DepositPaid",
        BookingPaymentStatus::FullyPaid => "FullyPaid",
        BookingPaymentStatus::Failed => "Failed",
    }
}

#[async_trait]
impl BookingRepository for SqliteBookingRepository {
    async fn create(&self, request: CreateBookingRequest) -> Result<Booking> {
        let id = Uuid::new_v4();
        let now = Utc::now();
        let booking_ref = new_booking_ref(now);
        let now_naive = now.naive_utc();

        sqlx::query(
            r#"
            INSERT INTO bookings (
                id, booking_ref, guest_email, guest_name, date, tee_time, players,
                total_cents, currency, club, status, is_tour_operator,
                deposit_percentage, payment_status, total_paid_cents, note,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(&booking_ref)
        .bind(&request.guest_email)
        .bind(&request.guest_name)
        .bind(request.date)
        .bind(&request.tee_time)
        .bind(request.players)
        .bind(request.total_cents)
        .bind(&request.currency)
        .bind(&request.club)
        .bind(booking_status_to_str(&BookingStatus::Inquiry))
        .bind(request.is_tour_operator)
        .bind(request.deposit_percentage)
        .bind(payment_status_to_str(&BookingPaymentStatus::NotRequested))
        .bind(0i64)
        .bind(&request.note)
        .bind(now_naive)
        .bind(now_naive)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve created booking".to_string()))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>> {
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {} FROM bookings WHERE id = ?",
            BOOKING_COLUMNS
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_booking(r)?)),
            None => Ok(None),
        }
    }

    async fn list_by_club(&self, club: &str, limit: i64, offset: i64) -> Result<Vec<Booking>> {
        let rows = sqlx::query_as::<_, BookingRow>(&format!(
            r#"
            SELECT {} FROM bookings
            WHERE club = ?
            ORDER BY created_at DESC
            LIMIT ? OFFSET ?
            "#,
            BOOKING_COLUMNS
        ))
        .bind(club)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_booking).collect()
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: BookingStatus,
        updated_by: &str,
    ) -> Result<Booking> {
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            UPDATE bookings
            SET status = ?, updated_by = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(booking_status_to_str(&status))
        .bind(updated_by)
        .bind(now)
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Booking {} not found", id)))
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        // Payment records go with the booking (ON DELETE CASCADE).
        let result = sqlx::query("DELETE FROM bookings WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Booking {} not found", id)));
        }

        Ok(())
    }
}
