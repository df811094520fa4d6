use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::*;
use crate::error::Result;

pub mod booking_repository;
pub mod payment_record_repository;
pub mod waitlist_repository;

pub use booking_repository::SqliteBookingRepository;
pub use payment_record_repository::SqlitePaymentRecordRepository;
pub use waitlist_repository::SqliteWaitlistRepository;

#[async_trait]
pub trait WaitlistRepository: Send + Sync {
    /// Check-then-insert runs atomically; a second active entry for the
    /// same (email, date, club) triple comes back as DuplicateActiveEntry
    /// carrying the existing entry's id and status.
    async fn create(&self, request: CreateWaitlistRequest) -> Result<WaitlistEntry>;
    async fn find_by_waitlist_id(&self, waitlist_id: &str) -> Result<Option<WaitlistEntry>>;
    /// Active (Waiting|Notified) entries for a guest at a club, optionally
    /// narrowed to one date.
    async fn find_active(
        &self,
        email: &str,
        club: &str,
        date: Option<NaiveDate>,
    ) -> Result<Vec<WaitlistEntry>>;
    async fn update(
        &self,
        waitlist_id: &str,
        update: UpdateWaitlistRequest,
    ) -> Result<WaitlistEntry>;
    async fn delete(&self, waitlist_id: &str) -> Result<()>;
    /// Waiting entries for (date, club), priority descending then arrival
    /// order ascending.
    async fn find_matches(&self, date: NaiveDate, club: &str) -> Result<Vec<WaitlistEntry>>;
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn create(&self, request: CreateBookingRequest) -> Result<Booking>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>>;
    async fn list_by_club(&self, club: &str, limit: i64, offset: i64) -> Result<Vec<Booking>>;
    async fn update_status(
        &self,
        id: Uuid,
        status: BookingStatus,
        updated_by: &str,
    ) -> Result<Booking>;
    async fn delete(&self, id: Uuid) -> Result<()>;
}

#[async_trait]
pub trait PaymentRecordRepository: Send + Sync {
    /// Inserts the record and refreshes the owning booking's rollup in the
    /// same transaction.
    async fn create(&self, record: PaymentRecord) -> Result<PaymentRecord>;
    async fn find_by_payment_id(&self, payment_id: &str) -> Result<Option<PaymentRecord>>;
    /// Looks the record up by any of its processor correlation keys.
    async fn find_by_correlation_id(&self, correlation_id: &str) -> Result<Option<PaymentRecord>>;
    async fn list_by_booking(&self, booking_id: Uuid) -> Result<Vec<PaymentRecord>>;
    /// Applies a processor-reported status change and recomputes the
    /// booking rollup, both inside one transaction so no reader ever sees
    /// a Paid record with a stale booking.
    async fn transition(
        &self,
        correlation_id: &str,
        new_status: PaymentRecordStatus,
        paid_amount_cents: Option<i64>,
    ) -> Result<(PaymentRecord, Booking)>;
}
