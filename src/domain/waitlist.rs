use chrono::{DateTime, NaiveDate, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A customer waiting for a tee-time slot to open up.
///
/// At most one *active* (`Waiting` or `Notified`) entry may exist per
/// `(guest_email, requested_date, club)` triple; the repository enforces
/// this atomically on insert.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct WaitlistEntry {
    pub waitlist_id: String,
    pub guest_email: String,
    pub guest_name: String,
    pub requested_date: NaiveDate,
    pub preferred_time: String,
    pub time_flexibility: String,
    pub players: i64,
    pub golf_course: String,
    pub club: String,
    pub priority: i64,
    pub status: WaitlistStatus,
    pub source: String,
    pub opt_in_confirmed: bool,
    pub notes: Option<String>,
    pub notification_sent: bool,
    pub notification_sent_at: Option<DateTime<Utc>>,
    pub original_booking_request: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::Type, PartialEq)]
#[sqlx(type_name = "TEXT")]
pub enum WaitlistStatus {
    Waiting,
    Notified,
    Converted,
    Declined,
}

impl WaitlistStatus {
    /// Entries still eligible for matching and notification.
    pub fn is_active(&self) -> bool {
        matches!(self, WaitlistStatus::Waiting | WaitlistStatus::Notified)
    }

    /// The lifecycle only moves forward: Waiting -> Notified ->
    /// Converted/Declined. Re-asserting the current status is allowed as a
    /// no-op; anything backward is rejected.
    pub fn can_transition_to(&self, next: &WaitlistStatus) -> bool {
        use WaitlistStatus::*;
        match (self, next) {
            (a, b) if a == b => true,
            (Waiting, Notified | Converted | Declined) => true,
            (Notified, Converted | Declined) => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateWaitlistRequest {
    pub guest_email: String,
    pub guest_name: String,
    pub requested_date: NaiveDate,
    pub preferred_time: String,
    pub time_flexibility: String,
    pub players: i64,
    pub golf_course: String,
    pub club: String,
    pub priority: i64,
    pub notes: Option<String>,
    pub source: String,
    pub opt_in_confirmed: bool,
    pub original_booking_request: Option<String>,
}

/// Partial update applied by staff or the automated matcher. Only status,
/// notes and the notification-sent marker are patchable.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateWaitlistRequest {
    pub status: Option<WaitlistStatus>,
    pub notes: Option<String>,
    pub notification_sent: Option<bool>,
}

/// Waitlist ids follow the `WL-<timestamp>-<random>` shape the email bot
/// already knows how to quote back at us.
pub fn new_waitlist_id(now: DateTime<Utc>) -> String {
    let suffix: u32 = rand::thread_rng().gen_range(0..10_000);
    format!("WL-{}-{:04}", now.format("%Y%m%d%H%M%S"), suffix)
}
