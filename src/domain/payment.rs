use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single payment request against a booking. Bookings may accumulate
/// several of these (retries after a failure); the rollup in
/// `domain::rollup` decides what the booking-level state looks like.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PaymentRecord {
    pub payment_id: String,
    pub booking_id: Uuid,
    pub amount_cents: i64,
    pub currency: String,
    pub payment_type: PaymentType,
    pub deposit_percentage: Option<i64>,
    pub status: PaymentRecordStatus,
    pub payment_link_id: Option<String>,
    pub checkout_session_id: Option<String>,
    pub payment_intent_id: Option<String>,
    pub link_sent_at: Option<DateTime<Utc>>,
    pub received_at: Option<DateTime<Utc>>,
    pub created_by: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::Type, PartialEq)]
#[sqlx(type_name = "TEXT")]
pub enum PaymentType {
    Deposit,
    Full,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::Type, PartialEq)]
#[sqlx(type_name = "TEXT")]
pub enum PaymentRecordStatus {
    Pending,
    Paid,
    Failed,
    Expired,
    Refunded,
}

impl PaymentRecordStatus {
    /// Transitions driven by the external processor. A pending request can
    /// settle, fail or expire; only a settled payment can be refunded.
    pub fn can_transition_to(&self, next: &PaymentRecordStatus) -> bool {
        use PaymentRecordStatus::*;
        matches!(
            (self, next),
            (Pending, Paid) | (Pending, Failed) | (Pending, Expired) | (Paid, Refunded)
        )
    }
}

pub fn new_payment_id(now: DateTime<Utc>) -> String {
    let suffix: u32 = rand::thread_rng().gen_range(0..10_000);
    format!("PAY-{}-{:04}", now.format("%Y%m%d%H%M%S"), suffix)
}

/// Deposit amount in minor units, half-up rounded.
pub fn deposit_amount_cents(total_cents: i64, percentage: i64) -> i64 {
    (total_cents * percentage + 50) / 100
}

/// "EUR 250.00" style rendering for emails and logs.
pub fn format_amount(amount_cents: i64, currency: &str) -> String {
    format!("{} {}.{:02}", currency, amount_cents / 100, amount_cents % 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deposit_rounding() {
        // 50% of 200.00 and 20% of 200.00
        assert_eq!(deposit_amount_cents(20_000, 50), 10_000);
        assert_eq!(deposit_amount_cents(20_000, 20), 4_000);
        // 50% of 500.00
        assert_eq!(deposit_amount_cents(50_000, 50), 25_000);
        // half a cent rounds up: 50% of 10.01 = 5.005 -> 5.01
        assert_eq!(deposit_amount_cents(1_001, 50), 501);
        // just below the half-cent stays down: 20% of 10.02 = 2.004 -> 2.00
        assert_eq!(deposit_amount_cents(1_002, 20), 200);
    }

    #[test]
    fn settlement_transitions() {
        use PaymentRecordStatus::*;
        assert!(Pending.can_transition_to(&Paid));
        assert!(Pending.can_transition_to(&Failed));
        assert!(Pending.can_transition_to(&Expired));
        assert!(Paid.can_transition_to(&Refunded));

        assert!(!Paid.can_transition_to(&Pending));
        assert!(!Failed.can_transition_to(&Paid));
        assert!(!Expired.can_transition_to(&Paid));
        assert!(!Refunded.can_transition_to(&Paid));
        assert!(!Pending.can_transition_to(&Refunded));
        assert!(!Pending.can_transition_to(&Pending));
    }

    #[test]
    fn amount_formatting() {
        assert_eq!(format_amount(25_000, "EUR"), "EUR 250.00");
        assert_eq!(format_amount(501, "USD"), "USD 5.01");
    }
}
