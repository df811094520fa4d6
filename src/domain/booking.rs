use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A tee-time booking. Only the payment-relevant subset is modelled here;
/// inbound-email threading and dashboard concerns live elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Booking {
    pub id: Uuid,
    pub booking_ref: String,
    pub guest_email: String,
    pub guest_name: String,
    pub date: NaiveDate,
    pub tee_time: Option<String>,
    pub players: i64,
    pub total_cents: i64,
    pub currency: String,
    pub club: String,
    pub status: BookingStatus,
    pub is_tour_operator: bool,
    pub deposit_percentage: Option<i64>,
    pub payment_status: BookingPaymentStatus,
    pub total_paid_cents: i64,
    pub note: Option<String>,
    pub updated_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The staff-facing booking board: Inquiry -> Requested -> Confirmed ->
/// Booked, with Rejected/Cancelled as terminal exits.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::Type, PartialEq)]
#[sqlx(type_name = "TEXT")]
pub enum BookingStatus {
    Inquiry,
    Requested,
    Confirmed,
    Booked,
    Rejected,
    Cancelled,
}

impl BookingStatus {
    fn rank(&self) -> Option<u8> {
        match self {
            BookingStatus::Inquiry => Some(0),
            BookingStatus::Requested => Some(1),
            BookingStatus::Confirmed => Some(2),
            BookingStatus::Booked => Some(3),
            BookingStatus::Rejected | BookingStatus::Cancelled => None,
        }
    }

    pub fn can_transition_to(&self, next: &BookingStatus) -> bool {
        if self == next {
            return true;
        }
        match (self.rank(), next.rank()) {
            // forward along the board
            (Some(from), Some(to)) => to > from,
            // any live booking can be rejected or cancelled
            (Some(_), None) => true,
            // terminal states stay terminal
            (None, _) => false,
        }
    }
}

/// Rollup of a booking's payment records, mirrored onto the booking row.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::Type, PartialEq)]
#[sqlx(type_name = "TEXT")]
pub enum BookingPaymentStatus {
    NotRequested,
    Pending,
    DepositPaid,
    FullyPaid,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBookingRequest {
    pub guest_email: String,
    pub guest_name: String,
    pub date: NaiveDate,
    pub tee_time: Option<String>,
    pub players: i64,
    pub total_cents: i64,
    pub currency: String,
    pub club: String,
    pub is_tour_operator: bool,
    pub deposit_percentage: Option<i64>,
    pub note: Option<String>,
}

/// Human-facing booking reference, same shape as waitlist/payment ids.
pub fn new_booking_ref(now: DateTime<Utc>) -> String {
    use rand::Rng;
    let suffix: u32 = rand::thread_rng().gen_range(0..10_000);
    format!("BOOK-{}-{:04}", now.format("%Y%m%d%H%M%S"), suffix)
}

impl Booking {
    /// Tour operators always owe the (higher) tour-operator percentage;
    /// everyone else uses the booking's stored override when present,
    /// falling back to the process-wide default.
    pub fn effective_deposit_percentage(
        &self,
        default_percentage: i64,
        tour_operator_percentage: i64,
    ) -> i64 {
        if self.is_tour_operator {
            tour_operator_percentage
        } else {
            self.deposit_percentage.unwrap_or(default_percentage)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn booking(is_tour_operator: bool, deposit_percentage: Option<i64>) -> Booking {
        Booking {
            id: Uuid::new_v4(),
            booking_ref: "BOOK-0001".to_string(),
            guest_email: "guest@example.com".to_string(),
            guest_name: "Guest".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 6, 14).unwrap(),
            tee_time: None,
            players: 4,
            total_cents: 50_000,
            currency: "EUR".to_string(),
            club: "island".to_string(),
            status: BookingStatus::Confirmed,
            is_tour_operator,
            deposit_percentage,
            payment_status: BookingPaymentStatus::NotRequested,
            total_paid_cents: 0,
            note: None,
            updated_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn tour_operator_forces_percentage() {
        let b = booking(true, Some(10));
        assert_eq!(b.effective_deposit_percentage(20, 50), 50);
    }

    #[test]
    fn override_beats_default() {
        let b = booking(false, Some(30));
        assert_eq!(b.effective_deposit_percentage(20, 50), 30);
    }

    #[test]
    fn default_applies_last() {
        let b = booking(false, None);
        assert_eq!(b.effective_deposit_percentage(20, 50), 20);
    }

    #[test]
    fn board_moves_forward_only() {
        use BookingStatus::*;
        assert!(Inquiry.can_transition_to(&Requested));
        assert!(Inquiry.can_transition_to(&Booked));
        assert!(Confirmed.can_transition_to(&Booked));
        assert!(Confirmed.can_transition_to(&Cancelled));
        assert!(Booked.can_transition_to(&Rejected));

        assert!(!Booked.can_transition_to(&Confirmed));
        assert!(!Cancelled.can_transition_to(&Inquiry));
        assert!(!Rejected.can_transition_to(&Booked));
    }
}
