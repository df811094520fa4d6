use serde::Serialize;

use super::booking::BookingPaymentStatus;
use super::payment::{PaymentRecord, PaymentRecordStatus, PaymentType};

/// Booking-level payment state derived from the booking's payment records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentRollup {
    pub payment_status: BookingPaymentStatus,
    pub total_paid_cents: i64,
}

/// Fold a booking's payment records into its rollup state.
///
/// Pure and idempotent: the result depends only on the records passed in,
/// so it can be re-derived at any time for replay or audit. Precedence:
/// a settled full payment wins outright, then settled deposits, then the
/// most recent record decides between Pending, Failed (Expired folds in
/// here: both mean "can retry") and nothing-outstanding.
pub fn recompute(records: &[PaymentRecord]) -> PaymentRollup {
    let paid_full = records
        .iter()
        .filter(|r| r.payment_type == PaymentType::Full && r.status == PaymentRecordStatus::Paid)
        .max_by_key(|r| r.created_at);
    if let Some(full) = paid_full {
        return PaymentRollup {
            payment_status: BookingPaymentStatus::FullyPaid,
            total_paid_cents: full.amount_cents,
        };
    }

    let paid_deposit_total: i64 = records
        .iter()
        .filter(|r| r.payment_type == PaymentType::Deposit && r.status == PaymentRecordStatus::Paid)
        .map(|r| r.amount_cents)
        .sum();
    if records
        .iter()
        .any(|r| r.payment_type == PaymentType::Deposit && r.status == PaymentRecordStatus::Paid)
    {
        return PaymentRollup {
            payment_status: BookingPaymentStatus::DepositPaid,
            total_paid_cents: paid_deposit_total,
        };
    }

    let latest = match records.iter().max_by_key(|r| r.created_at) {
        Some(latest) => latest,
        None => {
            return PaymentRollup {
                payment_status: BookingPaymentStatus::NotRequested,
                total_paid_cents: 0,
            }
        }
    };

    let payment_status = match latest.status {
        PaymentRecordStatus::Pending => BookingPaymentStatus::Pending,
        PaymentRecordStatus::Failed | PaymentRecordStatus::Expired => BookingPaymentStatus::Failed,
        // A refunded payment undoes the request; nothing is outstanding.
        PaymentRecordStatus::Refunded => BookingPaymentStatus::NotRequested,
        // Paid records were consumed by the branches above.
        PaymentRecordStatus::Paid => BookingPaymentStatus::NotRequested,
    };

    PaymentRollup {
        payment_status,
        total_paid_cents: 0,
    }
}
