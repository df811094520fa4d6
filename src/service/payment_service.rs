use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    config::PaymentConfig,
    domain::{
        deposit_amount_cents, format_amount, new_payment_id, Booking, PaymentRecord,
        PaymentRecordStatus, PaymentType,
    },
    error::{AppError, Result},
    notifications::{payment_link_email, Mailer},
    payments::{PaymentLinkGateway, PaymentLinkRequest},
    repository::{BookingRepository, PaymentRecordRepository},
};

pub struct PaymentService {
    payment_repo: Arc<dyn PaymentRecordRepository>,
    booking_repo: Arc<dyn BookingRepository>,
    gateway: Option<Arc<dyn PaymentLinkGateway>>,
    mailer: Arc<dyn Mailer>,
    config: PaymentConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatedPaymentRequest {
    pub payment_id: String,
    pub url: String,
    pub amount_cents: i64,
    pub currency: String,
}

impl PaymentService {
    pub fn new(
        payment_repo: Arc<dyn PaymentRecordRepository>,
        booking_repo: Arc<dyn BookingRepository>,
        gateway: Option<Arc<dyn PaymentLinkGateway>>,
        mailer: Arc<dyn Mailer>,
        config: PaymentConfig,
    ) -> Self {
        Self {
            payment_repo,
            booking_repo,
            gateway,
            mailer,
            config,
        }
    }

    /// Create a payment request against a booking: compute the amount,
    /// mint a payment link, persist the Pending record and email the guest
    /// the link. The record survives a failed email send; the send failure
    /// is reported to the caller as a Notification error.
    pub async fn create_payment_request(
        &self,
        booking_id: Uuid,
        payment_type: PaymentType,
        created_by: &str,
        notes: Option<String>,
    ) -> Result<CreatedPaymentRequest> {
        let booking = self
            .booking_repo
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Booking {} not found", booking_id)))?;

        let (amount_cents, deposit_percentage) = match payment_type {
            PaymentType::Full => (booking.total_cents, None),
            PaymentType::Deposit => {
                let percentage = booking.effective_deposit_percentage(
                    self.config.default_deposit_percentage,
                    self.config.tour_operator_deposit_percentage,
                );
                (
                    deposit_amount_cents(booking.total_cents, percentage),
                    Some(percentage),
                )
            }
        };

        if amount_cents <= 0 {
            return Err(AppError::InvalidAmount(format!(
                "Computed charge for booking {} is {}",
                booking.booking_ref,
                format_amount(amount_cents, &booking.currency)
            )));
        }

        let gateway = self
            .gateway
            .as_ref()
            .ok_or_else(|| AppError::PaymentLink("Payment gateway not configured".to_string()))?;

        let now = Utc::now();
        let payment_id = new_payment_id(now);

        let link = gateway
            .create_payment_link(PaymentLinkRequest {
                amount_cents,
                currency: booking.currency.clone(),
                description: match payment_type {
                    PaymentType::Deposit => {
                        format!("Deposit for tee time booking {}", booking.booking_ref)
                    }
                    PaymentType::Full => {
                        format!("Payment for tee time booking {}", booking.booking_ref)
                    }
                },
                reference: payment_id.clone(),
                guest_email: booking.guest_email.clone(),
            })
            .await?;

        let record = PaymentRecord {
            payment_id: payment_id.clone(),
            booking_id: booking.id,
            amount_cents,
            currency: booking.currency.clone(),
            payment_type: payment_type.clone(),
            deposit_percentage,
            status: PaymentRecordStatus::Pending,
            payment_link_id: Some(link.link_id.clone()),
            checkout_session_id: link.checkout_session_id.clone(),
            payment_intent_id: None,
            link_sent_at: Some(now),
            received_at: None,
            created_by: created_by.to_string(),
            notes,
            created_at: now,
            updated_at: now,
        };

        let record = self.payment_repo.create(record).await?;
        tracing::info!(
            "Payment request {} ({}) created for booking {}",
            record.payment_id,
            format_amount(record.amount_cents, &record.currency),
            booking.booking_ref
        );

        // The Pending record is already committed; a failed send must not
        // undo it.
        let email = payment_link_email(&booking, &payment_type, amount_cents, &link.url);
        if let Err(e) = self.mailer.send(email).await {
            tracing::warn!(
                "Payment link for {} created but email failed: {}",
                record.payment_id,
                e
            );
            return Err(e);
        }

        Ok(CreatedPaymentRequest {
            payment_id: record.payment_id,
            url: link.url,
            amount_cents,
            currency: booking.currency,
        })
    }

    /// Apply a processor-reported status change. Record transition and
    /// booking rollup land in one transaction.
    pub async fn apply_status_update(
        &self,
        correlation_id: &str,
        new_status: PaymentRecordStatus,
        paid_amount_cents: Option<i64>,
    ) -> Result<(PaymentRecord, Booking)> {
        let (record, booking) = self
            .payment_repo
            .transition(correlation_id, new_status, paid_amount_cents)
            .await?;

        tracing::info!(
            "Payment {} now {:?}; booking {} rollup {:?} ({})",
            record.payment_id,
            record.status,
            booking.booking_ref,
            booking.payment_status,
            format_amount(booking.total_paid_cents, &booking.currency)
        );

        Ok((record, booking))
    }

    pub async fn list_for_booking(&self, booking_id: Uuid) -> Result<Vec<PaymentRecord>> {
        // Surface NotFound for unknown bookings rather than an empty list.
        self.booking_repo
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Booking {} not found", booking_id)))?;

        self.payment_repo.list_by_booking(booking_id).await
    }
}
