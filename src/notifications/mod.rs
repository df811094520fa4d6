use async_trait::async_trait;

use crate::domain::{format_amount, Booking, PaymentType};
use crate::error::Result;

pub mod smtp;

pub use smtp::SmtpMailer;

#[derive(Debug, Clone)]
pub struct OutboundEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: OutboundEmail) -> Result<()>;
}

/// Used when outbound email is disabled; logs and drops the message.
pub struct NoopMailer;

#[async_trait]
impl Mailer for NoopMailer {
    async fn send(&self, email: OutboundEmail) -> Result<()> {
        tracing::info!(
            "Email disabled, dropping message to {} ({})",
            email.to,
            email.subject
        );
        Ok(())
    }
}

/// The payment-link email forwarded to the guest after a payment request
/// is created.
pub fn payment_link_email(
    booking: &Booking,
    payment_type: &PaymentType,
    amount_cents: i64,
    url: &str,
) -> OutboundEmail {
    let amount = format_amount(amount_cents, &booking.currency);
    let (subject, what) = match payment_type {
        PaymentType::Deposit => (
            format!("Deposit request for booking {}", booking.booking_ref),
            "a deposit",
        ),
        PaymentType::Full => (
            format!("Payment request for booking {}", booking.booking_ref),
            "the full amount",
        ),
    };

    let body = format!(
        "Dear {},\n\n\
         To secure your tee time on {} for {} players, please pay {} of {}\n\
         using the secure link below:\n\n\
         {}\n\n\
         The link expires if left unused; contact us if you need a new one.\n\n\
         Kind regards,\n\
         The bookings team",
        booking.guest_name, booking.date, booking.players, what, amount, url,
    );

    OutboundEmail {
        to: booking.guest_email.clone(),
        subject,
        body,
    }
}

/// Mailer that captures what would have been sent, for tests.
#[cfg(any(test, feature = "test-utils"))]
pub struct RecordingMailer {
    pub sent: std::sync::Mutex<Vec<OutboundEmail>>,
}

#[cfg(any(test, feature = "test-utils"))]
impl RecordingMailer {
    pub fn new() -> Self {
        Self {
            sent: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl Default for RecordingMailer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: OutboundEmail) -> Result<()> {
        self.sent
            .lock()
            .map_err(|_| crate::error::AppError::Internal("mailer mutex poisoned".to_string()))?
            .push(email);
        Ok(())
    }
}
