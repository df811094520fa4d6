use async_trait::async_trait;

use crate::error::Result;

pub mod stripe_gateway;

pub use stripe_gateway::StripeGateway;

/// What the core hands the external processor to mint a payment link.
#[derive(Debug, Clone)]
pub struct PaymentLinkRequest {
    pub amount_cents: i64,
    pub currency: String,
    pub description: String,
    /// Our payment id, echoed back through processor metadata.
    pub reference: String,
    pub guest_email: String,
}

/// What the processor gives back: an opaque correlation id and a URL the
/// guest can be sent to.
#[derive(Debug, Clone)]
pub struct PaymentLink {
    pub link_id: String,
    pub checkout_session_id: Option<String>,
    pub url: String,
}

#[async_trait]
pub trait PaymentLinkGateway: Send + Sync {
    async fn create_payment_link(&self, request: PaymentLinkRequest) -> Result<PaymentLink>;
}

/// In-memory stand-in for the Stripe gateway, used by integration tests.
#[cfg(any(test, feature = "test-utils"))]
pub struct FakePaymentGateway {
    counter: std::sync::atomic::AtomicU64,
}

#[cfg(any(test, feature = "test-utils"))]
impl FakePaymentGateway {
    pub fn new() -> Self {
        Self {
            counter: std::sync::atomic::AtomicU64::new(0),
        }
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl Default for FakePaymentGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl PaymentLinkGateway for FakePaymentGateway {
    async fn create_payment_link(&self, request: PaymentLinkRequest) -> Result<PaymentLink> {
        let n = self
            .counter
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        let session_id = format!("cs_test_{:06}", n);
        Ok(PaymentLink {
            link_id: format!("plink_test_{:06}", n),
            checkout_session_id: Some(session_id.clone()),
            url: format!("https://checkout.test/pay/{}?ref={}", session_id, request.reference),
        })
    }
}
