use async_trait::async_trait;
use stripe::{
    CheckoutSession, CheckoutSessionMode, Client, CreateCheckoutSession,
    CreateCheckoutSessionLineItems, Currency,
};

use crate::{
    error::{AppError, Result},
    payments::{PaymentLink, PaymentLinkGateway, PaymentLinkRequest},
};

/// Payment links are Stripe Checkout Sessions created with inline price
/// data; the session id doubles as our correlation key.
pub struct StripeGateway {
    client: Client,
    success_url: String,
    cancel_url: String,
}

impl StripeGateway {
    pub fn new(api_key: String, base_url: &str) -> Self {
        let client = Client::new(api_key);
        Self {
            client,
            success_url: format!("{}/payments/success", base_url),
            cancel_url: format!("{}/payments/cancelled", base_url),
        }
    }
}

#[async_trait]
impl PaymentLinkGateway for StripeGateway {
    async fn create_payment_link(&self, request: PaymentLinkRequest) -> Result<PaymentLink> {
        // Stripe spells currency codes lowercase.
        let currency = request
            .currency
            .to_lowercase()
            .parse::<Currency>()
            .map_err(|_| AppError::PaymentLink(format!("Unknown currency: {}", request.currency)))?;

        let mut params = CreateCheckoutSession::new();
        params.mode = Some(CheckoutSessionMode::Payment);
        params.success_url = Some(&self.success_url);
        params.cancel_url = Some(&self.cancel_url);
        params.customer_email = Some(&request.guest_email);

        params.line_items = Some(vec![CreateCheckoutSessionLineItems {
            price_data: Some(stripe::CreateCheckoutSessionLineItemsPriceData {
                currency,
                unit_amount: Some(request.amount_cents),
                product_data: Some(stripe::CreateCheckoutSessionLineItemsPriceDataProductData {
                    name: request.description.clone(),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            quantity: Some(1),
            ..Default::default()
        }]);

        // Echo our payment id through metadata so inbound status reports
        // can be matched back.
        let mut metadata = std::collections::HashMap::new();
        metadata.insert("payment_id".to_string(), request.reference.clone());
        params.metadata = Some(metadata);
        params.client_reference_id = Some(&request.reference);

        let session = CheckoutSession::create(&self.client, params)
            .await
            .map_err(|e| AppError::PaymentLink(format!("Stripe error: {}", e)))?;

        let url = session
            .url
            .ok_or_else(|| AppError::PaymentLink("No checkout URL returned".to_string()))?;

        let session_id = session.id.to_string();
        Ok(PaymentLink {
            link_id: session_id.clone(),
            checkout_session_id: Some(session_id),
            url,
        })
    }
}
