pub mod booking_service;
pub mod payment_service;
pub mod waitlist_service;

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::PaymentConfig;
use crate::notifications::Mailer;
use crate::payments::PaymentLinkGateway;
use crate::repository::*;

use booking_service::BookingService;
use payment_service::PaymentService;
use waitlist_service::WaitlistService;

pub use payment_service::CreatedPaymentRequest;

pub struct ServiceContext {
    pub waitlist_repo: Arc<dyn WaitlistRepository>,
    pub booking_repo: Arc<dyn BookingRepository>,
    pub payment_repo: Arc<dyn PaymentRecordRepository>,
    pub waitlist_service: Arc<WaitlistService>,
    pub booking_service: Arc<BookingService>,
    pub payment_service: Arc<PaymentService>,
    pub db_pool: SqlitePool,
}

impl ServiceContext {
    pub fn new(
        waitlist_repo: Arc<dyn WaitlistRepository>,
        booking_repo: Arc<dyn BookingRepository>,
        payment_repo: Arc<dyn PaymentRecordRepository>,
        gateway: Option<Arc<dyn PaymentLinkGateway>>,
        mailer: Arc<dyn Mailer>,
        payment_config: PaymentConfig,
        db_pool: SqlitePool,
    ) -> Self {
        let waitlist_service = Arc::new(WaitlistService::new(waitlist_repo.clone()));
        let booking_service = Arc::new(BookingService::new(booking_repo.clone()));
        let payment_service = Arc::new(PaymentService::new(
            payment_repo.clone(),
            booking_repo.clone(),
            gateway,
            mailer,
            payment_config,
        ));

        Self {
            waitlist_repo,
            booking_repo,
            payment_repo,
            waitlist_service,
            booking_service,
            payment_service,
            db_pool,
        }
    }
}
