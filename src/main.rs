mod api;
mod config;
mod domain;
mod error;
mod notifications;
mod payments;
mod repository;
mod service;

use std::sync::Arc;

use sqlx::sqlite::SqlitePoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    config::Settings,
    notifications::{Mailer, NoopMailer, SmtpMailer},
    payments::{PaymentLinkGateway, StripeGateway},
    service::ServiceContext,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "teesheet=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let settings = Settings::new().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config: {}. Using defaults.", e);
        Settings::default()
    });

    tracing::info!(
        "Starting Teesheet server on {}:{}",
        settings.server.host,
        settings.server.port
    );

    // Initialize database
    let db_pool = SqlitePoolOptions::new()
        .max_connections(settings.database.max_connections)
        .connect(&settings.database.url)
        .await?;

    // Run migrations
    sqlx::migrate!("./migrations").run(&db_pool).await?;

    // Initialize repositories
    let waitlist_repo = Arc::new(repository::SqliteWaitlistRepository::new(db_pool.clone()));
    let booking_repo = Arc::new(repository::SqliteBookingRepository::new(db_pool.clone()));
    let payment_repo = Arc::new(repository::SqlitePaymentRecordRepository::new(
        db_pool.clone(),
    ));

    // Initialize Stripe gateway if configured
    let gateway: Option<Arc<dyn PaymentLinkGateway>> = if settings.stripe.enabled {
        if let Some(api_key) = settings.stripe.secret_key.clone() {
            tracing::info!("Stripe payment links enabled");
            Some(Arc::new(StripeGateway::new(
                api_key,
                &settings.server.base_url,
            )))
        } else {
            tracing::warn!("Stripe enabled but missing secret key");
            None
        }
    } else {
        tracing::info!("Stripe payment links disabled");
        None
    };

    // Initialize outbound email
    let mailer: Arc<dyn Mailer> = match SmtpMailer::from_config(&settings.email) {
        Some(Ok(mailer)) => {
            tracing::info!("Outbound email enabled");
            Arc::new(mailer)
        }
        Some(Err(e)) => {
            tracing::warn!("SMTP setup failed: {:?}. Email disabled.", e);
            Arc::new(NoopMailer)
        }
        None => Arc::new(NoopMailer),
    };

    // Create service context
    let service_context = Arc::new(ServiceContext::new(
        waitlist_repo,
        booking_repo,
        payment_repo,
        gateway,
        mailer,
        settings.payments.clone(),
        db_pool.clone(),
    ));

    let app = api::create_app(service_context, Arc::new(settings.clone()));

    let listener = tokio::net::TcpListener::bind(format!(
        "{}:{}",
        settings.server.host, settings.server.port
    ))
    .await?;

    tracing::info!(
        "Server listening on http://{}:{}",
        settings.server.host,
        settings.server.port
    );

    axum::serve(listener, app).await?;

    Ok(())
}
