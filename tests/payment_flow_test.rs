use std::sync::Arc;

use chrono::NaiveDate;
use sqlx::SqlitePool;
use uuid::Uuid;

use teesheet::{
    config::PaymentConfig,
    domain::{
        BookingPaymentStatus, CreateBookingRequest, PaymentRecordStatus, PaymentType,
    },
    error::AppError,
    notifications::{Mailer, RecordingMailer},
    payments::{FakePaymentGateway, PaymentLinkGateway},
    repository::{
        BookingRepository, PaymentRecordRepository, SqliteBookingRepository,
        SqlitePaymentRecordRepository,
    },
    service::payment_service::PaymentService,
};

struct Fixture {
    service: PaymentService,
    booking_repo: Arc<SqliteBookingRepository>,
    payment_repo: Arc<SqlitePaymentRecordRepository>,
    mailer: Arc<RecordingMailer>,
}

async fn setup() -> anyhow::Result<Fixture> {
    let pool = SqlitePool::connect(":memory:").await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    let booking_repo = Arc::new(SqliteBookingRepository::new(pool.clone()));
    let payment_repo = Arc::new(SqlitePaymentRecordRepository::new(pool.clone()));
    let gateway: Arc<dyn PaymentLinkGateway> = Arc::new(FakePaymentGateway::new());
    let mailer = Arc::new(RecordingMailer::new());

    let service = PaymentService::new(
        payment_repo.clone(),
        booking_repo.clone(),
        Some(gateway),
        mailer.clone() as Arc<dyn Mailer>,
        PaymentConfig::default(),
    );

    Ok(Fixture {
        service,
        booking_repo,
        payment_repo,
        mailer,
    })
}

async fn create_booking(
    fixture: &Fixture,
    total_cents: i64,
    is_tour_operator: bool,
) -> anyhow::Result<Uuid> {
    let booking = fixture
        .booking_repo
        .create(CreateBookingRequest {
            guest_email: "guest@example.com".to_string(),
            guest_name: "Test Guest".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 9, 20).expect("valid date"),
            tee_time: Some("10:20 AM".to_string()),
            players: 4,
            total_cents,
            currency: "EUR".to_string(),
            club: "island".to_string(),
            is_tour_operator,
            deposit_percentage: None,
            note: None,
        })
        .await?;
    Ok(booking.id)
}

async fn correlation_id(fixture: &Fixture, payment_id: &str) -> anyhow::Result<String> {
    let record = fixture
        .payment_repo
        .find_by_payment_id(payment_id)
        .await?
        .expect("record exists");
    Ok(record.checkout_session_id.expect("session id set"))
}

#[tokio::test]
async fn test_tour_operator_deposit_flow() -> anyhow::Result<()> {
    let fixture = setup().await?;

    // booking total 500.00 with the Tour Operator flag: deposit is 250.00
    let booking_id = create_booking(&fixture, 50_000, true).await?;

    let created = fixture
        .service
        .create_payment_request(booking_id, PaymentType::Deposit, "staff", None)
        .await?;
    assert_eq!(created.amount_cents, 25_000);

    // a pending request already shows up on the booking
    let booking = fixture.booking_repo.find_by_id(booking_id).await?.expect("booking");
    assert_eq!(booking.payment_status, BookingPaymentStatus::Pending);

    // guest got the link
    let sent = fixture.mailer.sent.lock().expect("mailer lock");
    assert_eq!(sent.len(), 1);
    assert!(sent[0].body.contains(&created.url));
    assert!(sent[0].body.contains("EUR 250.00"));
    drop(sent);

    // processor reports the payment
    let correlation = correlation_id(&fixture, &created.payment_id).await?;
    let (record, booking) = fixture
        .service
        .apply_status_update(&correlation, PaymentRecordStatus::Paid, None)
        .await?;
    assert_eq!(record.status, PaymentRecordStatus::Paid);
    assert!(record.received_at.is_some());
    assert_eq!(booking.payment_status, BookingPaymentStatus::DepositPaid);
    assert_eq!(booking.total_paid_cents, 25_000);

    Ok(())
}

#[tokio::test]
async fn test_default_deposit_percentage() -> anyhow::Result<()> {
    let fixture = setup().await?;

    // non-operator booking of 200.00 at the default 20%: deposit is 40.00
    let booking_id = create_booking(&fixture, 20_000, false).await?;

    let created = fixture
        .service
        .create_payment_request(booking_id, PaymentType::Deposit, "staff", None)
        .await?;
    assert_eq!(created.amount_cents, 4_000);

    Ok(())
}

#[tokio::test]
async fn test_full_payment_flow() -> anyhow::Result<()> {
    let fixture = setup().await?;
    let booking_id = create_booking(&fixture, 30_000, false).await?;

    let created = fixture
        .service
        .create_payment_request(booking_id, PaymentType::Full, "staff", None)
        .await?;
    assert_eq!(created.amount_cents, 30_000);

    let correlation = correlation_id(&fixture, &created.payment_id).await?;
    let (_, booking) = fixture
        .service
        .apply_status_update(&correlation, PaymentRecordStatus::Paid, None)
        .await?;
    assert_eq!(booking.payment_status, BookingPaymentStatus::FullyPaid);
    assert_eq!(booking.total_paid_cents, 30_000);

    Ok(())
}

#[tokio::test]
async fn test_invalid_transitions() -> anyhow::Result<()> {
    let fixture = setup().await?;
    let booking_id = create_booking(&fixture, 30_000, false).await?;

    let created = fixture
        .service
        .create_payment_request(booking_id, PaymentType::Deposit, "staff", None)
        .await?;
    let correlation = correlation_id(&fixture, &created.payment_id).await?;

    fixture
        .service
        .apply_status_update(&correlation, PaymentRecordStatus::Paid, None)
        .await?;

    // Paid -> Pending is a backward move
    let result = fixture
        .service
        .apply_status_update(&correlation, PaymentRecordStatus::Pending, None)
        .await;
    assert!(matches!(result, Err(AppError::InvalidTransition(_))));

    // Paid -> Paid is not a legal transition either
    let result = fixture
        .service
        .apply_status_update(&correlation, PaymentRecordStatus::Paid, None)
        .await;
    assert!(matches!(result, Err(AppError::InvalidTransition(_))));

    // unknown correlation id
    let result = fixture
        .service
        .apply_status_update("cs_missing", PaymentRecordStatus::Paid, None)
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));

    Ok(())
}

#[tokio::test]
async fn test_failed_payment_allows_retry() -> anyhow::Result<()> {
    let fixture = setup().await?;
    let booking_id = create_booking(&fixture, 30_000, false).await?;

    let first = fixture
        .service
        .create_payment_request(booking_id, PaymentType::Deposit, "staff", None)
        .await?;
    let correlation = correlation_id(&fixture, &first.payment_id).await?;

    let (_, booking) = fixture
        .service
        .apply_status_update(&correlation, PaymentRecordStatus::Failed, None)
        .await?;
    assert_eq!(booking.payment_status, BookingPaymentStatus::Failed);

    // a retry puts the booking back to Pending
    let second = fixture
        .service
        .create_payment_request(booking_id, PaymentType::Deposit, "staff", None)
        .await?;
    assert_ne!(second.payment_id, first.payment_id);

    let booking = fixture.booking_repo.find_by_id(booking_id).await?.expect("booking");
    assert_eq!(booking.payment_status, BookingPaymentStatus::Pending);

    Ok(())
}

#[tokio::test]
async fn test_expired_rolls_up_as_failed() -> anyhow::Result<()> {
    let fixture = setup().await?;
    let booking_id = create_booking(&fixture, 30_000, false).await?;

    let created = fixture
        .service
        .create_payment_request(booking_id, PaymentType::Full, "staff", None)
        .await?;
    let correlation = correlation_id(&fixture, &created.payment_id).await?;

    let (record, booking) = fixture
        .service
        .apply_status_update(&correlation, PaymentRecordStatus::Expired, None)
        .await?;
    assert_eq!(record.status, PaymentRecordStatus::Expired);
    assert_eq!(booking.payment_status, BookingPaymentStatus::Failed);

    Ok(())
}

#[tokio::test]
async fn test_refund_resets_rollup() -> anyhow::Result<()> {
    let fixture = setup().await?;
    let booking_id = create_booking(&fixture, 30_000, false).await?;

    let created = fixture
        .service
        .create_payment_request(booking_id, PaymentType::Full, "staff", None)
        .await?;
    let correlation = correlation_id(&fixture, &created.payment_id).await?;

    fixture
        .service
        .apply_status_update(&correlation, PaymentRecordStatus::Paid, None)
        .await?;

    let (record, booking) = fixture
        .service
        .apply_status_update(&correlation, PaymentRecordStatus::Refunded, None)
        .await?;
    assert_eq!(record.status, PaymentRecordStatus::Refunded);
    assert_eq!(booking.payment_status, BookingPaymentStatus::NotRequested);
    assert_eq!(booking.total_paid_cents, 0);

    Ok(())
}

#[tokio::test]
async fn test_invalid_amount_rejected() -> anyhow::Result<()> {
    let fixture = setup().await?;
    let booking_id = create_booking(&fixture, 0, false).await?;

    let result = fixture
        .service
        .create_payment_request(booking_id, PaymentType::Deposit, "staff", None)
        .await;
    assert!(matches!(result, Err(AppError::InvalidAmount(_))));

    // no record was written
    let records = fixture.payment_repo.list_by_booking(booking_id).await?;
    assert!(records.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_unknown_booking_is_not_found() -> anyhow::Result<()> {
    let fixture = setup().await?;

    let result = fixture
        .service
        .create_payment_request(Uuid::new_v4(), PaymentType::Full, "staff", None)
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));

    Ok(())
}

#[tokio::test]
async fn test_missing_gateway_reported() -> anyhow::Result<()> {
    let fixture = setup().await?;
    let booking_id = create_booking(&fixture, 30_000, false).await?;

    let service = PaymentService::new(
        fixture.payment_repo.clone(),
        fixture.booking_repo.clone(),
        None,
        fixture.mailer.clone() as Arc<dyn Mailer>,
        PaymentConfig::default(),
    );

    let result = service
        .create_payment_request(booking_id, PaymentType::Full, "staff", None)
        .await;
    assert!(matches!(result, Err(AppError::PaymentLink(_))));

    Ok(())
}

#[tokio::test]
async fn test_deleting_booking_cascades_to_records() -> anyhow::Result<()> {
    let fixture = setup().await?;
    let booking_id = create_booking(&fixture, 30_000, false).await?;

    fixture
        .service
        .create_payment_request(booking_id, PaymentType::Deposit, "staff", None)
        .await?;
    assert_eq!(
        fixture.payment_repo.list_by_booking(booking_id).await?.len(),
        1
    );

    fixture.booking_repo.delete(booking_id).await?;

    let records = fixture.payment_repo.list_by_booking(booking_id).await?;
    assert!(records.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_paid_amount_override() -> anyhow::Result<()> {
    let fixture = setup().await?;
    let booking_id = create_booking(&fixture, 30_000, false).await?;

    let created = fixture
        .service
        .create_payment_request(booking_id, PaymentType::Deposit, "staff", None)
        .await?;
    let correlation = correlation_id(&fixture, &created.payment_id).await?;

    // processor captured a different amount; its figure wins
    let (record, booking) = fixture
        .service
        .apply_status_update(&correlation, PaymentRecordStatus::Paid, Some(6_500))
        .await?;
    assert_eq!(record.amount_cents, 6_500);
    assert_eq!(booking.total_paid_cents, 6_500);

    Ok(())
}
