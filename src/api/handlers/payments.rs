use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    api::state::AppState,
    domain::{BookingPaymentStatus, PaymentRecord, PaymentRecordStatus, PaymentType},
    error::Result,
};

#[derive(Debug, Deserialize)]
pub struct CreatePaymentRequestDto {
    booking_id: Uuid,
    payment_type: PaymentType,
    #[serde(default = "default_created_by")]
    created_by: String,
    #[serde(default)]
    notes: Option<String>,
}

fn default_created_by() -> String {
    "api".to_string()
}

#[derive(Debug, Serialize)]
pub struct CreatePaymentResponse {
    payment_id: String,
    url: String,
    amount_cents: i64,
    currency: String,
    status: PaymentRecordStatus,
}

pub async fn create_request(
    State(state): State<AppState>,
    Json(dto): Json<CreatePaymentRequestDto>,
) -> Result<(StatusCode, Json<CreatePaymentResponse>)> {
    let created = state
        .service_context
        .payment_service
        .create_payment_request(dto.booking_id, dto.payment_type, &dto.created_by, dto.notes)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatePaymentResponse {
            payment_id: created.payment_id,
            url: created.url,
            amount_cents: created.amount_cents,
            currency: created.currency,
            status: PaymentRecordStatus::Pending,
        }),
    ))
}

#[derive(Debug, Deserialize)]
pub struct ApplyStatusDto {
    correlation_id: String,
    status: PaymentRecordStatus,
    #[serde(default)]
    paid_amount_cents: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ApplyStatusResponse {
    payment_id: String,
    status: PaymentRecordStatus,
    booking_payment_status: BookingPaymentStatus,
    total_paid_cents: i64,
}

pub async fn apply_status(
    State(state): State<AppState>,
    Json(dto): Json<ApplyStatusDto>,
) -> Result<Json<ApplyStatusResponse>> {
    let (record, booking) = state
        .service_context
        .payment_service
        .apply_status_update(&dto.correlation_id, dto.status, dto.paid_amount_cents)
        .await?;

    Ok(Json(ApplyStatusResponse {
        payment_id: record.payment_id,
        status: record.status,
        booking_payment_status: booking.payment_status,
        total_paid_cents: booking.total_paid_cents,
    }))
}

#[derive(Debug, Serialize)]
pub struct PaymentRecordDto {
    payment_id: String,
    booking_id: Uuid,
    amount_cents: i64,
    currency: String,
    payment_type: PaymentType,
    deposit_percentage: Option<i64>,
    status: PaymentRecordStatus,
    payment_link_id: Option<String>,
    checkout_session_id: Option<String>,
    link_sent_at: Option<String>,
    received_at: Option<String>,
    created_by: String,
    created_at: String,
}

impl From<PaymentRecord> for PaymentRecordDto {
    fn from(record: PaymentRecord) -> Self {
        Self {
            payment_id: record.payment_id,
            booking_id: record.booking_id,
            amount_cents: record.amount_cents,
            currency: record.currency,
            payment_type: record.payment_type,
            deposit_percentage: record.deposit_percentage,
            status: record.status,
            payment_link_id: record.payment_link_id,
            checkout_session_id: record.checkout_session_id,
            link_sent_at: record.link_sent_at.map(|dt| dt.to_rfc3339()),
            received_at: record.received_at.map(|dt| dt.to_rfc3339()),
            created_by: record.created_by,
            created_at: record.created_at.to_rfc3339(),
        }
    }
}

pub async fn list_by_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<Vec<PaymentRecordDto>>> {
    let records = state
        .service_context
        .payment_service
        .list_for_booking(booking_id)
        .await?;

    Ok(Json(records.into_iter().map(Into::into).collect()))
}
