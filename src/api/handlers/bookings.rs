use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{
    api::state::AppState,
    domain::{Booking, BookingPaymentStatus, BookingStatus, CreateBookingRequest},
    error::{AppError, Result},
};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateBookingDto {
    #[validate(email)]
    guest_email: String,
    #[serde(default)]
    guest_name: String,
    date: NaiveDate,
    #[serde(default)]
    tee_time: Option<String>,
    #[serde(default = "default_players")]
    #[validate(range(min = 1))]
    players: i64,
    total_cents: i64,
    #[serde(default)]
    currency: Option<String>,
    #[validate(length(min = 1))]
    club: String,
    #[serde(default)]
    is_tour_operator: bool,
    #[serde(default)]
    #[validate(range(min = 1, max = 100))]
    deposit_percentage: Option<i64>,
    #[serde(default)]
    note: Option<String>,
}

fn default_players() -> i64 {
    1
}

#[derive(Debug, Serialize)]
pub struct BookingDto {
    id: Uuid,
    booking_ref: String,
    guest_email: String,
    guest_name: String,
    date: NaiveDate,
    tee_time: Option<String>,
    players: i64,
    total_cents: i64,
    currency: String,
    club: String,
    status: BookingStatus,
    is_tour_operator: bool,
    deposit_percentage: Option<i64>,
    payment_status: BookingPaymentStatus,
    total_paid_cents: i64,
    created_at: String,
}

impl From<Booking> for BookingDto {
    fn from(booking: Booking) -> Self {
        Self {
            id: booking.id,
            booking_ref: booking.booking_ref,
            guest_email: booking.guest_email,
            guest_name: booking.guest_name,
            date: booking.date,
            tee_time: booking.tee_time,
            players: booking.players,
            total_cents: booking.total_cents,
            currency: booking.currency,
            club: booking.club,
            status: booking.status,
            is_tour_operator: booking.is_tour_operator,
            deposit_percentage: booking.deposit_percentage,
            payment_status: booking.payment_status,
            total_paid_cents: booking.total_paid_cents,
            created_at: booking.created_at.to_rfc3339(),
        }
    }
}

pub async fn create(
    State(state): State<AppState>,
    Json(dto): Json<CreateBookingDto>,
) -> Result<(StatusCode, Json<BookingDto>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let currency = dto
        .currency
        .unwrap_or_else(|| state.settings.payments.currency.clone());

    let request = CreateBookingRequest {
        guest_email: dto.guest_email,
        guest_name: dto.guest_name,
        date: dto.date,
        tee_time: dto.tee_time,
        players: dto.players,
        total_cents: dto.total_cents,
        currency,
        club: dto.club,
        is_tour_operator: dto.is_tour_operator,
        deposit_percentage: dto.deposit_percentage,
        note: dto.note,
    };

    let booking = state.service_context.booking_service.create(request).await?;

    Ok((StatusCode::CREATED, Json(booking.into())))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BookingDto>> {
    let booking = state.service_context.booking_service.get(id).await?;
    Ok(Json(booking.into()))
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    club: String,
    #[serde(default = "default_limit")]
    limit: i64,
    #[serde(default)]
    offset: i64,
}

fn default_limit() -> i64 {
    50
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    bookings: Vec<BookingDto>,
    total: usize,
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResponse>> {
    let bookings = state
        .service_context
        .booking_service
        .list_by_club(&params.club, params.limit, params.offset)
        .await?;

    let total = bookings.len();
    let bookings: Vec<BookingDto> = bookings.into_iter().map(Into::into).collect();

    Ok(Json(ListResponse { bookings, total }))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.service_context.booking_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusDto {
    status: BookingStatus,
    #[serde(default = "default_updated_by")]
    updated_by: String,
}

fn default_updated_by() -> String {
    "api".to_string()
}

pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(dto): Json<UpdateStatusDto>,
) -> Result<Json<BookingDto>> {
    let booking = state
        .service_context
        .booking_service
        .update_status(id, dto.status, &dto.updated_by)
        .await?;

    Ok(Json(booking.into()))
}
