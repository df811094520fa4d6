use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    api::state::AppState,
    domain::{CreateWaitlistRequest, UpdateWaitlistRequest, WaitlistEntry, WaitlistStatus},
    error::{AppError, Result},
};

#[derive(Debug, Deserialize, Validate)]
pub struct AddWaitlistDto {
    #[validate(email)]
    guest_email: String,
    #[serde(default)]
    guest_name: String,
    requested_date: NaiveDate,
    #[serde(default = "default_flexible")]
    preferred_time: String,
    #[serde(default = "default_flexible")]
    time_flexibility: String,
    #[serde(default = "default_players")]
    #[validate(range(min = 1))]
    players: i64,
    #[serde(default)]
    golf_course: String,
    #[validate(length(min = 1))]
    club: String,
    #[serde(default = "default_priority")]
    #[validate(range(min = 1, max = 10))]
    priority: i64,
    #[serde(default)]
    notes: Option<String>,
    #[serde(default = "default_true")]
    opt_in_confirmed: bool,
    #[serde(default)]
    original_booking_request: Option<String>,
}

fn default_flexible() -> String {
    "Flexible".to_string()
}

fn default_players() -> i64 {
    1
}

fn default_priority() -> i64 {
    5
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Serialize)]
pub struct AddWaitlistResponse {
    success: bool,
    message: String,
    waitlist_id: String,
    created_at: String,
}

#[derive(Debug, Serialize)]
pub struct WaitlistEntryDto {
    waitlist_id: String,
    guest_email: String,
    guest_name: String,
    requested_date: NaiveDate,
    preferred_time: String,
    time_flexibility: String,
    players: i64,
    golf_course: String,
    club: String,
    status: WaitlistStatus,
    priority: i64,
    notes: Option<String>,
    notification_sent: bool,
    notification_sent_at: Option<String>,
    created_at: String,
}

impl From<WaitlistEntry> for WaitlistEntryDto {
    fn from(entry: WaitlistEntry) -> Self {
        Self {
            waitlist_id: entry.waitlist_id,
            guest_email: entry.guest_email,
            guest_name: entry.guest_name,
            requested_date: entry.requested_date,
            preferred_time: entry.preferred_time,
            time_flexibility: entry.time_flexibility,
            players: entry.players,
            golf_course: entry.golf_course,
            club: entry.club,
            status: entry.status,
            priority: entry.priority,
            notes: entry.notes,
            notification_sent: entry.notification_sent,
            notification_sent_at: entry.notification_sent_at.map(|dt| dt.to_rfc3339()),
            created_at: entry.created_at.to_rfc3339(),
        }
    }
}

pub async fn add(
    State(state): State<AppState>,
    Json(dto): Json<AddWaitlistDto>,
) -> Result<(StatusCode, Json<AddWaitlistResponse>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let request = CreateWaitlistRequest {
        guest_email: dto.guest_email,
        guest_name: dto.guest_name,
        requested_date: dto.requested_date,
        preferred_time: dto.preferred_time,
        time_flexibility: dto.time_flexibility,
        players: dto.players,
        golf_course: dto.golf_course,
        club: dto.club,
        priority: dto.priority,
        notes: dto.notes,
        source: "email_bot".to_string(),
        opt_in_confirmed: dto.opt_in_confirmed,
        original_booking_request: dto.original_booking_request,
    };

    let entry = state.service_context.waitlist_service.add(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(AddWaitlistResponse {
            success: true,
            message: "Customer added to waitlist".to_string(),
            waitlist_id: entry.waitlist_id,
            created_at: entry.created_at.to_rfc3339(),
        }),
    ))
}

#[derive(Debug, Deserialize)]
pub struct CheckParams {
    email: String,
    club: String,
    date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct CheckResponse {
    on_waitlist: bool,
    count: usize,
    entries: Vec<WaitlistEntryDto>,
}

pub async fn check(
    State(state): State<AppState>,
    Query(params): Query<CheckParams>,
) -> Result<Json<CheckResponse>> {
    let entries = state
        .service_context
        .waitlist_service
        .check(&params.email, &params.club, params.date)
        .await?;

    let entries: Vec<WaitlistEntryDto> = entries.into_iter().map(Into::into).collect();

    Ok(Json(CheckResponse {
        on_waitlist: !entries.is_empty(),
        count: entries.len(),
        entries,
    }))
}

#[derive(Debug, Deserialize)]
pub struct UpdateWaitlistDto {
    status: Option<WaitlistStatus>,
    notes: Option<String>,
    notification_sent: Option<bool>,
}

pub async fn update(
    State(state): State<AppState>,
    Path(waitlist_id): Path<String>,
    Json(dto): Json<UpdateWaitlistDto>,
) -> Result<Json<WaitlistEntryDto>> {
    let update = UpdateWaitlistRequest {
        status: dto.status,
        notes: dto.notes,
        notification_sent: dto.notification_sent,
    };

    let entry = state
        .service_context
        .waitlist_service
        .update(&waitlist_id, update)
        .await?;

    Ok(Json(entry.into()))
}

#[derive(Debug, Serialize)]
pub struct RemoveResponse {
    success: bool,
    message: String,
    waitlist_id: String,
}

pub async fn remove(
    State(state): State<AppState>,
    Path(waitlist_id): Path<String>,
) -> Result<Json<RemoveResponse>> {
    state
        .service_context
        .waitlist_service
        .remove(&waitlist_id)
        .await?;

    Ok(Json(RemoveResponse {
        success: true,
        message: "Waitlist entry removed".to_string(),
        waitlist_id,
    }))
}

#[derive(Debug, Deserialize)]
pub struct MatchesParams {
    date: NaiveDate,
    club: String,
    time: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MatchesResponse {
    available_date: NaiveDate,
    available_time: Option<String>,
    matches_found: usize,
    matches: Vec<WaitlistEntryDto>,
}

pub async fn matches(
    State(state): State<AppState>,
    Query(params): Query<MatchesParams>,
) -> Result<Json<MatchesResponse>> {
    let matches = state
        .service_context
        .waitlist_service
        .matches(params.date, &params.club)
        .await?;

    let matches: Vec<WaitlistEntryDto> = matches.into_iter().map(Into::into).collect();

    Ok(Json(MatchesResponse {
        available_date: params.date,
        available_time: params.time,
        matches_found: matches.len(),
        matches,
    }))
}
