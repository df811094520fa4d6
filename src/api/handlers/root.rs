use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

pub async fn root() -> impl IntoResponse {
    Json(json!({
        "name": "Teesheet API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Tee-time waitlist and booking payment service",
        "status": "operational",
        "endpoints": {
            "health": "/health",
            "waitlist": "/api/waitlist",
            "bookings": "/api/bookings",
            "payments": "/api/payments"
        }
    }))
}

pub async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "timestamp": chrono::Utc::now().to_rfc3339()
        })),
    )
}
