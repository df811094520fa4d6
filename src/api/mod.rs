pub mod handlers;
pub mod middleware;
pub mod state;

use std::sync::Arc;

use axum::{
    routing::{delete, get, patch, post},
    Router,
};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::{config::Settings, service::ServiceContext};
use state::AppState;

pub fn create_app(service_context: Arc<ServiceContext>, settings: Arc<Settings>) -> Router {
    let app_state = AppState::new(service_context, settings);

    Router::new()
        // Root and health endpoints (no API key)
        .route("/", get(handlers::root::root))
        .route("/health", get(handlers::root::health_check))
        // API routes, all behind the shared API key
        .nest("/api", api_routes(app_state.clone()))
        // Add state to the router
        .with_state(app_state)
        // Middleware
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive()) // Configure properly for production
        .layer(TraceLayer::new_for_http())
}

fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/waitlist", waitlist_routes())
        .nest("/bookings", booking_routes())
        .nest("/payments", payment_routes())
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth::require_api_key,
        ))
}

fn waitlist_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::waitlist::add))
        .route("/check", get(handlers::waitlist::check))
        .route("/matches", get(handlers::waitlist::matches))
        .route("/:id", patch(handlers::waitlist::update))
        .route("/:id", delete(handlers::waitlist::remove))
}

fn booking_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::bookings::list))
        .route("/", post(handlers::bookings::create))
        .route("/:id", get(handlers::bookings::get))
        .route("/:id", delete(handlers::bookings::delete))
        .route("/:id/status", post(handlers::bookings::update_status))
}

fn payment_routes() -> Router<AppState> {
    Router::new()
        .route("/requests", post(handlers::payments::create_request))
        .route("/status", post(handlers::payments::apply_status))
        .route("/booking/:id", get(handlers::payments::list_by_booking))
}
