use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use subtle::ConstantTimeEq;

use crate::{api::state::AppState, error::AppError};

/// The email bot and dashboard authenticate with a shared API key, sent
/// either as X-API-Key or as a bearer token.
pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let headers = request.headers();

    let provided = headers
        .get("x-api-key")
        .and_then(|v| v.to_str().ok())
        .or_else(|| {
            headers
                .get(AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.strip_prefix("Bearer "))
        })
        .ok_or(AppError::Unauthorized)?;

    let expected = state.settings.api.key.as_bytes();
    let provided = provided.as_bytes();

    // Constant-time comparison; length check first since ct_eq requires
    // equal-length slices.
    if expected.is_empty()
        || provided.len() != expected.len()
        || !bool::from(provided.ct_eq(expected))
    {
        return Err(AppError::Unauthorized);
    }

    Ok(next.run(request).await)
}
