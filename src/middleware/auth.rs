use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::errors::{AppError, Result};
use crate::state::AppState;

/// Rejects the request unless it carries a valid admin bearer token.
/// The verified claims are placed in the request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::unauthorized("Missing bearer token"))?;

    let claims = state.tokens.verify(token).map_err(|e| {
        tracing::warn!("Rejected admin token on {}: {}", request.uri().path(), e);
        e
    })?;

    // Insert claims into request extensions
    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}
