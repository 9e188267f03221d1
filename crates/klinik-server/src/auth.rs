use std::sync::Arc;

use axum::extract::State;
use axum::http::Request;
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use klinik_core::AppError;

use crate::error::ApiError;
use crate::state::AppState;

/// Middleware that validates `Authorization: Bearer <jwt>` and stores the
/// caller's [`klinik_core::Principal`] in the request extensions. Role and
/// facility come from the stored account, not from the token claims.
pub async fn require_bearer(
    State(state): State<Arc<AppState>>,
    mut request: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .map(str::trim);

    let Some(token) = token.filter(|t| !t.is_empty()) else {
        return ApiError(AppError::Unauthorized(
            "Missing or invalid Authorization header. Expected: Bearer <token>".into(),
        ))
        .into_response();
    };

    match state.auth().authenticate(token).await {
        Ok(principal) => {
            request.extensions_mut().insert(principal);
            next.run(request).await
        }
        Err(e) => {
            tracing::warn!(path = %request.uri().path(), "Rejected bearer token");
            ApiError(e).into_response()
        }
    }
}
