use std::sync::Arc;

use axum::Extension;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use klinik_core::Principal;

use crate::dto::{GoogleLoginRequest, LoginRequest, RegisterRequest, TokenResponse, UserResponse};
use crate::error::{ApiError, ApiJson};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = TokenResponse),
        (status = 400, description = "Invalid input", body = crate::dto::ErrorResponse),
        (status = 403, description = "Admin accounts cannot self-register", body = crate::dto::ErrorResponse),
        (status = 409, description = "Email already registered", body = crate::dto::ErrorResponse),
    ),
    tag = "auth"
)]
pub async fn register(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state.auth().register(body.into_registration()?).await?;
    Ok((StatusCode::CREATED, axum::Json(TokenResponse::from(session))))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = TokenResponse),
        (status = 401, description = "Invalid credentials", body = crate::dto::ErrorResponse),
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state.auth().login(&body.email, &body.password).await?;
    Ok(axum::Json(TokenResponse::from(session)))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/google",
    request_body = GoogleLoginRequest,
    responses(
        (status = 200, description = "Signed in with Google", body = TokenResponse),
        (status = 401, description = "Token rejected", body = crate::dto::ErrorResponse),
        (status = 403, description = "Google sign-in not configured", body = crate::dto::ErrorResponse),
        (status = 502, description = "Google unreachable", body = crate::dto::ErrorResponse),
    ),
    tag = "auth"
)]
pub async fn google(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<GoogleLoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state.auth().google(body.id_token.trim()).await?;
    Ok(axum::Json(TokenResponse::from(session)))
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses(
        (status = 200, description = "The signed-in user", body = UserResponse),
        (status = 401, description = "Unauthorized", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "auth"
)]
pub async fn me(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Principal>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.auth().me(&caller).await?;
    Ok(axum::Json(UserResponse::from(user)))
}
