use std::sync::Arc;

use axum::Extension;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use uuid::Uuid;

use klinik_core::Principal;

use crate::dto::{
    CreateFacilityRequest, DashboardQuery, DashboardResponse, FacilityResponse, PageQuery,
    PageResponse, UpdateFacilityRequest,
};
use crate::error::{ApiError, ApiJson};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/v1/facilities",
    params(PageQuery),
    responses(
        (status = 200, description = "Facilities visible to the caller", body = PageResponse<FacilityResponse>),
    ),
    security(("bearer" = [])),
    tag = "facilities"
)]
pub async fn list_facilities(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Principal>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = state.facilities().list(&caller, query.request()).await?;
    Ok(axum::Json(PageResponse::<FacilityResponse>::from_page(page)))
}

#[utoipa::path(
    post,
    path = "/api/v1/facilities",
    request_body = CreateFacilityRequest,
    responses(
        (status = 201, description = "Facility created", body = FacilityResponse),
        (status = 400, description = "Invalid input", body = crate::dto::ErrorResponse),
        (status = 403, description = "Admins only", body = crate::dto::ErrorResponse),
        (status = 409, description = "Code already used", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "facilities"
)]
pub async fn create_facility(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Principal>,
    ApiJson(body): ApiJson<CreateFacilityRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let facility = state.facilities().create(&caller, &body.into_input()?).await?;
    Ok((StatusCode::CREATED, axum::Json(FacilityResponse::from(facility))))
}

#[utoipa::path(
    get,
    path = "/api/v1/facilities/{facility_id}",
    params(("facility_id" = Uuid, Path, description = "Facility ID")),
    responses(
        (status = 200, description = "Facility", body = FacilityResponse),
        (status = 404, description = "Not found", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "facilities"
)]
pub async fn get_facility(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Principal>,
    Path(facility_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let facility = state.facilities().get(&caller, facility_id).await?;
    Ok(axum::Json(FacilityResponse::from(facility)))
}

#[utoipa::path(
    put,
    path = "/api/v1/facilities/{facility_id}",
    params(("facility_id" = Uuid, Path, description = "Facility ID")),
    request_body = UpdateFacilityRequest,
    responses(
        (status = 200, description = "Updated facility", body = FacilityResponse),
        (status = 404, description = "Not found", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "facilities"
)]
pub async fn update_facility(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Principal>,
    Path(facility_id): Path<Uuid>,
    ApiJson(body): ApiJson<UpdateFacilityRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let facility = state
        .facilities()
        .update(&caller, facility_id, &body.into_update()?)
        .await?;
    Ok(axum::Json(FacilityResponse::from(facility)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/facilities/{facility_id}",
    params(("facility_id" = Uuid, Path, description = "Facility ID")),
    responses(
        (status = 204, description = "Facility and everything it owns deleted"),
        (status = 404, description = "Not found", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "facilities"
)]
pub async fn delete_facility(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Principal>,
    Path(facility_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.facilities().delete(&caller, facility_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/v1/facilities/{facility_id}/dashboard",
    params(("facility_id" = Uuid, Path, description = "Facility ID"), DashboardQuery),
    responses(
        (status = 200, description = "Role-shaped daily summary", body = DashboardResponse),
        (status = 403, description = "Other facility", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "dashboard"
)]
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Principal>,
    Path(facility_id): Path<Uuid>,
    Query(query): Query<DashboardQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let dashboard = state.dashboard().get(&caller, facility_id, query.date).await?;
    Ok(axum::Json(DashboardResponse::from(dashboard)))
}
