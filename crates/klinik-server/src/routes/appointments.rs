use std::sync::Arc;

use axum::Extension;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use uuid::Uuid;

use klinik_core::Principal;
use klinik_core::models::{AppointmentUpdate, NewAppointment};

use crate::dto::{
    AppointmentListQuery, AppointmentResponse, AppointmentStatusRequest, CreateAppointmentRequest,
    PageResponse, UpdateAppointmentRequest,
};
use crate::error::{ApiError, ApiJson};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/v1/facilities/{facility_id}/appointments",
    params(("facility_id" = Uuid, Path, description = "Facility ID"), AppointmentListQuery),
    responses(
        (status = 200, description = "Appointments in schedule order", body = PageResponse<AppointmentResponse>),
        (status = 400, description = "Unknown status filter", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "appointments"
)]
pub async fn list_appointments(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Principal>,
    Path(facility_id): Path<Uuid>,
    Query(query): Query<AppointmentListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = query.filter()?;
    let page = state
        .appointments()
        .list(&caller, facility_id, &filter, query.page_request())
        .await?;
    Ok(axum::Json(PageResponse::<AppointmentResponse>::from_page(page)))
}

#[utoipa::path(
    post,
    path = "/api/v1/facilities/{facility_id}/appointments",
    params(("facility_id" = Uuid, Path, description = "Facility ID")),
    request_body = CreateAppointmentRequest,
    responses(
        (status = 201, description = "Appointment scheduled", body = AppointmentResponse),
        (status = 400, description = "Invalid input", body = crate::dto::ErrorResponse),
        (status = 404, description = "Patient not found", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "appointments"
)]
pub async fn create_appointment(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Principal>,
    Path(facility_id): Path<Uuid>,
    ApiJson(body): ApiJson<CreateAppointmentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let input = NewAppointment::from(body);
    let appointment = state
        .appointments()
        .create(&caller, facility_id, &input)
        .await?;
    Ok((StatusCode::CREATED, axum::Json(AppointmentResponse::from(appointment))))
}

#[utoipa::path(
    get,
    path = "/api/v1/facilities/{facility_id}/appointments/{appointment_id}",
    params(
        ("facility_id" = Uuid, Path, description = "Facility ID"),
        ("appointment_id" = Uuid, Path, description = "Appointment ID"),
    ),
    responses(
        (status = 200, description = "Appointment", body = AppointmentResponse),
        (status = 404, description = "Not found", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "appointments"
)]
pub async fn get_appointment(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Principal>,
    Path((facility_id, appointment_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let appointment = state
        .appointments()
        .get(&caller, facility_id, appointment_id)
        .await?;
    Ok(axum::Json(AppointmentResponse::from(appointment)))
}

#[utoipa::path(
    put,
    path = "/api/v1/facilities/{facility_id}/appointments/{appointment_id}",
    params(
        ("facility_id" = Uuid, Path, description = "Facility ID"),
        ("appointment_id" = Uuid, Path, description = "Appointment ID"),
    ),
    request_body = UpdateAppointmentRequest,
    responses(
        (status = 200, description = "Updated appointment", body = AppointmentResponse),
        (status = 404, description = "Not found", body = crate::dto::ErrorResponse),
        (status = 409, description = "Appointment already closed", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "appointments"
)]
pub async fn update_appointment(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Principal>,
    Path((facility_id, appointment_id)): Path<(Uuid, Uuid)>,
    ApiJson(body): ApiJson<UpdateAppointmentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let update = AppointmentUpdate::from(body);
    let appointment = state
        .appointments()
        .update(&caller, facility_id, appointment_id, &update)
        .await?;
    Ok(axum::Json(AppointmentResponse::from(appointment)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/facilities/{facility_id}/appointments/{appointment_id}",
    params(
        ("facility_id" = Uuid, Path, description = "Facility ID"),
        ("appointment_id" = Uuid, Path, description = "Appointment ID"),
    ),
    responses(
        (status = 204, description = "Appointment and its clinical records deleted"),
        (status = 404, description = "Not found", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "appointments"
)]
pub async fn delete_appointment(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Principal>,
    Path((facility_id, appointment_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .appointments()
        .delete(&caller, facility_id, appointment_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/v1/facilities/{facility_id}/appointments/{appointment_id}/status",
    params(
        ("facility_id" = Uuid, Path, description = "Facility ID"),
        ("appointment_id" = Uuid, Path, description = "Appointment ID"),
    ),
    request_body = AppointmentStatusRequest,
    responses(
        (status = 200, description = "Status changed", body = AppointmentResponse),
        (status = 400, description = "Unknown status", body = crate::dto::ErrorResponse),
        (status = 409, description = "Transition not allowed", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "appointments"
)]
pub async fn change_status(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Principal>,
    Path((facility_id, appointment_id)): Path<(Uuid, Uuid)>,
    ApiJson(body): ApiJson<AppointmentStatusRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let appointment = state
        .appointments()
        .change_status(&caller, facility_id, appointment_id, body.status()?)
        .await?;
    Ok(axum::Json(AppointmentResponse::from(appointment)))
}
