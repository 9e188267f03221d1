use std::sync::Arc;

use axum::Extension;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use uuid::Uuid;

use klinik_core::Principal;

use crate::dto::{
    CreateEncounterRequest, EncounterListQuery, EncounterResponse, UpdateEncounterRequest,
};
use crate::error::{ApiError, ApiJson};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/v1/facilities/{facility_id}/appointments/{appointment_id}/encounters",
    params(
        ("facility_id" = Uuid, Path, description = "Facility ID"),
        ("appointment_id" = Uuid, Path, description = "Appointment ID"),
        EncounterListQuery,
    ),
    responses(
        (status = 200, description = "Specialty encounters, oldest first", body = Vec<EncounterResponse>),
        (status = 400, description = "Unknown kind", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "encounters"
)]
pub async fn list_encounters(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Principal>,
    Path((facility_id, appointment_id)): Path<(Uuid, Uuid)>,
    Query(query): Query<EncounterListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let encounters = state
        .encounters()
        .list(&caller, facility_id, appointment_id, query.kind()?)
        .await?;
    let body: Vec<EncounterResponse> = encounters.into_iter().map(Into::into).collect();
    Ok(axum::Json(body))
}

/// Record one specialty encounter. `data` is validated against the
/// schema of `kind`.
#[utoipa::path(
    post,
    path = "/api/v1/facilities/{facility_id}/appointments/{appointment_id}/encounters",
    params(
        ("facility_id" = Uuid, Path, description = "Facility ID"),
        ("appointment_id" = Uuid, Path, description = "Appointment ID"),
    ),
    request_body = CreateEncounterRequest,
    responses(
        (status = 201, description = "Encounter recorded", body = EncounterResponse),
        (status = 400, description = "Payload does not match the kind", body = crate::dto::ErrorResponse),
        (status = 404, description = "No medical record for the appointment", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "encounters"
)]
pub async fn create_encounter(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Principal>,
    Path((facility_id, appointment_id)): Path<(Uuid, Uuid)>,
    ApiJson(body): ApiJson<CreateEncounterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let kind = body.kind()?;
    let encounter = state
        .encounters()
        .create(&caller, facility_id, appointment_id, kind, body.data)
        .await?;
    Ok((StatusCode::CREATED, axum::Json(EncounterResponse::from(encounter))))
}

#[utoipa::path(
    get,
    path = "/api/v1/facilities/{facility_id}/appointments/{appointment_id}/encounters/{encounter_id}",
    params(
        ("facility_id" = Uuid, Path, description = "Facility ID"),
        ("appointment_id" = Uuid, Path, description = "Appointment ID"),
        ("encounter_id" = Uuid, Path, description = "Encounter ID"),
    ),
    responses(
        (status = 200, description = "Encounter", body = EncounterResponse),
        (status = 404, description = "Not found", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "encounters"
)]
pub async fn get_encounter(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Principal>,
    Path((facility_id, appointment_id, encounter_id)): Path<(Uuid, Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let encounter = state
        .encounters()
        .get(&caller, facility_id, appointment_id, encounter_id)
        .await?;
    Ok(axum::Json(EncounterResponse::from(encounter)))
}

/// Shallow-merge `data` over the stored payload.
#[utoipa::path(
    put,
    path = "/api/v1/facilities/{facility_id}/appointments/{appointment_id}/encounters/{encounter_id}",
    params(
        ("facility_id" = Uuid, Path, description = "Facility ID"),
        ("appointment_id" = Uuid, Path, description = "Appointment ID"),
        ("encounter_id" = Uuid, Path, description = "Encounter ID"),
    ),
    request_body = UpdateEncounterRequest,
    responses(
        (status = 200, description = "Updated encounter", body = EncounterResponse),
        (status = 400, description = "Merged payload invalid", body = crate::dto::ErrorResponse),
        (status = 404, description = "Not found", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "encounters"
)]
pub async fn update_encounter(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Principal>,
    Path((facility_id, appointment_id, encounter_id)): Path<(Uuid, Uuid, Uuid)>,
    ApiJson(body): ApiJson<UpdateEncounterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let encounter = state
        .encounters()
        .update(&caller, facility_id, appointment_id, encounter_id, body.data)
        .await?;
    Ok(axum::Json(EncounterResponse::from(encounter)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/facilities/{facility_id}/appointments/{appointment_id}/encounters/{encounter_id}",
    params(
        ("facility_id" = Uuid, Path, description = "Facility ID"),
        ("appointment_id" = Uuid, Path, description = "Appointment ID"),
        ("encounter_id" = Uuid, Path, description = "Encounter ID"),
    ),
    responses(
        (status = 204, description = "Encounter deleted"),
        (status = 404, description = "Not found", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "encounters"
)]
pub async fn delete_encounter(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Principal>,
    Path((facility_id, appointment_id, encounter_id)): Path<(Uuid, Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .encounters()
        .delete(&caller, facility_id, appointment_id, encounter_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
