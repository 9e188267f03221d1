use std::sync::Arc;

use axum::Extension;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use uuid::Uuid;

use klinik_core::models::MedicalHistoryEntry;
use klinik_core::{AppError, Principal};

use crate::dto::{
    CreatePatientRequest, MedicalHistoryResponse, PageResponse, PatientListQuery, PatientResponse,
    UpdatePatientRequest,
};
use crate::error::{ApiError, ApiJson};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/v1/facilities/{facility_id}/patients",
    params(("facility_id" = Uuid, Path, description = "Facility ID"), PatientListQuery),
    responses(
        (status = 200, description = "Patients, newest first", body = PageResponse<PatientResponse>),
        (status = 403, description = "Other facility", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "patients"
)]
pub async fn list_patients(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Principal>,
    Path(facility_id): Path<Uuid>,
    Query(query): Query<PatientListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = state
        .patients()
        .list(&caller, facility_id, query.q.as_deref(), query.page_request())
        .await?;
    Ok(axum::Json(PageResponse::<PatientResponse>::from_page(page)))
}

#[utoipa::path(
    post,
    path = "/api/v1/facilities/{facility_id}/patients",
    params(("facility_id" = Uuid, Path, description = "Facility ID")),
    request_body = CreatePatientRequest,
    responses(
        (status = 201, description = "Patient registered", body = PatientResponse),
        (status = 400, description = "Invalid input", body = crate::dto::ErrorResponse),
        (status = 409, description = "MRN already used", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "patients"
)]
pub async fn create_patient(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Principal>,
    Path(facility_id): Path<Uuid>,
    ApiJson(body): ApiJson<CreatePatientRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let patient = state
        .patients()
        .create(&caller, facility_id, &body.into_input()?)
        .await?;
    Ok((StatusCode::CREATED, axum::Json(PatientResponse::from(patient))))
}

#[utoipa::path(
    get,
    path = "/api/v1/facilities/{facility_id}/patients/{patient_id}",
    params(
        ("facility_id" = Uuid, Path, description = "Facility ID"),
        ("patient_id" = Uuid, Path, description = "Patient ID"),
    ),
    responses(
        (status = 200, description = "Patient", body = PatientResponse),
        (status = 404, description = "Not found", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "patients"
)]
pub async fn get_patient(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Principal>,
    Path((facility_id, patient_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let patient = state.patients().get(&caller, facility_id, patient_id).await?;
    Ok(axum::Json(PatientResponse::from(patient)))
}

#[utoipa::path(
    put,
    path = "/api/v1/facilities/{facility_id}/patients/{patient_id}",
    params(
        ("facility_id" = Uuid, Path, description = "Facility ID"),
        ("patient_id" = Uuid, Path, description = "Patient ID"),
    ),
    request_body = UpdatePatientRequest,
    responses(
        (status = 200, description = "Updated patient", body = PatientResponse),
        (status = 400, description = "Invalid input", body = crate::dto::ErrorResponse),
        (status = 404, description = "Not found", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "patients"
)]
pub async fn update_patient(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Principal>,
    Path((facility_id, patient_id)): Path<(Uuid, Uuid)>,
    ApiJson(body): ApiJson<UpdatePatientRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let patient = state
        .patients()
        .update(&caller, facility_id, patient_id, &body.into_update()?)
        .await?;
    Ok(axum::Json(PatientResponse::from(patient)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/facilities/{facility_id}/patients/{patient_id}",
    params(
        ("facility_id" = Uuid, Path, description = "Facility ID"),
        ("patient_id" = Uuid, Path, description = "Patient ID"),
    ),
    responses(
        (status = 204, description = "Patient and their visits deleted"),
        (status = 404, description = "Not found", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "patients"
)]
pub async fn delete_patient(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Principal>,
    Path((facility_id, patient_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    state.patients().delete(&caller, facility_id, patient_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// A missing singleton record is an empty slot in the history, not an error.
fn optional<T>(result: Result<T, AppError>) -> Result<Option<T>, AppError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(AppError::NotFound(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/facilities/{facility_id}/patients/{patient_id}/medical-history",
    params(
        ("facility_id" = Uuid, Path, description = "Facility ID"),
        ("patient_id" = Uuid, Path, description = "Patient ID"),
    ),
    responses(
        (status = 200, description = "Every visit with its clinical documentation", body = MedicalHistoryResponse),
        (status = 403, description = "Clinical roles only", body = crate::dto::ErrorResponse),
        (status = 404, description = "Patient not found", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "patients"
)]
pub async fn medical_history(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Principal>,
    Path((facility_id, patient_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let appointments = state
        .appointments()
        .for_patient(&caller, facility_id, patient_id)
        .await?;
    let patient = state.patients().get(&caller, facility_id, patient_id).await?;

    let records = state.medical_records();
    let anamneses = state.anamneses();
    let diagnoses = state.diagnoses();
    let prescriptions = state.prescriptions();
    let lab_tests = state.lab_tests();

    let mut visits = Vec::with_capacity(appointments.len());
    for appointment in appointments {
        let id = appointment.id;
        visits.push(MedicalHistoryEntry {
            medical_record: optional(records.get(&caller, facility_id, id).await)?,
            anamnesis: optional(anamneses.get(&caller, facility_id, id).await)?,
            diagnoses: diagnoses.list(&caller, facility_id, id).await?,
            prescriptions: prescriptions.list(&caller, facility_id, id).await?,
            lab_tests: lab_tests.list(&caller, facility_id, id).await?,
            appointment,
        });
    }

    Ok(axum::Json(MedicalHistoryResponse::new(patient, visits)))
}
