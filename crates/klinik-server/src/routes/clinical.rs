use std::sync::Arc;

use axum::Extension;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use uuid::Uuid;

use klinik_core::Principal;
use klinik_core::models::{
    AnamnesisInput, MedicalRecordInput, PrescriptionInput, PrescriptionUpdate,
};

use crate::dto::{
    AnamnesisRequest, AnamnesisResponse, CreateDiagnosisRequest, CreateLabTestRequest,
    CreatePrescriptionRequest, DiagnosisResponse, LabTestResponse, MedicalRecordRequest,
    MedicalRecordResponse, PrescriptionResponse, RecommendationResponse, UpdateDiagnosisRequest,
    UpdateLabTestRequest, UpdatePrescriptionRequest,
};
use crate::error::{ApiError, ApiJson};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Medical record
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/api/v1/facilities/{facility_id}/appointments/{appointment_id}/medical-record",
    params(
        ("facility_id" = Uuid, Path, description = "Facility ID"),
        ("appointment_id" = Uuid, Path, description = "Appointment ID"),
    ),
    responses(
        (status = 200, description = "Medical record", body = MedicalRecordResponse),
        (status = 404, description = "Not recorded yet", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "clinical"
)]
pub async fn get_medical_record(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Principal>,
    Path((facility_id, appointment_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let record = state
        .medical_records()
        .get(&caller, facility_id, appointment_id)
        .await?;
    Ok(axum::Json(MedicalRecordResponse::from(record)))
}

#[utoipa::path(
    post,
    path = "/api/v1/facilities/{facility_id}/appointments/{appointment_id}/medical-record",
    params(
        ("facility_id" = Uuid, Path, description = "Facility ID"),
        ("appointment_id" = Uuid, Path, description = "Appointment ID"),
    ),
    request_body = MedicalRecordRequest,
    responses(
        (status = 201, description = "Medical record recorded", body = MedicalRecordResponse),
        (status = 400, description = "Invalid input", body = crate::dto::ErrorResponse),
        (status = 409, description = "Already recorded for this appointment", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "clinical"
)]
pub async fn create_medical_record(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Principal>,
    Path((facility_id, appointment_id)): Path<(Uuid, Uuid)>,
    ApiJson(body): ApiJson<MedicalRecordRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let input = MedicalRecordInput::from(body);
    let created = state
        .medical_records()
        .create(&caller, facility_id, appointment_id, &input)
        .await?;
    Ok((StatusCode::CREATED, axum::Json(MedicalRecordResponse::from(created))))
}

#[utoipa::path(
    put,
    path = "/api/v1/facilities/{facility_id}/appointments/{appointment_id}/medical-record",
    params(
        ("facility_id" = Uuid, Path, description = "Facility ID"),
        ("appointment_id" = Uuid, Path, description = "Appointment ID"),
    ),
    request_body = MedicalRecordRequest,
    responses(
        (status = 200, description = "Updated", body = MedicalRecordResponse),
        (status = 404, description = "Not recorded yet", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "clinical"
)]
pub async fn update_medical_record(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Principal>,
    Path((facility_id, appointment_id)): Path<(Uuid, Uuid)>,
    ApiJson(body): ApiJson<MedicalRecordRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let input = MedicalRecordInput::from(body);
    let updated = state
        .medical_records()
        .update(&caller, facility_id, appointment_id, &input)
        .await?;
    Ok(axum::Json(MedicalRecordResponse::from(updated)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/facilities/{facility_id}/appointments/{appointment_id}/medical-record",
    params(
        ("facility_id" = Uuid, Path, description = "Facility ID"),
        ("appointment_id" = Uuid, Path, description = "Appointment ID"),
    ),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not recorded yet", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "clinical"
)]
pub async fn delete_medical_record(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Principal>,
    Path((facility_id, appointment_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .medical_records()
        .delete(&caller, facility_id, appointment_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Anamnesis
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/api/v1/facilities/{facility_id}/appointments/{appointment_id}/anamnesis",
    params(
        ("facility_id" = Uuid, Path, description = "Facility ID"),
        ("appointment_id" = Uuid, Path, description = "Appointment ID"),
    ),
    responses(
        (status = 200, description = "Anamnesis", body = AnamnesisResponse),
        (status = 404, description = "Not recorded yet", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "clinical"
)]
pub async fn get_anamnesis(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Principal>,
    Path((facility_id, appointment_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let anamnesis = state.anamneses().get(&caller, facility_id, appointment_id).await?;
    Ok(axum::Json(AnamnesisResponse::from(anamnesis)))
}

#[utoipa::path(
    post,
    path = "/api/v1/facilities/{facility_id}/appointments/{appointment_id}/anamnesis",
    params(
        ("facility_id" = Uuid, Path, description = "Facility ID"),
        ("appointment_id" = Uuid, Path, description = "Appointment ID"),
    ),
    request_body = AnamnesisRequest,
    responses(
        (status = 201, description = "Anamnesis recorded", body = AnamnesisResponse),
        (status = 400, description = "Invalid input", body = crate::dto::ErrorResponse),
        (status = 409, description = "Already recorded for this appointment", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "clinical"
)]
pub async fn create_anamnesis(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Principal>,
    Path((facility_id, appointment_id)): Path<(Uuid, Uuid)>,
    ApiJson(body): ApiJson<AnamnesisRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let input = AnamnesisInput::from(body);
    let created = state
        .anamneses()
        .create(&caller, facility_id, appointment_id, &input)
        .await?;
    Ok((StatusCode::CREATED, axum::Json(AnamnesisResponse::from(created))))
}

#[utoipa::path(
    put,
    path = "/api/v1/facilities/{facility_id}/appointments/{appointment_id}/anamnesis",
    params(
        ("facility_id" = Uuid, Path, description = "Facility ID"),
        ("appointment_id" = Uuid, Path, description = "Appointment ID"),
    ),
    request_body = AnamnesisRequest,
    responses(
        (status = 200, description = "Updated", body = AnamnesisResponse),
        (status = 404, description = "Not recorded yet", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "clinical"
)]
pub async fn update_anamnesis(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Principal>,
    Path((facility_id, appointment_id)): Path<(Uuid, Uuid)>,
    ApiJson(body): ApiJson<AnamnesisRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let input = AnamnesisInput::from(body);
    let updated = state
        .anamneses()
        .update(&caller, facility_id, appointment_id, &input)
        .await?;
    Ok(axum::Json(AnamnesisResponse::from(updated)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/facilities/{facility_id}/appointments/{appointment_id}/anamnesis",
    params(
        ("facility_id" = Uuid, Path, description = "Facility ID"),
        ("appointment_id" = Uuid, Path, description = "Appointment ID"),
    ),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not recorded yet", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "clinical"
)]
pub async fn delete_anamnesis(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Principal>,
    Path((facility_id, appointment_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .anamneses()
        .delete(&caller, facility_id, appointment_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Diagnoses
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/api/v1/facilities/{facility_id}/appointments/{appointment_id}/diagnoses",
    params(
        ("facility_id" = Uuid, Path, description = "Facility ID"),
        ("appointment_id" = Uuid, Path, description = "Appointment ID"),
    ),
    responses(
        (status = 200, description = "Diagnoses in entry order", body = Vec<DiagnosisResponse>),
        (status = 404, description = "Appointment not found", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "clinical"
)]
pub async fn list_diagnoses(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Principal>,
    Path((facility_id, appointment_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let entries = state.diagnoses().list(&caller, facility_id, appointment_id).await?;
    let body: Vec<DiagnosisResponse> = entries.into_iter().map(Into::into).collect();
    Ok(axum::Json(body))
}

#[utoipa::path(
    post,
    path = "/api/v1/facilities/{facility_id}/appointments/{appointment_id}/diagnoses",
    params(
        ("facility_id" = Uuid, Path, description = "Facility ID"),
        ("appointment_id" = Uuid, Path, description = "Appointment ID"),
    ),
    request_body = CreateDiagnosisRequest,
    responses(
        (status = 201, description = "Entry added", body = DiagnosisResponse),
        (status = 400, description = "Invalid input", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "clinical"
)]
pub async fn create_diagnosis(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Principal>,
    Path((facility_id, appointment_id)): Path<(Uuid, Uuid)>,
    ApiJson(body): ApiJson<CreateDiagnosisRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let input = body.into_input()?;
    let created = state
        .diagnoses()
        .create(&caller, facility_id, appointment_id, &input)
        .await?;
    Ok((StatusCode::CREATED, axum::Json(DiagnosisResponse::from(created))))
}

#[utoipa::path(
    get,
    path = "/api/v1/facilities/{facility_id}/appointments/{appointment_id}/diagnoses/{item_id}",
    params(
        ("facility_id" = Uuid, Path, description = "Facility ID"),
        ("appointment_id" = Uuid, Path, description = "Appointment ID"),
        ("item_id" = Uuid, Path, description = "Entry ID"),
    ),
    responses(
        (status = 200, description = "Entry", body = DiagnosisResponse),
        (status = 404, description = "Not found", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "clinical"
)]
pub async fn get_diagnosis(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Principal>,
    Path((facility_id, appointment_id, item_id)): Path<(Uuid, Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let entry = state
        .diagnoses()
        .get(&caller, facility_id, appointment_id, item_id)
        .await?;
    Ok(axum::Json(DiagnosisResponse::from(entry)))
}

#[utoipa::path(
    put,
    path = "/api/v1/facilities/{facility_id}/appointments/{appointment_id}/diagnoses/{item_id}",
    params(
        ("facility_id" = Uuid, Path, description = "Facility ID"),
        ("appointment_id" = Uuid, Path, description = "Appointment ID"),
        ("item_id" = Uuid, Path, description = "Entry ID"),
    ),
    request_body = UpdateDiagnosisRequest,
    responses(
        (status = 200, description = "Updated entry", body = DiagnosisResponse),
        (status = 400, description = "Invalid input", body = crate::dto::ErrorResponse),
        (status = 404, description = "Not found", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "clinical"
)]
pub async fn update_diagnosis(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Principal>,
    Path((facility_id, appointment_id, item_id)): Path<(Uuid, Uuid, Uuid)>,
    ApiJson(body): ApiJson<UpdateDiagnosisRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let update = body.into_update()?;
    let entry = state
        .diagnoses()
        .update(&caller, facility_id, appointment_id, item_id, &update)
        .await?;
    Ok(axum::Json(DiagnosisResponse::from(entry)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/facilities/{facility_id}/appointments/{appointment_id}/diagnoses/{item_id}",
    params(
        ("facility_id" = Uuid, Path, description = "Facility ID"),
        ("appointment_id" = Uuid, Path, description = "Appointment ID"),
        ("item_id" = Uuid, Path, description = "Entry ID"),
    ),
    responses(
        (status = 204, description = "Entry removed"),
        (status = 404, description = "Not found", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "clinical"
)]
pub async fn delete_diagnosis(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Principal>,
    Path((facility_id, appointment_id, item_id)): Path<(Uuid, Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .diagnoses()
        .delete(&caller, facility_id, appointment_id, item_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Prescriptions
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/api/v1/facilities/{facility_id}/appointments/{appointment_id}/prescriptions",
    params(
        ("facility_id" = Uuid, Path, description = "Facility ID"),
        ("appointment_id" = Uuid, Path, description = "Appointment ID"),
    ),
    responses(
        (status = 200, description = "Prescriptions in entry order", body = Vec<PrescriptionResponse>),
        (status = 404, description = "Appointment not found", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "clinical"
)]
pub async fn list_prescriptions(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Principal>,
    Path((facility_id, appointment_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let entries = state.prescriptions().list(&caller, facility_id, appointment_id).await?;
    let body: Vec<PrescriptionResponse> = entries.into_iter().map(Into::into).collect();
    Ok(axum::Json(body))
}

#[utoipa::path(
    post,
    path = "/api/v1/facilities/{facility_id}/appointments/{appointment_id}/prescriptions",
    params(
        ("facility_id" = Uuid, Path, description = "Facility ID"),
        ("appointment_id" = Uuid, Path, description = "Appointment ID"),
    ),
    request_body = CreatePrescriptionRequest,
    responses(
        (status = 201, description = "Entry added", body = PrescriptionResponse),
        (status = 400, description = "Invalid input", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "clinical"
)]
pub async fn create_prescription(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Principal>,
    Path((facility_id, appointment_id)): Path<(Uuid, Uuid)>,
    ApiJson(body): ApiJson<CreatePrescriptionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let input = PrescriptionInput::from(body);
    let created = state
        .prescriptions()
        .create(&caller, facility_id, appointment_id, &input)
        .await?;
    Ok((StatusCode::CREATED, axum::Json(PrescriptionResponse::from(created))))
}

#[utoipa::path(
    get,
    path = "/api/v1/facilities/{facility_id}/appointments/{appointment_id}/prescriptions/{item_id}",
    params(
        ("facility_id" = Uuid, Path, description = "Facility ID"),
        ("appointment_id" = Uuid, Path, description = "Appointment ID"),
        ("item_id" = Uuid, Path, description = "Entry ID"),
    ),
    responses(
        (status = 200, description = "Entry", body = PrescriptionResponse),
        (status = 404, description = "Not found", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "clinical"
)]
pub async fn get_prescription(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Principal>,
    Path((facility_id, appointment_id, item_id)): Path<(Uuid, Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let entry = state
        .prescriptions()
        .get(&caller, facility_id, appointment_id, item_id)
        .await?;
    Ok(axum::Json(PrescriptionResponse::from(entry)))
}

#[utoipa::path(
    put,
    path = "/api/v1/facilities/{facility_id}/appointments/{appointment_id}/prescriptions/{item_id}",
    params(
        ("facility_id" = Uuid, Path, description = "Facility ID"),
        ("appointment_id" = Uuid, Path, description = "Appointment ID"),
        ("item_id" = Uuid, Path, description = "Entry ID"),
    ),
    request_body = UpdatePrescriptionRequest,
    responses(
        (status = 200, description = "Updated entry", body = PrescriptionResponse),
        (status = 400, description = "Invalid input", body = crate::dto::ErrorResponse),
        (status = 404, description = "Not found", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "clinical"
)]
pub async fn update_prescription(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Principal>,
    Path((facility_id, appointment_id, item_id)): Path<(Uuid, Uuid, Uuid)>,
    ApiJson(body): ApiJson<UpdatePrescriptionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let update = PrescriptionUpdate::from(body);
    let entry = state
        .prescriptions()
        .update(&caller, facility_id, appointment_id, item_id, &update)
        .await?;
    Ok(axum::Json(PrescriptionResponse::from(entry)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/facilities/{facility_id}/appointments/{appointment_id}/prescriptions/{item_id}",
    params(
        ("facility_id" = Uuid, Path, description = "Facility ID"),
        ("appointment_id" = Uuid, Path, description = "Appointment ID"),
        ("item_id" = Uuid, Path, description = "Entry ID"),
    ),
    responses(
        (status = 204, description = "Entry removed"),
        (status = 404, description = "Not found", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "clinical"
)]
pub async fn delete_prescription(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Principal>,
    Path((facility_id, appointment_id, item_id)): Path<(Uuid, Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .prescriptions()
        .delete(&caller, facility_id, appointment_id, item_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Lab tests
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/api/v1/facilities/{facility_id}/appointments/{appointment_id}/lab-tests",
    params(
        ("facility_id" = Uuid, Path, description = "Facility ID"),
        ("appointment_id" = Uuid, Path, description = "Appointment ID"),
    ),
    responses(
        (status = 200, description = "Lab tests in entry order", body = Vec<LabTestResponse>),
        (status = 404, description = "Appointment not found", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "clinical"
)]
pub async fn list_lab_tests(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Principal>,
    Path((facility_id, appointment_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let entries = state.lab_tests().list(&caller, facility_id, appointment_id).await?;
    let body: Vec<LabTestResponse> = entries.into_iter().map(Into::into).collect();
    Ok(axum::Json(body))
}

#[utoipa::path(
    post,
    path = "/api/v1/facilities/{facility_id}/appointments/{appointment_id}/lab-tests",
    params(
        ("facility_id" = Uuid, Path, description = "Facility ID"),
        ("appointment_id" = Uuid, Path, description = "Appointment ID"),
    ),
    request_body = CreateLabTestRequest,
    responses(
        (status = 201, description = "Entry added", body = LabTestResponse),
        (status = 400, description = "Invalid input", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "clinical"
)]
pub async fn create_lab_test(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Principal>,
    Path((facility_id, appointment_id)): Path<(Uuid, Uuid)>,
    ApiJson(body): ApiJson<CreateLabTestRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let input = body.into_input()?;
    let created = state
        .lab_tests()
        .create(&caller, facility_id, appointment_id, &input)
        .await?;
    Ok((StatusCode::CREATED, axum::Json(LabTestResponse::from(created))))
}

#[utoipa::path(
    get,
    path = "/api/v1/facilities/{facility_id}/appointments/{appointment_id}/lab-tests/{item_id}",
    params(
        ("facility_id" = Uuid, Path, description = "Facility ID"),
        ("appointment_id" = Uuid, Path, description = "Appointment ID"),
        ("item_id" = Uuid, Path, description = "Entry ID"),
    ),
    responses(
        (status = 200, description = "Entry", body = LabTestResponse),
        (status = 404, description = "Not found", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "clinical"
)]
pub async fn get_lab_test(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Principal>,
    Path((facility_id, appointment_id, item_id)): Path<(Uuid, Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let entry = state
        .lab_tests()
        .get(&caller, facility_id, appointment_id, item_id)
        .await?;
    Ok(axum::Json(LabTestResponse::from(entry)))
}

#[utoipa::path(
    put,
    path = "/api/v1/facilities/{facility_id}/appointments/{appointment_id}/lab-tests/{item_id}",
    params(
        ("facility_id" = Uuid, Path, description = "Facility ID"),
        ("appointment_id" = Uuid, Path, description = "Appointment ID"),
        ("item_id" = Uuid, Path, description = "Entry ID"),
    ),
    request_body = UpdateLabTestRequest,
    responses(
        (status = 200, description = "Updated entry", body = LabTestResponse),
        (status = 400, description = "Invalid input", body = crate::dto::ErrorResponse),
        (status = 404, description = "Not found", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "clinical"
)]
pub async fn update_lab_test(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Principal>,
    Path((facility_id, appointment_id, item_id)): Path<(Uuid, Uuid, Uuid)>,
    ApiJson(body): ApiJson<UpdateLabTestRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let update = body.into_update()?;
    let entry = state
        .lab_tests()
        .update(&caller, facility_id, appointment_id, item_id, &update)
        .await?;
    Ok(axum::Json(LabTestResponse::from(entry)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/facilities/{facility_id}/appointments/{appointment_id}/lab-tests/{item_id}",
    params(
        ("facility_id" = Uuid, Path, description = "Facility ID"),
        ("appointment_id" = Uuid, Path, description = "Appointment ID"),
        ("item_id" = Uuid, Path, description = "Entry ID"),
    ),
    responses(
        (status = 204, description = "Entry removed"),
        (status = 404, description = "Not found", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "clinical"
)]
pub async fn delete_lab_test(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Principal>,
    Path((facility_id, appointment_id, item_id)): Path<(Uuid, Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .lab_tests()
        .delete(&caller, facility_id, appointment_id, item_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Recommendations
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/api/v1/facilities/{facility_id}/appointments/{appointment_id}/recommendations",
    params(
        ("facility_id" = Uuid, Path, description = "Facility ID"),
        ("appointment_id" = Uuid, Path, description = "Appointment ID"),
    ),
    responses(
        (status = 200, description = "Suggested ICD-10 codes", body = Vec<RecommendationResponse>),
        (status = 404, description = "Appointment not found", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "clinical"
)]
pub async fn recommendations(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Principal>,
    Path((facility_id, appointment_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let suggestions = state
        .recommendations()
        .recommend(&caller, facility_id, appointment_id)
        .await?;
    let body: Vec<RecommendationResponse> = suggestions.into_iter().map(Into::into).collect();
    Ok(axum::Json(body))
}
