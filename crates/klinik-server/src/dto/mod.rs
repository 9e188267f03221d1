//! Request and response bodies. Enum-valued fields travel as strings and
//! are parsed into core types with field-level error reporting.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use klinik_core::{FieldError, Page, PageRequest};

mod appointment;
mod auth;
mod clinical;
mod dashboard;
mod encounter;
mod facility;
mod patient;

pub use appointment::{
    AppointmentListQuery, AppointmentResponse, AppointmentStatusRequest, CreateAppointmentRequest,
    UpdateAppointmentRequest,
};
pub use auth::{
    GoogleLoginRequest, LoginRequest, RegisterRequest, TokenResponse, UpdateUserRequest,
    UserListQuery, UserResponse,
};
pub use clinical::{
    AnamnesisRequest, AnamnesisResponse, CreateDiagnosisRequest, CreateLabTestRequest,
    CreatePrescriptionRequest, DiagnosisResponse, LabTestResponse, MedicalHistoryResponse,
    MedicalRecordRequest, MedicalRecordResponse, PrescriptionResponse, RecommendationResponse,
    UpdateDiagnosisRequest, UpdateLabTestRequest, UpdatePrescriptionRequest, VisitResponse,
    VitalSignsBody,
};
pub use dashboard::{CountResponse, DashboardQuery, DashboardResponse};
pub use encounter::{
    CreateEncounterRequest, EncounterListQuery, EncounterResponse, UpdateEncounterRequest,
};
pub use facility::{CreateFacilityRequest, FacilityResponse, UpdateFacilityRequest};
pub use patient::{CreatePatientRequest, PatientListQuery, PatientResponse, UpdatePatientRequest};

// ---------------------------------------------------------------------------
// Paging
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct PageQuery {
    /// 1-based page number (default 1)
    pub page: Option<u32>,
    /// Items per page, 1..=100 (default 20)
    pub page_size: Option<u32>,
}

impl PageQuery {
    pub fn request(&self) -> PageRequest {
        PageRequest::new(self.page, self.page_size)
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PageResponse<T: ToSchema> {
    pub items: Vec<T>,
    pub page: u32,
    pub page_size: u32,
    pub total: i64,
}

impl<T: ToSchema> PageResponse<T> {
    pub fn from_page<M>(page: Page<M>) -> Self
    where
        T: From<M>,
    {
        Self {
            items: page.items.into_iter().map(T::from).collect(),
            page: page.page,
            page_size: page.page_size,
            total: page.total,
        }
    }
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, ToSchema)]
pub struct FieldErrorResponse {
    pub field: String,
    pub message: String,
}

impl From<FieldError> for FieldErrorResponse {
    fn from(e: FieldError) -> Self {
        Self {
            field: e.field,
            message: e.message,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    #[serde(rename = "errorCode")]
    pub error_code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldErrorResponse>>,
}
