use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Klinik API",
        version = "0.1.0",
        description = "Electronic medical records for Indonesian primary-care clinics."
    ),
    paths(
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::auth::google,
        crate::routes::auth::me,
        crate::routes::users::list_users,
        crate::routes::users::get_user,
        crate::routes::users::update_user,
        crate::routes::users::delete_user,
        crate::routes::facilities::list_facilities,
        crate::routes::facilities::create_facility,
        crate::routes::facilities::get_facility,
        crate::routes::facilities::update_facility,
        crate::routes::facilities::delete_facility,
        crate::routes::facilities::get_dashboard,
        crate::routes::patients::list_patients,
        crate::routes::patients::create_patient,
        crate::routes::patients::get_patient,
        crate::routes::patients::update_patient,
        crate::routes::patients::delete_patient,
        crate::routes::patients::medical_history,
        crate::routes::appointments::list_appointments,
        crate::routes::appointments::create_appointment,
        crate::routes::appointments::get_appointment,
        crate::routes::appointments::update_appointment,
        crate::routes::appointments::delete_appointment,
        crate::routes::appointments::change_status,
        crate::routes::clinical::get_medical_record,
        crate::routes::clinical::create_medical_record,
        crate::routes::clinical::update_medical_record,
        crate::routes::clinical::delete_medical_record,
        crate::routes::clinical::get_anamnesis,
        crate::routes::clinical::create_anamnesis,
        crate::routes::clinical::update_anamnesis,
        crate::routes::clinical::delete_anamnesis,
        crate::routes::clinical::list_diagnoses,
        crate::routes::clinical::create_diagnosis,
        crate::routes::clinical::get_diagnosis,
        crate::routes::clinical::update_diagnosis,
        crate::routes::clinical::delete_diagnosis,
        crate::routes::clinical::list_prescriptions,
        crate::routes::clinical::create_prescription,
        crate::routes::clinical::get_prescription,
        crate::routes::clinical::update_prescription,
        crate::routes::clinical::delete_prescription,
        crate::routes::clinical::list_lab_tests,
        crate::routes::clinical::create_lab_test,
        crate::routes::clinical::get_lab_test,
        crate::routes::clinical::update_lab_test,
        crate::routes::clinical::delete_lab_test,
        crate::routes::clinical::recommendations,
        crate::routes::encounters::list_encounters,
        crate::routes::encounters::create_encounter,
        crate::routes::encounters::get_encounter,
        crate::routes::encounters::update_encounter,
        crate::routes::encounters::delete_encounter,
        crate::routes::health,
    ),
    components(schemas(
        crate::dto::RegisterRequest,
        crate::dto::LoginRequest,
        crate::dto::GoogleLoginRequest,
        crate::dto::TokenResponse,
        crate::dto::UserResponse,
        crate::dto::UpdateUserRequest,
        crate::dto::CreateFacilityRequest,
        crate::dto::UpdateFacilityRequest,
        crate::dto::FacilityResponse,
        crate::dto::CreatePatientRequest,
        crate::dto::UpdatePatientRequest,
        crate::dto::PatientResponse,
        crate::dto::CreateAppointmentRequest,
        crate::dto::UpdateAppointmentRequest,
        crate::dto::AppointmentStatusRequest,
        crate::dto::AppointmentResponse,
        crate::dto::MedicalRecordRequest,
        crate::dto::MedicalRecordResponse,
        crate::dto::VitalSignsBody,
        crate::dto::AnamnesisRequest,
        crate::dto::AnamnesisResponse,
        crate::dto::CreateDiagnosisRequest,
        crate::dto::UpdateDiagnosisRequest,
        crate::dto::DiagnosisResponse,
        crate::dto::CreatePrescriptionRequest,
        crate::dto::UpdatePrescriptionRequest,
        crate::dto::PrescriptionResponse,
        crate::dto::CreateLabTestRequest,
        crate::dto::UpdateLabTestRequest,
        crate::dto::LabTestResponse,
        crate::dto::VisitResponse,
        crate::dto::MedicalHistoryResponse,
        crate::dto::RecommendationResponse,
        crate::dto::CreateEncounterRequest,
        crate::dto::UpdateEncounterRequest,
        crate::dto::EncounterResponse,
        crate::dto::CountResponse,
        crate::dto::DashboardResponse,
        crate::dto::HealthResponse,
        crate::dto::FieldErrorResponse,
        crate::dto::ErrorResponse,
    )),
    tags(
        (name = "auth", description = "Registration, sign-in and the current user"),
        (name = "users", description = "User administration"),
        (name = "facilities", description = "Clinics and health posts"),
        (name = "dashboard", description = "Daily facility summary"),
        (name = "patients", description = "Patient registry"),
        (name = "appointments", description = "Visit scheduling and status"),
        (name = "clinical", description = "Medical records, anamnesis, diagnoses, prescriptions and lab tests"),
        (name = "encounters", description = "Specialty encounter forms"),
        (name = "system", description = "Health and system status"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Adds the Bearer JWT security scheme to the OpenAPI document.
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some(
                            "Access token from /api/v1/auth/login, /register or /google.",
                        ))
                        .build(),
                ),
            );
        }
    }
}
