use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::middleware;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::require_bearer;
use crate::dto::HealthResponse;
use crate::openapi::ApiDoc;
use crate::state::AppState;

pub mod appointments;
pub mod auth;
pub mod clinical;
pub mod encounters;
pub mod facilities;
pub mod patients;
pub mod users;

const APPOINTMENT: &str = "/facilities/{facility_id}/appointments/{appointment_id}";

/// Build the full router with all routes and middleware.
pub fn router(state: Arc<AppState>) -> Router {
    let at = |suffix: &str| format!("{APPOINTMENT}{suffix}");

    let protected = Router::new()
        .route("/auth/me", get(auth::me))
        .route("/users", get(users::list_users))
        .route(
            "/users/{id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route(
            "/facilities",
            get(facilities::list_facilities).post(facilities::create_facility),
        )
        .route(
            "/facilities/{facility_id}",
            get(facilities::get_facility)
                .put(facilities::update_facility)
                .delete(facilities::delete_facility),
        )
        .route(
            "/facilities/{facility_id}/dashboard",
            get(facilities::get_dashboard),
        )
        .route(
            "/facilities/{facility_id}/patients",
            get(patients::list_patients).post(patients::create_patient),
        )
        .route(
            "/facilities/{facility_id}/patients/{patient_id}",
            get(patients::get_patient)
                .put(patients::update_patient)
                .delete(patients::delete_patient),
        )
        .route(
            "/facilities/{facility_id}/patients/{patient_id}/medical-history",
            get(patients::medical_history),
        )
        .route(
            "/facilities/{facility_id}/appointments",
            get(appointments::list_appointments).post(appointments::create_appointment),
        )
        .route(
            APPOINTMENT,
            get(appointments::get_appointment)
                .put(appointments::update_appointment)
                .delete(appointments::delete_appointment),
        )
        .route(&at("/status"), post(appointments::change_status))
        .route(
            &at("/medical-record"),
            get(clinical::get_medical_record)
                .post(clinical::create_medical_record)
                .put(clinical::update_medical_record)
                .delete(clinical::delete_medical_record),
        )
        .route(
            &at("/anamnesis"),
            get(clinical::get_anamnesis)
                .post(clinical::create_anamnesis)
                .put(clinical::update_anamnesis)
                .delete(clinical::delete_anamnesis),
        )
        .route(
            &at("/diagnoses"),
            get(clinical::list_diagnoses).post(clinical::create_diagnosis),
        )
        .route(
            &at("/diagnoses/{item_id}"),
            get(clinical::get_diagnosis)
                .put(clinical::update_diagnosis)
                .delete(clinical::delete_diagnosis),
        )
        .route(
            &at("/prescriptions"),
            get(clinical::list_prescriptions).post(clinical::create_prescription),
        )
        .route(
            &at("/prescriptions/{item_id}"),
            get(clinical::get_prescription)
                .put(clinical::update_prescription)
                .delete(clinical::delete_prescription),
        )
        .route(
            &at("/lab-tests"),
            get(clinical::list_lab_tests).post(clinical::create_lab_test),
        )
        .route(
            &at("/lab-tests/{item_id}"),
            get(clinical::get_lab_test)
                .put(clinical::update_lab_test)
                .delete(clinical::delete_lab_test),
        )
        .route(
            &at("/encounters"),
            get(encounters::list_encounters).post(encounters::create_encounter),
        )
        .route(
            &at("/encounters/{encounter_id}"),
            get(encounters::get_encounter)
                .put(encounters::update_encounter)
                .delete(encounters::delete_encounter),
        )
        .route(&at("/recommendations"), get(clinical::recommendations))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_bearer,
        ));

    let api = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/google", post(auth::google))
        .merge(protected);

    let public = Router::new()
        .route("/health", get(health))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    public.nest("/api/v1", api).with_state(state)
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Service is unhealthy", body = HealthResponse),
    ),
    tag = "system"
)]
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.db.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            axum::Json(HealthResponse {
                status: "healthy",
                database: "ok",
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                axum::Json(HealthResponse {
                    status: "unhealthy",
                    database: "error",
                }),
            )
        }
    }
}
