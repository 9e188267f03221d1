//! Use-case layer: every operation authorizes the caller, validates input,
//! checks that parents exist, then delegates to a store.

use chrono::{NaiveDate, Utc};

use crate::error::AppError;

mod appointment;
mod auth;
mod clinical;
mod dashboard;
mod encounter;
mod facility;
mod patient;
mod user;

pub use appointment::AppointmentService;
pub use auth::{AuthService, AuthSession, Registration};
pub use clinical::{AnamnesisService, EntryService, MedicalRecordService, RecommendationService};
pub use dashboard::DashboardService;
pub use encounter::EncounterService;
pub use facility::FacilityService;
pub use patient::PatientService;
pub use user::UserService;

pub(crate) fn today() -> NaiveDate {
    Utc::now().date_naive()
}

pub(crate) fn found<T>(value: Option<T>, entity: &str, id: impl std::fmt::Display) -> Result<T, AppError> {
    value.ok_or_else(|| AppError::not_found(entity, id))
}

pub(crate) fn deleted(removed: bool, entity: &str, id: impl std::fmt::Display) -> Result<(), AppError> {
    if removed {
        Ok(())
    } else {
        Err(AppError::not_found(entity, id))
    }
}
