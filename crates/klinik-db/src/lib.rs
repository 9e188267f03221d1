pub mod appointment_repository;
pub mod clinical_repository;
pub mod config;
pub mod dashboard_repository;
pub mod database;
pub mod encounter_repository;
mod error;
pub mod facility_repository;
pub mod patient_repository;
pub mod user_repository;

pub use appointment_repository::AppointmentRepository;
pub use clinical_repository::{
    AnamnesisRepository, DiagnosisRepository, LabTestRepository, MedicalRecordRepository,
    PrescriptionRepository,
};
pub use config::DatabaseConfig;
pub use dashboard_repository::DashboardRepository;
pub use database::Database;
pub use encounter_repository::EncounterRepository;
pub use facility_repository::FacilityRepository;
pub use patient_repository::PatientRepository;
pub use user_repository::UserRepository;
