use klinik_core::AppError;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::appointment_repository::AppointmentRepository;
use crate::clinical_repository::{
    AnamnesisRepository, DiagnosisRepository, LabTestRepository, MedicalRecordRepository,
    PrescriptionRepository,
};
use crate::config::DatabaseConfig;
use crate::dashboard_repository::DashboardRepository;
use crate::encounter_repository::EncounterRepository;
use crate::facility_repository::FacilityRepository;
use crate::patient_repository::PatientRepository;
use crate::user_repository::UserRepository;

/// Central database facade: owns the connection pool, runs migrations,
/// and vends repository instances.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect to PostgreSQL with the given configuration.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.url)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to connect: {e}")))?;

        Ok(Self { pool })
    }

    /// Create a `Database` from an existing pool (useful for testing).
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run all pending migrations.
    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Migration failed: {e}")))?;
        Ok(())
    }

    /// Check database connectivity.
    pub async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;
        Ok(())
    }

    pub fn facility_repo(&self) -> FacilityRepository {
        FacilityRepository::new(self.pool.clone())
    }

    pub fn user_repo(&self) -> UserRepository {
        UserRepository::new(self.pool.clone())
    }

    pub fn patient_repo(&self) -> PatientRepository {
        PatientRepository::new(self.pool.clone())
    }

    pub fn appointment_repo(&self) -> AppointmentRepository {
        AppointmentRepository::new(self.pool.clone())
    }

    pub fn medical_record_repo(&self) -> MedicalRecordRepository {
        MedicalRecordRepository::new(self.pool.clone())
    }

    pub fn anamnesis_repo(&self) -> AnamnesisRepository {
        AnamnesisRepository::new(self.pool.clone())
    }

    pub fn diagnosis_repo(&self) -> DiagnosisRepository {
        DiagnosisRepository::new(self.pool.clone())
    }

    pub fn prescription_repo(&self) -> PrescriptionRepository {
        PrescriptionRepository::new(self.pool.clone())
    }

    pub fn lab_test_repo(&self) -> LabTestRepository {
        LabTestRepository::new(self.pool.clone())
    }

    pub fn encounter_repo(&self) -> EncounterRepository {
        EncounterRepository::new(self.pool.clone())
    }

    pub fn dashboard_repo(&self) -> DashboardRepository {
        DashboardRepository::new(self.pool.clone())
    }

    /// Get a reference to the underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
