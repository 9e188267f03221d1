use klinik_client::GoogleTokenVerifier;
use klinik_core::access::Permission;
use klinik_core::service::{
    AnamnesisService, AppointmentService, AuthService, DashboardService, EncounterService,
    EntryService, FacilityService, MedicalRecordService, PatientService, RecommendationService,
    UserService,
};
use klinik_core::{StaticRecommender, TokenIssuer};
use klinik_db::{
    AnamnesisRepository, AppointmentRepository, DashboardRepository, Database,
    DiagnosisRepository, EncounterRepository, FacilityRepository, LabTestRepository,
    MedicalRecordRepository, PatientRepository, PrescriptionRepository, UserRepository,
};

/// Shared application state, available to all route handlers via `State<Arc<AppState>>`.
pub struct AppState {
    pub db: Database,
    pub tokens: TokenIssuer,
    /// None when Google sign-in is not configured.
    pub google: Option<GoogleTokenVerifier>,
    pub recommender: StaticRecommender,
}

impl AppState {
    pub fn auth(&self) -> AuthService<UserRepository, FacilityRepository, GoogleTokenVerifier> {
        AuthService::new(
            self.db.user_repo(),
            self.db.facility_repo(),
            self.tokens.clone(),
            self.google.clone(),
        )
    }

    pub fn users(&self) -> UserService<UserRepository, FacilityRepository> {
        UserService::new(self.db.user_repo(), self.db.facility_repo())
    }

    pub fn facilities(&self) -> FacilityService<FacilityRepository> {
        FacilityService::new(self.db.facility_repo())
    }

    pub fn patients(&self) -> PatientService<PatientRepository, FacilityRepository> {
        PatientService::new(self.db.patient_repo(), self.db.facility_repo())
    }

    pub fn appointments(
        &self,
    ) -> AppointmentService<AppointmentRepository, PatientRepository, UserRepository> {
        AppointmentService::new(
            self.db.appointment_repo(),
            self.db.patient_repo(),
            self.db.user_repo(),
        )
    }

    pub fn medical_records(
        &self,
    ) -> MedicalRecordService<AppointmentRepository, MedicalRecordRepository> {
        MedicalRecordService::new(self.db.appointment_repo(), self.db.medical_record_repo())
    }

    pub fn anamneses(&self) -> AnamnesisService<AppointmentRepository, AnamnesisRepository> {
        AnamnesisService::new(self.db.appointment_repo(), self.db.anamnesis_repo())
    }

    pub fn diagnoses(&self) -> EntryService<AppointmentRepository, DiagnosisRepository> {
        EntryService::new(
            self.db.appointment_repo(),
            self.db.diagnosis_repo(),
            Permission::Diagnose,
        )
    }

    pub fn prescriptions(&self) -> EntryService<AppointmentRepository, PrescriptionRepository> {
        EntryService::new(
            self.db.appointment_repo(),
            self.db.prescription_repo(),
            Permission::Diagnose,
        )
    }

    pub fn lab_tests(&self) -> EntryService<AppointmentRepository, LabTestRepository> {
        EntryService::new(
            self.db.appointment_repo(),
            self.db.lab_test_repo(),
            Permission::RecordObservations,
        )
    }

    pub fn encounters(
        &self,
    ) -> EncounterService<AppointmentRepository, MedicalRecordRepository, EncounterRepository> {
        EncounterService::new(
            self.db.appointment_repo(),
            self.db.medical_record_repo(),
            self.db.encounter_repo(),
        )
    }

    pub fn recommendations(
        &self,
    ) -> RecommendationService<AppointmentRepository, AnamnesisRepository, StaticRecommender> {
        RecommendationService::new(
            self.db.appointment_repo(),
            self.db.anamnesis_repo(),
            self.recommender.clone(),
        )
    }

    pub fn dashboard(&self) -> DashboardService<DashboardRepository, FacilityRepository> {
        DashboardService::new(self.db.dashboard_repo(), self.db.facility_repo())
    }
}
