use std::future::Future;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{
    Anamnesis, AnamnesisInput, Appointment, AppointmentFilter, AppointmentStatus,
    AppointmentUpdate, EncounterKind, EncounterRecord, Facility, FacilityUpdate, MedicalRecord,
    MedicalRecordInput, NewAppointment, NewFacility, NewPatient, NewUser, Patient, PatientUpdate,
    StatusCount, User, UserUpdate,
};
use crate::pagination::{Page, PageRequest};

/// Persists facilities.
pub trait FacilityStore: Send + Sync + Clone {
    fn create(&self, input: &NewFacility) -> impl Future<Output = Result<Facility, AppError>> + Send;

    fn get(&self, id: Uuid) -> impl Future<Output = Result<Option<Facility>, AppError>> + Send;

    fn list(&self, page: PageRequest)
    -> impl Future<Output = Result<Page<Facility>, AppError>> + Send;

    fn update(
        &self,
        id: Uuid,
        update: &FacilityUpdate,
    ) -> impl Future<Output = Result<Option<Facility>, AppError>> + Send;

    /// Returns false when nothing was deleted.
    fn delete(&self, id: Uuid) -> impl Future<Output = Result<bool, AppError>> + Send;
}

/// Persists platform users.
pub trait UserStore: Send + Sync + Clone {
    fn create(&self, input: &NewUser) -> impl Future<Output = Result<User, AppError>> + Send;

    fn get(&self, id: Uuid) -> impl Future<Output = Result<Option<User>, AppError>> + Send;

    /// Lookup by already-normalized email.
    fn find_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<Option<User>, AppError>> + Send;

    fn find_by_google_sub(
        &self,
        sub: &str,
    ) -> impl Future<Output = Result<Option<User>, AppError>> + Send;

    fn link_google(
        &self,
        id: Uuid,
        sub: &str,
    ) -> impl Future<Output = Result<Option<User>, AppError>> + Send;

    fn list(
        &self,
        facility_id: Option<Uuid>,
        page: PageRequest,
    ) -> impl Future<Output = Result<Page<User>, AppError>> + Send;

    fn update(
        &self,
        id: Uuid,
        update: &UserUpdate,
    ) -> impl Future<Output = Result<Option<User>, AppError>> + Send;

    fn delete(&self, id: Uuid) -> impl Future<Output = Result<bool, AppError>> + Send;
}

/// Persists patients, always scoped to a facility.
pub trait PatientStore: Send + Sync + Clone {
    /// `mrn` is the resolved (submitted or generated) record number.
    fn create(
        &self,
        facility_id: Uuid,
        mrn: &str,
        input: &NewPatient,
    ) -> impl Future<Output = Result<Patient, AppError>> + Send;

    fn get(
        &self,
        facility_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = Result<Option<Patient>, AppError>> + Send;

    /// `search` matches name, MRN, or NIK.
    fn list(
        &self,
        facility_id: Uuid,
        search: Option<&str>,
        page: PageRequest,
    ) -> impl Future<Output = Result<Page<Patient>, AppError>> + Send;

    fn update(
        &self,
        facility_id: Uuid,
        id: Uuid,
        update: &PatientUpdate,
    ) -> impl Future<Output = Result<Option<Patient>, AppError>> + Send;

    fn delete(
        &self,
        facility_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = Result<bool, AppError>> + Send;

    /// Highest numeric suffix among MRNs starting with `prefix`, if any.
    fn max_mrn_sequence(
        &self,
        facility_id: Uuid,
        prefix: &str,
    ) -> impl Future<Output = Result<Option<i64>, AppError>> + Send;
}

/// Persists appointments, always scoped to a facility.
pub trait AppointmentStore: Send + Sync + Clone {
    fn create(
        &self,
        facility_id: Uuid,
        input: &NewAppointment,
    ) -> impl Future<Output = Result<Appointment, AppError>> + Send;

    fn get(
        &self,
        facility_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = Result<Option<Appointment>, AppError>> + Send;

    /// Newest `scheduled_at` first.
    fn list(
        &self,
        facility_id: Uuid,
        filter: &AppointmentFilter,
        page: PageRequest,
    ) -> impl Future<Output = Result<Page<Appointment>, AppError>> + Send;

    fn update(
        &self,
        facility_id: Uuid,
        id: Uuid,
        update: &AppointmentUpdate,
    ) -> impl Future<Output = Result<Option<Appointment>, AppError>> + Send;

    fn set_status(
        &self,
        facility_id: Uuid,
        id: Uuid,
        status: AppointmentStatus,
    ) -> impl Future<Output = Result<Option<Appointment>, AppError>> + Send;

    fn delete(
        &self,
        facility_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = Result<bool, AppError>> + Send;
}

/// The per-appointment medical record singleton.
pub trait MedicalRecordStore: Send + Sync + Clone {
    fn create(
        &self,
        appointment: &Appointment,
        input: &MedicalRecordInput,
    ) -> impl Future<Output = Result<MedicalRecord, AppError>> + Send;

    fn get(
        &self,
        appointment_id: Uuid,
    ) -> impl Future<Output = Result<Option<MedicalRecord>, AppError>> + Send;

    fn update(
        &self,
        appointment_id: Uuid,
        input: &MedicalRecordInput,
    ) -> impl Future<Output = Result<Option<MedicalRecord>, AppError>> + Send;

    fn delete(&self, appointment_id: Uuid) -> impl Future<Output = Result<bool, AppError>> + Send;
}

/// The per-appointment anamnesis singleton.
pub trait AnamnesisStore: Send + Sync + Clone {
    fn create(
        &self,
        appointment_id: Uuid,
        input: &AnamnesisInput,
    ) -> impl Future<Output = Result<Anamnesis, AppError>> + Send;

    fn get(
        &self,
        appointment_id: Uuid,
    ) -> impl Future<Output = Result<Option<Anamnesis>, AppError>> + Send;

    fn update(
        &self,
        appointment_id: Uuid,
        input: &AnamnesisInput,
    ) -> impl Future<Output = Result<Option<Anamnesis>, AppError>> + Send;

    fn delete(&self, appointment_id: Uuid) -> impl Future<Output = Result<bool, AppError>> + Send;
}

/// Input types that can check themselves before hitting a store.
pub trait Validate {
    fn validate(&self) -> Result<(), AppError>;
}

/// A collection of entries hanging off one appointment
/// (diagnoses, prescriptions, lab tests).
pub trait EntryStore: Send + Sync + Clone {
    type Entry: Send;
    type Input: Validate + Sync;
    type Update: Validate + Sync;

    /// Human-readable entity name for error messages.
    const ENTITY: &'static str;

    fn create(
        &self,
        appointment_id: Uuid,
        input: &Self::Input,
    ) -> impl Future<Output = Result<Self::Entry, AppError>> + Send;

    /// Oldest first.
    fn list(
        &self,
        appointment_id: Uuid,
    ) -> impl Future<Output = Result<Vec<Self::Entry>, AppError>> + Send;

    fn get(
        &self,
        appointment_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = Result<Option<Self::Entry>, AppError>> + Send;

    fn update(
        &self,
        appointment_id: Uuid,
        id: Uuid,
        update: &Self::Update,
    ) -> impl Future<Output = Result<Option<Self::Entry>, AppError>> + Send;

    fn delete(
        &self,
        appointment_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = Result<bool, AppError>> + Send;
}

/// Specialty encounter records attached to a medical record.
pub trait EncounterStore: Send + Sync + Clone {
    fn create(
        &self,
        record: &MedicalRecord,
        kind: EncounterKind,
        data: &serde_json::Value,
        recorded_by: Option<Uuid>,
    ) -> impl Future<Output = Result<EncounterRecord, AppError>> + Send;

    fn list(
        &self,
        appointment_id: Uuid,
        kind: Option<EncounterKind>,
    ) -> impl Future<Output = Result<Vec<EncounterRecord>, AppError>> + Send;

    fn get(
        &self,
        appointment_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = Result<Option<EncounterRecord>, AppError>> + Send;

    /// Replaces the stored payload.
    fn replace_data(
        &self,
        appointment_id: Uuid,
        id: Uuid,
        data: &serde_json::Value,
    ) -> impl Future<Output = Result<Option<EncounterRecord>, AppError>> + Send;

    fn delete(
        &self,
        appointment_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = Result<bool, AppError>> + Send;
}

/// Aggregate counts for the dashboard.
pub trait DashboardStore: Send + Sync + Clone {
    fn count_patients(&self, facility_id: Uuid)
    -> impl Future<Output = Result<i64, AppError>> + Send;

    fn count_users(&self, facility_id: Uuid) -> impl Future<Output = Result<i64, AppError>> + Send;

    /// Appointments scheduled on `date`, grouped by status. Restricted to one
    /// practitioner when `practitioner_id` is set.
    fn appointment_status_counts(
        &self,
        facility_id: Uuid,
        date: NaiveDate,
        practitioner_id: Option<Uuid>,
    ) -> impl Future<Output = Result<Vec<StatusCount>, AppError>> + Send;

    /// Specialty encounters recorded on `date`, grouped by kind.
    fn encounter_kind_counts(
        &self,
        facility_id: Uuid,
        date: NaiveDate,
    ) -> impl Future<Output = Result<Vec<StatusCount>, AppError>> + Send;
}

/// Identity asserted by a verified Google ID token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleIdentity {
    pub sub: String,
    pub email: String,
    pub email_verified: bool,
    pub name: Option<String>,
}

/// Verifies a Google ID token and returns the identity it carries.
pub trait GoogleVerifier: Send + Sync + Clone {
    fn verify(
        &self,
        id_token: &str,
    ) -> impl Future<Output = Result<GoogleIdentity, AppError>> + Send;
}
