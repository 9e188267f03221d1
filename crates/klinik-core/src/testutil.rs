//! Test utilities: in-memory implementations of the core store traits.
//!
//! `MemoryStore` keeps every table behind one `Arc<Mutex<_>>` so clones share
//! state, the same way the PostgreSQL repositories share a pool. Unique keys
//! are enforced so services see the same conflicts they would in production.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, TimeZone, Utc};
use uuid::Uuid;

use crate::access::Principal;
use crate::error::AppError;
use crate::models::{
    Anamnesis, AnamnesisInput, Appointment, AppointmentFilter, AppointmentStatus,
    AppointmentUpdate, Diagnosis, DiagnosisInput, DiagnosisType, DiagnosisUpdate, EncounterKind,
    EncounterRecord, Facility, FacilityType, FacilityUpdate, Gender, MedicalRecord,
    MedicalRecordInput, NewAppointment, NewFacility, NewPatient, NewUser, Patient, PatientUpdate,
    Role, StatusCount, User, UserUpdate,
};
use crate::pagination::{Page, PageRequest};
use crate::traits::{
    AnamnesisStore, AppointmentStore, DashboardStore, EncounterStore, EntryStore, FacilityStore,
    GoogleIdentity, GoogleVerifier, MedicalRecordStore, PatientStore, UserStore,
};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn principal(role: Role, facility_id: Option<Uuid>) -> Principal {
    Principal {
        user_id: Uuid::new_v4(),
        role,
        facility_id,
    }
}

pub fn new_facility(code: &str) -> NewFacility {
    NewFacility {
        code: code.to_string(),
        name: format!("Puskesmas {code}"),
        facility_type: FacilityType::Puskesmas,
        address: None,
        phone: None,
        email: None,
    }
}

pub fn new_patient(name: &str) -> NewPatient {
    NewPatient {
        mrn: None,
        nik: None,
        full_name: name.to_string(),
        gender: Gender::Female,
        birth_date: NaiveDate::from_ymd_opt(1990, 4, 12).unwrap(),
        birth_place: Some("Bandung".into()),
        blood_type: None,
        phone: None,
        address: None,
        bpjs_number: None,
    }
}

pub fn new_appointment(patient_id: Uuid) -> NewAppointment {
    NewAppointment {
        patient_id,
        practitioner_id: None,
        scheduled_at: Utc::now(),
        service_unit: "Poli Umum".into(),
        complaint: Some("Demam tiga hari".into()),
        notes: None,
    }
}

pub fn sample_appointment(facility_id: Uuid, patient_id: Uuid) -> Appointment {
    let now = Utc::now();
    Appointment {
        id: Uuid::new_v4(),
        facility_id,
        patient_id,
        practitioner_id: None,
        scheduled_at: Utc.with_ymd_and_hms(2026, 2, 3, 9, 0, 0).unwrap(),
        service_unit: "Poli Umum".into(),
        complaint: None,
        status: AppointmentStatus::Scheduled,
        notes: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn diagnosis_input(code: &str) -> DiagnosisInput {
    DiagnosisInput {
        icd10_code: code.to_string(),
        description: "Diagnosis kerja".into(),
        diagnosis_type: DiagnosisType::Primary,
        notes: None,
    }
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Tables {
    facilities: Vec<Facility>,
    users: Vec<User>,
    patients: Vec<Patient>,
    appointments: Vec<Appointment>,
    records: Vec<MedicalRecord>,
    anamneses: Vec<Anamnesis>,
    encounters: Vec<EncounterRecord>,
}

/// In-memory stand-in for every single-table store.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a user directly, bypassing validation.
    pub fn seed_user(&self, role: Role, facility_id: Option<Uuid>) -> User {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: format!("{}@klinik.test", Uuid::new_v4().simple()),
            password_hash: None,
            full_name: format!("Seeded {role}"),
            role,
            facility_id,
            google_sub: None,
            created_at: now,
            updated_at: now,
        };
        self.tables.lock().unwrap().users.push(user.clone());
        user
    }

    pub fn user_count(&self) -> usize {
        self.tables.lock().unwrap().users.len()
    }
}

fn count_by<'a>(keys: impl Iterator<Item = &'a str>) -> Vec<StatusCount> {
    let mut counts: BTreeMap<&str, i64> = BTreeMap::new();
    for key in keys {
        *counts.entry(key).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(key, count)| StatusCount::new(key, count))
        .collect()
}

impl FacilityStore for MemoryStore {
    async fn create(&self, input: &NewFacility) -> Result<Facility, AppError> {
        let mut tables = self.tables.lock().unwrap();
        if tables.facilities.iter().any(|f| f.code == input.code) {
            return Err(AppError::Conflict(format!(
                "Facility code '{}' already exists",
                input.code
            )));
        }
        let now = Utc::now();
        let facility = Facility {
            id: Uuid::new_v4(),
            code: input.code.clone(),
            name: input.name.clone(),
            facility_type: input.facility_type,
            address: input.address.clone(),
            phone: input.phone.clone(),
            email: input.email.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.facilities.push(facility.clone());
        Ok(facility)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Facility>, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.facilities.iter().find(|f| f.id == id).cloned())
    }

    async fn list(&self, page: PageRequest) -> Result<Page<Facility>, AppError> {
        let tables = self.tables.lock().unwrap();
        let mut all = tables.facilities.clone();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(Page::from_vec(all, page))
    }

    async fn update(&self, id: Uuid, update: &FacilityUpdate) -> Result<Option<Facility>, AppError> {
        let mut tables = self.tables.lock().unwrap();
        let Some(f) = tables.facilities.iter_mut().find(|f| f.id == id) else {
            return Ok(None);
        };
        if let Some(v) = &update.name {
            f.name = v.clone();
        }
        if let Some(v) = update.facility_type {
            f.facility_type = v;
        }
        if let Some(v) = &update.address {
            f.address = Some(v.clone());
        }
        if let Some(v) = &update.phone {
            f.phone = Some(v.clone());
        }
        if let Some(v) = &update.email {
            f.email = Some(v.clone());
        }
        f.updated_at = Utc::now();
        Ok(Some(f.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.tables.lock().unwrap();
        let before = tables.facilities.len();
        tables.facilities.retain(|f| f.id != id);
        let removed = tables.facilities.len() != before;
        if removed {
            tables.patients.retain(|p| p.facility_id != id);
            tables.appointments.retain(|a| a.facility_id != id);
            for user in tables.users.iter_mut() {
                if user.facility_id == Some(id) {
                    user.facility_id = None;
                }
            }
        }
        Ok(removed)
    }
}

impl UserStore for MemoryStore {
    async fn create(&self, input: &NewUser) -> Result<User, AppError> {
        let mut tables = self.tables.lock().unwrap();
        if tables.users.iter().any(|u| u.email == input.email) {
            return Err(AppError::Conflict(format!(
                "User email '{}' already exists",
                input.email
            )));
        }
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: input.email.clone(),
            password_hash: input.password_hash.clone(),
            full_name: input.full_name.clone(),
            role: input.role,
            facility_id: input.facility_id,
            google_sub: input.google_sub.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn get(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_google_sub(&self, sub: &str) -> Result<Option<User>, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .users
            .iter()
            .find(|u| u.google_sub.as_deref() == Some(sub))
            .cloned())
    }

    async fn link_google(&self, id: Uuid, sub: &str) -> Result<Option<User>, AppError> {
        let mut tables = self.tables.lock().unwrap();
        Ok(tables.users.iter_mut().find(|u| u.id == id).map(|u| {
            u.google_sub = Some(sub.to_string());
            u.clone()
        }))
    }

    async fn list(&self, facility_id: Option<Uuid>, page: PageRequest) -> Result<Page<User>, AppError> {
        let tables = self.tables.lock().unwrap();
        let all = tables
            .users
            .iter()
            .filter(|u| facility_id.is_none() || u.facility_id == facility_id)
            .cloned()
            .collect();
        Ok(Page::from_vec(all, page))
    }

    async fn update(&self, id: Uuid, update: &UserUpdate) -> Result<Option<User>, AppError> {
        let mut tables = self.tables.lock().unwrap();
        Ok(tables.users.iter_mut().find(|u| u.id == id).map(|u| {
            if let Some(v) = &update.full_name {
                u.full_name = v.clone();
            }
            if let Some(v) = update.role {
                u.role = v;
            }
            if let Some(v) = update.facility_id {
                u.facility_id = Some(v);
            }
            u.updated_at = Utc::now();
            u.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.tables.lock().unwrap();
        let before = tables.users.len();
        tables.users.retain(|u| u.id != id);
        Ok(tables.users.len() != before)
    }
}

impl PatientStore for MemoryStore {
    async fn create(&self, facility_id: Uuid, mrn: &str, input: &NewPatient) -> Result<Patient, AppError> {
        let mut tables = self.tables.lock().unwrap();
        let same_facility = || tables.patients.iter().filter(|p| p.facility_id == facility_id);
        if same_facility().any(|p| p.mrn == mrn) {
            return Err(AppError::Conflict(format!("Patient MRN '{mrn}' already exists")));
        }
        if input.nik.is_some() && same_facility().any(|p| p.nik == input.nik) {
            return Err(AppError::Conflict("Patient NIK already exists".into()));
        }
        let now = Utc::now();
        let patient = Patient {
            id: Uuid::new_v4(),
            facility_id,
            mrn: mrn.to_string(),
            nik: input.nik.clone(),
            full_name: input.full_name.clone(),
            gender: input.gender,
            birth_date: input.birth_date,
            birth_place: input.birth_place.clone(),
            blood_type: input.blood_type,
            phone: input.phone.clone(),
            address: input.address.clone(),
            bpjs_number: input.bpjs_number.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.patients.push(patient.clone());
        Ok(patient)
    }

    async fn get(&self, facility_id: Uuid, id: Uuid) -> Result<Option<Patient>, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .patients
            .iter()
            .find(|p| p.facility_id == facility_id && p.id == id)
            .cloned())
    }

    async fn list(
        &self,
        facility_id: Uuid,
        search: Option<&str>,
        page: PageRequest,
    ) -> Result<Page<Patient>, AppError> {
        let tables = self.tables.lock().unwrap();
        let needle = search.map(str::to_lowercase);
        let all = tables
            .patients
            .iter()
            .filter(|p| p.facility_id == facility_id)
            .filter(|p| {
                needle.as_deref().is_none_or(|n| {
                    p.full_name.to_lowercase().contains(n)
                        || p.mrn.to_lowercase().contains(n)
                        || p.nik.as_deref().is_some_and(|nik| nik.contains(n))
                })
            })
            .cloned()
            .collect();
        Ok(Page::from_vec(all, page))
    }

    async fn update(
        &self,
        facility_id: Uuid,
        id: Uuid,
        update: &PatientUpdate,
    ) -> Result<Option<Patient>, AppError> {
        let mut tables = self.tables.lock().unwrap();
        Ok(tables
            .patients
            .iter_mut()
            .find(|p| p.facility_id == facility_id && p.id == id)
            .map(|p| {
                if let Some(v) = &update.full_name {
                    p.full_name = v.clone();
                }
                if update.nik.is_some() {
                    p.nik = update.nik.clone();
                }
                if let Some(v) = update.gender {
                    p.gender = v;
                }
                if let Some(v) = update.birth_date {
                    p.birth_date = v;
                }
                if update.phone.is_some() {
                    p.phone = update.phone.clone();
                }
                if update.address.is_some() {
                    p.address = update.address.clone();
                }
                p.updated_at = Utc::now();
                p.clone()
            }))
    }

    async fn delete(&self, facility_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.tables.lock().unwrap();
        let before = tables.patients.len();
        tables
            .patients
            .retain(|p| !(p.facility_id == facility_id && p.id == id));
        let removed = tables.patients.len() != before;
        if removed {
            tables.appointments.retain(|a| a.patient_id != id);
        }
        Ok(removed)
    }

    async fn max_mrn_sequence(&self, facility_id: Uuid, prefix: &str) -> Result<Option<i64>, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .patients
            .iter()
            .filter(|p| p.facility_id == facility_id)
            .filter_map(|p| p.mrn.strip_prefix(prefix))
            .filter(|rest| !rest.is_empty() && rest.len() <= 15 && rest.bytes().all(|b| b.is_ascii_digit()))
            .filter_map(|rest| rest.parse::<i64>().ok())
            .max())
    }
}

impl AppointmentStore for MemoryStore {
    async fn create(&self, facility_id: Uuid, input: &NewAppointment) -> Result<Appointment, AppError> {
        let now = Utc::now();
        let appointment = Appointment {
            id: Uuid::new_v4(),
            facility_id,
            patient_id: input.patient_id,
            practitioner_id: input.practitioner_id,
            scheduled_at: input.scheduled_at,
            service_unit: input.service_unit.clone(),
            complaint: input.complaint.clone(),
            status: AppointmentStatus::Scheduled,
            notes: input.notes.clone(),
            created_at: now,
            updated_at: now,
        };
        self.tables
            .lock()
            .unwrap()
            .appointments
            .push(appointment.clone());
        Ok(appointment)
    }

    async fn get(&self, facility_id: Uuid, id: Uuid) -> Result<Option<Appointment>, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .appointments
            .iter()
            .find(|a| a.facility_id == facility_id && a.id == id)
            .cloned())
    }

    async fn list(
        &self,
        facility_id: Uuid,
        filter: &AppointmentFilter,
        page: PageRequest,
    ) -> Result<Page<Appointment>, AppError> {
        let tables = self.tables.lock().unwrap();
        let mut all: Vec<Appointment> = tables
            .appointments
            .iter()
            .filter(|a| a.facility_id == facility_id && filter.matches(a))
            .cloned()
            .collect();
        all.sort_by(|a, b| b.scheduled_at.cmp(&a.scheduled_at));
        Ok(Page::from_vec(all, page))
    }

    async fn update(
        &self,
        facility_id: Uuid,
        id: Uuid,
        update: &AppointmentUpdate,
    ) -> Result<Option<Appointment>, AppError> {
        let mut tables = self.tables.lock().unwrap();
        Ok(tables
            .appointments
            .iter_mut()
            .find(|a| a.facility_id == facility_id && a.id == id)
            .map(|a| {
                if update.practitioner_id.is_some() {
                    a.practitioner_id = update.practitioner_id;
                }
                if let Some(v) = update.scheduled_at {
                    a.scheduled_at = v;
                }
                if let Some(v) = &update.service_unit {
                    a.service_unit = v.clone();
                }
                if update.complaint.is_some() {
                    a.complaint = update.complaint.clone();
                }
                if update.notes.is_some() {
                    a.notes = update.notes.clone();
                }
                a.updated_at = Utc::now();
                a.clone()
            }))
    }

    async fn set_status(
        &self,
        facility_id: Uuid,
        id: Uuid,
        status: AppointmentStatus,
    ) -> Result<Option<Appointment>, AppError> {
        let mut tables = self.tables.lock().unwrap();
        Ok(tables
            .appointments
            .iter_mut()
            .find(|a| a.facility_id == facility_id && a.id == id)
            .map(|a| {
                a.status = status;
                a.updated_at = Utc::now();
                a.clone()
            }))
    }

    async fn delete(&self, facility_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.tables.lock().unwrap();
        let before = tables.appointments.len();
        tables
            .appointments
            .retain(|a| !(a.facility_id == facility_id && a.id == id));
        let removed = tables.appointments.len() != before;
        if removed {
            tables.records.retain(|r| r.appointment_id != id);
            tables.anamneses.retain(|r| r.appointment_id != id);
            tables.encounters.retain(|r| r.appointment_id != id);
        }
        Ok(removed)
    }
}

impl MedicalRecordStore for MemoryStore {
    async fn create(
        &self,
        appointment: &Appointment,
        input: &MedicalRecordInput,
    ) -> Result<MedicalRecord, AppError> {
        let mut tables = self.tables.lock().unwrap();
        if tables.records.iter().any(|r| r.appointment_id == appointment.id) {
            return Err(AppError::Conflict(
                "Medical record already exists for this appointment".into(),
            ));
        }
        let now = Utc::now();
        let record = MedicalRecord {
            id: Uuid::new_v4(),
            appointment_id: appointment.id,
            patient_id: appointment.patient_id,
            practitioner_id: input.practitioner_id.or(appointment.practitioner_id),
            physical_examination: input.physical_examination.clone(),
            assessment: input.assessment.clone(),
            plan: input.plan.clone(),
            notes: input.notes.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.records.push(record.clone());
        Ok(record)
    }

    async fn get(&self, appointment_id: Uuid) -> Result<Option<MedicalRecord>, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .records
            .iter()
            .find(|r| r.appointment_id == appointment_id)
            .cloned())
    }

    async fn update(
        &self,
        appointment_id: Uuid,
        input: &MedicalRecordInput,
    ) -> Result<Option<MedicalRecord>, AppError> {
        let mut tables = self.tables.lock().unwrap();
        Ok(tables
            .records
            .iter_mut()
            .find(|r| r.appointment_id == appointment_id)
            .map(|r| {
                if input.practitioner_id.is_some() {
                    r.practitioner_id = input.practitioner_id;
                }
                if input.physical_examination.is_some() {
                    r.physical_examination = input.physical_examination.clone();
                }
                if input.assessment.is_some() {
                    r.assessment = input.assessment.clone();
                }
                if input.plan.is_some() {
                    r.plan = input.plan.clone();
                }
                if input.notes.is_some() {
                    r.notes = input.notes.clone();
                }
                r.updated_at = Utc::now();
                r.clone()
            }))
    }

    async fn delete(&self, appointment_id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.tables.lock().unwrap();
        let before = tables.records.len();
        tables.records.retain(|r| r.appointment_id != appointment_id);
        let removed = tables.records.len() != before;
        if removed {
            tables.encounters.retain(|e| e.appointment_id != appointment_id);
        }
        Ok(removed)
    }
}

impl AnamnesisStore for MemoryStore {
    async fn create(&self, appointment_id: Uuid, input: &AnamnesisInput) -> Result<Anamnesis, AppError> {
        let mut tables = self.tables.lock().unwrap();
        if tables.anamneses.iter().any(|a| a.appointment_id == appointment_id) {
            return Err(AppError::Conflict(
                "Anamnesis already exists for this appointment".into(),
            ));
        }
        let now = Utc::now();
        let anamnesis = Anamnesis {
            id: Uuid::new_v4(),
            appointment_id,
            chief_complaint: input.chief_complaint.clone().unwrap_or_default(),
            present_illness: input.present_illness.clone(),
            past_medical_history: input.past_medical_history.clone(),
            family_history: input.family_history.clone(),
            allergies: input.allergies.clone(),
            current_medications: input.current_medications.clone(),
            vital_signs: input.vital_signs.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.anamneses.push(anamnesis.clone());
        Ok(anamnesis)
    }

    async fn get(&self, appointment_id: Uuid) -> Result<Option<Anamnesis>, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .anamneses
            .iter()
            .find(|a| a.appointment_id == appointment_id)
            .cloned())
    }

    async fn update(
        &self,
        appointment_id: Uuid,
        input: &AnamnesisInput,
    ) -> Result<Option<Anamnesis>, AppError> {
        let mut tables = self.tables.lock().unwrap();
        Ok(tables
            .anamneses
            .iter_mut()
            .find(|a| a.appointment_id == appointment_id)
            .map(|a| {
                if let Some(v) = &input.chief_complaint {
                    a.chief_complaint = v.clone();
                }
                if input.allergies.is_some() {
                    a.allergies = input.allergies.clone();
                }
                if input.vital_signs.systolic.is_some() {
                    a.vital_signs.systolic = input.vital_signs.systolic;
                }
                if input.vital_signs.diastolic.is_some() {
                    a.vital_signs.diastolic = input.vital_signs.diastolic;
                }
                a.updated_at = Utc::now();
                a.clone()
            }))
    }

    async fn delete(&self, appointment_id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.tables.lock().unwrap();
        let before = tables.anamneses.len();
        tables.anamneses.retain(|a| a.appointment_id != appointment_id);
        Ok(tables.anamneses.len() != before)
    }
}

impl EncounterStore for MemoryStore {
    async fn create(
        &self,
        record: &MedicalRecord,
        kind: EncounterKind,
        data: &serde_json::Value,
        recorded_by: Option<Uuid>,
    ) -> Result<EncounterRecord, AppError> {
        let now = Utc::now();
        let encounter = EncounterRecord {
            id: Uuid::new_v4(),
            medical_record_id: record.id,
            appointment_id: record.appointment_id,
            kind,
            data: data.clone(),
            recorded_by,
            created_at: now,
            updated_at: now,
        };
        self.tables
            .lock()
            .unwrap()
            .encounters
            .push(encounter.clone());
        Ok(encounter)
    }

    async fn list(
        &self,
        appointment_id: Uuid,
        kind: Option<EncounterKind>,
    ) -> Result<Vec<EncounterRecord>, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .encounters
            .iter()
            .filter(|e| e.appointment_id == appointment_id)
            .filter(|e| kind.is_none_or(|k| e.kind == k))
            .cloned()
            .collect())
    }

    async fn get(&self, appointment_id: Uuid, id: Uuid) -> Result<Option<EncounterRecord>, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .encounters
            .iter()
            .find(|e| e.appointment_id == appointment_id && e.id == id)
            .cloned())
    }

    async fn replace_data(
        &self,
        appointment_id: Uuid,
        id: Uuid,
        data: &serde_json::Value,
    ) -> Result<Option<EncounterRecord>, AppError> {
        let mut tables = self.tables.lock().unwrap();
        Ok(tables
            .encounters
            .iter_mut()
            .find(|e| e.appointment_id == appointment_id && e.id == id)
            .map(|e| {
                e.data = data.clone();
                e.updated_at = Utc::now();
                e.clone()
            }))
    }

    async fn delete(&self, appointment_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.tables.lock().unwrap();
        let before = tables.encounters.len();
        tables
            .encounters
            .retain(|e| !(e.appointment_id == appointment_id && e.id == id));
        Ok(tables.encounters.len() != before)
    }
}

impl DashboardStore for MemoryStore {
    async fn count_patients(&self, facility_id: Uuid) -> Result<i64, AppError> {
        PatientStore::count(self, facility_id).await
    }

    async fn count_users(&self, facility_id: Uuid) -> Result<i64, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .users
            .iter()
            .filter(|u| u.facility_id == Some(facility_id))
            .count() as i64)
    }

    async fn appointment_status_counts(
        &self,
        facility_id: Uuid,
        date: NaiveDate,
        practitioner_id: Option<Uuid>,
    ) -> Result<Vec<StatusCount>, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(count_by(
            tables
                .appointments
                .iter()
                .filter(|a| a.facility_id == facility_id)
                .filter(|a| a.scheduled_at.date_naive() == date)
                .filter(|a| practitioner_id.is_none() || a.practitioner_id == practitioner_id)
                .map(|a| a.status.as_str()),
        ))
    }

    async fn encounter_kind_counts(
        &self,
        facility_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<StatusCount>, AppError> {
        let tables = self.tables.lock().unwrap();
        let in_facility = |appointment_id: Uuid| {
            tables
                .appointments
                .iter()
                .any(|a| a.id == appointment_id && a.facility_id == facility_id)
        };
        Ok(count_by(
            tables
                .encounters
                .iter()
                .filter(|e| e.created_at.date_naive() == date && in_facility(e.appointment_id))
                .map(|e| e.kind.as_str()),
        ))
    }
}

// ---------------------------------------------------------------------------
// MemoryDiagnoses
// ---------------------------------------------------------------------------

/// In-memory diagnosis collection for the generic entry service.
#[derive(Clone, Default)]
pub struct MemoryDiagnoses {
    rows: Arc<Mutex<Vec<Diagnosis>>>,
}

impl EntryStore for MemoryDiagnoses {
    type Entry = Diagnosis;
    type Input = DiagnosisInput;
    type Update = DiagnosisUpdate;

    const ENTITY: &'static str = "Diagnosis";

    async fn create(&self, appointment_id: Uuid, input: &DiagnosisInput) -> Result<Diagnosis, AppError> {
        let now = Utc::now();
        let row = Diagnosis {
            id: Uuid::new_v4(),
            appointment_id,
            icd10_code: input.icd10_code.trim().to_ascii_uppercase(),
            description: input.description.clone(),
            diagnosis_type: input.diagnosis_type,
            notes: input.notes.clone(),
            created_at: now,
            updated_at: now,
        };
        self.rows.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn list(&self, appointment_id: Uuid) -> Result<Vec<Diagnosis>, AppError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .filter(|d| d.appointment_id == appointment_id)
            .cloned()
            .collect())
    }

    async fn get(&self, appointment_id: Uuid, id: Uuid) -> Result<Option<Diagnosis>, AppError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .find(|d| d.appointment_id == appointment_id && d.id == id)
            .cloned())
    }

    async fn update(
        &self,
        appointment_id: Uuid,
        id: Uuid,
        update: &DiagnosisUpdate,
    ) -> Result<Option<Diagnosis>, AppError> {
        let mut rows = self.rows.lock().unwrap();
        Ok(rows
            .iter_mut()
            .find(|d| d.appointment_id == appointment_id && d.id == id)
            .map(|d| {
                if let Some(v) = &update.icd10_code {
                    d.icd10_code = v.trim().to_ascii_uppercase();
                }
                if let Some(v) = &update.description {
                    d.description = v.clone();
                }
                if let Some(v) = update.diagnosis_type {
                    d.diagnosis_type = v;
                }
                if update.notes.is_some() {
                    d.notes = update.notes.clone();
                }
                d.updated_at = Utc::now();
                d.clone()
            }))
    }

    async fn delete(&self, appointment_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|d| !(d.appointment_id == appointment_id && d.id == id));
        Ok(rows.len() != before)
    }
}

// ---------------------------------------------------------------------------
// MockGoogleVerifier
// ---------------------------------------------------------------------------

/// Accepts exactly one token and returns the configured identity for it.
#[derive(Clone)]
pub struct MockGoogleVerifier {
    token: String,
    identity: GoogleIdentity,
    calls: Arc<Mutex<u32>>,
}

impl MockGoogleVerifier {
    pub fn new(token: &str, identity: GoogleIdentity) -> Self {
        Self {
            token: token.to_string(),
            identity,
            calls: Arc::new(Mutex::new(0)),
        }
    }

    pub fn call_count(&self) -> u32 {
        *self.calls.lock().unwrap()
    }
}

impl GoogleVerifier for MockGoogleVerifier {
    async fn verify(&self, id_token: &str) -> Result<GoogleIdentity, AppError> {
        *self.calls.lock().unwrap() += 1;
        if id_token == self.token {
            Ok(self.identity.clone())
        } else {
            Err(AppError::Unauthorized("Google token rejected".into()))
        }
    }
}
