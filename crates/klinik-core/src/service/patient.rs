use uuid::Uuid;

use crate::access::{Permission, Principal};
use crate::error::AppError;
use crate::models::patient::{format_mrn, mrn_prefix};
use crate::models::{NewPatient, Patient, PatientUpdate};
use crate::pagination::{Page, PageRequest};
use crate::service::{deleted, found, today};
use crate::traits::{FacilityStore, PatientStore};

/// Inserts tried when a concurrent registration takes the generated MRN first.
const MRN_ATTEMPTS: i64 = 5;

pub struct PatientService<P: PatientStore, F: FacilityStore> {
    patients: P,
    facilities: F,
}

impl<P: PatientStore, F: FacilityStore> PatientService<P, F> {
    pub fn new(patients: P, facilities: F) -> Self {
        Self {
            patients,
            facilities,
        }
    }

    pub async fn create(
        &self,
        caller: &Principal,
        facility_id: Uuid,
        input: &NewPatient,
    ) -> Result<Patient, AppError> {
        caller.authorize(facility_id, Permission::ManagePatients)?;
        let today = today();
        input.validate(today)?;
        let facility = found(self.facilities.get(facility_id).await?, "Facility", facility_id)?;

        if let Some(mrn) = input.mrn.as_deref() {
            return self.patients.create(facility_id, mrn.trim(), input).await;
        }

        let prefix = mrn_prefix(&facility.code, today);
        let base = self
            .patients
            .max_mrn_sequence(facility_id, &prefix)
            .await?
            .unwrap_or(0)
            + 1;
        let mut attempt = 0;
        loop {
            let mrn = format_mrn(&facility.code, today, base + attempt);
            match self.patients.create(facility_id, &mrn, input).await {
                Ok(patient) => {
                    tracing::info!(patient_id = %patient.id, mrn = %patient.mrn, "Patient registered");
                    return Ok(patient);
                }
                Err(AppError::Conflict(msg)) if msg.contains("MRN") && attempt + 1 < MRN_ATTEMPTS => {
                    tracing::debug!(%mrn, "Generated MRN taken, trying next sequence");
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    pub async fn get(&self, caller: &Principal, facility_id: Uuid, id: Uuid) -> Result<Patient, AppError> {
        caller.authorize(facility_id, Permission::ManagePatients)?;
        found(self.patients.get(facility_id, id).await?, "Patient", id)
    }

    /// `search` is matched against name, MRN, and NIK; blank means no filter.
    pub async fn list(
        &self,
        caller: &Principal,
        facility_id: Uuid,
        search: Option<&str>,
        page: PageRequest,
    ) -> Result<Page<Patient>, AppError> {
        caller.authorize(facility_id, Permission::ManagePatients)?;
        let search = search.map(str::trim).filter(|s| !s.is_empty());
        self.patients.list(facility_id, search, page).await
    }

    pub async fn update(
        &self,
        caller: &Principal,
        facility_id: Uuid,
        id: Uuid,
        update: &PatientUpdate,
    ) -> Result<Patient, AppError> {
        caller.authorize(facility_id, Permission::ManagePatients)?;
        update.validate(today())?;
        found(self.patients.update(facility_id, id, update).await?, "Patient", id)
    }

    pub async fn delete(&self, caller: &Principal, facility_id: Uuid, id: Uuid) -> Result<(), AppError> {
        caller.authorize(facility_id, Permission::ManagePatients)?;
        deleted(self.patients.delete(facility_id, id).await?, "Patient", id)?;
        tracing::info!(patient_id = %id, "Patient deleted");
        Ok(())
    }
}
