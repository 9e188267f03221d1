use uuid::Uuid;

use crate::access::{Permission, Principal};
use crate::error::AppError;
use crate::models::encounter::merge_data;
use crate::models::{EncounterKind, EncounterPayload, EncounterRecord};
use crate::service::clinical::load_appointment;
use crate::service::{deleted, found};
use crate::traits::{AppointmentStore, EncounterStore, MedicalRecordStore};

/// Specialty encounters (ANC, immunization, partograph, ...). Each one hangs
/// off the appointment's medical record, so that record must exist first.
pub struct EncounterService<A, M, E>
where
    A: AppointmentStore,
    M: MedicalRecordStore,
    E: EncounterStore,
{
    appointments: A,
    records: M,
    encounters: E,
}

impl<A, M, E> EncounterService<A, M, E>
where
    A: AppointmentStore,
    M: MedicalRecordStore,
    E: EncounterStore,
{
    pub fn new(appointments: A, records: M, encounters: E) -> Self {
        Self {
            appointments,
            records,
            encounters,
        }
    }

    pub async fn create(
        &self,
        caller: &Principal,
        facility_id: Uuid,
        appointment_id: Uuid,
        kind: EncounterKind,
        data: serde_json::Value,
    ) -> Result<EncounterRecord, AppError> {
        caller.authorize(facility_id, Permission::RecordObservations)?;
        let payload = EncounterPayload::parse(kind, data)?;
        load_appointment(&self.appointments, facility_id, appointment_id).await?;
        let record = found(
            self.records.get(appointment_id).await?,
            "Medical record for appointment",
            appointment_id,
        )?;

        let encounter = self
            .encounters
            .create(&record, kind, &payload.to_data()?, Some(caller.user_id))
            .await?;
        tracing::info!(encounter_id = %encounter.id, kind = %kind, %appointment_id, "Encounter recorded");
        Ok(encounter)
    }

    pub async fn list(
        &self,
        caller: &Principal,
        facility_id: Uuid,
        appointment_id: Uuid,
        kind: Option<EncounterKind>,
    ) -> Result<Vec<EncounterRecord>, AppError> {
        caller.authorize(facility_id, Permission::ViewClinical)?;
        load_appointment(&self.appointments, facility_id, appointment_id).await?;
        self.encounters.list(appointment_id, kind).await
    }

    pub async fn get(
        &self,
        caller: &Principal,
        facility_id: Uuid,
        appointment_id: Uuid,
        id: Uuid,
    ) -> Result<EncounterRecord, AppError> {
        caller.authorize(facility_id, Permission::ViewClinical)?;
        load_appointment(&self.appointments, facility_id, appointment_id).await?;
        found(self.encounters.get(appointment_id, id).await?, "Encounter", id)
    }

    /// `patch` is merged over the stored payload; the merged payload is
    /// validated as a whole.
    pub async fn update(
        &self,
        caller: &Principal,
        facility_id: Uuid,
        appointment_id: Uuid,
        id: Uuid,
        patch: serde_json::Value,
    ) -> Result<EncounterRecord, AppError> {
        caller.authorize(facility_id, Permission::RecordObservations)?;
        if !patch.is_object() {
            return Err(AppError::invalid("data", "must be a JSON object"));
        }
        load_appointment(&self.appointments, facility_id, appointment_id).await?;
        let current = found(self.encounters.get(appointment_id, id).await?, "Encounter", id)?;

        let merged = merge_data(&current.data, patch);
        let payload = EncounterPayload::parse(current.kind, merged)?;
        found(
            self.encounters
                .replace_data(appointment_id, id, &payload.to_data()?)
                .await?,
            "Encounter",
            id,
        )
    }

    pub async fn delete(
        &self,
        caller: &Principal,
        facility_id: Uuid,
        appointment_id: Uuid,
        id: Uuid,
    ) -> Result<(), AppError> {
        caller.authorize(facility_id, Permission::RecordObservations)?;
        load_appointment(&self.appointments, facility_id, appointment_id).await?;
        deleted(self.encounters.delete(appointment_id, id).await?, "Encounter", id)
    }
}
