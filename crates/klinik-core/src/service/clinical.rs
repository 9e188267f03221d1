//! Per-appointment clinical documentation: the two singletons (medical
//! record, anamnesis), the entry collections, and recommendations.

use uuid::Uuid;

use crate::access::{Permission, Principal};
use crate::error::AppError;
use crate::models::{Anamnesis, AnamnesisInput, Appointment, MedicalRecord, MedicalRecordInput};
use crate::recommendation::{Recommendation, Recommender};
use crate::service::{deleted, found};
use crate::traits::{AnamnesisStore, AppointmentStore, EntryStore, MedicalRecordStore, Validate};

pub(crate) async fn load_appointment<A: AppointmentStore>(
    appointments: &A,
    facility_id: Uuid,
    appointment_id: Uuid,
) -> Result<Appointment, AppError> {
    found(
        appointments.get(facility_id, appointment_id).await?,
        "Appointment",
        appointment_id,
    )
}

// ---------------------------------------------------------------------------
// Medical record
// ---------------------------------------------------------------------------

pub struct MedicalRecordService<A: AppointmentStore, M: MedicalRecordStore> {
    appointments: A,
    records: M,
}

impl<A: AppointmentStore, M: MedicalRecordStore> MedicalRecordService<A, M> {
    pub fn new(appointments: A, records: M) -> Self {
        Self {
            appointments,
            records,
        }
    }

    pub async fn get(
        &self,
        caller: &Principal,
        facility_id: Uuid,
        appointment_id: Uuid,
    ) -> Result<MedicalRecord, AppError> {
        caller.authorize(facility_id, Permission::ViewClinical)?;
        load_appointment(&self.appointments, facility_id, appointment_id).await?;
        found(
            self.records.get(appointment_id).await?,
            "Medical record for appointment",
            appointment_id,
        )
    }

    /// The practitioner defaults to the one assigned to the appointment.
    pub async fn create(
        &self,
        caller: &Principal,
        facility_id: Uuid,
        appointment_id: Uuid,
        input: &MedicalRecordInput,
    ) -> Result<MedicalRecord, AppError> {
        caller.authorize(facility_id, Permission::RecordObservations)?;
        input.validate()?;
        let appointment = load_appointment(&self.appointments, facility_id, appointment_id).await?;
        if self.records.get(appointment_id).await?.is_some() {
            return Err(AppError::Conflict(
                "Medical record already exists for this appointment".into(),
            ));
        }
        let record = self.records.create(&appointment, input).await?;
        tracing::info!(record_id = %record.id, %appointment_id, "Medical record created");
        Ok(record)
    }

    pub async fn update(
        &self,
        caller: &Principal,
        facility_id: Uuid,
        appointment_id: Uuid,
        input: &MedicalRecordInput,
    ) -> Result<MedicalRecord, AppError> {
        caller.authorize(facility_id, Permission::RecordObservations)?;
        input.validate()?;
        load_appointment(&self.appointments, facility_id, appointment_id).await?;
        found(
            self.records.update(appointment_id, input).await?,
            "Medical record for appointment",
            appointment_id,
        )
    }

    /// Also removes the specialty encounters attached to the record.
    pub async fn delete(&self, caller: &Principal, facility_id: Uuid, appointment_id: Uuid) -> Result<(), AppError> {
        caller.authorize(facility_id, Permission::RecordObservations)?;
        load_appointment(&self.appointments, facility_id, appointment_id).await?;
        deleted(
            self.records.delete(appointment_id).await?,
            "Medical record for appointment",
            appointment_id,
        )
    }
}

// ---------------------------------------------------------------------------
// Anamnesis
// ---------------------------------------------------------------------------

pub struct AnamnesisService<A: AppointmentStore, N: AnamnesisStore> {
    appointments: A,
    anamneses: N,
}

impl<A: AppointmentStore, N: AnamnesisStore> AnamnesisService<A, N> {
    pub fn new(appointments: A, anamneses: N) -> Self {
        Self {
            appointments,
            anamneses,
        }
    }

    pub async fn get(&self, caller: &Principal, facility_id: Uuid, appointment_id: Uuid) -> Result<Anamnesis, AppError> {
        caller.authorize(facility_id, Permission::ViewClinical)?;
        load_appointment(&self.appointments, facility_id, appointment_id).await?;
        found(
            self.anamneses.get(appointment_id).await?,
            "Anamnesis for appointment",
            appointment_id,
        )
    }

    pub async fn create(
        &self,
        caller: &Principal,
        facility_id: Uuid,
        appointment_id: Uuid,
        input: &AnamnesisInput,
    ) -> Result<Anamnesis, AppError> {
        caller.authorize(facility_id, Permission::RecordObservations)?;
        input.validate_new()?;
        load_appointment(&self.appointments, facility_id, appointment_id).await?;
        if self.anamneses.get(appointment_id).await?.is_some() {
            return Err(AppError::Conflict(
                "Anamnesis already exists for this appointment".into(),
            ));
        }
        self.anamneses.create(appointment_id, input).await
    }

    pub async fn update(
        &self,
        caller: &Principal,
        facility_id: Uuid,
        appointment_id: Uuid,
        input: &AnamnesisInput,
    ) -> Result<Anamnesis, AppError> {
        caller.authorize(facility_id, Permission::RecordObservations)?;
        input.validate_update()?;
        load_appointment(&self.appointments, facility_id, appointment_id).await?;
        found(
            self.anamneses.update(appointment_id, input).await?,
            "Anamnesis for appointment",
            appointment_id,
        )
    }

    pub async fn delete(&self, caller: &Principal, facility_id: Uuid, appointment_id: Uuid) -> Result<(), AppError> {
        caller.authorize(facility_id, Permission::RecordObservations)?;
        load_appointment(&self.appointments, facility_id, appointment_id).await?;
        deleted(
            self.anamneses.delete(appointment_id).await?,
            "Anamnesis for appointment",
            appointment_id,
        )
    }
}

// ---------------------------------------------------------------------------
// Entry collections
// ---------------------------------------------------------------------------

/// CRUD over one of the per-appointment collections (diagnoses,
/// prescriptions, lab tests). Reading needs `ViewClinical`; writing needs
/// the permission given at construction.
pub struct EntryService<A: AppointmentStore, E: EntryStore> {
    appointments: A,
    entries: E,
    write: Permission,
}

impl<A: AppointmentStore, E: EntryStore> EntryService<A, E> {
    pub fn new(appointments: A, entries: E, write: Permission) -> Self {
        Self {
            appointments,
            entries,
            write,
        }
    }

    pub async fn list(
        &self,
        caller: &Principal,
        facility_id: Uuid,
        appointment_id: Uuid,
    ) -> Result<Vec<E::Entry>, AppError> {
        caller.authorize(facility_id, Permission::ViewClinical)?;
        load_appointment(&self.appointments, facility_id, appointment_id).await?;
        self.entries.list(appointment_id).await
    }

    pub async fn get(
        &self,
        caller: &Principal,
        facility_id: Uuid,
        appointment_id: Uuid,
        id: Uuid,
    ) -> Result<E::Entry, AppError> {
        caller.authorize(facility_id, Permission::ViewClinical)?;
        load_appointment(&self.appointments, facility_id, appointment_id).await?;
        found(self.entries.get(appointment_id, id).await?, E::ENTITY, id)
    }

    pub async fn create(
        &self,
        caller: &Principal,
        facility_id: Uuid,
        appointment_id: Uuid,
        input: &E::Input,
    ) -> Result<E::Entry, AppError> {
        caller.authorize(facility_id, self.write)?;
        input.validate()?;
        load_appointment(&self.appointments, facility_id, appointment_id).await?;
        let entry = self.entries.create(appointment_id, input).await?;
        tracing::debug!(entity = E::ENTITY, %appointment_id, "Entry recorded");
        Ok(entry)
    }

    pub async fn update(
        &self,
        caller: &Principal,
        facility_id: Uuid,
        appointment_id: Uuid,
        id: Uuid,
        update: &E::Update,
    ) -> Result<E::Entry, AppError> {
        caller.authorize(facility_id, self.write)?;
        update.validate()?;
        load_appointment(&self.appointments, facility_id, appointment_id).await?;
        found(
            self.entries.update(appointment_id, id, update).await?,
            E::ENTITY,
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
        caller.authorize(facility_id, self.write)?;
        load_appointment(&self.appointments, facility_id, appointment_id).await?;
        deleted(self.entries.delete(appointment_id, id).await?, E::ENTITY, id)
    }
}

// ---------------------------------------------------------------------------
// Recommendations
// ---------------------------------------------------------------------------

pub struct RecommendationService<A: AppointmentStore, N: AnamnesisStore, R: Recommender> {
    appointments: A,
    anamneses: N,
    recommender: R,
}

impl<A: AppointmentStore, N: AnamnesisStore, R: Recommender> RecommendationService<A, N, R> {
    pub fn new(appointments: A, anamneses: N, recommender: R) -> Self {
        Self {
            appointments,
            anamneses,
            recommender,
        }
    }

    pub async fn recommend(
        &self,
        caller: &Principal,
        facility_id: Uuid,
        appointment_id: Uuid,
    ) -> Result<Vec<Recommendation>, AppError> {
        caller.authorize(facility_id, Permission::ViewClinical)?;
        let appointment = load_appointment(&self.appointments, facility_id, appointment_id).await?;
        let anamnesis = self.anamneses.get(appointment_id).await?;
        self.recommender
            .recommend(&appointment, anamnesis.as_ref())
            .await
    }
}
