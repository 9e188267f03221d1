use uuid::Uuid;

use crate::access::{Permission, Principal};
use crate::error::AppError;
use crate::models::{
    Appointment, AppointmentFilter, AppointmentStatus, AppointmentUpdate, NewAppointment, Role,
};
use crate::pagination::{Page, PageRequest};
use crate::service::{deleted, found};
use crate::traits::{AppointmentStore, PatientStore, UserStore};

pub struct AppointmentService<A, P, U>
where
    A: AppointmentStore,
    P: PatientStore,
    U: UserStore,
{
    appointments: A,
    patients: P,
    users: U,
}

impl<A, P, U> AppointmentService<A, P, U>
where
    A: AppointmentStore,
    P: PatientStore,
    U: UserStore,
{
    pub fn new(appointments: A, patients: P, users: U) -> Self {
        Self {
            appointments,
            patients,
            users,
        }
    }

    /// Practitioners must be clinical staff assigned to the same facility.
    async fn check_practitioner(&self, facility_id: Uuid, practitioner_id: Uuid) -> Result<(), AppError> {
        let user = self.users.get(practitioner_id).await?;
        match user {
            Some(u)
                if u.facility_id == Some(facility_id)
                    && matches!(u.role, Role::Doctor | Role::Nurse | Role::Midwife) =>
            {
                Ok(())
            }
            _ => Err(AppError::invalid(
                "practitioner_id",
                "must be a doctor, nurse or midwife at this facility",
            )),
        }
    }

    pub async fn create(
        &self,
        caller: &Principal,
        facility_id: Uuid,
        input: &NewAppointment,
    ) -> Result<Appointment, AppError> {
        caller.authorize(facility_id, Permission::ManageAppointments)?;
        input.validate()?;
        found(
            self.patients.get(facility_id, input.patient_id).await?,
            "Patient",
            input.patient_id,
        )?;
        if let Some(practitioner_id) = input.practitioner_id {
            self.check_practitioner(facility_id, practitioner_id).await?;
        }
        let appointment = self.appointments.create(facility_id, input).await?;
        tracing::info!(
            appointment_id = %appointment.id,
            patient_id = %appointment.patient_id,
            "Appointment scheduled"
        );
        Ok(appointment)
    }

    /// Any role that can see the facility may read its appointments.
    pub async fn get(&self, caller: &Principal, facility_id: Uuid, id: Uuid) -> Result<Appointment, AppError> {
        caller.authorize(facility_id, Permission::ManageAppointments)?;
        found(self.appointments.get(facility_id, id).await?, "Appointment", id)
    }

    pub async fn list(
        &self,
        caller: &Principal,
        facility_id: Uuid,
        filter: &AppointmentFilter,
        page: PageRequest,
    ) -> Result<Page<Appointment>, AppError> {
        caller.authorize(facility_id, Permission::ManageAppointments)?;
        self.appointments.list(facility_id, filter, page).await
    }

    /// Every appointment of one patient, newest first.
    pub async fn for_patient(
        &self,
        caller: &Principal,
        facility_id: Uuid,
        patient_id: Uuid,
    ) -> Result<Vec<Appointment>, AppError> {
        caller.authorize(facility_id, Permission::ViewClinical)?;
        found(self.patients.get(facility_id, patient_id).await?, "Patient", patient_id)?;

        let filter = AppointmentFilter {
            patient_id: Some(patient_id),
            ..Default::default()
        };
        let mut all = Vec::new();
        let mut page = PageRequest::new(Some(1), Some(crate::pagination::MAX_PAGE_SIZE));
        loop {
            let chunk = self.appointments.list(facility_id, &filter, page).await?;
            let fetched = chunk.items.len();
            all.extend(chunk.items);
            if fetched == 0 || all.len() as i64 >= chunk.total {
                return Ok(all);
            }
            page = PageRequest::new(Some(page.page() + 1), Some(page.page_size()));
        }
    }

    pub async fn update(
        &self,
        caller: &Principal,
        facility_id: Uuid,
        id: Uuid,
        update: &AppointmentUpdate,
    ) -> Result<Appointment, AppError> {
        caller.authorize(facility_id, Permission::ManageAppointments)?;
        update.validate()?;
        let current = found(self.appointments.get(facility_id, id).await?, "Appointment", id)?;
        if current.status.is_terminal() {
            return Err(AppError::Conflict(format!(
                "appointment is {} and can no longer be edited",
                current.status
            )));
        }
        if let Some(practitioner_id) = update.practitioner_id {
            self.check_practitioner(facility_id, practitioner_id).await?;
        }
        found(self.appointments.update(facility_id, id, update).await?, "Appointment", id)
    }

    pub async fn change_status(
        &self,
        caller: &Principal,
        facility_id: Uuid,
        id: Uuid,
        next: AppointmentStatus,
    ) -> Result<Appointment, AppError> {
        caller.authorize(facility_id, Permission::ManageAppointments)?;
        let current = found(self.appointments.get(facility_id, id).await?, "Appointment", id)?;
        if !current.status.can_transition_to(next) {
            return Err(AppError::Conflict(format!(
                "cannot move appointment from {} to {}",
                current.status, next
            )));
        }
        let updated = found(
            self.appointments.set_status(facility_id, id, next).await?,
            "Appointment",
            id,
        )?;
        tracing::info!(appointment_id = %id, from = %current.status, to = %next, "Appointment status changed");
        Ok(updated)
    }

    pub async fn delete(&self, caller: &Principal, facility_id: Uuid, id: Uuid) -> Result<(), AppError> {
        caller.authorize(facility_id, Permission::ManageAppointments)?;
        deleted(self.appointments.delete(facility_id, id).await?, "Appointment", id)
    }
}
