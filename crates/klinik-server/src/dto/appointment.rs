use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use klinik_core::models::{
    Appointment, AppointmentFilter, AppointmentStatus, AppointmentUpdate, NewAppointment,
    parse_field, parse_optional_field,
};
use klinik_core::{AppError, PageRequest};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateAppointmentRequest {
    pub patient_id: Uuid,
    /// A doctor, nurse or midwife of the same facility
    pub practitioner_id: Option<Uuid>,
    pub scheduled_at: DateTime<Utc>,
    /// Outpatient unit, e.g. `Poli Umum`, `Poli KIA`
    pub service_unit: String,
    pub complaint: Option<String>,
    pub notes: Option<String>,
}

impl From<CreateAppointmentRequest> for NewAppointment {
    fn from(r: CreateAppointmentRequest) -> Self {
        Self {
            patient_id: r.patient_id,
            practitioner_id: r.practitioner_id,
            scheduled_at: r.scheduled_at,
            service_unit: r.service_unit,
            complaint: r.complaint,
            notes: r.notes,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateAppointmentRequest {
    pub practitioner_id: Option<Uuid>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub service_unit: Option<String>,
    pub complaint: Option<String>,
    pub notes: Option<String>,
}

impl From<UpdateAppointmentRequest> for AppointmentUpdate {
    fn from(r: UpdateAppointmentRequest) -> Self {
        Self {
            practitioner_id: r.practitioner_id,
            scheduled_at: r.scheduled_at,
            service_unit: r.service_unit,
            complaint: r.complaint,
            notes: r.notes,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AppointmentStatusRequest {
    /// Target status; must be reachable from the current one
    pub status: String,
}

impl AppointmentStatusRequest {
    pub fn status(&self) -> Result<AppointmentStatus, AppError> {
        parse_field("status", &self.status)
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AppointmentResponse {
    pub id: Uuid,
    pub facility_id: Uuid,
    pub patient_id: Uuid,
    pub practitioner_id: Option<Uuid>,
    pub scheduled_at: DateTime<Utc>,
    pub service_unit: String,
    pub complaint: Option<String>,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Appointment> for AppointmentResponse {
    fn from(a: Appointment) -> Self {
        Self {
            id: a.id,
            facility_id: a.facility_id,
            patient_id: a.patient_id,
            practitioner_id: a.practitioner_id,
            scheduled_at: a.scheduled_at,
            service_unit: a.service_unit,
            complaint: a.complaint,
            status: a.status.to_string(),
            notes: a.notes,
            created_at: a.created_at,
            updated_at: a.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct AppointmentListQuery {
    /// Scheduled day (UTC), `YYYY-MM-DD`
    pub date: Option<NaiveDate>,
    pub status: Option<String>,
    pub patient_id: Option<Uuid>,
    pub practitioner_id: Option<Uuid>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl AppointmentListQuery {
    pub fn filter(&self) -> Result<AppointmentFilter, AppError> {
        Ok(AppointmentFilter {
            date: self.date,
            status: parse_optional_field("status", self.status.as_deref())?,
            patient_id: self.patient_id,
            practitioner_id: self.practitioner_id,
        })
    }

    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.page_size)
    }
}
