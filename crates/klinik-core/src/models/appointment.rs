use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::validation::Validator;

string_enum! {
    /// Visit lifecycle of an appointment.
    pub enum AppointmentStatus {
        Scheduled => "scheduled",
        CheckedIn => "checked_in",
        InProgress => "in_progress",
        Completed => "completed",
        Cancelled => "cancelled",
        NoShow => "no_show",
    }
}

impl AppointmentStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AppointmentStatus::Completed | AppointmentStatus::Cancelled | AppointmentStatus::NoShow
        )
    }

    pub fn can_transition_to(&self, next: AppointmentStatus) -> bool {
        use AppointmentStatus::*;
        matches!(
            (self, next),
            (Scheduled, CheckedIn)
                | (Scheduled, Cancelled)
                | (Scheduled, NoShow)
                | (CheckedIn, InProgress)
                | (CheckedIn, Cancelled)
                | (InProgress, Completed)
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Appointment {
    pub id: Uuid,
    pub facility_id: Uuid,
    pub patient_id: Uuid,
    pub practitioner_id: Option<Uuid>,
    pub scheduled_at: DateTime<Utc>,
    pub service_unit: String,
    pub complaint: Option<String>,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub patient_id: Uuid,
    pub practitioner_id: Option<Uuid>,
    pub scheduled_at: DateTime<Utc>,
    pub service_unit: String,
    pub complaint: Option<String>,
    pub notes: Option<String>,
}

/// Editable appointment fields. Status changes go through the transition
/// table instead, see [`AppointmentStatus::can_transition_to`].
#[derive(Debug, Clone, Default)]
pub struct AppointmentUpdate {
    pub practitioner_id: Option<Uuid>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub service_unit: Option<String>,
    pub complaint: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct AppointmentFilter {
    pub date: Option<NaiveDate>,
    pub status: Option<AppointmentStatus>,
    pub patient_id: Option<Uuid>,
    pub practitioner_id: Option<Uuid>,
}

impl AppointmentFilter {
    pub fn matches(&self, appointment: &Appointment) -> bool {
        self.date
            .is_none_or(|d| appointment.scheduled_at.date_naive() == d)
            && self.status.is_none_or(|s| appointment.status == s)
            && self.patient_id.is_none_or(|p| appointment.patient_id == p)
            && self
                .practitioner_id
                .is_none_or(|p| appointment.practitioner_id == Some(p))
    }
}

impl NewAppointment {
    pub fn validate(&self) -> Result<(), AppError> {
        Validator::new()
            .required("service_unit", &self.service_unit)
            .max_len("service_unit", Some(&self.service_unit), 100)
            .max_len("complaint", self.complaint.as_deref(), 1000)
            .max_len("notes", self.notes.as_deref(), 2000)
            .finish()
    }
}

impl AppointmentUpdate {
    pub fn validate(&self) -> Result<(), AppError> {
        Validator::new()
            .not_blank("service_unit", self.service_unit.as_deref())
            .max_len("service_unit", self.service_unit.as_deref(), 100)
            .max_len("complaint", self.complaint.as_deref(), 1000)
            .max_len("notes", self.notes.as_deref(), 2000)
            .finish()
    }
}
