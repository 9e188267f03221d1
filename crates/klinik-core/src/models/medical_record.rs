use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::appointment::Appointment;
use crate::models::clinical::{Diagnosis, LabTest, Prescription};
use crate::validation::Validator;

/// Encounter-level summary written by the practitioner. One per appointment.
#[derive(Debug, Clone, Serialize)]
pub struct MedicalRecord {
    pub id: Uuid,
    pub appointment_id: Uuid,
    pub patient_id: Uuid,
    pub practitioner_id: Option<Uuid>,
    pub physical_examination: Option<String>,
    pub assessment: Option<String>,
    pub plan: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Used for both create and partial update; nothing is required.
#[derive(Debug, Clone, Default)]
pub struct MedicalRecordInput {
    pub practitioner_id: Option<Uuid>,
    pub physical_examination: Option<String>,
    pub assessment: Option<String>,
    pub plan: Option<String>,
    pub notes: Option<String>,
}

impl MedicalRecordInput {
    pub fn validate(&self) -> Result<(), AppError> {
        Validator::new()
            .max_len("physical_examination", self.physical_examination.as_deref(), 4000)
            .max_len("assessment", self.assessment.as_deref(), 4000)
            .max_len("plan", self.plan.as_deref(), 4000)
            .max_len("notes", self.notes.as_deref(), 4000)
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VitalSigns {
    pub systolic: Option<i32>,
    pub diastolic: Option<i32>,
    pub pulse: Option<i32>,
    pub respiratory_rate: Option<i32>,
    pub temperature_c: Option<f64>,
    pub spo2: Option<i32>,
    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,
}

impl VitalSigns {
    fn check(&self, v: &mut Validator) {
        v.range("vital_signs.systolic", self.systolic, 40, 300)
            .range("vital_signs.diastolic", self.diastolic, 20, 200)
            .range("vital_signs.pulse", self.pulse, 20, 250)
            .range("vital_signs.respiratory_rate", self.respiratory_rate, 5, 80)
            .range("vital_signs.temperature_c", self.temperature_c, 30.0, 45.0)
            .range("vital_signs.spo2", self.spo2, 50, 100)
            .range("vital_signs.weight_kg", self.weight_kg, 0.3, 400.0)
            .range("vital_signs.height_cm", self.height_cm, 20.0, 260.0);
        if let (Some(sys), Some(dia)) = (self.systolic, self.diastolic)
            && dia >= sys
        {
            v.push("vital_signs.diastolic", "must be lower than systolic");
        }
    }

    /// Body mass index, when both weight and height are known.
    pub fn bmi(&self) -> Option<f64> {
        match (self.weight_kg, self.height_cm) {
            (Some(w), Some(h)) if h > 0.0 => {
                let m = h / 100.0;
                Some((w / (m * m) * 10.0).round() / 10.0)
            }
            _ => None,
        }
    }
}

/// Subjective history and vital signs taken at the start of a visit.
#[derive(Debug, Clone, Serialize)]
pub struct Anamnesis {
    pub id: Uuid,
    pub appointment_id: Uuid,
    pub chief_complaint: String,
    pub present_illness: Option<String>,
    pub past_medical_history: Option<String>,
    pub family_history: Option<String>,
    pub allergies: Option<String>,
    pub current_medications: Option<String>,
    pub vital_signs: VitalSigns,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct AnamnesisInput {
    pub chief_complaint: Option<String>,
    pub present_illness: Option<String>,
    pub past_medical_history: Option<String>,
    pub family_history: Option<String>,
    pub allergies: Option<String>,
    pub current_medications: Option<String>,
    pub vital_signs: VitalSigns,
}

impl AnamnesisInput {
    fn check(&self, v: &mut Validator) {
        v.max_len("chief_complaint", self.chief_complaint.as_deref(), 1000)
            .max_len("present_illness", self.present_illness.as_deref(), 4000)
            .max_len("past_medical_history", self.past_medical_history.as_deref(), 4000)
            .max_len("family_history", self.family_history.as_deref(), 2000)
            .max_len("allergies", self.allergies.as_deref(), 1000)
            .max_len("current_medications", self.current_medications.as_deref(), 2000);
        self.vital_signs.check(v);
    }

    /// Creation requires a chief complaint.
    pub fn validate_new(&self) -> Result<(), AppError> {
        let mut v = Validator::new();
        v.required("chief_complaint", self.chief_complaint.as_deref().unwrap_or(""));
        self.check(&mut v);
        v.finish()
    }

    pub fn validate_update(&self) -> Result<(), AppError> {
        let mut v = Validator::new();
        v.not_blank("chief_complaint", self.chief_complaint.as_deref());
        self.check(&mut v);
        v.finish()
    }
}

/// One visit in a patient's history, with everything recorded during it.
#[derive(Debug, Clone, Serialize)]
pub struct MedicalHistoryEntry {
    pub appointment: Appointment,
    pub medical_record: Option<MedicalRecord>,
    pub anamnesis: Option<Anamnesis>,
    pub diagnoses: Vec<Diagnosis>,
    pub prescriptions: Vec<Prescription>,
    pub lab_tests: Vec<LabTest>,
}
