use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::traits::Validate;
use crate::validation::Validator;

string_enum! {
    pub enum DiagnosisType {
        Primary => "primary",
        Secondary => "secondary",
    }
}

string_enum! {
    pub enum LabTestStatus {
        Ordered => "ordered",
        InProgress => "in_progress",
        Completed => "completed",
        Cancelled => "cancelled",
    }
}

// ---------------------------------------------------------------------------
// Diagnosis
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct Diagnosis {
    pub id: Uuid,
    pub appointment_id: Uuid,
    pub icd10_code: String,
    pub description: String,
    pub diagnosis_type: DiagnosisType,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct DiagnosisInput {
    pub icd10_code: String,
    pub description: String,
    pub diagnosis_type: DiagnosisType,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct DiagnosisUpdate {
    pub icd10_code: Option<String>,
    pub description: Option<String>,
    pub diagnosis_type: Option<DiagnosisType>,
    pub notes: Option<String>,
}

impl DiagnosisInput {
    pub fn validate(&self) -> Result<(), AppError> {
        Validator::new()
            .icd10("icd10_code", Some(&self.icd10_code))
            .required("description", &self.description)
            .max_len("description", Some(&self.description), 500)
            .max_len("notes", self.notes.as_deref(), 2000)
            .finish()
    }
}

impl DiagnosisUpdate {
    pub fn validate(&self) -> Result<(), AppError> {
        Validator::new()
            .icd10("icd10_code", self.icd10_code.as_deref())
            .not_blank("description", self.description.as_deref())
            .max_len("description", self.description.as_deref(), 500)
            .max_len("notes", self.notes.as_deref(), 2000)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Prescription
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct Prescription {
    pub id: Uuid,
    pub appointment_id: Uuid,
    pub drug_name: String,
    pub dosage: String,
    pub frequency: String,
    pub route: Option<String>,
    pub quantity: i32,
    pub duration_days: Option<i32>,
    pub instructions: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct PrescriptionInput {
    pub drug_name: String,
    pub dosage: String,
    pub frequency: String,
    pub route: Option<String>,
    pub quantity: i32,
    pub duration_days: Option<i32>,
    pub instructions: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct PrescriptionUpdate {
    pub drug_name: Option<String>,
    pub dosage: Option<String>,
    pub frequency: Option<String>,
    pub route: Option<String>,
    pub quantity: Option<i32>,
    pub duration_days: Option<i32>,
    pub instructions: Option<String>,
}

impl PrescriptionInput {
    pub fn validate(&self) -> Result<(), AppError> {
        Validator::new()
            .required("drug_name", &self.drug_name)
            .max_len("drug_name", Some(&self.drug_name), 200)
            .required("dosage", &self.dosage)
            .max_len("dosage", Some(&self.dosage), 100)
            .required("frequency", &self.frequency)
            .max_len("frequency", Some(&self.frequency), 100)
            .max_len("route", self.route.as_deref(), 50)
            .range("quantity", Some(self.quantity), 1, 10_000)
            .range("duration_days", self.duration_days, 1, 365)
            .max_len("instructions", self.instructions.as_deref(), 1000)
            .finish()
    }
}

impl PrescriptionUpdate {
    pub fn validate(&self) -> Result<(), AppError> {
        Validator::new()
            .not_blank("drug_name", self.drug_name.as_deref())
            .max_len("drug_name", self.drug_name.as_deref(), 200)
            .not_blank("dosage", self.dosage.as_deref())
            .max_len("dosage", self.dosage.as_deref(), 100)
            .not_blank("frequency", self.frequency.as_deref())
            .max_len("frequency", self.frequency.as_deref(), 100)
            .max_len("route", self.route.as_deref(), 50)
            .range("quantity", self.quantity, 1, 10_000)
            .range("duration_days", self.duration_days, 1, 365)
            .max_len("instructions", self.instructions.as_deref(), 1000)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Laboratorium
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct LabTest {
    pub id: Uuid,
    pub appointment_id: Uuid,
    pub test_name: String,
    pub specimen: Option<String>,
    pub result: Option<String>,
    pub unit: Option<String>,
    pub reference_range: Option<String>,
    pub status: LabTestStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct LabTestInput {
    pub test_name: String,
    pub specimen: Option<String>,
    pub result: Option<String>,
    pub unit: Option<String>,
    pub reference_range: Option<String>,
    /// Defaults to `ordered`, or `completed` when a result is submitted.
    pub status: Option<LabTestStatus>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct LabTestUpdate {
    pub test_name: Option<String>,
    pub specimen: Option<String>,
    pub result: Option<String>,
    pub unit: Option<String>,
    pub reference_range: Option<String>,
    pub status: Option<LabTestStatus>,
    pub notes: Option<String>,
}

impl LabTestInput {
    pub fn validate(&self) -> Result<(), AppError> {
        Validator::new()
            .required("test_name", &self.test_name)
            .max_len("test_name", Some(&self.test_name), 200)
            .max_len("specimen", self.specimen.as_deref(), 100)
            .max_len("result", self.result.as_deref(), 1000)
            .max_len("unit", self.unit.as_deref(), 50)
            .max_len("reference_range", self.reference_range.as_deref(), 100)
            .max_len("notes", self.notes.as_deref(), 2000)
            .finish()
    }

    pub fn effective_status(&self) -> LabTestStatus {
        match (self.status, &self.result) {
            (Some(status), _) => status,
            (None, Some(_)) => LabTestStatus::Completed,
            (None, None) => LabTestStatus::Ordered,
        }
    }
}

impl LabTestUpdate {
    pub fn validate(&self) -> Result<(), AppError> {
        Validator::new()
            .not_blank("test_name", self.test_name.as_deref())
            .max_len("test_name", self.test_name.as_deref(), 200)
            .max_len("specimen", self.specimen.as_deref(), 100)
            .max_len("result", self.result.as_deref(), 1000)
            .max_len("unit", self.unit.as_deref(), 50)
            .max_len("reference_range", self.reference_range.as_deref(), 100)
            .max_len("notes", self.notes.as_deref(), 2000)
            .finish()
    }
}

macro_rules! impl_validate {
    ($($ty:ty),+) => {
        $(impl Validate for $ty {
            fn validate(&self) -> Result<(), AppError> {
                <$ty>::validate(self)
            }
        })+
    };
}

impl_validate!(
    DiagnosisInput,
    DiagnosisUpdate,
    PrescriptionInput,
    PrescriptionUpdate,
    LabTestInput,
    LabTestUpdate
);
