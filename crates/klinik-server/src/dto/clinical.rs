use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use klinik_core::models::{
    Anamnesis, AnamnesisInput, Diagnosis, DiagnosisInput, DiagnosisType, DiagnosisUpdate,
    LabTest, LabTestInput, LabTestUpdate, MedicalHistoryEntry, MedicalRecord,
    MedicalRecordInput, Patient, Prescription, PrescriptionInput, PrescriptionUpdate, VitalSigns,
    parse_field, parse_optional_field,
};
use klinik_core::{AppError, Recommendation};

use super::{AppointmentResponse, PatientResponse};

// ---------------------------------------------------------------------------
// Medical record
// ---------------------------------------------------------------------------

/// Body for both create and update; on update only present fields change.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct MedicalRecordRequest {
    /// Defaults to the appointment's practitioner on create
    pub practitioner_id: Option<Uuid>,
    pub physical_examination: Option<String>,
    pub assessment: Option<String>,
    pub plan: Option<String>,
    pub notes: Option<String>,
}

impl From<MedicalRecordRequest> for MedicalRecordInput {
    fn from(r: MedicalRecordRequest) -> Self {
        Self {
            practitioner_id: r.practitioner_id,
            physical_examination: r.physical_examination,
            assessment: r.assessment,
            plan: r.plan,
            notes: r.notes,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MedicalRecordResponse {
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

impl From<MedicalRecord> for MedicalRecordResponse {
    fn from(m: MedicalRecord) -> Self {
        Self {
            id: m.id,
            appointment_id: m.appointment_id,
            patient_id: m.patient_id,
            practitioner_id: m.practitioner_id,
            physical_examination: m.physical_examination,
            assessment: m.assessment,
            plan: m.plan,
            notes: m.notes,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Anamnesis
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct VitalSignsBody {
    /// mmHg
    pub systolic: Option<i32>,
    /// mmHg
    pub diastolic: Option<i32>,
    /// beats per minute
    pub pulse: Option<i32>,
    /// breaths per minute
    pub respiratory_rate: Option<i32>,
    pub temperature_c: Option<f64>,
    /// percent
    pub spo2: Option<i32>,
    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,
}

impl From<VitalSignsBody> for VitalSigns {
    fn from(v: VitalSignsBody) -> Self {
        Self {
            systolic: v.systolic,
            diastolic: v.diastolic,
            pulse: v.pulse,
            respiratory_rate: v.respiratory_rate,
            temperature_c: v.temperature_c,
            spo2: v.spo2,
            weight_kg: v.weight_kg,
            height_cm: v.height_cm,
        }
    }
}

impl From<VitalSigns> for VitalSignsBody {
    fn from(v: VitalSigns) -> Self {
        Self {
            systolic: v.systolic,
            diastolic: v.diastolic,
            pulse: v.pulse,
            respiratory_rate: v.respiratory_rate,
            temperature_c: v.temperature_c,
            spo2: v.spo2,
            weight_kg: v.weight_kg,
            height_cm: v.height_cm,
        }
    }
}

/// `chief_complaint` is required on create.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct AnamnesisRequest {
    pub chief_complaint: Option<String>,
    pub present_illness: Option<String>,
    pub past_medical_history: Option<String>,
    pub family_history: Option<String>,
    pub allergies: Option<String>,
    pub current_medications: Option<String>,
    #[serde(default)]
    pub vital_signs: VitalSignsBody,
}

impl From<AnamnesisRequest> for AnamnesisInput {
    fn from(r: AnamnesisRequest) -> Self {
        Self {
            chief_complaint: r.chief_complaint,
            present_illness: r.present_illness,
            past_medical_history: r.past_medical_history,
            family_history: r.family_history,
            allergies: r.allergies,
            current_medications: r.current_medications,
            vital_signs: r.vital_signs.into(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AnamnesisResponse {
    pub id: Uuid,
    pub appointment_id: Uuid,
    pub chief_complaint: String,
    pub present_illness: Option<String>,
    pub past_medical_history: Option<String>,
    pub family_history: Option<String>,
    pub allergies: Option<String>,
    pub current_medications: Option<String>,
    pub vital_signs: VitalSignsBody,
    /// Derived from weight and height when both are known
    pub bmi: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Anamnesis> for AnamnesisResponse {
    fn from(a: Anamnesis) -> Self {
        Self {
            id: a.id,
            appointment_id: a.appointment_id,
            chief_complaint: a.chief_complaint,
            present_illness: a.present_illness,
            past_medical_history: a.past_medical_history,
            family_history: a.family_history,
            allergies: a.allergies,
            current_medications: a.current_medications,
            bmi: a.vital_signs.bmi(),
            vital_signs: a.vital_signs.into(),
            created_at: a.created_at,
            updated_at: a.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Diagnoses
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateDiagnosisRequest {
    /// ICD-10 code, e.g. `J06.9`
    pub icd10_code: String,
    pub description: String,
    /// `primary` (default) or `secondary`
    pub diagnosis_type: Option<String>,
    pub notes: Option<String>,
}

impl CreateDiagnosisRequest {
    pub fn into_input(self) -> Result<DiagnosisInput, AppError> {
        let diagnosis_type = match self.diagnosis_type.as_deref() {
            Some(raw) => parse_field("diagnosis_type", raw)?,
            None => DiagnosisType::Primary,
        };
        Ok(DiagnosisInput {
            icd10_code: self.icd10_code,
            description: self.description,
            diagnosis_type,
            notes: self.notes,
        })
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateDiagnosisRequest {
    pub icd10_code: Option<String>,
    pub description: Option<String>,
    pub diagnosis_type: Option<String>,
    pub notes: Option<String>,
}

impl UpdateDiagnosisRequest {
    pub fn into_update(self) -> Result<DiagnosisUpdate, AppError> {
        Ok(DiagnosisUpdate {
            diagnosis_type: parse_optional_field("diagnosis_type", self.diagnosis_type.as_deref())?,
            icd10_code: self.icd10_code,
            description: self.description,
            notes: self.notes,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DiagnosisResponse {
    pub id: Uuid,
    pub appointment_id: Uuid,
    pub icd10_code: String,
    pub description: String,
    pub diagnosis_type: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Diagnosis> for DiagnosisResponse {
    fn from(d: Diagnosis) -> Self {
        Self {
            id: d.id,
            appointment_id: d.appointment_id,
            icd10_code: d.icd10_code,
            description: d.description,
            diagnosis_type: d.diagnosis_type.to_string(),
            notes: d.notes,
            created_at: d.created_at,
            updated_at: d.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Prescriptions
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePrescriptionRequest {
    pub drug_name: String,
    /// e.g. `500 mg`
    pub dosage: String,
    /// e.g. `3x sehari`
    pub frequency: String,
    pub route: Option<String>,
    pub quantity: i32,
    pub duration_days: Option<i32>,
    pub instructions: Option<String>,
}

impl From<CreatePrescriptionRequest> for PrescriptionInput {
    fn from(r: CreatePrescriptionRequest) -> Self {
        Self {
            drug_name: r.drug_name,
            dosage: r.dosage,
            frequency: r.frequency,
            route: r.route,
            quantity: r.quantity,
            duration_days: r.duration_days,
            instructions: r.instructions,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdatePrescriptionRequest {
    pub drug_name: Option<String>,
    pub dosage: Option<String>,
    pub frequency: Option<String>,
    pub route: Option<String>,
    pub quantity: Option<i32>,
    pub duration_days: Option<i32>,
    pub instructions: Option<String>,
}

impl From<UpdatePrescriptionRequest> for PrescriptionUpdate {
    fn from(r: UpdatePrescriptionRequest) -> Self {
        Self {
            drug_name: r.drug_name,
            dosage: r.dosage,
            frequency: r.frequency,
            route: r.route,
            quantity: r.quantity,
            duration_days: r.duration_days,
            instructions: r.instructions,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PrescriptionResponse {
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

impl From<Prescription> for PrescriptionResponse {
    fn from(p: Prescription) -> Self {
        Self {
            id: p.id,
            appointment_id: p.appointment_id,
            drug_name: p.drug_name,
            dosage: p.dosage,
            frequency: p.frequency,
            route: p.route,
            quantity: p.quantity,
            duration_days: p.duration_days,
            instructions: p.instructions,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Lab tests
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateLabTestRequest {
    pub test_name: String,
    pub specimen: Option<String>,
    pub result: Option<String>,
    pub unit: Option<String>,
    pub reference_range: Option<String>,
    /// Defaults to `ordered`, or `completed` when a result is given
    pub status: Option<String>,
    pub notes: Option<String>,
}

impl CreateLabTestRequest {
    pub fn into_input(self) -> Result<LabTestInput, AppError> {
        Ok(LabTestInput {
            status: parse_optional_field("status", self.status.as_deref())?,
            test_name: self.test_name,
            specimen: self.specimen,
            result: self.result,
            unit: self.unit,
            reference_range: self.reference_range,
            notes: self.notes,
        })
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateLabTestRequest {
    pub test_name: Option<String>,
    pub specimen: Option<String>,
    pub result: Option<String>,
    pub unit: Option<String>,
    pub reference_range: Option<String>,
    pub status: Option<String>,
    pub notes: Option<String>,
}

impl UpdateLabTestRequest {
    pub fn into_update(self) -> Result<LabTestUpdate, AppError> {
        Ok(LabTestUpdate {
            status: parse_optional_field("status", self.status.as_deref())?,
            test_name: self.test_name,
            specimen: self.specimen,
            result: self.result,
            unit: self.unit,
            reference_range: self.reference_range,
            notes: self.notes,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LabTestResponse {
    pub id: Uuid,
    pub appointment_id: Uuid,
    pub test_name: String,
    pub specimen: Option<String>,
    pub result: Option<String>,
    pub unit: Option<String>,
    pub reference_range: Option<String>,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<LabTest> for LabTestResponse {
    fn from(l: LabTest) -> Self {
        Self {
            id: l.id,
            appointment_id: l.appointment_id,
            test_name: l.test_name,
            specimen: l.specimen,
            result: l.result,
            unit: l.unit,
            reference_range: l.reference_range,
            status: l.status.to_string(),
            notes: l.notes,
            created_at: l.created_at,
            updated_at: l.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Medical history
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, ToSchema)]
pub struct VisitResponse {
    pub appointment: AppointmentResponse,
    pub medical_record: Option<MedicalRecordResponse>,
    pub anamnesis: Option<AnamnesisResponse>,
    pub diagnoses: Vec<DiagnosisResponse>,
    pub prescriptions: Vec<PrescriptionResponse>,
    pub lab_tests: Vec<LabTestResponse>,
}

impl From<MedicalHistoryEntry> for VisitResponse {
    fn from(e: MedicalHistoryEntry) -> Self {
        Self {
            appointment: e.appointment.into(),
            medical_record: e.medical_record.map(Into::into),
            anamnesis: e.anamnesis.map(Into::into),
            diagnoses: e.diagnoses.into_iter().map(Into::into).collect(),
            prescriptions: e.prescriptions.into_iter().map(Into::into).collect(),
            lab_tests: e.lab_tests.into_iter().map(Into::into).collect(),
        }
    }
}

/// Every visit of one patient, newest first.
#[derive(Debug, Serialize, ToSchema)]
pub struct MedicalHistoryResponse {
    pub patient: PatientResponse,
    pub visits: Vec<VisitResponse>,
}

impl MedicalHistoryResponse {
    pub fn new(patient: Patient, visits: Vec<MedicalHistoryEntry>) -> Self {
        Self {
            patient: patient.into(),
            visits: visits.into_iter().map(Into::into).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Recommendations
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, ToSchema)]
pub struct RecommendationResponse {
    pub icd10_code: String,
    pub label: String,
    pub confidence: f32,
    /// True while suggestions are canned
    pub is_placeholder: bool,
}

impl From<Recommendation> for RecommendationResponse {
    fn from(r: Recommendation) -> Self {
        Self {
            icd10_code: r.icd10_code,
            label: r.label,
            confidence: r.confidence,
            is_placeholder: r.is_placeholder,
        }
    }
}
