//! Specialty encounter records (KIA, KB, immunization, HIV/STI counseling, ...).
//!
//! Every kind is a flat attribute bag. They share one table: the kind code
//! plus the payload as JSONB. The typed structs below are the schema for
//! each payload; input is parsed through them so unknown or mistyped fields
//! are rejected before anything is written.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::validation::Validator;

string_enum! {
    pub enum EncounterKind {
        Immunization => "immunization",
        FamilyPlanning => "family_planning",
        AntenatalCareObservation => "antenatal_care_observation",
        Partograph => "partograph",
        PostpartumObservation => "postpartum_observation",
        NeonatalVisit => "neonatal_visit",
        HivCounseling => "hiv_counseling",
        StiExamination => "sti_examination",
        Odontogram => "odontogram",
        ChildGrowth => "child_growth",
        Tuberculosis => "tuberculosis",
        Referral => "referral",
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EncounterRecord {
    pub id: Uuid,
    pub medical_record_id: Uuid,
    pub appointment_id: Uuid,
    pub kind: EncounterKind,
    pub data: serde_json::Value,
    pub recorded_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Immunization {
    pub vaccine: String,
    pub dose_number: i32,
    pub batch_number: Option<String>,
    pub site: Option<String>,
    pub route: Option<String>,
    pub adverse_event: Option<String>,
    pub next_due_date: Option<NaiveDate>,
}

/// KB (Keluarga Berencana) visit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FamilyPlanning {
    pub method: String,
    #[serde(default)]
    pub is_new_acceptor: bool,
    pub last_menstrual_period: Option<NaiveDate>,
    pub side_effects: Option<String>,
    pub next_visit_date: Option<NaiveDate>,
}

pub const FAMILY_PLANNING_METHODS: &[&str] = &[
    "pill",
    "injection_1m",
    "injection_3m",
    "implant",
    "iud",
    "condom",
    "mow",
    "mop",
    "lam",
];

/// ANC visit in the KIA (maternal & child health) program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AntenatalCareObservation {
    pub visit_number: i32,
    pub gestational_age_weeks: i32,
    pub gravida: i32,
    pub para: i32,
    pub abortus: i32,
    pub fundal_height_cm: Option<f64>,
    pub fetal_heart_rate: Option<i32>,
    pub fetal_presentation: Option<String>,
    pub hemoglobin: Option<f64>,
    pub tetanus_immunization_status: Option<String>,
    pub risk_factors: Option<String>,
    pub estimated_due_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Partograph {
    pub observed_at: DateTime<Utc>,
    pub cervical_dilation_cm: f64,
    pub descent_fifths: Option<i32>,
    pub contractions_per_10_min: Option<i32>,
    pub contraction_duration_seconds: Option<i32>,
    pub fetal_heart_rate: Option<i32>,
    pub amniotic_fluid: Option<String>,
    pub moulding: Option<String>,
    pub maternal_pulse: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PostpartumObservation {
    pub day_postpartum: i32,
    pub uterine_involution: Option<String>,
    pub lochia: Option<String>,
    pub breastfeeding: Option<bool>,
    pub systolic: Option<i32>,
    pub diastolic: Option<i32>,
    pub temperature_c: Option<f64>,
    pub complications: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NeonatalVisit {
    pub visit_number: i32,
    pub age_days: i32,
    pub birth_weight_grams: Option<i32>,
    pub weight_grams: Option<i32>,
    pub length_cm: Option<f64>,
    pub vitamin_k_given: Option<bool>,
    pub hb0_given: Option<bool>,
    pub cord_condition: Option<String>,
    pub feeding: Option<String>,
}

/// VCT (voluntary counseling and testing) session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HivCounseling {
    pub counseling_type: String,
    pub consent_given: bool,
    pub test_result: Option<String>,
    pub risk_group: Option<String>,
    pub referred_to_art: Option<bool>,
}

/// IMS (infeksi menular seksual) examination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StiExamination {
    pub symptoms: Option<String>,
    pub syndrome: Option<String>,
    pub lab_result: Option<String>,
    pub treatment: Option<String>,
    pub partner_notified: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToothRecord {
    /// FDI two-digit tooth number.
    pub tooth: String,
    pub condition: String,
    pub surface: Option<String>,
    pub treatment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Odontogram {
    pub teeth: Vec<ToothRecord>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChildGrowth {
    pub age_months: i32,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub head_circumference_cm: Option<f64>,
    pub nutritional_status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Tuberculosis {
    pub case_type: String,
    pub sputum_result: Option<String>,
    pub treatment_phase: Option<String>,
    pub drug_regimen: Option<String>,
    pub month_of_treatment: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Referral {
    pub destination_facility: String,
    pub reason: String,
    pub urgency: Option<String>,
    pub referral_date: Option<NaiveDate>,
}

/// A typed specialty payload, tagged by its [`EncounterKind`] code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum EncounterPayload {
    Immunization(Immunization),
    FamilyPlanning(FamilyPlanning),
    AntenatalCareObservation(AntenatalCareObservation),
    Partograph(Partograph),
    PostpartumObservation(PostpartumObservation),
    NeonatalVisit(NeonatalVisit),
    HivCounseling(HivCounseling),
    StiExamination(StiExamination),
    Odontogram(Odontogram),
    ChildGrowth(ChildGrowth),
    Tuberculosis(Tuberculosis),
    Referral(Referral),
}

impl EncounterPayload {
    /// Parse raw JSON for the given kind and run its field checks.
    pub fn parse(kind: EncounterKind, data: serde_json::Value) -> Result<Self, AppError> {
        if !data.is_object() {
            return Err(AppError::invalid("data", "must be a JSON object"));
        }
        let tagged = serde_json::json!({ "kind": kind.as_str(), "data": data });
        let payload: EncounterPayload = serde_json::from_value(tagged)
            .map_err(|e| AppError::invalid("data", e.to_string()))?;
        payload.validate()?;
        Ok(payload)
    }

    pub fn kind(&self) -> EncounterKind {
        match self {
            EncounterPayload::Immunization(_) => EncounterKind::Immunization,
            EncounterPayload::FamilyPlanning(_) => EncounterKind::FamilyPlanning,
            EncounterPayload::AntenatalCareObservation(_) => {
                EncounterKind::AntenatalCareObservation
            }
            EncounterPayload::Partograph(_) => EncounterKind::Partograph,
            EncounterPayload::PostpartumObservation(_) => EncounterKind::PostpartumObservation,
            EncounterPayload::NeonatalVisit(_) => EncounterKind::NeonatalVisit,
            EncounterPayload::HivCounseling(_) => EncounterKind::HivCounseling,
            EncounterPayload::StiExamination(_) => EncounterKind::StiExamination,
            EncounterPayload::Odontogram(_) => EncounterKind::Odontogram,
            EncounterPayload::ChildGrowth(_) => EncounterKind::ChildGrowth,
            EncounterPayload::Tuberculosis(_) => EncounterKind::Tuberculosis,
            EncounterPayload::Referral(_) => EncounterKind::Referral,
        }
    }

    /// The untagged payload, as stored in the `data` column.
    pub fn to_data(&self) -> Result<serde_json::Value, AppError> {
        let mut tagged = serde_json::to_value(self)?;
        Ok(tagged
            .get_mut("data")
            .map(serde_json::Value::take)
            .unwrap_or(serde_json::Value::Null))
    }

    pub fn validate(&self) -> Result<(), AppError> {
        let mut v = Validator::new();
        match self {
            EncounterPayload::Immunization(p) => {
                v.required("data.vaccine", &p.vaccine)
                    .range("data.dose_number", Some(p.dose_number), 1, 10);
            }
            EncounterPayload::FamilyPlanning(p) => {
                v.one_of("data.method", Some(&p.method), FAMILY_PLANNING_METHODS);
            }
            EncounterPayload::AntenatalCareObservation(p) => {
                v.range("data.visit_number", Some(p.visit_number), 1, 20)
                    .range("data.gestational_age_weeks", Some(p.gestational_age_weeks), 0, 45)
                    .range("data.gravida", Some(p.gravida), 1, 20)
                    .range("data.para", Some(p.para), 0, 20)
                    .range("data.abortus", Some(p.abortus), 0, 20)
                    .range("data.fundal_height_cm", p.fundal_height_cm, 0.0, 60.0)
                    .range("data.fetal_heart_rate", p.fetal_heart_rate, 60, 220)
                    .range("data.hemoglobin", p.hemoglobin, 2.0, 25.0);
                if i64::from(p.para) + i64::from(p.abortus) >= i64::from(p.gravida) {
                    v.push("data.para", "para + abortus must be less than gravida");
                }
            }
            EncounterPayload::Partograph(p) => {
                v.range("data.cervical_dilation_cm", Some(p.cervical_dilation_cm), 0.0, 10.0)
                    .range("data.descent_fifths", p.descent_fifths, 0, 5)
                    .range("data.contractions_per_10_min", p.contractions_per_10_min, 0, 10)
                    .range(
                        "data.contraction_duration_seconds",
                        p.contraction_duration_seconds,
                        0,
                        180,
                    )
                    .range("data.fetal_heart_rate", p.fetal_heart_rate, 60, 220)
                    .range("data.maternal_pulse", p.maternal_pulse, 20, 250);
            }
            EncounterPayload::PostpartumObservation(p) => {
                v.range("data.day_postpartum", Some(p.day_postpartum), 0, 42)
                    .range("data.systolic", p.systolic, 40, 300)
                    .range("data.diastolic", p.diastolic, 20, 200)
                    .range("data.temperature_c", p.temperature_c, 30.0, 45.0);
            }
            EncounterPayload::NeonatalVisit(p) => {
                v.range("data.visit_number", Some(p.visit_number), 1, 3)
                    .range("data.age_days", Some(p.age_days), 0, 28)
                    .range("data.birth_weight_grams", p.birth_weight_grams, 300, 7000)
                    .range("data.weight_grams", p.weight_grams, 300, 10000)
                    .range("data.length_cm", p.length_cm, 20.0, 70.0);
            }
            EncounterPayload::HivCounseling(p) => {
                v.one_of(
                    "data.counseling_type",
                    Some(&p.counseling_type),
                    &["pre_test", "post_test"],
                )
                .one_of(
                    "data.test_result",
                    p.test_result.as_deref(),
                    &["reactive", "non_reactive", "indeterminate"],
                );
                if p.test_result.is_some() && !p.consent_given {
                    v.push("data.test_result", "requires consent_given");
                }
            }
            EncounterPayload::StiExamination(p) => {
                let any = p.symptoms.is_some()
                    || p.syndrome.is_some()
                    || p.lab_result.is_some()
                    || p.treatment.is_some()
                    || p.partner_notified.is_some();
                if !any {
                    v.push("data", "at least one field is required");
                }
            }
            EncounterPayload::Odontogram(p) => {
                if p.teeth.is_empty() {
                    v.push("data.teeth", "must not be empty");
                }
                for (i, tooth) in p.teeth.iter().enumerate() {
                    if !is_fdi_tooth(&tooth.tooth) {
                        v.push(
                            &format!("data.teeth[{i}].tooth"),
                            "must be an FDI tooth number (11-48 or 51-85)",
                        );
                    }
                    v.required(&format!("data.teeth[{i}].condition"), &tooth.condition);
                }
            }
            EncounterPayload::ChildGrowth(p) => {
                v.range("data.age_months", Some(p.age_months), 0, 72)
                    .range("data.weight_kg", Some(p.weight_kg), 0.3, 60.0)
                    .range("data.height_cm", Some(p.height_cm), 20.0, 150.0)
                    .range("data.head_circumference_cm", p.head_circumference_cm, 20.0, 60.0);
            }
            EncounterPayload::Tuberculosis(p) => {
                v.required("data.case_type", &p.case_type)
                    .one_of(
                        "data.treatment_phase",
                        p.treatment_phase.as_deref(),
                        &["intensive", "continuation"],
                    )
                    .range("data.month_of_treatment", p.month_of_treatment, 1, 24);
            }
            EncounterPayload::Referral(p) => {
                v.required("data.destination_facility", &p.destination_facility)
                    .required("data.reason", &p.reason)
                    .one_of(
                        "data.urgency",
                        p.urgency.as_deref(),
                        &["routine", "urgent", "emergency"],
                    );
            }
        }
        v.finish()
    }
}

/// FDI notation: permanent teeth 11-18 .. 41-48, primary teeth 51-55 .. 81-85.
pub fn is_fdi_tooth(code: &str) -> bool {
    let bytes = code.as_bytes();
    if bytes.len() != 2 || !bytes.iter().all(u8::is_ascii_digit) {
        return false;
    }
    let quadrant = bytes[0] - b'0';
    let tooth = bytes[1] - b'0';
    match quadrant {
        1..=4 => (1..=8).contains(&tooth),
        5..=8 => (1..=5).contains(&tooth),
        _ => false,
    }
}

/// Shallow-merge a partial payload over the stored one. Keys in `patch`
/// replace keys in `current`; everything else is kept.
pub fn merge_data(current: &serde_json::Value, patch: serde_json::Value) -> serde_json::Value {
    match (current, patch) {
        (serde_json::Value::Object(base), serde_json::Value::Object(changes)) => {
            let mut merged = base.clone();
            merged.extend(changes);
            serde_json::Value::Object(merged)
        }
        (_, patch) => patch,
    }
}
