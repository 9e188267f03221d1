use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::validation::Validator;

string_enum! {
    pub enum Gender {
        Male => "male",
        Female => "female",
    }
}

string_enum! {
    pub enum BloodType {
        A => "A",
        APositive => "A+",
        ANegative => "A-",
        B => "B",
        BPositive => "B+",
        BNegative => "B-",
        Ab => "AB",
        AbPositive => "AB+",
        AbNegative => "AB-",
        O => "O",
        OPositive => "O+",
        ONegative => "O-",
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Patient {
    pub id: Uuid,
    pub facility_id: Uuid,
    pub mrn: String,
    pub nik: Option<String>,
    pub full_name: String,
    pub gender: Gender,
    pub birth_date: NaiveDate,
    pub birth_place: Option<String>,
    pub blood_type: Option<BloodType>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub bpjs_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Patient {
    /// Age in completed years on `on`.
    pub fn age_on(&self, on: NaiveDate) -> u32 {
        on.years_since(self.birth_date).unwrap_or(0)
    }
}

#[derive(Debug, Clone)]
pub struct NewPatient {
    /// Generated from the facility code when absent.
    pub mrn: Option<String>,
    pub nik: Option<String>,
    pub full_name: String,
    pub gender: Gender,
    pub birth_date: NaiveDate,
    pub birth_place: Option<String>,
    pub blood_type: Option<BloodType>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub bpjs_number: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct PatientUpdate {
    pub nik: Option<String>,
    pub full_name: Option<String>,
    pub gender: Option<Gender>,
    pub birth_date: Option<NaiveDate>,
    pub birth_place: Option<String>,
    pub blood_type: Option<BloodType>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub bpjs_number: Option<String>,
}

const NIK_LEN: usize = 16;
const BPJS_LEN: usize = 13;

impl NewPatient {
    pub fn validate(&self, today: NaiveDate) -> Result<(), AppError> {
        let mut v = Validator::new();
        if let Some(mrn) = self.mrn.as_deref() {
            v.required("mrn", mrn).max_len("mrn", Some(mrn), 40);
        }
        v.required("full_name", &self.full_name)
            .max_len("full_name", Some(&self.full_name), 200)
            .digits("nik", self.nik.as_deref(), NIK_LEN)
            .digits("bpjs_number", self.bpjs_number.as_deref(), BPJS_LEN)
            .not_future("birth_date", Some(self.birth_date), today)
            .max_len("birth_place", self.birth_place.as_deref(), 100)
            .phone("phone", self.phone.as_deref())
            .max_len("address", self.address.as_deref(), 500)
            .finish()
    }
}

impl PatientUpdate {
    pub fn validate(&self, today: NaiveDate) -> Result<(), AppError> {
        Validator::new()
            .not_blank("full_name", self.full_name.as_deref())
            .max_len("full_name", self.full_name.as_deref(), 200)
            .digits("nik", self.nik.as_deref(), NIK_LEN)
            .digits("bpjs_number", self.bpjs_number.as_deref(), BPJS_LEN)
            .not_future("birth_date", self.birth_date, today)
            .max_len("birth_place", self.birth_place.as_deref(), 100)
            .phone("phone", self.phone.as_deref())
            .max_len("address", self.address.as_deref(), 500)
            .finish()
    }
}

/// Month prefix shared by generated MRNs: `{FACILITY_CODE}-{YYYYMM}-`.
pub fn mrn_prefix(facility_code: &str, on: NaiveDate) -> String {
    format!("{}-{:04}{:02}-", facility_code, on.year(), on.month())
}

/// Format a generated MRN: `{FACILITY_CODE}-{YYYYMM}-{NNNNN}`.
pub fn format_mrn(facility_code: &str, on: NaiveDate, sequence: i64) -> String {
    format!("{}{:05}", mrn_prefix(facility_code, on), sequence)
}
