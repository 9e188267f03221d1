use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use klinik_core::models::{
    NewPatient, Patient, PatientUpdate, parse_field, parse_optional_field,
};
use klinik_core::{AppError, PageRequest};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePatientRequest {
    /// Generated as `{FACILITY_CODE}-{YYYYMM}-{NNNNN}` when omitted
    pub mrn: Option<String>,
    /// 16-digit national identity number
    pub nik: Option<String>,
    pub full_name: String,
    /// `male` or `female`
    pub gender: String,
    pub birth_date: NaiveDate,
    pub birth_place: Option<String>,
    /// `A`, `B`, `AB` or `O`, optionally followed by `+` or `-`
    pub blood_type: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    /// 13-digit BPJS card number
    pub bpjs_number: Option<String>,
}

impl CreatePatientRequest {
    pub fn into_input(self) -> Result<NewPatient, AppError> {
        Ok(NewPatient {
            gender: parse_field("gender", &self.gender)?,
            blood_type: parse_optional_field("blood_type", self.blood_type.as_deref())?,
            mrn: self.mrn,
            nik: self.nik,
            full_name: self.full_name,
            birth_date: self.birth_date,
            birth_place: self.birth_place,
            phone: self.phone,
            address: self.address,
            bpjs_number: self.bpjs_number,
        })
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdatePatientRequest {
    pub nik: Option<String>,
    pub full_name: Option<String>,
    pub gender: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub birth_place: Option<String>,
    pub blood_type: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub bpjs_number: Option<String>,
}

impl UpdatePatientRequest {
    pub fn into_update(self) -> Result<PatientUpdate, AppError> {
        Ok(PatientUpdate {
            gender: parse_optional_field("gender", self.gender.as_deref())?,
            blood_type: parse_optional_field("blood_type", self.blood_type.as_deref())?,
            nik: self.nik,
            full_name: self.full_name,
            birth_date: self.birth_date,
            birth_place: self.birth_place,
            phone: self.phone,
            address: self.address,
            bpjs_number: self.bpjs_number,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PatientResponse {
    pub id: Uuid,
    pub facility_id: Uuid,
    pub mrn: String,
    pub nik: Option<String>,
    pub full_name: String,
    pub gender: String,
    pub birth_date: NaiveDate,
    pub birth_place: Option<String>,
    pub blood_type: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub bpjs_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Patient> for PatientResponse {
    fn from(p: Patient) -> Self {
        Self {
            id: p.id,
            facility_id: p.facility_id,
            mrn: p.mrn,
            nik: p.nik,
            full_name: p.full_name,
            gender: p.gender.to_string(),
            birth_date: p.birth_date,
            birth_place: p.birth_place,
            blood_type: p.blood_type.map(|b| b.to_string()),
            phone: p.phone,
            address: p.address,
            bpjs_number: p.bpjs_number,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct PatientListQuery {
    /// Matches name, MRN or NIK
    pub q: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl PatientListQuery {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.page_size)
    }
}
