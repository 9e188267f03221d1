use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::validation::Validator;

string_enum! {
    /// Kind of health facility.
    pub enum FacilityType {
        Puskesmas => "puskesmas",
        Clinic => "clinic",
        Hospital => "hospital",
        Laboratory => "laboratory",
        Pharmacy => "pharmacy",
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Facility {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub facility_type: FacilityType,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewFacility {
    pub code: String,
    pub name: String,
    pub facility_type: FacilityType,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct FacilityUpdate {
    pub name: Option<String>,
    pub facility_type: Option<FacilityType>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

/// Facility codes prefix generated MRNs, so keep them short and URL-safe.
pub fn is_facility_code(code: &str) -> bool {
    (2..=20).contains(&code.len())
        && code
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit() || b == b'-')
}

impl NewFacility {
    pub fn validate(&self) -> Result<(), AppError> {
        let mut v = Validator::new();
        if !is_facility_code(&self.code) {
            v.push("code", "must be 2-20 uppercase letters, digits or '-'");
        }
        v.required("name", &self.name)
            .max_len("name", Some(&self.name), 200)
            .max_len("address", self.address.as_deref(), 500)
            .phone("phone", self.phone.as_deref())
            .email("email", self.email.as_deref())
            .finish()
    }
}

impl FacilityUpdate {
    pub fn validate(&self) -> Result<(), AppError> {
        Validator::new()
            .not_blank("name", self.name.as_deref())
            .max_len("name", self.name.as_deref(), 200)
            .max_len("address", self.address.as_deref(), 500)
            .phone("phone", self.phone.as_deref())
            .email("email", self.email.as_deref())
            .finish()
    }
}
