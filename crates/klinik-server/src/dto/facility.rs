use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use klinik_core::AppError;
use klinik_core::models::{
    Facility, FacilityUpdate, NewFacility, parse_field, parse_optional_field,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateFacilityRequest {
    /// Uppercase letters, digits and `-`, at most 20 characters
    pub code: String,
    pub name: String,
    /// `puskesmas`, `clinic`, `hospital`, `laboratory` or `pharmacy`
    pub facility_type: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl CreateFacilityRequest {
    pub fn into_input(self) -> Result<NewFacility, AppError> {
        Ok(NewFacility {
            facility_type: parse_field("facility_type", &self.facility_type)?,
            code: self.code,
            name: self.name,
            address: self.address,
            phone: self.phone,
            email: self.email,
        })
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateFacilityRequest {
    pub name: Option<String>,
    pub facility_type: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl UpdateFacilityRequest {
    pub fn into_update(self) -> Result<FacilityUpdate, AppError> {
        Ok(FacilityUpdate {
            facility_type: parse_optional_field("facility_type", self.facility_type.as_deref())?,
            name: self.name,
            address: self.address,
            phone: self.phone,
            email: self.email,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FacilityResponse {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub facility_type: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Facility> for FacilityResponse {
    fn from(f: Facility) -> Self {
        Self {
            id: f.id,
            code: f.code,
            name: f.name,
            facility_type: f.facility_type.to_string(),
            address: f.address,
            phone: f.phone,
            email: f.email,
            created_at: f.created_at,
            updated_at: f.updated_at,
        }
    }
}
