use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use klinik_core::AppError;
use klinik_core::models::{EncounterKind, EncounterRecord, parse_field, parse_optional_field};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateEncounterRequest {
    /// e.g. `antenatal_care_observation`, `immunization`, `odontogram`
    pub kind: String,
    /// Kind-specific payload; unknown fields are rejected
    #[schema(value_type = Object)]
    pub data: serde_json::Value,
}

impl CreateEncounterRequest {
    pub fn kind(&self) -> Result<EncounterKind, AppError> {
        parse_field("kind", &self.kind)
    }
}

/// The stored payload is merged with `data`, then validated as a whole.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateEncounterRequest {
    #[schema(value_type = Object)]
    pub data: serde_json::Value,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EncounterResponse {
    pub id: Uuid,
    pub medical_record_id: Uuid,
    pub appointment_id: Uuid,
    pub kind: String,
    #[schema(value_type = Object)]
    pub data: serde_json::Value,
    pub recorded_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<EncounterRecord> for EncounterResponse {
    fn from(e: EncounterRecord) -> Self {
        Self {
            id: e.id,
            medical_record_id: e.medical_record_id,
            appointment_id: e.appointment_id,
            kind: e.kind.to_string(),
            data: e.data,
            recorded_by: e.recorded_by,
            created_at: e.created_at,
            updated_at: e.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct EncounterListQuery {
    pub kind: Option<String>,
}

impl EncounterListQuery {
    pub fn kind(&self) -> Result<Option<EncounterKind>, AppError> {
        parse_optional_field("kind", self.kind.as_deref())
    }
}
