use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use crate::models::user::Role;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    pub key: String,
    pub count: i64,
}

impl StatusCount {
    pub fn new(key: impl Into<String>, count: i64) -> Self {
        Self {
            key: key.into(),
            count,
        }
    }
}

/// Per-facility summary for one day. Sections the caller's role does not
/// cover are left empty.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub facility_id: Uuid,
    pub date: NaiveDate,
    pub role: Role,
    pub patients_total: i64,
    pub appointments_by_status: Vec<StatusCount>,
    pub my_appointments_by_status: Option<Vec<StatusCount>>,
    pub encounters_by_kind: Option<Vec<StatusCount>>,
    pub users_total: Option<i64>,
}
