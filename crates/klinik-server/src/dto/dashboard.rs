use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use klinik_core::models::{Dashboard, StatusCount};

#[derive(Debug, Deserialize, IntoParams)]
pub struct DashboardQuery {
    /// Day to summarize (UTC), defaults to today
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CountResponse {
    pub key: String,
    pub count: i64,
}

impl From<StatusCount> for CountResponse {
    fn from(c: StatusCount) -> Self {
        Self {
            key: c.key,
            count: c.count,
        }
    }
}

fn counts(list: Vec<StatusCount>) -> Vec<CountResponse> {
    list.into_iter().map(Into::into).collect()
}

/// Sections outside the caller's role are omitted.
#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardResponse {
    pub facility_id: Uuid,
    pub date: NaiveDate,
    pub role: String,
    pub patients_total: i64,
    pub appointments_by_status: Vec<CountResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub my_appointments_by_status: Option<Vec<CountResponse>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encounters_by_kind: Option<Vec<CountResponse>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub users_total: Option<i64>,
}

impl From<Dashboard> for DashboardResponse {
    fn from(d: Dashboard) -> Self {
        Self {
            facility_id: d.facility_id,
            date: d.date,
            role: d.role.to_string(),
            patients_total: d.patients_total,
            appointments_by_status: counts(d.appointments_by_status),
            my_appointments_by_status: d.my_appointments_by_status.map(counts),
            encounters_by_kind: d.encounters_by_kind.map(counts),
            users_total: d.users_total,
        }
    }
}
