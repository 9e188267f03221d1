use chrono::NaiveDate;
use uuid::Uuid;

use crate::access::Principal;
use crate::error::AppError;
use crate::models::{AppointmentStatus, Dashboard, EncounterKind, Role, StatusCount};
use crate::service::{found, today};
use crate::traits::{DashboardStore, FacilityStore};

/// Expand sparse counts into one entry per known code, in declaration order.
fn complete(codes: &[&'static str], counts: Vec<StatusCount>) -> Vec<StatusCount> {
    codes
        .iter()
        .map(|code| {
            let count = counts
                .iter()
                .find(|c| c.key == *code)
                .map_or(0, |c| c.count);
            StatusCount::new(*code, count)
        })
        .collect()
}

fn status_codes() -> Vec<&'static str> {
    AppointmentStatus::ALL.iter().map(|s| s.as_str()).collect()
}

fn kind_codes() -> Vec<&'static str> {
    EncounterKind::ALL.iter().map(|k| k.as_str()).collect()
}

pub struct DashboardService<D: DashboardStore, F: FacilityStore> {
    stats: D,
    facilities: F,
}

impl<D: DashboardStore, F: FacilityStore> DashboardService<D, F> {
    pub fn new(stats: D, facilities: F) -> Self {
        Self { stats, facilities }
    }

    /// Summary for `date` (today, UTC, when absent), shaped by the caller's role.
    pub async fn get(
        &self,
        caller: &Principal,
        facility_id: Uuid,
        date: Option<NaiveDate>,
    ) -> Result<Dashboard, AppError> {
        caller.require_facility(facility_id)?;
        found(self.facilities.get(facility_id).await?, "Facility", facility_id)?;
        let date = date.unwrap_or_else(today);

        let patients_total = self.stats.count_patients(facility_id).await?;
        let appointments_by_status = complete(
            &status_codes(),
            self.stats
                .appointment_status_counts(facility_id, date, None)
                .await?,
        );

        let mut dashboard = Dashboard {
            facility_id,
            date,
            role: caller.role,
            patients_total,
            appointments_by_status,
            my_appointments_by_status: None,
            encounters_by_kind: None,
            users_total: None,
        };

        if caller.role == Role::Doctor {
            let mine = self
                .stats
                .appointment_status_counts(facility_id, date, Some(caller.user_id))
                .await?;
            dashboard.my_appointments_by_status = Some(complete(&status_codes(), mine));
        }
        if matches!(caller.role, Role::Nurse | Role::Midwife | Role::Admin) {
            let kinds = self.stats.encounter_kind_counts(facility_id, date).await?;
            dashboard.encounters_by_kind = Some(complete(&kind_codes(), kinds));
        }
        if caller.role == Role::Admin {
            dashboard.users_total = Some(self.stats.count_users(facility_id).await?);
        }

        Ok(dashboard)
    }
}
