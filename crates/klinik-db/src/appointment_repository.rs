use chrono::{DateTime, Utc};
use klinik_core::error::AppError;
use klinik_core::models::{
    Appointment, AppointmentFilter, AppointmentStatus, AppointmentUpdate, NewAppointment,
};
use klinik_core::pagination::{Page, PageRequest};
use klinik_core::traits::AppointmentStore;
use sqlx::{PgPool, Pool, Postgres};
use uuid::Uuid;

use crate::error::{db_error, decode};

/// Repository for appointments in PostgreSQL. Every query is scoped by facility.
#[derive(Clone)]
pub struct AppointmentRepository {
    pool: Pool<Postgres>,
}

impl AppointmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct AppointmentRow {
    id: Uuid,
    facility_id: Uuid,
    patient_id: Uuid,
    practitioner_id: Option<Uuid>,
    scheduled_at: DateTime<Utc>,
    service_unit: String,
    complaint: Option<String>,
    status: String,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AppointmentRow> for Appointment {
    type Error = AppError;

    fn try_from(row: AppointmentRow) -> Result<Self, AppError> {
        Ok(Appointment {
            id: row.id,
            facility_id: row.facility_id,
            patient_id: row.patient_id,
            practitioner_id: row.practitioner_id,
            scheduled_at: row.scheduled_at,
            service_unit: row.service_unit,
            complaint: row.complaint,
            status: decode("status", &row.status)?,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

// Dates are compared in UTC.
const FILTER_CLAUSE: &str = r#"
    facility_id = $1
    AND ($2::date IS NULL OR (scheduled_at AT TIME ZONE 'UTC')::date = $2)
    AND ($3::text IS NULL OR status = $3)
    AND ($4::uuid IS NULL OR patient_id = $4)
    AND ($5::uuid IS NULL OR practitioner_id = $5)
"#;

impl AppointmentStore for AppointmentRepository {
    async fn create(&self, facility_id: Uuid, input: &NewAppointment) -> Result<Appointment, AppError> {
        let row = sqlx::query_as::<_, AppointmentRow>(
            r#"
            INSERT INTO appointments (
                facility_id, patient_id, practitioner_id, scheduled_at,
                service_unit, complaint, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(facility_id)
        .bind(input.patient_id)
        .bind(input.practitioner_id)
        .bind(input.scheduled_at)
        .bind(&input.service_unit)
        .bind(&input.complaint)
        .bind(&input.notes)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;

        row.try_into()
    }

    async fn get(&self, facility_id: Uuid, id: Uuid) -> Result<Option<Appointment>, AppError> {
        let row = sqlx::query_as::<_, AppointmentRow>(
            "SELECT * FROM appointments WHERE facility_id = $1 AND id = $2",
        )
        .bind(facility_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        row.map(TryInto::try_into).transpose()
    }

    async fn list(
        &self,
        facility_id: Uuid,
        filter: &AppointmentFilter,
        page: PageRequest,
    ) -> Result<Page<Appointment>, AppError> {
        let status = filter.status.map(|s| s.as_str());

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM appointments WHERE {FILTER_CLAUSE}"
        ))
        .bind(facility_id)
        .bind(filter.date)
        .bind(status)
        .bind(filter.patient_id)
        .bind(filter.practitioner_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;

        let rows = sqlx::query_as::<_, AppointmentRow>(&format!(
            "SELECT * FROM appointments WHERE {FILTER_CLAUSE} ORDER BY scheduled_at DESC, id ASC LIMIT $6 OFFSET $7"
        ))
        .bind(facility_id)
        .bind(filter.date)
        .bind(status)
        .bind(filter.patient_id)
        .bind(filter.practitioner_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        let items = rows
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, page, total))
    }

    async fn update(
        &self,
        facility_id: Uuid,
        id: Uuid,
        update: &AppointmentUpdate,
    ) -> Result<Option<Appointment>, AppError> {
        let row = sqlx::query_as::<_, AppointmentRow>(
            r#"
            UPDATE appointments SET
                practitioner_id = COALESCE($3, practitioner_id),
                scheduled_at = COALESCE($4, scheduled_at),
                service_unit = COALESCE($5, service_unit),
                complaint = COALESCE($6, complaint),
                notes = COALESCE($7, notes),
                updated_at = NOW()
            WHERE facility_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(facility_id)
        .bind(id)
        .bind(update.practitioner_id)
        .bind(update.scheduled_at)
        .bind(&update.service_unit)
        .bind(&update.complaint)
        .bind(&update.notes)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        row.map(TryInto::try_into).transpose()
    }

    async fn set_status(
        &self,
        facility_id: Uuid,
        id: Uuid,
        status: AppointmentStatus,
    ) -> Result<Option<Appointment>, AppError> {
        let row = sqlx::query_as::<_, AppointmentRow>(
            r#"
            UPDATE appointments SET status = $3, updated_at = NOW()
            WHERE facility_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(facility_id)
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        row.map(TryInto::try_into).transpose()
    }

    async fn delete(&self, facility_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM appointments WHERE facility_id = $1 AND id = $2")
            .bind(facility_id)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(result.rows_affected() > 0)
    }
}
