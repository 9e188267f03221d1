use chrono::NaiveDate;
use klinik_core::error::AppError;
use klinik_core::models::StatusCount;
use klinik_core::traits::DashboardStore;
use sqlx::{PgPool, Pool, Postgres};
use uuid::Uuid;

use crate::error::db_error;

/// Read-only aggregate queries behind the dashboard.
#[derive(Clone)]
pub struct DashboardRepository {
    pool: Pool<Postgres>,
}

impl DashboardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn scalar(&self, sql: &str, facility_id: Uuid) -> Result<i64, AppError> {
        sqlx::query_scalar::<_, i64>(sql)
            .bind(facility_id)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error)
    }
}

#[derive(sqlx::FromRow)]
struct CountRow {
    key: String,
    count: i64,
}

impl From<CountRow> for StatusCount {
    fn from(row: CountRow) -> Self {
        StatusCount::new(row.key, row.count)
    }
}

impl DashboardStore for DashboardRepository {
    async fn count_patients(&self, facility_id: Uuid) -> Result<i64, AppError> {
        self.scalar("SELECT COUNT(*) FROM patients WHERE facility_id = $1", facility_id)
            .await
    }

    async fn count_users(&self, facility_id: Uuid) -> Result<i64, AppError> {
        self.scalar("SELECT COUNT(*) FROM users WHERE facility_id = $1", facility_id)
            .await
    }

    async fn appointment_status_counts(
        &self,
        facility_id: Uuid,
        date: NaiveDate,
        practitioner_id: Option<Uuid>,
    ) -> Result<Vec<StatusCount>, AppError> {
        let rows = sqlx::query_as::<_, CountRow>(
            r#"
            SELECT status AS key, COUNT(*) AS count
            FROM appointments
            WHERE facility_id = $1
              AND (scheduled_at AT TIME ZONE 'UTC')::date = $2
              AND ($3::uuid IS NULL OR practitioner_id = $3)
            GROUP BY status
            "#,
        )
        .bind(facility_id)
        .bind(date)
        .bind(practitioner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn encounter_kind_counts(
        &self,
        facility_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<StatusCount>, AppError> {
        let rows = sqlx::query_as::<_, CountRow>(
            r#"
            SELECT e.kind AS key, COUNT(*) AS count
            FROM encounter_records e
            JOIN appointments a ON a.id = e.appointment_id
            WHERE a.facility_id = $1
              AND (e.created_at AT TIME ZONE 'UTC')::date = $2
            GROUP BY e.kind
            "#,
        )
        .bind(facility_id)
        .bind(date)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
