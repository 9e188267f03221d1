use chrono::{DateTime, Utc};
use klinik_core::error::AppError;
use klinik_core::models::{EncounterKind, EncounterRecord, MedicalRecord};
use klinik_core::traits::EncounterStore;
use sqlx::{PgPool, Pool, Postgres};
use uuid::Uuid;

use crate::error::{db_error, decode};

/// Specialty encounter payloads, one JSONB document per row.
#[derive(Clone)]
pub struct EncounterRepository {
    pool: Pool<Postgres>,
}

impl EncounterRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct EncounterRow {
    id: Uuid,
    medical_record_id: Uuid,
    appointment_id: Uuid,
    kind: String,
    data: serde_json::Value,
    recorded_by: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<EncounterRow> for EncounterRecord {
    type Error = AppError;

    fn try_from(row: EncounterRow) -> Result<Self, AppError> {
        Ok(EncounterRecord {
            id: row.id,
            medical_record_id: row.medical_record_id,
            appointment_id: row.appointment_id,
            kind: decode("kind", &row.kind)?,
            data: row.data,
            recorded_by: row.recorded_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl EncounterStore for EncounterRepository {
    async fn create(
        &self,
        record: &MedicalRecord,
        kind: EncounterKind,
        data: &serde_json::Value,
        recorded_by: Option<Uuid>,
    ) -> Result<EncounterRecord, AppError> {
        let row = sqlx::query_as::<_, EncounterRow>(
            r#"
            INSERT INTO encounter_records (medical_record_id, appointment_id, kind, data, recorded_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(record.id)
        .bind(record.appointment_id)
        .bind(kind.as_str())
        .bind(data)
        .bind(recorded_by)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;

        row.try_into()
    }

    async fn list(
        &self,
        appointment_id: Uuid,
        kind: Option<EncounterKind>,
    ) -> Result<Vec<EncounterRecord>, AppError> {
        let rows = sqlx::query_as::<_, EncounterRow>(
            r#"
            SELECT * FROM encounter_records
            WHERE appointment_id = $1 AND ($2::text IS NULL OR kind = $2)
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(appointment_id)
        .bind(kind.map(|k| k.as_str()))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn get(&self, appointment_id: Uuid, id: Uuid) -> Result<Option<EncounterRecord>, AppError> {
        let row = sqlx::query_as::<_, EncounterRow>(
            "SELECT * FROM encounter_records WHERE appointment_id = $1 AND id = $2",
        )
        .bind(appointment_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        row.map(TryInto::try_into).transpose()
    }

    async fn replace_data(
        &self,
        appointment_id: Uuid,
        id: Uuid,
        data: &serde_json::Value,
    ) -> Result<Option<EncounterRecord>, AppError> {
        let row = sqlx::query_as::<_, EncounterRow>(
            r#"
            UPDATE encounter_records SET data = $3, updated_at = NOW()
            WHERE appointment_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(appointment_id)
        .bind(id)
        .bind(data)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        row.map(TryInto::try_into).transpose()
    }

    async fn delete(&self, appointment_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let result =
            sqlx::query("DELETE FROM encounter_records WHERE appointment_id = $1 AND id = $2")
                .bind(appointment_id)
                .bind(id)
                .execute(&self.pool)
                .await
                .map_err(db_error)?;

        Ok(result.rows_affected() > 0)
    }
}
