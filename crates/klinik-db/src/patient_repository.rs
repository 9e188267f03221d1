use chrono::{DateTime, NaiveDate, Utc};
use klinik_core::error::AppError;
use klinik_core::models::{NewPatient, Patient, PatientUpdate};
use klinik_core::pagination::{Page, PageRequest};
use klinik_core::traits::PatientStore;
use sqlx::{PgPool, Pool, Postgres};
use uuid::Uuid;

use crate::error::{contains_pattern, db_error, decode};

/// Repository for patients in PostgreSQL. Every query is scoped by facility.
#[derive(Clone)]
pub struct PatientRepository {
    pool: Pool<Postgres>,
}

impl PatientRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct PatientRow {
    id: Uuid,
    facility_id: Uuid,
    mrn: String,
    nik: Option<String>,
    full_name: String,
    gender: String,
    birth_date: NaiveDate,
    birth_place: Option<String>,
    blood_type: Option<String>,
    phone: Option<String>,
    address: Option<String>,
    bpjs_number: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PatientRow> for Patient {
    type Error = AppError;

    fn try_from(row: PatientRow) -> Result<Self, AppError> {
        Ok(Patient {
            id: row.id,
            facility_id: row.facility_id,
            mrn: row.mrn,
            nik: row.nik,
            full_name: row.full_name,
            gender: decode("gender", &row.gender)?,
            birth_date: row.birth_date,
            birth_place: row.birth_place,
            blood_type: row
                .blood_type
                .as_deref()
                .map(|b| decode("blood_type", b))
                .transpose()?,
            phone: row.phone,
            address: row.address,
            bpjs_number: row.bpjs_number,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const SEARCH_CLAUSE: &str = r#"
    facility_id = $1
    AND ($2::text IS NULL
         OR full_name ILIKE $2
         OR mrn ILIKE $2
         OR nik LIKE $2)
"#;

impl PatientStore for PatientRepository {
    async fn create(&self, facility_id: Uuid, mrn: &str, input: &NewPatient) -> Result<Patient, AppError> {
        let row = sqlx::query_as::<_, PatientRow>(
            r#"
            INSERT INTO patients (
                facility_id, mrn, nik, full_name, gender, birth_date,
                birth_place, blood_type, phone, address, bpjs_number
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(facility_id)
        .bind(mrn)
        .bind(&input.nik)
        .bind(&input.full_name)
        .bind(input.gender.as_str())
        .bind(input.birth_date)
        .bind(&input.birth_place)
        .bind(input.blood_type.map(|b| b.as_str()))
        .bind(&input.phone)
        .bind(&input.address)
        .bind(&input.bpjs_number)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;

        row.try_into()
    }

    async fn get(&self, facility_id: Uuid, id: Uuid) -> Result<Option<Patient>, AppError> {
        let row = sqlx::query_as::<_, PatientRow>(
            "SELECT * FROM patients WHERE facility_id = $1 AND id = $2",
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
        search: Option<&str>,
        page: PageRequest,
    ) -> Result<Page<Patient>, AppError> {
        let pattern = search.map(contains_pattern);

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM patients WHERE {SEARCH_CLAUSE}"
        ))
        .bind(facility_id)
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;

        let rows = sqlx::query_as::<_, PatientRow>(&format!(
            "SELECT * FROM patients WHERE {SEARCH_CLAUSE} ORDER BY full_name ASC, id ASC LIMIT $3 OFFSET $4"
        ))
        .bind(facility_id)
        .bind(&pattern)
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
        update: &PatientUpdate,
    ) -> Result<Option<Patient>, AppError> {
        let row = sqlx::query_as::<_, PatientRow>(
            r#"
            UPDATE patients SET
                nik = COALESCE($3, nik),
                full_name = COALESCE($4, full_name),
                gender = COALESCE($5, gender),
                birth_date = COALESCE($6, birth_date),
                birth_place = COALESCE($7, birth_place),
                blood_type = COALESCE($8, blood_type),
                phone = COALESCE($9, phone),
                address = COALESCE($10, address),
                bpjs_number = COALESCE($11, bpjs_number),
                updated_at = NOW()
            WHERE facility_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(facility_id)
        .bind(id)
        .bind(&update.nik)
        .bind(&update.full_name)
        .bind(update.gender.map(|g| g.as_str()))
        .bind(update.birth_date)
        .bind(&update.birth_place)
        .bind(update.blood_type.map(|b| b.as_str()))
        .bind(&update.phone)
        .bind(&update.address)
        .bind(&update.bpjs_number)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        row.map(TryInto::try_into).transpose()
    }

    async fn delete(&self, facility_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM patients WHERE facility_id = $1 AND id = $2")
            .bind(facility_id)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn max_mrn_sequence(&self, facility_id: Uuid, prefix: &str) -> Result<Option<i64>, AppError> {
        sqlx::query_scalar(
            r#"
            SELECT MAX(substr(mrn, length($2) + 1)::BIGINT)
            FROM patients
            WHERE facility_id = $1
              AND starts_with(mrn, $2)
              AND substr(mrn, length($2) + 1) ~ '^[0-9]{1,15}$'
            "#,
        )
        .bind(facility_id)
        .bind(prefix)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)
    }
}
