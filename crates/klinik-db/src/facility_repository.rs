use chrono::{DateTime, Utc};
use klinik_core::error::AppError;
use klinik_core::models::{Facility, FacilityUpdate, NewFacility};
use klinik_core::pagination::{Page, PageRequest};
use klinik_core::traits::FacilityStore;
use sqlx::{PgPool, Pool, Postgres};
use uuid::Uuid;

use crate::error::{db_error, decode};

/// Repository for facilities in PostgreSQL.
#[derive(Clone)]
pub struct FacilityRepository {
    pool: Pool<Postgres>,
}

impl FacilityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// -- Internal row type for sqlx deserialization --

#[derive(sqlx::FromRow)]
struct FacilityRow {
    id: Uuid,
    code: String,
    name: String,
    facility_type: String,
    address: Option<String>,
    phone: Option<String>,
    email: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<FacilityRow> for Facility {
    type Error = AppError;

    fn try_from(row: FacilityRow) -> Result<Self, AppError> {
        Ok(Facility {
            id: row.id,
            code: row.code,
            name: row.name,
            facility_type: decode("facility_type", &row.facility_type)?,
            address: row.address,
            phone: row.phone,
            email: row.email,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl FacilityStore for FacilityRepository {
    async fn create(&self, input: &NewFacility) -> Result<Facility, AppError> {
        let row = sqlx::query_as::<_, FacilityRow>(
            r#"
            INSERT INTO facilities (code, name, facility_type, address, phone, email)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&input.code)
        .bind(&input.name)
        .bind(input.facility_type.as_str())
        .bind(&input.address)
        .bind(&input.phone)
        .bind(&input.email)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;

        row.try_into()
    }

    async fn get(&self, id: Uuid) -> Result<Option<Facility>, AppError> {
        let row = sqlx::query_as::<_, FacilityRow>("SELECT * FROM facilities WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;

        row.map(TryInto::try_into).transpose()
    }

    async fn list(&self, page: PageRequest) -> Result<Page<Facility>, AppError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM facilities")
            .fetch_one(&self.pool)
            .await
            .map_err(db_error)?;

        let rows = sqlx::query_as::<_, FacilityRow>(
            r#"
            SELECT * FROM facilities
            ORDER BY name ASC, id ASC
            LIMIT $1 OFFSET $2
            "#,
        )
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

    async fn update(&self, id: Uuid, update: &FacilityUpdate) -> Result<Option<Facility>, AppError> {
        let row = sqlx::query_as::<_, FacilityRow>(
            r#"
            UPDATE facilities SET
                name = COALESCE($2, name),
                facility_type = COALESCE($3, facility_type),
                address = COALESCE($4, address),
                phone = COALESCE($5, phone),
                email = COALESCE($6, email),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&update.name)
        .bind(update.facility_type.map(|t| t.as_str()))
        .bind(&update.address)
        .bind(&update.phone)
        .bind(&update.email)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        row.map(TryInto::try_into).transpose()
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM facilities WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(result.rows_affected() > 0)
    }
}
