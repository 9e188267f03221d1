//! Per-appointment clinical tables: the medical record and anamnesis
//! singletons, and the diagnosis / prescription / lab test collections.

use chrono::{DateTime, Utc};
use klinik_core::error::AppError;
use klinik_core::models::{
    Anamnesis, AnamnesisInput, Appointment, Diagnosis, DiagnosisInput, DiagnosisUpdate, LabTest,
    LabTestInput, LabTestUpdate, MedicalRecord, MedicalRecordInput, Prescription,
    PrescriptionInput, PrescriptionUpdate, VitalSigns,
};
use klinik_core::traits::{AnamnesisStore, EntryStore, MedicalRecordStore};
use sqlx::types::Json;
use sqlx::{PgPool, Pool, Postgres};
use uuid::Uuid;

use crate::error::{db_error, decode};

// ---------------------------------------------------------------------------
// Medical record
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct MedicalRecordRepository {
    pool: Pool<Postgres>,
}

impl MedicalRecordRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct MedicalRecordRow {
    id: Uuid,
    appointment_id: Uuid,
    patient_id: Uuid,
    practitioner_id: Option<Uuid>,
    physical_examination: Option<String>,
    assessment: Option<String>,
    plan: Option<String>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<MedicalRecordRow> for MedicalRecord {
    fn from(row: MedicalRecordRow) -> Self {
        MedicalRecord {
            id: row.id,
            appointment_id: row.appointment_id,
            patient_id: row.patient_id,
            practitioner_id: row.practitioner_id,
            physical_examination: row.physical_examination,
            assessment: row.assessment,
            plan: row.plan,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl MedicalRecordStore for MedicalRecordRepository {
    async fn create(
        &self,
        appointment: &Appointment,
        input: &MedicalRecordInput,
    ) -> Result<MedicalRecord, AppError> {
        let row = sqlx::query_as::<_, MedicalRecordRow>(
            r#"
            INSERT INTO medical_records (
                appointment_id, patient_id, practitioner_id,
                physical_examination, assessment, plan, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(appointment.id)
        .bind(appointment.patient_id)
        .bind(input.practitioner_id.or(appointment.practitioner_id))
        .bind(&input.physical_examination)
        .bind(&input.assessment)
        .bind(&input.plan)
        .bind(&input.notes)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(row.into())
    }

    async fn get(&self, appointment_id: Uuid) -> Result<Option<MedicalRecord>, AppError> {
        let row = sqlx::query_as::<_, MedicalRecordRow>(
            "SELECT * FROM medical_records WHERE appointment_id = $1",
        )
        .bind(appointment_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(row.map(Into::into))
    }

    async fn update(
        &self,
        appointment_id: Uuid,
        input: &MedicalRecordInput,
    ) -> Result<Option<MedicalRecord>, AppError> {
        let row = sqlx::query_as::<_, MedicalRecordRow>(
            r#"
            UPDATE medical_records SET
                practitioner_id = COALESCE($2, practitioner_id),
                physical_examination = COALESCE($3, physical_examination),
                assessment = COALESCE($4, assessment),
                plan = COALESCE($5, plan),
                notes = COALESCE($6, notes),
                updated_at = NOW()
            WHERE appointment_id = $1
            RETURNING *
            "#,
        )
        .bind(appointment_id)
        .bind(input.practitioner_id)
        .bind(&input.physical_examination)
        .bind(&input.assessment)
        .bind(&input.plan)
        .bind(&input.notes)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(row.map(Into::into))
    }

    async fn delete(&self, appointment_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM medical_records WHERE appointment_id = $1")
            .bind(appointment_id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(result.rows_affected() > 0)
    }
}

// ---------------------------------------------------------------------------
// Anamnesis
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct AnamnesisRepository {
    pool: Pool<Postgres>,
}

impl AnamnesisRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct AnamnesisRow {
    id: Uuid,
    appointment_id: Uuid,
    chief_complaint: String,
    present_illness: Option<String>,
    past_medical_history: Option<String>,
    family_history: Option<String>,
    allergies: Option<String>,
    current_medications: Option<String>,
    vital_signs: Json<VitalSigns>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<AnamnesisRow> for Anamnesis {
    fn from(row: AnamnesisRow) -> Self {
        Anamnesis {
            id: row.id,
            appointment_id: row.appointment_id,
            chief_complaint: row.chief_complaint,
            present_illness: row.present_illness,
            past_medical_history: row.past_medical_history,
            family_history: row.family_history,
            allergies: row.allergies,
            current_medications: row.current_medications,
            vital_signs: row.vital_signs.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Only the measurements that were submitted, for a `jsonb ||` merge.
fn vitals_patch(vitals: &VitalSigns) -> Result<serde_json::Value, AppError> {
    let mut value = serde_json::to_value(vitals)?;
    if let Some(map) = value.as_object_mut() {
        map.retain(|_, v| !v.is_null());
    }
    Ok(value)
}

impl AnamnesisStore for AnamnesisRepository {
    async fn create(&self, appointment_id: Uuid, input: &AnamnesisInput) -> Result<Anamnesis, AppError> {
        let row = sqlx::query_as::<_, AnamnesisRow>(
            r#"
            INSERT INTO anamneses (
                appointment_id, chief_complaint, present_illness, past_medical_history,
                family_history, allergies, current_medications, vital_signs
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(appointment_id)
        .bind(input.chief_complaint.as_deref().unwrap_or_default())
        .bind(&input.present_illness)
        .bind(&input.past_medical_history)
        .bind(&input.family_history)
        .bind(&input.allergies)
        .bind(&input.current_medications)
        .bind(vitals_patch(&input.vital_signs)?)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(row.into())
    }

    async fn get(&self, appointment_id: Uuid) -> Result<Option<Anamnesis>, AppError> {
        let row = sqlx::query_as::<_, AnamnesisRow>(
            "SELECT * FROM anamneses WHERE appointment_id = $1",
        )
        .bind(appointment_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(row.map(Into::into))
    }

    async fn update(
        &self,
        appointment_id: Uuid,
        input: &AnamnesisInput,
    ) -> Result<Option<Anamnesis>, AppError> {
        let row = sqlx::query_as::<_, AnamnesisRow>(
            r#"
            UPDATE anamneses SET
                chief_complaint = COALESCE($2, chief_complaint),
                present_illness = COALESCE($3, present_illness),
                past_medical_history = COALESCE($4, past_medical_history),
                family_history = COALESCE($5, family_history),
                allergies = COALESCE($6, allergies),
                current_medications = COALESCE($7, current_medications),
                vital_signs = vital_signs || $8,
                updated_at = NOW()
            WHERE appointment_id = $1
            RETURNING *
            "#,
        )
        .bind(appointment_id)
        .bind(&input.chief_complaint)
        .bind(&input.present_illness)
        .bind(&input.past_medical_history)
        .bind(&input.family_history)
        .bind(&input.allergies)
        .bind(&input.current_medications)
        .bind(vitals_patch(&input.vital_signs)?)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(row.map(Into::into))
    }

    async fn delete(&self, appointment_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM anamneses WHERE appointment_id = $1")
            .bind(appointment_id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(result.rows_affected() > 0)
    }
}

// ---------------------------------------------------------------------------
// Diagnoses
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct DiagnosisRepository {
    pool: Pool<Postgres>,
}

impl DiagnosisRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct DiagnosisRow {
    id: Uuid,
    appointment_id: Uuid,
    icd10_code: String,
    description: String,
    diagnosis_type: String,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<DiagnosisRow> for Diagnosis {
    type Error = AppError;

    fn try_from(row: DiagnosisRow) -> Result<Self, AppError> {
        Ok(Diagnosis {
            id: row.id,
            appointment_id: row.appointment_id,
            icd10_code: row.icd10_code,
            description: row.description,
            diagnosis_type: decode("diagnosis_type", &row.diagnosis_type)?,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl EntryStore for DiagnosisRepository {
    type Entry = Diagnosis;
    type Input = DiagnosisInput;
    type Update = DiagnosisUpdate;

    const ENTITY: &'static str = "Diagnosis";

    async fn create(&self, appointment_id: Uuid, input: &DiagnosisInput) -> Result<Diagnosis, AppError> {
        let row = sqlx::query_as::<_, DiagnosisRow>(
            r#"
            INSERT INTO diagnoses (appointment_id, icd10_code, description, diagnosis_type, notes)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(appointment_id)
        .bind(input.icd10_code.trim().to_ascii_uppercase())
        .bind(&input.description)
        .bind(input.diagnosis_type.as_str())
        .bind(&input.notes)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;

        row.try_into()
    }

    async fn list(&self, appointment_id: Uuid) -> Result<Vec<Diagnosis>, AppError> {
        let rows = sqlx::query_as::<_, DiagnosisRow>(
            "SELECT * FROM diagnoses WHERE appointment_id = $1 ORDER BY created_at ASC, id ASC",
        )
        .bind(appointment_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn get(&self, appointment_id: Uuid, id: Uuid) -> Result<Option<Diagnosis>, AppError> {
        let row = sqlx::query_as::<_, DiagnosisRow>(
            "SELECT * FROM diagnoses WHERE appointment_id = $1 AND id = $2",
        )
        .bind(appointment_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        row.map(TryInto::try_into).transpose()
    }

    async fn update(
        &self,
        appointment_id: Uuid,
        id: Uuid,
        update: &DiagnosisUpdate,
    ) -> Result<Option<Diagnosis>, AppError> {
        let row = sqlx::query_as::<_, DiagnosisRow>(
            r#"
            UPDATE diagnoses SET
                icd10_code = COALESCE($3, icd10_code),
                description = COALESCE($4, description),
                diagnosis_type = COALESCE($5, diagnosis_type),
                notes = COALESCE($6, notes),
                updated_at = NOW()
            WHERE appointment_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(appointment_id)
        .bind(id)
        .bind(update.icd10_code.as_deref().map(|c| c.trim().to_ascii_uppercase()))
        .bind(&update.description)
        .bind(update.diagnosis_type.map(|t| t.as_str()))
        .bind(&update.notes)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        row.map(TryInto::try_into).transpose()
    }

    async fn delete(&self, appointment_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM diagnoses WHERE appointment_id = $1 AND id = $2")
            .bind(appointment_id)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(result.rows_affected() > 0)
    }
}

// ---------------------------------------------------------------------------
// Prescriptions
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct PrescriptionRepository {
    pool: Pool<Postgres>,
}

impl PrescriptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct PrescriptionRow {
    id: Uuid,
    appointment_id: Uuid,
    drug_name: String,
    dosage: String,
    frequency: String,
    route: Option<String>,
    quantity: i32,
    duration_days: Option<i32>,
    instructions: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<PrescriptionRow> for Prescription {
    fn from(row: PrescriptionRow) -> Self {
        Prescription {
            id: row.id,
            appointment_id: row.appointment_id,
            drug_name: row.drug_name,
            dosage: row.dosage,
            frequency: row.frequency,
            route: row.route,
            quantity: row.quantity,
            duration_days: row.duration_days,
            instructions: row.instructions,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl EntryStore for PrescriptionRepository {
    type Entry = Prescription;
    type Input = PrescriptionInput;
    type Update = PrescriptionUpdate;

    const ENTITY: &'static str = "Prescription";

    async fn create(&self, appointment_id: Uuid, input: &PrescriptionInput) -> Result<Prescription, AppError> {
        let row = sqlx::query_as::<_, PrescriptionRow>(
            r#"
            INSERT INTO prescriptions (
                appointment_id, drug_name, dosage, frequency, route,
                quantity, duration_days, instructions
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(appointment_id)
        .bind(&input.drug_name)
        .bind(&input.dosage)
        .bind(&input.frequency)
        .bind(&input.route)
        .bind(input.quantity)
        .bind(input.duration_days)
        .bind(&input.instructions)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(row.into())
    }

    async fn list(&self, appointment_id: Uuid) -> Result<Vec<Prescription>, AppError> {
        let rows = sqlx::query_as::<_, PrescriptionRow>(
            "SELECT * FROM prescriptions WHERE appointment_id = $1 ORDER BY created_at ASC, id ASC",
        )
        .bind(appointment_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn get(&self, appointment_id: Uuid, id: Uuid) -> Result<Option<Prescription>, AppError> {
        let row = sqlx::query_as::<_, PrescriptionRow>(
            "SELECT * FROM prescriptions WHERE appointment_id = $1 AND id = $2",
        )
        .bind(appointment_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(row.map(Into::into))
    }

    async fn update(
        &self,
        appointment_id: Uuid,
        id: Uuid,
        update: &PrescriptionUpdate,
    ) -> Result<Option<Prescription>, AppError> {
        let row = sqlx::query_as::<_, PrescriptionRow>(
            r#"
            UPDATE prescriptions SET
                drug_name = COALESCE($3, drug_name),
                dosage = COALESCE($4, dosage),
                frequency = COALESCE($5, frequency),
                route = COALESCE($6, route),
                quantity = COALESCE($7, quantity),
                duration_days = COALESCE($8, duration_days),
                instructions = COALESCE($9, instructions),
                updated_at = NOW()
            WHERE appointment_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(appointment_id)
        .bind(id)
        .bind(&update.drug_name)
        .bind(&update.dosage)
        .bind(&update.frequency)
        .bind(&update.route)
        .bind(update.quantity)
        .bind(update.duration_days)
        .bind(&update.instructions)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(row.map(Into::into))
    }

    async fn delete(&self, appointment_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM prescriptions WHERE appointment_id = $1 AND id = $2")
            .bind(appointment_id)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(result.rows_affected() > 0)
    }
}

// ---------------------------------------------------------------------------
// Lab tests
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct LabTestRepository {
    pool: Pool<Postgres>,
}

impl LabTestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct LabTestRow {
    id: Uuid,
    appointment_id: Uuid,
    test_name: String,
    specimen: Option<String>,
    result: Option<String>,
    unit: Option<String>,
    reference_range: Option<String>,
    status: String,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<LabTestRow> for LabTest {
    type Error = AppError;

    fn try_from(row: LabTestRow) -> Result<Self, AppError> {
        Ok(LabTest {
            id: row.id,
            appointment_id: row.appointment_id,
            test_name: row.test_name,
            specimen: row.specimen,
            result: row.result,
            unit: row.unit,
            reference_range: row.reference_range,
            status: decode("status", &row.status)?,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl EntryStore for LabTestRepository {
    type Entry = LabTest;
    type Input = LabTestInput;
    type Update = LabTestUpdate;

    const ENTITY: &'static str = "Lab test";

    async fn create(&self, appointment_id: Uuid, input: &LabTestInput) -> Result<LabTest, AppError> {
        let row = sqlx::query_as::<_, LabTestRow>(
            r#"
            INSERT INTO lab_tests (
                appointment_id, test_name, specimen, result, unit,
                reference_range, status, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(appointment_id)
        .bind(&input.test_name)
        .bind(&input.specimen)
        .bind(&input.result)
        .bind(&input.unit)
        .bind(&input.reference_range)
        .bind(input.effective_status().as_str())
        .bind(&input.notes)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;

        row.try_into()
    }

    async fn list(&self, appointment_id: Uuid) -> Result<Vec<LabTest>, AppError> {
        let rows = sqlx::query_as::<_, LabTestRow>(
            "SELECT * FROM lab_tests WHERE appointment_id = $1 ORDER BY created_at ASC, id ASC",
        )
        .bind(appointment_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn get(&self, appointment_id: Uuid, id: Uuid) -> Result<Option<LabTest>, AppError> {
        let row = sqlx::query_as::<_, LabTestRow>(
            "SELECT * FROM lab_tests WHERE appointment_id = $1 AND id = $2",
        )
        .bind(appointment_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        row.map(TryInto::try_into).transpose()
    }

    async fn update(
        &self,
        appointment_id: Uuid,
        id: Uuid,
        update: &LabTestUpdate,
    ) -> Result<Option<LabTest>, AppError> {
        let row = sqlx::query_as::<_, LabTestRow>(
            r#"
            UPDATE lab_tests SET
                test_name = COALESCE($3, test_name),
                specimen = COALESCE($4, specimen),
                result = COALESCE($5, result),
                unit = COALESCE($6, unit),
                reference_range = COALESCE($7, reference_range),
                status = COALESCE($8, status),
                notes = COALESCE($9, notes),
                updated_at = NOW()
            WHERE appointment_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(appointment_id)
        .bind(id)
        .bind(&update.test_name)
        .bind(&update.specimen)
        .bind(&update.result)
        .bind(&update.unit)
        .bind(&update.reference_range)
        .bind(update.status.map(|s| s.as_str()))
        .bind(&update.notes)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        row.map(TryInto::try_into).transpose()
    }

    async fn delete(&self, appointment_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM lab_tests WHERE appointment_id = $1 AND id = $2")
            .bind(appointment_id)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(result.rows_affected() > 0)
    }
}
