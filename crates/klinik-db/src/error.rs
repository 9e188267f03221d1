use std::str::FromStr;

use klinik_core::AppError;

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";
const CHECK_VIOLATION: &str = "23514";

fn conflict_message(constraint: Option<&str>) -> String {
    match constraint {
        Some("facilities_code_key") => "Facility code already exists",
        Some("users_email_key") => "User email already exists",
        Some("users_google_sub_key") => "Google account is already linked to another user",
        Some("patients_facility_mrn_key") => "Patient MRN already exists in this facility",
        Some("patients_facility_nik_key") => "Patient NIK already exists in this facility",
        Some("medical_records_appointment_key") => {
            "Medical record already exists for this appointment"
        }
        Some("anamneses_appointment_key") => "Anamnesis already exists for this appointment",
        _ => "Record already exists",
    }
    .to_string()
}

/// Translate constraint violations into client errors; everything else is a
/// `DatabaseError`.
pub(crate) fn db_error(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db) = &e {
        match db.code().as_deref() {
            Some(UNIQUE_VIOLATION) => return AppError::Conflict(conflict_message(db.constraint())),
            Some(FOREIGN_KEY_VIOLATION) => {
                return AppError::bad_request(format!(
                    "referenced record does not exist ({})",
                    db.constraint().unwrap_or("foreign key")
                ));
            }
            Some(CHECK_VIOLATION) => {
                return AppError::bad_request(format!(
                    "value rejected by constraint {}",
                    db.constraint().unwrap_or("check")
                ));
            }
            _ => {}
        }
    }
    AppError::DatabaseError(e.to_string())
}

/// Decode a code column into its enum.
pub(crate) fn decode<T>(column: &str, raw: &str) -> Result<T, AppError>
where
    T: FromStr<Err = String>,
{
    raw.parse()
        .map_err(|e: String| AppError::DatabaseError(format!("column {column}: {e}")))
}

/// `ILIKE` pattern matching `needle` anywhere, with wildcards escaped.
pub(crate) fn contains_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}
