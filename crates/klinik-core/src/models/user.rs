use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::validation::Validator;

string_enum! {
    /// Role of a platform user; drives the permission matrix in [`crate::access`].
    pub enum Role {
        Admin => "admin",
        Doctor => "doctor",
        Nurse => "nurse",
        Midwife => "midwife",
        Staff => "staff",
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip)]
    pub password_hash: Option<String>,
    pub full_name: String,
    pub role: Role,
    pub facility_id: Option<Uuid>,
    #[serde(skip)]
    pub google_sub: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A user row ready for insertion. The password, if any, is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: Option<String>,
    pub full_name: String,
    pub role: Role,
    pub facility_id: Option<Uuid>,
    pub google_sub: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub full_name: Option<String>,
    pub role: Option<Role>,
    pub facility_id: Option<Uuid>,
}

impl NewUser {
    pub fn validate(&self) -> Result<(), AppError> {
        Validator::new()
            .email("email", Some(&self.email))
            .required("full_name", &self.full_name)
            .max_len("full_name", Some(&self.full_name), 200)
            .finish()
    }
}

impl UserUpdate {
    pub fn validate(&self) -> Result<(), AppError> {
        Validator::new()
            .not_blank("full_name", self.full_name.as_deref())
            .max_len("full_name", self.full_name.as_deref(), 200)
            .finish()
    }
}

/// Emails are matched case-insensitively; store them lowercased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
