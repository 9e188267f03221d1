use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use klinik_core::AppError;
use klinik_core::PageRequest;
use klinik_core::models::{User, UserUpdate, parse_field, parse_optional_field};
use klinik_core::service::{AuthSession, Registration};

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    /// At least 8 characters
    pub password: String,
    pub full_name: String,
    /// One of `doctor`, `nurse`, `midwife`, `staff`
    pub role: String,
    pub facility_id: Option<Uuid>,
}

impl RegisterRequest {
    pub fn into_registration(self) -> Result<Registration, AppError> {
        Ok(Registration {
            role: parse_field("role", &self.role)?,
            email: self.email,
            password: self.password,
            full_name: self.full_name,
            facility_id: self.facility_id,
        })
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct GoogleLoginRequest {
    /// ID token obtained from Google Sign-In
    pub id_token: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: String,
    pub facility_id: Option<Uuid>,
    pub has_password: bool,
    pub google_linked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            full_name: u.full_name,
            role: u.role.to_string(),
            facility_id: u.facility_id,
            has_password: u.password_hash.is_some(),
            google_linked: u.google_sub.is_some(),
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    /// Seconds until the token expires
    pub expires_in: i64,
    pub user: UserResponse,
}

impl From<AuthSession> for TokenResponse {
    fn from(session: AuthSession) -> Self {
        Self {
            access_token: session.token.access_token,
            token_type: session.token.token_type,
            expires_in: session.token.expires_in,
            user: session.user.into(),
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct UserListQuery {
    pub facility_id: Option<Uuid>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl UserListQuery {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.page_size)
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    pub full_name: Option<String>,
    pub role: Option<String>,
    pub facility_id: Option<Uuid>,
}

impl UpdateUserRequest {
    pub fn into_update(self) -> Result<UserUpdate, AppError> {
        Ok(UserUpdate {
            full_name: self.full_name,
            role: parse_optional_field("role", self.role.as_deref())?,
            facility_id: self.facility_id,
        })
    }
}
