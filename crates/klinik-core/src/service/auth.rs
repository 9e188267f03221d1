use serde::Serialize;
use uuid::Uuid;

use crate::access::Principal;
use crate::auth::{IssuedToken, MIN_PASSWORD_LEN, TokenIssuer, hash_password, verify_password};
use crate::error::AppError;
use crate::models::user::normalize_email;
use crate::models::{NewUser, Role, User};
use crate::service::found;
use crate::traits::{FacilityStore, GoogleVerifier, UserStore};

/// Self-service sign-up request. Passwords arrive in clear text and are
/// hashed here.
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub role: Role,
    pub facility_id: Option<Uuid>,
}

/// A signed token plus the account it was issued for.
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    #[serde(flatten)]
    pub token: IssuedToken,
    pub user: User,
}

const BAD_CREDENTIALS: &str = "invalid email or password";

pub struct AuthService<U, F, G>
where
    U: UserStore,
    F: FacilityStore,
    G: GoogleVerifier,
{
    users: U,
    facilities: F,
    issuer: TokenIssuer,
    google: Option<G>,
}

impl<U, F, G> AuthService<U, F, G>
where
    U: UserStore,
    F: FacilityStore,
    G: GoogleVerifier,
{
    /// `google` is `None` when the Google exchange is not configured.
    pub fn new(users: U, facilities: F, issuer: TokenIssuer, google: Option<G>) -> Self {
        Self {
            users,
            facilities,
            issuer,
            google,
        }
    }

    pub async fn register(&self, registration: Registration) -> Result<AuthSession, AppError> {
        if registration.role == Role::Admin {
            return Err(AppError::Forbidden(
                "admin accounts cannot be self-registered".into(),
            ));
        }
        if registration.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AppError::invalid(
                "password",
                format!("must be at least {MIN_PASSWORD_LEN} characters"),
            ));
        }

        let mut new_user = NewUser {
            email: normalize_email(&registration.email),
            password_hash: None,
            full_name: registration.full_name.trim().to_string(),
            role: registration.role,
            facility_id: registration.facility_id,
            google_sub: None,
        };
        new_user.validate()?;

        if let Some(facility_id) = new_user.facility_id {
            found(self.facilities.get(facility_id).await?, "Facility", facility_id)?;
        }
        if self.users.find_by_email(&new_user.email).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "User email '{}' already exists",
                new_user.email
            )));
        }

        new_user.password_hash = Some(hash_password(&registration.password)?);
        let user = self.users.create(&new_user).await?;
        tracing::info!(user_id = %user.id, role = %user.role, "User registered");
        self.session(user)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession, AppError> {
        let email = normalize_email(email);
        let user = self.users.find_by_email(&email).await?;

        let verified = user.filter(|u| {
            u.password_hash
                .as_deref()
                .is_some_and(|hash| verify_password(password, hash))
        });
        match verified {
            Some(user) => self.session(user),
            None => {
                tracing::warn!("Failed login attempt");
                Err(AppError::Unauthorized(BAD_CREDENTIALS.into()))
            }
        }
    }

    /// Exchange a Google ID token. Accounts are matched by Google subject,
    /// then by verified email (linking the subject), and created as `staff`
    /// without a facility otherwise.
    pub async fn google(&self, id_token: &str) -> Result<AuthSession, AppError> {
        let verifier = self
            .google
            .as_ref()
            .ok_or_else(|| AppError::Forbidden("Google sign-in is not enabled".into()))?;

        let identity = verifier.verify(id_token).await?;
        if !identity.email_verified {
            return Err(AppError::Unauthorized("Google email is not verified".into()));
        }

        if let Some(user) = self.users.find_by_google_sub(&identity.sub).await? {
            return self.session(user);
        }

        let email = normalize_email(&identity.email);
        if let Some(existing) = self.users.find_by_email(&email).await? {
            if existing.google_sub.is_some() {
                return Err(AppError::Conflict(format!(
                    "User '{email}' is already linked to a different Google account"
                )));
            }
            let linked = found(
                self.users.link_google(existing.id, &identity.sub).await?,
                "User",
                existing.id,
            )?;
            tracing::info!(user_id = %linked.id, "Linked Google account");
            return self.session(linked);
        }

        let new_user = NewUser {
            full_name: identity.name.clone().unwrap_or_else(|| email.clone()),
            email,
            password_hash: None,
            role: Role::Staff,
            facility_id: None,
            google_sub: Some(identity.sub),
        };
        new_user.validate()?;
        let user = self.users.create(&new_user).await?;
        tracing::info!(user_id = %user.id, "Created user from Google sign-in");
        self.session(user)
    }

    /// Verify a bearer token and resolve the caller from the stored account,
    /// so deleted users lose access and role or facility changes apply at once.
    pub async fn authenticate(&self, token: &str) -> Result<Principal, AppError> {
        let claimed = self.issuer.verify(token)?;
        let user = self
            .users
            .get(claimed.user_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("account no longer exists".into()))?;
        Ok(Principal {
            user_id: user.id,
            role: user.role,
            facility_id: user.facility_id,
        })
    }

    pub async fn me(&self, caller: &Principal) -> Result<User, AppError> {
        self.users
            .get(caller.user_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("account no longer exists".into()))
    }

    fn session(&self, user: User) -> Result<AuthSession, AppError> {
        let token = self.issuer.issue(&user)?;
        Ok(AuthSession { token, user })
    }
}
