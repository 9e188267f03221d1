use uuid::Uuid;

use crate::access::{Permission, Principal};
use crate::error::AppError;
use crate::models::{User, UserUpdate};
use crate::pagination::{Page, PageRequest};
use crate::service::{deleted, found};
use crate::traits::{FacilityStore, UserStore};

/// Admin-only user management.
pub struct UserService<U: UserStore, F: FacilityStore> {
    users: U,
    facilities: F,
}

impl<U: UserStore, F: FacilityStore> UserService<U, F> {
    pub fn new(users: U, facilities: F) -> Self {
        Self { users, facilities }
    }

    pub async fn list(
        &self,
        caller: &Principal,
        facility_id: Option<Uuid>,
        page: PageRequest,
    ) -> Result<Page<User>, AppError> {
        caller.require(Permission::ManageUsers)?;
        self.users.list(facility_id, page).await
    }

    pub async fn get(&self, caller: &Principal, id: Uuid) -> Result<User, AppError> {
        caller.require(Permission::ManageUsers)?;
        found(self.users.get(id).await?, "User", id)
    }

    pub async fn update(&self, caller: &Principal, id: Uuid, update: &UserUpdate) -> Result<User, AppError> {
        caller.require(Permission::ManageUsers)?;
        update.validate()?;
        if let Some(facility_id) = update.facility_id {
            found(self.facilities.get(facility_id).await?, "Facility", facility_id)?;
        }
        let user = found(self.users.update(id, update).await?, "User", id)?;
        tracing::info!(user_id = %id, role = %user.role, "User updated");
        Ok(user)
    }

    pub async fn delete(&self, caller: &Principal, id: Uuid) -> Result<(), AppError> {
        caller.require(Permission::ManageUsers)?;
        if caller.user_id == id {
            return Err(AppError::Conflict("cannot delete the signed-in account".into()));
        }
        deleted(self.users.delete(id).await?, "User", id)
    }
}
