use uuid::Uuid;

use crate::access::{Permission, Principal};
use crate::error::AppError;
use crate::models::{Facility, FacilityUpdate, NewFacility};
use crate::pagination::{Page, PageRequest};
use crate::service::{deleted, found};
use crate::traits::FacilityStore;

pub struct FacilityService<F: FacilityStore> {
    facilities: F,
}

impl<F: FacilityStore> FacilityService<F> {
    pub fn new(facilities: F) -> Self {
        Self { facilities }
    }

    pub async fn create(&self, caller: &Principal, input: &NewFacility) -> Result<Facility, AppError> {
        caller.require(Permission::ManageFacilities)?;
        input.validate()?;
        let facility = self.facilities.create(input).await?;
        tracing::info!(facility_id = %facility.id, code = %facility.code, "Facility created");
        Ok(facility)
    }

    pub async fn get(&self, caller: &Principal, id: Uuid) -> Result<Facility, AppError> {
        caller.require_facility(id)?;
        found(self.facilities.get(id).await?, "Facility", id)
    }

    /// Admins page through every facility; everyone else sees only their own.
    pub async fn list(&self, caller: &Principal, page: PageRequest) -> Result<Page<Facility>, AppError> {
        if caller.is_admin() {
            return self.facilities.list(page).await;
        }
        let own = match caller.facility_id {
            Some(id) => self.facilities.get(id).await?,
            None => None,
        };
        Ok(Page::from_vec(own.into_iter().collect(), page))
    }

    pub async fn update(
        &self,
        caller: &Principal,
        id: Uuid,
        update: &FacilityUpdate,
    ) -> Result<Facility, AppError> {
        caller.require(Permission::ManageFacilities)?;
        update.validate()?;
        found(self.facilities.update(id, update).await?, "Facility", id)
    }

    pub async fn delete(&self, caller: &Principal, id: Uuid) -> Result<(), AppError> {
        caller.require(Permission::ManageFacilities)?;
        deleted(self.facilities.delete(id).await?, "Facility", id)?;
        tracing::info!(facility_id = %id, "Facility deleted");
        Ok(())
    }
}
