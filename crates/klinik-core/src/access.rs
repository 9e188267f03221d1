//! Role permissions and facility scoping.

use uuid::Uuid;

use crate::error::AppError;
use crate::models::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    ManageFacilities,
    ManageUsers,
    ManagePatients,
    ManageAppointments,
    ViewClinical,
    /// Anamnesis, lab tests, the medical record, specialty encounters.
    RecordObservations,
    /// Diagnoses and prescriptions.
    Diagnose,
}

impl Permission {
    fn describe(&self) -> &'static str {
        match self {
            Permission::ManageFacilities => "manage facilities",
            Permission::ManageUsers => "manage users",
            Permission::ManagePatients => "manage patients",
            Permission::ManageAppointments => "manage appointments",
            Permission::ViewClinical => "view clinical data",
            Permission::RecordObservations => "record clinical observations",
            Permission::Diagnose => "record diagnoses and prescriptions",
        }
    }
}

impl Role {
    pub fn can(&self, permission: Permission) -> bool {
        use Permission::*;
        match self {
            Role::Admin => true,
            Role::Doctor => !matches!(permission, ManageFacilities | ManageUsers),
            Role::Nurse | Role::Midwife => matches!(
                permission,
                ManagePatients | ManageAppointments | ViewClinical | RecordObservations
            ),
            Role::Staff => matches!(permission, ManagePatients | ManageAppointments),
        }
    }
}

/// The authenticated caller: the token subject with its current role and facility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: Uuid,
    pub role: Role,
    pub facility_id: Option<Uuid>,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn require(&self, permission: Permission) -> Result<(), AppError> {
        if self.role.can(permission) {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "role '{}' cannot {}",
                self.role,
                permission.describe()
            )))
        }
    }

    /// Admins reach every facility; everyone else only their own.
    pub fn require_facility(&self, facility_id: Uuid) -> Result<(), AppError> {
        if self.is_admin() || self.facility_id == Some(facility_id) {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "no access to facility {facility_id}"
            )))
        }
    }

    /// Both checks in one call, the common case for nested routes.
    pub fn authorize(&self, facility_id: Uuid, permission: Permission) -> Result<(), AppError> {
        self.require_facility(facility_id)?;
        self.require(permission)
    }
}
