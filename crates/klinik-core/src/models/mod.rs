//! Domain entities and the inputs used to create or update them.

use std::str::FromStr;

use crate::error::AppError;

/// Declares a closed set of string codes stored as `VARCHAR` and carried
/// over the wire as plain strings.
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(s))
                    .ok_or_else(|| {
                        let allowed: Vec<&str> = $name::ALL.iter().map(|v| v.as_str()).collect();
                        format!("unknown value '{}', expected one of: {}", s, allowed.join(", "))
                    })
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

pub mod appointment;
pub mod clinical;
pub mod dashboard;
pub mod encounter;
pub mod facility;
pub mod medical_record;
pub mod patient;
pub mod user;

pub use appointment::{
    Appointment, AppointmentFilter, AppointmentStatus, AppointmentUpdate, NewAppointment,
};
pub use clinical::{
    Diagnosis, DiagnosisInput, DiagnosisType, DiagnosisUpdate, LabTest, LabTestInput,
    LabTestStatus, LabTestUpdate, Prescription, PrescriptionInput, PrescriptionUpdate,
};
pub use dashboard::{Dashboard, StatusCount};
pub use encounter::{EncounterKind, EncounterPayload, EncounterRecord};
pub use facility::{Facility, FacilityType, FacilityUpdate, NewFacility};
pub use medical_record::{
    Anamnesis, AnamnesisInput, MedicalHistoryEntry, MedicalRecord, MedicalRecordInput, VitalSigns,
};
pub use patient::{BloodType, Gender, NewPatient, Patient, PatientUpdate};
pub use user::{NewUser, Role, User, UserUpdate};

/// Parse a submitted code into its enum, reporting failures against `field`.
pub fn parse_field<T>(field: &str, raw: &str) -> Result<T, AppError>
where
    T: FromStr<Err = String>,
{
    raw.parse().map_err(|e: String| AppError::invalid(field, e))
}

/// Optional variant of [`parse_field`].
pub fn parse_optional_field<T>(field: &str, raw: Option<&str>) -> Result<Option<T>, AppError>
where
    T: FromStr<Err = String>,
{
    raw.map(|r| parse_field(field, r)).transpose()
}
