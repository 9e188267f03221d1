pub mod access;
pub mod auth;
pub mod error;
pub mod models;
pub mod pagination;
pub mod recommendation;
pub mod service;
pub mod traits;
pub mod validation;

#[cfg(test)]
pub(crate) mod testutil;

pub use access::{Permission, Principal};
pub use auth::{IssuedToken, TokenIssuer};
pub use error::{AppError, FieldError};
pub use pagination::{Page, PageRequest};
pub use recommendation::{Recommendation, Recommender, StaticRecommender};
pub use traits::{
    AnamnesisStore, AppointmentStore, DashboardStore, EncounterStore, EntryStore, FacilityStore,
    GoogleIdentity, GoogleVerifier, MedicalRecordStore, PatientStore, UserStore, Validate,
};
