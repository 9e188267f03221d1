use std::future::Future;

use serde::Serialize;

use crate::error::AppError;
use crate::models::{Anamnesis, Appointment};

/// A suggested diagnosis for an appointment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub icd10_code: String,
    pub label: String,
    pub confidence: f32,
    /// True while suggestions are canned rather than model-generated.
    pub is_placeholder: bool,
}

/// Produces diagnosis suggestions from what was recorded at intake.
pub trait Recommender: Send + Sync + Clone {
    fn recommend(
        &self,
        appointment: &Appointment,
        anamnesis: Option<&Anamnesis>,
    ) -> impl Future<Output = Result<Vec<Recommendation>, AppError>> + Send;
}

/// Returns the same fixed suggestions for every appointment.
#[derive(Debug, Clone, Default)]
pub struct StaticRecommender;

const CANNED: &[(&str, &str, f32)] = &[
    ("J06.9", "Acute upper respiratory infection, unspecified", 0.42),
    ("A09", "Infectious gastroenteritis and colitis, unspecified", 0.27),
    ("I10", "Essential (primary) hypertension", 0.18),
];

impl Recommender for StaticRecommender {
    async fn recommend(
        &self,
        appointment: &Appointment,
        _anamnesis: Option<&Anamnesis>,
    ) -> Result<Vec<Recommendation>, AppError> {
        tracing::debug!(appointment_id = %appointment.id, "Serving canned recommendations");
        Ok(CANNED
            .iter()
            .map(|(code, label, confidence)| Recommendation {
                icd10_code: (*code).to_string(),
                label: (*label).to_string(),
                confidence: *confidence,
                is_placeholder: true,
            })
            .collect())
    }
}
