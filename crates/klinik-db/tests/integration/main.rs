mod clinical_tests;
mod common;
mod dashboard_tests;
mod patient_tests;
