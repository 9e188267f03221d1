use chrono::NaiveDate;
use klinik_core::models::{AppointmentStatus, EncounterKind, MedicalRecordInput, Role};
use klinik_core::traits::{
    AppointmentStore, DashboardStore, EncounterStore, FacilityStore, MedicalRecordStore,
    PatientStore, UserStore,
};
use serde_json::json;

use crate::common::{new_appointment, new_facility, new_patient, new_user, setup_test_db};

#[tokio::test]
async fn counts_are_scoped_by_facility_and_day() {
    let (db, _container) = setup_test_db().await;
    let facility = db.facility_repo().create(&new_facility("PKM-D")).await.unwrap();
    let other = db.facility_repo().create(&new_facility("PKM-E")).await.unwrap();
    let doctor = db
        .user_repo()
        .create(&new_user("dr@klinik.id", Role::Doctor, Some(facility.id)))
        .await
        .unwrap();
    db.user_repo()
        .create(&new_user("staf@klinik.id", Role::Staff, Some(other.id)))
        .await
        .unwrap();

    let patient = db
        .patient_repo()
        .create(facility.id, "RM-1", &new_patient("Ani"))
        .await
        .unwrap();
    db.patient_repo()
        .create(other.id, "RM-1", &new_patient("Budi"))
        .await
        .unwrap();

    let appointments = db.appointment_repo();
    let mut mine = new_appointment(patient.id);
    mine.practitioner_id = Some(doctor.id);
    let appt = appointments.create(facility.id, &mine).await.unwrap();
    appointments.create(facility.id, &new_appointment(patient.id)).await.unwrap();
    appointments
        .set_status(facility.id, appt.id, AppointmentStatus::InProgress)
        .await
        .unwrap();

    let record = db
        .medical_record_repo()
        .create(&appt, &MedicalRecordInput::default())
        .await
        .unwrap();
    db.encounter_repo()
        .create(&record, EncounterKind::ChildGrowth, &json!({}), None)
        .await
        .unwrap();

    let stats = db.dashboard_repo();
    let today = appt.scheduled_at.date_naive();
    assert_eq!(stats.count_patients(facility.id).await.unwrap(), 1);
    assert_eq!(stats.count_users(facility.id).await.unwrap(), 1);

    let mut all = stats
        .appointment_status_counts(facility.id, today, None)
        .await
        .unwrap();
    all.sort_by(|a, b| a.key.cmp(&b.key));
    let keys: Vec<_> = all.iter().map(|c| (c.key.as_str(), c.count)).collect();
    assert_eq!(keys, [("in_progress", 1), ("scheduled", 1)]);

    let own = stats
        .appointment_status_counts(facility.id, today, Some(doctor.id))
        .await
        .unwrap();
    assert_eq!(own.len(), 1);
    assert_eq!(own[0].key, "in_progress");

    let kinds = stats.encounter_kind_counts(facility.id, today).await.unwrap();
    assert_eq!(kinds.len(), 1);
    assert_eq!(kinds[0].key, "child_growth");
    assert!(stats.encounter_kind_counts(other.id, today).await.unwrap().is_empty());

    let long_ago = NaiveDate::from_ymd_opt(2019, 1, 1).unwrap();
    assert!(
        stats
            .appointment_status_counts(facility.id, long_ago, None)
            .await
            .unwrap()
            .is_empty()
    );
}
