use klinik_core::AppError;
use klinik_core::models::{
    AnamnesisInput, Appointment, DiagnosisInput, DiagnosisType, DiagnosisUpdate, EncounterKind,
    LabTestInput, LabTestStatus, MedicalRecordInput, Role, VitalSigns,
};
use klinik_core::traits::{
    AnamnesisStore, AppointmentStore, EncounterStore, EntryStore, FacilityStore,
    MedicalRecordStore, PatientStore, UserStore,
};
use klinik_db::Database;
use serde_json::json;

use crate::common::{new_appointment, new_facility, new_patient, new_user, setup_test_db};

async fn seed_appointment(db: &Database) -> Appointment {
    let facility = db.facility_repo().create(&new_facility("PKM-C")).await.unwrap();
    let doctor = db
        .user_repo()
        .create(&new_user("dokter@klinik.id", Role::Doctor, Some(facility.id)))
        .await
        .unwrap();
    let patient = db
        .patient_repo()
        .create(facility.id, "RM-1", &new_patient("Ani"))
        .await
        .unwrap();
    let mut input = new_appointment(patient.id);
    input.practitioner_id = Some(doctor.id);
    db.appointment_repo().create(facility.id, &input).await.unwrap()
}

#[tokio::test]
async fn medical_record_is_singleton() {
    let (db, _container) = setup_test_db().await;
    let appt = seed_appointment(&db).await;
    let repo = db.medical_record_repo();

    let input = MedicalRecordInput {
        assessment: Some("ISPA".into()),
        ..Default::default()
    };
    let record = repo.create(&appt, &input).await.unwrap();
    assert_eq!(record.patient_id, appt.patient_id);
    // practitioner defaults to the appointment's
    assert_eq!(record.practitioner_id, appt.practitioner_id);

    let err = repo.create(&appt, &input).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let update = MedicalRecordInput {
        plan: Some("Paracetamol, kontrol 3 hari".into()),
        ..Default::default()
    };
    let updated = repo.update(appt.id, &update).await.unwrap().unwrap();
    assert_eq!(updated.assessment.as_deref(), Some("ISPA"));
    assert!(updated.plan.is_some());

    assert!(repo.delete(appt.id).await.unwrap());
    assert!(repo.get(appt.id).await.unwrap().is_none());
}

#[tokio::test]
async fn anamnesis_merges_vital_signs() {
    let (db, _container) = setup_test_db().await;
    let appt = seed_appointment(&db).await;
    let repo = db.anamnesis_repo();

    let input = AnamnesisInput {
        chief_complaint: Some("Batuk pilek".into()),
        vital_signs: VitalSigns {
            systolic: Some(120),
            diastolic: Some(80),
            ..Default::default()
        },
        ..Default::default()
    };
    let created = repo.create(appt.id, &input).await.unwrap();
    assert_eq!(created.vital_signs.systolic, Some(120));

    let patch = AnamnesisInput {
        vital_signs: VitalSigns {
            temperature_c: Some(38.2),
            ..Default::default()
        },
        ..Default::default()
    };
    let updated = repo.update(appt.id, &patch).await.unwrap().unwrap();
    assert_eq!(updated.chief_complaint, "Batuk pilek");
    assert_eq!(updated.vital_signs.systolic, Some(120));
    assert_eq!(updated.vital_signs.temperature_c, Some(38.2));
}

#[tokio::test]
async fn entries_are_listed_oldest_first() {
    let (db, _container) = setup_test_db().await;
    let appt = seed_appointment(&db).await;
    let repo = db.diagnosis_repo();

    for (code, kind) in [("j06.9", DiagnosisType::Primary), ("R50.9", DiagnosisType::Secondary)] {
        let input = DiagnosisInput {
            icd10_code: code.into(),
            description: "ISPA".into(),
            diagnosis_type: kind,
            notes: None,
        };
        repo.create(appt.id, &input).await.unwrap();
    }

    let list = repo.list(appt.id).await.unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0].icd10_code, "J06.9");
    assert_eq!(list[1].diagnosis_type, DiagnosisType::Secondary);

    let update = DiagnosisUpdate {
        diagnosis_type: Some(DiagnosisType::Primary),
        ..Default::default()
    };
    let updated = repo.update(appt.id, list[1].id, &update).await.unwrap().unwrap();
    assert_eq!(updated.diagnosis_type, DiagnosisType::Primary);

    let labs = db.lab_test_repo();
    let lab = labs
        .create(
            appt.id,
            &LabTestInput {
                test_name: "Hemoglobin".into(),
                specimen: None,
                result: Some("11.2".into()),
                unit: Some("g/dL".into()),
                reference_range: None,
                status: None,
                notes: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(lab.status, LabTestStatus::Completed);
}

#[tokio::test]
async fn encounters_filter_by_kind() {
    let (db, _container) = setup_test_db().await;
    let appt = seed_appointment(&db).await;
    let record = db
        .medical_record_repo()
        .create(&appt, &MedicalRecordInput::default())
        .await
        .unwrap();
    let repo = db.encounter_repo();

    let imm = repo
        .create(
            &record,
            EncounterKind::Immunization,
            &json!({"vaccine": "BCG", "dose_number": 1}),
            appt.practitioner_id,
        )
        .await
        .unwrap();
    repo.create(&record, EncounterKind::Referral, &json!({"reason": "x"}), None)
        .await
        .unwrap();

    assert_eq!(repo.list(appt.id, None).await.unwrap().len(), 2);
    let only = repo
        .list(appt.id, Some(EncounterKind::Immunization))
        .await
        .unwrap();
    assert_eq!(only.len(), 1);
    assert_eq!(only[0].medical_record_id, record.id);

    let replaced = repo
        .replace_data(appt.id, imm.id, &json!({"vaccine": "BCG", "dose_number": 2}))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(replaced.data["dose_number"], 2);

    // deleting the appointment cascades
    let facility_id = appt.facility_id;
    db.appointment_repo().delete(facility_id, appt.id).await.unwrap();
    assert!(repo.get(appt.id, imm.id).await.unwrap().is_none());
    assert!(db.patient_repo().get(facility_id, appt.patient_id).await.unwrap().is_some());
}
