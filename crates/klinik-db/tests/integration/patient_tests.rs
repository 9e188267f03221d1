use klinik_core::AppError;
use klinik_core::models::{AppointmentFilter, AppointmentStatus, PatientUpdate, Role};
use klinik_core::pagination::PageRequest;
use klinik_core::traits::{AppointmentStore, FacilityStore, PatientStore, UserStore};
use uuid::Uuid;

use crate::common::{new_appointment, new_facility, new_patient, new_user, setup_test_db};

#[tokio::test]
async fn patient_crud_and_search() {
    let (db, _container) = setup_test_db().await;
    let facility = db.facility_repo().create(&new_facility("PKM-01")).await.unwrap();
    let repo = db.patient_repo();

    let mut input = new_patient("Rahmat Hidayat");
    input.nik = Some("3578011708920001".into());
    let rahmat = repo.create(facility.id, "RM-1", &input).await.unwrap();
    repo.create(facility.id, "RM-2", &new_patient("Sri 100% Wahyuni"))
        .await
        .unwrap();

    let all = repo
        .list(facility.id, None, PageRequest::default())
        .await
        .unwrap();
    assert_eq!(all.total, 2);

    let by_name = repo
        .list(facility.id, Some("HIDAYAT"), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(by_name.total, 1);
    assert_eq!(by_name.items[0].id, rahmat.id);

    let by_nik = repo
        .list(facility.id, Some("35780117"), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(by_nik.total, 1);

    // `%` is matched literally
    let literal = repo
        .list(facility.id, Some("100%"), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(literal.total, 1);

    let update = PatientUpdate {
        phone: Some("081298765432".into()),
        ..Default::default()
    };
    let updated = repo
        .update(facility.id, rahmat.id, &update)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.phone.as_deref(), Some("081298765432"));
    assert_eq!(updated.nik, rahmat.nik);

    assert!(repo.delete(facility.id, rahmat.id).await.unwrap());
    assert!(repo.get(facility.id, rahmat.id).await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_mrn_is_conflict() {
    let (db, _container) = setup_test_db().await;
    let facility = db.facility_repo().create(&new_facility("PKM-02")).await.unwrap();
    let other = db.facility_repo().create(&new_facility("PKM-03")).await.unwrap();
    let repo = db.patient_repo();

    repo.create(facility.id, "RM-1", &new_patient("Ani")).await.unwrap();
    let err = repo
        .create(facility.id, "RM-1", &new_patient("Budi"))
        .await
        .unwrap_err();
    match err {
        AppError::Conflict(msg) => assert!(msg.contains("MRN")),
        other => panic!("unexpected {other:?}"),
    }

    // MRNs are unique per facility only
    assert!(repo.create(other.id, "RM-1", &new_patient("Cici")).await.is_ok());
}

#[tokio::test]
async fn patient_scoped_to_facility() {
    let (db, _container) = setup_test_db().await;
    let a = db.facility_repo().create(&new_facility("PKM-A")).await.unwrap();
    let b = db.facility_repo().create(&new_facility("PKM-B")).await.unwrap();
    let repo = db.patient_repo();

    let patient = repo.create(a.id, "RM-1", &new_patient("Dewi")).await.unwrap();
    assert!(repo.get(b.id, patient.id).await.unwrap().is_none());
    assert!(!repo.delete(b.id, patient.id).await.unwrap());
}

#[tokio::test]
async fn duplicate_facility_code_and_email() {
    let (db, _container) = setup_test_db().await;
    db.facility_repo().create(&new_facility("PKM-X")).await.unwrap();
    assert!(matches!(
        db.facility_repo().create(&new_facility("PKM-X")).await,
        Err(AppError::Conflict(_))
    ));

    let users = db.user_repo();
    users
        .create(&new_user("bidan@klinik.id", Role::Midwife, None))
        .await
        .unwrap();
    assert!(matches!(
        users.create(&new_user("bidan@klinik.id", Role::Nurse, None)).await,
        Err(AppError::Conflict(_))
    ));
    let found = users.find_by_email("bidan@klinik.id").await.unwrap().unwrap();
    let linked = users.link_google(found.id, "google-123").await.unwrap().unwrap();
    assert_eq!(linked.google_sub.as_deref(), Some("google-123"));
    assert_eq!(
        users.find_by_google_sub("google-123").await.unwrap().map(|u| u.id),
        Some(found.id)
    );
}

#[tokio::test]
async fn appointment_filters_and_status() {
    let (db, _container) = setup_test_db().await;
    let facility = db.facility_repo().create(&new_facility("PKM-04")).await.unwrap();
    let patient = db
        .patient_repo()
        .create(facility.id, "RM-1", &new_patient("Ani"))
        .await
        .unwrap();
    let repo = db.appointment_repo();

    let first = repo.create(facility.id, &new_appointment(patient.id)).await.unwrap();
    repo.create(facility.id, &new_appointment(patient.id)).await.unwrap();
    assert_eq!(first.status, AppointmentStatus::Scheduled);

    let moved = repo
        .set_status(facility.id, first.id, AppointmentStatus::CheckedIn)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(moved.status, AppointmentStatus::CheckedIn);

    let filter = AppointmentFilter {
        status: Some(AppointmentStatus::CheckedIn),
        date: Some(first.scheduled_at.date_naive()),
        ..Default::default()
    };
    let page = repo
        .list(facility.id, &filter, PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].id, first.id);

    let all = repo
        .list(facility.id, &AppointmentFilter::default(), PageRequest::new(Some(1), Some(1)))
        .await
        .unwrap();
    assert_eq!(all.total, 2);
    assert_eq!(all.items.len(), 1);
}

#[tokio::test]
async fn appointment_for_unknown_patient_is_rejected() {
    let (db, _container) = setup_test_db().await;
    let facility = db.facility_repo().create(&new_facility("PKM-05")).await.unwrap();
    let err = db
        .appointment_repo()
        .create(facility.id, &new_appointment(Uuid::new_v4()))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation { .. }));
}

#[tokio::test]
async fn max_mrn_sequence_reads_numeric_suffixes() {
    let (db, _container) = setup_test_db().await;
    let facility = db.facility_repo().create(&new_facility("PKM-02")).await.unwrap();
    let other = db.facility_repo().create(&new_facility("PKM-03")).await.unwrap();
    let repo = db.patient_repo();

    assert_eq!(repo.max_mrn_sequence(facility.id, "PKM-02-202610-").await.unwrap(), None);

    for mrn in ["PKM-02-202610-00007", "PKM-02-202610-00012", "PKM-02-202610-LAMA", "PKM-02-202609-00099"] {
        repo.create(facility.id, mrn, &new_patient("Ani")).await.unwrap();
    }
    repo.create(other.id, "PKM-02-202610-00500", &new_patient("Budi"))
        .await
        .unwrap();

    assert_eq!(
        repo.max_mrn_sequence(facility.id, "PKM-02-202610-").await.unwrap(),
        Some(12)
    );
}
