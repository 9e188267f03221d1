use axum::http::{Method, StatusCode};
use serde_json::{Value, json};

use crate::common::{TestApp, setup_test_app};

struct Visit {
    facility_id: String,
    patient_id: String,
    base: String,
    midwife: String,
    staff: String,
}

async fn visit(app: &TestApp, code: &str) -> Visit {
    let admin = app.admin_token().await;
    let facility_id = app.create_facility(&admin, code).await;
    let staff = app.register("loket@klinik.test", "staff", &facility_id).await;
    let midwife = app.register("bidan@klinik.test", "midwife", &facility_id).await;
    let patient = app.create_patient(&staff, &facility_id, "Sari Wulandari").await;
    let patient_id = patient["id"].as_str().unwrap().to_string();
    let appointment_id = app.create_appointment(&staff, &facility_id, &patient_id).await;
    Visit {
        base: format!("/api/v1/facilities/{facility_id}/appointments/{appointment_id}"),
        facility_id,
        patient_id,
        midwife,
        staff,
    }
}

fn anc() -> Value {
    json!({
        "kind": "antenatal_care_observation",
        "data": {
            "visit_number": 2,
            "gestational_age_weeks": 20,
            "gravida": 2,
            "para": 1,
            "abortus": 0,
            "fetal_heart_rate": 140
        }
    })
}

#[tokio::test]
async fn medical_record_and_anamnesis() {
    let app = setup_test_app().await;
    let v = visit(&app, "PKM-10").await;
    let record_uri = format!("{}/medical-record", v.base);

    let (status, _) = app.send(Method::GET, &record_uri, Some(&v.midwife), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, record) = app
        .send(
            Method::POST,
            &record_uri,
            Some(&v.midwife),
            Some(json!({"assessment": "Kehamilan normal"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{record}");
    assert_eq!(record["assessment"], "Kehamilan normal");

    let (status, body) = app
        .send(Method::POST, &record_uri, Some(&v.midwife), Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["errorCode"], "conflict");

    // registration staff may not document clinical findings
    let anamnesis_uri = format!("{}/anamnesis", v.base);
    let (status, _) = app
        .send(
            Method::POST,
            &anamnesis_uri,
            Some(&v.staff),
            Some(json!({"chief_complaint": "Pusing"})),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, anamnesis) = app
        .send(
            Method::POST,
            &anamnesis_uri,
            Some(&v.midwife),
            Some(json!({
                "chief_complaint": "Pusing dan mual",
                "vital_signs": {"systolic": 120, "diastolic": 80, "weight_kg": 60.0, "height_cm": 160.0}
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{anamnesis}");
    assert_eq!(anamnesis["bmi"], 23.4);

    let (status, merged) = app
        .send(
            Method::PUT,
            &anamnesis_uri,
            Some(&v.midwife),
            Some(json!({"vital_signs": {"pulse": 88}})),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{merged}");
    assert_eq!(merged["vital_signs"]["pulse"], 88);
    assert_eq!(merged["vital_signs"]["systolic"], 120);
    assert_eq!(merged["chief_complaint"], "Pusing dan mual");

    let (status, body) = app
        .send(
            Method::PUT,
            &anamnesis_uri,
            Some(&v.midwife),
            Some(json!({"vital_signs": {"glucose": 90}})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
}

#[tokio::test]
async fn diagnosis_prescription_and_lab_collections() {
    let app = setup_test_app().await;
    let v = visit(&app, "PKM-11").await;
    let doctor = app.register("dokter@klinik.test", "doctor", &v.facility_id).await;

    let diagnoses = format!("{}/diagnoses", v.base);
    let (status, dx) = app
        .send(
            Method::POST,
            &diagnoses,
            Some(&doctor),
            Some(json!({"icd10_code": "o21.0", "description": "Hiperemesis gravidarum ringan"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{dx}");
    assert_eq!(dx["icd10_code"], "O21.0");
    assert_eq!(dx["diagnosis_type"], "primary");

    let (status, body) = app
        .send(
            Method::POST,
            &diagnoses,
            Some(&doctor),
            Some(json!({"icd10_code": "not-a-code", "description": "x"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"][0]["field"], "icd10_code");

    // midwives observe but do not diagnose
    let (status, _) = app
        .send(
            Method::POST,
            &diagnoses,
            Some(&v.midwife),
            Some(json!({"icd10_code": "Z34.0", "description": "Supervisi kehamilan"})),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let item = format!("{diagnoses}/{}", dx["id"].as_str().unwrap());
    let (status, updated) = app
        .send(Method::PUT, &item, Some(&doctor), Some(json!({"notes": "kontrol 1 minggu"})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["notes"], "kontrol 1 minggu");
    assert_eq!(updated["icd10_code"], "O21.0");

    let (status, rx) = app
        .send(
            Method::POST,
            &format!("{}/prescriptions", v.base),
            Some(&doctor),
            Some(json!({
                "drug_name": "Asam folat",
                "dosage": "400 mcg",
                "frequency": "1x sehari",
                "quantity": 30
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{rx}");

    let labs = format!("{}/lab-tests", v.base);
    let (status, lab) = app
        .send(
            Method::POST,
            &labs,
            Some(&v.midwife),
            Some(json!({"test_name": "Hemoglobin", "result": "11.2", "unit": "g/dL"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{lab}");
    assert_eq!(lab["status"], "completed");

    let (status, list) = app.send(Method::GET, &labs, Some(&v.midwife), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (status, _) = app.send(Method::DELETE, &item, Some(&doctor), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, list) = app.send(Method::GET, &diagnoses, Some(&doctor), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(list.as_array().unwrap().is_empty());

    let (status, recs) = app
        .send(Method::GET, &format!("{}/recommendations", v.base), Some(&doctor), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(!recs.as_array().unwrap().is_empty());
    assert_eq!(recs[0]["is_placeholder"], true);
}

#[tokio::test]
async fn encounters_need_a_medical_record() {
    let app = setup_test_app().await;
    let v = visit(&app, "PKM-12").await;
    let encounters = format!("{}/encounters", v.base);

    let (status, body) = app
        .send(Method::POST, &encounters, Some(&v.midwife), Some(anc()))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND, "{body}");

    let (status, _) = app
        .send(
            Method::POST,
            &format!("{}/medical-record", v.base),
            Some(&v.midwife),
            Some(json!({})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, created) = app
        .send(Method::POST, &encounters, Some(&v.midwife), Some(anc()))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{created}");
    assert_eq!(created["kind"], "antenatal_care_observation");
    let item = format!("{encounters}/{}", created["id"].as_str().unwrap());

    let (status, patched) = app
        .send(
            Method::PUT,
            &item,
            Some(&v.midwife),
            Some(json!({"data": {"gestational_age_weeks": 24}})),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{patched}");
    assert_eq!(patched["data"]["gestational_age_weeks"], 24);
    assert_eq!(patched["data"]["fetal_heart_rate"], 140);

    let (status, body) = app
        .send(
            Method::POST,
            &encounters,
            Some(&v.midwife),
            Some(json!({"kind": "immunization", "data": {"vaccine": "TT", "unexpected": 1}})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");

    let (status, body) = app
        .send(
            Method::GET,
            &format!("{encounters}?kind=partograph"),
            Some(&v.midwife),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());

    let (status, body) = app
        .send(Method::GET, &format!("{encounters}?kind=bogus"), Some(&v.midwife), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errorCode"], "validation_error");

    let (status, _) = app.send(Method::DELETE, &item, Some(&v.midwife), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.send(Method::GET, &item, Some(&v.midwife), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn medical_history_collects_every_visit() {
    let app = setup_test_app().await;
    let v = visit(&app, "PKM-13").await;

    app.send(
        Method::POST,
        &format!("{}/anamnesis", v.base),
        Some(&v.midwife),
        Some(json!({"chief_complaint": "Kontrol kehamilan"})),
    )
    .await;
    app.create_appointment(&v.staff, &v.facility_id, &v.patient_id).await;

    let uri = format!(
        "/api/v1/facilities/{}/patients/{}/medical-history",
        v.facility_id, v.patient_id
    );
    let (status, history) = app.send(Method::GET, &uri, Some(&v.midwife), None).await;
    assert_eq!(status, StatusCode::OK, "{history}");
    assert_eq!(history["patient"]["full_name"], "Sari Wulandari");
    let visits = history["visits"].as_array().unwrap();
    assert_eq!(visits.len(), 2);
    assert!(
        visits
            .iter()
            .any(|visit| visit["anamnesis"]["chief_complaint"] == "Kontrol kehamilan")
    );
    assert!(visits.iter().any(|visit| visit["anamnesis"].is_null()));

    let (status, _) = app.send(Method::GET, &uri, Some(&v.staff), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn dashboard_is_shaped_by_role() {
    let app = setup_test_app().await;
    let v = visit(&app, "PKM-14").await;
    let uri = format!("/api/v1/facilities/{}/dashboard", v.facility_id);

    let (status, staff_view) = app.send(Method::GET, &uri, Some(&v.staff), None).await;
    assert_eq!(status, StatusCode::OK, "{staff_view}");
    assert_eq!(staff_view["patients_total"], 1);
    let scheduled = staff_view["appointments_by_status"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["key"] == "scheduled")
        .unwrap();
    assert_eq!(scheduled["count"], 1);
    assert!(staff_view.get("encounters_by_kind").is_none());
    assert!(staff_view.get("users_total").is_none());

    let (status, midwife_view) = app.send(Method::GET, &uri, Some(&v.midwife), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(midwife_view["encounters_by_kind"].is_array());

    let (status, old) = app
        .send(Method::GET, &format!("{uri}?date=2020-01-01"), Some(&v.staff), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(
        old["appointments_by_status"]
            .as_array()
            .unwrap()
            .iter()
            .all(|c| c["count"] == 0)
    );
}
