use chrono::{NaiveDate, Utc};
use klinik_core::models::{
    FacilityType, Gender, NewAppointment, NewFacility, NewPatient, NewUser, Role,
};
use klinik_db::Database;
use sqlx::postgres::PgPoolOptions;
use testcontainers::core::{ContainerPort, WaitFor};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, GenericImage, ImageExt};
use uuid::Uuid;

/// Spins up a PostgreSQL container and returns a migrated database.
///
/// The `ContainerAsync` must be kept in scope for the test duration;
/// dropping it stops the container.
pub async fn setup_test_db() -> (Database, ContainerAsync<GenericImage>) {
    let container = GenericImage::new("postgres", "16")
        .with_exposed_port(ContainerPort::Tcp(5432))
        .with_wait_for(WaitFor::message_on_stderr(
            "database system is ready to accept connections",
        ))
        .with_env_var("POSTGRES_PASSWORD", "postgres")
        .with_env_var("POSTGRES_DB", "klinik_test")
        .start()
        .await
        .expect("Failed to start PostgreSQL container");

    let host = container.get_host().await.expect("Failed to get host");
    let port = container
        .get_host_port_ipv4(5432)
        .await
        .expect("Failed to get port");

    let connection_string = format!("postgresql://postgres:postgres@{host}:{port}/klinik_test");

    // Retry connection until container is fully ready
    const MAX_RETRIES: u32 = 30;
    let mut retries = 0;
    let pool = loop {
        match PgPoolOptions::new()
            .max_connections(5)
            .connect(&connection_string)
            .await
        {
            Ok(pool) => break pool,
            Err(e) => {
                retries += 1;
                if retries >= MAX_RETRIES {
                    panic!("Failed to connect to database after {MAX_RETRIES} retries: {e}");
                }
                tokio::time::sleep(std::time::Duration::from_millis(100)).await;
            }
        }
    };

    let db = Database::from_pool(pool);
    db.migrate().await.expect("Failed to run migrations");
    (db, container)
}

pub fn new_facility(code: &str) -> NewFacility {
    NewFacility {
        code: code.to_string(),
        name: format!("Puskesmas {code}"),
        facility_type: FacilityType::Puskesmas,
        address: Some("Jl. Merdeka 1".into()),
        phone: None,
        email: None,
    }
}

pub fn new_patient(name: &str) -> NewPatient {
    NewPatient {
        mrn: None,
        nik: None,
        full_name: name.to_string(),
        gender: Gender::Female,
        birth_date: NaiveDate::from_ymd_opt(1992, 8, 17).unwrap(),
        birth_place: Some("Surabaya".into()),
        blood_type: None,
        phone: None,
        address: None,
        bpjs_number: None,
    }
}

pub fn new_appointment(patient_id: Uuid) -> NewAppointment {
    NewAppointment {
        patient_id,
        practitioner_id: None,
        scheduled_at: Utc::now(),
        service_unit: "Poli KIA".into(),
        complaint: Some("Kontrol kehamilan".into()),
        notes: None,
    }
}

pub fn new_user(email: &str, role: Role, facility_id: Option<Uuid>) -> NewUser {
    NewUser {
        email: email.to_string(),
        password_hash: Some("$argon2id$placeholder".into()),
        full_name: "Siti Aminah".into(),
        role,
        facility_id,
        google_sub: None,
    }
}
