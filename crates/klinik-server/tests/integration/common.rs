use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use chrono::TimeDelta;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use sqlx::postgres::PgPoolOptions;
use testcontainers::core::{ContainerPort, WaitFor};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, GenericImage, ImageExt};
use tower::ServiceExt;

use klinik_core::auth::hash_password;
use klinik_core::models::{NewUser, Role};
use klinik_core::{StaticRecommender, TokenIssuer, UserStore};
use klinik_db::Database;
use klinik_server::routes;
use klinik_server::state::AppState;

pub const TEST_SECRET: &[u8] = b"integration-test-secret-0123456789abcdef";
pub const ADMIN_EMAIL: &str = "admin@klinik.test";
pub const PASSWORD: &str = "rahasia-123";

pub struct TestApp {
    pub router: Router,
    pub db: Database,
    _container: ContainerAsync<GenericImage>,
}

/// Spin up a PostgreSQL container and return the router wired to it.
pub async fn setup_test_app() -> TestApp {
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

    let state = Arc::new(AppState {
        db: db.clone(),
        tokens: TokenIssuer::new(TEST_SECRET, "klinik", TimeDelta::minutes(30)).unwrap(),
        google: None,
        recommender: StaticRecommender,
    });

    TestApp {
        router: routes::router(state),
        db,
        _container: container,
    }
}

impl TestApp {
    /// Send one request and decode the JSON body (`Value::Null` when empty).
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header("authorization", format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => request
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, json)
    }

    pub async fn login(&self, email: &str, password: &str) -> String {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/v1/auth/login",
                None,
                Some(json!({"email": email, "password": password})),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["access_token"].as_str().unwrap().to_string()
    }

    /// Seed the admin account directly, the way the CLI does, and sign in.
    pub async fn admin_token(&self) -> String {
        UserStore::create(
            &self.db.user_repo(),
            &NewUser {
                email: ADMIN_EMAIL.into(),
                password_hash: Some(hash_password(PASSWORD).unwrap()),
                full_name: "Admin Dinkes".into(),
                role: Role::Admin,
                facility_id: None,
                google_sub: None,
            },
        )
        .await
        .unwrap();
        self.login(ADMIN_EMAIL, PASSWORD).await
    }

    pub async fn create_facility(&self, admin: &str, code: &str) -> String {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/v1/facilities",
                Some(admin),
                Some(json!({
                    "code": code,
                    "name": format!("Puskesmas {code}"),
                    "facility_type": "puskesmas"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["id"].as_str().unwrap().to_string()
    }

    /// Self-register a user at `facility_id` and return their token.
    pub async fn register(&self, email: &str, role: &str, facility_id: &str) -> String {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/v1/auth/register",
                None,
                Some(json!({
                    "email": email,
                    "password": PASSWORD,
                    "full_name": "Bidan Rina",
                    "role": role,
                    "facility_id": facility_id
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["access_token"].as_str().unwrap().to_string()
    }

    pub async fn create_patient(&self, token: &str, facility_id: &str, name: &str) -> Value {
        let (status, body) = self
            .send(
                Method::POST,
                &format!("/api/v1/facilities/{facility_id}/patients"),
                Some(token),
                Some(json!({
                    "full_name": name,
                    "gender": "female",
                    "birth_date": "1994-03-12"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body
    }

    pub async fn create_appointment(&self, token: &str, facility_id: &str, patient_id: &str) -> String {
        let (status, body) = self
            .send(
                Method::POST,
                &format!("/api/v1/facilities/{facility_id}/appointments"),
                Some(token),
                Some(json!({
                    "patient_id": patient_id,
                    "scheduled_at": chrono::Utc::now(),
                    "service_unit": "Poli KIA"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["id"].as_str().unwrap().to_string()
    }
}
