use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use klinik_core::auth::{MIN_PASSWORD_LEN, hash_password};
use klinik_core::models::user::normalize_email;
use klinik_core::models::{NewUser, Patient, Role};
use klinik_core::pagination::MAX_PAGE_SIZE;
use klinik_core::{FacilityStore, PageRequest, PatientStore, UserStore};
use klinik_db::{Database, DatabaseConfig};

#[derive(Parser)]
#[command(name = "klinik", version, about = "Klinik EMR operator tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,

    /// Create an administrator account (admins cannot self-register)
    CreateAdmin {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        name: String,

        /// Reads KLINIK_ADMIN_PASSWORD when not given
        #[arg(short, long, env = "KLINIK_ADMIN_PASSWORD")]
        password: String,
    },

    /// List all facilities
    Facilities,

    /// Export a facility's patient registry as CSV
    ExportPatients {
        /// Facility ID
        #[arg(short, long)]
        facility: Uuid,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("klinik=info".parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let db = connect_db().await?;

    match cli.command {
        Commands::Migrate => {
            db.migrate().await.context("Migration failed")?;
            tracing::info!("Database is up to date");
        }
        Commands::CreateAdmin {
            email,
            name,
            password,
        } => {
            db.migrate().await.context("Migration failed")?;
            cmd_create_admin(&db, &email, &name, &password).await?;
        }
        Commands::Facilities => cmd_facilities(&db).await?,
        Commands::ExportPatients { facility, output } => {
            cmd_export_patients(&db, facility, output.as_deref()).await?;
        }
    }

    Ok(())
}

/// Connect to PostgreSQL using DATABASE_URL.
async fn connect_db() -> Result<Database> {
    let config = DatabaseConfig::from_env()?;
    Database::connect(&config)
        .await
        .context("Failed to connect to database")
}

async fn cmd_create_admin(db: &Database, email: &str, name: &str, password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        bail!("Password must be at least {MIN_PASSWORD_LEN} characters");
    }

    let mut admin = NewUser {
        email: normalize_email(email),
        password_hash: None,
        full_name: name.trim().to_string(),
        role: Role::Admin,
        facility_id: None,
        google_sub: None,
    };
    admin.validate()?;

    let users = db.user_repo();
    if users.find_by_email(&admin.email).await?.is_some() {
        bail!("A user with email '{}' already exists", admin.email);
    }

    admin.password_hash = Some(hash_password(password)?);
    let user = users.create(&admin).await?;
    tracing::info!(user_id = %user.id, email = %user.email, "Admin created");
    println!("{}", user.id);
    Ok(())
}

async fn cmd_facilities(db: &Database) -> Result<()> {
    let repo = db.facility_repo();
    let mut request = PageRequest::new(Some(1), Some(MAX_PAGE_SIZE));
    let mut shown = 0;

    loop {
        let page = repo.list(request).await?;
        if shown == 0 && page.items.is_empty() {
            println!("No facilities registered");
            return Ok(());
        }
        for f in &page.items {
            println!("{}  {:<12} {:<11} {}", f.id, f.code, f.facility_type.as_str(), f.name);
        }
        shown += page.items.len();
        if page.items.is_empty() || shown as i64 >= page.total {
            println!("\nTotal: {} facilities", page.total);
            return Ok(());
        }
        request = PageRequest::new(Some(request.page() + 1), Some(MAX_PAGE_SIZE));
    }
}

#[derive(Serialize)]
struct PatientCsvRow<'a> {
    mrn: &'a str,
    nik: Option<&'a str>,
    full_name: &'a str,
    gender: String,
    birth_date: NaiveDate,
    birth_place: Option<&'a str>,
    blood_type: Option<String>,
    phone: Option<&'a str>,
    address: Option<&'a str>,
    bpjs_number: Option<&'a str>,
    registered_at: DateTime<Utc>,
}

impl<'a> From<&'a Patient> for PatientCsvRow<'a> {
    fn from(p: &'a Patient) -> Self {
        Self {
            mrn: &p.mrn,
            nik: p.nik.as_deref(),
            full_name: &p.full_name,
            gender: p.gender.to_string(),
            birth_date: p.birth_date,
            birth_place: p.birth_place.as_deref(),
            blood_type: p.blood_type.map(|b| b.to_string()),
            phone: p.phone.as_deref(),
            address: p.address.as_deref(),
            bpjs_number: p.bpjs_number.as_deref(),
            registered_at: p.created_at,
        }
    }
}

/// Write every patient of `facility_id` to `output`, newest registration first.
async fn cmd_export_patients(db: &Database, facility_id: Uuid, output: Option<&Path>) -> Result<()> {
    let facility = db
        .facility_repo()
        .get(facility_id)
        .await?
        .with_context(|| format!("Facility {facility_id} not found"))?;

    let sink: Box<dyn Write> = match output {
        Some(path) => Box::new(
            std::fs::File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?,
        ),
        None => Box::new(std::io::stdout().lock()),
    };
    let mut writer = csv::Writer::from_writer(sink);

    let repo = db.patient_repo();
    let mut request = PageRequest::new(Some(1), Some(MAX_PAGE_SIZE));
    let mut written = 0usize;
    loop {
        let page = repo.list(facility_id, None, request).await?;
        for patient in &page.items {
            writer.serialize(PatientCsvRow::from(patient))?;
        }
        written += page.items.len();
        if page.items.is_empty() || written as i64 >= page.total {
            break;
        }
        request = PageRequest::new(Some(request.page() + 1), Some(MAX_PAGE_SIZE));
    }
    writer.flush()?;

    tracing::info!(facility = %facility.code, patients = written, "Export complete");
    Ok(())
}
