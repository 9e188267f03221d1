use chrono::TimeDelta;
use klinik_client::DEFAULT_TOKENINFO_URL;
use klinik_core::AppError;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_JWT_TTL_MINUTES: i64 = 480;
pub const DEFAULT_JWT_ISSUER: &str = "klinik";

/// Server settings read from the environment at start-up.
#[derive(Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_ttl: TimeDelta,
    pub jwt_issuer: String,
    /// Google sign-in is disabled when unset.
    pub google_client_id: Option<String>,
    pub google_tokeninfo_url: String,
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("port", &self.port)
            .field("jwt_secret", &"<redacted>")
            .field("jwt_ttl", &self.jwt_ttl)
            .field("jwt_issuer", &self.jwt_issuer)
            .field("google_client_id", &self.google_client_id)
            .field("google_tokeninfo_url", &self.google_tokeninfo_url)
            .finish()
    }
}

impl ServerConfig {
    /// Read configuration from environment variables.
    ///
    /// - `KLINIK_JWT_SECRET` (required)
    /// - `KLINIK_SERVER_PORT` (default 3000)
    /// - `KLINIK_JWT_TTL_MINUTES` (default 480)
    /// - `KLINIK_JWT_ISSUER` (default `klinik`)
    /// - `KLINIK_GOOGLE_CLIENT_ID`, `KLINIK_GOOGLE_TOKENINFO_URL`
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let jwt_secret = var("KLINIK_JWT_SECRET")
            .ok_or_else(|| AppError::ConfigError("KLINIK_JWT_SECRET must be set".into()))?;

        let port = match var("KLINIK_SERVER_PORT") {
            Some(raw) => raw.parse().map_err(|_| {
                AppError::ConfigError(format!("Invalid KLINIK_SERVER_PORT '{raw}'"))
            })?,
            None => DEFAULT_PORT,
        };

        let ttl_minutes = match var("KLINIK_JWT_TTL_MINUTES") {
            Some(raw) => raw
                .parse::<i64>()
                .ok()
                .filter(|m| *m > 0)
                .ok_or_else(|| {
                    AppError::ConfigError(format!(
                        "Invalid KLINIK_JWT_TTL_MINUTES '{raw}': must be a positive integer"
                    ))
                })?,
            None => DEFAULT_JWT_TTL_MINUTES,
        };

        Ok(Self {
            port,
            jwt_secret,
            jwt_ttl: TimeDelta::minutes(ttl_minutes),
            jwt_issuer: var("KLINIK_JWT_ISSUER").unwrap_or_else(|| DEFAULT_JWT_ISSUER.to_string()),
            google_client_id: var("KLINIK_GOOGLE_CLIENT_ID"),
            google_tokeninfo_url: var("KLINIK_GOOGLE_TOKENINFO_URL")
                .unwrap_or_else(|| DEFAULT_TOKENINFO_URL.to_string()),
        })
    }
}
