use std::time::Duration;

use klinik_core::error::AppError;
use klinik_core::traits::{GoogleIdentity, GoogleVerifier};
use reqwest::{Client, StatusCode};
use serde::Deserialize;

pub const DEFAULT_TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const GOOGLE_ISSUERS: &[&str] = &["accounts.google.com", "https://accounts.google.com"];

/// Verifies Google ID tokens against the tokeninfo endpoint and checks
/// that they were minted for our OAuth client.
#[derive(Clone)]
pub struct GoogleTokenVerifier {
    client: Client,
    tokeninfo_url: String,
    client_id: String,
}

impl GoogleTokenVerifier {
    pub fn new(client_id: impl Into<String>) -> Result<Self, AppError> {
        Self::with_tokeninfo_url(client_id, DEFAULT_TOKENINFO_URL)
    }

    pub fn with_tokeninfo_url(
        client_id: impl Into<String>,
        tokeninfo_url: &str,
    ) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| AppError::ExternalService(e.to_string()))?;

        Ok(Self {
            client,
            tokeninfo_url: tokeninfo_url.to_string(),
            client_id: client_id.into(),
        })
    }
}

impl std::fmt::Debug for GoogleTokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleTokenVerifier")
            .field("tokeninfo_url", &self.tokeninfo_url)
            .field("client_id", &self.client_id)
            .finish()
    }
}

// ---- tokeninfo response ----

/// Google sends every claim as a string, but tolerate real booleans too.
#[derive(Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Text(String),
}

impl Flag {
    fn is_true(&self) -> bool {
        match self {
            Flag::Bool(b) => *b,
            Flag::Text(s) => s.eq_ignore_ascii_case("true"),
        }
    }
}

#[derive(Deserialize)]
struct TokenInfo {
    aud: String,
    sub: String,
    iss: Option<String>,
    email: Option<String>,
    email_verified: Option<Flag>,
    name: Option<String>,
}

impl TokenInfo {
    fn into_identity(self, client_id: &str) -> Result<GoogleIdentity, AppError> {
        if self.aud != client_id {
            tracing::warn!(aud = %self.aud, "Google token issued for another client");
            return Err(AppError::Unauthorized(
                "Google token was not issued for this application".into(),
            ));
        }
        if let Some(iss) = &self.iss
            && !GOOGLE_ISSUERS.contains(&iss.as_str())
        {
            return Err(AppError::Unauthorized(format!(
                "unexpected Google token issuer {iss}"
            )));
        }
        let email = self
            .email
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| AppError::Unauthorized("Google token carries no email".into()))?;

        Ok(GoogleIdentity {
            sub: self.sub,
            email,
            email_verified: self.email_verified.is_some_and(|f| f.is_true()),
            name: self.name,
        })
    }
}

impl GoogleVerifier for GoogleTokenVerifier {
    async fn verify(&self, id_token: &str) -> Result<GoogleIdentity, AppError> {
        if id_token.is_empty() {
            return Err(AppError::Unauthorized("missing Google ID token".into()));
        }
        let response = self
            .client
            .get(&self.tokeninfo_url)
            .query(&[("id_token", id_token)])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::ExternalService("Google tokeninfo timed out".into())
                } else {
                    AppError::ExternalService(format!("Google tokeninfo unreachable: {e}"))
                }
            })?;

        let status = response.status();
        if status == StatusCode::BAD_REQUEST || status == StatusCode::UNAUTHORIZED {
            tracing::warn!(status = status.as_u16(), "Google rejected ID token");
            return Err(AppError::Unauthorized("invalid Google ID token".into()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalService(format!(
                "Google tokeninfo returned HTTP {}: {}",
                status.as_u16(),
                body
            )));
        }

        let info: TokenInfo = response.json().await.map_err(|e| {
            AppError::ExternalService(format!("Failed to parse tokeninfo response: {e}"))
        })?;
        info.into_identity(&self.client_id)
    }
}
