use std::sync::Arc;

use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use klinik_client::GoogleTokenVerifier;
use klinik_core::{StaticRecommender, TokenIssuer};
use klinik_db::{Database, DatabaseConfig};
use klinik_server::config::ServerConfig;
use klinik_server::routes;
use klinik_server::state::AppState;

const MAX_BODY_BYTES: usize = 1024 * 1024;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("klinik=info".parse()?))
        .with_target(false)
        .init();

    let config = ServerConfig::from_env()?;
    tracing::debug!(?config, "Loaded configuration");
    let addr = format!("0.0.0.0:{}", config.port);

    let db = Database::connect(&DatabaseConfig::from_env()?).await?;
    db.migrate().await?;

    let tokens = TokenIssuer::new(
        config.jwt_secret.as_bytes(),
        config.jwt_issuer.clone(),
        config.jwt_ttl,
    )?;
    let google = match &config.google_client_id {
        Some(client_id) => Some(GoogleTokenVerifier::with_tokeninfo_url(
            client_id.clone(),
            &config.google_tokeninfo_url,
        )?),
        None => {
            tracing::info!("KLINIK_GOOGLE_CLIENT_ID not set, Google sign-in disabled");
            None
        }
    };

    let state = Arc::new(AppState {
        db,
        tokens,
        google,
        recommender: StaticRecommender,
    });

    let app = routes::router(state)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    tracing::info!("Starting server on {addr}");
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
