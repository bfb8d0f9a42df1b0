//! Hostel Dining Backend
//! Mission: Serve accounts, meal schedules and meal feedback over HTTP

use anyhow::{Context, Result};
use clap::Parser;
use dotenv::dotenv;
use hostel_dining_backend::{api, auth::JwtHandler, config::Config, db::Database, AppState};
use std::path::Path;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    load_env();
    init_tracing();

    let config = Config::parse();
    info!("🍽️  Hostel dining backend starting");

    if config.uses_dev_secret() {
        warn!("⚠️  JWT_SECRET not set - using development signing key");
    }

    let db = Database::open(&config.database_path)?;
    let jwt = JwtHandler::new(config.jwt_secret.clone(), config.jwt_expiry_hours);
    let state = AppState::new(db, jwt, config.bcrypt_cost)?;

    let app = api::router(state).layer(config.cors_layer()?);

    let addr = config.bind_addr();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("🎯 API server listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

fn load_env() {
    // Standard dotenv search (cwd + parents)
    let _ = dotenv();

    // Also try the crate root when launched from elsewhere
    let manifest_env = Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
    if manifest_env.exists() {
        let _ = dotenv::from_path(&manifest_env);
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hostel_dining_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
