//! Server Configuration
//! Mission: Command line flags with environment fallbacks

use anyhow::{Context, Result};
use axum::http::{header, HeaderValue, Method};
use clap::Parser;
use std::net::{IpAddr, SocketAddr};
use tower_http::cors::CorsLayer;

/// Signing key used when `JWT_SECRET` is unset; development only
pub const DEV_JWT_SECRET: &str = "hostel-dining-dev-secret-change-me";

#[derive(Parser, Debug, Clone)]
#[command(name = "hostel-dining")]
#[command(about = "Hostel dining feedback API server")]
pub struct Config {
    /// Interface to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    #[arg(long, env = "PORT", default_value = "3001")]
    pub port: u16,

    /// Path to the SQLite database file (created if missing)
    #[arg(long, env = "DATABASE_PATH", default_value = "hostel_dining.db")]
    pub database_path: String,

    /// HMAC secret for session tokens
    #[arg(long, env = "JWT_SECRET", default_value = DEV_JWT_SECRET, hide_env_values = true)]
    pub jwt_secret: String,

    /// Session token lifetime, at most one year
    #[arg(
        long,
        env = "JWT_EXPIRY_HOURS",
        default_value = "24",
        value_parser = clap::value_parser!(i64).range(1..=8760)
    )]
    pub jwt_expiry_hours: i64,

    #[arg(
        long,
        env = "BCRYPT_COST",
        default_value_t = bcrypt::DEFAULT_COST,
        value_parser = clap::value_parser!(u32).range(4..=31)
    )]
    pub bcrypt_cost: u32,

    /// Browser origin allowed by CORS; any origin when unset
    #[arg(long, env = "CLIENT_ORIGIN")]
    pub client_origin: Option<String>,
}

impl Config {
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }

    pub fn cors_layer(&self) -> Result<CorsLayer> {
        let Some(origin) = &self.client_origin else {
            return Ok(CorsLayer::permissive());
        };

        let origin = HeaderValue::from_str(origin)
            .with_context(|| format!("Invalid CLIENT_ORIGIN: {origin}"))?;

        Ok(CorsLayer::new()
            .allow_origin(origin)
            .allow_credentials(true)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
            .expose_headers([header::CONTENT_TYPE]))
    }
}
