//! Authentication API Endpoints
//! Mission: Login, registration and session introspection

use crate::auth::models::{AuthResponse, LoginRequest, RegisterRequest, Session};
use crate::auth::service::CredentialService;
use crate::error::ApiError;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Extension, Json,
};
use tracing::{info, warn};

/// Login endpoint - POST /api/auth/login
pub async fn login(
    State(credentials): State<CredentialService>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, ApiError> {
    let Json(payload) = payload?;
    info!("🔐 Login attempt");

    match credentials.login(payload).await {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            if matches!(e, ApiError::InvalidCredentials) {
                warn!("❌ Failed login attempt");
            }
            Err(e)
        }
    }
}

/// Registration endpoint - POST /api/auth/register
pub async fn register(
    State(credentials): State<CredentialService>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let Json(payload) = payload?;

    let response = credentials.register(payload).await.map_err(|e| {
        if matches!(e, ApiError::DuplicateAccount) {
            warn!("Registration rejected: email already registered");
        }
        e
    })?;

    info!(
        "✅ Registered {} ({})",
        response.user.email,
        response.user.role.as_str()
    );
    Ok((StatusCode::CREATED, Json(response)))
}

/// Current session endpoint - GET /api/auth/me
pub async fn me(Extension(session): Extension<Session>) -> Json<Session> {
    Json(session)
}
