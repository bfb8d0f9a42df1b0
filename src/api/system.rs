//! System Endpoints
//! Mission: Liveness and storage checks for operators

use crate::db::Database;
use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use tracing::error;

/// GET /api/status
pub async fn status() -> Json<Value> {
    Json(json!({ "status": "success", "message": "API is running" }))
}

/// GET /api/db-test - round-trips a query through the shared connection
pub async fn db_test(State(db): State<Database>) -> (StatusCode, Json<Value>) {
    match db.ping() {
        Ok(timestamp) => (
            StatusCode::OK,
            Json(json!({
                "status": "success",
                "message": "Database connection successful",
                "timestamp": timestamp,
            })),
        ),
        Err(e) => {
            error!(error = %e, "Database test failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "status": "error",
                    "message": "Database connection failed",
                    "error": e.to_string(),
                })),
            )
        }
    }
}
