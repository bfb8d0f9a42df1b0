//! HTTP API
//! Mission: Wire every endpoint under `/api` behind the right guard

pub mod system;

use crate::auth::{api as auth_api, auth_middleware};
use crate::feedback::api as feedback_api;
use crate::meals::api as meals_api;
use crate::middleware::request_logging;
use crate::AppState;
use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;

/// Build the full application router
pub fn router(state: AppState) -> Router {
    // Credential endpoints (no token required)
    let auth_routes = Router::new()
        .route("/api/auth/login", post(auth_api::login))
        .route("/api/auth/register", post(auth_api::register));

    // Any valid session; admin checks happen in the handlers
    let protected_routes = Router::new()
        .route("/api/auth/me", get(auth_api::me))
        .route(
            "/api/meals",
            get(meals_api::list_meals).post(meals_api::create_meal),
        )
        .route(
            "/api/meals/:id",
            put(meals_api::update_meal).delete(meals_api::delete_meal),
        )
        .route(
            "/api/feedback",
            get(feedback_api::list_feedback).post(feedback_api::submit_feedback),
        )
        .route("/api/feedback/present", get(feedback_api::present_meals))
        .route("/api/feedback/stats", get(feedback_api::feedback_stats))
        .route_layer(middleware::from_fn_with_state(
            state.credentials.clone(),
            auth_middleware,
        ));

    let public_routes = Router::new()
        .route("/api/status", get(system::status))
        .route("/api/db-test", get(system::db_test));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(auth_routes)
        .with_state(state)
        .layer(middleware::from_fn(request_logging))
        .layer(TraceLayer::new_for_http())
}
