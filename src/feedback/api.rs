//! Feedback API Endpoints
//! Mission: Submit ratings and read them back

use crate::auth::Session;
use crate::error::ApiError;
use crate::feedback::models::{
    FeedbackEntry, FeedbackQuery, FeedbackWithMeal, MealStats, SubmitFeedbackRequest,
};
use crate::feedback::store::FeedbackStore;
use crate::meals::models::{Meal, MealQuery};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use tracing::debug;

/// GET /api/feedback
pub async fn list_feedback(
    State(feedback): State<FeedbackStore>,
    query: Result<Query<FeedbackQuery>, QueryRejection>,
) -> Result<Json<Vec<FeedbackWithMeal>>, ApiError> {
    let Query(query) = query?;
    let filter = query.filter()?;

    Ok(Json(feedback.list(&filter)?))
}

/// POST /api/feedback; the caller owns the new entry
pub async fn submit_feedback(
    State(feedback): State<FeedbackStore>,
    Extension(session): Extension<Session>,
    payload: Result<Json<SubmitFeedbackRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<FeedbackEntry>), ApiError> {
    let Json(payload) = payload?;
    let new_feedback = payload.validate()?;

    let entry = feedback.submit(session.account_id, &new_feedback)?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// GET /api/feedback/present
pub async fn present_meals(
    State(feedback): State<FeedbackStore>,
) -> Result<Json<Vec<Meal>>, ApiError> {
    let today = Utc::now().date_naive();
    debug!(%today, "Fetching present meals");

    Ok(Json(feedback.present_meals(today)?))
}

/// GET /api/feedback/stats
pub async fn feedback_stats(
    State(feedback): State<FeedbackStore>,
    query: Result<Query<MealQuery>, QueryRejection>,
) -> Result<Json<Vec<MealStats>>, ApiError> {
    let Query(query) = query?;
    let filter = query.filter()?;

    Ok(Json(feedback.stats(&filter)?))
}
