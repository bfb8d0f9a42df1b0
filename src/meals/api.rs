//! Meal API Endpoints
//! Mission: Meal listing for everyone, mutation for admins

use crate::auth::Session;
use crate::error::ApiError;
use crate::meals::models::{Meal, MealQuery, MealRequest};
use crate::meals::store::MealStore;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Extension, Json,
};
use serde_json::{json, Value};
use tracing::warn;

/// GET /api/meals
pub async fn list_meals(
    State(meals): State<MealStore>,
    query: Result<Query<MealQuery>, QueryRejection>,
) -> Result<Json<Vec<Meal>>, ApiError> {
    let Query(query) = query?;
    let filter = query.filter()?;

    Ok(Json(meals.list(&filter)?))
}

/// POST /api/meals (admin)
pub async fn create_meal(
    State(meals): State<MealStore>,
    Extension(session): Extension<Session>,
    payload: Result<Json<MealRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Meal>), ApiError> {
    admin_only(&session, "create meal")?;
    let Json(payload) = payload?;
    let new_meal = payload.validate()?;

    let meal = meals.create(&new_meal)?;
    Ok((StatusCode::CREATED, Json(meal)))
}

/// PUT /api/meals/:id (admin)
pub async fn update_meal(
    State(meals): State<MealStore>,
    Extension(session): Extension<Session>,
    meal_id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<MealRequest>, JsonRejection>,
) -> Result<Json<Meal>, ApiError> {
    admin_only(&session, "update meal")?;
    let Path(meal_id) = meal_id?;
    let Json(payload) = payload?;
    let new_meal = payload.validate()?;

    Ok(Json(meals.update(meal_id, &new_meal)?))
}

/// DELETE /api/meals/:id (admin)
pub async fn delete_meal(
    State(meals): State<MealStore>,
    Extension(session): Extension<Session>,
    meal_id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Value>, ApiError> {
    admin_only(&session, "delete meal")?;
    let Path(meal_id) = meal_id?;

    meals.delete(meal_id)?;
    Ok(Json(json!({ "message": "Meal deleted successfully" })))
}

fn admin_only(session: &Session, action: &str) -> Result<(), ApiError> {
    session.require_admin().inspect_err(|_| {
        warn!(
            account_id = session.account_id,
            action, "Access denied: not admin"
        );
    })
}
