//! Feedback Models
//! Mission: Ratings, joined views and per-meal aggregates

use crate::error::ApiError;
use crate::meals::models::{parse_date, parse_meal_type, present, MealType};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const MIN_RATING: i64 = 1;
pub const MAX_RATING: i64 = 5;

/// A stored feedback row
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FeedbackEntry {
    pub feedback_id: i64,
    pub meal_id: i64,
    pub student_id: i64,
    pub rating: i64,
    pub comments: String,
    pub created_at: String,
}

/// Feedback joined with the meal it rates
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FeedbackWithMeal {
    pub feedback_id: i64,
    pub student_id: i64,
    pub rating: i64,
    pub comments: String,
    pub meal_id: i64,
    pub meal_name: String,
    pub meal_type: MealType,
    pub meal_date: NaiveDate,
}

/// Per-meal aggregate; `average_rating` is null for unrated meals
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MealStats {
    pub meal_id: i64,
    pub meal_name: String,
    pub meal_type: MealType,
    pub meal_date: NaiveDate,
    pub feedback_count: i64,
    pub average_rating: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SubmitFeedbackRequest {
    pub meal_id: Option<i64>,
    pub rating: Option<i64>,
    pub comments: Option<String>,
}

impl SubmitFeedbackRequest {
    pub fn validate(self) -> Result<NewFeedback, ApiError> {
        let (Some(meal_id), Some(rating)) = (self.meal_id, self.rating) else {
            return Err(ApiError::validation("Meal ID and rating are required"));
        };

        if !(MIN_RATING..=MAX_RATING).contains(&rating) {
            return Err(ApiError::validation(format!(
                "Rating must be between {MIN_RATING} and {MAX_RATING}"
            )));
        }

        Ok(NewFeedback {
            meal_id,
            rating,
            comments: self.comments.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewFeedback {
    pub meal_id: i64,
    pub rating: i64,
    pub comments: String,
}

/// `GET /api/feedback` query string
#[derive(Debug, Default, Deserialize)]
pub struct FeedbackQuery {
    #[serde(rename = "type")]
    pub meal_type: Option<String>,
    pub date: Option<String>,
    pub rating: Option<String>,
    pub student_id: Option<String>,
}

impl FeedbackQuery {
    pub fn filter(self) -> Result<FeedbackFilter, ApiError> {
        Ok(FeedbackFilter {
            meal_type: present(self.meal_type)
                .map(|t| parse_meal_type(&t))
                .transpose()?,
            date: present(self.date).map(|d| parse_date(&d)).transpose()?,
            rating: parse_int(self.rating, "rating")?,
            student_id: parse_int(self.student_id, "student_id")?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedbackFilter {
    pub meal_type: Option<MealType>,
    pub date: Option<NaiveDate>,
    pub rating: Option<i64>,
    pub student_id: Option<i64>,
}

fn parse_int(value: Option<String>, field: &str) -> Result<Option<i64>, ApiError> {
    present(value)
        .map(|v| {
            v.parse::<i64>()
                .map_err(|_| ApiError::validation(format!("{field} must be an integer")))
        })
        .transpose()
}
