//! Feedback Module
//! Mission: Student ratings of meals and the aggregates built from them

pub mod api;
pub mod models;
pub mod store;

pub use models::{FeedbackEntry, FeedbackFilter, FeedbackWithMeal, MealStats, NewFeedback};
pub use store::FeedbackStore;
