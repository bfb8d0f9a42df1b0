//! Meals Module
//! Mission: The dining schedule that feedback is given against

pub mod api;
pub mod models;
pub mod store;

pub use models::{Meal, MealFilter, MealType, NewMeal};
pub use store::MealStore;
