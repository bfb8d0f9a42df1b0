//! Hostel Dining Backend Library
//!
//! Accounts, meals and feedback behind a JSON API.
//! `main.rs` wires configuration into `AppState`; tests build the same
//! state over an in-memory database.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod feedback;
pub mod meals;
pub mod middleware;

use axum::extract::FromRef;

use crate::{
    auth::{CredentialService, JwtHandler},
    db::Database,
    feedback::FeedbackStore,
    meals::MealStore,
};

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub credentials: CredentialService,
    pub meals: MealStore,
    pub feedback: FeedbackStore,
}

impl AppState {
    pub fn new(db: Database, jwt: JwtHandler, bcrypt_cost: u32) -> anyhow::Result<Self> {
        Ok(Self {
            credentials: CredentialService::new(db.clone(), jwt, bcrypt_cost)?,
            meals: MealStore::new(db.clone()),
            feedback: FeedbackStore::new(db.clone()),
            db,
        })
    }
}

impl FromRef<AppState> for Database {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}

impl FromRef<AppState> for CredentialService {
    fn from_ref(state: &AppState) -> Self {
        state.credentials.clone()
    }
}

impl FromRef<AppState> for MealStore {
    fn from_ref(state: &AppState) -> Self {
        state.meals.clone()
    }
}

impl FromRef<AppState> for FeedbackStore {
    fn from_ref(state: &AppState) -> Self {
        state.feedback.clone()
    }
}
