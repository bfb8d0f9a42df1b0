//! Credential Service
//! Mission: Register accounts, check passwords, issue and verify session tokens

use crate::auth::account_store::AccountStore;
use crate::auth::jwt::JwtHandler;
use crate::auth::models::{
    Account, AccountResponse, AuthResponse, LoginRequest, Profile, RegisterRequest, Session,
};
use crate::db::Database;
use crate::error::ApiError;
use anyhow::Context;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Checked against when the email is unknown, so both login failures cost one bcrypt verify
const DUMMY_PASSWORD: &str = "hostel-dining-unknown-account";

#[derive(Clone)]
pub struct CredentialService {
    accounts: AccountStore,
    jwt: Arc<JwtHandler>,
    bcrypt_cost: u32,
    dummy_hash: Arc<str>,
}

impl CredentialService {
    pub fn new(db: Database, jwt: JwtHandler, bcrypt_cost: u32) -> anyhow::Result<Self> {
        let dummy_hash = bcrypt::hash(DUMMY_PASSWORD, bcrypt_cost)
            .with_context(|| format!("Invalid bcrypt cost {bcrypt_cost}"))?;

        Ok(Self {
            accounts: AccountStore::new(db),
            jwt: Arc::new(jwt),
            bcrypt_cost,
            dummy_hash: dummy_hash.into(),
        })
    }

    /// Create an account with its role profile and return a fresh session.
    ///
    /// Hashing and the registration transaction run on the blocking pool.
    pub async fn register(&self, req: RegisterRequest) -> Result<AuthResponse, ApiError> {
        let new_account = req.validate()?;
        let accounts = self.accounts.clone();
        let cost = self.bcrypt_cost;

        let (account, profile) = tokio::task::spawn_blocking(move || -> Result<_, ApiError> {
            let hash = bcrypt::hash(&new_account.password, cost)
                .map_err(|e| ApiError::Storage(format!("password hashing failed: {e}")))?;
            accounts
                .create_account(&new_account.email, &hash, &new_account.profile)
                .map_err(ApiError::from)
        })
        .await
        .map_err(|e| ApiError::Storage(e.to_string()))??;

        info!(account_id = account.id, role = account.role.as_str(), "Registered account");
        self.issue(&account, profile, "Registration successful")
    }

    /// Check credentials and return a fresh session.
    ///
    /// Unknown email and wrong password produce the same error.
    pub async fn login(&self, req: LoginRequest) -> Result<AuthResponse, ApiError> {
        let (email, password) = req.credentials()?;
        let accounts = self.accounts.clone();
        let dummy_hash = Arc::clone(&self.dummy_hash);

        let verified = tokio::task::spawn_blocking(move || -> Result<_, ApiError> {
            let account = accounts.find_by_email(&email)?;
            if account.is_none() {
                debug!("Login for unknown email");
            }

            let stored_hash = account
                .as_ref()
                .map_or(&*dummy_hash, |a| a.password_hash.as_str());
            let valid = verify_password(&password, stored_hash);

            let Some(account) = account.filter(|_| valid) else {
                return Ok(None);
            };

            let profile = accounts.load_profile(&account)?;
            Ok(Some((account, profile)))
        })
        .await
        .map_err(|e| ApiError::Storage(e.to_string()))??;

        let Some((account, profile)) = verified else {
            return Err(ApiError::InvalidCredentials);
        };

        info!(account_id = account.id, role = account.role.as_str(), "Login successful");
        self.issue(&account, profile, "Login successful")
    }

    /// Turn a bearer token into a verified session
    pub fn verify_session(&self, token: Option<&str>) -> Result<Session, ApiError> {
        let token = token.ok_or(ApiError::MissingToken)?;

        let claims = self.jwt.validate_token(token).map_err(|e| {
            debug!(error = %e, "Token rejected");
            ApiError::InvalidToken
        })?;

        Session::from_claims(claims).ok_or(ApiError::InvalidToken)
    }

    fn issue(
        &self,
        account: &Account,
        profile: Profile,
        message: &str,
    ) -> Result<AuthResponse, ApiError> {
        let (token, expires_in) = self
            .jwt
            .generate_token(account)
            .map_err(|e| ApiError::Storage(e.to_string()))?;

        Ok(AuthResponse {
            success: true,
            message: message.to_string(),
            token,
            expires_in,
            user: AccountResponse::new(account, &profile),
            role_data: profile,
        })
    }
}

/// Verify against a stored hash; an unreadable hash never matches
fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or_else(|e| {
        warn!(error = %e, "Stored password hash unreadable");
        false
    })
}
