//! JWT Token Handler
//! Mission: Generate and validate session tokens

use crate::auth::models::{Account, Claims};
use anyhow::{bail, Context, Result};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use tracing::debug;

/// JWT Handler for token operations
pub struct JwtHandler {
    secret: String,
    expiration_hours: i64,
}

impl JwtHandler {
    /// Create a new JWT handler with secret key and token lifetime
    pub fn new(secret: String, expiration_hours: i64) -> Self {
        Self {
            secret,
            expiration_hours,
        }
    }

    /// Seconds a freshly issued token stays valid
    pub fn expires_in(&self) -> Result<usize> {
        if self.expiration_hours <= 0 {
            bail!("Token lifetime must be positive, got {}h", self.expiration_hours);
        }
        self.expiration_hours
            .checked_mul(3600)
            .and_then(|secs| usize::try_from(secs).ok())
            .context("Token lifetime out of range")
    }

    /// Generate a JWT token for an account
    pub fn generate_token(&self, account: &Account) -> Result<(String, usize)> {
        let expires_in = self.expires_in()?;
        let lifetime = chrono::Duration::try_hours(self.expiration_hours)
            .context("Token lifetime out of range")?;

        let now = Utc::now();
        let expiration = now
            .checked_add_signed(lifetime)
            .context("Invalid timestamp")?
            .timestamp() as usize;

        let claims = Claims {
            sub: account.id.to_string(),
            email: account.email.clone(),
            role: account.role,
            iat: now.timestamp() as usize,
            exp: expiration,
        };

        debug!(
            "Generating JWT for {} ({}), expires in {}h",
            account.email, account.id, self.expiration_hours
        );

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .context("Failed to generate JWT")?;

        Ok((token, expires_in))
    }

    /// Validate a JWT token (signature and expiry) and extract claims
    pub fn validate_token(&self, token: &str) -> Result<Claims> {
        let decoded = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .context("Invalid or expired token")?;

        debug!("Validated JWT for {}", decoded.claims.email);

        Ok(decoded.claims)
    }
}
