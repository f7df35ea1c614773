use thiserror::Error;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Algorithm, Validation};
use std::env;
use tracing::{debug, error, info};
use chrono::{Duration, Utc};
use crate::auth::Claims;

/// Default issuer expected on bearer tokens
pub const DEFAULT_ISSUER: &str = "health-pulse-idp";

/// Security errors for token operations
#[derive(Debug, Error)]
pub enum SecurityError {
    /// JWT validation error
    #[error("Token validation error: {0}")]
    TokenValidation(String),

    /// Expired token
    #[error("Token has expired")]
    TokenExpired,

    /// Invalid token structure
    #[error("Invalid token format")]
    InvalidToken,

    /// Invalid issuer
    #[error("Invalid token issuer")]
    InvalidIssuer,

    /// Configuration error
    #[error("Security configuration error: {0}")]
    ConfigError(String),
}

/// Shared secret and issuer used to verify tokens
#[derive(Clone)]
pub struct TokenConfig {
    secret: String,
    issuer: String,
}

impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .finish()
    }
}

impl TokenConfig {
    pub fn new(secret: impl Into<String>, issuer: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            issuer: issuer.into(),
        }
    }

    /// Load from `JWT_SECRET` and `JWT_ISSUER`
    pub fn from_env() -> Result<Self, SecurityError> {
        let secret = env::var("JWT_SECRET").map_err(|e| {
            error!("JWT_SECRET environment variable not found: {}", e);
            SecurityError::ConfigError("JWT_SECRET environment variable not found".to_string())
        })?;

        if secret.trim().is_empty() {
            return Err(SecurityError::ConfigError("JWT_SECRET is empty".to_string()));
        }

        let issuer = env::var("JWT_ISSUER").unwrap_or_else(|_| DEFAULT_ISSUER.to_string());
        info!("Verifying bearer tokens issued by {}", issuer);

        Ok(Self::new(secret, issuer))
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }
}

/// Sign a token for a user.
///
/// Tokens are normally minted by the identity provider; this exists for
/// local development and tests.
pub fn generate_token(
    config: &TokenConfig,
    user_id: &str,
    email: Option<&str>,
    valid_for: Duration,
) -> Result<String, SecurityError> {
    let now = Utc::now();
    let expiration = now + valid_for;

    let claims = Claims {
        sub: user_id.to_string(),
        iss: config.issuer().to_string(),
        iat: now.timestamp(),
        exp: expiration.timestamp(),
        email: email.map(str::to_string),
        name: None,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    ).map_err(|e| {
        error!("Failed to encode JWT token: {}", e);
        SecurityError::TokenValidation(e.to_string())
    })?;

    debug!("Generated token for user {} expiring {}", user_id, expiration);
    Ok(token)
}

/// Validate a JWT token and return the decoded claims
pub fn validate_token_with(config: &TokenConfig, token: &str) -> Result<Claims, SecurityError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.set_issuer(&[config.issuer()]);

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    ).map_err(|e| {
        match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => SecurityError::TokenExpired,
            jsonwebtoken::errors::ErrorKind::InvalidToken => SecurityError::InvalidToken,
            jsonwebtoken::errors::ErrorKind::InvalidIssuer => SecurityError::InvalidIssuer,
            jsonwebtoken::errors::ErrorKind::InvalidSignature => SecurityError::TokenValidation("Invalid signature".to_string()),
            _ => SecurityError::TokenValidation(e.to_string()),
        }
    })?;

    Ok(token_data.claims)
}

/// Validate a token against the configuration in the environment
pub fn validate_token(token: &str) -> Result<Claims, SecurityError> {
    validate_token_with(&TokenConfig::from_env()?, token)
}
