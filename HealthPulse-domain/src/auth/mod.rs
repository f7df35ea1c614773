//! Authentication module for the HealthPulse API
//!
//! Bearer tokens are issued by an external identity provider and verified
//! here with a shared secret. The subject claim identifies the user whose
//! history a request operates on.

use serde::{Deserialize, Serialize};

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

pub mod token;

pub use token::{SecurityError, TokenConfig};

/// Authentication claims for JSON Web Tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Issuer
    pub iss: String,
    /// Issued at (as timestamp)
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
    /// Account email, when the provider includes it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Display name, when the provider includes it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// User extracted from an authenticated request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub email: Option<String>,
    pub name: Option<String>,
}

impl From<Claims> for AuthenticatedUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email,
            name: claims.name,
        }
    }
}

/// Authentication middleware for protected routes
#[cfg(feature = "with-axum")]
pub async fn auth_middleware(
    axum::extract::State(config): axum::extract::State<std::sync::Arc<TokenConfig>>,
    mut req: axum::http::Request<axum::body::Body>,
    next: axum::middleware::Next,
) -> axum::response::Response {
    use axum::http::{header, StatusCode};
    use axum::response::IntoResponse;
    use tracing::{debug, warn};

    let request_path = req.uri().path().to_string();

    let bearer = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .map(str::to_string);

    let token = match bearer {
        Some(token) if !token.is_empty() => token,
        _ => {
            debug!("Missing or malformed Authorization header for {}", request_path);
            return StatusCode::UNAUTHORIZED.into_response();
        }
    };

    match token::validate_token_with(&config, &token) {
        Ok(claims) => {
            debug!("Token validated for user {} on {}", claims.sub, request_path);
            req.extensions_mut().insert(AuthenticatedUser::from(claims));
            next.run(req).await
        }
        Err(e) => {
            warn!("Rejected token on {}: {}", request_path, e);
            StatusCode::UNAUTHORIZED.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_without_profile_fields() {
        let claims: Claims = serde_json::from_str(
            r#"{"sub":"u1","iss":"health-pulse-idp","iat":1,"exp":2}"#,
        ).unwrap();

        let user = AuthenticatedUser::from(claims);
        assert_eq!(user.user_id, "u1");
        assert!(user.email.is_none());
    }
}
