use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: Uuid,
    pub name: String,
    pub role: String,
    pub exp: usize,
}

impl Claims {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

/// Mint a bearer token for local development and tests. Deployments sit
/// behind an identity provider that issues compatible tokens.
pub fn issue_token(
    user_id: Uuid,
    name: &str,
    role: &str,
    secret: &str,
    expiration_seconds: u64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = Claims {
        sub: user_id,
        name: name.to_string(),
        role: role.to_string(),
        exp: (Utc::now().timestamp() as u64 + expiration_seconds) as usize,
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))
}

pub fn decode_claims(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}

/// Validates the bearer token and injects the caller's claims into request
/// extensions. Role enforcement happens per handler: ownership checks for
/// customers, `require_admin` for admin operations.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    // 1. Extract token from Authorization header
    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token = auth_header.strip_prefix("Bearer ").ok_or(StatusCode::UNAUTHORIZED)?;

    // 2. Decode and validate JWT
    let claims = decode_claims(token, &state.auth.secret).map_err(|_| StatusCode::UNAUTHORIZED)?;

    // 3. Inject claims into request extensions
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

pub fn require_admin(claims: &Claims) -> Result<(), AppError> {
    if claims.is_admin() {
        Ok(())
    } else {
        Err(AppError::AuthorizationError("Admin access required".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_for(role: &str, secret: &str) -> String {
        issue_token(Uuid::new_v4(), "Test User", role, secret, 3600).unwrap()
    }

    #[test]
    fn test_decode_round_trip() {
        let token = token_for("user", "secret");
        let claims = decode_claims(&token, "secret").unwrap();
        assert_eq!(claims.role, "user");
        assert!(!claims.is_admin());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = token_for("user", "secret");
        assert!(decode_claims(&token, "other-secret").is_err());
    }

    #[test]
    fn test_require_admin() {
        let token = token_for("admin", "secret");
        let claims = decode_claims(&token, "secret").unwrap();
        assert!(require_admin(&claims).is_ok());

        let token = token_for("user", "secret");
        let claims = decode_claims(&token, "secret").unwrap();
        assert!(require_admin(&claims).is_err());
    }
}
