// src/middleware/auth.rs

use crate::utils::jwt::{self, AuthClaims};
use crate::utils::{StorefrontError, StorefrontResult};
use worker::{Env, Request};

/// Pulls the bearer token out of the Authorization header.
pub fn extract_bearer_token(req: &Request) -> StorefrontResult<String> {
    let header = req
        .headers()
        .get("Authorization")
        .map_err(|e| StorefrontError::internal_error(format!("Failed to read headers: {}", e)))?
        .ok_or_else(|| StorefrontError::authentication_error("Access token required"))?;

    match header.split_once(' ') {
        Some(("Bearer", token)) if !token.is_empty() => Ok(token.to_string()),
        _ => Err(StorefrontError::authentication_error(
            "Access token required",
        )),
    }
}

/// Verifies the request's bearer token and returns its claims.
/// Missing or invalid tokens are rejected; there is no fallback identity.
pub fn authenticate(req: &Request, env: &Env) -> StorefrontResult<AuthClaims> {
    let token = extract_bearer_token(req)?;
    let secret = env
        .var("JWT_SECRET")
        .map_err(|_| StorefrontError::config_error("Missing JWT_SECRET"))?
        .to_string();
    jwt::verify(&token, &secret)
}

/// Authenticates and additionally requires the token to belong to
/// `user_id`. User-scoped favorites operations go through this so one
/// account can never mutate another account's memberships.
pub fn require_user(req: &Request, env: &Env, user_id: i64) -> StorefrontResult<AuthClaims> {
    let claims = authenticate(req, env)?;
    if claims.user_id != user_id {
        return Err(StorefrontError::authorization_error(
            "Token does not match the requested user",
        ));
    }
    Ok(claims)
}
