// src/utils/jwt.rs

use crate::utils::error::{StorefrontError, StorefrontResult};
use crate::utils::time::get_current_timestamp;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Bearer tokens are valid for seven days from issue.
pub const TOKEN_TTL_SECS: u64 = 7 * 24 * 60 * 60;

/// Claims carried by a storefront bearer token
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthClaims {
    pub user_id: i64,
    pub email: String,
    pub exp: u64,
}

impl AuthClaims {
    pub fn new(user_id: i64, email: impl Into<String>) -> Self {
        Self {
            user_id,
            email: email.into(),
            exp: get_current_timestamp() + TOKEN_TTL_SECS,
        }
    }
}

fn signature(signing_input: &str, secret: &str) -> StorefrontResult<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| StorefrontError::config_error(format!("Invalid JWT secret: {}", e)))?;
    mac.update(signing_input.as_bytes());
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Signs claims into a compact HS256 JWT.
pub fn sign(claims: &AuthClaims, secret: &str) -> StorefrontResult<String> {
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(serde_json::to_string(claims)?);
    let signing_input = format!("{}.{}", header, payload);
    let sig = URL_SAFE_NO_PAD.encode(signature(&signing_input, secret)?);
    Ok(format!("{}.{}", signing_input, sig))
}

/// Verifies signature and expiry, returning the embedded claims.
pub fn verify(token: &str, secret: &str) -> StorefrontResult<AuthClaims> {
    let mut parts = token.split('.');
    let (header, payload, sig) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(h), Some(p), Some(s), None) => (h, p, s),
        _ => {
            return Err(StorefrontError::authentication_error(
                "Invalid or expired token",
            ))
        }
    };

    let signing_input = format!("{}.{}", header, payload);
    let provided = URL_SAFE_NO_PAD
        .decode(sig)
        .map_err(|_| StorefrontError::authentication_error("Invalid or expired token"))?;

    // Constant-time comparison through the Mac verifier
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| StorefrontError::config_error(format!("Invalid JWT secret: {}", e)))?;
    mac.update(signing_input.as_bytes());
    if mac.verify_slice(&provided).is_err() {
        return Err(StorefrontError::authentication_error(
            "Invalid or expired token",
        ));
    }

    let payload_bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|_| StorefrontError::authentication_error("Invalid or expired token"))?;
    let claims: AuthClaims = serde_json::from_slice(&payload_bytes)
        .map_err(|_| StorefrontError::authentication_error("Invalid or expired token"))?;

    if claims.exp <= get_current_timestamp() {
        return Err(StorefrontError::authentication_error(
            "Invalid or expired token",
        ));
    }

    Ok(claims)
}
