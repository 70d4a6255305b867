// src/utils/password.rs
//
// Stored format is "salt$digest", both hex. The digest is SHA-256 over
// salt || password, re-hashed HASH_ROUNDS times.

use rand::RngCore;
use sha2::{Digest, Sha256};

const SALT_LEN: usize = 16;
const HASH_ROUNDS: u32 = 10_000;

fn digest(password: &str, salt: &[u8]) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    let mut out = hasher.finalize().to_vec();
    for _ in 1..HASH_ROUNDS {
        out = Sha256::digest(&out).to_vec();
    }
    out
}

/// Hashes a password with a fresh random salt.
pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    format!("{}${}", hex::encode(salt), hex::encode(digest(password, &salt)))
}

/// Checks a password against a stored "salt$digest" value.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((salt_hex, digest_hex)) = stored.split_once('$') else {
        return false;
    };
    let Ok(salt) = hex::decode(salt_hex) else {
        return false;
    };
    let Ok(expected) = hex::decode(digest_hex) else {
        return false;
    };
    digest(password, &salt) == expected
}
