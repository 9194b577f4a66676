//! API token generation and verification
//!
//! Bearer tokens the bot process uses against this API. The full token is
//! shown once at creation; only a SHA-256 hash is stored.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Token prefix for identification
const API_TOKEN_PREFIX: &str = "ssa_";

/// Result of token generation
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedApiToken {
    /// The full token (only shown once!)
    pub token: String,
    /// Display prefix, e.g. "ssa_1a2b3c4d..."
    pub prefix: String,
    /// Hex-encoded SHA-256 of the full token
    pub token_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Generate a new API token
pub fn generate_api_token() -> GeneratedApiToken {
    let mut rng = rand::thread_rng();

    let random_bytes: [u8; 32] = rng.gen();
    let suffix = base64::Engine::encode(
        &base64::engine::general_purpose::URL_SAFE_NO_PAD,
        random_bytes,
    );

    let token = format!("{}{}", API_TOKEN_PREFIX, suffix);

    GeneratedApiToken {
        prefix: format!("{}{}...", API_TOKEN_PREFIX, &suffix[..8]),
        token_hash: hash_api_token(&token),
        token,
        created_at: Utc::now(),
    }
}

/// Hash a token for storage/lookup
pub fn hash_api_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Verify a token against a stored hash
pub fn verify_api_token(token: &str, stored_hash: &str) -> bool {
    hash_api_token(token) == stored_hash
}

/// Check if a string looks like one of our API tokens
pub fn is_api_token_format(s: &str) -> bool {
    s.starts_with(API_TOKEN_PREFIX) && s.len() > API_TOKEN_PREFIX.len() + 32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_api_token() {
        let generated = generate_api_token();

        assert!(generated.token.starts_with(API_TOKEN_PREFIX));
        assert!(is_api_token_format(&generated.token));
        assert!(verify_api_token(&generated.token, &generated.token_hash));
        assert!(!verify_api_token("wrong-token", &generated.token_hash));
    }

    #[test]
    fn test_format_check_rejects_jwt() {
        assert!(!is_api_token_format("eyJhbGciOiJIUzI1NiJ9.payload.sig"));
        assert!(!is_api_token_format("ssa_short"));
    }

    #[test]
    fn test_hash_is_stable() {
        assert_eq!(hash_api_token("ssa_abc"), hash_api_token("ssa_abc"));
        assert_ne!(hash_api_token("ssa_abc"), hash_api_token("ssa_abd"));
    }
}
