/// Opaque session token utilities
///
/// These work in conjunction with the `models::session` module: a token is
/// issued at registration/login, handed to the client once, and only its
/// SHA-256 digest is stored. Logout deletes the stored row, revoking the
/// token immediately.
///
/// # Security
///
/// - **Format**: `deck_{32_chars}` (prefix + 32 random alphanumeric chars)
/// - **Storage**: tokens are hashed with SHA-256 before storage
/// - **Validation**: constant-time comparison to prevent timing attacks
///
/// # Example
///
/// ```
/// use taskdeck_shared::auth::token::{generate_token, hash_token, validate_token_format};
///
/// let (token, hash) = generate_token();
/// assert!(token.starts_with("deck_"));
/// assert_eq!(token.len(), 37);
///
/// assert!(validate_token_format(&token));
/// assert_eq!(hash, hash_token(&token));
/// ```

use rand::Rng;
use sha2::{Digest, Sha256};

/// Length of the random part of a token (characters)
const TOKEN_RANDOM_LENGTH: usize = 32;

/// Session token prefix
const TOKEN_PREFIX: &str = "deck_";

/// Total length of a session token (prefix + random)
pub const TOKEN_LENGTH: usize = TOKEN_PREFIX.len() + TOKEN_RANDOM_LENGTH;

/// Generates a new session token
///
/// # Returns
///
/// Tuple of (plaintext_token, sha256_hash). The plaintext is returned to the
/// client exactly once; only the hash is stored.
///
/// # Security
///
/// - Uses `rand::thread_rng()` for cryptographic randomness
/// - Key space: 62^32 combinations
pub fn generate_token() -> (String, String) {
    let random_part = generate_random_string(TOKEN_RANDOM_LENGTH);
    let token = format!("{}{}", TOKEN_PREFIX, random_part);
    let hash = hash_token(&token);

    (token, hash)
}

/// Generates a random alphanumeric string (base62: A-Z, a-z, 0-9)
fn generate_random_string(length: usize) -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();

    (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

/// Hashes a token using SHA-256
///
/// # Returns
///
/// Hex-encoded SHA-256 hash (64 characters)
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Validates session token format
///
/// Checks that the token starts with `deck_`, has the exact expected length,
/// and only contains alphanumeric characters after the prefix. This runs
/// before any database lookup so malformed credentials are rejected cheaply.
pub fn validate_token_format(token: &str) -> bool {
    if token.len() != TOKEN_LENGTH {
        return false;
    }

    if !token.starts_with(TOKEN_PREFIX) {
        return false;
    }

    let random_part = &token[TOKEN_PREFIX.len()..];
    random_part.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Validates a token against a stored hash
///
/// Uses constant-time comparison to prevent timing side channels.
pub fn verify_token(token: &str, stored_hash: &str) -> bool {
    let computed_hash = hash_token(token);
    constant_time_compare(&computed_hash, stored_hash)
}

/// Constant-time string comparison
///
/// Always compares the full length; accumulates differences with bitwise OR
/// instead of short-circuiting.
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    let mut result = 0u8;
    for i in 0..a_bytes.len() {
        result |= a_bytes[i] ^ b_bytes[i];
    }

    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_token() {
        let (token1, hash1) = generate_token();
        let (token2, hash2) = generate_token();

        assert!(token1.starts_with("deck_"));
        assert_eq!(token1.len(), 37);

        assert_ne!(token1, token2);
        assert_ne!(hash1, hash2);

        // SHA-256 hex is 64 chars
        assert_eq!(hash1.len(), 64);
        assert_eq!(hash2.len(), 64);
    }

    #[test]
    fn test_hash_token_deterministic() {
        let token = "deck_test123";
        let hash = hash_token(token);

        assert_eq!(hash.len(), 64);
        assert_eq!(hash, hash_token(token));
        assert_ne!(hash, hash_token("deck_different"));
    }

    #[test]
    fn test_validate_token_format() {
        assert!(validate_token_format("deck_abcdefghijklmnopqrstuvwxyz123456"));
        assert!(validate_token_format("deck_ABCDEFGHIJKLMNOPQRSTUVWXYZ123456"));

        // Wrong prefix
        assert!(!validate_token_format("card_abcdefghijklmnopqrstuvwxyz123456"));

        // Too short / too long
        assert!(!validate_token_format("deck_short"));
        assert!(!validate_token_format("deck_abcdefghijklmnopqrstuvwxyz1234567890"));

        // Special characters
        assert!(!validate_token_format("deck_abc!@#$%^&*()_+={}[]|\\:;\"'<>?/"));

        // No prefix
        assert!(!validate_token_format("abcdefghijklmnopqrstuvwxyz1234567890a"));
    }

    #[test]
    fn test_verify_token() {
        let (token, hash) = generate_token();

        assert!(verify_token(&token, &hash));
        assert!(!verify_token("deck_wrongtoken123456789012345678", &hash));
        assert!(!verify_token("", &hash));
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("hello", "hello"));
        assert!(constant_time_compare("", ""));

        assert!(!constant_time_compare("hello", "world"));
        assert!(!constant_time_compare("hello", "hello2"));
        assert!(!constant_time_compare("short", "longer string"));
    }

    #[test]
    fn test_full_token_workflow() {
        let (plaintext, hash) = generate_token();

        assert!(validate_token_format(&plaintext));
        assert!(verify_token(&plaintext, &hash));

        let (other, _) = generate_token();
        assert!(!verify_token(&other, &hash));
    }
}
