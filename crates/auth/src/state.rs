//! CSRF `state` parameter for the authorization-code flow

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::Rng;

/// Generate a random state token for CSRF protection
///
/// Returns a URL-safe base64-encoded random string of 32 bytes (43
/// characters).
#[must_use]
pub fn generate_state() -> String {
    let mut rng = rand::thread_rng();
    let random_bytes: Vec<u8> = (0..32).map(|_| rng.gen()).collect();
    URL_SAFE_NO_PAD.encode(random_bytes)
}

/// Validate that the callback state matches the one that was issued
///
/// Compares in constant time with respect to the content of equal-length
/// inputs.
#[must_use]
pub fn validate_state(expected: &str, actual: &str) -> bool {
    let (expected, actual) = (expected.as_bytes(), actual.as_bytes());
    if expected.len() != actual.len() {
        return false;
    }
    expected.iter().zip(actual).fold(0u8, |acc, (a, b)| acc | (a ^ b)) == 0
}
