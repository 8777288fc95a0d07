//! Credential hashing for stored passwords.
//!
//! Passwords are stored as `base64(salt)$base64(sha256(salt || password))`
//! with a random 16-byte salt per credential. Verification recomputes the
//! digest and compares in constant time.

use base64::{engine::general_purpose::STANDARD as B64, Engine as _};
use constant_time_eq::constant_time_eq;
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Separator between the salt and digest segments of a stored hash.
const SEPARATOR: char = '$';

/// Hash a plaintext password with a fresh random salt.
#[must_use]
pub fn hash(password: &str) -> String {
    let mut salt = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut salt);
    let digest = digest_with_salt(&salt, password);
    format!("{}{SEPARATOR}{}", B64.encode(salt), B64.encode(digest))
}

/// Verify a plaintext password against a stored hash.
///
/// Malformed stored hashes verify as `false` rather than erroring; a
/// corrupted credential row must never authenticate.
#[must_use]
pub fn verify(password: &str, stored: &str) -> bool {
    let Some((salt_b64, digest_b64)) = stored.split_once(SEPARATOR) else {
        return false;
    };
    let (Ok(salt), Ok(expected)) = (B64.decode(salt_b64), B64.decode(digest_b64)) else {
        return false;
    };
    let actual = digest_with_salt(&salt, password);
    constant_time_eq(&actual, &expected)
}

fn digest_with_salt(salt: &[u8], password: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hasher.finalize().into()
}
