//! Password hashing and verification (bcrypt)
//!
//! The work factor is embedded in the hash output along with the salt, so
//! verification always recomputes with the parameters the hash was created
//! with. There is no password-strength policy here; that belongs to callers.

/// Hash a plaintext password with a fresh random salt.
///
/// Fails only on internal error, never on password content. bcrypt is
/// CPU-bound; callers on the async runtime should run this via
/// `tokio::task::spawn_blocking`.
pub fn hash_password(plaintext: &str, cost: u32) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(plaintext, cost)
}

/// Verify a plaintext password against a stored hash.
///
/// Constant-time comparison inside bcrypt. A malformed hash verifies as
/// false rather than erroring, so storage corruption cannot turn into a
/// panic path on login.
pub fn verify_password(plaintext: &str, hash: &str) -> bool {
    bcrypt::verify(plaintext, hash).unwrap_or(false)
}
