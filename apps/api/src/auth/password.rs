//! Password hashing with Argon2id (PHC string format).

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use once_cell::sync::Lazy;

use crate::errors::AppError;

/// Hash compared against when the email is unknown, so a failed login costs
/// the same whether or not the account exists.
static DUMMY_HASH: Lazy<Option<String>> =
    Lazy::new(|| hash_password("dummy-password-for-timing").ok());

pub fn hash_password(plain_text: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain_text.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Password hashing failed: {e}")))
}

/// Returns false for a wrong password and for an unparseable stored hash.
pub fn verify_password(plain_text: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(plain_text.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// Burns one verification against the dummy hash.
pub fn verify_against_dummy(plain_text: &str) {
    if let Some(hash) = DUMMY_HASH.as_deref() {
        let _ = verify_password(plain_text, hash);
    }
}
