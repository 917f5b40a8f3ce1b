//! Password hashing for the credential store
//!
//! New records use Argon2id in PHC string format, which embeds the random
//! salt and the cost parameters next to the hash. Records written by older
//! deployments hold a bare SHA-256 hex digest; those can still be verified
//! but are never produced.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core},
};
use sha2::{Digest, Sha256};

use super::errors::CredentialError;
use crate::Result;

/// Length of a legacy SHA-256 hex digest
const LEGACY_HASH_LENGTH: usize = 64;

/// Hash a password using Argon2id with a fresh random salt
///
/// # Returns
/// The PHC string (`$argon2id$v=19$...$salt$hash`). It never contains the
/// record delimiter `:`.
pub fn hash_password(password: impl AsRef<str>) -> Result<String> {
    let salt = SaltString::generate(&mut rand_core::OsRng);

    let password_hash = Argon2::default()
        .hash_password(password.as_ref().as_bytes(), &salt)
        .map_err(|e| CredentialError::HashingFailed {
            reason: e.to_string(),
        })?
        .to_string();

    Ok(password_hash)
}

/// Verify a password against a stored hash
///
/// Accepts Argon2 PHC strings and legacy unsalted SHA-256 hex digests.
///
/// # Returns
/// Ok(()) if password is correct, Err otherwise
pub fn verify_password(password: impl AsRef<str>, stored: impl AsRef<str>) -> Result<()> {
    let password = password.as_ref();
    let stored = stored.as_ref();

    if is_legacy_hash(stored) {
        let digest = hex::encode(Sha256::digest(password.as_bytes()));
        return if digest == stored.to_ascii_lowercase() {
            Ok(())
        } else {
            Err(CredentialError::InvalidCredentials.into())
        };
    }

    let parsed_hash = PasswordHash::new(stored).map_err(|_| CredentialError::MalformedHash)?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| CredentialError::InvalidCredentials.into())
}

/// Whether a stored hash predates salted hashing
pub fn is_legacy_hash(stored: &str) -> bool {
    stored.len() == LEGACY_HASH_LENGTH && stored.bytes().all(|b| b.is_ascii_hexdigit())
}
