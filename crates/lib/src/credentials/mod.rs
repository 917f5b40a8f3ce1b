//! Append-only credential store.
//!
//! Credentials live in a line-delimited file, one `username:hash` record per
//! line. Records are only ever appended; nothing is rewritten or deleted. When
//! a username appears more than once the last record wins.
//!
//! The whole load/check/append sequence of a registration runs under one
//! mutex, so two concurrent registrations of the same name within a process
//! cannot both succeed.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use tokio::{io::AsyncWriteExt, sync::Mutex};
use tracing::{debug, info};

use crate::{
    Result,
    constants::{FIELD_DELIMITER, MAX_USERNAME_BYTES},
};

pub mod crypto;
pub mod errors;

pub use errors::CredentialError;

/// Credential store backed by a single append-only file
#[derive(Debug)]
pub struct CredentialStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl CredentialStore {
    /// Open the store at `path`. The file is created on the first registration.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Location of the credential file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Register a new user
    ///
    /// The username is trimmed and validated with [`validate_username`].
    ///
    /// # Returns
    /// The stored (trimmed) username
    ///
    /// # Errors
    /// * `InvalidUsername` / `EmptyPassword` for bad input
    /// * `UsernameAlreadyExists` if any record already names this user
    pub async fn register(&self, username: &str, password: &str) -> Result<String> {
        let username = validate_username(username)?;
        if password.is_empty() {
            return Err(CredentialError::EmptyPassword.into());
        }

        // Hashing is slow; keep it out of the critical section
        let password_hash = crypto::hash_password(password)?;

        let _guard = self.lock.lock().await;
        let records = self.load().await?;
        if records.contains_key(username) {
            return Err(CredentialError::UsernameAlreadyExists {
                username: username.to_string(),
            }
            .into());
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        let record = format!("{username}{FIELD_DELIMITER}{password_hash}\n");
        file.write_all(record.as_bytes()).await?;
        file.flush().await?;

        info!(username, "Registered user");
        Ok(username.to_string())
    }

    /// Check a password against the last stored hash for `username`
    ///
    /// # Returns
    /// `Ok(false)` for an unknown user or a wrong password. Errors only when
    /// the credential file cannot be read.
    pub async fn verify(&self, username: &str, password: &str) -> Result<bool> {
        let records = {
            let _guard = self.lock.lock().await;
            self.load().await?
        };

        let Some(stored) = records.get(username.trim()) else {
            debug!(username, "Verification for unknown user");
            return Ok(false);
        };

        Ok(crypto::verify_password(password, stored).is_ok())
    }

    /// Check whether a user is registered
    pub async fn contains(&self, username: &str) -> Result<bool> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.contains_key(username.trim()))
    }

    /// All registered usernames, sorted
    pub async fn list_usernames(&self) -> Result<Vec<String>> {
        let records = {
            let _guard = self.lock.lock().await;
            self.load().await?
        };
        let mut usernames: Vec<String> = records.into_keys().collect();
        usernames.sort();
        Ok(usernames)
    }

    /// Read every record. Caller holds the lock.
    async fn load(&self) -> Result<HashMap<String, String>> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(e) => return Err(e.into()),
        };

        let mut records = HashMap::new();
        for line in contents.lines() {
            let line = line.trim();
            // Malformed lines are skipped
            let Some((username, hash)) = line.split_once(FIELD_DELIMITER) else {
                continue;
            };
            records.insert(username.to_string(), hash.to_string());
        }
        Ok(records)
    }
}

/// Validate a username for registration and workspace lookup
///
/// A username must, after trimming surrounding whitespace, be non-empty,
/// at most `MAX_USERNAME_BYTES` long, free of the record delimiter, and usable
/// as a single directory name.
///
/// # Returns
/// The trimmed username
pub fn validate_username(username: &str) -> Result<&str> {
    let trimmed = username.trim();
    let invalid = |reason: &str| CredentialError::InvalidUsername {
        username: username.to_string(),
        reason: reason.to_string(),
    };

    if trimmed.is_empty() {
        return Err(invalid("username cannot be empty").into());
    }
    if trimmed.len() > MAX_USERNAME_BYTES {
        return Err(invalid("username is too long").into());
    }
    if trimmed.contains(FIELD_DELIMITER) {
        return Err(invalid("username cannot contain ':'").into());
    }
    if trimmed == "." || trimmed == ".." {
        return Err(invalid("username cannot be '.' or '..'").into());
    }
    if trimmed
        .chars()
        .any(|c| c == '/' || c == '\\' || c.is_control())
    {
        return Err(invalid("username cannot contain path separators or control characters").into());
    }
    Ok(trimmed)
}
