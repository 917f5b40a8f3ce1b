//! Error types for the credential store
use thiserror::Error;

#[non_exhaustive]
#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("Username already exists: {username}")]
    UsernameAlreadyExists { username: String },

    #[error("Invalid username '{username}': {reason}")]
    InvalidUsername { username: String, reason: String },

    #[error("Password cannot be empty")]
    EmptyPassword,

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Password hashing failed: {reason}")]
    HashingFailed { reason: String },

    #[error("Stored password hash is malformed")]
    MalformedHash,
}

impl CredentialError {
    /// Check if this error indicates the user already exists.
    pub fn is_conflict(&self) -> bool {
        matches!(self, CredentialError::UsernameAlreadyExists { .. })
    }

    /// Check if this error was caused by the submitted form values.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            CredentialError::InvalidUsername { .. } | CredentialError::EmptyPassword
        )
    }

    /// Check if this error is an authentication failure.
    pub fn is_authentication_error(&self) -> bool {
        matches!(
            self,
            CredentialError::InvalidCredentials | CredentialError::MalformedHash
        )
    }
}

impl From<CredentialError> for crate::Error {
    fn from(err: CredentialError) -> Self {
        crate::Error::Credentials(err)
    }
}
