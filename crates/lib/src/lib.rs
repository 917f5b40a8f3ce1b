//!
//! Folio: a self-hosted, multi-tenant file publishing server.
//! This library provides the components every request handler calls into.
//!
//! ## Core Concepts
//!
//! * **Scoped resolution (`path`)**: turns an untrusted relative path into an
//!   absolute path that provably stays inside a root, or rejects it. Every
//!   filesystem access reachable from the network goes through it.
//! * **Credentials (`credentials::CredentialStore`)**: an append-only file of
//!   `username:hash` records with salted Argon2id hashes.
//! * **Sessions (`session::SessionTable`)**: in-memory map from opaque random
//!   tokens to usernames.
//! * **Workspaces (`workspace::WorkspaceManager`)**: one directory per user,
//!   with a public `htdocs` subdirectory.
//! * **Files (`files`)**: read/write/delete/mkdir confined to a workspace.
//! * **Public site (`publish::PublicSite`)**: unauthenticated, read-only view
//!   of every user's `htdocs`.
//! * **Instance (`Instance`)**: owns all of the above for one data directory.

pub mod constants;
pub mod credentials;
pub mod files;
pub mod instance;
pub mod path;
pub mod publish;
pub mod session;
pub mod workspace;

/// Re-export the `Instance` struct for easier access.
pub use instance::Instance;

/// Result type used throughout the Folio library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the Folio library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Structured path confinement errors from the path module
    #[error(transparent)]
    Path(path::PathError),

    /// Structured credential errors from the credentials module
    #[error(transparent)]
    Credentials(credentials::CredentialError),

    /// Structured file operation errors from the files module
    #[error(transparent)]
    Files(files::FileError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Io(_) => "io",
            Error::Path(_) => "path",
            Error::Credentials(_) => "credentials",
            Error::Files(_) => "files",
        }
    }

    /// Check if this error is a traversal attempt outside a workspace.
    pub fn is_path_escape(&self) -> bool {
        match self {
            Error::Path(path_err) => path_err.is_escape(),
            _ => false,
        }
    }

    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Io(io_err) => io_err.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }

    /// Check if this error indicates a conflict (already exists).
    pub fn is_conflict(&self) -> bool {
        match self {
            Error::Credentials(cred_err) => cred_err.is_conflict(),
            _ => false,
        }
    }

    /// Check if this error was caused by invalid caller input.
    pub fn is_validation_error(&self) -> bool {
        match self {
            Error::Credentials(cred_err) => cred_err.is_invalid_input(),
            Error::Path(path_err) => path_err.is_invalid_input(),
            _ => false,
        }
    }

    /// Check if this error is authentication-related.
    pub fn is_authentication_error(&self) -> bool {
        match self {
            Error::Credentials(cred_err) => cred_err.is_authentication_error(),
            _ => false,
        }
    }

    /// Check if this error is a file operation failure.
    pub fn is_file_error(&self) -> bool {
        matches!(self, Error::Files(_))
    }

    /// Check if this error is I/O related.
    pub fn is_io_error(&self) -> bool {
        matches!(self, Error::Io(_) | Error::Files(_))
    }
}
