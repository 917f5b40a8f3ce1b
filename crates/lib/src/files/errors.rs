//! Error types for workspace file operations.

use std::fmt;

use thiserror::Error;

/// The file operation that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOperation {
    Read,
    Write,
    Delete,
    CreateFolder,
}

impl fmt::Display for FileOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FileOperation::Read => "read",
            FileOperation::Write => "write",
            FileOperation::Delete => "delete",
            FileOperation::CreateFolder => "create folder",
        };
        f.write_str(name)
    }
}

/// A file operation failed after its path was confined.
///
/// I/O failures are not classified further: a missing file, a permission
/// problem and a full disk all surface as the same error with a readable
/// reason. Traversal attempts never get this far; they fail earlier with a
/// [`PathError`](crate::path::PathError).
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum FileError {
    #[error("Could not {operation} '{name}': {reason}")]
    OperationFailed {
        operation: FileOperation,
        name: String,
        reason: String,
    },
}

impl FileError {
    pub(crate) fn failed(
        operation: FileOperation,
        name: impl Into<String>,
        reason: impl fmt::Display,
    ) -> Self {
        FileError::OperationFailed {
            operation,
            name: name.into(),
            reason: reason.to_string(),
        }
    }

    /// The operation that failed
    pub fn operation(&self) -> FileOperation {
        match self {
            FileError::OperationFailed { operation, .. } => *operation,
        }
    }
}

impl From<FileError> for crate::Error {
    fn from(err: FileError) -> Self {
        crate::Error::Files(err)
    }
}
