//! Error types for scoped path resolution.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while confining a caller-supplied path to a root.
///
/// None of these are retried. A caller receiving any of them must abort the
/// filesystem operation it was about to perform.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum PathError {
    /// The requested path would leave its root, lexically or through a symlink.
    #[error("Path '{requested}' escapes its root directory")]
    Escape {
        /// Root the request was confined to
        root: PathBuf,
        /// Path exactly as the caller supplied it
        requested: String,
    },

    /// The root handed to the resolver is relative.
    #[error("Root must be an absolute path: {root:?}")]
    RootNotAbsolute {
        /// The offending root
        root: PathBuf,
    },

    /// The requested folder does not exist or is not a directory.
    #[error("Not a folder: '{requested}'")]
    NotADirectory {
        /// Path exactly as the caller supplied it
        requested: String,
    },

    /// A segment that can never name an entry inside a directory.
    #[error("Invalid path segment: {segment:?}")]
    InvalidSegment {
        /// The offending segment
        segment: String,
    },
}

impl PathError {
    /// Check if this error is a traversal attempt.
    pub fn is_escape(&self) -> bool {
        matches!(self, PathError::Escape { .. })
    }

    /// Check if this error was caused by malformed caller input.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            PathError::Escape { .. }
                | PathError::NotADirectory { .. }
                | PathError::InvalidSegment { .. }
        )
    }

    /// The path as requested by the caller, when there is one.
    pub fn requested(&self) -> Option<&str> {
        match self {
            PathError::Escape { requested, .. } | PathError::NotADirectory { requested } => {
                Some(requested)
            }
            _ => None,
        }
    }
}

impl From<PathError> for crate::Error {
    fn from(err: PathError) -> Self {
        crate::Error::Path(err)
    }
}
