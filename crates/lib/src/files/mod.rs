//! File operations inside a confined directory.
//!
//! Each operation confines its target with
//! [`ScopedDir::resolve_canonical`] first and only then touches the
//! filesystem, so a rejected path never causes a partial mutation.

use std::path::PathBuf;

use tracing::debug;

use crate::{Result, path::ScopedDir};

pub mod errors;

pub use errors::{FileError, FileOperation};

/// Read a UTF-8 file
pub async fn read(dir: &ScopedDir, name: &str) -> Result<String> {
    let path = confine(dir, FileOperation::Read, name).await?;
    debug!(path = %path.display(), "Reading file");

    tokio::fs::read_to_string(&path)
        .await
        .map_err(|e| FileError::failed(FileOperation::Read, name, e).into())
}

/// Write a file, replacing any previous content
///
/// Missing parent directories between `dir` and the target are created.
pub async fn write(dir: &ScopedDir, name: &str, contents: &str) -> Result<()> {
    let path = confine(dir, FileOperation::Write, name).await?;
    debug!(path = %path.display(), bytes = contents.len(), "Writing file");

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| FileError::failed(FileOperation::Write, name, e))?;
    }
    tokio::fs::write(&path, contents)
        .await
        .map_err(|e| FileError::failed(FileOperation::Write, name, e).into())
}

/// Delete a single file. Directories are refused.
pub async fn delete(dir: &ScopedDir, name: &str) -> Result<()> {
    let path = confine(dir, FileOperation::Delete, name).await?;
    debug!(path = %path.display(), "Deleting file");

    let meta = tokio::fs::symlink_metadata(&path)
        .await
        .map_err(|e| FileError::failed(FileOperation::Delete, name, e))?;
    if meta.is_dir() {
        return Err(FileError::failed(FileOperation::Delete, name, "it is a folder").into());
    }

    tokio::fs::remove_file(&path)
        .await
        .map_err(|e| FileError::failed(FileOperation::Delete, name, e).into())
}

/// Create a folder and any missing parents. Existing folders are fine.
pub async fn mkdir(dir: &ScopedDir, name: &str) -> Result<()> {
    let path = confine(dir, FileOperation::CreateFolder, name).await?;
    debug!(path = %path.display(), "Creating folder");

    tokio::fs::create_dir_all(&path)
        .await
        .map_err(|e| FileError::failed(FileOperation::CreateFolder, name, e).into())
}

/// Confine `name` below `dir`. Operations address an entry inside `dir`,
/// never `dir` itself.
async fn confine(dir: &ScopedDir, operation: FileOperation, name: &str) -> Result<PathBuf> {
    let path = dir.resolve_canonical(name).await?;
    if path == dir.path() {
        return Err(FileError::failed(operation, name, "no name given").into());
    }
    Ok(path)
}
