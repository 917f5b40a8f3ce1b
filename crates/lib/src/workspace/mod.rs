//! Per-user workspaces.
//!
//! Every user owns `<users_base>/<username>`, which always contains the
//! public subdirectory `htdocs`. Workspaces are created lazily the first time
//! any user-scoped operation asks for them and are never deleted.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use tracing::{debug, info};

use crate::{
    Result,
    constants::{INDEX_FILES, PUBLIC_DIR, PUBLISHABLE_EXTENSIONS, TEMPLATE_EXTENSIONS},
    credentials::validate_username,
    path::{self, PathError, ScopedDir},
};

/// Immediate children of a directory, split by kind and sorted by name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirEntries {
    pub files: Vec<String>,
    pub folders: Vec<String>,
}

impl DirEntries {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.folders.is_empty()
    }
}

/// Derives and creates workspace directories under a common base
#[derive(Debug, Clone)]
pub struct WorkspaceManager {
    users_base: PathBuf,
}

impl WorkspaceManager {
    /// Create a manager for workspaces below `users_base`, which must be absolute.
    pub fn new(users_base: impl Into<PathBuf>) -> Result<Self> {
        let users_base = users_base.into();
        if !users_base.is_absolute() {
            return Err(PathError::RootNotAbsolute { root: users_base }.into());
        }
        Ok(Self { users_base })
    }

    /// Directory holding every workspace
    pub fn users_base(&self) -> &Path {
        &self.users_base
    }

    /// Root of a user's workspace, created together with `htdocs` if absent
    ///
    /// Idempotent and cheap enough to call on every request.
    pub async fn workspace_root(&self, username: &str) -> Result<PathBuf> {
        let username = validate_username(username)?;
        let root = path::resolve(&self.users_base, username)?;
        let public = root.join(PUBLIC_DIR);

        if !tokio::fs::try_exists(&public).await.unwrap_or(false) {
            tokio::fs::create_dir_all(&public).await?;
            info!(username, root = %root.display(), "Created workspace");
        }

        Ok(root)
    }

    /// A user's workspace as a navigable scope
    pub async fn workspace(&self, username: &str) -> Result<ScopedDir> {
        let root = self.workspace_root(username).await?;
        Ok(ScopedDir::new(root)?)
    }

    /// The existing public directory of an existing user
    ///
    /// Never creates anything. Returns `None` for unknown users, for names
    /// that cannot be usernames, and for workspaces without `htdocs`.
    pub async fn public_root(&self, username: &str) -> Result<Option<PathBuf>> {
        let Ok(username) = validate_username(username) else {
            return Ok(None);
        };
        let public = path::resolve_canonical(&self.users_base, format!("{username}/{PUBLIC_DIR}"))
            .await?;

        match tokio::fs::metadata(&public).await {
            Ok(meta) if meta.is_dir() => Ok(Some(public)),
            Ok(_) => Ok(None),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Every user's publishable files, relative to their `htdocs`
    ///
    /// Users without any publishable file are left out. Paths use `/` and are
    /// sorted; users are ordered by name.
    pub async fn list_publishable(&self) -> Result<BTreeMap<String, Vec<String>>> {
        let mut result = BTreeMap::new();

        let mut users = match tokio::fs::read_dir(&self.users_base).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(result),
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = users.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            let Ok(username) = entry.file_name().into_string() else {
                continue;
            };
            let public = entry.path().join(PUBLIC_DIR);
            let files = collect_publishable(&public).await?;
            if !files.is_empty() {
                result.insert(username, files);
            }
        }

        Ok(result)
    }
}

/// List the immediate children of `dir`
///
/// A missing directory lists as empty. Entries whose target cannot be read
/// (dangling symlinks) and non UTF-8 names are skipped.
pub async fn list_entries(dir: &Path) -> Result<DirEntries> {
    let mut entries = DirEntries::default();

    let mut read_dir = match tokio::fs::read_dir(dir).await {
        Ok(read_dir) => read_dir,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(entries),
        Err(e) => return Err(e.into()),
    };

    while let Some(entry) = read_dir.next_entry().await? {
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        let Ok(meta) = tokio::fs::metadata(entry.path()).await else {
            debug!(path = %entry.path().display(), "Skipping unreadable entry");
            continue;
        };
        if meta.is_dir() {
            entries.folders.push(name);
        } else {
            entries.files.push(name);
        }
    }

    entries.files.sort();
    entries.folders.sort();
    Ok(entries)
}

/// Name of the directory index inside `dir`, if there is one
pub async fn find_index(dir: &Path) -> Result<Option<&'static str>> {
    for name in INDEX_FILES {
        match tokio::fs::metadata(dir.join(name)).await {
            Ok(meta) if meta.is_file() => return Ok(Some(*name)),
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(None)
}

/// Whether a file name carries a publishable extension
pub fn is_publishable(name: &str) -> bool {
    has_extension(name, PUBLISHABLE_EXTENSIONS)
}

/// Whether a file name is rendered as a template
pub fn is_template(name: &str) -> bool {
    has_extension(name, TEMPLATE_EXTENSIONS)
}

fn has_extension(name: &str, extensions: &[&str]) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|e| ext.eq_ignore_ascii_case(e)))
}

/// Walk `public` and collect the publishable regular files below it.
/// Symlinks are not followed.
async fn collect_publishable(public: &Path) -> Result<Vec<String>> {
    let mut files = Vec::new();
    let mut pending = vec![(public.to_path_buf(), String::new())];

    while let Some((dir, prefix)) = pending.pop() {
        let mut read_dir = match tokio::fs::read_dir(&dir).await {
            Ok(read_dir) => read_dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = read_dir.next_entry().await? {
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            let relative = if prefix.is_empty() {
                name.clone()
            } else {
                format!("{prefix}/{name}")
            };

            let file_type = entry.file_type().await?;
            if file_type.is_dir() {
                pending.push((entry.path(), relative));
            } else if file_type.is_file() && is_publishable(&name) {
                files.push(relative);
            }
        }
    }

    files.sort();
    Ok(files)
}
