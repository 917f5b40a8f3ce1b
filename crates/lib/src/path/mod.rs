//! Scoped path resolution.
//!
//! Every filesystem operation reachable from the network confines its target
//! through this module before touching storage. A caller supplies a root and
//! an untrusted relative path and gets back either an absolute path that is
//! provably inside the root, or a [`PathError`].
//!
//! Containment is checked on path components (`Path::starts_with`), never on
//! raw string prefixes, so a sibling directory such as `/data/alice2` is not
//! considered to be inside `/data/alice`.
//!
//! Two levels are offered:
//! * [`resolve`] is purely lexical and performs no I/O.
//! * [`resolve_canonical`] additionally follows the symlinks that already
//!   exist on disk and rejects candidates that would land outside the root.
//!
//! [`ScopedDir`] builds on both for nested navigation (entering a subfolder,
//! then resolving a file name inside it), re-validating at every step.

use std::path::{Component, Path, PathBuf};

use tracing::{debug, warn};

pub mod errors;

pub use errors::PathError;

/// Confine `relative` under `root` without touching the filesystem.
///
/// * `root` must be absolute. `.` and `..` inside the root itself are
///   normalized away first.
/// * `relative` is split on both `/` and `\`. Empty and `.` segments are
///   dropped, so a leading separator never makes the path server-absolute.
/// * `..` removes the previously pushed segment. A `..` with nothing left to
///   remove is an escape and is rejected rather than clamped.
/// * An empty `relative` resolves to the root itself.
pub fn resolve(root: impl AsRef<Path>, relative: impl AsRef<str>) -> Result<PathBuf, PathError> {
    let relative = relative.as_ref();
    let root = clean_root(root.as_ref())?;

    let segments = match normalize(relative) {
        Ok(segments) => segments,
        Err(err) => {
            if err.is_escape() {
                warn!(root = %root.display(), requested = %relative, "Rejected path escaping its root");
            }
            return Err(with_root(err, &root));
        }
    };

    let mut resolved = root.clone();
    for segment in &segments {
        resolved.push(segment);
    }

    if !resolved.starts_with(&root) {
        warn!(root = %root.display(), requested = %relative, "Rejected path escaping its root");
        return Err(PathError::Escape {
            root,
            requested: relative.to_string(),
        });
    }

    Ok(resolved)
}

/// Confine `relative` under `root`, following existing symlinks.
///
/// Runs [`resolve`] first, then canonicalizes the deepest ancestor of the
/// candidate that exists on disk and requires it to stay under the
/// canonicalized root. A dangling symlink anywhere on the way is rejected,
/// since writing through it could create a file outside the root.
///
/// Returns the lexical candidate, not the canonical one, so callers keep
/// addressing the path the user asked for.
pub async fn resolve_canonical(
    root: impl AsRef<Path>,
    relative: impl AsRef<str>,
) -> Result<PathBuf, PathError> {
    let relative = relative.as_ref();
    let candidate = resolve(root.as_ref(), relative)?;
    let root = clean_root(root.as_ref())?;

    let canonical_root = match tokio::fs::canonicalize(&root).await {
        Ok(path) => path,
        // Nothing exists below a missing root, so there is no symlink to follow
        Err(_) => return Ok(candidate),
    };

    let mut existing = candidate.as_path();
    loop {
        match tokio::fs::canonicalize(existing).await {
            Ok(canonical) => {
                if canonical.starts_with(&canonical_root) {
                    return Ok(candidate);
                }
                warn!(
                    root = %root.display(),
                    requested = %relative,
                    target = %canonical.display(),
                    "Rejected symlink escaping its root"
                );
                return Err(PathError::Escape {
                    root,
                    requested: relative.to_string(),
                });
            }
            Err(_) if tokio::fs::symlink_metadata(existing).await.is_ok() => {
                warn!(root = %root.display(), requested = %relative, "Rejected dangling symlink");
                return Err(PathError::Escape {
                    root,
                    requested: relative.to_string(),
                });
            }
            Err(_) => match existing.parent() {
                Some(parent) if parent.starts_with(&root) => existing = parent,
                _ => return Ok(candidate),
            },
        }
    }
}

/// A directory inside a confined root.
///
/// Holds the root and a normalized location below it. Every navigation step
/// resolves against the current directory, so a traversal split over several
/// calls (`a/..` followed by `../etc`) is rejected just like the joined form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopedDir {
    root: PathBuf,
    segments: Vec<String>,
}

impl ScopedDir {
    /// Create a scope positioned at `root` itself.
    pub fn new(root: impl AsRef<Path>) -> Result<Self, PathError> {
        Ok(Self {
            root: clean_root(root.as_ref())?,
            segments: Vec::new(),
        })
    }

    /// The confinement root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of the current directory.
    pub fn path(&self) -> PathBuf {
        let mut path = self.root.clone();
        for segment in &self.segments {
            path.push(segment);
        }
        path
    }

    /// Location relative to the root, `/`-joined. Empty at the root.
    pub fn relative(&self) -> String {
        self.segments.join("/")
    }

    /// Whether the current directory is the root.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Confine `name` under the current directory, lexically.
    pub fn resolve(&self, name: impl AsRef<str>) -> Result<PathBuf, PathError> {
        resolve(self.path(), name)
    }

    /// Confine `name` under the current directory, following symlinks.
    pub async fn resolve_canonical(&self, name: impl AsRef<str>) -> Result<PathBuf, PathError> {
        resolve_canonical(self.path(), name).await
    }

    /// Move into `relative`, which must stay under the current directory.
    pub fn enter(&self, relative: impl AsRef<str>) -> Result<ScopedDir, PathError> {
        let relative = relative.as_ref();
        // Validates containment and logs escapes
        self.resolve(relative)?;

        let mut segments = self.segments.clone();
        segments.extend(normalize(relative)?.into_iter().map(str::to_string));
        Ok(ScopedDir {
            root: self.root.clone(),
            segments,
        })
    }

    /// Move into `relative` like [`enter`](Self::enter), additionally
    /// refusing folders that are symlinks out of the root.
    ///
    /// # Errors
    /// `NotADirectory` when the target is missing or is not a folder.
    pub async fn enter_canonical(&self, relative: impl AsRef<str>) -> Result<ScopedDir, PathError> {
        let relative = relative.as_ref();
        let target = self.resolve_canonical(relative).await?;
        match tokio::fs::metadata(&target).await {
            Ok(meta) if meta.is_dir() => self.enter(relative),
            _ => {
                debug!(requested = %relative, "Refused to enter a non-folder");
                Err(PathError::NotADirectory {
                    requested: relative.to_string(),
                })
            }
        }
    }

    /// Move up one level. Stays put at the root.
    pub fn parent(&self) -> ScopedDir {
        let mut segments = self.segments.clone();
        segments.pop();
        ScopedDir {
            root: self.root.clone(),
            segments,
        }
    }
}

/// Split a caller-supplied path into plain segments.
///
/// The returned escape error carries an empty root; [`resolve`] fills it in.
fn normalize(relative: &str) -> Result<Vec<&str>, PathError> {
    let mut segments: Vec<&str> = Vec::new();
    for segment in relative.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.pop().is_none() {
                    return Err(PathError::Escape {
                        root: PathBuf::new(),
                        requested: relative.to_string(),
                    });
                }
            }
            other => {
                if !is_plain_segment(other) {
                    return Err(PathError::InvalidSegment {
                        segment: other.to_string(),
                    });
                }
                segments.push(other);
            }
        }
    }
    Ok(segments)
}

/// A segment is plain when the platform parses it as exactly one normal
/// component. Rejects NUL bytes and drive prefixes such as `C:`.
fn is_plain_segment(segment: &str) -> bool {
    if segment.contains('\0') {
        return false;
    }
    let mut components = Path::new(segment).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Lexically normalize an absolute root.
fn clean_root(root: &Path) -> Result<PathBuf, PathError> {
    if !root.is_absolute() {
        return Err(PathError::RootNotAbsolute {
            root: root.to_path_buf(),
        });
    }

    let mut cleaned = PathBuf::new();
    for component in root.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                cleaned.pop();
            }
            other => cleaned.push(other.as_os_str()),
        }
    }
    Ok(cleaned)
}

fn with_root(err: PathError, root: &Path) -> PathError {
    match err {
        PathError::Escape { requested, .. } => PathError::Escape {
            root: root.to_path_buf(),
            requested,
        },
        other => other,
    }
}
