//! Public, unauthenticated view of every user's `htdocs`.
//!
//! Only files with a publishable extension are ever served. Template files
//! are rendered with [`render_template`], a logic-less placeholder
//! substitution: user-owned templates never execute code in the server.

use std::path::Path;

use crate::{
    Result,
    files::{FileError, FileOperation},
    path::ScopedDir,
    workspace::{self, DirEntries, WorkspaceManager},
};

/// Outcome of a public lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublicPage {
    /// A static HTML file, served verbatim
    Html { path: String, content: String },
    /// A template file after placeholder substitution
    Template { path: String, rendered: String },
    /// A directory without an index: its folders and publishable files
    Listing { path: String, entries: DirEntries },
    /// The file exists but is not publishable
    Forbidden { path: String },
    /// Unknown user, missing `htdocs` or missing entry
    NotFound,
}

/// One user's entry in the public index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedSite {
    pub username: String,
    /// Index file at the top of `htdocs`, if any
    pub index: Option<&'static str>,
    /// Publishable files other than the top-level index
    pub files: Vec<String>,
}

/// Values available to templates
#[derive(Debug, Clone, Copy)]
pub struct TemplateContext<'a> {
    pub user: &'a str,
    pub path: &'a str,
}

/// Read-only public site over the workspaces
#[derive(Debug, Clone)]
pub struct PublicSite {
    workspaces: WorkspaceManager,
}

impl PublicSite {
    pub fn new(workspaces: WorkspaceManager) -> Self {
        Self { workspaces }
    }

    /// Look up `subpath` inside the `htdocs` of `username`
    ///
    /// Directories serve their index file when one exists and are listed
    /// otherwise.
    ///
    /// # Errors
    /// A `PathError` when `subpath` escapes `htdocs`; a `FileError` when a
    /// publishable file cannot be read.
    pub async fn lookup(&self, username: &str, subpath: &str) -> Result<PublicPage> {
        let Some(public) = self.workspaces.public_root(username).await? else {
            return Ok(PublicPage::NotFound);
        };

        let scope = ScopedDir::new(&public)?;
        let target = scope.resolve_canonical(subpath).await?;
        let relative = scope.enter(subpath)?.relative();

        let meta = match tokio::fs::metadata(&target).await {
            Ok(meta) => meta,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(PublicPage::NotFound),
            Err(e) => return Err(e.into()),
        };

        if meta.is_dir() {
            if let Some(index) = workspace::find_index(&target).await? {
                let path = join_relative(&relative, index);
                return serve_file(&target.join(index), username, &path).await;
            }

            let mut entries = workspace::list_entries(&target).await?;
            entries.files.retain(|name| workspace::is_publishable(name));
            return Ok(PublicPage::Listing {
                path: relative,
                entries,
            });
        }

        serve_file(&target, username, &relative).await
    }

    /// Every user with at least one publishable file, ordered by username
    pub async fn sites(&self) -> Result<Vec<PublishedSite>> {
        let mut sites = Vec::new();

        for (username, mut files) in self.workspaces.list_publishable().await? {
            let index = match self.workspaces.public_root(&username).await? {
                Some(public) => workspace::find_index(&public).await?,
                None => None,
            };
            if let Some(index) = index {
                files.retain(|file| file != index);
            }
            sites.push(PublishedSite {
                username,
                index,
                files,
            });
        }

        Ok(sites)
    }
}

async fn serve_file(path: &Path, username: &str, relative: &str) -> Result<PublicPage> {
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default();

    if !workspace::is_publishable(name) {
        return Ok(PublicPage::Forbidden {
            path: relative.to_string(),
        });
    }

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| FileError::failed(FileOperation::Read, relative, e))?;

    if workspace::is_template(name) {
        let context = TemplateContext {
            user: username,
            path: relative,
        };
        return Ok(PublicPage::Template {
            path: relative.to_string(),
            rendered: render_template(&content, &context),
        });
    }

    Ok(PublicPage::Html {
        path: relative.to_string(),
        content,
    })
}

fn join_relative(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{dir}/{name}")
    }
}

/// Substitute `${user}` and `${path}` with HTML-escaped values
///
/// Any other `${...}` expression, and every control construct of richer
/// template languages, is left in the output untouched.
pub fn render_template(source: &str, context: &TemplateContext<'_>) -> String {
    let mut output = String::with_capacity(source.len());
    let mut rest = source;

    while let Some(start) = rest.find("${") {
        output.push_str(&rest[..start]);
        let after = &rest[start + 2..];

        let Some(end) = after.find('}') else {
            output.push_str(&rest[start..]);
            return output;
        };

        match after[..end].trim() {
            "user" => output.push_str(&html_escape(context.user)),
            "path" => output.push_str(&html_escape(context.path)),
            _ => output.push_str(&rest[start..start + 2 + end + 1]),
        }
        rest = &after[end + 1..];
    }

    output.push_str(rest);
    output
}

/// Escape HTML special characters
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
