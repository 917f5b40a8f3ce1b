//! The server-wide state of a Folio deployment.
//!
//! `Instance` owns the credential store, the workspace manager, the public
//! site and the session table. It is constructed once at startup with
//! [`Instance::open`] and handed to whoever serves requests; tests open a
//! fresh one per data directory. Cloning is cheap and every clone shares the
//! same state.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use tracing::{info, warn};

use crate::{
    Result,
    constants::{CREDENTIALS_FILE, USERS_DIR},
    credentials::{CredentialError, CredentialStore},
    files,
    path::ScopedDir,
    publish::PublicSite,
    session::{SessionTable, SessionToken},
    workspace::WorkspaceManager,
};

/// Internal state for Instance
struct InstanceInternal {
    data_dir: PathBuf,
    credentials: CredentialStore,
    workspaces: WorkspaceManager,
    site: PublicSite,
    sessions: SessionTable,
}

/// Handle to the shared server state
#[derive(Clone)]
pub struct Instance {
    inner: Arc<InstanceInternal>,
}

impl Instance {
    /// Open (and create if needed) a data directory
    ///
    /// The directory holds the credential file and the per-user workspaces.
    /// Sessions always start empty.
    pub async fn open(data_dir: impl AsRef<Path>) -> Result<Self> {
        let data_dir = data_dir.as_ref();
        tokio::fs::create_dir_all(data_dir).await?;
        let data_dir = tokio::fs::canonicalize(data_dir).await?;

        tokio::fs::create_dir_all(data_dir.join(USERS_DIR)).await?;

        Self::with_data_dir(data_dir)
    }

    /// Open a data directory that must already exist, creating nothing
    ///
    /// For read-only tooling. A missing `usuarios/` simply means no workspaces.
    ///
    /// # Errors
    /// A `NotFound` I/O error when `data_dir` does not exist, and
    /// `NotADirectory` when it is a file.
    pub async fn open_existing(data_dir: impl AsRef<Path>) -> Result<Self> {
        let data_dir = tokio::fs::canonicalize(data_dir.as_ref()).await?;
        if !tokio::fs::metadata(&data_dir).await?.is_dir() {
            return Err(std::io::Error::from(std::io::ErrorKind::NotADirectory).into());
        }
        Self::with_data_dir(data_dir)
    }

    fn with_data_dir(data_dir: PathBuf) -> Result<Self> {
        let workspaces = WorkspaceManager::new(data_dir.join(USERS_DIR))?;
        let credentials = CredentialStore::new(data_dir.join(CREDENTIALS_FILE));
        info!(data_dir = %data_dir.display(), "Opened data directory");

        Ok(Self {
            inner: Arc::new(InstanceInternal {
                data_dir,
                credentials,
                site: PublicSite::new(workspaces.clone()),
                workspaces,
                sessions: SessionTable::new(),
            }),
        })
    }

    /// Canonical path of the data directory
    pub fn data_dir(&self) -> &Path {
        &self.inner.data_dir
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.inner.credentials
    }

    pub fn workspaces(&self) -> &WorkspaceManager {
        &self.inner.workspaces
    }

    pub fn site(&self) -> &PublicSite {
        &self.inner.site
    }

    pub fn sessions(&self) -> &SessionTable {
        &self.inner.sessions
    }

    // === Users and sessions ===

    /// Register a user and create their workspace
    ///
    /// # Returns
    /// The stored (trimmed) username
    pub async fn register(&self, username: &str, password: &str) -> Result<String> {
        let username = self.inner.credentials.register(username, password).await?;
        self.inner.workspaces.workspace_root(&username).await?;
        Ok(username)
    }

    /// Check credentials and open a session
    ///
    /// # Errors
    /// `InvalidCredentials` for an empty field, an unknown user or a wrong
    /// password. The cases are deliberately indistinguishable.
    pub async fn login(&self, username: &str, password: &str) -> Result<SessionToken> {
        let username = username.trim();
        if username.is_empty()
            || password.is_empty()
            || !self.inner.credentials.verify(username, password).await?
        {
            warn!(username, "Failed login");
            return Err(CredentialError::InvalidCredentials.into());
        }

        info!(username, "User logged in");
        Ok(self.inner.sessions.create(username).await)
    }

    /// Destroy a session. Unknown tokens are ignored.
    pub async fn logout(&self, token: &str) {
        self.inner.sessions.destroy(token).await;
    }

    /// Username bound to a session token
    pub async fn session_user(&self, token: &str) -> Option<String> {
        self.inner.sessions.resolve(token).await
    }

    // === Workspace files ===

    /// A user's workspace, created on first use
    pub async fn workspace(&self, username: &str) -> Result<ScopedDir> {
        self.inner.workspaces.workspace(username).await
    }

    /// Read a file relative to the user's workspace root
    pub async fn read_file(&self, username: &str, relative: &str) -> Result<String> {
        let workspace = self.workspace(username).await?;
        files::read(&workspace, relative).await
    }

    /// Write a file relative to the user's workspace root
    pub async fn write_file(&self, username: &str, relative: &str, contents: &str) -> Result<()> {
        let workspace = self.workspace(username).await?;
        files::write(&workspace, relative, contents).await
    }

    /// Delete a file relative to the user's workspace root
    pub async fn delete_file(&self, username: &str, relative: &str) -> Result<()> {
        let workspace = self.workspace(username).await?;
        files::delete(&workspace, relative).await
    }

    /// Create a folder relative to the user's workspace root
    pub async fn create_folder(&self, username: &str, relative: &str) -> Result<()> {
        let workspace = self.workspace(username).await?;
        files::mkdir(&workspace, relative).await
    }
}
