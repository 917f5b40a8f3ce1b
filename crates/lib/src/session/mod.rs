//! Session management for the web interface
//!
//! Provides in-memory session storage mapping session tokens to usernames.

use std::{collections::HashMap, sync::Arc};

use rand::{RngCore, rngs::OsRng};
use tokio::sync::RwLock;

use crate::constants::SESSION_TOKEN_BYTES;

/// Session token (hex string stored in the `sessionid` cookie)
pub type SessionToken = String;

/// In-memory session table
///
/// Maps session tokens to the username they were issued for. Sessions have
/// no expiry; they live until logout or until the process exits.
///
/// Cloning is cheap and every clone shares the same table.
#[derive(Clone, Debug, Default)]
pub struct SessionTable {
    sessions: Arc<RwLock<HashMap<SessionToken, String>>>,
}

impl SessionTable {
    /// Create a new empty session table
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new session for a user
    ///
    /// Generates a 128-bit token from the OS random number generator.
    ///
    /// # Returns
    /// The session token to be stored in a cookie
    pub async fn create(&self, username: impl Into<String>) -> SessionToken {
        let token = generate_token();
        let mut sessions = self.sessions.write().await;
        sessions.insert(token.clone(), username.into());
        token
    }

    /// Get the username bound to a session token
    pub async fn resolve(&self, token: &str) -> Option<String> {
        let sessions = self.sessions.read().await;
        sessions.get(token).cloned()
    }

    /// Destroy a session
    ///
    /// Destroying an unknown or already destroyed token is a no-op.
    pub async fn destroy(&self, token: &str) {
        let mut sessions = self.sessions.write().await;
        sessions.remove(token);
    }

    /// Get the number of active sessions
    pub async fn count(&self) -> usize {
        let sessions = self.sessions.read().await;
        sessions.len()
    }
}

fn generate_token() -> SessionToken {
    let mut bytes = [0u8; SESSION_TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}
