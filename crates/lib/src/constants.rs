//! Constants used throughout the Folio library.
//!
//! Central definitions for on-disk names and the publishing rules, so the
//! server, the CLI and the tests agree on the layout of a data directory.

/// Credential file inside the data directory, one `username:hash` record per line.
pub const CREDENTIALS_FILE: &str = "usuarios.txt";

/// Directory inside the data directory holding one workspace per user.
pub const USERS_DIR: &str = "usuarios";

/// Public subdirectory of every workspace. Only files below it are served
/// on the unauthenticated routes.
pub const PUBLIC_DIR: &str = "htdocs";

/// Field delimiter of a credential record. Forbidden in usernames.
pub const FIELD_DELIMITER: char = ':';

/// Longest accepted username in bytes. Usernames become directory names,
/// so this matches the common filesystem `NAME_MAX`.
pub const MAX_USERNAME_BYTES: usize = 255;

/// Extensions (lowercase, without the dot) that may be served publicly.
pub const PUBLISHABLE_EXTENSIONS: &[&str] = &["html", "htm", "mako"];

/// Extensions rendered through the placeholder template engine.
pub const TEMPLATE_EXTENSIONS: &[&str] = &["mako"];

/// Directory index candidates, in lookup order.
pub const INDEX_FILES: &[&str] = &["index.html", "index.mako"];

/// Number of random bytes in a session token.
pub const SESSION_TOKEN_BYTES: usize = 16;
