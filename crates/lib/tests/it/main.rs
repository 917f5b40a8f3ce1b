/*! Integration tests for Folio.
 *
 * This test suite is organized as a single integration test binary
 * following the pattern described by matklad in
 * https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html
 *
 * The module structure mirrors the main library structure:
 * - path: Tests for scoped resolution against a real filesystem (symlinks)
 * - credentials: Tests for the append-only credential file
 * - instance: Tests for registration, login and session lifecycle
 * - workspace: Tests for workspace creation and listings
 * - files: Tests for confined file operations
 * - publish: Tests for the public site
 */

use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("folio=info".parse().unwrap()))
        .with_test_writer()
        .try_init();
}

mod credentials;
mod instance;
mod path;
mod workspace;
