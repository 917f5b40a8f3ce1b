//! Subcommand implementations.

use std::path::Path;

use folio::Instance;

pub mod health;
pub mod info;
pub mod serve;
pub mod users;

/// Open a data directory for inspection without creating it
async fn open_data_dir(data_dir: &Path) -> Result<Instance, Box<dyn std::error::Error>> {
    match Instance::open_existing(data_dir).await {
        Ok(instance) => Ok(instance),
        Err(e) if e.is_not_found() => {
            Err(format!("Data directory not found: {}", data_dir.display()).into())
        }
        Err(e) => Err(e.into()),
    }
}
