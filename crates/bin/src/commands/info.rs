//! Instance info command - shows the data directory and what it holds.

use crate::cli::InfoArgs;
use crate::output::OutputFormat;

/// Run the info command
pub async fn run(args: &InfoArgs, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let instance = super::open_data_dir(&args.data.data_dir).await?;

    let users = instance.credentials().list_usernames().await?;
    let published = instance.workspaces().list_publishable().await?;
    let sites = published.len();
    let files: usize = published.values().map(Vec::len).sum();
    let data_dir = instance.data_dir().display().to_string();

    match format {
        OutputFormat::Human => {
            println!("Data dir:    {data_dir}");
            println!("Users:       {}", users.len());
            println!("Sites:       {sites}");
            println!("Published:   {files}");
        }
        OutputFormat::Json => {
            let value = serde_json::json!({
                "data_dir": data_dir,
                "users": users.len(),
                "sites": sites,
                "published_files": files,
            });
            println!("{}", serde_json::to_string(&value)?);
        }
    }

    Ok(())
}
