//! User listing command.

use crate::cli::UsersArgs;
use crate::output::{OutputFormat, print_table};

/// Run the `users` command
pub async fn run(args: &UsersArgs, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let instance = super::open_data_dir(&args.data.data_dir).await?;

    let usernames = instance.credentials().list_usernames().await?;
    let published = instance.workspaces().list_publishable().await?;

    match format {
        OutputFormat::Human => {
            if usernames.is_empty() {
                println!("No users registered.");
                return Ok(());
            }

            let rows: Vec<Vec<String>> = usernames
                .iter()
                .map(|name| {
                    let files = published.get(name).map_or(0, Vec::len);
                    vec![name.clone(), files.to_string()]
                })
                .collect();
            print_table(&["USER", "PUBLISHED"], &rows);
        }
        OutputFormat::Json => {
            let entries: Vec<_> = usernames
                .iter()
                .map(|name| {
                    serde_json::json!({
                        "username": name,
                        "published": published.get(name).cloned().unwrap_or_default(),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string(&entries)?);
        }
    }

    Ok(())
}
