use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod output;
mod templates;

use cli::{Cli, Commands};
use output::OutputFormat;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("folio=info".parse()?))
        .init();

    match cli.command {
        None => commands::serve::run(&cli.serve).await,
        Some(Commands::Serve(args)) => commands::serve::run(&args).await,
        Some(Commands::Health(args)) => commands::health::run(&args).await,
        Some(Commands::Info(args)) => {
            commands::info::run(&args, OutputFormat::from_json_flag(args.json)).await
        }
        Some(Commands::Users(args)) => {
            commands::users::run(&args, OutputFormat::from_json_flag(args.json)).await
        }
    }
}
