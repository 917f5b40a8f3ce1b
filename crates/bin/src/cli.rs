//! CLI argument definitions for the Folio binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;

/// Folio multi-user web publishing server
#[derive(Parser, Debug)]
#[command(name = "folio")]
#[command(about = "Folio: per-user web workspaces with a public site")]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Used when no subcommand is given
    #[command(flatten)]
    pub serve: ServeArgs,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the Folio web server (default)
    Serve(ServeArgs),
    /// Check health of a running Folio server
    Health(HealthArgs),
    /// Show a summary of a data directory
    Info(InfoArgs),
    /// List registered users and their published files
    Users(UsersArgs),
}

/// Arguments for the serve command
#[derive(clap::Args, Debug, Clone)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long, default_value_t = 8000, env = "FOLIO_PORT")]
    pub port: u16,

    /// Bind address
    #[arg(long, default_value = "0.0.0.0", env = "FOLIO_HOST")]
    pub host: String,

    #[command(flatten)]
    pub data: DataDirArgs,
}

/// Location of `usuarios.txt` and the `usuarios/` workspaces
#[derive(clap::Args, Debug, Clone)]
pub struct DataDirArgs {
    /// Data directory holding the credential file and the user workspaces
    #[arg(short = 'D', long, default_value = ".", env = "FOLIO_DATA_DIR")]
    pub data_dir: PathBuf,
}

/// Arguments for the health command
#[derive(clap::Args, Debug)]
pub struct HealthArgs {
    /// Base URL of the server to check
    #[arg(long, default_value = "http://127.0.0.1:8000", env = "FOLIO_URL")]
    pub url: String,

    /// Timeout in seconds
    #[arg(short, long, default_value_t = 5)]
    pub timeout: u64,
}

/// Arguments for the info command
#[derive(clap::Args, Debug)]
pub struct InfoArgs {
    #[command(flatten)]
    pub data: DataDirArgs,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the users command
#[derive(clap::Args, Debug)]
pub struct UsersArgs {
    #[command(flatten)]
    pub data: DataDirArgs,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}
