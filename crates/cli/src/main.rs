//! Plugpack CLI - Command-line interface for the Plugpack plugin packager.

mod commands;
mod discovery;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use miette::Result;

#[derive(Parser)]
#[command(name = "plugpack")]
#[command(
    author,
    version,
    about = "Package plugin projects into distributable archives"
)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to the plugin manifest (auto-detected if not specified)
    #[arg(short = 'm', long)]
    manifest: Option<String>,

    /// Verify the project without producing an archive
    #[arg(long)]
    dry_run: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Package the plugin into a distributable artifact
    Pack {
        /// Path to the plugin manifest (auto-detected if not specified)
        #[arg(short = 'm', long)]
        manifest: Option<String>,

        /// Verify the project without producing an archive
        #[arg(long)]
        dry_run: bool,
    },

    /// Validate the plugin manifest
    Validate {
        /// Path to the plugin manifest (auto-detected if not specified)
        #[arg(short = 'm', long)]
        manifest: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = run(cli).await;

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{:?}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Commands::Pack { manifest, dry_run }) => {
            let manifest_path = resolve_manifest(manifest)?;
            commands::pack::execute(&manifest_path, dry_run).await
        }

        Some(Commands::Validate { manifest }) => {
            let manifest_path = resolve_manifest(manifest)?;
            commands::validate::execute(&manifest_path).await
        }

        None => {
            // Pack is the default action
            let manifest_path = resolve_manifest(cli.manifest)?;
            commands::pack::execute(&manifest_path, cli.dry_run).await
        }
    }
}

fn resolve_manifest(flag: Option<String>) -> Result<PathBuf> {
    match flag {
        Some(path) => Ok(PathBuf::from(path)),
        None => discovery::find_manifest(),
    }
}
