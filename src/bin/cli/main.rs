mod app;
mod commands;
mod render;

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "ghost-notes-cli", about = "Inspect and maintain Ghost Notes data", version)]
struct Cli {
    /// Data directory (default: platform data dir, or GHOST_NOTES_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, default_value = "plain")]
    format: OutputFormat,

    /// Disable ANSI colors
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// List notes, most recent first
    List {
        /// Only notes whose window was open at last shutdown
        #[arg(long)]
        open: bool,
    },

    /// Show a note (id or unique id prefix)
    Show {
        id: String,
    },

    /// Delete a note, and tombstone it in the cloud when signed in
    Delete {
        id: String,
        /// Skip the cloud tombstone
        #[arg(long)]
        local_only: bool,
    },

    /// Show the current config (token redacted)
    Config,

    /// Pull notes from the cloud and merge them into the local store
    Pull,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let use_color = !cli.no_color && std::io::stdout().is_terminal();
    let app = app::App::new(cli.data_dir)?;

    match cli.command {
        Command::List { open } => {
            commands::list::run(&app, open, &cli.format, use_color)?;
        }
        Command::Show { id } => {
            commands::show::run(&app, &id, &cli.format, use_color)?;
        }
        Command::Delete { id, local_only } => {
            commands::delete::run(&app, &id, local_only)?;
        }
        Command::Config => {
            commands::config::run(&app, &cli.format)?;
        }
        Command::Pull => {
            commands::pull::run(&app, &cli.format)?;
        }
    }

    Ok(())
}
