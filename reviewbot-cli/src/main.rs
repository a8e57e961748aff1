mod cli;

use anyhow::Result;
use clap::{Parser, Subcommand};
use cli::handlers;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "reviewbot")]
#[command(version)]
#[command(about = "Relays Practicum homework review statuses to a Telegram chat")]
#[command(
    help_template = "{name} - {version}\n{about}\n\n{usage-heading}\n  {usage}\n\n{all-args}{options}\n"
)]
struct Cli {
    /// Path to the settings file (default: <config dir>/reviewbot/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll the homework statuses API forever
    ///
    /// Requires PRACTICUM_TOKEN, TELEGRAM_TOKEN and TELEGRAM_CHAT_ID in the
    /// environment (a .env file in the working directory is read too).
    ///
    /// Examples:
    ///   reviewbot run
    ///   reviewbot run --interval 60 --from-date 1700000000
    Run {
        /// Seconds between polls (overrides retry_interval_secs)
        #[arg(short, long)]
        interval: Option<u64>,

        /// Initial cursor as a Unix timestamp (default: now)
        #[arg(long)]
        from_date: Option<i64>,
    },

    /// Run a single poll iteration and exit
    Once {
        /// Cursor as a Unix timestamp (default: now)
        #[arg(long)]
        from_date: Option<i64>,
    },

    /// Validate settings and credentials without touching the network
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            interval,
            from_date,
        } => {
            handlers::handle_run(cli.config, interval, from_date).await?;
        }
        Commands::Once { from_date } => {
            handlers::handle_once(cli.config, from_date).await?;
        }
        Commands::Check => {
            handlers::handle_check(cli.config)?;
        }
    }

    Ok(())
}
