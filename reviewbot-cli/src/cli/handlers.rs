//! CLI command handlers

use anyhow::{Context, Result};
use reviewbot_core::models::{Credentials, Settings, TimeCursor};
use reviewbot_core::services::logging::{self, LogOptions};
use reviewbot_core::services::{HomeworkPoller, IterationOutcome};
use std::path::PathBuf;
use tokio::signal;

/// Settings file path: explicit flag, then the XDG default, then `config.toml`.
fn resolve_config_path(config: Option<PathBuf>) -> PathBuf {
    config
        .or_else(Settings::default_config_path)
        .unwrap_or_else(|| PathBuf::from("config.toml"))
}

/// Read `.env` (if any), settings and credentials.
fn load_configuration(config: Option<PathBuf>) -> Result<(Settings, Credentials)> {
    // Variables already set in the environment take precedence over .env
    let _ = dotenvy::dotenv();

    let path = resolve_config_path(config);
    let settings = Settings::load_from_file(&path)
        .with_context(|| format!("Failed to load settings from {}", path.display()))?;
    Ok((settings, Credentials::from_env()))
}

fn init_logging(settings: &Settings) -> Result<()> {
    logging::init_logging(&LogOptions::from(settings))
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))
}

fn initial_cursor(from_date: Option<i64>) -> TimeCursor {
    from_date.map(TimeCursor::new).unwrap_or_else(TimeCursor::now)
}

/// Handle the 'run' command
pub async fn handle_run(
    config: Option<PathBuf>,
    interval: Option<u64>,
    from_date: Option<i64>,
) -> Result<()> {
    let (mut settings, credentials) = load_configuration(config)?;
    if let Some(interval) = interval {
        settings.retry_interval_secs = interval;
    }
    init_logging(&settings)?;

    let poller = HomeworkPoller::from_config(&settings, &credentials, initial_cursor(from_date))
        .context("Cannot start the homework poller")?;

    tokio::select! {
        _ = poller.run() => {}
        _ = signal::ctrl_c() => {
            tracing::info!("Interrupted, homework poller stopped");
        }
    }

    Ok(())
}

/// Handle the 'once' command
pub async fn handle_once(config: Option<PathBuf>, from_date: Option<i64>) -> Result<()> {
    let (settings, credentials) = load_configuration(config)?;
    init_logging(&settings)?;

    let mut poller =
        HomeworkPoller::from_config(&settings, &credentials, initial_cursor(from_date))
            .context("Cannot start the homework poller")?;

    match poller.run_iteration().await {
        IterationOutcome::Delivered(sent) => {
            println!(
                "✅ Poll complete: {} notification(s) sent, next cursor {}",
                sent,
                poller.cursor()
            );
            Ok(())
        }
        IterationOutcome::Failed(error) => Err(anyhow::anyhow!(error.diagnostic())),
    }
}

/// Handle the 'check' command
pub fn handle_check(config: Option<PathBuf>) -> Result<()> {
    let (settings, credentials) = load_configuration(config)?;

    println!("🔍 Validating configuration...");
    println!("   Endpoint:        {}", settings.endpoint);
    println!("   Retry interval:  {}s", settings.retry_interval_secs);
    println!("   Request timeout: {}s", settings.request_timeout_secs);
    println!("   Advance cursor:  {}", settings.advance_cursor);
    match &settings.log_file {
        Some(path) => println!(
            "   Log file:        {} ({} bytes x {} backups)",
            path.display(),
            settings.log_max_bytes,
            settings.log_backups
        ),
        None => println!("   Log file:        <stdout only>"),
    }
    println!("   Credentials:     {:?}", credentials);

    let mut problems = settings.validate().err().unwrap_or_default();
    problems.extend(
        credentials
            .missing()
            .into_iter()
            .map(|name| format!("environment variable {} is not set", name)),
    );

    if problems.is_empty() {
        println!("✅ Configuration is valid");
        Ok(())
    } else {
        for problem in &problems {
            println!("   ❌ {}", problem);
        }
        Err(anyhow::anyhow!(
            "Configuration has {} problem(s)",
            problems.len()
        ))
    }
}
