use anyhow::{Context, Result};
use archive_cli::{Decision, RunOptions, Runner, TerminalPrompter, TARGETS};
use clap::Parser;
use factsheet_client::config::DEFAULT_CREDENTIALS_FILE;
use factsheet_client::{Credentials, FactsheetClient};
use std::env;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Archive every factsheet of the configured types in a workspace.
#[derive(Parser, Debug)]
#[command(name = "archive-factsheets")]
struct Args {
    /// Skip all interactive confirmations
    #[arg(long = "da", visible_alias = "yes")]
    skip_confirmation: bool,

    /// Credentials file (JSON with `api_token` and `base_url`).
    /// Defaults to credentials.json next to the executable.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Fetch with cursor pagination, this many factsheets per page
    #[arg(long)]
    page_size: Option<u32>,
}

fn default_credentials_path() -> Result<PathBuf> {
    let exe = env::current_exe().context("Failed to locate the running executable")?;
    let dir = exe
        .parent()
        .context("Failed to get parent directory of the executable")?;
    Ok(dir.join(DEFAULT_CREDENTIALS_FILE))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let args = Args::parse();

    let path = match args.config {
        Some(path) => path,
        None => default_credentials_path()?,
    };
    let credentials = Credentials::load_with_env(&path)
        .with_context(|| format!("Failed to load credentials from {}", path.display()))?;

    let mut prompter = TerminalPrompter::new();
    let mut runner = Runner::new(
        RunOptions {
            skip_confirmation: args.skip_confirmation,
            page_size: args.page_size,
        },
        &mut prompter,
    );

    if runner.confirm()? == Decision::Abort {
        return Ok(());
    }

    let client = FactsheetClient::connect(credentials).await;
    runner.process(&client, TARGETS).await?;

    tracing::info!("Archive run finished");
    Ok(())
}
