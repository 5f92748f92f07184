use std::{path::PathBuf, process::ExitCode, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{FetchState, HttpFetchGateway, ListSelectionController};
use shared::domain::RecordId;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod render;
mod session;

use config::load_settings;

#[derive(Parser, Debug)]
#[command(name = "film_search", about = "Search the OMDb catalog and pick a film")]
struct Args {
    /// Settings file; defaults to ./film_search.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    term: Option<String>,
    #[arg(long)]
    api_key: Option<String>,
    #[arg(long)]
    base_url: Option<String>,
    #[arg(long)]
    max_retries: Option<u32>,
    /// Select this record once results are loaded and show its details.
    #[arg(long, value_name = "IMDB_ID")]
    select: Option<String>,
    /// Print the final snapshot as JSON instead of text.
    #[arg(long)]
    json: bool,
    #[arg(long, short, conflicts_with_all = ["json", "select"])]
    interactive: bool,
    /// Used when RUST_LOG is unset.
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut settings = load_settings(args.config.as_deref())?;
    if let Some(v) = args.api_key {
        settings.api_key = v;
    }
    if let Some(v) = args.base_url {
        settings.base_url = v;
    }
    if let Some(v) = args.max_retries {
        settings.max_retries = v;
    }

    let query = settings.search_query(args.term.as_deref())?;
    let gateway =
        HttpFetchGateway::with_options(settings.retry_policy(), settings.request_timeout())
            .context("failed to build HTTP client")?;
    info!(?query, "search session configured");

    let controller = ListSelectionController::new(Arc::new(gateway), query);

    if args.interactive {
        session::run(controller).await?;
        return Ok(ExitCode::SUCCESS);
    }

    controller.start().await;
    let settled = controller.wait_until_settled().await;

    if let (Some(id), FetchState::Loaded(_)) = (args.select, &settled.state) {
        controller
            .select(&RecordId::from(id))
            .await
            .context("cannot select record")?;
    }

    let snapshot = controller.snapshot().await;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        println!("{}", render::render_snapshot(&snapshot));
    }

    Ok(match snapshot.state {
        FetchState::Failed(_) => ExitCode::FAILURE,
        _ => ExitCode::SUCCESS,
    })
}

#[cfg(test)]
#[path = "tests/cli_tests.rs"]
mod tests;
