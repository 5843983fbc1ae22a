mod cli;
mod sources;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::ProgressBar;
use log::{error, info};
use tiledump_db::{DocumentFetcher, DocumentRepository, RunError, RunSummary, initialize_db};

use crate::cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();

    info!("Starting tiledump...");

    let ids = sources::ids_for(&cli.command)?;

    if ids.as_ref().is_some_and(Vec::is_empty) {
        info!("No ids to process.");
        return Ok(());
    }

    let store = initialize_db(&cli.store.config())
        .await
        .context("Failed to initialize document store")?;

    let result = process(&store, &cli, ids).await;
    store.close().await;

    let summary = result?;
    info!(
        "tiledump finished: {} written, {} missing.",
        summary.written.len(),
        summary.missing.len()
    );
    Ok(())
}

async fn process(
    store: &DocumentRepository,
    cli: &Cli,
    ids: Option<Vec<String>>,
) -> Result<RunSummary> {
    let fetcher = DocumentFetcher::new(store, &cli.debug_root).with_miss_policy(cli.on_missing);
    info!("Writing documents under {}", fetcher.debug_root().display());

    let result = match (&cli.command, ids) {
        (Command::Path { local_path, file_name }, _) => {
            let progress = ProgressBar::new(1);
            let result = fetcher.run_path(local_path, file_name, &progress).await;
            progress.finish_and_clear();
            result
        }
        (_, Some(ids)) => {
            let progress = ProgressBar::new(ids.len() as u64);
            let result = fetcher.run(&ids, &progress).await;
            progress.finish_and_clear();
            result
        }
        (_, None) => Ok(RunSummary::default()),
    };

    result
        .inspect_err(|e: &RunError| error!("Run aborted: {e}"))
        .context("Failed to dump documents")
}
