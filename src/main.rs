mod api_client;
mod app;
mod cli;
mod config;
mod error;
mod logging;
mod scanner;
mod shutdown;
mod types;
mod worker;

use std::time::Instant;

use clap::Parser;
use tracing::info;

use cli::Cli;
use config::ParseConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_start = Instant::now();

    // .env in the working directory, if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let config = ParseConfig::from_env()?;

    info!(
        inputs = ?cli.input,
        format = ?cli.format,
        output = ?cli.output,
        workers = cli.workers,
        base_url = %config.base_url,
        "Starting pdf2x"
    );

    let scan_start = Instant::now();
    let scan_result = scanner::scan_inputs(
        &cli.input,
        cli.recursive,
        cli.output.as_deref(),
        cli.format,
        cli.force,
    )?;
    let scan_elapsed = scan_start.elapsed();

    info!(
        found = scan_result.total_found,
        queued = scan_result.queue.len(),
        skipped = scan_result.skipped,
        scan_ms = scan_elapsed.as_millis() as u64,
        "Scan complete"
    );

    app::run(
        scan_result.queue,
        scan_result.files,
        scan_result.total_found,
        scan_result.skipped,
        cli.workers as usize,
        cli.format,
        &config,
        app_start,
    )
    .await?;

    Ok(())
}
