// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Load .env and parse command-line arguments
// 2. Set up logging for this run (log file + console)
// 3. Fetch every CSV file from the repository
// 4. Validate each file, logging warnings for bad rows
// 5. Exit 0 if the run finished, 1 if something fatal stopped it
//
// Validation warnings never change the exit code; they only end up in the log.
// =============================================================================

mod cli;
mod github;
mod logging;
mod validate;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use logging::RunLogger;
use tracing::info;

// Everything runs on one thread, one request at a time
#[tokio::main(flavor = "current_thread")]
async fn main() {
    // A missing .env file is fine, the token can come from the real environment
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let exit_code = match run(&cli).await {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            1
        }
    };

    std::process::exit(exit_code);
}

// Runs one validation pass
//
// The logger is dropped when this returns, which ends logging for the run.
async fn run(cli: &Cli) -> Result<()> {
    let _logger = RunLogger::install(&cli.log_file)?;

    let client = github::GitHubClient::new(
        &cli.api_url,
        &cli.token,
        &cli.org,
        &cli.repo,
        cli.git_ref.clone(),
    )?;

    let repository = client.repository().await?;
    info!("Verifying CSVs stored at {}", repository.html_url);

    let files = github::collect_csv_files(&client, &cli.path).await?;

    validate::validate_files(&files)
}
