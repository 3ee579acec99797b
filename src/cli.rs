// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Every option has a default, so a plain `csv-guardian` with GITHUB_TOKEN
// set (in the environment or a .env file) checks the ingestion CSVs of
// ooi-integration/ingestion-csvs and writes validate_csvs.log.
// =============================================================================

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "csv-guardian",
    version,
    about = "Validate ingestion CSV files stored in a GitHub repository",
    long_about = "csv-guardian fetches every .csv file from a GitHub repository and checks each \
                  row's filename mask, deployment number and ingestion route. Warnings go to \
                  the log file; only errors are printed to the console."
)]
pub struct Cli {
    /// GitHub access token
    ///
    /// Read from GITHUB_TOKEN when not given on the command line
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: String,

    /// Organization that owns the repository
    #[arg(long, default_value = "ooi-integration")]
    pub org: String,

    /// Repository holding the CSV files
    #[arg(long, default_value = "ingestion-csvs")]
    pub repo: String,

    /// Directory to start from ("." is the repository root)
    #[arg(long, default_value = ".")]
    pub path: String,

    /// Branch, tag or commit to read (defaults to the repository's default branch)
    #[arg(long)]
    pub git_ref: Option<String>,

    /// GitHub API root, change this for GitHub Enterprise
    #[arg(long, default_value = "https://api.github.com")]
    pub api_url: String,

    /// Where to write the log (overwritten on every run)
    #[arg(long, default_value = "validate_csvs.log")]
    pub log_file: PathBuf,
}
