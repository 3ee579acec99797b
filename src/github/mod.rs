// src/github/mod.rs
// =============================================================================
// This module handles reading CSV files out of a GitHub repository.
//
// - client: Authenticated GitHub REST API access
// - fetch: Recursive walk that collects every .csv file
// =============================================================================

mod client;
mod fetch;

pub use client::GitHubClient;
pub use fetch::collect_csv_files;
