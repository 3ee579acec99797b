// src/github/fetch.rs
// =============================================================================
// This module walks a repository tree and collects the CSV files in it.
//
// Strategy:
// - List a directory through the RepoContents trait
// - Recurse into every subdirectory
// - Read every file whose path ends in ".csv"
//
// Each call builds its own map and hands it back to the caller, which merges
// it into its own. Nothing is shared between separate walks.
//
// Rust concepts:
// - Traits: RepoContents lets tests walk an in-memory tree
// - Boxed futures: an async fn can't call itself without boxing
// - BTreeMap: Keeps the collected files sorted by path
// =============================================================================

use anyhow::Result;
use futures::future::{FutureExt, LocalBoxFuture};
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::info;

pub const CSV_EXTENSION: &str = ".csv";

// What a directory listing entry is
//
// GitHub sends this as the "type" field in lowercase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Dir,
    File,
    Symlink,
    Submodule,
    #[serde(other)]
    Other,
}

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ContentEntry {
    #[serde(rename = "type")]
    pub kind: EntryKind,
    /// Full path from the repository root
    pub path: String,
    #[serde(default)]
    pub download_url: Option<String>,
}

/// Read access to a repository's file tree.
#[allow(async_fn_in_trait)]
pub trait RepoContents {
    /// Lists the entries directly inside `path`.
    async fn list_dir(&self, path: &str) -> Result<Vec<ContentEntry>>;

    /// Returns the decoded text of a file entry.
    async fn read_file(&self, entry: &ContentEntry) -> Result<String>;
}

// Collects every CSV file under a path
//
// Parameters:
//   repo: where to read from
//   path: directory to start at ("." or "" for the repository root)
//
// Returns: map of full file path -> file content
//
// Any error listing or reading aborts the walk.
pub async fn collect_csv_files<R: RepoContents>(
    repo: &R,
    path: &str,
) -> Result<BTreeMap<String, String>> {
    collect_files(repo, path, CSV_EXTENSION).await
}

fn collect_files<'a, R: RepoContents>(
    repo: &'a R,
    path: &'a str,
    extension: &'a str,
) -> LocalBoxFuture<'a, Result<BTreeMap<String, String>>> {
    async move {
        let mut files = BTreeMap::new();

        for entry in repo.list_dir(path).await? {
            if entry.kind == EntryKind::Dir {
                let nested = collect_files(repo, &entry.path, extension).await?;
                files.extend(nested);
            } else if entry.path.ends_with(extension) {
                let content = repo.read_file(&entry).await?;
                info!("Found CSV file: {}", entry.path);
                files.insert(entry.path, content);
            }
        }

        Ok(files)
    }
    .boxed_local()
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why can't collect_files just be an `async fn`?
//    - An async fn's future contains the futures of everything it awaits
//    - Calling itself would make that type infinitely large
//    - Boxing the future (boxed_local) gives it a fixed size
//
// 2. Why LocalBoxFuture and not BoxFuture?
//    - BoxFuture requires the future to be Send
//    - We run on a single thread, so Send is never needed
//
// 3. Why return a map instead of filling one passed in?
//    - Each walk starts empty, so two walks can't see each other's files
//    - The caller decides how to merge (here: extend)
// -----------------------------------------------------------------------------
