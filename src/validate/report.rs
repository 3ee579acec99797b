// src/validate/report.rs
// =============================================================================
// Walks every fetched CSV file and logs what the checks found.
//
// Output goes through `tracing`, so where it ends up (log file, console) is
// decided by the logging context installed in main.rs.
//
// Two kinds of failure:
// - A file that isn't valid CSV aborts the whole run (returned as Err)
// - A row that is missing a field is logged, and the rest of that file
//   is skipped
// =============================================================================

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use tracing::{error, info, warn};

use super::row::{commented, parse_csv};
use super::rules::{check_row, RowIssue};

// Line 1 is the header and rows are counted from 1, so index 0 is line 2
const FIRST_DATA_LINE: usize = 2;

/// Validates every file in path order.
pub fn validate_files(files: &BTreeMap<String, String>) -> Result<()> {
    for (path, content) in files {
        validate_file(path, content)?;
    }
    Ok(())
}

// Validates a single CSV file
//
// Parameters:
//   path: repository path, used in log lines
//   content: the decoded file text
//
// Line numbers count non-comment rows only, matching how the files have
// always been reported.
pub fn validate_file(path: &str, content: &str) -> Result<()> {
    info!("");
    info!("Validating CSV file: {}", path);

    let rows = parse_csv(content).with_context(|| format!("Failed to parse CSV file {}", path))?;

    for (index, row) in rows.iter().filter(|row| !commented(row)).enumerate() {
        let line = index + FIRST_DATA_LINE;
        if let Err(e) = check_row(row, |issue| log_issue(path, line, &issue)) {
            error!("{}: line {}: {}", path, line, e);
            break;
        }
    }

    Ok(())
}

fn log_issue(path: &str, line: usize, issue: &RowIssue) {
    match issue {
        RowIssue::NoFilesFound { filename_mask } => {
            warn!("{}: No files found for {} ({}).", line, filename_mask, path);
        }
        RowIssue::MissingDeploymentNumber { filename_mask } => {
            warn!(
                "{}: Can't parse Deployment Number from {} ({}).",
                line, filename_mask, path
            );
        }
        RowIssue::RouteMismatch {
            uframe_route,
            data_source,
        } => {
            warn!(
                "{}: UFrame Route doesn't match Data Source: {}, {}",
                line, uframe_route, data_source
            );
        }
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why `break` on a row error?
//    - A missing column is usually missing for every row of the file
//    - Logging it once and moving on keeps the log readable
//
// 2. What does the closure passed to check_row do?
//    - check_row calls it once per failed check, as soon as it fails
//    - Warnings found before a missing field still get logged
//
// 3. Why does validate_file return Result if row errors are logged?
//    - Row errors are handled here; a file that can't be parsed as CSV
//      at all is passed up with `?` and stops the run
// -----------------------------------------------------------------------------
