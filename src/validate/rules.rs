// src/validate/rules.rs
// =============================================================================
// The per-row checks.
//
// Each check looks at one row on its own. check_row() runs all of them in a
// fixed order and reports a RowIssue for every check that fails. A missing
// field stops the row with a RowError instead.
// =============================================================================

use glob::MatchOptions;
use std::path::Path;

use super::row::{Row, RowError};

/// Prefixes a deployment segment may start with.
const DEPLOYMENT_PREFIXES: [char; 3] = ['D', 'R', 'X'];
const DEPLOYMENT_SEGMENT_LEN: usize = 6;

// A failed check, with the values needed to describe it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowIssue {
    /// The filename mask matched nothing on the local filesystem
    NoFilesFound { filename_mask: String },
    /// No D/R/X deployment segment could be parsed from the mask
    MissingDeploymentNumber { filename_mask: String },
    /// The route's trailing token differs from the declared data source
    RouteMismatch {
        uframe_route: String,
        data_source: String,
    },
}

/// True if the row's filename mask matches at least one local path.
///
/// This looks at the machine running the check, not at the repository.
/// Wildcards don't match dotfiles unless the mask spells out the dot.
pub fn file_mask_has_files(row: &Row) -> Result<bool, RowError> {
    let mask = row.get("filename_mask")?;
    let options = MatchOptions {
        require_literal_leading_dot: true,
        ..MatchOptions::default()
    };
    let found = match glob::glob_with(mask, options) {
        Ok(paths) => paths.filter_map(Result::ok).next().is_some(),
        // Not a valid pattern (e.g. an unclosed '['): take the mask literally
        Err(_) => Path::new(mask).exists(),
    };
    Ok(found)
}

pub fn file_mask_has_deployment_number(row: &Row) -> Result<bool, RowError> {
    let mask = row.get("filename_mask")?;
    Ok(deployment_number(mask).is_some())
}

// Pulls the deployment number out of a filename mask
//
// Only the first segment shaped like a deployment (6 chars, D/R/X prefix)
// is considered. If its digits don't parse, there is no number even if a
// later segment would have worked.
//
// Example:
//   "foo/D12345/bar" -> Some(12345)
//   "foo/DX1234/bar" -> None
fn deployment_number(mask: &str) -> Option<i64> {
    let segment = mask.split('/').find(|segment| {
        segment.chars().count() == DEPLOYMENT_SEGMENT_LEN
            && segment
                .chars()
                .next()
                .is_some_and(|c| DEPLOYMENT_PREFIXES.contains(&c))
    })?;

    let mut chars = segment.chars();
    chars.next();
    chars.as_str().trim().parse().ok()
}

pub fn ingest_queue_matches_data_source(row: &Row) -> Result<bool, RowError> {
    let route = row.get("uframe_route")?;
    let data_source = row.get("data_source")?;
    // rsplit always yields at least one item, even for an empty route.
    Ok(route.rsplit('_').next() == Some(data_source))
}

// Runs every check against a row
//
// Each failure is handed to `on_issue` as soon as it is found, so issues
// seen before a missing field still get reported. Checks never short-circuit
// on a failure, only on a missing field.
// Order: files, deployment number, route.
pub fn check_row<F>(row: &Row, mut on_issue: F) -> Result<(), RowError>
where
    F: FnMut(RowIssue),
{
    if !file_mask_has_files(row)? {
        on_issue(RowIssue::NoFilesFound {
            filename_mask: row.get("filename_mask")?.to_string(),
        });
    }

    if !file_mask_has_deployment_number(row)? {
        on_issue(RowIssue::MissingDeploymentNumber {
            filename_mask: row.get("filename_mask")?.to_string(),
        });
    }

    if !ingest_queue_matches_data_source(row)? {
        on_issue(RowIssue::RouteMismatch {
            uframe_route: row.get("uframe_route")?.to_string(),
            data_source: row.get("data_source")?.to_string(),
        });
    }

    Ok(())
}
