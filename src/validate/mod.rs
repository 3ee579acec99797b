// src/validate/mod.rs
// =============================================================================
// This module contains all CSV validation logic.
//
// Submodules:
// - row: Parses CSV text into rows and spots commented-out rows
// - rules: The individual per-row checks
// - report: Runs the checks over each file and logs the results
// =============================================================================

mod report;
mod row;
mod rules;

pub use report::validate_files;
