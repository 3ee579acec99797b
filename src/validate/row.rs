// src/validate/row.rs
// =============================================================================
// This module turns fetched CSV text into rows and filters out comments.
//
// A row is a mapping from header name to cell value. The first line of each
// CSV file is the header; every later non-blank line becomes one Row.
//
// Rust concepts:
// - HashMap: Column name -> value lookups
// - thiserror: Typed errors for problems inside a single row
// - Iterators: zip() pairs header names with cell values
// =============================================================================

use csv::{ReaderBuilder, Trim};
use std::collections::HashMap;
use thiserror::Error;

/// Any field starting with this character marks the whole row as a comment.
pub const COMMENT_MARKER: char = '#';

// Errors raised while checking a single row
//
// These are recoverable: the reporter logs them and moves on to the next file.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RowError {
    #[error("row has no '{0}' field")]
    MissingField(String),
}

/// One data line of a CSV file, keyed by header name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    fields: HashMap<String, String>,
}

impl Row {
    /// Builds a row from (column, value) pairs. Later duplicates win.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let fields = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self { fields }
    }

    /// Looks up a required field.
    pub fn get(&self, name: &str) -> Result<&str, RowError> {
        self.fields
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| RowError::MissingField(name.to_string()))
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.fields.values().map(String::as_str)
    }
}

// Parses CSV text into rows
//
// Parameters:
//   content: the whole file, header line first
//
// Returns: every data row, including commented ones (filtering is separate)
//
// Short lines leave their trailing columns out of the row; extra cells past
// the header are dropped. Values are kept exactly as written (no trimming).
pub fn parse_csv(content: &str) -> csv::Result<Vec<Row>> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::None)
        .flexible(true) // Allow rows with different lengths
        .from_reader(content.as_bytes());

    let headers = reader.headers()?.clone();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        rows.push(Row::from_pairs(headers.iter().zip(record.iter())));
    }

    Ok(rows)
}

/// True if any field value starts with the comment marker.
pub fn commented(row: &Row) -> bool {
    row.values().any(|v| v.starts_with(COMMENT_MARKER))
}
