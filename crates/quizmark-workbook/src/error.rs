//! Workbook reader error types.
//!
//! Any of these aborts a run: without the workbook there is nothing to score.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading an input workbook.
#[derive(Debug, Error)]
pub enum WorkbookError {
    /// The workbook path does not exist.
    #[error("workbook not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The file exists but could not be decoded as a workbook.
    #[error("failed to open workbook {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    /// A required sheet is missing.
    #[error("sheet `{name}` not found in workbook (available: {available})")]
    MissingSheet { name: String, available: String },

    /// A sheet exists but its cells could not be decoded.
    #[error("failed to read sheet `{name}`: {source}")]
    Sheet {
        name: String,
        #[source]
        source: calamine::Error,
    },
}
