//! Delimited text report writer.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use quizmark_core::report::ScoreReport;

/// Append `extension` to `base`. An empty extension leaves `base` unchanged.
///
/// The extension is appended rather than substituted: `results.v2` with
/// `xls` becomes `results.v2.xls`.
pub fn output_path(base: &Path, extension: &str) -> PathBuf {
    let extension = extension.trim_start_matches('.');
    if extension.is_empty() {
        return base.to_path_buf();
    }
    let mut name = OsString::from(base.as_os_str());
    name.push(".");
    name.push(extension);
    PathBuf::from(name)
}

/// Write the report as delimited text.
///
/// The text is rendered in full before the file is touched, so a failed
/// render leaves no partial output behind.
pub fn write_delimited(report: &ScoreReport, path: &Path, separator: &str) -> Result<()> {
    let text = report.to_delimited(separator);
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }
    std::fs::write(path, &text)
        .with_context(|| format!("failed to write report to {}", path.display()))?;
    tracing::debug!(
        path = %path.display(),
        bytes = text.len(),
        rows = report.rows.len(),
        "wrote delimited report"
    );
    Ok(())
}
