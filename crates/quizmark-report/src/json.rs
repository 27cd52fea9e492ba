//! JSON report writer.

use std::path::Path;

use anyhow::Result;

use quizmark_core::report::ScoreReport;

/// Write the report, statistics included, as pretty-printed JSON.
pub fn write_json_report(report: &ScoreReport, path: &Path) -> Result<()> {
    report.save_json(path)?;
    tracing::debug!(path = %path.display(), "wrote JSON report");
    Ok(())
}
