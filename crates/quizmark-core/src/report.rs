//! Score report types with delimited rendering and JSON persistence.

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::model::ParticipantId;
use crate::statistics::ReportStatistics;

/// Line terminator appended to every report line.
pub const RECORD_TERMINATOR: &str = "\n";

/// Per-question outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mark {
    #[serde(rename = "O")]
    Correct,
    #[serde(rename = "X")]
    Incorrect,
}

impl Mark {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mark::Correct => "O",
            Mark::Incorrect => "X",
        }
    }

    pub fn is_correct(&self) -> bool {
        matches!(self, Mark::Correct)
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One examinee's line of the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamineeRow {
    pub participant_id: ParticipantId,
    /// One mark per question number, 1 through the report's question count.
    pub marks: Vec<Mark>,
    pub total: f64,
    /// Metadata values in header order, already rendered as text.
    pub metadata: Vec<String>,
}

impl ExamineeRow {
    /// The total as written in the report: exactly one decimal place, ties
    /// rounded away from zero (`2.25` is `2.3`).
    pub fn formatted_total(&self) -> String {
        format!("{:.1}", (self.total * 10.0).round() / 10.0)
    }

    pub fn correct_count(&self) -> usize {
        self.marks.iter().filter(|m| m.is_correct()).count()
    }

    /// All fields of the row in report column order.
    pub fn fields(&self) -> Vec<String> {
        let mut fields = Vec::with_capacity(2 + self.marks.len() + self.metadata.len());
        fields.push(self.participant_id.to_string());
        fields.extend(self.marks.iter().map(|m| m.as_str().to_string()));
        fields.push(self.formatted_total());
        fields.extend(self.metadata.iter().cloned());
        fields
    }
}

/// A complete scoring report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreReport {
    /// Column labels: id, question numbers, total, metadata fields.
    pub header: Vec<String>,
    /// Rows in metadata-sheet order.
    pub rows: Vec<ExamineeRow>,
    /// Highest question number in the answer key.
    pub question_count: u32,
    /// Aggregate figures over the rows.
    pub statistics: ReportStatistics,
}

impl ScoreReport {
    /// Render the header and every row, fields joined by `separator`, each
    /// line ending with the record terminator.
    pub fn to_delimited(&self, separator: &str) -> String {
        let mut out = String::new();
        out.push_str(&self.header.join(separator));
        out.push_str(RECORD_TERMINATOR);
        for row in &self.rows {
            out.push_str(&row.fields().join(separator));
            out.push_str(RECORD_TERMINATOR);
        }
        out
    }

    pub fn row(&self, id: &ParticipantId) -> Option<&ExamineeRow> {
        self.rows.iter().find(|r| &r.participant_id == id)
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: ScoreReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }
}
