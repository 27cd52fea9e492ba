//! Configuration loading.
//!
//! Every field has a default, so an absent config file is fine. Search order:
//! 1. An explicit path (must exist)
//! 2. `quizmark.toml` in the current directory
//! 3. Built-in defaults
//!
//! `QUIZMARK_SEPARATOR` overrides the separator from any source.

use std::path::{Path, PathBuf};

use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};

use crate::engine::ReportLayout;
use crate::error::ConfigError;
use crate::model::{HeaderLayout, CANONICAL_METADATA_FIELDS};
use crate::scanner::{BoundaryPolicy, ScanOptions};

/// File name looked up in the current directory.
pub const CONFIG_FILE_NAME: &str = "quizmark.toml";

/// Environment variable overriding the column separator.
pub const SEPARATOR_ENV: &str = "QUIZMARK_SEPARATOR";

/// Names of the three sheets in the input workbook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetNames {
    /// Raw answer log: participant id, question number, submitted answer.
    pub responses: String,
    /// Participant metadata with row-1 headers.
    pub participants: String,
    /// Answer key: question number, correct answer, points.
    pub answer_key: String,
}

impl Default for SheetNames {
    fn default() -> Self {
        Self {
            responses: "raw_data".to_string(),
            participants: "user_info".to_string(),
            answer_key: "item_info".to_string(),
        }
    }
}

/// Top-level quizmark configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizmarkConfig {
    /// Column separator of the delimited report.
    #[serde(default = "default_separator")]
    pub separator: String,
    /// Extension appended to the output base name.
    #[serde(default = "default_extension")]
    pub output_extension: String,
    #[serde(default)]
    pub sheets: SheetNames,
    /// Label of the first report column.
    #[serde(default = "default_id_header")]
    pub id_header: String,
    /// Label of the total-score column.
    #[serde(default = "default_score_header")]
    pub score_header: String,
    /// Submitted value that marks a voided submission.
    #[serde(default = "default_sentinel")]
    pub discard_sentinel: f64,
    #[serde(default)]
    pub boundary_policy: BoundaryPolicy,
    /// chrono format string for date cells; unset keeps the serial number.
    #[serde(default)]
    pub date_format: Option<String>,
    /// Metadata field names used when the participant sheet has no header row.
    #[serde(default = "default_metadata_fields")]
    pub metadata_fields: Vec<String>,
}

fn default_separator() -> String {
    "\t".to_string()
}
fn default_extension() -> String {
    "xls".to_string()
}
fn default_id_header() -> String {
    "userId".to_string()
}
fn default_score_header() -> String {
    "score".to_string()
}
fn default_sentinel() -> f64 {
    -1.0
}
fn default_metadata_fields() -> Vec<String> {
    CANONICAL_METADATA_FIELDS
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for QuizmarkConfig {
    fn default() -> Self {
        Self {
            separator: default_separator(),
            output_extension: default_extension(),
            sheets: SheetNames::default(),
            id_header: default_id_header(),
            score_header: default_score_header(),
            discard_sentinel: default_sentinel(),
            boundary_policy: BoundaryPolicy::default(),
            date_format: None,
            metadata_fields: default_metadata_fields(),
        }
    }
}

impl QuizmarkConfig {
    /// Parse a TOML string (useful for testing).
    pub fn from_toml_str(content: &str, source_path: &Path) -> Result<Self, ConfigError> {
        let config: QuizmarkConfig =
            toml::from_str(content).map_err(|source| ConfigError::Parse {
                path: source_path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every field is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.separator.is_empty() {
            return Err(ConfigError::invalid("separator", "must not be empty"));
        }
        if self.separator.contains(['\n', '\r']) {
            return Err(ConfigError::invalid(
                "separator",
                "must not contain a line break",
            ));
        }
        if self.output_extension.contains(['/', '\\']) {
            return Err(ConfigError::invalid(
                "output_extension",
                "must not contain a path separator",
            ));
        }
        if !self.discard_sentinel.is_finite() {
            return Err(ConfigError::invalid(
                "discard_sentinel",
                "must be a finite number",
            ));
        }
        if let Some(fmt) = &self.date_format {
            if StrftimeItems::new(fmt).any(|item| matches!(item, Item::Error)) {
                return Err(ConfigError::invalid(
                    "date_format",
                    format!("`{fmt}` is not a valid strftime format"),
                ));
            }
        }
        Ok(())
    }

    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            boundary_policy: self.boundary_policy,
            sentinel: self.discard_sentinel,
        }
    }

    pub fn report_layout(&self) -> ReportLayout {
        ReportLayout {
            id_header: self.id_header.clone(),
            score_header: self.score_header.clone(),
            date_format: self.date_format.clone(),
        }
    }

    /// Layout for a participant sheet that declares no headers.
    pub fn fallback_layout(&self) -> HeaderLayout {
        HeaderLayout::from_names(self.metadata_fields.iter().cloned())
    }

    /// The extension without a leading dot; empty means none.
    pub fn extension(&self) -> &str {
        self.output_extension.trim_start_matches('.')
    }
}

/// Turn a user-facing separator spelling into the literal separator.
///
/// Accepts `\t`, `tab`, `comma`, `semicolon`, `pipe`, or any literal string.
pub fn parse_separator(raw: &str) -> String {
    match raw {
        "\\t" | "tab" | "TAB" => "\t".to_string(),
        "comma" => ",".to_string(),
        "semicolon" => ";".to_string(),
        "pipe" => "|".to_string(),
        other => other.to_string(),
    }
}

/// Load configuration from the default locations.
pub fn load_config() -> Result<QuizmarkConfig, ConfigError> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<QuizmarkConfig, ConfigError> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => return Err(ConfigError::NotFound(p.to_path_buf())),
        None => {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            local.exists().then_some(local)
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
                path: path.clone(),
                source,
            })?;
            tracing::debug!(path = %path.display(), "loaded config");
            QuizmarkConfig::from_toml_str(&content, &path)?
        }
        None => QuizmarkConfig::default(),
    };

    if let Ok(sep) = std::env::var(SEPARATOR_ENV) {
        config.separator = parse_separator(&sep);
        config.validate()?;
    }

    Ok(config)
}
