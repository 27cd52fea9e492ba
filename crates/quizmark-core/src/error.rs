//! Error types for the quizmark core.
//!
//! Scanning and scoring never fail: structural anomalies in a sheet are
//! absorbed by the scanners. Errors only arise at the edges, when parsing
//! an address string or loading configuration.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while parsing cell addresses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    /// The address has no leading column letters.
    #[error("cell address `{0}` has no column letters")]
    MissingColumn(String),

    /// The address has no trailing row digits, or a row of zero.
    #[error("cell address `{0}` has no valid row number")]
    InvalidRow(String),

    /// The column letters decode past the supported range.
    #[error("cell address `{0}` has a column out of range")]
    ColumnOutOfRange(String),
}

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An explicitly requested config file does not exist.
    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The config file could not be read.
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML for [`crate::config::QuizmarkConfig`].
    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A field holds a value outside its allowed domain.
    #[error("invalid config value for `{field}`: {message}")]
    Invalid { field: &'static str, message: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            message: message.into(),
        }
    }
}
