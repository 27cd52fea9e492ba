//! quizmark-report — Output writers for score reports.
//!
//! The delimited writer produces the primary report. JSON and HTML are
//! optional companions carrying the same rows plus statistics.

pub mod delimited;
pub mod html;
pub mod json;

pub use delimited::{output_path, write_delimited};
pub use html::write_html_report;
pub use json::write_json_report;
