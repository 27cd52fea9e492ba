//! quizmark-workbook — Spreadsheet reader for quizmark.
//!
//! Decodes a workbook file (xlsx, xls, xlsb, ods) with calamine and exposes
//! each sheet as a [`quizmark_core::grid::CellGrid`].

pub mod error;
pub mod reader;

pub use error::WorkbookError;
pub use reader::{load_exam_workbook, open_workbook, ExamWorkbook, WorkbookSheets};
