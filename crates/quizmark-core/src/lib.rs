//! quizmark-core — Sheet scanners, participant filter, and scoring engine.
//!
//! This crate turns three spreadsheet sheets (a raw answer log, participant
//! metadata, and an answer key) into a [`report::ScoreReport`]. It knows
//! nothing about workbook file formats; callers hand it [`grid::CellGrid`]s.

pub mod config;
pub mod engine;
pub mod error;
pub mod filter;
pub mod grid;
pub mod model;
pub mod pipeline;
pub mod report;
pub mod scanner;
pub mod statistics;
