//! The scoring run: config, workbook, scoring, report files.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};

use quizmark_core::config::{load_config_from, parse_separator};
use quizmark_core::pipeline::score_sheets;
use quizmark_report::{output_path, write_delimited, write_html_report, write_json_report};
use quizmark_workbook::load_exam_workbook;

use crate::summary::print_summary;
use crate::OutputFormat;

pub struct RunArgs {
    pub input: PathBuf,
    pub output: PathBuf,
    pub config: Option<PathBuf>,
    pub format: OutputFormat,
    pub separator: Option<String>,
    pub summary: bool,
}

pub fn execute(args: RunArgs) -> Result<()> {
    let started = Instant::now();

    let mut config = load_config_from(args.config.as_deref())?;
    if let Some(sep) = &args.separator {
        config.separator = parse_separator(sep);
        config.validate()?;
    }
    tracing::debug!(
        separator = ?config.separator,
        extension = config.extension(),
        policy = ?config.boundary_policy,
        "effective configuration"
    );

    let exam = load_exam_workbook(&args.input, &config.sheets)
        .with_context(|| format!("failed to load {}", args.input.display()))?;
    let report = score_sheets(exam.sheets(), &config);

    let mut written: Vec<PathBuf> = Vec::new();
    if args.format.delimited() {
        let path = output_path(&args.output, config.extension());
        write_delimited(&report, &path, &config.separator)?;
        written.push(path);
    }
    if args.format.json() {
        let path = output_path(&args.output, "json");
        write_json_report(&report, &path)?;
        written.push(path);
    }
    if args.format.html() {
        let path = output_path(&args.output, "html");
        write_html_report(&report, &path)?;
        written.push(path);
    }

    if args.summary {
        print_summary(&report);
    }

    let elapsed = started.elapsed().as_secs_f64();
    for path in &written {
        announce(path, report.rows.len(), elapsed);
    }
    Ok(())
}

fn announce(path: &Path, examinees: usize, elapsed: f64) {
    println!(
        "Wrote {} ({examinees} examinees) in {elapsed:.2}s",
        path.display()
    );
}
