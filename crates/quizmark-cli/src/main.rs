//! quizmark CLI — score an exam workbook into a delimited report.

use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

mod run;
mod summary;

#[derive(Parser)]
#[command(
    name = "quizmark",
    version,
    about = "Score a three-sheet exam workbook into a delimited report"
)]
struct Cli {
    /// Input workbook (xlsx, xls, xlsb or ods)
    #[arg(default_value = "input.xlsx")]
    input: PathBuf,

    /// Output base name; the configured extension is appended
    #[arg(default_value = "output")]
    output: PathBuf,

    /// Config file path (default: ./quizmark.toml if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Which reports to write
    #[arg(long, value_enum, default_value_t = OutputFormat::Delimited)]
    format: OutputFormat,

    /// Column separator, e.g. "," or "tab" (overrides config)
    #[arg(long)]
    separator: Option<String>,

    /// Do not print the statistics table
    #[arg(long)]
    no_summary: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Delimited,
    Json,
    Html,
    All,
}

impl OutputFormat {
    pub fn delimited(self) -> bool {
        matches!(self, OutputFormat::Delimited | OutputFormat::All)
    }

    pub fn json(self) -> bool {
        matches!(self, OutputFormat::Json | OutputFormat::All)
    }

    pub fn html(self) -> bool {
        matches!(self, OutputFormat::Html | OutputFormat::All)
    }
}

fn main() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("quizmark=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = run::execute(run::RunArgs {
        input: cli.input,
        output: cli.output,
        config: cli.config,
        format: cli.format,
        separator: cli.separator,
        summary: !cli.no_summary,
    });

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
