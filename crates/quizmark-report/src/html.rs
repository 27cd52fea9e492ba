//! HTML report generator.
//!
//! Produces a single self-contained page: summary figures, a per-question
//! correct-rate chart and the sortable examinee table.

use std::path::Path;

use anyhow::{Context, Result};

use quizmark_core::report::ScoreReport;
use quizmark_core::statistics::QuestionStats;

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Render a score report as an HTML page.
pub fn generate_html(report: &ScoreReport) -> String {
    let stats = &report.statistics;
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str("<title>quizmark report</title>\n");
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    html.push_str("<header>\n");
    html.push_str("<h1>quizmark report</h1>\n");
    html.push_str(&format!(
        "<p class=\"meta\">{} examinees | {} questions | generated {}</p>\n",
        stats.examinees,
        report.question_count,
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    ));
    html.push_str("</header>\n");

    html.push_str("<section class=\"dashboard\">\n");
    html.push_str("<h2>Summary</h2>\n");
    html.push_str("<table class=\"summary\">\n");
    html.push_str("<thead><tr><th>Examinees</th><th>Max attainable</th><th>Mean</th><th>Min</th><th>Max</th></tr></thead>\n");
    html.push_str(&format!(
        "<tbody><tr><td>{}</td><td>{:.1}</td><td>{:.1}</td><td>{:.1}</td><td>{:.1}</td></tr></tbody>\n",
        stats.examinees, stats.max_attainable, stats.mean_total, stats.min_total, stats.max_total,
    ));
    html.push_str("</table>\n");

    if !stats.questions.is_empty() {
        html.push_str("<h2>Correct rate by question</h2>\n");
        html.push_str(&generate_bar_chart(&stats.questions));
    }
    html.push_str("</section>\n");

    html.push_str("<section class=\"results\">\n");
    html.push_str("<h2>Examinees</h2>\n");
    html.push_str("<table id=\"examinees\">\n<thead><tr>");
    let score_col = report.question_count as usize + 1;
    for (col, label) in report.header.iter().enumerate() {
        if col == 0 || col == score_col {
            html.push_str(&format!(
                "<th class=\"sortable\" onclick=\"sortExaminees({col})\">{}</th>",
                html_escape(label)
            ));
        } else {
            html.push_str(&format!("<th>{}</th>", html_escape(label)));
        }
    }
    html.push_str("</tr></thead>\n<tbody>\n");

    for row in &report.rows {
        html.push_str("<tr>");
        html.push_str(&format!("<td>{}</td>", html_escape(row.participant_id.as_str())));
        for mark in &row.marks {
            let class = if mark.is_correct() { "mark-o" } else { "mark-x" };
            html.push_str(&format!("<td class=\"{class}\">{mark}</td>"));
        }
        html.push_str(&format!("<td class=\"total\">{}</td>", row.formatted_total()));
        for value in &row.metadata {
            html.push_str(&format!("<td>{}</td>", html_escape(value)));
        }
        html.push_str("</tr>\n");
    }

    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    html.push_str("<script>\n");
    html.push_str(JS);
    html.push_str("</script>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Write an HTML report to a file.
pub fn write_html_report(report: &ScoreReport, path: &Path) -> Result<()> {
    let html = generate_html(report);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)
        .with_context(|| format!("failed to write HTML report to {}", path.display()))?;
    tracing::debug!(path = %path.display(), "wrote HTML report");
    Ok(())
}

/// One column per question, height proportional to the correct rate.
/// Unkeyed questions get an outlined empty column.
fn generate_bar_chart(questions: &[QuestionStats]) -> String {
    const PLOT_HEIGHT: f64 = 120.0;
    const COLUMN: usize = 22;
    const GAP: usize = 4;
    const AXIS: usize = 16;

    let width = questions.len() * (COLUMN + GAP) + GAP;
    let height = PLOT_HEIGHT as usize + AXIS;
    let mut svg = format!(
        "<svg class=\"rates\" width=\"{width}\" height=\"{height}\" xmlns=\"http://www.w3.org/2000/svg\">\n"
    );

    for (i, q) in questions.iter().enumerate() {
        let x = GAP + i * (COLUMN + GAP);
        let bar = (q.correct_rate.clamp(0.0, 1.0) * PLOT_HEIGHT).round();
        let y = PLOT_HEIGHT - bar;
        if q.keyed {
            svg.push_str(&format!(
                "  <rect x=\"{x}\" y=\"{y}\" width=\"{COLUMN}\" height=\"{bar}\" class=\"bar\"><title>Q{}: {:.1}% ({} correct)</title></rect>\n",
                q.question,
                q.correct_rate * 100.0,
                q.correct
            ));
        } else {
            svg.push_str(&format!(
                "  <rect x=\"{x}\" y=\"0\" width=\"{COLUMN}\" height=\"{PLOT_HEIGHT}\" class=\"unkeyed\"><title>Q{}: no answer key entry</title></rect>\n",
                q.question
            ));
        }
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" text-anchor=\"middle\">{}</text>\n",
            x + COLUMN / 2,
            height - 3,
            q.question
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

const CSS: &str = r#"
body { font-family: system-ui, sans-serif; margin: 2rem; color: #1f2937; }
.meta { color: #6b7280; }
table { border-collapse: collapse; margin: 1rem 0; }
th, td { border: 1px solid #d1d5db; padding: 0.25rem 0.6rem; }
th.sortable { cursor: pointer; text-decoration: underline dotted; }
td.mark-o, td.mark-x { text-align: center; font-family: monospace; }
td.mark-o { background: #dcfce7; }
td.mark-x { background: #fee2e2; }
td.total { text-align: right; font-weight: bold; }
svg.rates text { font-size: 10px; fill: #6b7280; }
svg.rates .bar { fill: #2563eb; }
svg.rates .unkeyed { fill: none; stroke: #9ca3af; stroke-dasharray: 3 2; }
"#;

/// Sorts by examinee id or total; both columns are numeric.
const JS: &str = r#"
function sortExaminees(col) {
  const table = document.getElementById('examinees');
  const tbody = table.tBodies[0];
  const desc = table.dataset.sorted === String(col) && table.dataset.dir !== 'desc';
  const rows = Array.from(tbody.rows);
  rows.sort((a, b) => parseFloat(a.cells[col].textContent) - parseFloat(b.cells[col].textContent));
  if (desc) rows.reverse();
  table.dataset.sorted = col;
  table.dataset.dir = desc ? 'desc' : 'asc';
  rows.forEach(r => tbody.appendChild(r));
}
"#;
