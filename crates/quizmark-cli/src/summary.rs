//! Statistics table printed after a run.

use comfy_table::{Cell, Table};

use quizmark_core::report::ScoreReport;

pub fn print_summary(report: &ScoreReport) {
    let stats = &report.statistics;

    let mut table = Table::new();
    table.set_header(vec!["Question", "Points", "Correct", "Correct rate"]);
    for q in &stats.questions {
        let points = if q.keyed {
            format!("{:.1}", q.points)
        } else {
            "unkeyed".to_string()
        };
        table.add_row(vec![
            Cell::new(q.question),
            Cell::new(points),
            Cell::new(format!("{}/{}", q.correct, stats.examinees)),
            Cell::new(format!("{:.1}%", q.correct_rate * 100.0)),
        ]);
    }

    eprintln!("\n{table}");
    eprintln!(
        "Examinees: {} | mean {:.1} | min {:.1} | max {:.1} | out of {:.1}",
        stats.examinees, stats.mean_total, stats.min_total, stats.max_total, stats.max_attainable
    );

    let unsolved: Vec<String> = stats.unsolved().map(|q| q.question.to_string()).collect();
    if !unsolved.is_empty() && stats.examinees > 0 {
        eprintln!("Unsolved questions: {}", unsolved.join(", "));
    }
    if stats.unkeyed_count() > 0 {
        eprintln!(
            "Warning: {} question number(s) have no answer key entry and are always marked X",
            stats.unkeyed_count()
        );
    }
}
