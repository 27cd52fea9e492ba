//! Aggregate statistics over a scored report.

use serde::{Deserialize, Serialize};

use crate::model::{AnswerKey, QuestionNumber};
use crate::report::ExamineeRow;

/// How one question fared across all examinees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionStats {
    pub question: QuestionNumber,
    /// False when the answer key has no entry for this number.
    pub keyed: bool,
    pub points: f64,
    pub correct: usize,
    /// Share of examinees who got it right, 0.0..=1.0.
    pub correct_rate: f64,
}

/// Aggregate figures for a report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportStatistics {
    pub examinees: usize,
    /// Sum of points over the whole answer key.
    pub max_attainable: f64,
    pub mean_total: f64,
    pub min_total: f64,
    pub max_total: f64,
    pub questions: Vec<QuestionStats>,
}

impl ReportStatistics {
    /// Questions nobody answered correctly, among keyed ones.
    pub fn unsolved(&self) -> impl Iterator<Item = &QuestionStats> {
        self.questions.iter().filter(|q| q.keyed && q.correct == 0)
    }

    pub fn unkeyed_count(&self) -> usize {
        self.questions.iter().filter(|q| !q.keyed).count()
    }
}

/// Compute statistics for scored rows against the answer key that produced them.
pub fn compute_statistics(rows: &[ExamineeRow], key: &AnswerKey) -> ReportStatistics {
    let question_count = key.max_question();
    let examinees = rows.len();

    let questions = (1..=question_count)
        .map(|q| {
            let entry = key.get(q);
            let correct = rows
                .iter()
                .filter(|r| {
                    r.marks
                        .get(q as usize - 1)
                        .is_some_and(|m| m.is_correct())
                })
                .count();
            QuestionStats {
                question: q,
                keyed: entry.is_some(),
                points: entry.map(|e| e.points()).unwrap_or(0.0),
                correct,
                correct_rate: ratio(correct, examinees),
            }
        })
        .collect();

    let (min_total, max_total, sum) = rows.iter().fold(
        (f64::INFINITY, f64::NEG_INFINITY, 0.0),
        |(lo, hi, sum), r| (lo.min(r.total), hi.max(r.total), sum + r.total),
    );

    if examinees == 0 {
        return ReportStatistics {
            examinees,
            max_attainable: key.total_points(),
            questions,
            ..ReportStatistics::default()
        };
    }

    ReportStatistics {
        examinees,
        max_attainable: key.total_points(),
        mean_total: sum / examinees as f64,
        min_total,
        max_total,
        questions,
    }
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}
