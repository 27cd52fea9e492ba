//! The scan-then-score pipeline over the three sheets of an exam workbook.

use crate::config::QuizmarkConfig;
use crate::engine::{ScoringEngine, ScoringInput};
use crate::filter::collect_participant_ids;
use crate::grid::CellGrid;
use crate::report::ScoreReport;
use crate::scanner::{header_layout, scan_answer_key, scan_participants, scan_responses};

/// Borrowed grids for the three input sheets.
#[derive(Debug, Clone, Copy)]
pub struct ExamSheets<'a> {
    pub responses: &'a CellGrid,
    pub participants: &'a CellGrid,
    pub answer_key: &'a CellGrid,
}

/// Run the scanners and the participant filter, then score.
///
/// Each scan only reads its own grid, so the order here is not significant.
pub fn score_sheets(sheets: ExamSheets<'_>, config: &QuizmarkConfig) -> ScoreReport {
    let options = config.scan_options();

    let layout = header_layout(sheets.participants, &config.fallback_layout());
    let participants = scan_participants(sheets.participants, layout, &options);
    let answer_key = scan_answer_key(sheets.answer_key, &options);
    let responses = scan_responses(sheets.responses, &options);
    let participant_ids = collect_participant_ids(sheets.responses);

    tracing::info!(
        participants = participants.len(),
        questions = answer_key.len(),
        respondents = participant_ids.len(),
        submissions = responses.submission_count(),
        "scanned workbook"
    );

    ScoringEngine::new(config.report_layout()).score(&ScoringInput {
        participants: &participants,
        answer_key: &answer_key,
        responses: &responses,
        participant_ids: &participant_ids,
    })
}
