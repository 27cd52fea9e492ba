//! Scoring engine.
//!
//! Joins participant metadata, the answer key and the response log into a
//! [`ScoreReport`]: one row per participant that appears both in the metadata
//! sheet and in the response log's id column.

use crate::filter::ParticipantIdSet;
use crate::grid::CellValue;
use crate::model::{AnswerKey, ParticipantRecord, ParticipantTable, ResponseLog};
use crate::report::{ExamineeRow, Mark, ScoreReport};
use crate::statistics::compute_statistics;

/// Stand-in for a question the participant never answered.
pub const NO_RESPONSE: CellValue = CellValue::Number(0.0);

/// Labels and rendering options for the report columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLayout {
    /// Label of the first column.
    pub id_header: String,
    /// Label of the total-score column.
    pub score_header: String,
    /// chrono format for date cells in metadata; `None` keeps the serial.
    pub date_format: Option<String>,
}

impl Default for ReportLayout {
    fn default() -> Self {
        Self {
            id_header: "userId".to_string(),
            score_header: "score".to_string(),
            date_format: None,
        }
    }
}

/// Everything the engine joins.
#[derive(Debug, Clone, Copy)]
pub struct ScoringInput<'a> {
    pub participants: &'a ParticipantTable,
    pub answer_key: &'a AnswerKey,
    pub responses: &'a ResponseLog,
    pub participant_ids: &'a ParticipantIdSet,
}

/// Produces score reports.
#[derive(Debug, Clone, Default)]
pub struct ScoringEngine {
    layout: ReportLayout,
}

impl ScoringEngine {
    pub fn new(layout: ReportLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &ReportLayout {
        &self.layout
    }

    /// Score every qualifying participant, in metadata-sheet order.
    pub fn score(&self, input: &ScoringInput<'_>) -> ScoreReport {
        let question_count = input.answer_key.max_question();
        if question_count == 0 {
            tracing::warn!("answer key is empty; rows will carry no question columns");
        }

        let fields = input.participants.layout.distinct_names();
        let header = self.header(question_count, &fields);

        let mut excluded = 0usize;
        let rows: Vec<ExamineeRow> = input
            .participants
            .records()
            .filter(|record| {
                let keep = input.participant_ids.contains(&record.id);
                if !keep {
                    tracing::debug!(participant = %record.id, "not in response log, no report row");
                    excluded += 1;
                }
                keep
            })
            .map(|record| self.score_row(record, input, question_count, &fields))
            .collect();

        tracing::info!(
            rows = rows.len(),
            excluded,
            questions = question_count,
            "scored participants"
        );

        let statistics = compute_statistics(&rows, input.answer_key);
        ScoreReport {
            header,
            rows,
            question_count,
            statistics,
        }
    }

    fn header(&self, question_count: u32, fields: &[&str]) -> Vec<String> {
        let mut header = Vec::with_capacity(question_count as usize + fields.len() + 2);
        header.push(self.layout.id_header.clone());
        header.extend((1..=question_count).map(|q| q.to_string()));
        header.push(self.layout.score_header.clone());
        header.extend(fields.iter().map(|f| f.to_string()));
        header
    }

    fn score_row(
        &self,
        record: &ParticipantRecord,
        input: &ScoringInput<'_>,
        question_count: u32,
        fields: &[&str],
    ) -> ExamineeRow {
        let no_response = NO_RESPONSE;
        let mut total = 0.0;
        let marks = (1..=question_count)
            .map(|q| {
                let Some(entry) = input.answer_key.get(q) else {
                    return Mark::Incorrect;
                };
                let submitted = input
                    .responses
                    .answer(&record.id, q)
                    .unwrap_or(&no_response);
                if entry.accepts(submitted) {
                    total += entry.points();
                    Mark::Correct
                } else {
                    Mark::Incorrect
                }
            })
            .collect();

        let date_format = self.layout.date_format.as_deref();
        let metadata = fields
            .iter()
            .map(|field| {
                record
                    .get(field)
                    .map(|v| v.render(date_format))
                    .unwrap_or_default()
            })
            .collect();

        ExamineeRow {
            participant_id: record.id.clone(),
            marks,
            total,
            metadata,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{HeaderLayout, ParticipantId};

    fn n(x: f64) -> CellValue {
        CellValue::Number(x)
    }

    fn key(entries: &[(u32, f64, f64)]) -> AnswerKey {
        let mut key = AnswerKey::new();
        for &(q, answer, score) in entries {
            key.open(q);
            let e = key.get_mut(q).unwrap();
            e.answer = Some(n(answer));
            e.score = Some(n(score));
        }
        key
    }

    fn participants(ids: &[u32]) -> ParticipantTable {
        let mut table = ParticipantTable::new(HeaderLayout::from_names(["name"]));
        for &id in ids {
            let pid = ParticipantId::from(id);
            table.open(pid.clone());
            table
                .get_mut(&pid)
                .unwrap()
                .set("name", CellValue::from(format!("p{id}")));
        }
        table
    }

    #[test]
    fn scores_example_row() {
        let key = key(&[(1, 2.0, 5.0), (2, 1.0, 3.0)]);
        let table = participants(&[7]);
        let mut log = ResponseLog::new();
        let seven = ParticipantId::from(7);
        log.record(&seven, 1, n(2.0));
        log.record(&seven, 2, n(4.0));
        let ids: ParticipantIdSet = [seven.clone()].into_iter().collect();

        let report = ScoringEngine::default().score(&ScoringInput {
            participants: &table,
            answer_key: &key,
            responses: &log,
            participant_ids: &ids,
        });

        assert_eq!(report.header, vec!["userId", "1", "2", "score", "name"]);
        assert_eq!(report.to_delimited("\t").lines().nth(1), Some("7\tO\tX\t5.0\tp7"));
    }

    #[test]
    fn absent_from_id_set_means_no_row() {
        let key = key(&[(1, 2.0, 5.0)]);
        let table = participants(&[7, 9]);
        let ids: ParticipantIdSet = [ParticipantId::from(7)].into_iter().collect();

        let report = ScoringEngine::default().score(&ScoringInput {
            participants: &table,
            answer_key: &key,
            responses: &ResponseLog::new(),
            participant_ids: &ids,
        });
        assert_eq!(report.rows.len(), 1);
        assert!(report.row(&ParticipantId::from(9)).is_none());
    }

    #[test]
    fn gaps_in_key_occupy_columns_and_never_score() {
        let key = key(&[(1, 1.0, 1.0), (4, 1.0, 1.0)]);
        let table = participants(&[1]);
        let one = ParticipantId::from(1);
        let mut log = ResponseLog::new();
        for q in 1..=4 {
            log.record(&one, q, n(1.0));
        }
        let ids: ParticipantIdSet = [one.clone()].into_iter().collect();

        let report = ScoringEngine::default().score(&ScoringInput {
            participants: &table,
            answer_key: &key,
            responses: &log,
            participant_ids: &ids,
        });
        assert_eq!(report.question_count, 4);
        let row = report.row(&one).unwrap();
        assert_eq!(
            row.marks,
            vec![Mark::Correct, Mark::Incorrect, Mark::Incorrect, Mark::Correct]
        );
        assert_eq!(row.total, 2.0);
    }

    #[test]
    fn no_responses_still_gets_full_row() {
        let key = key(&[(1, 2.0, 5.0), (2, 3.0, 5.0)]);
        let table = participants(&[3]);
        let ids: ParticipantIdSet = [ParticipantId::from(3)].into_iter().collect();

        let report = ScoringEngine::default().score(&ScoringInput {
            participants: &table,
            answer_key: &key,
            responses: &ResponseLog::new(),
            participant_ids: &ids,
        });
        let line = report.to_delimited(",");
        assert_eq!(line.lines().nth(1), Some("3,X,X,0.0,p3"));
    }

    #[test]
    fn comparison_is_typed() {
        let key = key(&[(1, 2.0, 1.0)]);
        let table = participants(&[1]);
        let one = ParticipantId::from(1);
        let mut log = ResponseLog::new();
        log.record(&one, 1, CellValue::from("2"));
        let ids: ParticipantIdSet = [one.clone()].into_iter().collect();

        let report = ScoringEngine::default().score(&ScoringInput {
            participants: &table,
            answer_key: &key,
            responses: &log,
            participant_ids: &ids,
        });
        assert_eq!(report.row(&one).unwrap().marks, vec![Mark::Incorrect]);
    }

    #[test]
    fn missing_metadata_cell_keeps_alignment() {
        let key = key(&[(1, 2.0, 1.0)]);
        let mut table = ParticipantTable::new(HeaderLayout::from_names(["role", "name"]));
        let one = ParticipantId::from(1);
        table.open(one.clone());
        table.get_mut(&one).unwrap().set("name", CellValue::from("Han"));
        let ids: ParticipantIdSet = [one.clone()].into_iter().collect();

        let report = ScoringEngine::default().score(&ScoringInput {
            participants: &table,
            answer_key: &key,
            responses: &ResponseLog::new(),
            participant_ids: &ids,
        });
        assert_eq!(report.row(&one).unwrap().metadata, vec!["", "Han"]);
    }

    #[test]
    fn custom_labels_and_date_format() {
        let key = key(&[(1, 2.0, 1.0)]);
        let mut table = ParticipantTable::new(HeaderLayout::from_names(["registered_at"]));
        let one = ParticipantId::from(1);
        table.open(one.clone());
        table
            .get_mut(&one)
            .unwrap()
            .set("registered_at", CellValue::DateTime(44259.5));
        let ids: ParticipantIdSet = [one.clone()].into_iter().collect();

        let engine = ScoringEngine::new(ReportLayout {
            id_header: "id".into(),
            score_header: "total".into(),
            date_format: Some("%Y-%m-%d".into()),
        });
        let report = engine.score(&ScoringInput {
            participants: &table,
            answer_key: &key,
            responses: &ResponseLog::new(),
            participant_ids: &ids,
        });
        assert_eq!(report.header, vec!["id", "1", "total", "registered_at"]);
        assert_eq!(report.row(&one).unwrap().metadata, vec!["2021-03-04"]);
    }
}
