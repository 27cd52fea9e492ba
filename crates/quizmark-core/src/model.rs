//! Core data model types for quizmark.
//!
//! These are the records the sheet scanners reconstruct and the scoring
//! engine joins: participant metadata, the answer key, and the response log.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::grid::{format_number, CellValue};

/// Question numbers are positive integers.
pub type QuestionNumber = u32;

/// The canonical metadata fields of a participant sheet, in column order B..I.
pub const CANONICAL_METADATA_FIELDS: [&str; 8] = [
    "role",
    "registered_at",
    "name",
    "phone",
    "organization",
    "department",
    "facility",
    "email",
];

/// A participant identifier.
///
/// Ids are integer-valued cells; the id is kept in its canonical rendering so
/// `7`, `7.0` and the text `" 7 "` all name the same participant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    /// Build an id from a cell, if the cell passes the numeric test.
    pub fn from_cell(value: &CellValue) -> Option<Self> {
        value.as_number().map(|n| Self(format_number(n)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u32> for ParticipantId {
    fn from(n: u32) -> Self {
        Self(n.to_string())
    }
}

/// Read a question number from a cell: a numeric value that is a positive integer.
pub fn question_number(value: &CellValue) -> Option<QuestionNumber> {
    let n = value.as_number()?;
    if n >= 1.0 && n.fract() == 0.0 && n <= f64::from(u32::MAX) {
        Some(n as QuestionNumber)
    } else {
        None
    }
}

/// The ordered `(column, header-name)` pairs declared in row 1 of a metadata sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderLayout {
    columns: Vec<(u32, String)>,
}

impl HeaderLayout {
    pub fn new(columns: Vec<(u32, String)>) -> Self {
        let mut columns = columns;
        columns.sort_by_key(|(col, _)| *col);
        columns.dedup_by_key(|(col, _)| *col);
        Self { columns }
    }

    /// Lay the given names out over consecutive columns starting at B.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            names
                .into_iter()
                .enumerate()
                .map(|(i, name)| (i as u32 + 2, name.into()))
                .collect(),
        )
    }

    /// The eight-field layout used when a sheet declares no headers.
    pub fn canonical() -> Self {
        Self::from_names(CANONICAL_METADATA_FIELDS)
    }

    pub fn name_for(&self, column: u32) -> Option<&str> {
        self.columns
            .iter()
            .find(|(col, _)| *col == column)
            .map(|(_, name)| name.as_str())
    }

    /// Header names in column order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(_, name)| name.as_str())
    }

    /// Distinct header names in column order; a repeated name keeps its first slot.
    pub fn distinct_names(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for name in self.names() {
            if !seen.contains(&name) {
                seen.push(name);
            }
        }
        seen
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// One participant's metadata, in the order the attributes were written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantRecord {
    pub id: ParticipantId,
    pub attributes: Vec<(String, CellValue)>,
}

impl ParticipantRecord {
    pub fn new(id: ParticipantId) -> Self {
        Self {
            id,
            attributes: Vec::new(),
        }
    }

    /// Set an attribute; a repeated name overwrites the value in place.
    pub fn set(&mut self, name: &str, value: CellValue) {
        match self.attributes.iter_mut().find(|(n, _)| n == name) {
            Some((_, slot)) => *slot = value,
            None => self.attributes.push((name.to_string(), value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&CellValue> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }
}

/// All participant records of a metadata sheet, in scan order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParticipantTable {
    pub layout: HeaderLayout,
    records: Vec<ParticipantRecord>,
    index: HashMap<ParticipantId, usize>,
}

impl ParticipantTable {
    pub fn new(layout: HeaderLayout) -> Self {
        Self {
            layout,
            records: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Open a record. Re-opening an existing id clears its attributes but keeps
    /// its original position.
    pub fn open(&mut self, id: ParticipantId) {
        match self.index.get(&id) {
            Some(&i) => self.records[i].attributes.clear(),
            None => {
                self.index.insert(id.clone(), self.records.len());
                self.records.push(ParticipantRecord::new(id));
            }
        }
    }

    pub fn get(&self, id: &ParticipantId) -> Option<&ParticipantRecord> {
        self.index.get(id).map(|&i| &self.records[i])
    }

    pub fn get_mut(&mut self, id: &ParticipantId) -> Option<&mut ParticipantRecord> {
        match self.index.get(id) {
            Some(&i) => self.records.get_mut(i),
            None => None,
        }
    }

    /// Records in the order their ids first appeared.
    pub fn records(&self) -> impl Iterator<Item = &ParticipantRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// The expected answer and point value of one question.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnswerKeyEntry {
    pub answer: Option<CellValue>,
    pub score: Option<CellValue>,
}

impl AnswerKeyEntry {
    /// Points awarded for a correct answer. A missing or non-numeric score is worth nothing.
    pub fn points(&self) -> f64 {
        self.score
            .as_ref()
            .and_then(CellValue::as_number)
            .unwrap_or(0.0)
    }

    /// Typed comparison against a submitted value.
    pub fn accepts(&self, submitted: &CellValue) -> bool {
        self.answer.as_ref() == Some(submitted)
    }
}

/// The answer key, keyed by question number.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnswerKey {
    entries: BTreeMap<QuestionNumber, AnswerKeyEntry>,
}

impl AnswerKey {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open (or reset) the entry for a question.
    pub fn open(&mut self, question: QuestionNumber) {
        self.entries.insert(question, AnswerKeyEntry::default());
    }

    pub fn get(&self, question: QuestionNumber) -> Option<&AnswerKeyEntry> {
        self.entries.get(&question)
    }

    pub fn get_mut(&mut self, question: QuestionNumber) -> Option<&mut AnswerKeyEntry> {
        self.entries.get_mut(&question)
    }

    /// Highest question number in the key, or 0 for an empty key.
    pub fn max_question(&self) -> QuestionNumber {
        self.entries.keys().next_back().copied().unwrap_or(0)
    }

    /// Sum of points over every entry.
    pub fn total_points(&self) -> f64 {
        self.entries.values().map(AnswerKeyEntry::points).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (QuestionNumber, &AnswerKeyEntry)> {
        self.entries.iter().map(|(q, e)| (*q, e))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Submitted answers: participant id → question number → value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseLog {
    submissions: HashMap<ParticipantId, BTreeMap<QuestionNumber, CellValue>>,
}

impl ResponseLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sure a participant has an (possibly empty) submission map.
    pub fn touch(&mut self, id: &ParticipantId) {
        self.submissions.entry(id.clone()).or_default();
    }

    pub fn record(&mut self, id: &ParticipantId, question: QuestionNumber, value: CellValue) {
        self.submissions
            .entry(id.clone())
            .or_default()
            .insert(question, value);
    }

    /// The submitted answer, or `None` when nothing was recorded.
    pub fn answer(&self, id: &ParticipantId, question: QuestionNumber) -> Option<&CellValue> {
        self.submissions.get(id).and_then(|m| m.get(&question))
    }

    pub fn answers_for(
        &self,
        id: &ParticipantId,
    ) -> Option<&BTreeMap<QuestionNumber, CellValue>> {
        self.submissions.get(id)
    }

    pub fn participant_count(&self) -> usize {
        self.submissions.len()
    }

    pub fn submission_count(&self) -> usize {
        self.submissions.values().map(BTreeMap::len).sum()
    }
}
