//! Sheet scanners.
//!
//! Each scanner makes one pass over a sheet in scan order (row by row, left
//! to right) and rebuilds a record collection with an explicit state machine:
//!
//! ```text
//!                 numeric A cell
//!   AwaitingRecord ─────────────▶ InRecord(key) ◀─┐ numeric A cell (reopen)
//!        ▲                            │  │        │
//!        │ non-numeric A cell         │  └────────┘
//!        └── (CloseRecord policy) ────┘
//! ```
//!
//! Under the default [`BoundaryPolicy::RetainCursor`] a non-numeric value in
//! the boundary column leaves the cursor where it is, so later attribute cells
//! still land on the last opened record. [`BoundaryPolicy::CloseRecord`]
//! drops back to `AwaitingRecord` instead.
//!
//! Scanners never fail. Cells that do not fit are absorbed and counted in a
//! [`ScanTrace`].

use serde::{Deserialize, Serialize};

use crate::grid::{CellAddress, CellGrid, CellValue};
use crate::model::{
    question_number, AnswerKey, HeaderLayout, ParticipantId, ParticipantTable, QuestionNumber,
    ResponseLog,
};

/// Column A opens records in every sheet.
pub const BOUNDARY_COLUMN: u32 = 1;

/// What to do when the boundary column holds a non-numeric value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BoundaryPolicy {
    /// Keep the current record open. Trailing cells of a stray row are
    /// attributed to the last valid record.
    #[default]
    RetainCursor,
    /// Close the current record; cells up to the next numeric boundary are skipped.
    CloseRecord,
}

/// Options shared by the scanners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanOptions {
    pub boundary_policy: BoundaryPolicy,
    /// A submitted value equal to `Number(sentinel)` is discarded.
    pub sentinel: f64,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            boundary_policy: BoundaryPolicy::RetainCursor,
            sentinel: -1.0,
        }
    }
}

/// Scanner state for one kind of record key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanState<K> {
    AwaitingRecord,
    InRecord(K),
}

/// The part a column plays in a sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnRole {
    Boundary,
    Attribute(String),
    Answer,
    Points,
    Question,
    Submission,
    Ignored,
}

/// The decision taken for one visited cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
    /// A numeric boundary value opened (or reopened) a record.
    Open,
    /// A non-numeric boundary value left the cursor unchanged.
    Retain,
    /// A non-numeric boundary value closed the current record.
    Close,
    /// A value was written to the current record.
    Assign,
    /// The secondary question cursor moved.
    Advance,
    /// A sentinel submission was dropped.
    Discard,
    /// The cell was not used.
    Skip,
}

/// One audited step of a scan.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceEntry {
    pub address: CellAddress,
    pub role: ColumnRole,
    pub transition: Transition,
}

/// Transition counts for a scan, plus the full step list when requested.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanTrace {
    keep_entries: bool,
    entries: Vec<TraceEntry>,
    pub opened: usize,
    pub retained: usize,
    pub closed: usize,
    pub assigned: usize,
    pub advanced: usize,
    pub discarded: usize,
    pub skipped: usize,
}

impl ScanTrace {
    /// A trace that records every step, not just the counts.
    pub fn detailed() -> Self {
        Self {
            keep_entries: true,
            ..Self::default()
        }
    }

    fn push(&mut self, address: CellAddress, role: &ColumnRole, transition: Transition) {
        match transition {
            Transition::Open => self.opened += 1,
            Transition::Retain => self.retained += 1,
            Transition::Close => self.closed += 1,
            Transition::Assign => self.assigned += 1,
            Transition::Advance => self.advanced += 1,
            Transition::Discard => self.discarded += 1,
            Transition::Skip => self.skipped += 1,
        }
        if self.keep_entries {
            self.entries.push(TraceEntry {
                address,
                role: role.clone(),
                transition,
            });
        }
    }

    pub fn entries(&self) -> &[TraceEntry] {
        &self.entries
    }

    /// The transition recorded for a cell, if the trace is detailed.
    pub fn transition_at(&self, address: CellAddress) -> Option<Transition> {
        self.entries
            .iter()
            .find(|e| e.address == address)
            .map(|e| e.transition)
    }
}

/// The record cursor driven by the boundary column.
#[derive(Debug, Clone)]
struct Cursor<K> {
    state: ScanState<K>,
    policy: BoundaryPolicy,
}

impl<K> Cursor<K> {
    fn new(policy: BoundaryPolicy) -> Self {
        Self {
            state: ScanState::AwaitingRecord,
            policy,
        }
    }

    /// Feed a boundary cell. `key` is the parsed record key, if the cell has one.
    fn boundary(&mut self, key: Option<K>) -> Transition {
        match (key, self.policy) {
            (Some(key), _) => {
                self.state = ScanState::InRecord(key);
                Transition::Open
            }
            (None, BoundaryPolicy::RetainCursor) => Transition::Retain,
            (None, BoundaryPolicy::CloseRecord) => {
                if matches!(self.state, ScanState::AwaitingRecord) {
                    return Transition::Retain;
                }
                self.state = ScanState::AwaitingRecord;
                Transition::Close
            }
        }
    }

    fn current(&self) -> Option<&K> {
        match &self.state {
            ScanState::AwaitingRecord => None,
            ScanState::InRecord(key) => Some(key),
        }
    }
}

fn log_retained(sheet: &str, address: CellAddress, value: &CellValue, in_record: bool) {
    if in_record {
        tracing::debug!(
            sheet,
            %address,
            value = %value,
            "boundary value is not numeric, keeping current record"
        );
    }
}

/// Build the header layout of a metadata sheet from its row-1 labels.
///
/// A sheet whose `A1` already holds a numeric id has no header row; so does a
/// sheet with no labels past column A. Both fall back to `fallback`. Columns
/// without a label are left out and their cells ignored.
pub fn header_layout(grid: &CellGrid, fallback: &HeaderLayout) -> HeaderLayout {
    let headerless = grid
        .get(CellAddress::new(BOUNDARY_COLUMN, 1))
        .is_some_and(CellValue::is_numeric);
    if headerless {
        return fallback.clone();
    }

    let columns: Vec<(u32, String)> = (BOUNDARY_COLUMN + 1..=grid.max_column())
        .filter_map(|col| grid.header(col).map(|name| (col, name)))
        .collect();

    if columns.is_empty() {
        fallback.clone()
    } else {
        HeaderLayout::new(columns)
    }
}

/// Rebuild participant metadata from the `user_info` sheet.
pub fn scan_participants(
    grid: &CellGrid,
    layout: HeaderLayout,
    options: &ScanOptions,
) -> ParticipantTable {
    scan_participants_traced(grid, layout, options, &mut ScanTrace::default())
}

/// [`scan_participants`] recording each transition into `trace`.
pub fn scan_participants_traced(
    grid: &CellGrid,
    layout: HeaderLayout,
    options: &ScanOptions,
    trace: &mut ScanTrace,
) -> ParticipantTable {
    let role_of = |column: u32| -> ColumnRole {
        if column == BOUNDARY_COLUMN {
            return ColumnRole::Boundary;
        }
        layout
            .name_for(column)
            .map(|name| ColumnRole::Attribute(name.to_string()))
            .unwrap_or(ColumnRole::Ignored)
    };

    let mut table = ParticipantTable::new(layout.clone());
    let mut cursor: Cursor<ParticipantId> = Cursor::new(options.boundary_policy);

    for (address, value) in grid.cells() {
        let role = role_of(address.column);
        let transition = match &role {
            ColumnRole::Boundary => {
                let key = ParticipantId::from_cell(value);
                if let Some(id) = &key {
                    table.open(id.clone());
                }
                let t = cursor.boundary(key);
                if t == Transition::Retain {
                    log_retained("user_info", address, value, cursor.current().is_some());
                }
                t
            }
            ColumnRole::Attribute(name) => match cursor.current() {
                Some(id) => match table.get_mut(id) {
                    Some(record) => {
                        record.set(name, value.clone());
                        Transition::Assign
                    }
                    None => Transition::Skip,
                },
                None => Transition::Skip,
            },
            _ => Transition::Skip,
        };
        trace.push(address, &role, transition);
    }

    tracing::debug!(
        participants = table.len(),
        retained = trace.retained,
        skipped = trace.skipped,
        "scanned participant sheet"
    );
    table
}

/// Rebuild the answer key from the `item_info` sheet.
pub fn scan_answer_key(grid: &CellGrid, options: &ScanOptions) -> AnswerKey {
    scan_answer_key_traced(grid, options, &mut ScanTrace::default())
}

/// [`scan_answer_key`] recording each transition into `trace`.
pub fn scan_answer_key_traced(
    grid: &CellGrid,
    options: &ScanOptions,
    trace: &mut ScanTrace,
) -> AnswerKey {
    let mut key = AnswerKey::new();
    let mut cursor: Cursor<QuestionNumber> = Cursor::new(options.boundary_policy);

    for (address, value) in grid.cells() {
        let role = match address.column {
            1 => ColumnRole::Boundary,
            2 => ColumnRole::Answer,
            3 => ColumnRole::Points,
            _ => ColumnRole::Ignored,
        };
        let transition = match &role {
            ColumnRole::Boundary => {
                let question = question_number(value);
                if let Some(q) = question {
                    key.open(q);
                }
                let t = cursor.boundary(question);
                if t == Transition::Retain {
                    log_retained("item_info", address, value, cursor.current().is_some());
                }
                t
            }
            ColumnRole::Answer | ColumnRole::Points => {
                match cursor.current().and_then(|&q| key.get_mut(q)) {
                    Some(entry) => {
                        if role == ColumnRole::Answer {
                            entry.answer = Some(value.clone());
                        } else {
                            entry.score = Some(value.clone());
                        }
                        Transition::Assign
                    }
                    None => Transition::Skip,
                }
            }
            _ => Transition::Skip,
        };
        trace.push(address, &role, transition);
    }

    tracing::debug!(
        questions = key.len(),
        max_question = key.max_question(),
        "scanned answer key sheet"
    );
    key
}

/// Rebuild submitted answers from the `raw_data` sheet.
pub fn scan_responses(grid: &CellGrid, options: &ScanOptions) -> ResponseLog {
    scan_responses_traced(grid, options, &mut ScanTrace::default())
}

/// [`scan_responses`] recording each transition into `trace`.
///
/// Column B moves a secondary question cursor that survives record changes;
/// column C writes `submitted[participant][question]` unless the value is the
/// discard sentinel.
pub fn scan_responses_traced(
    grid: &CellGrid,
    options: &ScanOptions,
    trace: &mut ScanTrace,
) -> ResponseLog {
    let sentinel = CellValue::Number(options.sentinel);
    let mut log = ResponseLog::new();
    let mut cursor: Cursor<ParticipantId> = Cursor::new(options.boundary_policy);
    let mut question: Option<QuestionNumber> = None;

    for (address, value) in grid.cells() {
        let role = match address.column {
            1 => ColumnRole::Boundary,
            2 => ColumnRole::Question,
            3 => ColumnRole::Submission,
            _ => ColumnRole::Ignored,
        };
        let transition = match &role {
            ColumnRole::Boundary => {
                let key = ParticipantId::from_cell(value);
                if let Some(id) = &key {
                    log.touch(id);
                }
                let t = cursor.boundary(key);
                if t == Transition::Retain {
                    log_retained("raw_data", address, value, cursor.current().is_some());
                }
                t
            }
            ColumnRole::Question => {
                if cursor.current().is_some() {
                    question = question_number(value);
                    Transition::Advance
                } else {
                    Transition::Skip
                }
            }
            ColumnRole::Submission => match (cursor.current(), question) {
                (Some(_), _) if *value == sentinel => Transition::Discard,
                (Some(id), Some(q)) => {
                    log.record(id, q, value.clone());
                    Transition::Assign
                }
                _ => Transition::Skip,
            },
            _ => Transition::Skip,
        };
        trace.push(address, &role, transition);
    }

    tracing::debug!(
        participants = log.participant_count(),
        submissions = log.submission_count(),
        discarded = trace.discarded,
        "scanned response log sheet"
    );
    log
}
