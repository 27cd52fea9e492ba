//! Participant filter.
//!
//! The response log, not the metadata sheet, decides who gets a report row.

use std::collections::HashSet;

use crate::grid::CellGrid;
use crate::model::ParticipantId;
use crate::scanner::BOUNDARY_COLUMN;

/// Distinct participant ids in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParticipantIdSet {
    order: Vec<ParticipantId>,
    members: HashSet<ParticipantId>,
}

impl ParticipantIdSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an id; returns `false` if it was already present.
    pub fn insert(&mut self, id: ParticipantId) -> bool {
        if self.members.contains(&id) {
            return false;
        }
        self.members.insert(id.clone());
        self.order.push(id);
        true
    }

    pub fn contains(&self, id: &ParticipantId) -> bool {
        self.members.contains(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParticipantId> {
        self.order.iter()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl FromIterator<ParticipantId> for ParticipantIdSet {
    fn from_iter<T: IntoIterator<Item = ParticipantId>>(iter: T) -> Self {
        let mut set = Self::new();
        for id in iter {
            set.insert(id);
        }
        set
    }
}

/// Collect the numeric ids in column A of the response log, top to bottom.
/// Header labels, blanks and other non-numeric values are skipped.
pub fn collect_participant_ids(grid: &CellGrid) -> ParticipantIdSet {
    let set: ParticipantIdSet = grid
        .column(BOUNDARY_COLUMN)
        .filter_map(|(_, value)| ParticipantId::from_cell(value))
        .collect();

    if set.is_empty() {
        tracing::warn!("response log has no numeric participant ids; the report will be empty");
    }
    set
}
