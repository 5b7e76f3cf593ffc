//! Cross-origin priority groups and code deduplication
//!
//! Matches are bucketed as:
//! 1. document records that reference a figure
//! 2. structured records
//! 3. document records without a figure reference
//!
//! Groups keep their insertion order unless a caller reorders one in place.
//! Deduplication walks the concatenation and keeps the first record seen for
//! each code, compared case-insensitively.

use partlookup_common::{Origin, PartRecord};
use std::collections::HashSet;

/// Position of a record in the merged output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PriorityGroup {
    DocumentWithFigure,
    Structured,
    DocumentWithoutFigure,
}

impl PriorityGroup {
    pub fn of(record: &PartRecord) -> Self {
        match (record.origin, record.figure_ref.is_some()) {
            (Origin::Document, true) => PriorityGroup::DocumentWithFigure,
            (Origin::Structured, _) => PriorityGroup::Structured,
            (Origin::Document, false) => PriorityGroup::DocumentWithoutFigure,
        }
    }
}

/// Matches collected per priority group
#[derive(Debug, Default)]
pub struct PriorityGroups<'a> {
    with_figure: Vec<&'a PartRecord>,
    structured: Vec<&'a PartRecord>,
    without_figure: Vec<&'a PartRecord>,
}

impl<'a> PriorityGroups<'a> {
    pub fn push(&mut self, record: &'a PartRecord) {
        match PriorityGroup::of(record) {
            PriorityGroup::DocumentWithFigure => self.with_figure.push(record),
            PriorityGroup::Structured => self.structured.push(record),
            PriorityGroup::DocumentWithoutFigure => self.without_figure.push(record),
        }
    }

    pub fn len(&self) -> usize {
        self.with_figure.len() + self.structured.len() + self.without_figure.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reorder the records inside every group; groups never trade places.
    pub fn reorder_each<F>(&mut self, mut reorder: F)
    where
        F: FnMut(&mut Vec<&'a PartRecord>),
    {
        reorder(&mut self.with_figure);
        reorder(&mut self.structured);
        reorder(&mut self.without_figure);
    }

    /// Concatenate groups in priority order, drop repeated codes and stop
    /// after `limit` records.
    pub fn into_deduplicated(self, limit: usize) -> Vec<&'a PartRecord> {
        let mut seen: HashSet<String> = HashSet::new();
        self.with_figure
            .into_iter()
            .chain(self.structured)
            .chain(self.without_figure)
            .filter(|record| seen.insert(record.code.to_lowercase()))
            .take(limit)
            .collect()
    }
}
