//! Checks on a user's chosen `(date, slot)` pairs.
//!
//! Duplicate detection is a pairwise comparison across the selections. The
//! snapshot check looks at one selection against the local booked map; the
//! booking service still has the final word right before submission.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::availability::AvailabilityEngine;
use crate::booked::BookedMap;
use crate::calendar::is_weekend;
use crate::slots::TimeSlot;

/// One chosen class session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selection {
    pub date: NaiveDate,
    pub slot: TimeSlot,
}

impl Selection {
    pub fn new(date: NaiveDate, slot: impl Into<TimeSlot>) -> Self {
        Self {
            date,
            slot: slot.into(),
        }
    }
}

/// Two positions in a selection list that pick the same date and slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateSelection {
    /// Index of the earlier selection.
    pub first: usize,
    /// Index of the later selection.
    pub second: usize,
    pub selection: Selection,
}

/// Why a selection cannot be taken according to the local snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionIssue {
    Weekend,
    /// The slot does not run on that weekday.
    NotOffered,
    AlreadyBooked,
}

/// Find every pair `(i, j)` with `i < j` whose selections are identical.
///
/// Three identical selections produce three pairs.
pub fn find_duplicate_selections(selections: &[Selection]) -> Vec<DuplicateSelection> {
    let mut duplicates = Vec::new();

    for (i, a) in selections.iter().enumerate() {
        for (j, b) in selections.iter().enumerate().skip(i + 1) {
            if a == b {
                duplicates.push(DuplicateSelection {
                    first: i,
                    second: j,
                    selection: a.clone(),
                });
            }
        }
    }

    duplicates
}

/// Check one selection against the local snapshot.
///
/// Returns `None` when the slot runs that day and is not booked.
pub fn check_selection(
    engine: &AvailabilityEngine,
    selection: &Selection,
    booked: &BookedMap,
) -> Option<SelectionIssue> {
    if is_weekend(selection.date) {
        return Some(SelectionIssue::Weekend);
    }
    if !engine.offered_slots(selection.date).contains(&selection.slot) {
        return Some(SelectionIssue::NotOffered);
    }
    if booked.entries_for(selection.date).contains(&selection.slot) {
        return Some(SelectionIssue::AlreadyBooked);
    }
    None
}
