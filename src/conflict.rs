//! Admission check for timetable entries.
//!
//! Two entries sharing a time slot must not share a faculty member, a
//! classroom or a student group. [`check`] decides whether one candidate may
//! join an existing collection; [`find_violations`] audits a whole collection.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::{Placement, TimetableEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    Faculty,
    Classroom,
    Group,
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConflictKind::Faculty => "faculty",
            ConflictKind::Classroom => "classroom",
            ConflictKind::Group => "group",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    pub kind: ConflictKind,
    /// `None` when the clash was reported by the unique index and the row
    /// it collided with could no longer be read back.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub with_entry_id: Option<String>,
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.with_entry_id {
            Some(id) => write!(f, "{} already booked by entry {}", self.kind, id),
            None => write!(f, "{} already booked", self.kind),
        }
    }
}

/// Kind of the first clash between two placements, checked faculty, classroom, group.
/// Placements in different slots never clash.
pub fn clash<A: Placement + ?Sized, B: Placement + ?Sized>(a: &A, b: &B) -> Option<ConflictKind> {
    if a.time_slot_id() != b.time_slot_id() {
        return None;
    }
    if a.faculty_id() == b.faculty_id() {
        Some(ConflictKind::Faculty)
    } else if a.classroom_id() == b.classroom_id() {
        Some(ConflictKind::Classroom)
    } else if a.student_group_id() == b.student_group_id() {
        Some(ConflictKind::Group)
    } else {
        None
    }
}

/// Scans `existing` in order and reports the first entry the candidate collides with.
pub fn check<C: Placement + ?Sized>(
    candidate: &C,
    existing: &[TimetableEntry],
) -> Result<(), Conflict> {
    for entry in existing {
        if let Some(kind) = clash(candidate, entry) {
            return Err(Conflict {
                kind,
                with_entry_id: Some(entry.id.clone()),
            });
        }
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub kind: ConflictKind,
    pub first_entry_id: String,
    pub second_entry_id: String,
}

/// Every pair of distinct entries that breaks the invariant, in input order.
pub fn find_violations(entries: &[TimetableEntry]) -> Vec<Violation> {
    let mut violations = Vec::new();
    for (i, a) in entries.iter().enumerate() {
        for b in &entries[i + 1..] {
            if let Some(kind) = clash(a, b) {
                violations.push(Violation {
                    kind,
                    first_entry_id: a.id.clone(),
                    second_entry_id: b.id.clone(),
                });
            }
        }
    }
    violations
}
