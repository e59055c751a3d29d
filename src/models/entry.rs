use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::DayOfWeek;

/// Anything that occupies a faculty member, a classroom and a student group
/// during one time slot.
pub trait Placement {
    fn time_slot_id(&self) -> &str;
    fn faculty_id(&self) -> &str;
    fn classroom_id(&self) -> &str;
    fn student_group_id(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct TimetableEntry {
    pub id: String,
    pub course_id: String,
    pub faculty_id: String,
    pub classroom_id: String,
    pub time_slot_id: String,
    pub student_group_id: String,
    /// Manual entries are locked; generated ones are not.
    pub is_locked: bool,
    pub created_at: String,
}

/// Body of `POST /timetable`, also the shape of a generator candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEntryRequest {
    #[serde(default)]
    pub course_id: String,
    #[serde(default)]
    pub faculty_id: String,
    #[serde(default)]
    pub classroom_id: String,
    #[serde(default)]
    pub time_slot_id: String,
    #[serde(default)]
    pub student_group_id: String,
}

impl NewEntryRequest {
    /// Names of the fields left blank.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("course_id", &self.course_id),
            ("faculty_id", &self.faculty_id),
            ("classroom_id", &self.classroom_id),
            ("time_slot_id", &self.time_slot_id),
            ("student_group_id", &self.student_group_id),
        ]
        .into_iter()
        .filter(|(_, v)| v.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

/// An entry joined with display names and its slot window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct TimetableEntryView {
    pub id: String,
    pub course_id: String,
    pub course_name: String,
    pub faculty_id: String,
    pub faculty_name: String,
    pub classroom_id: String,
    pub classroom_name: String,
    pub time_slot_id: String,
    pub day_of_week: DayOfWeek,
    pub start_time: String,
    pub end_time: String,
    pub student_group_id: String,
    pub group_name: String,
    pub is_locked: bool,
}

macro_rules! impl_placement {
    ($($ty:ty),+) => {
        $(
            impl Placement for $ty {
                fn time_slot_id(&self) -> &str {
                    &self.time_slot_id
                }
                fn faculty_id(&self) -> &str {
                    &self.faculty_id
                }
                fn classroom_id(&self) -> &str {
                    &self.classroom_id
                }
                fn student_group_id(&self) -> &str {
                    &self.student_group_id
                }
            }
        )+
    };
}

impl_placement!(TimetableEntry, NewEntryRequest, TimetableEntryView);
