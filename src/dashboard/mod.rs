//! Dashboard session model: which section is showing, which response is
//! still wanted, and the state of each mutating workflow.

pub mod flow;
pub mod session;

use std::fmt;

use serde::de::DeserializeOwned;

use crate::error::AppError;
use crate::models::{Classroom, Course, Faculty, StudentGroup, TimeSlot, TimetableEntryView};

pub use flow::{CreationFlow, FlowError, WriteGate, WritePermit};
pub use session::{Applied, DashboardData, DashboardSession, LoadTicket};

/// A student session is tied to the group whose timetable it shows.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Role {
    Student { group_id: String },
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Overview,
    Timetable,
    StudentGroups,
    Admins,
    Courses,
    Classrooms,
    TimeSlots,
}

impl Section {
    /// Endpoint backing the section for a role; `None` when the section is static.
    pub fn endpoint(&self, role: &Role) -> Option<String> {
        let path = match (self, role) {
            (Section::Overview | Section::Timetable, Role::Student { group_id }) => {
                return Some(format!("/timetable/student?group_id={}", group_id));
            }
            (Section::Overview, Role::Admin) => return None,
            (Section::Timetable, Role::Admin) => "/timetable",
            (Section::StudentGroups, _) => "/student-groups",
            (Section::Admins, _) => "/admins",
            (Section::Courses, _) => "/courses",
            (Section::Classrooms, _) => "/classrooms",
            (Section::TimeSlots, _) => "/time-slots",
        };
        Some(path.to_string())
    }

    /// Decodes a response body into the payload this section stores.
    pub fn decode(&self, body: &str) -> Result<SectionData, AppError> {
        let data = match self {
            Section::Overview | Section::Timetable => SectionData::Timetable(parse(body)?),
            Section::StudentGroups => SectionData::StudentGroups(parse(body)?),
            Section::Admins => SectionData::Admins(parse(body)?),
            Section::Courses => SectionData::Courses(parse(body)?),
            Section::Classrooms => SectionData::Classrooms(parse(body)?),
            Section::TimeSlots => SectionData::TimeSlots(parse(body)?),
        };
        Ok(data)
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Section::Overview => "overview",
            Section::Timetable => "timetable",
            Section::StudentGroups => "student_groups",
            Section::Admins => "admins",
            Section::Courses => "courses",
            Section::Classrooms => "classrooms",
            Section::TimeSlots => "time_slots",
        };
        f.write_str(s)
    }
}

fn parse<T: DeserializeOwned>(body: &str) -> Result<T, AppError> {
    serde_json::from_str(body).map_err(|e| AppError::Network(format!("unexpected response body: {}", e)))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionData {
    Timetable(Vec<TimetableEntryView>),
    StudentGroups(Vec<StudentGroup>),
    Admins(Vec<Faculty>),
    Courses(Vec<Course>),
    Classrooms(Vec<Classroom>),
    TimeSlots(Vec<TimeSlot>),
}

/// Message shown to the user for a failed call. No call is retried automatically.
pub fn user_message(err: &AppError) -> String {
    match err {
        AppError::Validation(msg) => format!("Please fill out all fields. ({})", msg),
        AppError::Conflict(_) => "Failed to create timetable entry. Conflict likely.".to_string(),
        AppError::NotFound => "That record no longer exists.".to_string(),
        AppError::Network(_) | AppError::Database(_) | AppError::InternalServerError => {
            "Request failed. Please try again.".to_string()
        }
        AppError::Generator(msg) => format!("Error: {}", msg),
        AppError::Busy(msg) => msg.clone(),
    }
}
