use tracing::{debug, warn};

use super::{Role, Section, SectionData};
use crate::error::AppError;
use crate::models::{Classroom, Course, Faculty, StudentGroup, TimeSlot, TimetableEntryView};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardData {
    pub timetable: Vec<TimetableEntryView>,
    pub student_groups: Vec<StudentGroup>,
    pub admins: Vec<Faculty>,
    pub courses: Vec<Course>,
    pub classrooms: Vec<Classroom>,
    pub time_slots: Vec<TimeSlot>,
}

impl DashboardData {
    fn store(&mut self, data: SectionData) {
        match data {
            SectionData::Timetable(v) => self.timetable = v,
            SectionData::StudentGroups(v) => self.student_groups = v,
            SectionData::Admins(v) => self.admins = v,
            SectionData::Courses(v) => self.courses = v,
            SectionData::Classrooms(v) => self.classrooms = v,
            SectionData::TimeSlots(v) => self.time_slots = v,
        }
    }
}

/// Issued when a load starts; only the newest ticket's response is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub section: Section,
    pub endpoint: String,
    sequence: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    Stored,
    Stale,
    Failed(String),
}

#[derive(Debug)]
pub struct DashboardSession {
    role: Role,
    active: Section,
    sequence: u64,
    loading: bool,
    error: Option<String>,
    data: DashboardData,
}

impl DashboardSession {
    pub fn new(role: Role) -> Self {
        Self {
            role,
            active: Section::Overview,
            sequence: 0,
            loading: false,
            error: None,
            data: DashboardData::default(),
        }
    }

    pub fn role(&self) -> &Role {
        &self.role
    }

    pub fn active(&self) -> Section {
        self.active
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn data(&self) -> &DashboardData {
        &self.data
    }

    /// Switches section. Any response still in flight for an earlier load
    /// becomes stale. Returns `None` for sections with nothing to fetch.
    pub fn activate(&mut self, section: Section) -> Option<LoadTicket> {
        self.active = section;
        self.sequence += 1;
        self.error = None;

        match section.endpoint(&self.role) {
            Some(endpoint) => {
                self.loading = true;
                Some(LoadTicket {
                    section,
                    endpoint,
                    sequence: self.sequence,
                })
            }
            None => {
                self.loading = false;
                None
            }
        }
    }

    /// Re-fetch of the active section after a mutation.
    pub fn reload(&mut self) -> Option<LoadTicket> {
        self.activate(self.active)
    }

    /// Applies a finished load. Stale tickets are dropped; failures keep the
    /// previous data and set an inline error.
    pub fn apply(&mut self, ticket: LoadTicket, result: Result<SectionData, AppError>) -> Applied {
        if ticket.sequence != self.sequence || ticket.section != self.active {
            warn!(
                "Discarding stale response for {} (ticket {}, current {})",
                ticket.section, ticket.sequence, self.sequence
            );
            return Applied::Stale;
        }

        self.loading = false;
        match result {
            Ok(data) => {
                debug!("Loaded section {}", ticket.section);
                self.data.store(data);
                self.error = None;
                Applied::Stored
            }
            Err(e) => {
                warn!("Loading {} failed: {}", ticket.section, e);
                let message = format!("Could not load data for {}.", ticket.section);
                self.error = Some(message.clone());
                Applied::Failed(message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Course;

    fn courses(names: &[&str]) -> SectionData {
        SectionData::Courses(
            names
                .iter()
                .enumerate()
                .map(|(i, n)| Course { id: format!("c{i}"), name: n.to_string() })
                .collect(),
        )
    }

    #[test]
    fn test_late_response_for_previous_section_is_discarded() {
        let mut session = DashboardSession::new(Role::Admin);
        let first = session.activate(Section::Courses).expect("courses load");
        let second = session.activate(Section::StudentGroups).expect("groups load");

        assert_eq!(session.apply(first, Ok(courses(&["Maths"]))), Applied::Stale);
        assert!(session.data().courses.is_empty());
        assert!(session.is_loading());

        let applied = session.apply(second, Ok(SectionData::StudentGroups(Vec::new())));
        assert_eq!(applied, Applied::Stored);
        assert!(!session.is_loading());
    }

    #[test]
    fn test_superseded_load_of_same_section_is_discarded() {
        let mut session = DashboardSession::new(Role::Admin);
        let old = session.activate(Section::Courses).unwrap();
        let new = session.reload().unwrap();

        assert_eq!(session.apply(new, Ok(courses(&["Physics"]))), Applied::Stored);
        assert_eq!(session.apply(old, Ok(courses(&["Old"]))), Applied::Stale);
        assert_eq!(session.data().courses[0].name, "Physics");
    }

    #[test]
    fn test_failed_read_keeps_prior_data() {
        let mut session = DashboardSession::new(Role::Admin);
        let ticket = session.activate(Section::Courses).unwrap();
        session.apply(ticket, Ok(courses(&["Chemistry"])));

        let ticket = session.reload().unwrap();
        let applied = session.apply(ticket, Err(AppError::Network("timeout".to_string())));
        assert_eq!(applied, Applied::Failed("Could not load data for courses.".to_string()));
        assert_eq!(session.error(), Some("Could not load data for courses."));
        assert_eq!(session.data().courses.len(), 1);
    }

    #[test]
    fn test_static_section_needs_no_fetch() {
        let mut session = DashboardSession::new(Role::Admin);
        assert!(session.activate(Section::Overview).is_none());
        assert!(!session.is_loading());

        let mut student = DashboardSession::new(Role::Student {
            group_id: "g7".to_string(),
        });
        let ticket = student.activate(Section::Overview).unwrap();
        assert_eq!(ticket.endpoint, "/timetable/student?group_id=g7");
    }
}
