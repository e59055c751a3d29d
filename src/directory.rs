use std::collections::HashMap;

use sqlx::SqlitePool;

use crate::db::repository;
use crate::error::AppError;
use crate::models::{
    Classroom, Course, FACULTY_ROLE, Faculty, NewEntryRequest, StudentGroup, TimeSlot,
};

/// Catalog of everything an entry may reference, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct ResourceDirectory {
    courses: HashMap<String, Course>,
    faculty: HashMap<String, Faculty>,
    classrooms: HashMap<String, Classroom>,
    time_slots: HashMap<String, TimeSlot>,
    groups: HashMap<String, StudentGroup>,
}

impl ResourceDirectory {
    pub fn new(
        courses: Vec<Course>,
        faculty: Vec<Faculty>,
        classrooms: Vec<Classroom>,
        time_slots: Vec<TimeSlot>,
        groups: Vec<StudentGroup>,
    ) -> Self {
        Self {
            courses: courses.into_iter().map(|c| (c.id.clone(), c)).collect(),
            faculty: faculty.into_iter().map(|f| (f.id.clone(), f)).collect(),
            classrooms: classrooms.into_iter().map(|c| (c.id.clone(), c)).collect(),
            time_slots: time_slots.into_iter().map(|t| (t.id.clone(), t)).collect(),
            groups: groups.into_iter().map(|g| (g.id.clone(), g)).collect(),
        }
    }

    pub async fn load(db: &SqlitePool) -> Result<Self, AppError> {
        Ok(Self::new(
            repository::fetch_courses(db).await?,
            repository::fetch_faculty(db).await?,
            repository::fetch_classrooms(db).await?,
            repository::fetch_time_slots(db).await?,
            repository::fetch_student_groups(db).await?,
        ))
    }

    pub fn course(&self, id: &str) -> Option<&Course> {
        self.courses.get(id)
    }

    pub fn faculty(&self, id: &str) -> Option<&Faculty> {
        self.faculty.get(id)
    }

    pub fn classroom(&self, id: &str) -> Option<&Classroom> {
        self.classrooms.get(id)
    }

    pub fn time_slot(&self, id: &str) -> Option<&TimeSlot> {
        self.time_slots.get(id)
    }

    pub fn group(&self, id: &str) -> Option<&StudentGroup> {
        self.groups.get(id)
    }

    pub fn group_name(&self, id: &str) -> Option<&str> {
        self.group(id).map(|g| g.name.as_str())
    }

    /// Rejects a request with blank fields or ids that resolve to nothing.
    pub fn validate(&self, req: &NewEntryRequest) -> Result<(), AppError> {
        let missing = req.missing_fields();
        if !missing.is_empty() {
            return Err(AppError::Validation(format!(
                "missing required fields: {}",
                missing.join(", ")
            )));
        }

        let mut unknown = Vec::new();
        if self.course(&req.course_id).is_none() {
            unknown.push(format!("course_id={}", req.course_id));
        }
        match self.faculty(&req.faculty_id) {
            None => unknown.push(format!("faculty_id={}", req.faculty_id)),
            Some(f) if !f.teaches() => {
                return Err(AppError::Validation(format!(
                    "faculty_id={} has role {}, not {}",
                    req.faculty_id, f.role, FACULTY_ROLE
                )));
            }
            Some(_) => {}
        }
        if self.classroom(&req.classroom_id).is_none() {
            unknown.push(format!("classroom_id={}", req.classroom_id));
        }
        if self.time_slot(&req.time_slot_id).is_none() {
            unknown.push(format!("time_slot_id={}", req.time_slot_id));
        }
        if self.group(&req.student_group_id).is_none() {
            unknown.push(format!("student_group_id={}", req.student_group_id));
        }

        if unknown.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(format!(
                "unknown references: {}",
                unknown.join(", ")
            )))
        }
    }
}
