use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Role of an admin account that may be assigned entries.
pub const FACULTY_ROLE: &str = "faculty";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Course {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Classroom {
    pub id: String,
    pub name: String,
}

/// An admin account that can be assigned to teach. Listed by `GET /admins`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Faculty {
    pub id: String,
    pub full_name: String,
    pub email: Option<String>,
    pub role: String,
}

impl Faculty {
    pub fn teaches(&self) -> bool {
        self.role == FACULTY_ROLE
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct StudentGroup {
    pub id: String,
    pub name: String,
    pub year: i32,
    pub member_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCourseRequest {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewClassroomRequest {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewFacultyRequest {
    pub full_name: String,
    pub email: Option<String>,
    #[serde(default = "default_role")]
    pub role: String,
}

fn default_role() -> String {
    FACULTY_ROLE.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewStudentGroupRequest {
    pub name: String,
    pub year: i32,
}
