use serde::{Deserialize, Serialize};

use crate::models::{
    Classroom, Course, Faculty, NewEntryRequest, StudentGroup, TimeSlot, TimetableEntry,
};

/// Everything the generator must treat as fixed when filling gaps.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest {
    pub time_slots: Vec<TimeSlot>,
    pub courses: Vec<Course>,
    pub faculty: Vec<Faculty>,
    pub classrooms: Vec<Classroom>,
    pub student_groups: Vec<StudentGroup>,
    pub existing_entries: Vec<TimetableEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum GenerateResponse {
    Success {
        #[serde(default)]
        schedule: Vec<NewEntryRequest>,
    },
    Error {
        #[serde(default)]
        message: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_success_response() {
        let raw = r#"{
            "status": "success",
            "schedule": [{
                "course_id": "c1",
                "faculty_id": "f1",
                "classroom_id": "r1",
                "time_slot_id": "s1",
                "student_group_id": "g1"
            }]
        }"#;
        let parsed: GenerateResponse = serde_json::from_str(raw).unwrap();
        match parsed {
            GenerateResponse::Success { schedule } => assert_eq!(schedule.len(), 1),
            other => panic!("unexpected response: {other:?}"),
        }
    }

    #[test]
    fn test_parse_error_response() {
        let raw = r#"{"status": "error", "message": "no feasible schedule"}"#;
        let parsed: GenerateResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(
            parsed,
            GenerateResponse::Error { message: Some("no feasible schedule".to_string()) }
        );
    }

    #[test]
    fn test_unknown_status_fails_to_parse() {
        let raw = r#"{"status": "pending"}"#;
        assert!(serde_json::from_str::<GenerateResponse>(raw).is_err());
    }
}
