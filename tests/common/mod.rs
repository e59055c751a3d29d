#![allow(dead_code)]

use sqlx::SqlitePool;
use timetable_backend::db::{self, repository};
use timetable_backend::models::{
    DayOfWeek, NewClassroomRequest, NewCourseRequest, NewEntryRequest, NewFacultyRequest,
    NewStudentGroupRequest, NewTimeSlotRequest,
};

/// Ids of a small seeded catalog: two Monday slots, three of everything else.
pub struct Seed {
    pub course: String,
    pub mon_9: String,
    pub mon_10: String,
    pub faculty: Vec<String>,
    pub rooms: Vec<String>,
    pub groups: Vec<String>,
}

impl Seed {
    pub fn entry(&self, slot: &str, faculty: usize, room: usize, group: usize) -> NewEntryRequest {
        NewEntryRequest {
            course_id: self.course.clone(),
            faculty_id: self.faculty[faculty].clone(),
            classroom_id: self.rooms[room].clone(),
            time_slot_id: slot.to_string(),
            student_group_id: self.groups[group].clone(),
        }
    }
}

pub async fn setup_test_db() -> SqlitePool {
    db::connect_in_memory().await.expect("Failed to create test db")
}

pub async fn seed(pool: &SqlitePool) -> Seed {
    let course = repository::insert_course(pool, NewCourseRequest { name: "Operating Systems".to_string() })
        .await
        .expect("Failed to insert course");

    let mut slots = Vec::new();
    for (start, end) in [("09:00:00", "10:00:00"), ("10:00:00", "11:00:00")] {
        let slot = repository::insert_time_slot(
            pool,
            NewTimeSlotRequest {
                day_of_week: DayOfWeek::Monday,
                start_time: start.to_string(),
                end_time: end.to_string(),
            },
        )
        .await
        .expect("Failed to insert time slot");
        slots.push(slot.id);
    }

    let mut faculty = Vec::new();
    let mut rooms = Vec::new();
    let mut groups = Vec::new();
    for (i, label) in ["A", "B", "C"].iter().enumerate() {
        faculty.push(
            repository::insert_faculty(
                pool,
                NewFacultyRequest {
                    full_name: format!("Faculty {label}"),
                    email: Some(format!("faculty{i}@college.edu")),
                    role: "faculty".to_string(),
                },
            )
            .await
            .expect("Failed to insert faculty")
            .id,
        );
        rooms.push(
            repository::insert_classroom(pool, NewClassroomRequest { name: format!("Room {}", i + 1) })
                .await
                .expect("Failed to insert classroom")
                .id,
        );
        groups.push(
            repository::insert_student_group(
                pool,
                NewStudentGroupRequest { name: format!("Group {label}"), year: 1 },
            )
            .await
            .expect("Failed to insert group")
            .id,
        );
    }

    Seed {
        course: course.id,
        mon_10: slots.pop().expect("two slots"),
        mon_9: slots.pop().expect("two slots"),
        faculty,
        rooms,
        groups,
    }
}
