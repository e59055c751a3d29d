use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use uuid::Uuid;

use crate::models::{
    Classroom, Course, Faculty, NewClassroomRequest, NewCourseRequest, NewEntryRequest,
    NewFacultyRequest, NewStudentGroupRequest, NewTimeSlotRequest, StudentGroup, TimeSlot,
    TimetableEntry, TimetableEntryView,
};

const ENTRY_VIEW_SELECT: &str = r#"
    SELECT
        e.id,
        e.course_id,
        c.name AS course_name,
        e.faculty_id,
        a.full_name AS faculty_name,
        e.classroom_id,
        r.name AS classroom_name,
        e.time_slot_id,
        t.day_of_week,
        t.start_time,
        t.end_time,
        e.student_group_id,
        g.name AS group_name,
        e.is_locked
    FROM timetable_entries e
    JOIN courses c ON c.id = e.course_id
    JOIN admins a ON a.id = e.faculty_id
    JOIN classrooms r ON r.id = e.classroom_id
    JOIN time_slots t ON t.id = e.time_slot_id
    JOIN student_groups g ON g.id = e.student_group_id
"#;

const DAY_ORDER: &str = r#"
    CASE t.day_of_week
        WHEN 'Monday' THEN 1
        WHEN 'Tuesday' THEN 2
        WHEN 'Wednesday' THEN 3
        WHEN 'Thursday' THEN 4
        WHEN 'Friday' THEN 5
    END
"#;

pub async fn fetch_time_slots(db: &SqlitePool) -> Result<Vec<TimeSlot>, sqlx::Error> {
    let query = format!(
        "SELECT id, day_of_week, start_time, end_time FROM time_slots t ORDER BY {}, start_time",
        DAY_ORDER
    );
    sqlx::query_as::<_, TimeSlot>(&query).fetch_all(db).await
}

/// Expects a request already passed through `NewTimeSlotRequest::normalized`.
pub async fn insert_time_slot(
    db: &SqlitePool,
    req: NewTimeSlotRequest,
) -> Result<TimeSlot, sqlx::Error> {
    let slot = TimeSlot {
        id: Uuid::new_v4().to_string(),
        day_of_week: req.day_of_week,
        start_time: req.start_time,
        end_time: req.end_time,
    };

    sqlx::query("INSERT INTO time_slots (id, day_of_week, start_time, end_time) VALUES (?, ?, ?, ?)")
        .bind(&slot.id)
        .bind(slot.day_of_week)
        .bind(&slot.start_time)
        .bind(&slot.end_time)
        .execute(db)
        .await?;

    Ok(slot)
}

pub async fn fetch_courses(db: &SqlitePool) -> Result<Vec<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>("SELECT id, name FROM courses ORDER BY name")
        .fetch_all(db)
        .await
}

pub async fn insert_course(db: &SqlitePool, req: NewCourseRequest) -> Result<Course, sqlx::Error> {
    let course = Course {
        id: Uuid::new_v4().to_string(),
        name: req.name,
    };

    sqlx::query("INSERT INTO courses (id, name) VALUES (?, ?)")
        .bind(&course.id)
        .bind(&course.name)
        .execute(db)
        .await?;

    Ok(course)
}

pub async fn fetch_classrooms(db: &SqlitePool) -> Result<Vec<Classroom>, sqlx::Error> {
    sqlx::query_as::<_, Classroom>("SELECT id, name FROM classrooms ORDER BY name")
        .fetch_all(db)
        .await
}

pub async fn insert_classroom(
    db: &SqlitePool,
    req: NewClassroomRequest,
) -> Result<Classroom, sqlx::Error> {
    let classroom = Classroom {
        id: Uuid::new_v4().to_string(),
        name: req.name,
    };

    sqlx::query("INSERT INTO classrooms (id, name) VALUES (?, ?)")
        .bind(&classroom.id)
        .bind(&classroom.name)
        .execute(db)
        .await?;

    Ok(classroom)
}

pub async fn fetch_faculty(db: &SqlitePool) -> Result<Vec<Faculty>, sqlx::Error> {
    sqlx::query_as::<_, Faculty>("SELECT id, full_name, email, role FROM admins ORDER BY full_name")
        .fetch_all(db)
        .await
}

pub async fn insert_faculty(db: &SqlitePool, req: NewFacultyRequest) -> Result<Faculty, sqlx::Error> {
    let faculty = Faculty {
        id: Uuid::new_v4().to_string(),
        full_name: req.full_name,
        email: req.email,
        role: req.role,
    };

    sqlx::query("INSERT INTO admins (id, full_name, email, role) VALUES (?, ?, ?, ?)")
        .bind(&faculty.id)
        .bind(&faculty.full_name)
        .bind(&faculty.email)
        .bind(&faculty.role)
        .execute(db)
        .await?;

    Ok(faculty)
}

pub async fn fetch_student_groups(db: &SqlitePool) -> Result<Vec<StudentGroup>, sqlx::Error> {
    sqlx::query_as::<_, StudentGroup>(
        "SELECT id, name, year, member_count FROM student_groups ORDER BY year, name",
    )
    .fetch_all(db)
    .await
}

pub async fn insert_student_group(
    db: &SqlitePool,
    req: NewStudentGroupRequest,
) -> Result<StudentGroup, sqlx::Error> {
    let group = StudentGroup {
        id: Uuid::new_v4().to_string(),
        name: req.name,
        year: req.year,
        member_count: 0,
    };

    sqlx::query("INSERT INTO student_groups (id, name, year, member_count) VALUES (?, ?, ?, 0)")
        .bind(&group.id)
        .bind(&group.name)
        .bind(group.year)
        .execute(db)
        .await?;

    Ok(group)
}

pub async fn fetch_entries(db: &SqlitePool) -> Result<Vec<TimetableEntry>, sqlx::Error> {
    sqlx::query_as::<_, TimetableEntry>(
        "SELECT id, course_id, faculty_id, classroom_id, time_slot_id, student_group_id, is_locked, created_at FROM timetable_entries ORDER BY created_at, id",
    )
    .fetch_all(db)
    .await
}

/// Entries booked into one slot, read on the caller's connection so a
/// transaction sees its own state.
pub async fn fetch_entries_in_slot(
    conn: &mut SqliteConnection,
    time_slot_id: &str,
) -> Result<Vec<TimetableEntry>, sqlx::Error> {
    sqlx::query_as::<_, TimetableEntry>(
        "SELECT id, course_id, faculty_id, classroom_id, time_slot_id, student_group_id, is_locked, created_at FROM timetable_entries WHERE time_slot_id = ? ORDER BY created_at, id",
    )
    .bind(time_slot_id)
    .fetch_all(conn)
    .await
}

pub async fn insert_entry(
    conn: &mut SqliteConnection,
    req: &NewEntryRequest,
    is_locked: bool,
) -> Result<TimetableEntry, sqlx::Error> {
    let entry = TimetableEntry {
        id: Uuid::new_v4().to_string(),
        course_id: req.course_id.clone(),
        faculty_id: req.faculty_id.clone(),
        classroom_id: req.classroom_id.clone(),
        time_slot_id: req.time_slot_id.clone(),
        student_group_id: req.student_group_id.clone(),
        is_locked,
        created_at: Utc::now().to_rfc3339(),
    };

    sqlx::query(
        r#"
        INSERT INTO timetable_entries
            (id, course_id, faculty_id, classroom_id, time_slot_id, student_group_id, is_locked, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&entry.id)
    .bind(&entry.course_id)
    .bind(&entry.faculty_id)
    .bind(&entry.classroom_id)
    .bind(&entry.time_slot_id)
    .bind(&entry.student_group_id)
    .bind(entry.is_locked)
    .bind(&entry.created_at)
    .execute(conn)
    .await?;

    Ok(entry)
}

pub async fn delete_entry(db: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let affected = sqlx::query("DELETE FROM timetable_entries WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(affected > 0)
}

pub async fn fetch_entry_views(db: &SqlitePool) -> Result<Vec<TimetableEntryView>, sqlx::Error> {
    let query = format!(
        "{} ORDER BY {}, t.start_time, e.created_at",
        ENTRY_VIEW_SELECT, DAY_ORDER
    );
    sqlx::query_as::<_, TimetableEntryView>(&query)
        .fetch_all(db)
        .await
}

pub async fn fetch_entry_views_for_group(
    db: &SqlitePool,
    student_group_id: &str,
) -> Result<Vec<TimetableEntryView>, sqlx::Error> {
    let query = format!(
        "{} WHERE e.student_group_id = ? ORDER BY {}, t.start_time, e.created_at",
        ENTRY_VIEW_SELECT, DAY_ORDER
    );
    sqlx::query_as::<_, TimetableEntryView>(&query)
        .bind(student_group_id)
        .fetch_all(db)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connect_in_memory;
    use crate::models::DayOfWeek;

    async fn setup_test_db() -> SqlitePool {
        connect_in_memory().await.expect("Failed to create test db")
    }

    #[tokio::test]
    async fn test_insert_and_fetch_catalogs() {
        let pool = setup_test_db().await;

        let course = insert_course(&pool, NewCourseRequest { name: "Algorithms".to_string() })
            .await
            .expect("Failed to insert course");
        let group = insert_student_group(
            &pool,
            NewStudentGroupRequest { name: "FYUP CS - Section A".to_string(), year: 1 },
        )
        .await
        .expect("Failed to insert group");

        assert_eq!(group.member_count, 0);
        let courses = fetch_courses(&pool).await.expect("Failed to fetch courses");
        assert_eq!(courses, vec![course]);
        let groups = fetch_student_groups(&pool).await.expect("Failed to fetch groups");
        assert_eq!(groups[0].name, "FYUP CS - Section A");
    }

    #[tokio::test]
    async fn test_time_slots_come_back_in_week_order() {
        let pool = setup_test_db().await;

        for (day, start, end) in [
            (DayOfWeek::Friday, "09:00:00", "10:00:00"),
            (DayOfWeek::Monday, "11:00:00", "12:00:00"),
            (DayOfWeek::Monday, "09:00:00", "10:00:00"),
        ] {
            insert_time_slot(
                &pool,
                NewTimeSlotRequest {
                    day_of_week: day,
                    start_time: start.to_string(),
                    end_time: end.to_string(),
                },
            )
            .await
            .expect("Failed to insert time slot");
        }

        let slots = fetch_time_slots(&pool).await.expect("Failed to fetch slots");
        let order: Vec<(DayOfWeek, &str)> = slots
            .iter()
            .map(|s| (s.day_of_week, s.start_time.as_str()))
            .collect();
        assert_eq!(
            order,
            vec![
                (DayOfWeek::Monday, "09:00:00"),
                (DayOfWeek::Monday, "11:00:00"),
                (DayOfWeek::Friday, "09:00:00"),
            ]
        );
    }

    #[tokio::test]
    async fn test_unique_index_rejects_double_booked_room() {
        let pool = setup_test_db().await;

        let course = insert_course(&pool, NewCourseRequest { name: "Physics".to_string() })
            .await
            .unwrap();
        let room = insert_classroom(&pool, NewClassroomRequest { name: "Lab 1".to_string() })
            .await
            .unwrap();
        let slot = insert_time_slot(
            &pool,
            NewTimeSlotRequest {
                day_of_week: DayOfWeek::Monday,
                start_time: "09:00:00".to_string(),
                end_time: "10:00:00".to_string(),
            },
        )
        .await
        .unwrap();
        let mut faculty = Vec::new();
        let mut groups = Vec::new();
        for i in 0..2 {
            faculty.push(
                insert_faculty(
                    &pool,
                    NewFacultyRequest {
                        full_name: format!("Teacher {i}"),
                        email: None,
                        role: "faculty".to_string(),
                    },
                )
                .await
                .unwrap(),
            );
            groups.push(
                insert_student_group(&pool, NewStudentGroupRequest { name: format!("G{i}"), year: 2 })
                    .await
                    .unwrap(),
            );
        }

        let mut conn = pool.acquire().await.unwrap();
        let first = NewEntryRequest {
            course_id: course.id.clone(),
            faculty_id: faculty[0].id.clone(),
            classroom_id: room.id.clone(),
            time_slot_id: slot.id.clone(),
            student_group_id: groups[0].id.clone(),
        };
        insert_entry(&mut *conn, &first, true).await.expect("first insert");

        let second = NewEntryRequest {
            faculty_id: faculty[1].id.clone(),
            student_group_id: groups[1].id.clone(),
            ..first.clone()
        };
        let err = insert_entry(&mut *conn, &second, true).await.unwrap_err();
        match err {
            sqlx::Error::Database(db_err) => assert!(db_err.is_unique_violation()),
            other => panic!("unexpected error: {other:?}"),
        }
        drop(conn);

        let views = fetch_entry_views(&pool).await.unwrap();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].classroom_name, "Lab 1");
        assert_eq!(views[0].day_of_week, DayOfWeek::Monday);

        assert!(delete_entry(&pool, &views[0].id).await.unwrap());
        assert!(!delete_entry(&pool, &views[0].id).await.unwrap());
        assert!(fetch_entries(&pool).await.unwrap().is_empty());
    }
}
