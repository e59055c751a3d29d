pub mod entry;
pub mod resource;
pub mod time_slot;

pub use entry::{NewEntryRequest, Placement, TimetableEntry, TimetableEntryView};
pub use resource::{
    Classroom, Course, FACULTY_ROLE, Faculty, NewClassroomRequest, NewCourseRequest, NewFacultyRequest,
    NewStudentGroupRequest, StudentGroup,
};
pub use time_slot::{DayOfWeek, NewTimeSlotRequest, TimeError, TimeSlot};
