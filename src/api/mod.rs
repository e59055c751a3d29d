use axum::Json;
use axum::extract::{Path, Query};
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::{delete, post};
use axum::{Router, extract::State, http::StatusCode, routing::get};
use serde::Deserialize;

use crate::conflict::{self, Violation};
use crate::db::repository;
use crate::error::AppError;
use crate::models::*;
use crate::services::GenerationReport;
use crate::state::AppState;
use crate::views::{self, FilterType, FilteredView, GroupedByDay, Timeframe, ViewFilter};

#[derive(Deserialize)]
struct StudentTimetableParams {
    group_id: Option<String>,
}

#[derive(Deserialize)]
struct ViewParams {
    #[serde(rename = "type")]
    filter_type: FilterType,
    #[serde(default)]
    timeframe: Timeframe,
    value: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/courses", get(list_courses).post(create_course))
        .route("/admins", get(list_faculty).post(create_faculty))
        .route("/classrooms", get(list_classrooms).post(create_classroom))
        .route("/time-slots", get(list_time_slots).post(create_time_slot))
        .route("/student-groups", get(list_student_groups).post(create_student_group))
        .route("/timetable", get(list_timetable).post(create_entry))
        .route("/timetable/student", get(student_timetable))
        .route("/timetable/generate", post(generate_timetable))
        .route("/timetable/by-day", get(timetable_by_day))
        .route("/timetable/view", get(filtered_view))
        .route("/timetable/export", get(export_csv))
        .route("/timetable/audit", get(audit_timetable))
        .route("/timetable/{id}", delete(delete_entry))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1").execute(state.store.db()).await?;
    Ok(StatusCode::OK)
}

fn require_text(value: &str, field: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        Err(AppError::Validation(format!("{} is required", field)))
    } else {
        Ok(())
    }
}

async fn list_courses(State(state): State<AppState>) -> Result<Json<Vec<Course>>, AppError> {
    let courses = repository::fetch_courses(state.store.db()).await?;
    Ok(Json(courses))
}

async fn create_course(
    State(state): State<AppState>,
    Json(req): Json<NewCourseRequest>,
) -> Result<(StatusCode, Json<Course>), AppError> {
    require_text(&req.name, "name")?;
    let course = repository::insert_course(state.store.db(), req).await?;
    Ok((StatusCode::CREATED, Json(course)))
}

async fn list_faculty(State(state): State<AppState>) -> Result<Json<Vec<Faculty>>, AppError> {
    let faculty = repository::fetch_faculty(state.store.db()).await?;
    Ok(Json(faculty))
}

async fn create_faculty(
    State(state): State<AppState>,
    Json(req): Json<NewFacultyRequest>,
) -> Result<(StatusCode, Json<Faculty>), AppError> {
    require_text(&req.full_name, "full_name")?;
    let faculty = repository::insert_faculty(state.store.db(), req).await?;
    Ok((StatusCode::CREATED, Json(faculty)))
}

async fn list_classrooms(State(state): State<AppState>) -> Result<Json<Vec<Classroom>>, AppError> {
    let classrooms = repository::fetch_classrooms(state.store.db()).await?;
    Ok(Json(classrooms))
}

async fn create_classroom(
    State(state): State<AppState>,
    Json(req): Json<NewClassroomRequest>,
) -> Result<(StatusCode, Json<Classroom>), AppError> {
    require_text(&req.name, "name")?;
    let classroom = repository::insert_classroom(state.store.db(), req).await?;
    Ok((StatusCode::CREATED, Json(classroom)))
}

async fn list_time_slots(State(state): State<AppState>) -> Result<Json<Vec<TimeSlot>>, AppError> {
    let slots = repository::fetch_time_slots(state.store.db()).await?;
    Ok(Json(slots))
}

async fn create_time_slot(
    State(state): State<AppState>,
    Json(req): Json<NewTimeSlotRequest>,
) -> Result<(StatusCode, Json<TimeSlot>), AppError> {
    let req = req.normalized()?;
    let window = req.label();
    match repository::insert_time_slot(state.store.db(), req).await {
        Ok(slot) => Ok((StatusCode::CREATED, Json(slot))),
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(AppError::Validation(
            format!("time slot {} already exists", window),
        )),
        Err(e) => Err(e.into()),
    }
}

async fn list_student_groups(
    State(state): State<AppState>,
) -> Result<Json<Vec<StudentGroup>>, AppError> {
    let groups = repository::fetch_student_groups(state.store.db()).await?;
    Ok(Json(groups))
}

async fn create_student_group(
    State(state): State<AppState>,
    Json(req): Json<NewStudentGroupRequest>,
) -> Result<(StatusCode, Json<StudentGroup>), AppError> {
    require_text(&req.name, "name")?;
    if req.year <= 0 {
        return Err(AppError::Validation("year must be a positive number".to_string()));
    }
    let group = repository::insert_student_group(state.store.db(), req).await?;
    Ok((StatusCode::CREATED, Json(group)))
}

async fn list_timetable(
    State(state): State<AppState>,
) -> Result<Json<Vec<TimetableEntryView>>, AppError> {
    Ok(Json(state.store.entry_views().await?))
}

async fn student_timetable(
    State(state): State<AppState>,
    Query(params): Query<StudentTimetableParams>,
) -> Result<Json<Vec<TimetableEntryView>>, AppError> {
    let group_id = params
        .group_id
        .filter(|g| !g.trim().is_empty())
        .ok_or_else(|| AppError::Validation("group_id is required".to_string()))?;
    Ok(Json(state.store.entry_views_for_group(&group_id).await?))
}

async fn create_entry(
    State(state): State<AppState>,
    Json(req): Json<NewEntryRequest>,
) -> Result<(StatusCode, Json<TimetableEntry>), AppError> {
    let entry = state.store.create_entry(&req, true).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

async fn delete_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.store.delete_entry(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn generate_timetable(
    State(state): State<AppState>,
) -> Result<Json<GenerationReport>, AppError> {
    let report = state.generation().run().await?;
    Ok(Json(report))
}

async fn timetable_by_day(State(state): State<AppState>) -> Result<Json<GroupedByDay>, AppError> {
    let entries = state.store.entry_views().await?;
    Ok(Json(views::group_by_day(&entries)))
}

async fn load_view(state: &AppState, params: ViewParams) -> Result<FilteredView, AppError> {
    let filter = ViewFilter::from_parts(params.filter_type, params.timeframe, params.value.as_deref())?;
    let entries = state.store.entry_views().await?;
    let directory = state.store.directory().await?;
    Ok(views::apply_filter(&entries, &filter, &directory))
}

async fn filtered_view(
    State(state): State<AppState>,
    Query(params): Query<ViewParams>,
) -> Result<Json<FilteredView>, AppError> {
    Ok(Json(load_view(&state, params).await?))
}

async fn export_csv(
    State(state): State<AppState>,
    Query(params): Query<ViewParams>,
) -> Result<impl IntoResponse, AppError> {
    let view = load_view(&state, params).await?;
    let body = views::write_csv(&views::to_csv_rows(&view.entries))?;
    let headers = [
        (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", view.filename),
        ),
    ];
    Ok((headers, body))
}

async fn audit_timetable(State(state): State<AppState>) -> Result<Json<Vec<Violation>>, AppError> {
    let entries = state.store.entries().await?;
    Ok(Json(conflict::find_violations(&entries)))
}
