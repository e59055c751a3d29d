//! Read-only projections over the entry collection: per-day grouping,
//! day/group filters, view titles and CSV export rows.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::error;

use crate::directory::ResourceDirectory;
use crate::error::AppError;
use crate::models::time_slot::display_clock;
use crate::models::{DayOfWeek, TimetableEntryView};

pub type GroupedByDay = BTreeMap<DayOfWeek, Vec<TimetableEntryView>>;

pub const CSV_HEADERS: [&str; 7] = [
    "Day",
    "Start Time",
    "End Time",
    "Course",
    "Group",
    "Faculty",
    "Room",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterType {
    Day,
    Group,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    #[default]
    Single,
    Week,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewFilter {
    Day { day: DayOfWeek, timeframe: Timeframe },
    Group { group_id: String, timeframe: Timeframe },
}

impl ViewFilter {
    /// Builds a filter from the three loose values a filter form submits.
    /// A day filter over the full week needs no value.
    pub fn from_parts(
        filter_type: FilterType,
        timeframe: Timeframe,
        value: Option<&str>,
    ) -> Result<Self, AppError> {
        let value = value.map(str::trim).filter(|v| !v.is_empty());
        match (filter_type, value) {
            (FilterType::Day, Some(v)) => Ok(ViewFilter::Day {
                day: v.parse()?,
                timeframe,
            }),
            (FilterType::Day, None) if timeframe == Timeframe::Week => Ok(ViewFilter::Day {
                day: DayOfWeek::Monday,
                timeframe,
            }),
            (FilterType::Day, None) => Err(AppError::Validation("a day is required".to_string())),
            (FilterType::Group, Some(v)) => Ok(ViewFilter::Group {
                group_id: v.to_string(),
                timeframe,
            }),
            (FilterType::Group, None) => {
                Err(AppError::Validation("a student group is required".to_string()))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilteredView {
    pub title: String,
    pub filename: String,
    pub entries: Vec<TimetableEntryView>,
}

/// One export row, columns in the fixed export order. Times are `HH:MM`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CsvRow {
    pub day: String,
    pub start_time: String,
    pub end_time: String,
    pub course_name: String,
    pub group_name: String,
    pub faculty_name: String,
    pub classroom_name: String,
}

/// Partitions entries by day; each day is ordered by start time. Stable for equal starts.
pub fn group_by_day(entries: &[TimetableEntryView]) -> GroupedByDay {
    let mut grouped = GroupedByDay::new();
    for entry in entries {
        grouped
            .entry(entry.day_of_week)
            .or_default()
            .push(entry.clone());
    }
    for day_entries in grouped.values_mut() {
        day_entries.sort_by(|a, b| a.start_time.cmp(&b.start_time));
    }
    grouped
}

pub fn filter_by_day(entries: &[TimetableEntryView], day: DayOfWeek) -> Vec<TimetableEntryView> {
    entries
        .iter()
        .filter(|e| e.day_of_week == day)
        .cloned()
        .collect()
}

pub fn filter_by_group(entries: &[TimetableEntryView], group_id: &str) -> Vec<TimetableEntryView> {
    entries
        .iter()
        .filter(|e| e.student_group_id == group_id)
        .cloned()
        .collect()
}

pub fn view_title(filter: &ViewFilter, group_name: &str) -> String {
    match filter {
        ViewFilter::Day { timeframe: Timeframe::Week, .. } => "Full Week Timetable".to_string(),
        ViewFilter::Day { day, .. } => format!("Timetable for {}", day),
        ViewFilter::Group { timeframe: Timeframe::Week, .. } => {
            format!("Full Week Timetable for {}", group_name)
        }
        ViewFilter::Group { .. } => format!("Timetable for {}", group_name),
    }
}

/// Title with each whitespace run replaced by `-`, plus `.csv`.
pub fn export_filename(title: &str) -> String {
    let mut out = String::with_capacity(title.len() + 4);
    let mut in_space = false;
    for ch in title.chars() {
        if ch.is_whitespace() {
            if !in_space {
                out.push('-');
            }
            in_space = true;
        } else {
            out.push(ch);
            in_space = false;
        }
    }
    out.push_str(".csv");
    out
}

pub fn apply_filter(
    entries: &[TimetableEntryView],
    filter: &ViewFilter,
    directory: &ResourceDirectory,
) -> FilteredView {
    let (selected, group_name) = match filter {
        ViewFilter::Day { day, timeframe } => {
            let selected = match timeframe {
                Timeframe::Single => filter_by_day(entries, *day),
                Timeframe::Week => entries.to_vec(),
            };
            (selected, String::new())
        }
        ViewFilter::Group { group_id, .. } => {
            let selected = filter_by_group(entries, group_id);
            let group_name = directory
                .group_name(group_id)
                .map(str::to_string)
                .or_else(|| selected.first().map(|e| e.group_name.clone()))
                .unwrap_or_default();
            (selected, group_name)
        }
    };

    let title = view_title(filter, &group_name);
    FilteredView {
        filename: export_filename(&title),
        title,
        entries: selected,
    }
}

pub fn to_csv_rows(entries: &[TimetableEntryView]) -> Vec<CsvRow> {
    entries
        .iter()
        .map(|e| CsvRow {
            day: e.day_of_week.to_string(),
            start_time: display_clock(&e.start_time).to_string(),
            end_time: display_clock(&e.end_time).to_string(),
            course_name: e.course_name.clone(),
            group_name: e.group_name.clone(),
            faculty_name: e.faculty_name.clone(),
            classroom_name: e.classroom_name.clone(),
        })
        .collect()
}

/// Renders rows as a CSV document with a header line, even when there are no rows.
pub fn write_csv(rows: &[CsvRow]) -> Result<String, AppError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(CSV_HEADERS).map_err(csv_failure)?;
    for row in rows {
        writer.serialize(row).map_err(csv_failure)?;
    }

    let bytes = writer.into_inner().map_err(|e| {
        error!("csv flush failed: {}", e);
        AppError::InternalServerError
    })?;
    String::from_utf8(bytes).map_err(|e| {
        error!("csv output is not utf-8: {}", e);
        AppError::InternalServerError
    })
}

fn csv_failure(err: csv::Error) -> AppError {
    error!("csv write failed: {}", err);
    AppError::InternalServerError
}
