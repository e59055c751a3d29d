use std::fmt;
use std::str::FromStr;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TimeError {
    #[error("unknown day of week: {0}")]
    UnknownDay(String),

    #[error("invalid clock time {0:?}, expected HH:MM or HH:MM:SS")]
    InvalidClock(String),

    #[error("start time {start} must be before end time {end}")]
    EmptyWindow { start: String, end: String },
}

/// Teaching days. Declaration order is calendar order, which `Ord` relies on.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 5] = [
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DayOfWeek::Monday => "Monday",
            DayOfWeek::Tuesday => "Tuesday",
            DayOfWeek::Wednesday => "Wednesday",
            DayOfWeek::Thursday => "Thursday",
            DayOfWeek::Friday => "Friday",
        }
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DayOfWeek {
    type Err = TimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        let day = match lowered.as_str() {
            "monday" | "mon" => DayOfWeek::Monday,
            "tuesday" | "tue" => DayOfWeek::Tuesday,
            "wednesday" | "wed" => DayOfWeek::Wednesday,
            "thursday" | "thu" => DayOfWeek::Thursday,
            "friday" | "fri" => DayOfWeek::Friday,
            _ => return Err(TimeError::UnknownDay(s.to_string())),
        };
        Ok(day)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct TimeSlot {
    pub id: String,
    pub day_of_week: DayOfWeek,
    /// Zero-padded `HH:MM:SS`; lexicographic order equals chronological order.
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTimeSlotRequest {
    pub day_of_week: DayOfWeek,
    pub start_time: String,
    pub end_time: String,
}

impl NewTimeSlotRequest {
    pub fn label(&self) -> String {
        format!(
            "{} {}-{}",
            self.day_of_week,
            display_clock(&self.start_time),
            display_clock(&self.end_time)
        )
    }

    /// Returns the request with both times normalised to `HH:MM:SS`.
    pub fn normalized(self) -> Result<Self, TimeError> {
        let start_time = normalize_clock(&self.start_time)?;
        let end_time = normalize_clock(&self.end_time)?;
        if start_time >= end_time {
            return Err(TimeError::EmptyWindow {
                start: start_time,
                end: end_time,
            });
        }
        Ok(Self {
            day_of_week: self.day_of_week,
            start_time,
            end_time,
        })
    }
}

/// Parses `HH:MM` or `HH:MM:SS` (24-hour) and re-renders it zero-padded as `HH:MM:SS`.
pub fn normalize_clock(raw: &str) -> Result<String, TimeError> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .map(|t| t.format("%H:%M:%S").to_string())
        .map_err(|_| TimeError::InvalidClock(raw.to_string()))
}

/// `HH:MM` for display; the stored value keeps its seconds.
pub fn display_clock(stored: &str) -> &str {
    stored.get(..5).unwrap_or(stored)
}
