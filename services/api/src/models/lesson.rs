//! Lessons and their request/response payloads

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use super::InvalidValue;

/// Lesson status. Any status may be set from any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LessonStatus {
    Scheduled,
    Completed,
    Cancelled,
    Rescheduled,
}

impl LessonStatus {
    pub const ALL: [LessonStatus; 4] = [
        LessonStatus::Scheduled,
        LessonStatus::Completed,
        LessonStatus::Cancelled,
        LessonStatus::Rescheduled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LessonStatus::Scheduled => "scheduled",
            LessonStatus::Completed => "completed",
            LessonStatus::Cancelled => "cancelled",
            LessonStatus::Rescheduled => "rescheduled",
        }
    }
}

impl fmt::Display for LessonStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LessonStatus {
    type Err = InvalidValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LessonStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| InvalidValue::new("status", s))
    }
}

/// Wall-clock lesson time stored as `HH:MM`
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub const FORMAT: &str = "%H:%M";

    pub fn parse(s: &str) -> Option<NaiveTime> {
        NaiveTime::parse_from_str(s, FORMAT).ok()
    }

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse(&s).ok_or_else(|| D::Error::custom(format!("invalid time: {}", s)))
    }
}

/// Stored lesson, key `lesson:{studentId}:{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub id: String,
    pub title: String,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
    pub student_id: String,
    pub teacher_id: String,
    #[serde(default)]
    pub description: String,
    pub status: LessonStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Lesson {
    /// Last write time, used to pick between copies left by an interrupted move
    pub fn last_modified(&self) -> DateTime<Utc> {
        self.updated_at.unwrap_or(self.created_at)
    }
}

/// Body of `POST /lessons`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLessonRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub student_id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub teacher_id: Option<String>,
}

/// Body of `PUT /lessons/:id`; absent fields are left untouched
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLessonRequest {
    pub title: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub student_id: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub teacher_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LessonResponse {
    pub lesson: Lesson,
}

#[derive(Debug, Serialize)]
pub struct LessonsResponse {
    pub lessons: Vec<Lesson>,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub success: bool,
}
