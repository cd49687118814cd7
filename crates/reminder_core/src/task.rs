use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::notifications::NotificationHandle;

/// A task as handed over by the caller's storage layer. The scheduler never owns it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub due_time: Option<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub notification_id: Option<NotificationHandle>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TaskField {
    Title,
    DueDate,
    DueTime,
}

impl fmt::Display for TaskField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TaskField::Title => "title",
            TaskField::DueDate => "dueDate",
            TaskField::DueTime => "dueTime",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DueParseError {
    #[error("unrecognised due date `{0}`")]
    Date(String),
    #[error("unrecognised due time `{0}`")]
    Time(String),
}

/// Borrowed view of the three fields every scheduling path requires.
#[derive(Debug, Clone, Copy)]
pub struct DueFields<'a> {
    pub title: &'a str,
    pub due_date: &'a str,
    pub due_time: &'a str,
}

impl DueFields<'_> {
    pub fn due_instant(&self) -> Result<NaiveDateTime, DueParseError> {
        let date = parse_due_date(self.due_date)?;
        let time = parse_due_time(self.due_time)?;
        Ok(date.and_time(time))
    }
}

impl Task {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn due_on(mut self, date: impl Into<String>, time: impl Into<String>) -> Self {
        self.due_date = Some(date.into());
        self.due_time = Some(time.into());
        self
    }

    pub fn completed(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }

    pub fn with_notification(mut self, handle: impl Into<NotificationHandle>) -> Self {
        self.notification_id = Some(handle.into());
        self
    }

    /// Returns the first required field that is absent or blank.
    pub fn due_fields(&self) -> Result<DueFields<'_>, TaskField> {
        let title = non_blank(&self.title).ok_or(TaskField::Title)?;
        let due_date = non_blank(&self.due_date).ok_or(TaskField::DueDate)?;
        let due_time = non_blank(&self.due_time).ok_or(TaskField::DueTime)?;
        Ok(DueFields {
            title,
            due_date,
            due_time,
        })
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Accepts `YYYY-MM-DD`, `YYYY/MM/DD` and the day-first forms `DD/MM/YYYY`, `DD-MM-YYYY`.
pub fn parse_due_date(raw: &str) -> Result<NaiveDate, DueParseError> {
    let normalized = raw.trim().replace('/', "-");
    let parts: Vec<&str> = normalized.split('-').collect();
    let format = match parts.as_slice() {
        [year, _, _] if year.len() == 4 => "%Y-%m-%d",
        [_, _, year] if year.len() == 4 => "%d-%m-%Y",
        _ => return Err(DueParseError::Date(raw.to_string())),
    };
    NaiveDate::parse_from_str(&normalized, format)
        .map_err(|_| DueParseError::Date(raw.to_string()))
}

/// Parses a 24-hour `HH:MM` value. Seconds are always zero.
pub fn parse_due_time(raw: &str) -> Result<NaiveTime, DueParseError> {
    let candidate = raw.trim();
    let (hours, minutes) = candidate
        .split_once(':')
        .ok_or_else(|| DueParseError::Time(raw.to_string()))?;
    let hour = hours.trim().parse::<u32>().ok();
    let minute = minutes.trim().parse::<u32>().ok();
    let time = match (hour, minute) {
        (Some(hour), Some(minute)) => NaiveTime::from_hms_opt(hour, minute, 0),
        _ => None,
    };
    time.ok_or_else(|| DueParseError::Time(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dash_and_slash_year_first_dates() {
        let expected = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
        assert_eq!(parse_due_date("2025-01-10"), Ok(expected));
        assert_eq!(parse_due_date("2025/01/10"), Ok(expected));
    }

    #[test]
    fn parses_day_first_dates() {
        let expected = NaiveDate::from_ymd_opt(2025, 9, 20).unwrap();
        assert_eq!(parse_due_date("20/09/2025"), Ok(expected));
        assert_eq!(parse_due_date("20-09-2025"), Ok(expected));
    }

    #[test]
    fn rejects_garbage_dates_and_times() {
        assert!(matches!(parse_due_date("tomorrow"), Err(DueParseError::Date(_))));
        assert!(matches!(parse_due_date("2025-13-01"), Err(DueParseError::Date(_))));
        assert!(matches!(parse_due_date("20/09/25"), Err(DueParseError::Date(_))));
        assert!(matches!(parse_due_date("25-09-20"), Err(DueParseError::Date(_))));
        assert!(matches!(parse_due_time("9am"), Err(DueParseError::Time(_))));
        assert!(matches!(parse_due_time("24:00"), Err(DueParseError::Time(_))));
    }

    #[test]
    fn due_instant_zeroes_seconds() {
        let task = Task::new("1", "Pay rent").due_on("2025-01-10", "09:05");
        let due = task.due_fields().unwrap().due_instant().unwrap();
        assert_eq!(
            due,
            NaiveDate::from_ymd_opt(2025, 1, 10)
                .unwrap()
                .and_hms_opt(9, 5, 0)
                .unwrap()
        );
    }

    #[test]
    fn blank_fields_count_as_missing() {
        let mut task = Task::new("1", "  ").due_on("2025-01-10", "09:00");
        assert_eq!(task.due_fields().unwrap_err(), TaskField::Title);

        task.title = Some("Pay rent".into());
        task.due_time = None;
        assert_eq!(task.due_fields().unwrap_err(), TaskField::DueTime);
    }

    #[test]
    fn deserializes_camel_case_task() {
        let raw = r#"{"id":"7","title":"Pay rent","dueDate":"2025/01/10","dueTime":"09:00","notificationId":"abc"}"#;
        let task: Task = serde_json::from_str(raw).unwrap();
        assert_eq!(task.due_date.as_deref(), Some("2025/01/10"));
        assert!(!task.completed);
        assert_eq!(task.notification_id, Some(NotificationHandle::from("abc")));
    }
}
