use std::fmt::Write;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Controls how notification bodies render the due instant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SchedulerConfig {
    pub date_format: String,
    pub time_format: String,
    pub quick_add_date_format: String,
    pub quick_add_time_format: String,
    pub play_sound: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            date_format: "%d/%m/%Y".to_string(),
            time_format: "%H:%M".to_string(),
            quick_add_date_format: "%d/%m/%Y".to_string(),
            quick_add_time_format: "%I:%M %p".to_string(),
            play_sound: true,
        }
    }
}

impl SchedulerConfig {
    pub fn due_body(&self, due: NaiveDateTime) -> String {
        let defaults = Self::default();
        format_body(
            due,
            (self.date_format.as_str(), defaults.date_format.as_str()),
            (self.time_format.as_str(), defaults.time_format.as_str()),
        )
    }

    pub fn quick_add_body(&self, due: NaiveDateTime) -> String {
        let defaults = Self::default();
        format_body(
            due,
            (self.quick_add_date_format.as_str(), defaults.quick_add_date_format.as_str()),
            (self.quick_add_time_format.as_str(), defaults.quick_add_time_format.as_str()),
        )
    }

    /// Whether `pattern` can render a local wall-clock instant. Offset and zone
    /// specifiers parse fine but fail here, since the instant carries no zone.
    pub fn pattern_renders(pattern: &str) -> bool {
        let sample =
            NaiveDate::from_ymd_opt(2000, 1, 1).and_then(|date| date.and_hms_opt(0, 0, 0));
        sample.is_some_and(|sample| render(sample, pattern).is_some())
    }
}

fn render(due: NaiveDateTime, pattern: &str) -> Option<String> {
    let mut out = String::new();
    write!(out, "{}", due.format(pattern)).ok()?;
    Some(out)
}

/// Each pair is (configured pattern, fallback pattern).
fn format_body(due: NaiveDateTime, date: (&str, &str), time: (&str, &str)) -> String {
    let render_or_fallback = |(pattern, fallback): (&str, &str)| {
        render(due, pattern).unwrap_or_else(|| {
            warn!(pattern, "pattern cannot render a local instant; using default");
            render(due, fallback).unwrap_or_default()
        })
    };
    format!(
        "Due on {} at {}",
        render_or_fallback(date),
        render_or_fallback(time)
    )
}
