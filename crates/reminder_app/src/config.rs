use std::path::PathBuf;

use anyhow::Result;
use chrono::format::{Item, StrftimeItems};
use reminder_core::SchedulerConfig;
use tracing::{info, warn};

pub const DEFAULT_STORE_FILE: &str = "task_reminders.json";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub store_path: PathBuf,
    pub scheduler: SchedulerConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self::from_lookup(|key| std::env::var(key).ok()))
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(path) = lookup("TASK_REMINDERS_STORE") {
            let path = path.trim();
            if !path.is_empty() {
                info!(path, "using notification store from environment");
                config.store_path = PathBuf::from(path);
            }
        }
        if let Some(format) = lookup("TASK_REMINDERS_DATE_FORMAT") {
            if let Some(format) = valid_format("TASK_REMINDERS_DATE_FORMAT", &format) {
                config.scheduler.date_format = format;
            }
        }
        if let Some(format) = lookup("TASK_REMINDERS_TIME_FORMAT") {
            if let Some(format) = valid_format("TASK_REMINDERS_TIME_FORMAT", &format) {
                config.scheduler.time_format = format;
            }
        }
        if let Some(sound) = lookup("TASK_REMINDERS_SOUND") {
            match sound.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => config.scheduler.play_sound = true,
                "0" | "false" | "no" | "off" => config.scheduler.play_sound = false,
                other => warn!(value = other, "ignoring TASK_REMINDERS_SOUND"),
            }
        }
        config
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from(DEFAULT_STORE_FILE),
            scheduler: SchedulerConfig::default(),
        }
    }
}

/// Rejects empty or malformed strftime patterns and ones that need a time zone.
fn valid_format(key: &str, raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty()
        || StrftimeItems::new(trimmed).any(|item| matches!(item, Item::Error))
        || !SchedulerConfig::pattern_renders(trimmed)
    {
        warn!(key, value = raw, "ignoring malformed format string");
        return None;
    }
    Some(trimmed.to_string())
}
