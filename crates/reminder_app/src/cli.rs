use std::fs;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use reminder_core::{ScheduleOutcome, Task};

/// Reads a task JSON document from `path`, or from `stdin` when the path is `-`.
pub fn read_task(path: &Path, stdin: impl Read) -> Result<Task> {
    let raw = if path.as_os_str() == "-" {
        std::io::read_to_string(stdin).context("failed to read task from stdin")?
    } else {
        fs::read_to_string(path)
            .with_context(|| format!("failed to read task `{}`", path.display()))?
    };
    serde_json::from_str(&raw).context("task JSON is malformed")
}

pub fn describe_outcome(outcome: &ScheduleOutcome) -> String {
    match outcome {
        ScheduleOutcome::Scheduled(handle) => format!("scheduled {handle}"),
        ScheduleOutcome::Skipped(reason) => format!("skipped: {reason:?}"),
        ScheduleOutcome::Failed(err) => format!("failed: {err:#}"),
    }
}
