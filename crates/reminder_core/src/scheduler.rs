use anyhow::Error;
use chrono::{Duration, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument, warn};

use crate::{
    clock::{Clock, SystemClock},
    config::SchedulerConfig,
    notifications::{
        AlertSink, LogAlertSink, NotificationContent, NotificationHandle, NotificationPayload,
        NotificationRequest, NotificationService, ScheduledNotification, Trigger,
    },
    task::{parse_due_date, parse_due_time, DueFields, DueParseError, Task, TaskField},
};

const QUICK_ADD_SUCCESS: (&str, &str) = ("Success! 🎉", "Task added successfully!");
const QUICK_ADD_FAILURE: (&str, &str) = ("Error", "Could not schedule notification");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingField(TaskField),
    InvalidDueDate,
    InvalidDueTime,
    Completed,
    DueInPast,
    /// The first daily occurrence would already fall after the due instant.
    PastDeadline,
}

#[derive(Debug)]
pub enum ScheduleOutcome {
    Scheduled(NotificationHandle),
    Skipped(SkipReason),
    Failed(Error),
}

impl ScheduleOutcome {
    pub fn handle(&self) -> Option<&NotificationHandle> {
        match self {
            ScheduleOutcome::Scheduled(handle) => Some(handle),
            _ => None,
        }
    }

    pub fn into_handle(self) -> Option<NotificationHandle> {
        match self {
            ScheduleOutcome::Scheduled(handle) => Some(handle),
            _ => None,
        }
    }

    pub fn skip_reason(&self) -> Option<SkipReason> {
        match self {
            ScheduleOutcome::Skipped(reason) => Some(*reason),
            _ => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ScheduleOutcome::Failed(_))
    }
}

/// Input of the quick-add path: raw strings straight from a form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QuickAdd {
    pub title: String,
    pub due_date: String,
    pub due_time: String,
}

pub struct NotificationScheduler {
    service: Box<dyn NotificationService>,
    alerts: Box<dyn AlertSink>,
    clock: Box<dyn Clock>,
    config: SchedulerConfig,
}

pub struct NotificationSchedulerBuilder {
    service: Box<dyn NotificationService>,
    alerts: Option<Box<dyn AlertSink>>,
    clock: Option<Box<dyn Clock>>,
    config: SchedulerConfig,
}

impl NotificationSchedulerBuilder {
    pub fn new(service: Box<dyn NotificationService>) -> Self {
        Self {
            service,
            alerts: None,
            clock: None,
            config: SchedulerConfig::default(),
        }
    }

    pub fn with_alert_sink(mut self, alerts: Box<dyn AlertSink>) -> Self {
        self.alerts = Some(alerts);
        self
    }

    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn with_config(mut self, config: SchedulerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> NotificationScheduler {
        NotificationScheduler {
            service: self.service,
            alerts: self.alerts.unwrap_or_else(|| Box::new(LogAlertSink)),
            clock: self.clock.unwrap_or_else(|| Box::new(SystemClock)),
            config: self.config,
        }
    }
}

/// Parsed and validated pieces of a task, ready for a schedule request.
struct PreparedTask<'a> {
    title: &'a str,
    due: NaiveDateTime,
}

impl NotificationScheduler {
    pub fn builder(service: Box<dyn NotificationService>) -> NotificationSchedulerBuilder {
        NotificationSchedulerBuilder::new(service)
    }

    /// Schedules a single reminder at the task's due instant, replacing any previous one.
    #[instrument(skip(self, task), fields(task_id = %task.id))]
    pub async fn schedule_one_time(&self, task: &Task) -> ScheduleOutcome {
        const OPERATION: &str = "schedule_one_time";
        let prepared = match self.prepare(task, OPERATION).await {
            Ok(fields) => match Self::resolve_due(fields, OPERATION) {
                Ok(prepared) => prepared,
                Err(reason) => return ScheduleOutcome::Skipped(reason),
            },
            Err(reason) => return ScheduleOutcome::Skipped(reason),
        };

        if task.completed {
            debug!("task already completed; nothing scheduled");
            return ScheduleOutcome::Skipped(SkipReason::Completed);
        }
        if prepared.due <= self.clock.now() {
            debug!(due = %prepared.due, "due instant already passed; nothing scheduled");
            return ScheduleOutcome::Skipped(SkipReason::DueInPast);
        }

        let request = NotificationRequest {
            content: self.content(&prepared, &task.id, false),
            trigger: Trigger::At {
                instant: prepared.due,
            },
        };
        self.submit(request, "error scheduling notification").await
    }

    /// Schedules a daily reminder at the task's due time, starting from the next occurrence.
    #[instrument(skip(self, task), fields(task_id = %task.id))]
    pub async fn schedule_recurring_daily(&self, task: &Task) -> ScheduleOutcome {
        const OPERATION: &str = "schedule_recurring_daily";
        let fields = match self.prepare(task, OPERATION).await {
            Ok(fields) => fields,
            Err(reason) => return ScheduleOutcome::Skipped(reason),
        };

        // Completion wins over malformed due fields on this path.
        if task.completed {
            debug!("task already completed; nothing scheduled");
            return ScheduleOutcome::Skipped(SkipReason::Completed);
        }
        let prepared = match Self::resolve_due(fields, OPERATION) {
            Ok(prepared) => prepared,
            Err(reason) => return ScheduleOutcome::Skipped(reason),
        };

        let now = self.clock.now();
        let reminder_time = prepared.due.time();
        let mut first_reminder = now.date().and_time(reminder_time);
        if first_reminder <= now {
            first_reminder += Duration::days(1);
        }
        if first_reminder > prepared.due {
            debug!(
                first = %first_reminder,
                due = %prepared.due,
                "first daily occurrence falls after the due instant; nothing scheduled"
            );
            return ScheduleOutcome::Skipped(SkipReason::PastDeadline);
        }

        let request = NotificationRequest {
            content: self.content(&prepared, &task.id, true),
            trigger: Trigger::Daily {
                hour: reminder_time.hour(),
                minute: reminder_time.minute(),
            },
        };
        self.submit(request, "error scheduling recurring reminder").await
    }

    /// Returns `false` without touching the service when no handle is given.
    #[instrument(skip(self))]
    pub async fn cancel(&self, handle: Option<&NotificationHandle>) -> bool {
        let Some(handle) = handle.filter(|handle| !handle.is_empty()) else {
            return false;
        };
        match self.service.cancel(handle).await {
            Ok(()) => {
                debug!(%handle, "notification cancelled");
                true
            }
            Err(err) => {
                error!(%handle, error = %err, "error canceling notification");
                false
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn cancel_all(&self) -> bool {
        match self.service.cancel_all().await {
            Ok(()) => {
                debug!("all notifications cancelled");
                true
            }
            Err(err) => {
                error!(error = %err, "error canceling all notifications");
                false
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn list_scheduled(&self) -> Vec<ScheduledNotification> {
        match self.service.list_scheduled().await {
            Ok(scheduled) => scheduled,
            Err(err) => {
                error!(error = %err, "error getting scheduled notifications");
                Vec::new()
            }
        }
    }

    /// Schedules a reminder straight from form input and reports the result through an alert.
    ///
    /// Unlike [`Self::schedule_one_time`] this path does not check whether the due instant
    /// is still in the future.
    #[instrument(skip(self, input), fields(title = %input.title))]
    pub async fn quick_add_and_notify(&self, input: &QuickAdd) {
        let (title, message) = match self.quick_add(input).await {
            Ok(handle) => {
                debug!(%handle, "quick-add reminder scheduled");
                QUICK_ADD_SUCCESS
            }
            Err(err) => {
                error!(error = %err, "quick-add failed");
                QUICK_ADD_FAILURE
            }
        };
        self.alerts.show(title, message);
    }
}

impl NotificationScheduler {
    async fn quick_add(&self, input: &QuickAdd) -> anyhow::Result<NotificationHandle> {
        let date = parse_due_date(&input.due_date)?;
        let time = parse_due_time(&input.due_time)?;
        let due = date.and_time(time);
        let request = NotificationRequest {
            content: NotificationContent {
                title: format!("Reminder for {}", input.title),
                body: self.config.quick_add_body(due),
                play_sound: self.config.play_sound,
                payload: NotificationPayload::default(),
            },
            trigger: Trigger::At { instant: due },
        };
        self.service.schedule(request).await
    }

    /// Shared field validation and pre-cancellation of both task scheduling paths.
    async fn prepare<'a>(
        &self,
        task: &'a Task,
        operation: &str,
    ) -> Result<DueFields<'a>, SkipReason> {
        let fields = match task.due_fields() {
            Ok(fields) => fields,
            Err(field) => {
                warn!(%operation, %field, "missing task field");
                return Err(SkipReason::MissingField(field));
            }
        };

        if let Some(previous) = task.notification_id.as_ref().filter(|h| !h.is_empty()) {
            if let Err(err) = self.service.cancel(previous).await {
                warn!(
                    %operation,
                    handle = %previous,
                    error = %err,
                    "unable to cancel previous notification"
                );
            }
        }

        Ok(fields)
    }

    fn resolve_due<'a>(
        fields: DueFields<'a>,
        operation: &str,
    ) -> Result<PreparedTask<'a>, SkipReason> {
        match fields.due_instant() {
            Ok(due) => Ok(PreparedTask {
                title: fields.title,
                due,
            }),
            Err(err) => {
                warn!(%operation, error = %err, "invalid task due fields");
                Err(match err {
                    DueParseError::Date(_) => SkipReason::InvalidDueDate,
                    DueParseError::Time(_) => SkipReason::InvalidDueTime,
                })
            }
        }
    }

    fn content(
        &self,
        prepared: &PreparedTask<'_>,
        task_id: &str,
        recurring: bool,
    ) -> NotificationContent {
        NotificationContent {
            title: format!("Reminder for {}", prepared.title),
            body: self.config.due_body(prepared.due),
            play_sound: self.config.play_sound,
            payload: NotificationPayload {
                task_id: Some(task_id.to_string()),
                is_recurring: recurring,
            },
        }
    }

    async fn submit(&self, request: NotificationRequest, failure: &str) -> ScheduleOutcome {
        match self.service.schedule(request).await {
            Ok(handle) => {
                debug!(%handle, "notification scheduled");
                ScheduleOutcome::Scheduled(handle)
            }
            Err(err) => {
                error!(error = %err, "{failure}");
                ScheduleOutcome::Failed(err)
            }
        }
    }
}
