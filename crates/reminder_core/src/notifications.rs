use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identifier handed out by a notification service.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationHandle(String);

impl NotificationHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<&str> for NotificationHandle {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for NotificationHandle {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for NotificationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_recurring: bool,
}

impl NotificationPayload {
    pub fn is_empty(&self) -> bool {
        self.task_id.is_none() && !self.is_recurring
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotificationContent {
    pub title: String,
    pub body: String,
    pub play_sound: bool,
    #[serde(default, skip_serializing_if = "NotificationPayload::is_empty")]
    pub payload: NotificationPayload,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Trigger {
    /// Fires once at a local wall-clock instant.
    At { instant: NaiveDateTime },
    /// Fires every day at the given local hour and minute until cancelled.
    Daily { hour: u32, minute: u32 },
}

impl Trigger {
    pub fn repeats(&self) -> bool {
        matches!(self, Trigger::Daily { .. })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotificationRequest {
    pub content: NotificationContent,
    pub trigger: Trigger,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScheduledNotification {
    pub handle: NotificationHandle,
    pub request: NotificationRequest,
}

/// Platform-specific notification adapters implement this trait.
#[async_trait]
pub trait NotificationService: Send + Sync {
    async fn schedule(&self, request: NotificationRequest) -> Result<NotificationHandle>;
    async fn cancel(&self, handle: &NotificationHandle) -> Result<()>;
    async fn cancel_all(&self) -> Result<()>;
    async fn list_scheduled(&self) -> Result<Vec<ScheduledNotification>>;
}

#[async_trait]
impl<T: NotificationService + ?Sized> NotificationService for Arc<T> {
    async fn schedule(&self, request: NotificationRequest) -> Result<NotificationHandle> {
        (**self).schedule(request).await
    }

    async fn cancel(&self, handle: &NotificationHandle) -> Result<()> {
        (**self).cancel(handle).await
    }

    async fn cancel_all(&self) -> Result<()> {
        (**self).cancel_all().await
    }

    async fn list_scheduled(&self) -> Result<Vec<ScheduledNotification>> {
        (**self).list_scheduled().await
    }
}

/// User-facing dialog primitive.
pub trait AlertSink: Send + Sync {
    fn show(&self, title: &str, message: &str);
}

/// Alert sink for headless callers; alerts end up in the log only.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogAlertSink;

impl AlertSink for LogAlertSink {
    fn show(&self, title: &str, message: &str) {
        tracing::info!(%title, %message, "alert");
    }
}

/// Keeps scheduled notifications in process memory. Nothing ever fires.
#[derive(Debug, Default)]
pub struct InMemoryNotificationService {
    scheduled: RwLock<BTreeMap<NotificationHandle, NotificationRequest>>,
}

impl InMemoryNotificationService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.scheduled.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.scheduled.read().is_empty()
    }

    pub fn get(&self, handle: &NotificationHandle) -> Option<NotificationRequest> {
        self.scheduled.read().get(handle).cloned()
    }
}

#[async_trait]
impl NotificationService for InMemoryNotificationService {
    async fn schedule(&self, request: NotificationRequest) -> Result<NotificationHandle> {
        let handle = NotificationHandle::new(Uuid::new_v4().to_string());
        self.scheduled.write().insert(handle.clone(), request);
        Ok(handle)
    }

    async fn cancel(&self, handle: &NotificationHandle) -> Result<()> {
        self.scheduled
            .write()
            .remove(handle)
            .map(|_| ())
            .ok_or_else(|| anyhow!("no scheduled notification `{handle}`"))
    }

    async fn cancel_all(&self) -> Result<()> {
        self.scheduled.write().clear();
        Ok(())
    }

    async fn list_scheduled(&self) -> Result<Vec<ScheduledNotification>> {
        Ok(self
            .scheduled
            .read()
            .iter()
            .map(|(handle, request)| ScheduledNotification {
                handle: handle.clone(),
                request: request.clone(),
            })
            .collect())
    }
}
