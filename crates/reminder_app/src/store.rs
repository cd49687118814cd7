use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use parking_lot::RwLock;
use reminder_core::notifications::{
    NotificationHandle, NotificationRequest, NotificationService, ScheduledNotification,
};
use uuid::Uuid;

/// Desktop stand-in for the platform notification service. Scheduled requests are kept
/// in a JSON file so they survive between CLI invocations.
pub struct FileNotificationService {
    path: PathBuf,
    scheduled: RwLock<BTreeMap<NotificationHandle, NotificationRequest>>,
}

impl FileNotificationService {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let scheduled = if path.exists() {
            let raw = fs::read_to_string(&path)
                .with_context(|| format!("failed to read `{}`", path.display()))?;
            if raw.trim().is_empty() {
                BTreeMap::new()
            } else {
                let entries: Vec<ScheduledNotification> = serde_json::from_str(&raw)
                    .with_context(|| {
                        format!("malformed notification store `{}`", path.display())
                    })?;
                entries
                    .into_iter()
                    .map(|entry| (entry.handle, entry.request))
                    .collect()
            }
        } else {
            BTreeMap::new()
        };
        tracing::debug!(
            path = %path.display(),
            count = scheduled.len(),
            "notification store opened"
        );
        Ok(Self {
            path,
            scheduled: RwLock::new(scheduled),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, scheduled: &BTreeMap<NotificationHandle, NotificationRequest>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(&Self::entries(scheduled))?;
        fs::write(&self.path, json)
            .with_context(|| format!("failed to write `{}`", self.path.display()))
    }

    fn entries(
        scheduled: &BTreeMap<NotificationHandle, NotificationRequest>,
    ) -> Vec<ScheduledNotification> {
        scheduled
            .iter()
            .map(|(handle, request)| ScheduledNotification {
                handle: handle.clone(),
                request: request.clone(),
            })
            .collect()
    }
}

#[async_trait]
impl NotificationService for FileNotificationService {
    async fn schedule(&self, request: NotificationRequest) -> Result<NotificationHandle> {
        let handle = NotificationHandle::new(Uuid::new_v4().to_string());
        let mut scheduled = self.scheduled.write();
        scheduled.insert(handle.clone(), request);
        if let Err(err) = self.persist(&scheduled) {
            scheduled.remove(&handle);
            return Err(err);
        }
        Ok(handle)
    }

    async fn cancel(&self, handle: &NotificationHandle) -> Result<()> {
        let mut scheduled = self.scheduled.write();
        let removed = scheduled
            .remove(handle)
            .ok_or_else(|| anyhow!("no scheduled notification `{handle}`"))?;
        if let Err(err) = self.persist(&scheduled) {
            scheduled.insert(handle.clone(), removed);
            return Err(err);
        }
        Ok(())
    }

    async fn cancel_all(&self) -> Result<()> {
        let mut scheduled = self.scheduled.write();
        self.persist(&BTreeMap::new())?;
        scheduled.clear();
        Ok(())
    }

    async fn list_scheduled(&self) -> Result<Vec<ScheduledNotification>> {
        Ok(Self::entries(&self.scheduled.read()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reminder_core::notifications::{NotificationContent, NotificationPayload, Trigger};
    use tempfile::tempdir;

    fn daily(title: &str) -> NotificationRequest {
        NotificationRequest {
            content: NotificationContent {
                title: title.to_string(),
                body: "Due on 01/02/2025 at 08:00".to_string(),
                play_sound: true,
                payload: NotificationPayload {
                    task_id: Some("t1".into()),
                    is_recurring: true,
                },
            },
            trigger: Trigger::Daily { hour: 8, minute: 0 },
        }
    }

    #[tokio::test]
    async fn scheduled_notifications_survive_reopen() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("nested").join("store.json");

        let store = FileNotificationService::open(&path).expect("open store");
        let handle = store.schedule(daily("Stretch")).await.expect("schedule");
        drop(store);

        let reopened = FileNotificationService::open(&path).expect("reopen store");
        let listed = reopened.list_scheduled().await.expect("list");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].handle, handle);
        assert_eq!(listed[0].request, daily("Stretch"));
    }

    #[tokio::test]
    async fn cancel_unknown_handle_fails_and_cancel_all_clears_file() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("store.json");
        let store = FileNotificationService::open(&path).expect("open store");
        store.schedule(daily("a")).await.expect("schedule a");
        store.schedule(daily("b")).await.expect("schedule b");

        assert!(store
            .cancel(&NotificationHandle::from("missing"))
            .await
            .is_err());

        store.cancel_all().await.expect("cancel all");
        let reopened = FileNotificationService::open(&path).expect("reopen store");
        assert!(reopened.list_scheduled().await.expect("list").is_empty());
    }

    #[test]
    fn malformed_store_is_reported() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("store.json");
        fs::write(&path, "{not json").expect("write fixture");
        assert!(FileNotificationService::open(&path).is_err());
    }
}
