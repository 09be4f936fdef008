use crate::domain::notification::Notification;
use crate::domain::ports::Notifier;
use crate::error::Result;
use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Renders notifications and writes them to the log instead of sending them.
#[derive(Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, notification: Notification) -> Result<()> {
        tracing::info!(
            to = ?notification.recipients(),
            subject = %notification.subject(),
            "{}",
            notification.body()
        );
        Ok(())
    }
}

#[derive(Serialize)]
struct OutboxEntry<'a> {
    queued_at: chrono::DateTime<Utc>,
    to: Vec<String>,
    subject: String,
    body: String,
    notification: &'a Notification,
}

/// Queues notifications as JSON lines in a spool file for a mailer to pick up.
#[derive(Clone)]
pub struct OutboxNotifier {
    path: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl OutboxNotifier {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Arc::new(Mutex::new(())),
        }
    }
}

#[async_trait]
impl Notifier for OutboxNotifier {
    async fn notify(&self, notification: Notification) -> Result<()> {
        let entry = OutboxEntry {
            queued_at: Utc::now(),
            to: notification.recipients(),
            subject: notification.subject(),
            body: notification.body(),
            notification: &notification,
        };
        let mut line = serde_json::to_vec(&entry)?;
        line.push(b'\n');

        let _guard = self.lock.lock().await;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(&line).await?;
        file.flush().await?;
        Ok(())
    }
}

/// Keeps every notification in memory.
#[derive(Default, Clone)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sent(&self) -> Vec<Notification> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notification: Notification) -> Result<()> {
        self.sent.lock().await.push(notification);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::transaction::{Amount, Currency};
    use rust_decimal_macros::dec;

    fn confirmation() -> Notification {
        Notification::PaymentConfirmation {
            event_id: 1,
            registrant_id: 2,
            email: "jane@example.org".to_string(),
            amount: Amount::new(dec!(25)).unwrap(),
            currency: Currency::new("EUR").unwrap(),
        }
    }

    #[tokio::test]
    async fn test_recording_notifier() {
        let notifier = RecordingNotifier::new();
        notifier.notify(confirmation()).await.unwrap();
        assert_eq!(notifier.sent().await, vec![confirmation()]);
    }

    #[tokio::test]
    async fn test_outbox_appends_json_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("outbox.jsonl");
        let notifier = OutboxNotifier::new(&path);

        notifier.notify(confirmation()).await.unwrap();
        notifier.notify(confirmation()).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 2);

        let entry: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(entry["to"][0], "jane@example.org");
        assert_eq!(entry["subject"], "[Event 1] Payment confirmation");
        assert_eq!(entry["notification"]["kind"], "payment_confirmation");
    }

    #[tokio::test]
    async fn test_log_notifier_never_fails() {
        assert!(LogNotifier.notify(confirmation()).await.is_ok());
    }
}
