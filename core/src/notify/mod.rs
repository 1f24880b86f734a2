//! Alert notification port.

use crate::prelude::NotifyError;
use async_trait::async_trait;
use log::{info, warn};
use std::sync::Mutex;
use std::time::Duration;

/// Fixed alert text sent when the detections sweep yields records.
pub const ALERT_MESSAGE: &str = "Alert! Alert! Alert. New Earthquake detected.";

/// Messaging channel that delivers alert text to a recipient.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, message: &str, recipient: &str) -> Result<(), NotifyError>;
}

/// Sends through `notifier` and swallows the outcome after logging it.
///
/// A send still pending after `limit` is abandoned and counts as a failure.
/// Returns whether the channel accepted the message.
pub async fn fire_and_forget(
    notifier: &dyn Notifier,
    message: &str,
    recipient: &str,
    limit: Duration,
) -> bool {
    match tokio::time::timeout(limit, notifier.notify(message, recipient)).await {
        Ok(Ok(())) => {
            info!("alert sent to {}", recipient);
            true
        }
        Ok(Err(err)) => {
            warn!("alert to {} failed: {}", recipient, err);
            false
        }
        Err(_) => {
            warn!("alert to {} abandoned after {:?}", recipient, limit);
            false
        }
    }
}

/// Notifier that only writes the alert to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, message: &str, recipient: &str) -> Result<(), NotifyError> {
        info!("[ALERT -> {}] {}", recipient, message);
        Ok(())
    }
}

/// Notifier that records every call, optionally rejecting them.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(String, String)>>,
    reject: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            reject: true,
        }
    }

    /// `(message, recipient)` pairs in call order.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.sent.lock().map(|sent| sent.len()).unwrap_or(0)
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, message: &str, recipient: &str) -> Result<(), NotifyError> {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push((message.to_string(), recipient.to_string()));
        }
        if self.reject {
            return Err(NotifyError::Rejected("recipient opted out".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIMIT: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn fire_and_forget_reports_acceptance() {
        let notifier = RecordingNotifier::new();
        assert!(fire_and_forget(&notifier, ALERT_MESSAGE, "+1", LIMIT).await);
        assert_eq!(
            notifier.calls(),
            vec![(ALERT_MESSAGE.to_string(), "+1".to_string())]
        );
    }

    #[tokio::test]
    async fn fire_and_forget_swallows_rejection() {
        let notifier = RecordingNotifier::rejecting();
        assert!(!fire_and_forget(&notifier, ALERT_MESSAGE, "+1", LIMIT).await);
        assert_eq!(notifier.call_count(), 1);
    }

    struct StalledNotifier;

    #[async_trait]
    impl Notifier for StalledNotifier {
        async fn notify(&self, _message: &str, _recipient: &str) -> Result<(), NotifyError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        }
    }

    #[tokio::test]
    async fn fire_and_forget_gives_up_on_a_stalled_channel() {
        let sent = tokio::time::timeout(
            Duration::from_secs(5),
            fire_and_forget(&StalledNotifier, ALERT_MESSAGE, "+1", Duration::from_millis(50)),
        )
        .await;
        assert_eq!(sent.ok(), Some(false));
    }
}
