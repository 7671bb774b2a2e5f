//! Desktop notifications for state changes

use std::sync::Arc;

use tokio::runtime::Handle;
use tracing::debug;

use crate::domain::recording::RecordingState;

use super::ports::{DesktopNotification, NotificationIcon, Notifier, StateChange, StateObserver};

const TITLE: &str = "Voice2Notion";

/// Observer that shows a desktop notification for each transition.
///
/// Notifications are sent on the tokio runtime so the manager is never
/// blocked by the notification daemon.
pub struct NotifierObserver<N: Notifier> {
    notifier: Arc<N>,
    runtime: Handle,
}

impl<N: Notifier + 'static> NotifierObserver<N> {
    /// Create an observer bound to the current tokio runtime.
    ///
    /// Returns `None` when called outside a runtime.
    pub fn new(notifier: N) -> Option<Self> {
        let runtime = Handle::try_current().ok()?;
        Some(Self {
            notifier: Arc::new(notifier),
            runtime,
        })
    }
}

/// Notification for a transition, if it deserves one
pub fn describe(change: &StateChange) -> Option<DesktopNotification> {
    let (body, icon) = match change.to {
        RecordingState::Recording => ("Recording started".to_string(), NotificationIcon::Recording),
        RecordingState::Stopped => ("Recording saved".to_string(), NotificationIcon::Saved),
        RecordingState::Failed => match &change.error {
            Some(e) => (format!("Recording failed: {}", e), NotificationIcon::Error),
            None => ("Recording failed".to_string(), NotificationIcon::Error),
        },
        RecordingState::Idle => return None,
    };
    Some(DesktopNotification::new(TITLE, body, icon))
}

impl<N: Notifier + 'static> StateObserver for NotifierObserver<N> {
    fn on_state_change(&self, change: &StateChange) {
        let Some(notification) = describe(change) else {
            return;
        };

        let notifier = Arc::clone(&self.notifier);
        self.runtime.spawn(async move {
            if let Err(e) = notifier.notify(&notification).await {
                debug!("notification not shown: {}", e);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::NotificationError;
    use crate::domain::error::CaptureError;
    use crate::domain::recording::SessionId;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    struct RecordingNotifier {
        sent: Arc<Mutex<Vec<DesktopNotification>>>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn notify(&self, notification: &DesktopNotification) -> Result<(), NotificationError> {
            self.sent.lock().unwrap().push(notification.clone());
            Ok(())
        }
    }

    fn change(to: RecordingState, error: Option<CaptureError>) -> StateChange {
        StateChange {
            session_id: SessionId::new(1),
            from: RecordingState::Idle,
            to,
            error,
        }
    }

    #[test]
    fn describe_failure_includes_cause() {
        let notification = describe(&change(
            RecordingState::Failed,
            Some(CaptureError::DeviceUnavailable("no input device".into())),
        ))
        .unwrap();
        assert_eq!(notification.summary, TITLE);
        assert!(notification.body.contains("no input device"));
        assert_eq!(notification.icon, NotificationIcon::Error);
    }

    #[test]
    fn describe_idle_is_silent() {
        assert!(describe(&change(RecordingState::Idle, None)).is_none());
    }

    #[test]
    fn new_outside_runtime_is_none() {
        assert!(NotifierObserver::new(RecordingNotifier::default()).is_none());
    }

    #[tokio::test]
    async fn sends_notification_on_runtime() {
        let notifier = RecordingNotifier::default();
        let sent = Arc::clone(&notifier.sent);
        let observer = NotifierObserver::new(notifier).unwrap();

        observer.on_state_change(&change(RecordingState::Recording, None));

        for _ in 0..50 {
            if !sent.lock().unwrap().is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        let sent = sent.lock().unwrap();
        assert_eq!(
            sent.as_slice(),
            &[DesktopNotification::new(TITLE, "Recording started", NotificationIcon::Recording)]
        );
    }
}
