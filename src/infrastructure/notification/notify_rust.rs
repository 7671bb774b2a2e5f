//! Desktop notifications via notify-rust

use async_trait::async_trait;
use notify_rust::{Notification, Timeout};

use crate::application::ports::{DesktopNotification, NotificationError, NotificationIcon, Notifier};

/// How long a notification stays on screen
const DEFAULT_TIMEOUT_MS: u32 = 4000;

/// Cross-platform notifier
pub struct NotifyRustNotifier {
    app_name: String,
    timeout_ms: u32,
}

impl NotifyRustNotifier {
    pub fn new() -> Self {
        Self::with_app_name("Voice2Notion")
    }

    pub fn with_app_name(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    fn timeout_for(&self, icon: NotificationIcon) -> Timeout {
        if icon.is_persistent() {
            Timeout::Never
        } else {
            Timeout::Milliseconds(self.timeout_ms)
        }
    }
}

impl Default for NotifyRustNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notifier for NotifyRustNotifier {
    async fn notify(&self, notification: &DesktopNotification) -> Result<(), NotificationError> {
        let app_name = self.app_name.clone();
        let timeout = self.timeout_for(notification.icon);
        let DesktopNotification { summary, body, icon } = notification.clone();

        // Talking to the notification daemon blocks
        tokio::task::spawn_blocking(move || {
            Notification::new()
                .appname(&app_name)
                .summary(&summary)
                .body(&body)
                .icon(icon.icon_name())
                .timeout(timeout)
                .show()
                .map(|_| ())
                .map_err(|e| NotificationError::SendFailed(e.to_string()))
        })
        .await
        .map_err(|e| NotificationError::SendFailed(format!("Task join error: {}", e)))?
    }
}
