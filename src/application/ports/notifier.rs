//! Desktop notification port

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum NotificationError {
    #[error("Failed to show notification: {0}")]
    SendFailed(String),
}

/// Icon shown next to a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationIcon {
    Recording,
    Saved,
    Error,
}

impl NotificationIcon {
    /// freedesktop icon-naming-spec name
    pub const fn icon_name(&self) -> &'static str {
        match self {
            Self::Recording => "audio-input-microphone",
            Self::Saved => "document-save",
            Self::Error => "dialog-error",
        }
    }

    /// Errors should stay on screen until dismissed
    pub const fn is_persistent(&self) -> bool {
        matches!(self, Self::Error)
    }
}

/// A notification ready to be shown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesktopNotification {
    pub summary: String,
    pub body: String,
    pub icon: NotificationIcon,
}

impl DesktopNotification {
    pub fn new(summary: impl Into<String>, body: impl Into<String>, icon: NotificationIcon) -> Self {
        Self {
            summary: summary.into(),
            body: body.into(),
            icon,
        }
    }
}

/// Shows notifications on the user's desktop
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: &DesktopNotification) -> Result<(), NotificationError>;
}
