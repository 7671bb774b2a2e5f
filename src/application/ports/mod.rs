//! Port interfaces (traits) for external systems
//!
//! These traits define the boundaries between the application
//! and infrastructure layers.

pub mod capture;
pub mod config;
pub mod encoder;
pub mod notifier;
pub mod observer;

pub use capture::{CaptureDevice, CaptureError, CaptureHandle, PermissionStatus};
pub use config::ConfigStore;
pub use encoder::{ArtifactEncoder, ArtifactInfo, ArtifactWriter};
pub use notifier::{DesktopNotification, NotificationError, NotificationIcon, Notifier};
pub use observer::{StateChange, StateObserver};
