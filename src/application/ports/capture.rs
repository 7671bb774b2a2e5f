//! Capture device port interfaces

use async_trait::async_trait;

use crate::domain::recording::AudioFormat;

pub use crate::domain::error::CaptureError;

/// Outcome of asking the host platform for microphone access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

/// Port for a platform audio input.
#[async_trait]
pub trait CaptureDevice: Send + Sync {
    /// Ask the host for microphone access.
    async fn request_permission(&self) -> PermissionStatus;

    /// Acquire the device and begin capturing.
    ///
    /// Returns once the capture stream is running (or failed to start).
    /// Samples keep accumulating in the background until the handle is
    /// finished; dropping the handle releases the device as well.
    async fn open(&self, format: &AudioFormat) -> Result<Box<dyn CaptureHandle>, CaptureError>;
}

/// Exclusive handle on a running capture stream
#[async_trait]
pub trait CaptureHandle: Send {
    /// Stop capturing, release the device, and return the captured audio as
    /// mono samples at the format's sample rate.
    async fn finish(self: Box<Self>) -> Result<Vec<i16>, CaptureError>;

    /// Milliseconds since the stream started
    fn elapsed_ms(&self) -> u64;
}

/// Blanket implementation for boxed capture devices
#[async_trait]
impl CaptureDevice for Box<dyn CaptureDevice> {
    async fn request_permission(&self) -> PermissionStatus {
        self.as_ref().request_permission().await
    }

    async fn open(&self, format: &AudioFormat) -> Result<Box<dyn CaptureHandle>, CaptureError> {
        self.as_ref().open(format).await
    }
}
