//! Recording state

use std::fmt;

/// Observable state of the recording session manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RecordingState {
    /// No session has been started yet
    #[default]
    Idle,
    /// A session holds the capture device and is writing the artifact
    Recording,
    /// The last session finished and its artifact is complete
    Stopped,
    /// The last session could not start or could not be finalized
    Failed,
}

impl RecordingState {
    /// Get the string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Recording => "recording",
            Self::Stopped => "stopped",
            Self::Failed => "failed",
        }
    }

    /// Whether a session currently owns the capture device
    pub const fn is_recording(&self) -> bool {
        matches!(self, Self::Recording)
    }
}

impl fmt::Display for RecordingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
