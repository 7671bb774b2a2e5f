//! Domain error types

use thiserror::Error;

use super::recording::RecordingState;

/// Error when parsing a duration string
#[derive(Debug, Clone, Error)]
#[error("Invalid duration: \"{input}\". Expected <number><unit> pairs with units h, m, s (e.g. 30s, 5m, 1h30m)")]
pub struct DurationParseError {
    pub input: String,
}

/// Error when parsing a codec or quality name
#[derive(Debug, Clone, Error)]
#[error("Invalid {what}: \"{input}\". Valid values are: {valid}")]
pub struct FormatParseError {
    pub what: &'static str,
    pub input: String,
    pub valid: &'static str,
}

/// Error when a session is asked to make a transition its state forbids
#[derive(Debug, Clone, Error)]
#[error("Invalid state transition: cannot {action} while {current_state}")]
pub struct InvalidStateTransition {
    pub current_state: RecordingState,
    pub action: &'static str,
}

/// Error when configuration fails
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(String),

    #[error("Failed to parse config file: {0}")]
    ParseError(String),

    #[error("Failed to write config file: {0}")]
    WriteError(String),

    #[error("Invalid config value for '{key}': {message}")]
    ValidationError { key: String, message: String },

    #[error("Config file already exists at: {0}")]
    AlreadyExists(String),
}

/// Errors from starting or stopping a capture session
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    #[error("Microphone permission denied: {0}")]
    PermissionDenied(String),

    #[error("Capture device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("Failed to initialize encoder: {0}")]
    EncoderInitFailure(String),

    #[error("Failed to write recording: {0}")]
    IoFailure(String),

    #[error("A recording is already in progress")]
    AlreadyRecording,

    #[error("No audio was captured")]
    EmptyCapture,
}

impl CaptureError {
    /// Short, stable name of the error kind
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::PermissionDenied(_) => "permission_denied",
            Self::DeviceUnavailable(_) => "device_unavailable",
            Self::EncoderInitFailure(_) => "encoder_init_failure",
            Self::IoFailure(_) => "io_failure",
            Self::AlreadyRecording => "already_recording",
            Self::EmptyCapture => "empty_capture",
        }
    }
}
