//! Recording session entity

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{Duration as StdDuration, Instant};

use super::format::AudioFormat;
use super::state::RecordingState;
use crate::domain::error::{CaptureError, InvalidStateTransition};

/// Monotonic session number, unique per manager
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl SessionId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One start-to-stop capture attempt and the artifact it writes.
///
/// State machine:
///   IDLE -> RECORDING (begin_recording)
///   RECORDING -> STOPPED (finish_recording)
///   any -> FAILED (fail)
///
/// A stopped or failed session is never restarted; the manager replaces it
/// with a fresh session on the next start.
#[derive(Debug, Clone)]
pub struct RecordingSession {
    id: SessionId,
    state: RecordingState,
    output_path: PathBuf,
    format: AudioFormat,
    started_at: Option<Instant>,
    stopped_at: Option<Instant>,
    failure: Option<CaptureError>,
}

impl RecordingSession {
    /// Create a session in idle state
    pub fn new(id: SessionId, output_path: impl Into<PathBuf>, format: AudioFormat) -> Self {
        Self {
            id,
            state: RecordingState::Idle,
            output_path: output_path.into(),
            format,
            started_at: None,
            stopped_at: None,
            failure: None,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn state(&self) -> RecordingState {
        self.state
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn format(&self) -> &AudioFormat {
        &self.format
    }

    /// Error that moved the session to FAILED
    pub fn failure(&self) -> Option<&CaptureError> {
        self.failure.as_ref()
    }

    /// Time spent recording; keeps growing until the session stops
    pub fn elapsed(&self) -> StdDuration {
        match (self.started_at, self.stopped_at) {
            (Some(start), Some(stop)) => stop.saturating_duration_since(start),
            (Some(start), None) => start.elapsed(),
            _ => StdDuration::ZERO,
        }
    }

    /// Transition from IDLE to RECORDING
    pub fn begin_recording(&mut self) -> Result<(), InvalidStateTransition> {
        if self.state != RecordingState::Idle {
            return Err(InvalidStateTransition {
                current_state: self.state,
                action: "begin recording",
            });
        }
        self.state = RecordingState::Recording;
        self.started_at = Some(Instant::now());
        Ok(())
    }

    /// Transition from RECORDING to STOPPED
    pub fn finish_recording(&mut self) -> Result<(), InvalidStateTransition> {
        if self.state != RecordingState::Recording {
            return Err(InvalidStateTransition {
                current_state: self.state,
                action: "finish recording",
            });
        }
        self.state = RecordingState::Stopped;
        self.stopped_at = Some(Instant::now());
        Ok(())
    }

    /// Transition to FAILED from any state, recording the cause
    pub fn fail(&mut self, error: CaptureError) {
        if self.started_at.is_some() && self.stopped_at.is_none() {
            self.stopped_at = Some(Instant::now());
        }
        self.state = RecordingState::Failed;
        self.failure = Some(error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> RecordingSession {
        RecordingSession::new(SessionId::new(1), "/tmp/recording.flac", AudioFormat::default())
    }

    #[test]
    fn new_session_is_idle() {
        let session = session();
        assert_eq!(session.state(), RecordingState::Idle);
        assert_eq!(session.elapsed(), StdDuration::ZERO);
        assert!(session.failure().is_none());
    }

    #[test]
    fn begin_then_finish() {
        let mut session = session();
        session.begin_recording().unwrap();
        assert_eq!(session.state(), RecordingState::Recording);

        session.finish_recording().unwrap();
        assert_eq!(session.state(), RecordingState::Stopped);
    }

    #[test]
    fn begin_twice_fails() {
        let mut session = session();
        session.begin_recording().unwrap();

        let err = session.begin_recording().unwrap_err();
        assert_eq!(err.current_state, RecordingState::Recording);
        assert!(err.to_string().contains("begin recording"));
    }

    #[test]
    fn finish_from_idle_fails() {
        let mut session = session();
        let err = session.finish_recording().unwrap_err();
        assert_eq!(err.current_state, RecordingState::Idle);
    }

    #[test]
    fn stopped_session_cannot_restart() {
        let mut session = session();
        session.begin_recording().unwrap();
        session.finish_recording().unwrap();

        let err = session.begin_recording().unwrap_err();
        assert_eq!(err.current_state, RecordingState::Stopped);
    }

    #[test]
    fn fail_from_idle_records_cause() {
        let mut session = session();
        session.fail(CaptureError::PermissionDenied("denied".into()));

        assert_eq!(session.state(), RecordingState::Failed);
        assert_eq!(session.failure().map(|e| e.kind()), Some("permission_denied"));
    }

    #[test]
    fn fail_while_recording_freezes_elapsed() {
        let mut session = session();
        session.begin_recording().unwrap();
        session.fail(CaptureError::IoFailure("disk full".into()));

        let first = session.elapsed();
        std::thread::sleep(StdDuration::from_millis(5));
        assert_eq!(session.elapsed(), first);
    }

    #[test]
    fn session_id_display() {
        let id = SessionId::new(41);
        assert_eq!(id.value(), 41);
        assert_eq!(id.to_string(), "#41");
    }
}
