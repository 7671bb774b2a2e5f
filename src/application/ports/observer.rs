//! State observer port

use crate::domain::error::CaptureError;
use crate::domain::recording::{RecordingState, SessionId};

/// One published state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateChange {
    pub session_id: SessionId,
    pub from: RecordingState,
    pub to: RecordingState,
    /// Cause of the transition when `to` is FAILED
    pub error: Option<CaptureError>,
}

/// Receives every state transition of a session manager.
///
/// Called synchronously on the caller's task before `start`/`stop` return,
/// so implementations must not block.
pub trait StateObserver: Send + Sync {
    fn on_state_change(&self, change: &StateChange);
}

impl<F> StateObserver for F
where
    F: Fn(&StateChange) + Send + Sync,
{
    fn on_state_change(&self, change: &StateChange) {
        self(change)
    }
}
