//! Recording session manager
//!
//! Owns the lifecycle of one capture session at a time: start, stop, and
//! publish every state transition to registered observers.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex, MutexGuard};

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::domain::error::CaptureError;
use crate::domain::recording::{AudioFormat, RecordingSession, RecordingState, SessionId};

use super::ports::{
    ArtifactEncoder, ArtifactInfo, ArtifactWriter, CaptureDevice, CaptureHandle,
    PermissionStatus, StateChange, StateObserver,
};

/// Handle returned by [`RecordingSessionManager::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Device handle and open artifact of the session that is recording
struct ActiveCapture {
    capture: Box<dyn CaptureHandle>,
    writer: Box<dyn ArtifactWriter>,
}

/// Manages recording sessions against one capture device and one fixed
/// artifact path.
///
/// `start` and `stop` serialize on an async mutex that is held for the whole
/// call, so at most one session owns the device at any time.
pub struct RecordingSessionManager<D, E>
where
    D: CaptureDevice,
    E: ArtifactEncoder,
{
    device: D,
    encoder: E,
    output_path: PathBuf,
    format: AudioFormat,
    active: Mutex<Option<ActiveCapture>>,
    /// Latest session, readable without awaiting
    session: StdMutex<Option<RecordingSession>>,
    last_artifact: StdMutex<Option<ArtifactInfo>>,
    observers: StdMutex<Vec<(ObserverId, Arc<dyn StateObserver>)>>,
    permission_granted: AtomicBool,
    next_session: AtomicU64,
    next_observer: AtomicU64,
}

impl<D, E> RecordingSessionManager<D, E>
where
    D: CaptureDevice,
    E: ArtifactEncoder,
{
    /// Create a manager writing every session to `output_path`
    pub fn new(device: D, encoder: E, output_path: impl Into<PathBuf>, format: AudioFormat) -> Self {
        Self {
            device,
            encoder,
            output_path: output_path.into(),
            format,
            active: Mutex::new(None),
            session: StdMutex::new(None),
            last_artifact: StdMutex::new(None),
            observers: StdMutex::new(Vec::new()),
            permission_granted: AtomicBool::new(false),
            next_session: AtomicU64::new(1),
            next_observer: AtomicU64::new(1),
        }
    }

    /// Fixed artifact path shared by all sessions
    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn format(&self) -> &AudioFormat {
        &self.format
    }

    /// Current state; IDLE until the first start
    pub fn current_state(&self) -> RecordingState {
        lock(&self.session)
            .as_ref()
            .map_or(RecordingState::Idle, RecordingSession::state)
    }

    /// Milliseconds the current session has been recording (0 otherwise)
    pub fn elapsed_ms(&self) -> u64 {
        lock(&self.session)
            .as_ref()
            .filter(|s| s.state().is_recording())
            .map_or(0, |s| s.elapsed().as_millis() as u64)
    }

    /// Error that failed the latest session, if it failed
    pub fn last_error(&self) -> Option<CaptureError> {
        lock(&self.session)
            .as_ref()
            .and_then(|s| s.failure().cloned())
    }

    /// Artifact produced by the most recent successful stop
    pub fn last_artifact(&self) -> Option<ArtifactInfo> {
        lock(&self.last_artifact).clone()
    }

    /// Register an observer for all future state transitions
    pub fn subscribe(&self, observer: Arc<dyn StateObserver>) -> ObserverId {
        let id = ObserverId(self.next_observer.fetch_add(1, Ordering::SeqCst));
        lock(&self.observers).push((id, observer));
        id
    }

    /// Remove an observer; returns false if it was not registered
    pub fn unsubscribe(&self, id: ObserverId) -> bool {
        let mut observers = lock(&self.observers);
        let before = observers.len();
        observers.retain(|(observer_id, _)| *observer_id != id);
        observers.len() != before
    }

    /// Start a new session.
    ///
    /// Acquires permission and the capture device, then creates (truncating)
    /// the artifact file. Rejected with `AlreadyRecording` while another
    /// session is active; that session is left untouched.
    pub async fn start(&self) -> Result<(), CaptureError> {
        let mut active = self.active.lock().await;
        if active.is_some() {
            warn!("start rejected, a session is already recording");
            return Err(CaptureError::AlreadyRecording);
        }

        let id = SessionId::new(self.next_session.fetch_add(1, Ordering::SeqCst));
        let previous = self.current_state();
        debug!(session = %id, path = %self.output_path.display(), format = %self.format, "starting session");

        let mut session = RecordingSession::new(id, self.output_path.clone(), self.format);
        let acquired = match self.acquire().await {
            Ok(capture) => match session.begin_recording() {
                Ok(()) => Ok(capture),
                Err(e) => {
                    if let Err(release) = capture.capture.finish().await {
                        debug!("releasing device after rejected transition: {}", release);
                    }
                    Err(CaptureError::DeviceUnavailable(e.to_string()))
                }
            },
            Err(e) => Err(e),
        };

        match acquired {
            Ok(capture) => {
                *active = Some(capture);
                *lock(&self.session) = Some(session);
                info!(session = %id, path = %self.output_path.display(), "recording started");
                self.publish(StateChange {
                    session_id: id,
                    from: previous,
                    to: RecordingState::Recording,
                    error: None,
                });
                Ok(())
            }
            Err(e) => {
                session.fail(e.clone());
                *lock(&self.session) = Some(session);
                warn!(session = %id, kind = e.kind(), "recording failed to start: {}", e);
                self.publish(StateChange {
                    session_id: id,
                    from: previous,
                    to: RecordingState::Failed,
                    error: Some(e.clone()),
                });
                Err(e)
            }
        }
    }

    /// Stop the active session and finalize its artifact.
    ///
    /// A no-op returning `Ok` when nothing is recording.
    pub async fn stop(&self) -> Result<(), CaptureError> {
        let mut active = self.active.lock().await;
        let Some(ActiveCapture { capture, writer }) = active.take() else {
            debug!(state = %self.current_state(), "stop ignored, not recording");
            return Ok(());
        };

        let result = finalize(capture, writer).await;

        let (id, to, error) = {
            let mut guard = lock(&self.session);
            let Some(session) = guard.as_mut() else {
                // An active capture always has a session recorded alongside it
                return result.map(|_| ());
            };
            match &result {
                Ok(_) => {
                    if let Err(e) = session.finish_recording() {
                        warn!(session = %session.id(), "{}", e);
                    }
                }
                Err(e) => session.fail(e.clone()),
            }
            (session.id(), session.state(), result.as_ref().err().cloned())
        };

        match result {
            Ok(artifact) => {
                info!(
                    session = %id,
                    path = %artifact.path.display(),
                    bytes = artifact.bytes,
                    samples = artifact.samples,
                    "recording saved"
                );
                *lock(&self.last_artifact) = Some(artifact);
            }
            Err(ref e) => warn!(session = %id, kind = e.kind(), "recording failed to finalize: {}", e),
        }

        self.publish(StateChange {
            session_id: id,
            from: RecordingState::Recording,
            to,
            error: error.clone(),
        });

        match error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Permission, device, then encoder. The artifact is only touched by the
    /// last step.
    async fn acquire(&self) -> Result<ActiveCapture, CaptureError> {
        self.request_permission().await?;

        let capture = self.device.open(&self.format).await?;
        match self.encoder.create(&self.output_path, &self.format) {
            Ok(writer) => Ok(ActiveCapture { capture, writer }),
            Err(e) => {
                if let Err(release) = capture.finish().await {
                    debug!("releasing device after encoder failure: {}", release);
                }
                Err(e)
            }
        }
    }

    /// Ask the device for microphone permission ahead of the first start.
    ///
    /// A grant is cached for the life of the manager; a denial is asked
    /// again on the next call. The session state is not changed.
    pub async fn request_permission(&self) -> Result<(), CaptureError> {
        if self.permission_granted.load(Ordering::SeqCst) {
            return Ok(());
        }

        match self.device.request_permission().await {
            PermissionStatus::Granted => {
                debug!("microphone permission granted");
                self.permission_granted.store(true, Ordering::SeqCst);
                Ok(())
            }
            PermissionStatus::Denied => Err(CaptureError::PermissionDenied(
                "microphone access was denied by the host".to_string(),
            )),
        }
    }

    /// Deliver a change to every observer. The observer list is copied first
    /// so observers may call back into the manager.
    fn publish(&self, change: StateChange) {
        let observers: Vec<Arc<dyn StateObserver>> = lock(&self.observers)
            .iter()
            .map(|(_, observer)| Arc::clone(observer))
            .collect();

        debug!(session = %change.session_id, from = %change.from, to = %change.to, observers = observers.len(), "state change");
        for observer in observers {
            observer.on_state_change(&change);
        }
    }
}

/// Stop the capture and encode its samples into the artifact
async fn finalize(
    capture: Box<dyn CaptureHandle>,
    mut writer: Box<dyn ArtifactWriter>,
) -> Result<ArtifactInfo, CaptureError> {
    let samples = capture.finish().await?;
    if samples.is_empty() {
        return Err(CaptureError::EmptyCapture);
    }

    // Encoding and file sync are blocking work
    tokio::task::spawn_blocking(move || {
        writer.write(&samples)?;
        writer.finalize()
    })
    .await
    .map_err(|e| CaptureError::IoFailure(format!("Encode task error: {}", e)))?
}

/// Lock a std mutex, recovering the data if a panicking observer poisoned it
fn lock<T>(mutex: &StdMutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}
