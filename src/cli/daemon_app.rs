//! Daemon app runner

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use tokio::time::timeout;
use tracing::{debug, info};

use crate::application::ports::StateChange;
use crate::domain::config::AppConfig;
use crate::domain::RecordingState;

use super::app::{attach_notifier, build_manager, SessionManager, EXIT_ERROR, EXIT_SUCCESS};
use super::args::DaemonOptions;
use super::pid_file::PidFile;
use super::presenter::Presenter;
use super::signals::{DaemonSignal, DaemonSignalHandler};
use super::socket::{DaemonSocketServer, SocketPath};

/// How often the max-duration deadline is checked while recording
const POLL: StdDuration = StdDuration::from_millis(100);

/// Run daemon mode
pub async fn run_daemon(config: &AppConfig, options: DaemonOptions) -> ExitCode {
    let presenter = Presenter::new();

    let mut pid_file = PidFile::new();
    if let Err(e) = pid_file.acquire() {
        presenter.error(&e.to_string());
        return ExitCode::from(EXIT_ERROR);
    }

    let manager = Arc::new(build_manager(config));
    if options.notify {
        attach_notifier(&manager);
    }
    let status = Presenter::new();
    manager.subscribe(Arc::new(move |change: &StateChange| {
        status.daemon_status(change.to);
        if let Some(error) = &change.error {
            status.error(&error.to_string());
        }
    }));

    let (mut signals, signal_tx) = match DaemonSignalHandler::new() {
        Ok(s) => s,
        Err(e) => {
            presenter.error(&format!("Failed to setup signal handler: {}", e));
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let socket_path = SocketPath::new();
    let mut socket_server = DaemonSocketServer::new(socket_path.clone());
    if let Err(e) = socket_server.bind() {
        presenter.error(&format!("Failed to bind socket: {}", e));
        return ExitCode::from(EXIT_ERROR);
    }

    let state_source = Arc::clone(&manager);
    let server_task = tokio::spawn(async move {
        let _ = socket_server
            .run(signal_tx, move || state_source.current_state())
            .await;
    });

    presenter.daemon_status(RecordingState::Idle);
    presenter.info(&format!(
        "PID: {} | Socket: {} | Output: {} | SIGINT: exit",
        std::process::id(),
        socket_path.path().display(),
        manager.output_path().display()
    ));

    let clean = daemon_loop(&manager, &mut signals, &presenter, options.max_duration.as_millis()).await;

    // Dropping the server removes the socket file
    server_task.abort();
    let _ = server_task.await;
    if let Err(e) = pid_file.release() {
        presenter.warn(&e.to_string());
    }

    if clean {
        ExitCode::from(EXIT_SUCCESS)
    } else {
        ExitCode::from(EXIT_ERROR)
    }
}

/// Handle commands until shutdown. Returns false if the command channel
/// closed unexpectedly.
async fn daemon_loop(
    manager: &SessionManager,
    signals: &mut DaemonSignalHandler,
    presenter: &Presenter,
    max_duration_ms: u64,
) -> bool {
    loop {
        let signal = if manager.current_state().is_recording() {
            let remaining_ms = max_duration_ms.saturating_sub(manager.elapsed_ms());
            if remaining_ms == 0 {
                presenter.warn("Max duration reached, auto-stopping");
                Some(DaemonSignal::Stop)
            } else {
                match timeout(POLL.min(StdDuration::from_millis(remaining_ms)), signals.recv()).await {
                    Ok(signal) => signal,
                    Err(_) => continue,
                }
            }
        } else {
            signals.recv().await
        };

        debug!(?signal, state = %manager.current_state(), "daemon command");
        match signal {
            Some(DaemonSignal::Toggle) => {
                if manager.current_state().is_recording() {
                    stop_recording(manager, presenter).await;
                } else if let Err(e) = manager.start().await {
                    presenter.error(&format!("Failed to start recording: {}", e));
                }
            }
            Some(DaemonSignal::Stop) => {
                if manager.current_state().is_recording() {
                    stop_recording(manager, presenter).await;
                } else {
                    presenter.warn("Not recording, nothing to stop");
                }
            }
            Some(DaemonSignal::Shutdown) => {
                info!("daemon shutting down");
                stop_recording(manager, presenter).await;
                return true;
            }
            None => return false,
        }
    }
}

/// Stop and print the saved artifact path. A no-op when idle.
async fn stop_recording(manager: &SessionManager, presenter: &Presenter) {
    let was_recording = manager.current_state().is_recording();
    match manager.stop().await {
        Ok(()) if was_recording => {
            if let Some(artifact) = manager.last_artifact() {
                presenter.output(&artifact.path.to_string_lossy());
            }
        }
        Ok(()) => {}
        Err(e) => presenter.error(&format!("Failed to save recording: {}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn synthetic_manager(dir: &std::path::Path) -> SessionManager {
        build_manager(&AppConfig {
            output_dir: Some(dir.to_string_lossy().into_owned()),
            source: Some("synthetic".to_string()),
            codec: Some("wav".to_string()),
            ..AppConfig::defaults()
        })
    }

    #[tokio::test]
    async fn loop_toggles_and_shuts_down() {
        let dir = tempfile::tempdir().unwrap();
        let manager = synthetic_manager(dir.path());
        let (mut signals, tx) = DaemonSignalHandler::new().unwrap();
        let presenter = Presenter::new();

        tx.send(DaemonSignal::Toggle).await.unwrap();
        tx.send(DaemonSignal::Toggle).await.unwrap();
        tx.send(DaemonSignal::Shutdown).await.unwrap();

        assert!(daemon_loop(&manager, &mut signals, &presenter, 60_000).await);
        assert_eq!(manager.current_state(), RecordingState::Stopped);
        assert!(dir.path().join("recording.wav").exists());
    }

    #[tokio::test]
    async fn max_duration_auto_stops() {
        let dir = tempfile::tempdir().unwrap();
        let manager = synthetic_manager(dir.path());
        let (mut signals, tx) = DaemonSignalHandler::new().unwrap();
        let presenter = Presenter::new();

        tx.send(DaemonSignal::Toggle).await.unwrap();
        let sender = tokio::spawn(async move {
            tokio::time::sleep(StdDuration::from_millis(400)).await;
            let _ = tx.send(DaemonSignal::Shutdown).await;
        });

        assert!(daemon_loop(&manager, &mut signals, &presenter, 150).await);
        sender.await.unwrap();
        assert_eq!(manager.current_state(), RecordingState::Stopped);
    }

    #[tokio::test]
    async fn shutdown_while_recording_saves_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let manager = synthetic_manager(dir.path());
        let (mut signals, tx) = DaemonSignalHandler::new().unwrap();
        let presenter = Presenter::new();

        tx.send(DaemonSignal::Toggle).await.unwrap();
        tx.send(DaemonSignal::Shutdown).await.unwrap();

        assert!(daemon_loop(&manager, &mut signals, &presenter, 60_000).await);
        assert_eq!(manager.current_state(), RecordingState::Stopped);
        assert!(manager.last_artifact().unwrap().bytes > 0);
    }
}
