//! Signal handlers for one-shot and daemon modes

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::mpsc;
use tracing::info;

/// Shutdown flag for one-shot mode, raised by SIGINT or SIGTERM
pub struct ShutdownSignal {
    shutdown: Arc<AtomicBool>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self {
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    /// Install the handlers. Must be called inside the runtime.
    pub fn setup(&self) -> Result<(), std::io::Error> {
        for kind in [SignalKind::interrupt(), SignalKind::terminate()] {
            let shutdown = Arc::clone(&self.shutdown);
            let mut stream = signal(kind)?;
            tokio::spawn(async move {
                if stream.recv().await.is_some() {
                    shutdown.store(true, Ordering::SeqCst);
                }
            });
        }
        Ok(())
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Commands delivered to the daemon loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaemonSignal {
    /// Start if not recording, stop otherwise
    Toggle,
    /// Stop and save the current recording
    Stop,
    /// Shutdown daemon (SIGINT/SIGTERM)
    Shutdown,
}

/// Daemon signal handler
///
/// Turns SIGINT/SIGTERM into [`DaemonSignal::Shutdown`] and hands out a
/// sender for other command sources such as the control socket.
pub struct DaemonSignalHandler {
    receiver: mpsc::Receiver<DaemonSignal>,
}

impl DaemonSignalHandler {
    pub fn new() -> Result<(Self, mpsc::Sender<DaemonSignal>), std::io::Error> {
        let (tx, rx) = mpsc::channel(10);

        for (kind, name) in [
            (SignalKind::interrupt(), "SIGINT"),
            (SignalKind::terminate(), "SIGTERM"),
        ] {
            let tx = tx.clone();
            let mut stream = signal(kind)?;
            tokio::spawn(async move {
                if stream.recv().await.is_some() {
                    info!("received {}, shutting down", name);
                    let _ = tx.send(DaemonSignal::Shutdown).await;
                }
            });
        }

        Ok((Self { receiver: rx }, tx))
    }

    /// Wait for the next signal
    pub async fn recv(&mut self) -> Option<DaemonSignal> {
        self.receiver.recv().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shutdown_signal_default_is_false() {
        let signal = ShutdownSignal::new();
        assert!(!signal.is_shutdown());
    }

    #[test]
    fn shutdown_signal_flag_can_be_set() {
        let signal = ShutdownSignal::new();
        signal.flag().store(true, Ordering::SeqCst);
        assert!(signal.is_shutdown());
    }

    #[tokio::test]
    async fn handler_forwards_external_commands() {
        let (mut handler, tx) = DaemonSignalHandler::new().unwrap();
        tx.send(DaemonSignal::Stop).await.unwrap();
        assert_eq!(handler.recv().await, Some(DaemonSignal::Stop));
    }
}
