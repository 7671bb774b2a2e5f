//! Unix domain socket for daemon control
//!
//! One command per connection, newline terminated. The reply is a single
//! line: `ok`, the current state name, or `error: <message>`.

use std::io;
use std::path::{Path, PathBuf};

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::signals::DaemonSignal;
use crate::domain::RecordingState;

const SOCKET_FILE_NAME: &str = "voice2notion.sock";

/// Longest command line read from a client; the rest is ignored
const MAX_COMMAND_LEN: u64 = 256;

/// Path of a per-user runtime file: `$XDG_RUNTIME_DIR/<name>`, or the
/// temp dir when no runtime dir is set.
pub(crate) fn runtime_path(file_name: &str) -> PathBuf {
    std::env::var_os("XDG_RUNTIME_DIR")
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(std::env::temp_dir)
        .join(file_name)
}

/// Socket path resolver
#[derive(Debug, Clone)]
pub struct SocketPath {
    path: PathBuf,
}

impl SocketPath {
    pub fn new() -> Self {
        Self::with_path(runtime_path(SOCKET_FILE_NAME))
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Remove the socket file if it exists
    pub fn cleanup(&self) -> io::Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

impl Default for SocketPath {
    fn default() -> Self {
        Self::new()
    }
}

/// Control commands understood by the daemon
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    Toggle,
    Stop,
    Status,
}

impl ControlCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Toggle => "toggle",
            Self::Stop => "stop",
            Self::Status => "status",
        }
    }

    pub fn parse(line: &str) -> Option<Self> {
        match line.trim() {
            "toggle" => Some(Self::Toggle),
            "stop" => Some(Self::Stop),
            "status" => Some(Self::Status),
            _ => None,
        }
    }
}

/// Listens for control commands and forwards them to the daemon loop
pub struct DaemonSocketServer {
    socket_path: SocketPath,
    listener: Option<UnixListener>,
}

impl DaemonSocketServer {
    pub fn new(socket_path: SocketPath) -> Self {
        Self {
            socket_path,
            listener: None,
        }
    }

    /// Bind the socket, replacing a stale file left by a dead daemon
    pub fn bind(&mut self) -> io::Result<()> {
        self.socket_path.cleanup()?;
        self.listener = Some(UnixListener::bind(self.socket_path.path())?);
        debug!(path = %self.socket_path.path().display(), "control socket bound");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        self.socket_path.path()
    }

    /// Accept connections until the task is dropped.
    ///
    /// `state_fn` is sampled per connection to answer `status`.
    pub async fn run<F>(&self, tx: mpsc::Sender<DaemonSignal>, state_fn: F) -> io::Result<()>
    where
        F: Fn() -> RecordingState + Send + Sync + 'static,
    {
        let listener = self
            .listener
            .as_ref()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "Socket not bound"))?;

        loop {
            match listener.accept().await {
                Ok((stream, _addr)) => {
                    let tx = tx.clone();
                    let state = state_fn();
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, tx, state).await {
                            warn!("socket connection error: {}", e);
                        }
                    });
                }
                Err(e) => warn!("socket accept error: {}", e),
            }
        }
    }

    pub fn cleanup(&self) {
        let _ = self.socket_path.cleanup();
    }
}

impl Drop for DaemonSocketServer {
    fn drop(&mut self) {
        self.cleanup();
    }
}

/// Reply line for a command received while the daemon is in `state`
fn respond(command: Option<ControlCommand>, state: RecordingState) -> (String, Option<DaemonSignal>) {
    match command {
        Some(ControlCommand::Toggle) => ("ok".into(), Some(DaemonSignal::Toggle)),
        Some(ControlCommand::Stop) if state.is_recording() => {
            ("ok".into(), Some(DaemonSignal::Stop))
        }
        Some(ControlCommand::Stop) => ("error: not recording".into(), None),
        Some(ControlCommand::Status) => (state.as_str().into(), None),
        None => ("error: unknown command".into(), None),
    }
}

async fn handle_connection(
    stream: UnixStream,
    tx: mpsc::Sender<DaemonSignal>,
    current_state: RecordingState,
) -> io::Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader.take(MAX_COMMAND_LEN));
    let mut line = String::new();
    reader.read_line(&mut line).await?;

    let command = ControlCommand::parse(&line);
    debug!(command = line.trim(), state = %current_state, "control command");

    let (reply, signal) = respond(command, current_state);
    if let Some(signal) = signal {
        if tx.send(signal).await.is_err() {
            writer.write_all(b"error: daemon shutting down\n").await?;
            return writer.flush().await;
        }
    }

    writer.write_all(format!("{}\n", reply).as_bytes()).await?;
    writer.flush().await
}

/// Connects to the daemon socket and sends one command
pub struct DaemonSocketClient {
    socket_path: SocketPath,
}

impl DaemonSocketClient {
    pub fn new(socket_path: SocketPath) -> Self {
        Self { socket_path }
    }

    /// Whether the socket file exists
    pub fn is_daemon_running(&self) -> bool {
        self.socket_path.exists()
    }

    /// Send a command and return the trimmed reply line
    pub async fn send_command(&self, command: ControlCommand) -> io::Result<String> {
        let stream = UnixStream::connect(self.socket_path.path()).await?;
        let (reader, mut writer) = stream.into_split();

        writer
            .write_all(format!("{}\n", command.as_str()).as_bytes())
            .await?;
        writer.flush().await?;

        let mut reader = BufReader::new(reader);
        let mut response = String::new();
        reader.read_line(&mut response).await?;

        Ok(response.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn socket_path_name() {
        assert!(SocketPath::new().path().ends_with(SOCKET_FILE_NAME));
    }

    #[test]
    fn parse_commands() {
        assert_eq!(ControlCommand::parse("toggle\n"), Some(ControlCommand::Toggle));
        assert_eq!(ControlCommand::parse(" stop "), Some(ControlCommand::Stop));
        assert_eq!(ControlCommand::parse("status"), Some(ControlCommand::Status));
        assert_eq!(ControlCommand::parse("cancel"), None);
        assert_eq!(ControlCommand::parse(""), None);
    }

    #[test]
    fn stop_requires_recording() {
        let (reply, signal) = respond(Some(ControlCommand::Stop), RecordingState::Idle);
        assert_eq!(reply, "error: not recording");
        assert!(signal.is_none());

        let (reply, signal) = respond(Some(ControlCommand::Stop), RecordingState::Recording);
        assert_eq!(reply, "ok");
        assert_eq!(signal, Some(DaemonSignal::Stop));
    }

    #[test]
    fn status_reports_state_name() {
        let (reply, _) = respond(Some(ControlCommand::Status), RecordingState::Failed);
        assert_eq!(reply, "failed");
    }

    #[tokio::test]
    async fn round_trip_over_socket() {
        let dir = tempfile::tempdir().unwrap();
        let path = SocketPath::with_path(dir.path().join("test.sock"));

        let mut server = DaemonSocketServer::new(path.clone());
        server.bind().unwrap();

        let (tx, mut rx) = mpsc::channel(4);
        let server_task = tokio::spawn(async move {
            let _ = server.run(tx, || RecordingState::Idle).await;
        });

        let client = DaemonSocketClient::new(path);
        assert!(client.is_daemon_running());
        assert_eq!(client.send_command(ControlCommand::Status).await.unwrap(), "idle");
        assert_eq!(client.send_command(ControlCommand::Toggle).await.unwrap(), "ok");
        assert_eq!(rx.recv().await, Some(DaemonSignal::Toggle));

        server_task.abort();
    }

    #[tokio::test]
    async fn oversized_command_is_cut_off() {
        let dir = tempfile::tempdir().unwrap();
        let path = SocketPath::with_path(dir.path().join("test.sock"));

        let mut server = DaemonSocketServer::new(path.clone());
        server.bind().unwrap();

        let (tx, _rx) = mpsc::channel(4);
        let server_task = tokio::spawn(async move {
            let _ = server.run(tx, || RecordingState::Idle).await;
        });

        // No newline at all; the server must still answer
        let stream = UnixStream::connect(path.path()).await.unwrap();
        let (reader, mut writer) = stream.into_split();
        writer.write_all(&vec![b'x'; 16 * 1024]).await.unwrap();
        writer.flush().await.unwrap();

        let mut reply = String::new();
        BufReader::new(reader).read_line(&mut reply).await.unwrap();
        assert_eq!(reply.trim(), "error: unknown command");

        server_task.abort();
    }
}
