//! Daemon command handler - sends commands to a running daemon over its socket

use super::args::DaemonAction;
use super::presenter::Presenter;
use super::socket::{ControlCommand, DaemonSocketClient, SocketPath};
use crate::domain::RecordingState;

impl From<DaemonAction> for ControlCommand {
    fn from(action: DaemonAction) -> Self {
        match action {
            DaemonAction::Toggle => ControlCommand::Toggle,
            DaemonAction::Stop => ControlCommand::Stop,
            DaemonAction::Status => ControlCommand::Status,
        }
    }
}

/// Handle daemon subcommand
pub async fn handle_daemon_command(
    action: DaemonAction,
    presenter: &Presenter,
) -> Result<(), String> {
    let client = DaemonSocketClient::new(SocketPath::new());

    if !client.is_daemon_running() {
        return Err("No daemon running. Start with: voice2notion --daemon".to_string());
    }

    let command = ControlCommand::from(action);
    let response = client
        .send_command(command)
        .await
        .map_err(|e| format!("Failed to communicate with daemon: {}", e))?;

    if let Some(message) = response.strip_prefix("error:") {
        return Err(message.trim().to_string());
    }

    match action {
        DaemonAction::Status => {
            match parse_state(&response) {
                Some(state) => presenter.daemon_status(state),
                None => presenter.info(&format!("Daemon status: {}", response)),
            }
            presenter.output(&response);
        }
        _ => presenter.info(&format!("Command sent: {}", command.as_str())),
    }

    Ok(())
}

fn parse_state(response: &str) -> Option<RecordingState> {
    [
        RecordingState::Idle,
        RecordingState::Recording,
        RecordingState::Stopped,
        RecordingState::Failed,
    ]
    .into_iter()
    .find(|state| state.as_str() == response)
}
