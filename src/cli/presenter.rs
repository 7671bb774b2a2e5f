//! CLI presenter for output formatting

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

use crate::domain::RecordingState;

/// Presenter for CLI output formatting
pub struct Presenter {
    spinner: Option<ProgressBar>,
    is_spinner_active: Arc<AtomicBool>,
}

impl Presenter {
    pub fn new() -> Self {
        Self {
            spinner: None,
            is_spinner_active: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Start a spinner with message
    pub fn start_spinner(&mut self, message: &str) {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.red} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        spinner.set_style(style);
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        self.spinner = Some(spinner);
        self.is_spinner_active.store(true, Ordering::SeqCst);
    }

    pub fn update_spinner(&self, message: &str) {
        if let Some(ref spinner) = self.spinner {
            spinner.set_message(message.to_string());
        }
    }

    pub fn spinner_success(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_with_message(format!("{} {}", "✓".green(), message));
        }
        self.is_spinner_active.store(false, Ordering::SeqCst);
    }

    pub fn spinner_fail(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_with_message(format!("{} {}", "✗".red(), message));
        }
        self.is_spinner_active.store(false, Ordering::SeqCst);
    }

    pub fn is_spinner_active(&self) -> bool {
        self.is_spinner_active.load(Ordering::SeqCst)
    }

    pub fn info(&self, message: &str) {
        status_line("ℹ".cyan(), message);
    }

    pub fn success(&self, message: &str) {
        status_line("✓".green(), message);
    }

    pub fn warn(&self, message: &str) {
        status_line("⚠".yellow(), message);
    }

    pub fn error(&self, message: &str) {
        status_line("✗".red(), message);
    }

    /// Output text to stdout (the artifact path)
    pub fn output(&self, text: &str) {
        println!("{}", text);
    }

    /// `[████░░░░]  12s / 30s`; the bar saturates once the total is reached
    pub fn format_progress(&self, elapsed_ms: u64, total_ms: u64) -> String {
        const WIDTH: u64 = 20;
        let filled = if total_ms == 0 {
            0
        } else {
            (elapsed_ms.min(total_ms) * WIDTH / total_ms) as usize
        };

        format!(
            "[{}{}] {:>3}s / {}s",
            "█".repeat(filled).red(),
            "░".repeat(WIDTH as usize - filled),
            elapsed_ms / 1000,
            total_ms / 1000
        )
    }

    pub fn update_recording_progress(&self, elapsed_ms: u64, total_ms: u64) {
        let progress = self.format_progress(elapsed_ms, total_ms);
        self.update_spinner(&format!("Recording... {}", progress));
    }

    /// Print daemon status with a state indicator
    pub fn daemon_status(&self, state: RecordingState) {
        status_line(state_indicator(state), &format!("Daemon: {}", state));
    }

    /// Print a key-value pair (for config list)
    pub fn key_value(&self, key: &str, value: &str) {
        println!("{}: {}", key.cyan(), value);
    }
}

impl Default for Presenter {
    fn default() -> Self {
        Self::new()
    }
}

/// Status lines go to stderr so stdout carries only the artifact path
fn status_line(mark: ColoredString, message: &str) {
    eprintln!("{} {}", mark, message);
}

/// Coloured dot for a recording state
fn state_indicator(state: RecordingState) -> ColoredString {
    match state {
        RecordingState::Idle => "●".cyan(),
        RecordingState::Recording => "●".red(),
        RecordingState::Stopped => "●".green(),
        RecordingState::Failed => "●".yellow(),
    }
}
