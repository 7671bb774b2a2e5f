//! Main app runner for one-shot mode, plus the wiring shared with the daemon

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use crate::application::ports::{CaptureDevice, ConfigStore};
use crate::application::{NotifierObserver, RecordingSessionManager};
use crate::domain::config::AppConfig;
use crate::infrastructure::config::OUTPUT_DIR_ENV;
use crate::infrastructure::{
    create_capture_device, default_output_dir, ArtifactFileEncoder, NotifyRustNotifier,
    XdgConfigStore,
};

use super::args::RecordOptions;
use super::presenter::Presenter;
use super::signals::ShutdownSignal;

/// Exit codes
pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_USAGE_ERROR: u8 = 2;

/// Environment variable holding a tracing filter directive
pub const LOG_ENV: &str = "VOICE2NOTION_LOG";

/// Progress refresh interval while recording
const TICK: StdDuration = StdDuration::from_millis(100);

/// Manager type used by both CLI modes
pub type SessionManager = RecordingSessionManager<Box<dyn CaptureDevice>, ArtifactFileEncoder>;

/// Install the stderr tracing subscriber.
///
/// `VOICE2NOTION_LOG` wins, then `-v` (debug), then the configured level.
pub fn init_logging(config: &AppConfig, verbose: bool) {
    let fallback = if verbose {
        "debug"
    } else {
        config.log_level_or_default()
    };
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(format!("voice2notion={}", fallback)))
        .unwrap_or_else(|_| EnvFilter::new("voice2notion=warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Load and merge configuration: defaults < file < env < cli
pub async fn load_merged_config(cli_config: AppConfig) -> AppConfig {
    let file_config = XdgConfigStore::new().load_or_empty().await;

    let env_config = AppConfig {
        output_dir: env::var(OUTPUT_DIR_ENV).ok().filter(|s| !s.is_empty()),
        ..Default::default()
    };

    AppConfig::defaults()
        .merge(file_config)
        .merge(env_config)
        .merge(cli_config)
}

/// Fixed artifact path: `<output_dir>/recording.<ext>`
pub fn artifact_path(config: &AppConfig) -> PathBuf {
    let dir = config
        .output_dir
        .as_deref()
        .map(PathBuf::from)
        .unwrap_or_else(default_output_dir);
    dir.join(config.audio_format().file_name())
}

/// Build the session manager for the configured source, codec and path
pub fn build_manager(config: &AppConfig) -> SessionManager {
    let path = artifact_path(config);
    debug!(source = %config.source_or_default(), path = %path.display(), "building session manager");
    RecordingSessionManager::new(
        create_capture_device(config.source_or_default()),
        ArtifactFileEncoder::new(),
        path,
        config.audio_format(),
    )
}

/// Subscribe a desktop notifier to the manager
pub fn attach_notifier(manager: &SessionManager) {
    match NotifierObserver::new(NotifyRustNotifier::new()) {
        Some(observer) => {
            manager.subscribe(Arc::new(observer));
        }
        None => warn!("notifications need a tokio runtime, skipping"),
    }
}

/// Record once for `options.duration` (or until Ctrl-C) and print the
/// artifact path on stdout
pub async fn run_oneshot(config: &AppConfig, options: RecordOptions) -> ExitCode {
    let mut presenter = Presenter::new();

    let shutdown = ShutdownSignal::new();
    if let Err(e) = shutdown.setup() {
        presenter.error(&format!("Failed to setup signal handler: {}", e));
        return ExitCode::from(EXIT_ERROR);
    }

    let manager = build_manager(config);
    if options.notify {
        attach_notifier(&manager);
    }

    if let Err(e) = manager.start().await {
        presenter.error(&format!("Failed to start recording: {}", e));
        return ExitCode::from(EXIT_ERROR);
    }

    let total_ms = options.duration.as_millis();
    presenter.start_spinner("Recording...");
    let mut ticker = tokio::time::interval(TICK);
    loop {
        ticker.tick().await;
        let elapsed_ms = manager.elapsed_ms();
        presenter.update_recording_progress(elapsed_ms, total_ms);

        if shutdown.is_shutdown() {
            debug!(elapsed_ms, "interrupted, stopping early");
            break;
        }
        if elapsed_ms >= total_ms {
            break;
        }
    }

    match manager.stop().await {
        Ok(()) => {
            let Some(artifact) = manager.last_artifact() else {
                presenter.spinner_fail("Recording produced no artifact");
                return ExitCode::from(EXIT_ERROR);
            };
            presenter.spinner_success(&format!(
                "Recording saved ({})",
                artifact.human_readable_size()
            ));
            presenter.output(&artifact.path.to_string_lossy());
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            presenter.spinner_fail(&format!("Failed to save recording: {}", e));
            ExitCode::from(EXIT_ERROR)
        }
    }
}
