//! Voice2Notion CLI entry point

use std::process::ExitCode;

#[cfg(unix)]
use clap::Parser;

#[cfg(unix)]
use voice2notion::cli::{
    app::{init_logging, load_merged_config, run_oneshot, EXIT_ERROR, EXIT_USAGE_ERROR},
    args::{Cli, Commands},
    config_cmd::handle_config_command,
    daemon_app::run_daemon,
    daemon_cmd::handle_daemon_command,
    presenter::Presenter,
    DaemonOptions, RecordOptions,
};
#[cfg(unix)]
use voice2notion::domain::config::{AppConfig, CaptureSource};
#[cfg(unix)]
use voice2notion::domain::recording::{Codec, Duration, Quality};
#[cfg(unix)]
use voice2notion::infrastructure::XdgConfigStore;

#[cfg(unix)]
#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let presenter = Presenter::new();

    // Subcommands log at the default level
    match cli.command {
        Some(Commands::Config { action }) => {
            init_logging(&AppConfig::defaults(), cli.verbose);
            let store = XdgConfigStore::new();
            if let Err(e) = handle_config_command(action, &store, &presenter).await {
                presenter.error(&e.to_string());
                return ExitCode::from(EXIT_ERROR);
            }
            return ExitCode::SUCCESS;
        }
        Some(Commands::Daemon { action }) => {
            init_logging(&AppConfig::defaults(), cli.verbose);
            if let Err(e) = handle_daemon_command(action, &presenter).await {
                presenter.error(&e);
                return ExitCode::from(EXIT_ERROR);
            }
            return ExitCode::SUCCESS;
        }
        None => {}
    }

    let cli_config = AppConfig {
        duration: cli.duration.clone(),
        max_duration: cli.max_duration.clone(),
        output_dir: cli
            .output_dir
            .as_ref()
            .map(|dir| dir.to_string_lossy().into_owned()),
        codec: cli.codec.map(|c| Codec::from(c).to_string()),
        quality: cli.quality.map(|q| Quality::from(q).to_string()),
        source: cli.source.map(|s| CaptureSource::from(s).to_string()),
        notify: if cli.notify { Some(true) } else { None },
        log_level: None,
    };

    let config = load_merged_config(cli_config).await;
    init_logging(&config, cli.verbose);

    if let Err(message) = validate_formats(&config) {
        presenter.error(&message);
        return ExitCode::from(EXIT_USAGE_ERROR);
    }

    if cli.daemon {
        let max_duration = match parse_duration(config.max_duration.as_deref(), "max-duration") {
            Ok(d) => d.unwrap_or_else(Duration::default_max_duration),
            Err(message) => {
                presenter.error(&message);
                return ExitCode::from(EXIT_USAGE_ERROR);
            }
        };

        let options = DaemonOptions {
            max_duration,
            notify: config.notify_or_default(),
        };
        run_daemon(&config, options).await
    } else {
        let duration = match parse_duration(config.duration.as_deref(), "duration") {
            Ok(d) => d.unwrap_or_else(Duration::default_duration),
            Err(message) => {
                presenter.error(&message);
                return ExitCode::from(EXIT_USAGE_ERROR);
            }
        };

        let options = RecordOptions {
            duration,
            notify: config.notify_or_default(),
        };
        run_oneshot(&config, options).await
    }
}

#[cfg(unix)]
fn parse_duration(value: Option<&str>, name: &str) -> Result<Option<Duration>, String> {
    value
        .map(|s| s.parse::<Duration>())
        .transpose()
        .map_err(|e| format!("--{}: {}", name, e))
}

/// Values from the config file are only checked when used
#[cfg(unix)]
fn validate_formats(config: &AppConfig) -> Result<(), String> {
    if let Some(codec) = config.codec.as_deref() {
        codec.parse::<Codec>().map_err(|e| e.to_string())?;
    }
    if let Some(quality) = config.quality.as_deref() {
        quality.parse::<Quality>().map_err(|e| e.to_string())?;
    }
    if let Some(source) = config.source.as_deref() {
        source.parse::<CaptureSource>().map_err(|e| e.to_string())?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn main() -> ExitCode {
    eprintln!("voice2notion currently supports Unix platforms only");
    ExitCode::from(1)
}
