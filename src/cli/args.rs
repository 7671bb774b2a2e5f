//! CLI argument definitions using Clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::domain::config::CaptureSource;
use crate::domain::recording::{Codec, Duration, Quality};

/// Voice2Notion - record voice notes to a single audio file
#[derive(Parser, Debug)]
#[command(name = "voice2notion")]
#[command(version)]
#[command(about = "Record a voice note to a fixed audio file (12 kHz mono)")]
#[command(long_about = None)]
pub struct Cli {
    /// Recording duration (e.g., 10s, 1m, 2m30s)
    #[arg(short = 'd', long, value_name = "TIME", conflicts_with = "daemon")]
    pub duration: Option<String>,

    /// Capture source
    #[arg(short = 's', long, value_name = "SOURCE")]
    pub source: Option<SourceArg>,

    /// Directory the recording is written to
    #[arg(short = 'o', long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Artifact codec
    #[arg(short = 'c', long, value_name = "CODEC")]
    pub codec: Option<CodecArg>,

    /// Sample depth (standard = 8-bit, high = 16-bit)
    #[arg(short = 'q', long, value_name = "QUALITY")]
    pub quality: Option<QualityArg>,

    /// Show desktop notifications
    #[arg(short = 'n', long)]
    pub notify: bool,

    /// Verbose logging on stderr
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Run as daemon (control via: voice2notion daemon toggle/stop/status)
    #[arg(long)]
    pub daemon: bool,

    /// Max recording duration for daemon mode
    #[arg(long, value_name = "TIME", requires = "daemon")]
    pub max_duration: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Send commands to running daemon
    Daemon {
        #[command(subcommand)]
        action: DaemonAction,
    },
}

/// Daemon control actions
#[derive(Subcommand, Debug, Clone, Copy)]
pub enum DaemonAction {
    /// Toggle recording (start if idle, stop if recording)
    Toggle,
    /// Stop and save the current recording
    Stop,
    /// Show daemon status
    Status,
}

/// Config action subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Create config file with defaults
    Init,
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// Config value
        value: String,
    },
    /// Get a config value
    Get {
        /// Config key
        key: String,
    },
    /// List all config values
    List,
    /// Show config file path
    Path,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum SourceArg {
    Microphone,
    Synthetic,
}

impl From<SourceArg> for CaptureSource {
    fn from(arg: SourceArg) -> Self {
        match arg {
            SourceArg::Microphone => CaptureSource::Microphone,
            SourceArg::Synthetic => CaptureSource::Synthetic,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum CodecArg {
    Flac,
    Wav,
}

impl From<CodecArg> for Codec {
    fn from(arg: CodecArg) -> Self {
        match arg {
            CodecArg::Flac => Codec::Flac,
            CodecArg::Wav => Codec::Wav,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum QualityArg {
    Standard,
    High,
}

impl From<QualityArg> for Quality {
    fn from(arg: QualityArg) -> Self {
        match arg {
            QualityArg::Standard => Quality::Standard,
            QualityArg::High => Quality::High,
        }
    }
}

/// Parsed one-shot options
#[derive(Debug, Clone)]
pub struct RecordOptions {
    pub duration: Duration,
    pub notify: bool,
}

/// Parsed daemon options
#[derive(Debug, Clone)]
pub struct DaemonOptions {
    pub max_duration: Duration,
    pub notify: bool,
}

/// Valid config keys
pub const VALID_CONFIG_KEYS: &[&str] = &[
    "duration",
    "max_duration",
    "output_dir",
    "codec",
    "quality",
    "source",
    "notify",
    "log_level",
];

/// Accepted `log_level` values
pub const VALID_LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

pub fn is_valid_config_key(key: &str) -> bool {
    VALID_CONFIG_KEYS.contains(&key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_parses_defaults() {
        let cli = Cli::parse_from(["voice2notion"]);
        assert!(cli.duration.is_none());
        assert!(cli.source.is_none());
        assert!(cli.output_dir.is_none());
        assert!(cli.codec.is_none());
        assert!(!cli.notify);
        assert!(!cli.verbose);
        assert!(!cli.daemon);
    }

    #[test]
    fn cli_parses_recording_options() {
        let cli = Cli::parse_from([
            "voice2notion",
            "-d",
            "30s",
            "-s",
            "synthetic",
            "-o",
            "/tmp/notes",
            "-c",
            "wav",
            "-q",
            "standard",
            "-n",
        ]);
        assert_eq!(cli.duration, Some("30s".to_string()));
        assert_eq!(cli.source, Some(SourceArg::Synthetic));
        assert_eq!(cli.output_dir, Some(PathBuf::from("/tmp/notes")));
        assert_eq!(cli.codec, Some(CodecArg::Wav));
        assert_eq!(cli.quality, Some(QualityArg::Standard));
        assert!(cli.notify);
    }

    #[test]
    fn cli_rejects_unknown_source() {
        assert!(Cli::try_parse_from(["voice2notion", "-s", "radio"]).is_err());
    }

    #[test]
    fn duration_conflicts_with_daemon() {
        assert!(Cli::try_parse_from(["voice2notion", "--daemon", "-d", "5s"]).is_err());
    }

    #[test]
    fn max_duration_requires_daemon() {
        assert!(Cli::try_parse_from(["voice2notion", "--max-duration", "5m"]).is_err());
        let cli = Cli::parse_from(["voice2notion", "--daemon", "--max-duration", "5m"]);
        assert!(cli.daemon);
        assert_eq!(cli.max_duration, Some("5m".to_string()));
    }

    #[test]
    fn cli_parses_daemon_stop() {
        let cli = Cli::parse_from(["voice2notion", "daemon", "stop"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Daemon {
                action: DaemonAction::Stop
            })
        ));
    }

    #[test]
    fn cli_parses_config_set() {
        let cli = Cli::parse_from(["voice2notion", "config", "set", "codec", "wav"]);
        if let Some(Commands::Config {
            action: ConfigAction::Set { key, value },
        }) = cli.command
        {
            assert_eq!(key, "codec");
            assert_eq!(value, "wav");
        } else {
            panic!("Expected Config Set command");
        }
    }

    #[test]
    fn arg_enums_convert() {
        assert_eq!(CaptureSource::from(SourceArg::Synthetic), CaptureSource::Synthetic);
        assert_eq!(Codec::from(CodecArg::Flac), Codec::Flac);
        assert_eq!(Quality::from(QualityArg::Standard), Quality::Standard);
    }

    #[test]
    fn valid_config_keys() {
        assert!(is_valid_config_key("output_dir"));
        assert!(is_valid_config_key("log_level"));
        assert!(!is_valid_config_key("api_key"));
    }

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }
}
