//! Application configuration value object

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::error::FormatParseError;
use crate::domain::recording::{AudioFormat, Codec, Duration, Quality};

/// Where captured audio comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptureSource {
    /// Default input device of the platform audio host
    #[default]
    Microphone,
    /// Generated test tone; needs no audio hardware
    Synthetic,
}

impl CaptureSource {
    pub const VALID: &'static str = "microphone, synthetic";

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Microphone => "microphone",
            Self::Synthetic => "synthetic",
        }
    }
}

impl fmt::Display for CaptureSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CaptureSource {
    type Err = FormatParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "microphone" | "mic" => Ok(Self::Microphone),
            "synthetic" | "tone" => Ok(Self::Synthetic),
            _ => Err(FormatParseError {
                what: "source",
                input: s.to_string(),
                valid: Self::VALID,
            }),
        }
    }
}

/// Application configuration.
/// All fields are optional to support partial configs and merging.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub duration: Option<String>,
    pub max_duration: Option<String>,
    pub output_dir: Option<String>,
    pub codec: Option<String>,
    pub quality: Option<String>,
    pub source: Option<String>,
    pub notify: Option<bool>,
    pub log_level: Option<String>,
}

impl AppConfig {
    /// Config with every default filled in. `output_dir` stays unset so the
    /// platform data directory is resolved at run time.
    pub fn defaults() -> Self {
        Self {
            duration: Some(Duration::default_duration().to_string()),
            max_duration: Some(Duration::default_max_duration().to_string()),
            output_dir: None,
            codec: Some(Codec::default().to_string()),
            quality: Some(Quality::default().to_string()),
            source: Some(CaptureSource::default().to_string()),
            notify: Some(false),
            log_level: Some("warn".to_string()),
        }
    }

    /// Create an empty config (all None)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge this config with another, where other takes precedence.
    /// Only non-None values from other will override this.
    pub fn merge(self, other: Self) -> Self {
        Self {
            duration: other.duration.or(self.duration),
            max_duration: other.max_duration.or(self.max_duration),
            output_dir: other.output_dir.or(self.output_dir),
            codec: other.codec.or(self.codec),
            quality: other.quality.or(self.quality),
            source: other.source.or(self.source),
            notify: other.notify.or(self.notify),
            log_level: other.log_level.or(self.log_level),
        }
    }

    pub fn codec_or_default(&self) -> Codec {
        parse_or_default(self.codec.as_deref())
    }

    pub fn quality_or_default(&self) -> Quality {
        parse_or_default(self.quality.as_deref())
    }

    pub fn source_or_default(&self) -> CaptureSource {
        parse_or_default(self.source.as_deref())
    }

    pub fn notify_or_default(&self) -> bool {
        self.notify.unwrap_or(false)
    }

    pub fn log_level_or_default(&self) -> &str {
        self.log_level.as_deref().unwrap_or("warn")
    }

    /// Artifact format derived from codec and quality
    pub fn audio_format(&self) -> AudioFormat {
        AudioFormat::speech(self.codec_or_default(), self.quality_or_default())
    }
}

fn parse_or_default<T: FromStr + Default>(value: Option<&str>) -> T {
    value.and_then(|s| s.parse().ok()).unwrap_or_default()
}
