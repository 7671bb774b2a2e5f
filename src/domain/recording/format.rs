//! Fixed encoding parameters for the recording artifact
//!
//! Every session uses the same format: 12kHz, mono. Codec and quality are
//! picked once from configuration when the manager is built.

use std::fmt;
use std::str::FromStr;

use crate::domain::error::FormatParseError;

/// Artifact sample rate in Hz
pub const SAMPLE_RATE: u32 = 12_000;

/// Artifact channel count (mono)
pub const CHANNELS: u16 = 1;

/// Container/codec of the artifact file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Codec {
    /// Lossless compressed FLAC
    #[default]
    Flac,
    /// Uncompressed PCM in a RIFF/WAVE container
    Wav,
}

impl Codec {
    pub const VALID: &'static str = "flac, wav";

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Flac => "flac",
            Self::Wav => "wav",
        }
    }

    /// File extension for artifacts in this codec
    pub const fn extension(&self) -> &'static str {
        self.as_str()
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Codec {
    type Err = FormatParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "flac" => Ok(Self::Flac),
            "wav" | "wave" => Ok(Self::Wav),
            _ => Err(FormatParseError {
                what: "codec",
                input: s.to_string(),
                valid: Self::VALID,
            }),
        }
    }
}

/// Encoder quality level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Quality {
    /// 8-bit samples
    Standard,
    /// 16-bit samples
    #[default]
    High,
}

impl Quality {
    pub const VALID: &'static str = "standard, high";

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::High => "high",
        }
    }

    pub const fn bits_per_sample(&self) -> u16 {
        match self {
            Self::Standard => 8,
            Self::High => 16,
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Quality {
    type Err = FormatParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "high" => Ok(Self::High),
            _ => Err(FormatParseError {
                what: "quality",
                input: s.to_string(),
                valid: Self::VALID,
            }),
        }
    }
}

/// Encoding parameters shared by every session of a manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioFormat {
    pub codec: Codec,
    pub sample_rate: u32,
    pub channels: u16,
    pub quality: Quality,
}

impl AudioFormat {
    /// Speech format with the given codec and quality
    pub const fn speech(codec: Codec, quality: Quality) -> Self {
        Self {
            codec,
            sample_rate: SAMPLE_RATE,
            channels: CHANNELS,
            quality,
        }
    }

    pub const fn bits_per_sample(&self) -> u16 {
        self.quality.bits_per_sample()
    }

    /// Artifact file name, e.g. `recording.flac`
    pub fn file_name(&self) -> String {
        format!("recording.{}", self.codec.extension())
    }
}

impl Default for AudioFormat {
    fn default() -> Self {
        Self::speech(Codec::default(), Quality::default())
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}Hz {}ch {}-bit",
            self.codec,
            self.sample_rate,
            self.channels,
            self.bits_per_sample()
        )
    }
}
