//! Artifact file encoders
//!
//! FLAC (flacenc) buffers the session and encodes on finalize; WAV (hound)
//! streams samples to disk as they are written. Both create or truncate the
//! artifact when the session starts and sync it before reporting success.

mod flac;
mod wav;

pub use flac::FlacWriter;
pub use wav::WavArtifactWriter;

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::application::ports::{ArtifactEncoder, ArtifactWriter, CaptureError};
use crate::domain::recording::{AudioFormat, Codec};

/// Encoder that writes the artifact in the codec named by the format
#[derive(Debug, Clone, Copy, Default)]
pub struct ArtifactFileEncoder;

impl ArtifactFileEncoder {
    pub fn new() -> Self {
        Self
    }

    fn validate(format: &AudioFormat) -> Result<(), CaptureError> {
        if format.channels != 1 {
            return Err(CaptureError::EncoderInitFailure(format!(
                "only mono is supported, got {} channels",
                format.channels
            )));
        }
        if format.sample_rate == 0 {
            return Err(CaptureError::EncoderInitFailure("sample rate must be non-zero".into()));
        }
        Ok(())
    }
}

impl ArtifactEncoder for ArtifactFileEncoder {
    fn create(
        &self,
        path: &Path,
        format: &AudioFormat,
    ) -> Result<Box<dyn ArtifactWriter>, CaptureError> {
        Self::validate(format)?;

        if path.is_dir() {
            return Err(CaptureError::EncoderInitFailure(format!(
                "{} is a directory",
                path.display()
            )));
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                CaptureError::EncoderInitFailure(format!("{}: {}", parent.display(), e))
            })?;
        }

        debug!(path = %path.display(), %format, "creating artifact");
        match format.codec {
            Codec::Flac => Ok(Box::new(FlacWriter::create(path, *format)?)),
            Codec::Wav => Ok(Box::new(WavArtifactWriter::create(path, *format)?)),
        }
    }
}

/// Convert an i16 sample to the artifact's bit depth
pub(crate) fn scale_sample(sample: i16, bits_per_sample: u16) -> i32 {
    match bits_per_sample {
        8 => (sample >> 8) as i32,
        _ => sample as i32,
    }
}
