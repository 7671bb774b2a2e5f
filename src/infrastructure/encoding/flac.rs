//! FLAC artifact writer
//!
//! flacenc works on a complete in-memory source, so samples are buffered for
//! the length of the session and encoded in one pass on finalize.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use flacenc::bitsink::ByteSink;
use flacenc::component::BitRepr;
use flacenc::config;
use flacenc::error::Verify;
use flacenc::source::MemSource;

use super::scale_sample;
use crate::application::ports::{ArtifactInfo, ArtifactWriter, CaptureError};
use crate::domain::recording::AudioFormat;

/// Buffered FLAC writer for one session
pub struct FlacWriter {
    file: File,
    path: PathBuf,
    format: AudioFormat,
    samples: Vec<i32>,
}

impl FlacWriter {
    /// Create (or truncate) the artifact file
    pub fn create(path: &Path, format: AudioFormat) -> Result<Self, CaptureError> {
        let file = File::create(path).map_err(|e| {
            CaptureError::EncoderInitFailure(format!("{}: {}", path.display(), e))
        })?;

        Ok(Self {
            file,
            path: path.to_path_buf(),
            format,
            samples: Vec::new(),
        })
    }
}

/// Encode mono samples (already at the target bit depth) into FLAC bytes
pub fn encode_flac(samples: &[i32], format: &AudioFormat) -> Result<Vec<u8>, CaptureError> {
    let config = config::Encoder::default()
        .into_verified()
        .map_err(|(_, e)| CaptureError::EncoderInitFailure(format!("FLAC config: {:?}", e)))?;

    let source = MemSource::from_samples(
        samples,
        format.channels as usize,
        format.bits_per_sample() as usize,
        format.sample_rate as usize,
    );

    let stream = flacenc::encode_with_fixed_block_size(&config, source, config.block_size)
        .map_err(|e| CaptureError::IoFailure(format!("FLAC encoding failed: {:?}", e)))?;

    let mut sink = ByteSink::new();
    stream
        .write(&mut sink)
        .map_err(|e| CaptureError::IoFailure(format!("FLAC write failed: {}", e)))?;
    Ok(sink.into_inner())
}

impl ArtifactWriter for FlacWriter {
    fn write(&mut self, samples: &[i16]) -> Result<(), CaptureError> {
        let bits = self.format.bits_per_sample();
        self.samples
            .extend(samples.iter().map(|&s| scale_sample(s, bits)));
        Ok(())
    }

    fn finalize(self: Box<Self>) -> Result<ArtifactInfo, CaptureError> {
        let Self {
            mut file,
            path,
            format,
            samples,
        } = *self;
        let bytes = encode_flac(&samples, &format)?;

        let io_error = |e: std::io::Error| CaptureError::IoFailure(format!("{}: {}", path.display(), e));
        file.write_all(&bytes).map_err(io_error)?;
        file.sync_all().map_err(io_error)?;

        Ok(ArtifactInfo {
            path,
            bytes: bytes.len() as u64,
            samples: samples.len() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::recording::{Codec, Quality};

    fn sine(count: usize) -> Vec<i32> {
        (0..count)
            .map(|i| {
                let t = i as f32 / 12_000.0;
                (f32::sin(2.0 * std::f32::consts::PI * 440.0 * t) * 16_000.0) as i32
            })
            .collect()
    }

    #[test]
    fn encode_has_flac_magic() {
        let bytes = encode_flac(&vec![0; 12_000], &AudioFormat::default()).unwrap();
        assert_eq!(&bytes[0..4], b"fLaC");
    }

    #[test]
    fn encode_compresses_tone() {
        let samples = sine(12_000);
        let bytes = encode_flac(&samples, &AudioFormat::default()).unwrap();
        assert!(bytes.len() < samples.len() * 2);
    }

    #[test]
    fn encode_standard_quality() {
        let samples: Vec<i32> = sine(2_400).into_iter().map(|s| s >> 8).collect();
        let format = AudioFormat::speech(Codec::Flac, Quality::Standard);
        assert!(encode_flac(&samples, &format).is_ok());
    }

    #[test]
    fn finalize_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recording.flac");
        let mut writer = Box::new(FlacWriter::create(&path, AudioFormat::default()).unwrap());

        writer.write(&[0i16; 1_200]).unwrap();
        let info = writer.finalize().unwrap();

        assert_eq!(info.samples, 1_200);
        assert_eq!(std::fs::metadata(&path).unwrap().len(), info.bytes);
        assert_eq!(&std::fs::read(&path).unwrap()[0..4], b"fLaC");
    }
}
