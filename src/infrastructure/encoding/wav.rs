//! WAV artifact writer

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use hound::{SampleFormat, WavSpec, WavWriter};

use crate::application::ports::{ArtifactInfo, ArtifactWriter, CaptureError};
use crate::domain::recording::AudioFormat;

/// Streaming PCM WAV writer for one session
pub struct WavArtifactWriter {
    writer: WavWriter<BufWriter<File>>,
    path: PathBuf,
    bits_per_sample: u16,
    samples: u64,
}

impl WavArtifactWriter {
    /// Create (or truncate) the artifact file and write its header
    pub fn create(path: &Path, format: AudioFormat) -> Result<Self, CaptureError> {
        let spec = WavSpec {
            channels: format.channels,
            sample_rate: format.sample_rate,
            bits_per_sample: format.bits_per_sample(),
            sample_format: SampleFormat::Int,
        };

        let writer = WavWriter::create(path, spec).map_err(|e| {
            CaptureError::EncoderInitFailure(format!("{}: {}", path.display(), e))
        })?;

        Ok(Self {
            writer,
            path: path.to_path_buf(),
            bits_per_sample: format.bits_per_sample(),
            samples: 0,
        })
    }

    fn io_error(&self, e: impl std::fmt::Display) -> CaptureError {
        CaptureError::IoFailure(format!("{}: {}", self.path.display(), e))
    }
}

impl ArtifactWriter for WavArtifactWriter {
    fn write(&mut self, samples: &[i16]) -> Result<(), CaptureError> {
        for &sample in samples {
            let result = match self.bits_per_sample {
                8 => self.writer.write_sample((sample >> 8) as i8),
                _ => self.writer.write_sample(sample),
            };
            result.map_err(|e| self.io_error(e))?;
        }
        self.samples += samples.len() as u64;
        Ok(())
    }

    fn finalize(self: Box<Self>) -> Result<ArtifactInfo, CaptureError> {
        let Self {
            writer,
            path,
            samples,
            ..
        } = *self;

        let io_error = |e: &dyn std::fmt::Display| {
            CaptureError::IoFailure(format!("{}: {}", path.display(), e))
        };
        writer.finalize().map_err(|e| io_error(&e))?;

        // hound flushes but does not fsync
        let file = File::open(&path).map_err(|e| io_error(&e))?;
        file.sync_all().map_err(|e| io_error(&e))?;
        let bytes = file.metadata().map_err(|e| io_error(&e))?.len();

        Ok(ArtifactInfo {
            path,
            bytes,
            samples,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::recording::{Codec, Quality};

    #[test]
    fn writes_decodable_mono_12khz() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recording.wav");
        let format = AudioFormat::speech(Codec::Wav, Quality::High);
        let mut writer = Box::new(WavArtifactWriter::create(&path, format).unwrap());

        writer.write(&[1, -1, 300, -300]).unwrap();
        let info = writer.finalize().unwrap();
        assert_eq!(info.samples, 4);
        assert_eq!(std::fs::metadata(&path).unwrap().len(), info.bytes);

        let mut reader = hound::WavReader::open(&path).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 12_000);
        assert_eq!(spec.bits_per_sample, 16);
        let decoded: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(decoded, vec![1, -1, 300, -300]);
    }

    #[test]
    fn standard_quality_is_8_bit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recording.wav");
        let format = AudioFormat::speech(Codec::Wav, Quality::Standard);
        let mut writer = Box::new(WavArtifactWriter::create(&path, format).unwrap());

        writer.write(&[0x1200, -0x1200]).unwrap();
        writer.finalize().unwrap();

        let mut reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().bits_per_sample, 8);
        let decoded: Vec<i8> = reader.samples::<i8>().map(|s| s.unwrap()).collect();
        assert_eq!(decoded, vec![0x12, -0x12]);
    }
}
