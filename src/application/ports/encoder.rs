//! Artifact encoder port interfaces

use std::path::{Path, PathBuf};

use crate::domain::error::CaptureError;
use crate::domain::recording::AudioFormat;

/// Summary of a finalized artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactInfo {
    pub path: PathBuf,
    /// File size on disk
    pub bytes: u64,
    /// Number of samples encoded
    pub samples: u64,
}

impl ArtifactInfo {
    /// Human-readable size (e.g. "12.4 KB")
    pub fn human_readable_size(&self) -> String {
        let bytes = self.bytes as f64;
        if bytes < 1024.0 {
            format!("{} B", self.bytes)
        } else if bytes < 1024.0 * 1024.0 {
            format!("{:.1} KB", bytes / 1024.0)
        } else {
            format!("{:.1} MB", bytes / (1024.0 * 1024.0))
        }
    }
}

/// Port for creating artifact files.
pub trait ArtifactEncoder: Send + Sync {
    /// Validate the format and create (or truncate) the file at `path`.
    ///
    /// Errors are `CaptureError::EncoderInitFailure`. The file is not touched
    /// when format validation fails.
    fn create(&self, path: &Path, format: &AudioFormat)
        -> Result<Box<dyn ArtifactWriter>, CaptureError>;
}

/// An open artifact owned by one session
pub trait ArtifactWriter: Send {
    /// Append mono samples at the format's sample rate.
    fn write(&mut self, samples: &[i16]) -> Result<(), CaptureError>;

    /// Finish encoding, flush and sync the file.
    fn finalize(self: Box<Self>) -> Result<ArtifactInfo, CaptureError>;
}
