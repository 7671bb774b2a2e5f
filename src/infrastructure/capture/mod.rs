//! Capture device adapters
//!
//! cpal microphone capture for real recordings and a synthetic tone device
//! for headless runs.

mod cpal_microphone;
mod samples;
mod synthetic;

pub use cpal_microphone::CpalMicrophone;
pub use synthetic::{tone, SyntheticBehavior, SyntheticTone, DEFAULT_FREQUENCY_HZ};

use crate::application::ports::CaptureDevice;
use crate::domain::config::CaptureSource;

/// Create the capture device for a configured source
pub fn create_capture_device(source: CaptureSource) -> Box<dyn CaptureDevice> {
    match source {
        CaptureSource::Microphone => Box::new(CpalMicrophone::new()),
        CaptureSource::Synthetic => Box::new(SyntheticTone::new()),
    }
}
