//! Synthetic capture device
//!
//! Produces a sine tone instead of reading hardware, so sessions can be run
//! headless (CI, containers, demos). Like a real microphone it can only be
//! held by one session at a time, and it can be told to refuse permission or
//! report itself unavailable.

use std::f32::consts::PI;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;

use crate::application::ports::{CaptureDevice, CaptureError, CaptureHandle, PermissionStatus};
use crate::domain::recording::AudioFormat;

/// Default tone frequency in Hz
pub const DEFAULT_FREQUENCY_HZ: f32 = 440.0;

/// Shortest capture ever returned, in milliseconds
const MIN_CAPTURE_MS: u64 = 20;

/// Tone amplitude relative to full scale
const AMPLITUDE: f32 = 0.3;

/// How the synthetic device responds to a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyntheticBehavior {
    #[default]
    Tone,
    PermissionDenied,
    Unavailable,
}

/// Sine-tone capture device
#[derive(Debug, Clone)]
pub struct SyntheticTone {
    behavior: SyntheticBehavior,
    frequency: f32,
    in_use: Arc<AtomicBool>,
}

impl SyntheticTone {
    pub fn new() -> Self {
        Self::with_behavior(SyntheticBehavior::Tone)
    }

    pub fn with_behavior(behavior: SyntheticBehavior) -> Self {
        Self {
            behavior,
            frequency: DEFAULT_FREQUENCY_HZ,
            in_use: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Whether a session currently holds the device
    pub fn is_in_use(&self) -> bool {
        self.in_use.load(Ordering::SeqCst)
    }
}

impl Default for SyntheticTone {
    fn default() -> Self {
        Self::new()
    }
}

/// Generate `count` samples of a sine tone
pub fn tone(frequency: f32, sample_rate: u32, count: usize) -> Vec<i16> {
    (0..count)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            ((2.0 * PI * frequency * t).sin() * AMPLITUDE * i16::MAX as f32) as i16
        })
        .collect()
}

#[async_trait]
impl CaptureDevice for SyntheticTone {
    async fn request_permission(&self) -> PermissionStatus {
        match self.behavior {
            SyntheticBehavior::PermissionDenied => PermissionStatus::Denied,
            _ => PermissionStatus::Granted,
        }
    }

    async fn open(&self, format: &AudioFormat) -> Result<Box<dyn CaptureHandle>, CaptureError> {
        match self.behavior {
            SyntheticBehavior::Unavailable => {
                return Err(CaptureError::DeviceUnavailable(
                    "synthetic device unavailable".into(),
                ))
            }
            SyntheticBehavior::PermissionDenied => {
                return Err(CaptureError::PermissionDenied(
                    "synthetic device denies access".into(),
                ))
            }
            SyntheticBehavior::Tone => {}
        }

        if self
            .in_use
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(CaptureError::DeviceUnavailable("device busy".into()));
        }

        Ok(Box::new(SyntheticCapture {
            frequency: self.frequency,
            sample_rate: format.sample_rate,
            started: Instant::now(),
            in_use: Arc::clone(&self.in_use),
        }))
    }
}

/// A running synthetic stream
struct SyntheticCapture {
    frequency: f32,
    sample_rate: u32,
    started: Instant,
    in_use: Arc<AtomicBool>,
}

#[async_trait]
impl CaptureHandle for SyntheticCapture {
    async fn finish(self: Box<Self>) -> Result<Vec<i16>, CaptureError> {
        let millis = self.elapsed_ms().max(MIN_CAPTURE_MS);
        let count = (millis * self.sample_rate as u64 / 1000) as usize;
        Ok(tone(self.frequency, self.sample_rate, count))
    }

    fn elapsed_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }
}

impl Drop for SyntheticCapture {
    fn drop(&mut self) {
        self.in_use.store(false, Ordering::SeqCst);
    }
}
