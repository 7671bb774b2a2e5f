//! Microphone capture using cpal
//!
//! The cpal stream is not `Send`, so each session gets a dedicated capture
//! thread that owns the stream from creation to teardown. The thread pushes
//! mono i16 samples at the device rate into a shared buffer; resampling to
//! the artifact rate happens once, when the session finishes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::thread::JoinHandle;
use std::time::{Duration as StdDuration, Instant};

use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BuildStreamError, SampleFormat, SampleRate, StreamConfig, SupportedStreamConfigRange};
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};

use super::samples::{downmix, f32_to_i16, resample};
use crate::application::ports::{CaptureDevice, CaptureError, CaptureHandle, PermissionStatus};
use crate::domain::recording::AudioFormat;

/// First stream error reported while a session is recording
type StreamFault = Arc<StdMutex<Option<CaptureError>>>;

/// Default input device of the platform audio host
#[derive(Debug, Clone, Default)]
pub struct CpalMicrophone;

impl CpalMicrophone {
    pub fn new() -> Self {
        Self
    }

    fn input_device() -> Result<cpal::Device, CaptureError> {
        cpal::default_host()
            .default_input_device()
            .ok_or_else(|| CaptureError::DeviceUnavailable("no default input device".into()))
    }

    /// Pick the config closest to the target rate: ranges containing it
    /// first, then fewest channels. Only i16 and f32 streams are accepted.
    fn input_config(
        device: &cpal::Device,
        target_rate: u32,
    ) -> Result<(StreamConfig, SampleFormat), CaptureError> {
        let includes_target = |range: &SupportedStreamConfigRange| {
            range.min_sample_rate().0 <= target_rate && range.max_sample_rate().0 >= target_rate
        };

        let range = device
            .supported_input_configs()
            .map_err(|e| backend_error(e.to_string()))?
            .filter(|range| matches!(range.sample_format(), SampleFormat::I16 | SampleFormat::F32))
            .min_by_key(|range| (!includes_target(range), range.channels()))
            .ok_or_else(|| {
                CaptureError::EncoderInitFailure("no supported i16/f32 input config".into())
            })?;

        let sample_rate = if includes_target(&range) {
            SampleRate(target_rate)
        } else if range.max_sample_rate().0 < target_rate {
            range.max_sample_rate()
        } else {
            range.min_sample_rate()
        };

        let config = StreamConfig {
            channels: range.channels(),
            sample_rate,
            buffer_size: cpal::BufferSize::Default,
        };
        Ok((config, range.sample_format()))
    }

    fn build_stream(
        device: &cpal::Device,
        config: &StreamConfig,
        sample_format: SampleFormat,
        buffer: Arc<StdMutex<Vec<i16>>>,
        fault: StreamFault,
    ) -> Result<cpal::Stream, CaptureError> {
        let channels = config.channels;
        let on_error = move |err: cpal::StreamError| record_fault(&fault, err);

        let stream = match sample_format {
            SampleFormat::I16 => device.build_input_stream(
                config,
                move |data: &[i16], _: &cpal::InputCallbackInfo| {
                    let mono = downmix(data, channels);
                    if let Ok(mut buffer) = buffer.lock() {
                        buffer.extend_from_slice(&mono);
                    }
                },
                on_error,
                None,
            ),
            SampleFormat::F32 => device.build_input_stream(
                config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    let mono = downmix(&f32_to_i16(data), channels);
                    if let Ok(mut buffer) = buffer.lock() {
                        buffer.extend_from_slice(&mono);
                    }
                },
                on_error,
                None,
            ),
            other => {
                return Err(CaptureError::EncoderInitFailure(format!(
                    "unsupported sample format {:?}",
                    other
                )))
            }
        };

        stream.map_err(|e| match e {
            BuildStreamError::DeviceNotAvailable => {
                CaptureError::DeviceUnavailable("input device disappeared".into())
            }
            BuildStreamError::StreamConfigNotSupported => {
                CaptureError::EncoderInitFailure("stream config not supported".into())
            }
            other => backend_error(other.to_string()),
        })
    }
}

/// Body of the capture thread. Reports the device rate (or the failure) on
/// `ready`, then keeps the stream alive until `running` is cleared.
fn run_capture(
    target_rate: u32,
    buffer: Arc<StdMutex<Vec<i16>>>,
    fault: StreamFault,
    running: Arc<AtomicBool>,
    ready: oneshot::Sender<Result<u32, CaptureError>>,
) {
    let opened = CpalMicrophone::input_device().and_then(|device| {
        let (config, sample_format) = CpalMicrophone::input_config(&device, target_rate)?;
        if let Ok(name) = device.name() {
            info!(device = %name, rate = config.sample_rate.0, channels = config.channels, "opening input device");
        }
        let stream = CpalMicrophone::build_stream(&device, &config, sample_format, buffer, fault)?;
        stream.play().map_err(|e| backend_error(e.to_string()))?;
        Ok((stream, config.sample_rate.0))
    });

    let stream = match opened {
        Ok((stream, rate)) => {
            if ready.send(Ok(rate)).is_err() {
                // The caller went away before the stream came up
                return;
            }
            stream
        }
        Err(e) => {
            let _ = ready.send(Err(e));
            return;
        }
    };

    while running.load(Ordering::SeqCst) {
        std::thread::park_timeout(StdDuration::from_millis(50));
    }
    drop(stream);
    debug!("input device released");
}

#[async_trait]
impl CaptureDevice for CpalMicrophone {
    /// Desktop hosts have no permission prompt; access is denied only when
    /// the host refuses to enumerate input devices.
    async fn request_permission(&self) -> PermissionStatus {
        let probe = tokio::task::spawn_blocking(|| {
            cpal::default_host()
                .input_devices()
                .map(|_| ())
                .map_err(|e| backend_error(e.to_string()))
        })
        .await;

        match probe {
            Ok(Err(CaptureError::PermissionDenied(reason))) => {
                warn!("microphone permission denied: {}", reason);
                PermissionStatus::Denied
            }
            _ => PermissionStatus::Granted,
        }
    }

    async fn open(&self, format: &AudioFormat) -> Result<Box<dyn CaptureHandle>, CaptureError> {
        let target_rate = format.sample_rate;
        let buffer = Arc::new(StdMutex::new(Vec::new()));
        let fault: StreamFault = Arc::new(StdMutex::new(None));
        let running = Arc::new(AtomicBool::new(true));
        let (ready_tx, ready_rx) = oneshot::channel();

        let thread = {
            let buffer = Arc::clone(&buffer);
            let fault = Arc::clone(&fault);
            let running = Arc::clone(&running);
            std::thread::Builder::new()
                .name("voice2notion-capture".into())
                .spawn(move || run_capture(target_rate, buffer, fault, running, ready_tx))
                .map_err(|e| CaptureError::DeviceUnavailable(format!("capture thread: {}", e)))?
        };

        let device_rate = ready_rx
            .await
            .map_err(|_| CaptureError::DeviceUnavailable("capture thread exited".into()))??;

        Ok(Box::new(CpalCapture {
            buffer,
            fault,
            running,
            device_rate,
            target_rate,
            started: Instant::now(),
            thread: Some(thread),
        }))
    }
}

/// Running microphone stream owned by one session
struct CpalCapture {
    buffer: Arc<StdMutex<Vec<i16>>>,
    fault: StreamFault,
    running: Arc<AtomicBool>,
    device_rate: u32,
    target_rate: u32,
    started: Instant,
    thread: Option<JoinHandle<()>>,
}

impl CpalCapture {
    fn signal_stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(thread) = &self.thread {
            thread.thread().unpark();
        }
    }
}

#[async_trait]
impl CaptureHandle for CpalCapture {
    async fn finish(mut self: Box<Self>) -> Result<Vec<i16>, CaptureError> {
        self.signal_stop();
        if let Some(thread) = self.thread.take() {
            tokio::task::spawn_blocking(move || thread.join())
                .await
                .map_err(|e| CaptureError::IoFailure(format!("Capture join error: {}", e)))?
                .map_err(|_| CaptureError::IoFailure("capture thread panicked".into()))?;
        }

        // Audio with a gap is not a valid recording
        if let Some(fault) = self.fault.lock().unwrap_or_else(|e| e.into_inner()).take() {
            return Err(fault);
        }

        let samples = {
            let mut buffer = self.buffer.lock().unwrap_or_else(|e| e.into_inner());
            std::mem::take(&mut *buffer)
        };
        debug!(samples = samples.len(), rate = self.device_rate, "capture finished");

        let (from, to) = (self.device_rate, self.target_rate);
        tokio::task::spawn_blocking(move || resample(&samples, from, to))
            .await
            .map_err(|e| CaptureError::IoFailure(format!("Resample task error: {}", e)))?
    }

    fn elapsed_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }
}

impl Drop for CpalCapture {
    fn drop(&mut self) {
        self.signal_stop();
    }
}

/// Keep the first stream error; later ones are only logged
fn record_fault(fault: &StreamFault, err: cpal::StreamError) {
    error!("audio stream error: {}", err);
    let mut slot = fault.lock().unwrap_or_else(|e| e.into_inner());
    if slot.is_none() {
        *slot = Some(match err {
            cpal::StreamError::DeviceNotAvailable => {
                CaptureError::DeviceUnavailable("input device lost during recording".into())
            }
            other => CaptureError::IoFailure(format!("audio stream error: {}", other)),
        });
    }
}

/// Map a backend message to a permission or availability error
fn backend_error(message: String) -> CaptureError {
    let lower = message.to_lowercase();
    let denied = ["permission", "denied", "not authorized", "unauthorized"]
        .iter()
        .any(|needle| lower.contains(needle));

    if denied {
        CaptureError::PermissionDenied(message)
    } else {
        CaptureError::DeviceUnavailable(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_error_detects_permission() {
        assert_eq!(
            backend_error("Access denied by TCC".into()).kind(),
            "permission_denied"
        );
        assert_eq!(
            backend_error("Not authorized to record".into()).kind(),
            "permission_denied"
        );
    }

    #[test]
    fn backend_error_defaults_to_unavailable() {
        assert_eq!(
            backend_error("ALSA function 'snd_pcm_open' failed".into()).kind(),
            "device_unavailable"
        );
    }

    fn capture_with_fault(fault: Option<CaptureError>) -> Box<CpalCapture> {
        Box::new(CpalCapture {
            buffer: Arc::new(StdMutex::new(vec![100; 1200])),
            fault: Arc::new(StdMutex::new(fault)),
            running: Arc::new(AtomicBool::new(true)),
            device_rate: 12_000,
            target_rate: 12_000,
            started: Instant::now(),
            thread: None,
        })
    }

    #[test]
    fn first_stream_error_is_kept() {
        let fault: StreamFault = Arc::new(StdMutex::new(None));
        record_fault(&fault, cpal::StreamError::DeviceNotAvailable);
        record_fault(
            &fault,
            cpal::StreamError::BackendSpecific {
                err: cpal::BackendSpecificError {
                    description: "xrun".into(),
                },
            },
        );

        let kept = fault.lock().unwrap().clone().unwrap();
        assert_eq!(kept.kind(), "device_unavailable");
    }

    #[test]
    fn backend_stream_error_is_io_failure() {
        let fault: StreamFault = Arc::new(StdMutex::new(None));
        record_fault(
            &fault,
            cpal::StreamError::BackendSpecific {
                err: cpal::BackendSpecificError {
                    description: "xrun".into(),
                },
            },
        );
        assert_eq!(fault.lock().unwrap().as_ref().map(|e| e.kind()), Some("io_failure"));
    }

    #[tokio::test]
    async fn finish_fails_after_stream_error() {
        let capture = capture_with_fault(Some(CaptureError::DeviceUnavailable("unplugged".into())));
        let err = capture.finish().await.unwrap_err();
        assert_eq!(err.kind(), "device_unavailable");
    }

    #[tokio::test]
    async fn finish_returns_samples_without_stream_error() {
        let samples = capture_with_fault(None).finish().await.unwrap();
        assert!(!samples.is_empty());
    }

    #[test]
    fn microphone_constructs() {
        let _ = CpalMicrophone::new();
    }
}
