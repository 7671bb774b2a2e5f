//! Sample conversion helpers shared by capture devices

use rubato::{FftFixedIn, Resampler};

use crate::domain::error::CaptureError;

/// Frames handed to the resampler per call
const RESAMPLE_CHUNK: usize = 1024;

/// Average interleaved frames down to one channel
pub fn downmix(samples: &[i16], channels: u16) -> Vec<i16> {
    if channels <= 1 {
        return samples.to_vec();
    }

    samples
        .chunks(channels as usize)
        .map(|frame| {
            let sum: i32 = frame.iter().map(|&s| s as i32).sum();
            (sum / frame.len() as i32) as i16
        })
        .collect()
}

/// Convert normalized f32 samples to i16, clamping out-of-range input
pub fn f32_to_i16(samples: &[f32]) -> Vec<i16> {
    samples
        .iter()
        .map(|&s| (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)
        .collect()
}

/// Resample mono audio between rates
pub fn resample(samples: &[i16], from_rate: u32, to_rate: u32) -> Result<Vec<i16>, CaptureError> {
    if from_rate == to_rate || samples.is_empty() {
        return Ok(samples.to_vec());
    }

    let input: Vec<f32> = samples.iter().map(|&s| s as f32 / 32768.0).collect();
    let expected_len = (input.len() as f64 * to_rate as f64 / from_rate as f64).ceil() as usize;

    let mut resampler = FftFixedIn::<f32>::new(
        from_rate as usize,
        to_rate as usize,
        RESAMPLE_CHUNK,
        2,
        1,
    )
    .map_err(|e| CaptureError::IoFailure(format!("Resampler init failed: {}", e)))?;

    let mut output = Vec::with_capacity(expected_len + RESAMPLE_CHUNK);
    let mut position = 0;
    while position < input.len() {
        let needed = resampler.input_frames_next();
        let end = (position + needed).min(input.len());
        let mut chunk = input[position..end].to_vec();
        // Zero-pad the final partial chunk
        chunk.resize(needed, 0.0);

        let resampled = resampler
            .process(&[chunk], None)
            .map_err(|e| CaptureError::IoFailure(format!("Resampling failed: {}", e)))?;
        output.extend(resampled[0].iter().map(|&s| (s.clamp(-1.0, 1.0) * 32767.0) as i16));
        position = end;
    }

    output.truncate(expected_len);
    Ok(output)
}
