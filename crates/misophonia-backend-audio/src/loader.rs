//! Loading source audio as mono at a target sample rate.

use std::path::Path;

use hound::{SampleFormat, WavReader};

use crate::error::{AudioError, AudioResult};
use crate::resample::resample_mono;

/// Loads source audio for track preparation.
///
/// Implementations must be safe to share between worker threads.
pub trait AudioLoader: Send + Sync {
    /// Loads `path` as a mono signal at `sample_rate`.
    fn load_mono(&self, path: &Path, sample_rate: u32) -> AudioResult<Vec<f64>>;
}

/// Loads WAV files with `hound`, downmixing and resampling as needed.
#[derive(Debug, Clone, Copy, Default)]
pub struct WavFileLoader;

impl AudioLoader for WavFileLoader {
    fn load_mono(&self, path: &Path, sample_rate: u32) -> AudioResult<Vec<f64>> {
        let (interleaved, channels, file_rate) = read_wav(path)?;
        let mono = downmix(&interleaved, channels);
        resample_mono(&mono, file_rate, sample_rate)
    }
}

/// Reads a WAV file as interleaved samples scaled to [-1.0, 1.0].
///
/// # Returns
/// `(samples, channels, sample_rate)`
pub fn read_wav(path: &Path) -> AudioResult<(Vec<f64>, usize, u32)> {
    let name = path.display().to_string();
    let reader = WavReader::open(path).map_err(|e| AudioError::decode(&name, e.to_string()))?;
    let spec = reader.spec();

    let samples: Vec<f64> = match spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .map(|s| s.map(f64::from))
            .collect::<Result<_, _>>()
            .map_err(|e| AudioError::decode(&name, e.to_string()))?,
        SampleFormat::Int => {
            let scale = (1u64 << (spec.bits_per_sample.saturating_sub(1))) as f64;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f64 / scale))
                .collect::<Result<_, _>>()
                .map_err(|e| AudioError::decode(&name, e.to_string()))?
        }
    };

    Ok((samples, spec.channels.max(1) as usize, spec.sample_rate))
}

/// Averages interleaved channels into one.
pub fn downmix(interleaved: &[f64], channels: usize) -> Vec<f64> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f64>() / channels as f64)
        .collect()
}
