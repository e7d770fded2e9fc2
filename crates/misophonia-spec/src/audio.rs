//! In-memory waveforms and audio references.

use std::path::{Path, PathBuf};

use crate::error::SpecError;

/// A planar multi-channel waveform. All channels have the same length.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Waveform {
    channels: Vec<Vec<f64>>,
}

impl Waveform {
    /// Creates a waveform from per-channel sample buffers.
    pub fn from_channels(channels: Vec<Vec<f64>>) -> Result<Self, SpecError> {
        if let Some(first) = channels.first() {
            let expected = first.len();
            for (channel, samples) in channels.iter().enumerate().skip(1) {
                if samples.len() != expected {
                    return Err(SpecError::RaggedWaveform {
                        channel,
                        expected,
                        found: samples.len(),
                    });
                }
            }
        }
        Ok(Self { channels })
    }

    /// Creates a single-channel waveform.
    pub fn mono(samples: Vec<f64>) -> Self {
        Self {
            channels: vec![samples],
        }
    }

    /// Creates an all-zero waveform.
    pub fn silence(num_channels: usize, num_samples: usize) -> Self {
        Self {
            channels: vec![vec![0.0; num_samples]; num_channels],
        }
    }

    /// Returns `(channels, samples)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.num_channels(), self.num_samples())
    }

    /// Number of channels.
    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    /// Number of samples per channel.
    pub fn num_samples(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    /// Borrows one channel.
    pub fn channel(&self, index: usize) -> Option<&[f64]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    /// Borrows all channels.
    pub fn channels(&self) -> &[Vec<f64>] {
        &self.channels
    }

    /// Consumes the waveform, returning its channels.
    pub fn into_channels(self) -> Vec<Vec<f64>> {
        self.channels
    }

    /// Largest absolute sample value across all channels.
    pub fn peak(&self) -> f64 {
        self.channels
            .iter()
            .flat_map(|c| c.iter())
            .fold(0.0_f64, |acc, s| acc.max(s.abs()))
    }
}

/// Audio stored either in memory or as a file.
#[derive(Debug, Clone, PartialEq)]
pub enum AudioData {
    /// Samples held in memory.
    Waveform(Waveform),
    /// Path to a WAV file.
    Path(PathBuf),
}

impl AudioData {
    /// Returns the in-memory waveform, if any.
    pub fn as_waveform(&self) -> Option<&Waveform> {
        match self {
            AudioData::Waveform(w) => Some(w),
            AudioData::Path(_) => None,
        }
    }

    /// Returns the file path, if any.
    pub fn as_path(&self) -> Option<&Path> {
        match self {
            AudioData::Path(p) => Some(p),
            AudioData::Waveform(_) => None,
        }
    }
}

impl From<Waveform> for AudioData {
    fn from(waveform: Waveform) -> Self {
        AudioData::Waveform(waveform)
    }
}

impl From<PathBuf> for AudioData {
    fn from(path: PathBuf) -> Self {
        AudioData::Path(path)
    }
}
