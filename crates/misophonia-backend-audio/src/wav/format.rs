//! WAV file format parameters.

use crate::error::{AudioError, AudioResult};

/// Bit depth of persisted dataset audio.
pub const DEFAULT_BITS_PER_SAMPLE: u16 = 24;

/// WAV file format parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavFormat {
    /// Number of channels.
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Bits per sample (16 or 24).
    pub bits_per_sample: u16,
}

impl WavFormat {
    /// Creates a format, rejecting unsupported parameters.
    pub fn new(channels: u16, sample_rate: u32, bits_per_sample: u16) -> AudioResult<Self> {
        if channels == 0 {
            return Err(AudioError::invalid_param("channels", "must be at least 1"));
        }
        if sample_rate == 0 {
            return Err(AudioError::InvalidSampleRate { rate: sample_rate });
        }
        if bits_per_sample != 16 && bits_per_sample != 24 {
            return Err(AudioError::invalid_param(
                "bits_per_sample",
                format!("must be 16 or 24, got {}", bits_per_sample),
            ));
        }
        Ok(Self {
            channels,
            sample_rate,
            bits_per_sample,
        })
    }

    /// Creates a 24-bit stereo format.
    pub fn stereo(sample_rate: u32) -> Self {
        Self {
            channels: 2,
            sample_rate,
            bits_per_sample: DEFAULT_BITS_PER_SAMPLE,
        }
    }

    /// Bytes per sample (per channel).
    pub(crate) fn bytes_per_sample(&self) -> u16 {
        self.bits_per_sample / 8
    }

    /// Block align (bytes per sample frame).
    pub(crate) fn block_align(&self) -> u16 {
        self.channels * self.bytes_per_sample()
    }

    /// Byte rate (bytes per second).
    pub(crate) fn byte_rate(&self) -> u32 {
        self.sample_rate * self.block_align() as u32
    }
}
