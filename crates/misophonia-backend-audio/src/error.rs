//! Error types for the audio backend.

use misophonia_spec::{BackendError, SpecError};
use thiserror::Error;

/// Result type for audio operations.
pub type AudioResult<T> = Result<T, AudioError>;

/// Errors that can occur while loading, preparing, or rendering audio.
#[derive(Debug, Error)]
pub enum AudioError {
    /// Invalid sample rate.
    #[error("invalid sample rate: {rate}")]
    InvalidSampleRate {
        /// The invalid sample rate.
        rate: u32,
    },

    /// Audio file could not be decoded.
    #[error("failed to decode '{path}': {message}")]
    Decode {
        /// File that failed.
        path: String,
        /// Decoder message.
        message: String,
    },

    /// Resampling failed.
    #[error("resampling failed: {message}")]
    Resample {
        /// Error message.
        message: String,
    },

    /// A mix needs at least one foreground and one background.
    #[error("cannot prepare a mix without {kind} tracks")]
    EmptyTrackSet {
        /// "foreground" or "background".
        kind: &'static str,
    },

    /// Tracks handed to a renderer differ in length.
    #[error("track '{name}' has {found} samples, expected {expected}")]
    TrackLengthMismatch {
        /// Track name.
        name: String,
        /// Expected length.
        expected: usize,
        /// Actual length.
        found: usize,
    },

    /// Renderer returned audio that breaks its contract.
    #[error("renderer contract violation: {message}")]
    RendererContract {
        /// Error message.
        message: String,
    },

    /// Invalid parameter value.
    #[error("invalid parameter '{name}': {message}")]
    InvalidParameter {
        /// Parameter name.
        name: String,
        /// Error message.
        message: String,
    },

    /// Model construction failed.
    #[error(transparent)]
    Spec(#[from] SpecError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AudioError {
    /// Creates an invalid parameter error.
    pub fn invalid_param(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Creates a decode error.
    pub fn decode(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a renderer contract error.
    pub fn contract(message: impl Into<String>) -> Self {
        Self::RendererContract {
            message: message.into(),
        }
    }
}

impl BackendError for AudioError {
    fn code(&self) -> &'static str {
        match self {
            AudioError::InvalidSampleRate { .. } => "AUDIO_001",
            AudioError::Decode { .. } => "AUDIO_002",
            AudioError::Resample { .. } => "AUDIO_003",
            AudioError::EmptyTrackSet { .. } => "AUDIO_004",
            AudioError::TrackLengthMismatch { .. } => "AUDIO_005",
            AudioError::RendererContract { .. } => "AUDIO_006",
            AudioError::InvalidParameter { .. } => "AUDIO_007",
            AudioError::Spec(_) => "AUDIO_008",
            AudioError::Io(_) => "AUDIO_009",
        }
    }

    fn category(&self) -> &'static str {
        "audio"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_param_helper() {
        let err = AudioError::invalid_param("reverb", "must be between 0 and 1");
        assert!(err.to_string().contains("reverb"));
        assert!(err.to_string().contains("between 0 and 1"));
        assert_eq!(err.code(), "AUDIO_007");
    }

    #[test]
    fn test_contract_helper() {
        let err = AudioError::contract("shape (2, 10) != (2, 11)");
        assert!(err.to_string().contains("renderer contract violation"));
        assert_eq!(err.category(), "audio");
    }
}
