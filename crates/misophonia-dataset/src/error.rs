//! Error types for dataset generation and persistence.

use std::path::PathBuf;

use misophonia_backend_audio::AudioError;
use misophonia_spec::{BackendError, Split, SpecError};
use thiserror::Error;

/// Result type for dataset operations.
pub type DatasetResult<T> = Result<T, DatasetError>;

/// Errors that can occur while sampling, generating, saving, or loading a dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// A pool the generation parameters require has no items.
    #[error("the {pool} pool is empty and no fallback is allowed")]
    EmptyPool {
        /// "trigger", "control", or "background".
        pool: &'static str,
    },

    /// Generation options are out of range.
    #[error("invalid generation options: {message}")]
    InvalidOptions {
        /// Error message.
        message: String,
    },

    /// The target split directory exists and the policy forbids writing into it.
    #[error("directory '{}' already exists", path.display())]
    DirectoryExists {
        /// Existing directory.
        path: PathBuf,
    },

    /// A split has no persisted items.
    #[error("no data available for split '{split}' in '{}'", path.display())]
    NoData {
        /// Requested split.
        split: Split,
        /// Split directory.
        path: PathBuf,
    },

    /// Not enough control items to pair with the selected triggers.
    #[error("need {needed} control items for pairing, found {available}")]
    InsufficientControls {
        /// Controls required.
        needed: usize,
        /// Eligible controls available.
        available: usize,
    },

    /// A metadata line could not be parsed or failed validation.
    #[error("{}:{line}: {message}", path.display())]
    MetadataParse {
        /// Metadata file.
        path: PathBuf,
        /// 1-based line number.
        line: usize,
        /// Error message.
        message: String,
    },

    /// A metadata line references an audio file that does not exist.
    #[error("{}:{line}: audio file '{}' does not exist", path.display(), audio.display())]
    MissingAudioFile {
        /// Metadata file.
        path: PathBuf,
        /// 1-based line number.
        line: usize,
        /// Missing audio file.
        audio: PathBuf,
    },

    /// A source dataset is not available locally.
    #[error("source dataset '{name}' is unavailable: {message}")]
    SourceUnavailable {
        /// Source name.
        name: String,
        /// Error message.
        message: String,
    },

    /// A source dataset name is not configured.
    #[error("unknown source dataset '{name}'")]
    UnknownSource {
        /// Requested name.
        name: String,
    },

    /// Generation was requested before source metadata was loaded.
    #[error("source data has not been prepared")]
    NotPrepared,

    /// Index outside a split view.
    #[error("index {index} out of range for a split of {len} items")]
    IndexOutOfRange {
        /// Requested index.
        index: isize,
        /// Number of items.
        len: usize,
    },

    /// Experimental pairs were requested outside the test split.
    #[error("experimental pairs are only derived from the test split, not '{split}'")]
    PairingSplit {
        /// Requested split.
        split: Split,
    },

    /// Two flattened fields map to the same column.
    #[error("key collision when flattening: '{key}'")]
    KeyCollision {
        /// Colliding column name.
        key: String,
    },

    /// The worker pool could not be started.
    #[error("failed to start worker pool: {message}")]
    WorkerPool {
        /// Error message.
        message: String,
    },

    /// Model construction or validation failed.
    #[error(transparent)]
    Spec(#[from] SpecError),

    /// Audio preparation or rendering failed.
    #[error(transparent)]
    Audio(#[from] AudioError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DatasetError {
    /// Creates an invalid options error.
    pub fn invalid_options(message: impl Into<String>) -> Self {
        Self::InvalidOptions {
            message: message.into(),
        }
    }

    /// Creates a source unavailable error.
    pub fn unavailable(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SourceUnavailable {
            name: name.into(),
            message: message.into(),
        }
    }
}

impl BackendError for DatasetError {
    fn code(&self) -> &'static str {
        match self {
            DatasetError::EmptyPool { .. } => "DATASET_001",
            DatasetError::InvalidOptions { .. } => "DATASET_002",
            DatasetError::DirectoryExists { .. } => "DATASET_003",
            DatasetError::NoData { .. } => "DATASET_004",
            DatasetError::InsufficientControls { .. } => "DATASET_005",
            DatasetError::MetadataParse { .. } => "DATASET_006",
            DatasetError::MissingAudioFile { .. } => "DATASET_007",
            DatasetError::SourceUnavailable { .. } => "DATASET_008",
            DatasetError::UnknownSource { .. } => "DATASET_009",
            DatasetError::NotPrepared => "DATASET_010",
            DatasetError::IndexOutOfRange { .. } => "DATASET_011",
            DatasetError::KeyCollision { .. } => "DATASET_012",
            DatasetError::WorkerPool { .. } => "DATASET_013",
            DatasetError::Spec(_) => "DATASET_014",
            DatasetError::Audio(e) => e.code(),
            DatasetError::Io(_) => "DATASET_015",
            DatasetError::Json(_) => "DATASET_016",
            DatasetError::PairingSplit { .. } => "DATASET_017",
        }
    }

    fn category(&self) -> &'static str {
        match self {
            DatasetError::Audio(e) => e.category(),
            _ => "dataset",
        }
    }
}
