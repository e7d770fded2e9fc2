//! Error types for item validation and model construction.

use thiserror::Error;

/// Error codes for model invariant violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Item invariants (E001-E004)
    /// E001: Ground truth present on a non-trigger item
    GroundTruthWithoutTrigger,
    /// E002: Trigger item without a ground truth
    TriggerWithoutGroundTruth,
    /// E003: A constituent track comes from a different split
    TrackSplitMismatch,
    /// E004: Declared length differs from the mix waveform
    LengthMismatch,

    // Source item invariants (E005-E007)
    /// E005: Source item has no labels
    EmptyLabels,
    /// E006: `validated_by` set on a non-trigger source item
    ValidatedNonTrigger,
    /// E007: Extra metadata key is not prefixed with the dataset name
    InvalidExtraKey,

    // Value ranges (E008-E010)
    /// E008: Discomfort rating outside [0, 5]
    RatingOutOfRange,
    /// E009: Track placement has `end < start`
    InvalidPlacement,
    /// E010: Required text field is empty
    EmptyField,
}

impl ErrorCode {
    /// Returns the error code string (e.g., "E001").
    pub fn code(&self) -> &'static str {
        match self {
            ErrorCode::GroundTruthWithoutTrigger => "E001",
            ErrorCode::TriggerWithoutGroundTruth => "E002",
            ErrorCode::TrackSplitMismatch => "E003",
            ErrorCode::LengthMismatch => "E004",
            ErrorCode::EmptyLabels => "E005",
            ErrorCode::ValidatedNonTrigger => "E006",
            ErrorCode::InvalidExtraKey => "E007",
            ErrorCode::RatingOutOfRange => "E008",
            ErrorCode::InvalidPlacement => "E009",
            ErrorCode::EmptyField => "E010",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A validation error with code, message, and optional field path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The error code.
    pub code: ErrorCode,
    /// Human-readable error message.
    pub message: String,
    /// Path to the problematic field (e.g., "foregrounds\[0\].source_item.split").
    pub path: Option<String>,
}

impl ValidationError {
    /// Creates a new validation error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            path: None,
        }
    }

    /// Creates a new validation error with a field path.
    pub fn with_path(code: ErrorCode, message: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            path: Some(path.into()),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(ref path) = self.path {
            write!(f, "{}: {} (at {})", self.code, self.message, path)
        } else {
            write!(f, "{}: {}", self.code, self.message)
        }
    }
}

impl std::error::Error for ValidationError {}

/// Top-level error type for model operations.
#[derive(Debug, Error)]
pub enum SpecError {
    /// Validation failed with one or more errors.
    #[error("validation failed: {}", join_errors(.0))]
    ValidationFailed(Vec<ValidationError>),

    /// Channels of a waveform have different lengths.
    #[error("ragged waveform: channel {channel} has {found} samples, expected {expected}")]
    RaggedWaveform {
        /// Offending channel index.
        channel: usize,
        /// Length of channel 0.
        expected: usize,
        /// Length of the offending channel.
        found: usize,
    },

    /// Audio was expected in a specific representation.
    #[error("audio field '{field}' is not stored as {expected}")]
    AudioRepresentation {
        /// Field name (`mix` or `ground_truth`).
        field: &'static str,
        /// Expected representation.
        expected: &'static str,
    },

    /// Unknown enumerated value.
    #[error("unknown {kind}: '{value}'")]
    UnknownValue {
        /// What was being parsed.
        kind: &'static str,
        /// The rejected input.
        value: String,
    },

    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result of model validation.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    /// List of validation errors.
    pub errors: Vec<ValidationError>,
}

impl ValidationResult {
    /// Creates a successful validation result.
    pub fn success() -> Self {
        Self { errors: Vec::new() }
    }

    /// Adds an error to the result.
    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Appends all errors of another result, prefixing their paths.
    pub fn merge_with_prefix(&mut self, other: ValidationResult, prefix: &str) {
        for mut error in other.errors {
            error.path = Some(match error.path {
                Some(path) => format!("{}.{}", prefix, path),
                None => prefix.to_string(),
            });
            self.errors.push(error);
        }
    }

    /// Returns true if there are no errors.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Converts to a Result, returning `SpecError::ValidationFailed` if there are errors.
    pub fn into_result(self) -> Result<(), SpecError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(SpecError::ValidationFailed(self.errors))
        }
    }
}

/// Common trait for pipeline errors.
///
/// Each crate's error type implements this trait so the CLI can report a
/// stable code and category regardless of where the failure happened.
///
/// # Example
///
/// ```ignore
/// use misophonia_spec::BackendError;
///
/// fn report<E: BackendError>(err: E) {
///     eprintln!("[{}] {}", err.code(), err.message());
/// }
/// ```
pub trait BackendError: std::error::Error {
    /// Get the error code for reporting (e.g. "AUDIO_001", "DATASET_003").
    fn code(&self) -> &'static str;

    /// Get a human-readable message describing the error.
    fn message(&self) -> String {
        self.to_string()
    }

    /// Get the error category (e.g. "audio", "dataset").
    fn category(&self) -> &'static str;
}
