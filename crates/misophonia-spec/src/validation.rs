//! Invariant checks for source items, tracks, and generated items.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::{ErrorCode, ValidationError, ValidationResult};
use crate::item::MisophoniaItem;
use crate::source::{LabelType, SourceDataItem};
use crate::track::SourceTrack;

/// Maximum discomfort rating.
pub const MAX_DISCOMFORT_RATING: f64 = 5.0;

/// Pattern every `extra` key must match (in addition to the dataset prefix).
const EXTRA_KEY_PATTERN: &str = r"^[a-z0-9_]+$";

static EXTRA_KEY_REGEX: OnceLock<Regex> = OnceLock::new();

fn extra_key_regex() -> &'static Regex {
    EXTRA_KEY_REGEX.get_or_init(|| Regex::new(EXTRA_KEY_PATTERN).expect("invalid regex pattern"))
}

/// Checks a source item.
///
/// Labels must be non-empty, only triggers may carry `validated_by`, and every
/// `extra` key must be lowercase and start with the dataset prefix.
pub fn validate_source_item(item: &SourceDataItem) -> ValidationResult {
    let mut result = ValidationResult::success();

    if item.source_dataset.trim().is_empty() {
        result.add_error(ValidationError::with_path(
            ErrorCode::EmptyField,
            "source dataset name is empty",
            "source_dataset",
        ));
    }
    if item.file_path.as_os_str().is_empty() {
        result.add_error(ValidationError::with_path(
            ErrorCode::EmptyField,
            "file path is empty",
            "file_path",
        ));
    }

    if item.labels.is_empty() {
        result.add_error(ValidationError::with_path(
            ErrorCode::EmptyLabels,
            "at least one label is required",
            "labels",
        ));
    }
    for (i, label) in item.labels.iter().enumerate() {
        if label.trim().is_empty() {
            result.add_error(ValidationError::with_path(
                ErrorCode::EmptyField,
                "label is empty",
                format!("labels[{}]", i),
            ));
        }
    }

    if item.validated_by.is_some() && item.label_type != LabelType::Trigger {
        result.add_error(ValidationError::with_path(
            ErrorCode::ValidatedNonTrigger,
            format!(
                "validated_by is only allowed on trigger items, found {}",
                item.label_type
            ),
            "validated_by",
        ));
    }

    let prefix = item.extra_key_prefix();
    for key in item.extra.keys() {
        if !key.starts_with(&prefix) || !extra_key_regex().is_match(key) {
            result.add_error(ValidationError::with_path(
                ErrorCode::InvalidExtraKey,
                format!("extra key must match '{}<lowercase name>'", prefix),
                format!("extra[{}]", key),
            ));
        }
    }

    result
}

/// Checks a placed track and its source item.
pub fn validate_track(track: &SourceTrack) -> ValidationResult {
    let mut result = ValidationResult::success();

    if track.end < track.start {
        result.add_error(ValidationError::with_path(
            ErrorCode::InvalidPlacement,
            format!("end ({}) is before start ({})", track.end, track.start),
            "end",
        ));
    }
    result.merge_with_prefix(validate_source_item(&track.source_item), "source_item");

    result
}

/// Checks a generated item.
pub fn validate_item(item: &MisophoniaItem) -> ValidationResult {
    let mut result = ValidationResult::success();

    match (item.is_trigger(), item.ground_truth().is_some()) {
        (false, true) => result.add_error(ValidationError::with_path(
            ErrorCode::GroundTruthWithoutTrigger,
            "control items must not have a ground truth",
            "ground_truth",
        )),
        (true, false) => result.add_error(ValidationError::with_path(
            ErrorCode::TriggerWithoutGroundTruth,
            "trigger items require a ground truth",
            "ground_truth",
        )),
        _ => {}
    }

    let groups = [
        ("foregrounds", item.foregrounds()),
        ("backgrounds", item.backgrounds()),
    ];
    for (name, tracks) in groups {
        for (i, track) in tracks.iter().enumerate() {
            let path = format!("{}[{}]", name, i);
            if track.source_item.split != item.split() {
                result.add_error(ValidationError::with_path(
                    ErrorCode::TrackSplitMismatch,
                    format!(
                        "track split {} differs from item split {}",
                        track.source_item.split,
                        item.split()
                    ),
                    format!("{}.source_item.split", path),
                ));
            }
            result.merge_with_prefix(validate_track(track), &path);
        }
    }

    if let Some(mix) = item.mix().as_waveform() {
        if mix.num_samples() != item.length() {
            result.add_error(ValidationError::with_path(
                ErrorCode::LengthMismatch,
                format!(
                    "length is {} but the mix has {} samples",
                    item.length(),
                    mix.num_samples()
                ),
                "length",
            ));
        }
    }

    if let Some(rating) = item.discomfort_rating() {
        if !(0.0..=MAX_DISCOMFORT_RATING).contains(&rating) {
            result.add_error(ValidationError::with_path(
                ErrorCode::RatingOutOfRange,
                format!("rating must be within [0, 5], got {}", rating),
                "discomfort_rating",
            ));
        }
    }

    result
}
