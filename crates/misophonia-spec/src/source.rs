//! Source item model: one physical audio file from a source collection.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{SpecError, ValidationResult};
use crate::validation::validate_source_item;

/// Dataset split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Split {
    /// Training split.
    Train,
    /// Validation split.
    #[serde(alias = "valid", alias = "validation")]
    Val,
    /// Test split.
    Test,
}

impl Split {
    /// Returns the split as a string (also its directory name on disk).
    pub fn as_str(&self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Val => "val",
            Split::Test => "test",
        }
    }

    /// Returns all splits.
    pub fn all() -> &'static [Split] {
        &[Split::Train, Split::Val, Split::Test]
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Split {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "train" => Ok(Split::Train),
            "val" | "valid" | "validation" => Ok(Split::Val),
            "test" => Ok(Split::Test),
            _ => Err(SpecError::UnknownValue {
                kind: "split",
                value: s.to_string(),
            }),
        }
    }
}

/// Role of a source sound in a mix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelType {
    /// Non-trigger foreground sound.
    Control,
    /// Misophonia trigger sound.
    Trigger,
    /// Ambient background sound.
    Background,
}

impl LabelType {
    /// Returns the label type as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            LabelType::Control => "control",
            LabelType::Trigger => "trigger",
            LabelType::Background => "background",
        }
    }

    /// Returns true for the two foreground label types.
    pub fn is_foreground(&self) -> bool {
        matches!(self, LabelType::Control | LabelType::Trigger)
    }
}

impl fmt::Display for LabelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LabelType {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "control" => Ok(LabelType::Control),
            "trigger" => Ok(LabelType::Trigger),
            "background" => Ok(LabelType::Background),
            _ => Err(SpecError::UnknownValue {
                kind: "label type",
                value: s.to_string(),
            }),
        }
    }
}

/// A license record attached to a sound, a dataset, or the mixing process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct License {
    /// URL of the license text.
    pub license_url: String,
    /// Name to attribute.
    pub attribution_name: String,
    /// URL of the attributed work or author.
    pub attribution_url: String,
}

impl License {
    /// Creates a license record.
    pub fn new(
        license_url: impl Into<String>,
        attribution_name: impl Into<String>,
        attribution_url: impl Into<String>,
    ) -> Self {
        Self {
            license_url: license_url.into(),
            attribution_name: attribution_name.into(),
            attribution_url: attribution_url.into(),
        }
    }

    /// Placeholder used when a sound's license cannot be found.
    pub fn unknown() -> Self {
        Self::new("N/A", "Unknown Author", "")
    }
}

/// One audio file from a source dataset, with its label type and provenance.
///
/// Items are produced by source adapters and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceDataItem {
    /// Split assigned by the source adapter.
    pub split: Split,
    /// Name of the source dataset (e.g. "FSD50K").
    pub source_dataset: String,
    /// Path to the audio file.
    pub file_path: PathBuf,
    /// Freesound id, when the sound comes from freesound.org.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub freesound_id: Option<u64>,
    /// Role of the sound.
    pub label_type: LabelType,
    /// Category labels, in order of relevance.
    pub labels: Vec<String>,
    /// Studies that confirmed the sound as a trigger.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validated_by: Option<Vec<String>>,
    /// License of the individual sound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sound_license: Option<License>,
    /// License of the dataset the sound was taken from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset_license: Option<License>,
    /// Dataset-specific columns, keyed `{dataset}_{column}`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl SourceDataItem {
    /// Creates a new builder for a source item.
    pub fn builder(
        split: Split,
        source_dataset: impl Into<String>,
        file_path: impl Into<PathBuf>,
        label_type: LabelType,
    ) -> SourceDataItemBuilder {
        SourceDataItemBuilder::new(split, source_dataset, file_path, label_type)
    }

    /// Parses and validates a source item from JSON.
    pub fn from_json(json: &str) -> Result<Self, SpecError> {
        let item: SourceDataItem = serde_json::from_str(json)?;
        item.validate().into_result()?;
        Ok(item)
    }

    /// Checks the item's invariants.
    pub fn validate(&self) -> ValidationResult {
        validate_source_item(self)
    }

    /// Returns true if at least one study validated this trigger.
    pub fn is_validated(&self) -> bool {
        self.validated_by.as_ref().is_some_and(|v| !v.is_empty())
    }

    /// Returns the file name without extension, used as the track name.
    pub fn stem(&self) -> String {
        self.file_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Returns a copy with `file_path` resolved against `base` if it is relative.
    pub fn resolved_against(&self, base: &Path) -> Self {
        let mut item = self.clone();
        if item.file_path.is_relative() {
            item.file_path = base.join(&item.file_path);
        }
        item
    }

    /// Prefix required on every `extra` key for this item's dataset.
    pub fn extra_key_prefix(&self) -> String {
        extra_key_prefix(&self.source_dataset)
    }
}

/// Returns the `extra` key prefix for a dataset name ("FSD50K" -> "fsd50k_").
pub fn extra_key_prefix(source_dataset: &str) -> String {
    let mut prefix: String = source_dataset
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    prefix.push('_');
    prefix
}

/// Builder for [`SourceDataItem`].
#[derive(Debug)]
pub struct SourceDataItemBuilder {
    item: SourceDataItem,
}

impl SourceDataItemBuilder {
    fn new(
        split: Split,
        source_dataset: impl Into<String>,
        file_path: impl Into<PathBuf>,
        label_type: LabelType,
    ) -> Self {
        Self {
            item: SourceDataItem {
                split,
                source_dataset: source_dataset.into(),
                file_path: file_path.into(),
                freesound_id: None,
                label_type,
                labels: Vec::new(),
                validated_by: None,
                sound_license: None,
                dataset_license: None,
                extra: BTreeMap::new(),
            },
        }
    }

    /// Adds a category label.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.item.labels.push(label.into());
        self
    }

    /// Adds several category labels.
    pub fn labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.item.labels.extend(labels.into_iter().map(Into::into));
        self
    }

    /// Sets the freesound id.
    pub fn freesound_id(mut self, id: u64) -> Self {
        self.item.freesound_id = Some(id);
        self
    }

    /// Marks the sound as validated by a study.
    pub fn validated_by(mut self, study: impl Into<String>) -> Self {
        self.item
            .validated_by
            .get_or_insert_with(Vec::new)
            .push(study.into());
        self
    }

    /// Sets the sound-level license.
    pub fn sound_license(mut self, license: License) -> Self {
        self.item.sound_license = Some(license);
        self
    }

    /// Sets the dataset-level license.
    pub fn dataset_license(mut self, license: License) -> Self {
        self.item.dataset_license = Some(license);
        self
    }

    /// Adds a dataset-specific column. The key must carry the dataset prefix.
    pub fn extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.item.extra.insert(key.into(), value);
        self
    }

    /// Validates and builds the item.
    pub fn build(self) -> Result<SourceDataItem, SpecError> {
        self.item.validate().into_result()?;
        Ok(self.item)
    }
}
