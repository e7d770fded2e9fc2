//! Generated dataset items and their persisted record form.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::audio::{AudioData, Waveform};
use crate::error::{SpecError, ValidationResult};
use crate::mixing::GlobalMixingParams;
use crate::source::{License, Split};
use crate::track::SourceTrack;
use crate::validation::validate_item;

/// Licenses covering every mix: the mixing process and the HRTF database.
pub fn default_mix_licensing() -> Vec<License> {
    vec![
        License::new(
            "https://creativecommons.org/licenses/by/4.0/",
            "Misophonia Dataset mixing process",
            "",
        ),
        License::new(
            "https://www.apache.org/licenses/LICENSE-2.0",
            "SADIE II Database, University of York",
            "https://www.york.ac.uk/sadie-project/database.html",
        ),
    ]
}

/// One generated dataset item.
///
/// Constructed only through [`MisophoniaItemBuilder`], which enforces:
/// ground truth is present iff the item is a trigger, every track shares the
/// item's split, and `length` matches the in-memory mix.
#[derive(Debug, Clone, PartialEq)]
pub struct MisophoniaItem {
    split: Split,
    uuid: Option<Uuid>,
    is_trigger: bool,
    foreground_categories: Vec<String>,
    background_categories: Vec<String>,
    mix: AudioData,
    ground_truth: Option<AudioData>,
    length: usize,
    foregrounds: Vec<SourceTrack>,
    backgrounds: Vec<SourceTrack>,
    global_mixing_params: GlobalMixingParams,
    mix_licensing: Vec<License>,
    paired_uuid: Option<Uuid>,
    discomfort_rating: Option<f64>,
}

impl MisophoniaItem {
    /// Starts building an item around its mix.
    pub fn builder(
        split: Split,
        mix: impl Into<AudioData>,
        global_mixing_params: GlobalMixingParams,
    ) -> MisophoniaItemBuilder {
        MisophoniaItemBuilder::new(split, mix.into(), global_mixing_params)
    }

    /// Split the item belongs to.
    pub fn split(&self) -> Split {
        self.split
    }

    /// Unique id, assigned when the item is persisted.
    pub fn uuid(&self) -> Option<Uuid> {
        self.uuid
    }

    /// Whether the foregrounds are trigger sounds.
    pub fn is_trigger(&self) -> bool {
        self.is_trigger
    }

    /// Union of the foreground tracks' labels.
    pub fn foreground_categories(&self) -> &[String] {
        &self.foreground_categories
    }

    /// Union of the background tracks' labels.
    pub fn background_categories(&self) -> &[String] {
        &self.background_categories
    }

    /// The rendered mix.
    pub fn mix(&self) -> &AudioData {
        &self.mix
    }

    /// The foreground-only render; present only for trigger items.
    pub fn ground_truth(&self) -> Option<&AudioData> {
        self.ground_truth.as_ref()
    }

    /// Number of samples per channel.
    pub fn length(&self) -> usize {
        self.length
    }

    /// Foreground tracks.
    pub fn foregrounds(&self) -> &[SourceTrack] {
        &self.foregrounds
    }

    /// Background tracks.
    pub fn backgrounds(&self) -> &[SourceTrack] {
        &self.backgrounds
    }

    /// Parameters shared by all tracks.
    pub fn global_mixing_params(&self) -> &GlobalMixingParams {
        &self.global_mixing_params
    }

    /// Licenses of the mixing process.
    pub fn mix_licensing(&self) -> &[License] {
        &self.mix_licensing
    }

    /// Id of the trigger item this control item was derived from.
    pub fn paired_uuid(&self) -> Option<Uuid> {
        self.paired_uuid
    }

    /// Human discomfort rating in [0, 5].
    pub fn discomfort_rating(&self) -> Option<f64> {
        self.discomfort_rating
    }

    /// Returns a copy with the given uuid.
    pub fn with_uuid(&self, uuid: Uuid) -> Self {
        Self {
            uuid: Some(uuid),
            ..self.clone()
        }
    }

    /// Returns a copy whose audio fields point at files.
    ///
    /// `length` is kept, so a copy of an in-memory item stays consistent.
    pub fn with_audio_paths(
        &self,
        mix: PathBuf,
        ground_truth: Option<PathBuf>,
    ) -> Result<Self, SpecError> {
        let item = Self {
            mix: AudioData::Path(mix),
            ground_truth: ground_truth.map(AudioData::Path),
            ..self.clone()
        };
        item.validate().into_result()?;
        Ok(item)
    }

    /// Checks every invariant of the item.
    pub fn validate(&self) -> ValidationResult {
        validate_item(self)
    }

    /// Converts the item to its persisted form.
    ///
    /// Both audio fields must already be file paths.
    pub fn to_record(&self) -> Result<MisophoniaRecord, SpecError> {
        let mix = self
            .mix
            .as_path()
            .ok_or(SpecError::AudioRepresentation {
                field: "mix",
                expected: "a path",
            })?
            .to_path_buf();
        let ground_truth = match &self.ground_truth {
            Some(audio) => Some(
                audio
                    .as_path()
                    .ok_or(SpecError::AudioRepresentation {
                        field: "ground_truth",
                        expected: "a path",
                    })?
                    .to_path_buf(),
            ),
            None => None,
        };

        Ok(MisophoniaRecord {
            split: self.split,
            uuid: self.uuid,
            is_trigger: self.is_trigger,
            foreground_categories: self.foreground_categories.clone(),
            background_categories: self.background_categories.clone(),
            mix,
            ground_truth,
            length: self.length,
            foregrounds: self.foregrounds.clone(),
            backgrounds: self.backgrounds.clone(),
            global_mixing_params: self.global_mixing_params.clone(),
            mix_licensing: self.mix_licensing.clone(),
            paired_uuid: self.paired_uuid,
            discomfort_rating: self.discomfort_rating,
        })
    }

    /// Re-hydrates a persisted record, resolving relative audio paths against `base_dir`.
    pub fn from_record(record: MisophoniaRecord, base_dir: &Path) -> Result<Self, SpecError> {
        let resolve = |p: PathBuf| {
            if p.is_relative() {
                base_dir.join(p)
            } else {
                p
            }
        };

        let item = Self {
            split: record.split,
            uuid: record.uuid,
            is_trigger: record.is_trigger,
            foreground_categories: record.foreground_categories,
            background_categories: record.background_categories,
            mix: AudioData::Path(resolve(record.mix)),
            ground_truth: record.ground_truth.map(|p| AudioData::Path(resolve(p))),
            length: record.length,
            foregrounds: record.foregrounds,
            backgrounds: record.backgrounds,
            global_mixing_params: record.global_mixing_params,
            mix_licensing: record.mix_licensing,
            paired_uuid: record.paired_uuid,
            discomfort_rating: record.discomfort_rating,
        };
        item.validate().into_result()?;
        Ok(item)
    }
}

/// The on-disk form of a [`MisophoniaItem`]: one line of `metadata.jsonl`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MisophoniaRecord {
    /// Split the item belongs to.
    pub split: Split,
    /// Unique id.
    pub uuid: Option<Uuid>,
    /// Whether the foregrounds are trigger sounds.
    pub is_trigger: bool,
    /// Union of foreground labels.
    pub foreground_categories: Vec<String>,
    /// Union of background labels.
    pub background_categories: Vec<String>,
    /// Mix path, relative to the split directory.
    pub mix: PathBuf,
    /// Ground-truth path, relative to the split directory.
    pub ground_truth: Option<PathBuf>,
    /// Samples per channel.
    pub length: usize,
    /// Foreground tracks.
    pub foregrounds: Vec<SourceTrack>,
    /// Background tracks.
    pub backgrounds: Vec<SourceTrack>,
    /// Parameters shared by all tracks.
    pub global_mixing_params: GlobalMixingParams,
    /// Licenses of the mixing process.
    pub mix_licensing: Vec<License>,
    /// Id of the originating trigger item.
    #[serde(default)]
    pub paired_uuid: Option<Uuid>,
    /// Human discomfort rating.
    #[serde(default)]
    pub discomfort_rating: Option<f64>,
}

/// Builder for [`MisophoniaItem`].
#[derive(Debug)]
pub struct MisophoniaItemBuilder {
    split: Split,
    mix: AudioData,
    global_mixing_params: GlobalMixingParams,
    is_trigger: bool,
    ground_truth: Option<AudioData>,
    length: Option<usize>,
    foregrounds: Vec<SourceTrack>,
    backgrounds: Vec<SourceTrack>,
    foreground_categories: Option<Vec<String>>,
    background_categories: Option<Vec<String>>,
    mix_licensing: Option<Vec<License>>,
    uuid: Option<Uuid>,
    paired_uuid: Option<Uuid>,
    discomfort_rating: Option<f64>,
}

impl MisophoniaItemBuilder {
    fn new(split: Split, mix: AudioData, global_mixing_params: GlobalMixingParams) -> Self {
        Self {
            split,
            mix,
            global_mixing_params,
            is_trigger: false,
            ground_truth: None,
            length: None,
            foregrounds: Vec::new(),
            backgrounds: Vec::new(),
            foreground_categories: None,
            background_categories: None,
            mix_licensing: None,
            uuid: None,
            paired_uuid: None,
            discomfort_rating: None,
        }
    }

    /// Marks the item as trigger or control.
    pub fn trigger(mut self, is_trigger: bool) -> Self {
        self.is_trigger = is_trigger;
        self
    }

    /// Sets the foreground-only render.
    pub fn ground_truth(mut self, ground_truth: Option<AudioData>) -> Self {
        self.ground_truth = ground_truth;
        self
    }

    /// Sets the length. Defaults to the in-memory mix's sample count.
    pub fn length(mut self, length: usize) -> Self {
        self.length = Some(length);
        self
    }

    /// Sets the foreground tracks.
    pub fn foregrounds(mut self, tracks: Vec<SourceTrack>) -> Self {
        self.foregrounds = tracks;
        self
    }

    /// Sets the background tracks.
    pub fn backgrounds(mut self, tracks: Vec<SourceTrack>) -> Self {
        self.backgrounds = tracks;
        self
    }

    /// Overrides the derived foreground categories.
    pub fn foreground_categories(mut self, categories: Vec<String>) -> Self {
        self.foreground_categories = Some(categories);
        self
    }

    /// Overrides the derived background categories.
    pub fn background_categories(mut self, categories: Vec<String>) -> Self {
        self.background_categories = Some(categories);
        self
    }

    /// Overrides the default mix licensing.
    pub fn mix_licensing(mut self, licensing: Vec<License>) -> Self {
        self.mix_licensing = Some(licensing);
        self
    }

    /// Sets the uuid.
    pub fn uuid(mut self, uuid: Uuid) -> Self {
        self.uuid = Some(uuid);
        self
    }

    /// Links the item to a trigger item.
    pub fn paired_uuid(mut self, uuid: Option<Uuid>) -> Self {
        self.paired_uuid = uuid;
        self
    }

    /// Sets the discomfort rating.
    pub fn discomfort_rating(mut self, rating: f64) -> Self {
        self.discomfort_rating = Some(rating);
        self
    }

    /// Validates and builds the item.
    pub fn build(self) -> Result<MisophoniaItem, SpecError> {
        let length = self
            .length
            .or_else(|| self.mix.as_waveform().map(Waveform::num_samples))
            .unwrap_or(0);
        let foreground_categories = self
            .foreground_categories
            .unwrap_or_else(|| categories_of(&self.foregrounds));
        let background_categories = self
            .background_categories
            .unwrap_or_else(|| categories_of(&self.backgrounds));

        let item = MisophoniaItem {
            split: self.split,
            uuid: self.uuid,
            is_trigger: self.is_trigger,
            foreground_categories,
            background_categories,
            mix: self.mix,
            ground_truth: self.ground_truth,
            length,
            foregrounds: self.foregrounds,
            backgrounds: self.backgrounds,
            global_mixing_params: self.global_mixing_params,
            mix_licensing: self.mix_licensing.unwrap_or_else(default_mix_licensing),
            paired_uuid: self.paired_uuid,
            discomfort_rating: self.discomfort_rating,
        };
        item.validate().into_result()?;
        Ok(item)
    }
}

/// Sorted union of the labels of a set of tracks.
pub fn categories_of(tracks: &[SourceTrack]) -> Vec<String> {
    tracks
        .iter()
        .flat_map(|t| t.source_item.labels.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests;
