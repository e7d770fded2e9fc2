//! Generation and save options.

use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;

use misophonia_backend_audio::PrepareOptions;
use misophonia_spec::TrackOptions;
use serde::{Deserialize, Serialize};

use crate::error::{DatasetError, DatasetResult};

/// What to do when a trigger or control pool is empty but the ratio asks for it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Draw from the other foreground pool instead.
    #[default]
    UseOtherPool,
    /// Fail before any work starts.
    Error,
}

/// Parameters for generating one split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateOptions {
    /// Number of items to generate.
    pub num_samples: usize,
    /// Inclusive `(min, max)` foreground count per item.
    pub foregrounds_per_item: (usize, usize),
    /// Inclusive `(min, max)` background count per item.
    pub backgrounds_per_item: (usize, usize),
    /// Probability that an item is a trigger item.
    pub trig_to_control_ratio: f64,
    /// Master seed for the sampling plan.
    pub random_seed: u32,
    /// Behavior when a required foreground pool is empty.
    pub fallback: FallbackPolicy,
    /// Pinned render parameters for foreground tracks.
    pub foreground_track_options: TrackOptions,
    /// Pinned render parameters for background tracks.
    pub background_track_options: TrackOptions,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            num_samples: 1,
            foregrounds_per_item: (1, 1),
            backgrounds_per_item: (1, 3),
            trig_to_control_ratio: 0.5,
            random_seed: 42,
            fallback: FallbackPolicy::default(),
            foreground_track_options: TrackOptions::default(),
            background_track_options: TrackOptions::default(),
        }
    }
}

impl GenerateOptions {
    /// Creates options for `num_samples` items with default ranges.
    pub fn new(num_samples: usize) -> Self {
        Self {
            num_samples,
            ..Self::default()
        }
    }

    /// Sets the foreground count range.
    pub fn with_foregrounds(mut self, min: usize, max: usize) -> Self {
        self.foregrounds_per_item = (min, max);
        self
    }

    /// Sets the background count range.
    pub fn with_backgrounds(mut self, min: usize, max: usize) -> Self {
        self.backgrounds_per_item = (min, max);
        self
    }

    /// Sets the trigger probability.
    pub fn with_ratio(mut self, ratio: f64) -> Self {
        self.trig_to_control_ratio = ratio;
        self
    }

    /// Sets the master seed.
    pub fn with_seed(mut self, seed: u32) -> Self {
        self.random_seed = seed;
        self
    }

    /// Sets the empty-pool fallback policy.
    pub fn with_fallback(mut self, fallback: FallbackPolicy) -> Self {
        self.fallback = fallback;
        self
    }

    /// Checks ranges and the ratio.
    pub fn validate(&self) -> DatasetResult<()> {
        check_range("foregrounds_per_item", self.foregrounds_per_item)?;
        check_range("backgrounds_per_item", self.backgrounds_per_item)?;
        let ratio = self.trig_to_control_ratio;
        if !(0.0..=1.0).contains(&ratio) {
            return Err(DatasetError::invalid_options(format!(
                "trig_to_control_ratio must be in [0, 1], got {}",
                ratio
            )));
        }
        Ok(())
    }

    /// Track overrides in the form the track preparer takes.
    pub fn prepare_options(&self) -> PrepareOptions {
        PrepareOptions {
            foreground: self.foreground_track_options,
            background: self.background_track_options,
        }
    }
}

fn check_range(name: &str, (min, max): (usize, usize)) -> DatasetResult<()> {
    if min == 0 {
        return Err(DatasetError::invalid_options(format!(
            "{} minimum must be at least 1",
            name
        )));
    }
    if min > max {
        return Err(DatasetError::invalid_options(format!(
            "{} minimum {} exceeds maximum {}",
            name, min, max
        )));
    }
    Ok(())
}

/// Policy for saving into an existing split directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IfExists {
    /// Refuse to write.
    #[default]
    Error,
    /// Delete the directory first.
    Replace,
    /// Add items to the existing directory.
    Append,
}

impl IfExists {
    /// Returns the policy as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            IfExists::Error => "error",
            IfExists::Replace => "replace",
            IfExists::Append => "append",
        }
    }
}

impl fmt::Display for IfExists {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IfExists {
    type Err = DatasetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(IfExists::Error),
            "replace" => Ok(IfExists::Replace),
            "append" => Ok(IfExists::Append),
            other => Err(DatasetError::invalid_options(format!(
                "unknown if_exists policy '{}'",
                other
            ))),
        }
    }
}

/// Options for the save path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveOptions {
    /// Worker threads; `None` uses the available parallelism.
    pub workers: Option<usize>,
    /// Show a progress bar on stderr.
    pub show_progress: bool,
}

impl SaveOptions {
    /// Number of worker threads to start.
    pub fn resolved_workers(&self) -> usize {
        match self.workers {
            Some(n) if n > 0 => n,
            _ => std::thread::available_parallelism().map_or(1, NonZeroUsize::get),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = GenerateOptions::default();
        assert_eq!(options.num_samples, 1);
        assert_eq!(options.foregrounds_per_item, (1, 1));
        assert_eq!(options.backgrounds_per_item, (1, 3));
        assert_eq!(options.trig_to_control_ratio, 0.5);
        assert_eq!(options.random_seed, 42);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_ranges() {
        assert!(GenerateOptions::new(1).with_foregrounds(0, 2).validate().is_err());
        assert!(GenerateOptions::new(1).with_backgrounds(3, 2).validate().is_err());
        assert!(GenerateOptions::new(1).with_ratio(1.5).validate().is_err());
        assert!(GenerateOptions::new(1).with_ratio(f64::NAN).validate().is_err());
        assert!(GenerateOptions::new(1).with_ratio(0.0).validate().is_ok());
    }

    #[test]
    fn test_options_from_partial_json() {
        let options: GenerateOptions =
            serde_json::from_str(r#"{"num_samples": 8, "fallback": "error"}"#).unwrap();
        assert_eq!(options.num_samples, 8);
        assert_eq!(options.fallback, FallbackPolicy::Error);
        assert_eq!(options.backgrounds_per_item, (1, 3));
    }

    #[test]
    fn test_if_exists_parsing() {
        assert_eq!("Replace".parse::<IfExists>().unwrap(), IfExists::Replace);
        assert_eq!("append".parse::<IfExists>().unwrap(), IfExists::Append);
        assert!("overwrite".parse::<IfExists>().is_err());
    }

    #[test]
    fn test_resolved_workers() {
        let options = SaveOptions {
            workers: Some(3),
            show_progress: false,
        };
        assert_eq!(options.resolved_workers(), 3);
        assert!(SaveOptions::default().resolved_workers() >= 1);
    }
}
