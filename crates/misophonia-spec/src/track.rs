//! Source tracks: a source item placed into one specific mix.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{SpecError, ValidationResult};
use crate::source::SourceDataItem;
use crate::validation::validate_track;

/// Azimuth and elevation are drawn from this inclusive range (degrees).
pub const ANGLE_RANGE: (i32, i32) = (-180, 180);

/// Default level range before rounding.
pub const LEVEL_RANGE: (f64, f64) = (0.4, 1.0);

/// Default reverb range before rounding.
pub const REVERB_RANGE: (f64, f64) = (0.0, 1.0);

/// Optional overrides for a track's render parameters.
///
/// Any field left as `None` is drawn from the mix generator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackOptions {
    /// Fixed azimuth in degrees.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azimuth: Option<f64>,
    /// Fixed elevation in degrees.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation: Option<f64>,
    /// Fixed gain multiplier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<f64>,
    /// Fixed reverb amount.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reverb: Option<f64>,
}

/// A source item placed in a mix window with its render parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceTrack {
    /// The placed source item.
    pub source_item: SourceDataItem,
    /// First sample of the item inside the mix window.
    pub start: usize,
    /// One past the last sample of the item inside the mix window.
    pub end: usize,
    /// Horizontal angle in degrees.
    pub azimuth: f64,
    /// Vertical angle in degrees.
    pub elevation: f64,
    /// Post-normalization gain multiplier.
    pub level: f64,
    /// Reverb amount.
    pub reverb: f64,
}

impl SourceTrack {
    /// Places a source item, drawing any render parameter not pinned by `options`.
    ///
    /// Draws happen in the fixed order azimuth, elevation, level, reverb so
    /// that placement and spatialization reproduce together from one generator.
    ///
    /// # Arguments
    /// * `source_item` - The item to place
    /// * `start` - First sample inside the mix window
    /// * `end` - One past the last sample inside the mix window
    /// * `options` - Pinned render parameters
    /// * `rng` - The mix's dedicated generator
    ///
    /// # Returns
    /// The placed track, or a validation error if `end < start`
    pub fn new<R: Rng + ?Sized>(
        source_item: SourceDataItem,
        start: usize,
        end: usize,
        options: &TrackOptions,
        rng: &mut R,
    ) -> Result<Self, SpecError> {
        let azimuth = match options.azimuth {
            Some(value) => value,
            None => draw_angle(rng),
        };
        let elevation = match options.elevation {
            Some(value) => value,
            None => draw_angle(rng),
        };
        let level = match options.level {
            Some(value) => value,
            None => round1(rng.gen_range(LEVEL_RANGE.0..=LEVEL_RANGE.1)),
        };
        let reverb = match options.reverb {
            Some(value) => value,
            None => round1(rng.gen_range(REVERB_RANGE.0..=REVERB_RANGE.1)),
        };

        let track = Self {
            source_item,
            start,
            end,
            azimuth,
            elevation,
            level,
            reverb,
        };
        track.validate().into_result()?;
        Ok(track)
    }

    /// Returns a track with the same render parameters for another item and placement.
    pub fn with_source(
        &self,
        source_item: SourceDataItem,
        start: usize,
        end: usize,
    ) -> Result<Self, SpecError> {
        let track = Self {
            source_item,
            start,
            end,
            ..self.clone()
        };
        track.validate().into_result()?;
        Ok(track)
    }

    /// Number of samples covered by the item.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Returns true if the track covers no samples.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Checks the track's invariants.
    pub fn validate(&self) -> ValidationResult {
        validate_track(self)
    }
}

fn draw_angle<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.gen_range(ANGLE_RANGE.0..=ANGLE_RANGE.1) as f64
}

/// Rounds to one decimal place.
pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{LabelType, Split};
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn item() -> SourceDataItem {
        SourceDataItem::builder(Split::Train, "d", "x.wav", LabelType::Trigger)
            .label("chewing")
            .build()
            .unwrap()
    }

    #[test]
    fn test_defaults_fall_in_ranges() {
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..200 {
            let track =
                SourceTrack::new(item(), 0, 10, &TrackOptions::default(), &mut rng).unwrap();
            assert!((-180.0..=180.0).contains(&track.azimuth));
            assert!((-180.0..=180.0).contains(&track.elevation));
            assert_eq!(track.azimuth.fract(), 0.0);
            assert!((0.4..=1.0).contains(&track.level));
            assert!((0.0..=1.0).contains(&track.reverb));
            assert_eq!(round1(track.level), track.level);
            assert_eq!(round1(track.reverb), track.reverb);
        }
    }

    #[test]
    fn test_same_generator_state_gives_same_track() {
        let mut a = Pcg32::seed_from_u64(99);
        let mut b = Pcg32::seed_from_u64(99);
        let ta = SourceTrack::new(item(), 3, 9, &TrackOptions::default(), &mut a).unwrap();
        let tb = SourceTrack::new(item(), 3, 9, &TrackOptions::default(), &mut b).unwrap();
        assert_eq!(ta, tb);
    }

    #[test]
    fn test_pinned_options_consume_no_draws() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut untouched = rng.clone();
        let options = TrackOptions {
            azimuth: Some(30.0),
            elevation: Some(0.0),
            level: Some(0.5),
            reverb: Some(0.2),
        };
        let track = SourceTrack::new(item(), 0, 4, &options, &mut rng).unwrap();
        assert_eq!(track.azimuth, 30.0);
        assert_eq!(track.reverb, 0.2);
        assert_eq!(rng.gen::<u32>(), untouched.gen::<u32>());
    }

    #[test]
    fn test_rejects_inverted_placement() {
        let mut rng = Pcg32::seed_from_u64(1);
        assert!(SourceTrack::new(item(), 10, 5, &TrackOptions::default(), &mut rng).is_err());
    }

    #[test]
    fn test_with_source_keeps_render_parameters() {
        let mut rng = Pcg32::seed_from_u64(4);
        let track = SourceTrack::new(item(), 2, 6, &TrackOptions::default(), &mut rng).unwrap();
        let other = SourceDataItem::builder(Split::Train, "d", "y.wav", LabelType::Control)
            .label("typing")
            .build()
            .unwrap();
        let moved = track.with_source(other.clone(), 2, 20).unwrap();
        assert_eq!(moved.source_item, other);
        assert_eq!(moved.end, 20);
        assert_eq!(moved.azimuth, track.azimuth);
        assert_eq!(moved.level, track.level);
        assert!(track.with_source(other, 5, 1).is_err());
    }

    #[test]
    fn test_len() {
        let mut rng = Pcg32::seed_from_u64(1);
        let track = SourceTrack::new(item(), 5, 12, &TrackOptions::default(), &mut rng).unwrap();
        assert_eq!(track.len(), 7);
        assert!(!track.is_empty());
    }
}
