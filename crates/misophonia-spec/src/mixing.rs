//! Global mixing parameters shared by every track of one mix.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Renderer subject (head) profiles.
pub const SUBJECT_IDS: &[&str] = &[
    "D1", "D2", "H3", "H4", "H5", "H6", "H7", "H8", "H9", "H10", "H11", "H12", "H13", "H14",
    "H15", "H16", "H17", "H18", "H19", "H20",
];

/// Reverb type codes.
pub const REVERB_TYPES: &[&str] = &["1", "2"];

/// Speaker layouts accepted by the renderers.
pub const SPEAKER_LAYOUTS: &[&str] = &["none", "stereo", "5.1", "7.1"];

/// Interpolation modes accepted by the renderers.
pub const INTERPOLATION_MODES: &[&str] = &["auto", "nearest", "linear"];

/// Impulse-response types accepted by the renderers.
pub const IR_TYPES: &[&str] = &["BRIR", "HRIR"];

/// Default sample rate of generated audio.
pub const DEFAULT_SAMPLE_RATE: u32 = 44100;

/// Parameters shared by every track in one mix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GlobalMixingParams {
    /// Renderer subject/profile id.
    pub subject_id: String,
    /// Speaker layout ("none" renders directly at the requested angles).
    pub speaker_layout: String,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Reverb type code.
    pub reverb_type: String,
    /// Interpolation mode for fractional delays.
    pub mode: String,
    /// Impulse-response type.
    pub ir_type: String,
}

impl Default for GlobalMixingParams {
    fn default() -> Self {
        Self {
            subject_id: SUBJECT_IDS[0].to_string(),
            speaker_layout: "none".to_string(),
            sample_rate: DEFAULT_SAMPLE_RATE,
            reverb_type: REVERB_TYPES[0].to_string(),
            mode: "auto".to_string(),
            ir_type: "BRIR".to_string(),
        }
    }
}

impl GlobalMixingParams {
    /// Draws mixing parameters from a mix's generator.
    ///
    /// Consumes exactly two draws: subject id, then reverb type. All other
    /// fields take their defaults.
    pub fn sample<R: Rng + ?Sized>(rng: &mut R) -> Self {
        // Both slices are non-empty constants.
        let subject_id = SUBJECT_IDS.choose(rng).copied().unwrap_or(SUBJECT_IDS[0]);
        let reverb_type = REVERB_TYPES
            .choose(rng)
            .copied()
            .unwrap_or(REVERB_TYPES[0]);
        Self {
            subject_id: subject_id.to_string(),
            reverb_type: reverb_type.to_string(),
            ..Self::default()
        }
    }

    /// Returns a copy with a different sample rate.
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }
}
