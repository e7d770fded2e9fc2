//! Spatial renderers.
//!
//! A renderer turns a set of equal-length mono tracks, each with azimuth,
//! elevation, level, and reverb, into one multi-channel waveform of the same
//! length. The dataset pipeline only depends on the [`Renderer`] trait; the
//! concrete implementation is picked by [`RendererKind`].

mod binaural;
mod delay_line;
mod room;
mod stereo_pan;


use std::fmt;
use std::str::FromStr;

use misophonia_spec::mixing::{
    INTERPOLATION_MODES, IR_TYPES, REVERB_TYPES, SPEAKER_LAYOUTS, SUBJECT_IDS,
};
use misophonia_spec::{GlobalMixingParams, Waveform};
use serde::{Deserialize, Serialize};

use crate::error::{AudioError, AudioResult};
use crate::prepare::PlacedTrack;

pub use binaural::BinauralRenderer;
pub use delay_line::DelayLine;
pub use stereo_pan::StereoPanRenderer;

/// One track as seen by a renderer.
#[derive(Debug, Clone, Copy)]
pub struct RenderTrack<'a> {
    /// Display name (the source file stem).
    pub name: &'a str,
    /// Horizontal angle in degrees, positive to the listener's left.
    pub azimuth: f64,
    /// Vertical angle in degrees, positive upwards.
    pub elevation: f64,
    /// Gain multiplier.
    pub level: f64,
    /// Reverb send amount in [0, 1].
    pub reverb: f64,
    /// Mono samples, padded to the mix window.
    pub audio: &'a [f64],
}

/// Owned track names for building [`RenderTrack`]s from placed tracks.
pub fn track_names(placed: &[PlacedTrack]) -> Vec<String> {
    placed.iter().map(|p| p.track.source_item.stem()).collect()
}

/// Borrows placed tracks as render tracks.
pub fn render_tracks<'a>(placed: &'a [PlacedTrack], names: &'a [String]) -> Vec<RenderTrack<'a>> {
    placed
        .iter()
        .zip(names)
        .map(|(p, name)| RenderTrack {
            name,
            azimuth: p.track.azimuth,
            elevation: p.track.elevation,
            level: p.track.level,
            reverb: p.track.reverb,
            audio: &p.audio,
        })
        .collect()
}

/// A spatial-audio rendering capability.
pub trait Renderer: Send + Sync {
    /// Short identifier used in logs and configuration.
    fn name(&self) -> &'static str;

    /// Renders `tracks` into one waveform with the tracks' length.
    fn render(
        &self,
        tracks: &[RenderTrack<'_>],
        params: &GlobalMixingParams,
    ) -> AudioResult<Waveform>;
}

/// Selects a renderer implementation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RendererKind {
    /// Head-related binaural rendering with room reverb.
    #[default]
    Binaural,
    /// Equal-power stereo panning without room simulation.
    StereoPan,
}

impl RendererKind {
    /// Returns the kind as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            RendererKind::Binaural => "binaural",
            RendererKind::StereoPan => "stereo_pan",
        }
    }

    /// Creates the renderer.
    pub fn create(&self) -> Box<dyn Renderer> {
        match self {
            RendererKind::Binaural => Box::new(BinauralRenderer::new()),
            RendererKind::StereoPan => Box::new(StereoPanRenderer),
        }
    }
}

impl fmt::Display for RendererKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RendererKind {
    type Err = AudioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "binaural" => Ok(RendererKind::Binaural),
            "stereo_pan" | "stereo" => Ok(RendererKind::StereoPan),
            other => Err(AudioError::invalid_param(
                "renderer",
                format!("unknown renderer '{}' (expected binaural or stereo_pan)", other),
            )),
        }
    }
}

/// Checks that all tracks share one length and returns it.
pub(crate) fn common_length(tracks: &[RenderTrack<'_>]) -> AudioResult<usize> {
    let expected = tracks.first().map_or(0, |t| t.audio.len());
    for track in tracks {
        if track.audio.len() != expected {
            return Err(AudioError::TrackLengthMismatch {
                name: track.name.to_string(),
                expected,
                found: track.audio.len(),
            });
        }
    }
    Ok(expected)
}

/// Rejects global parameters outside the enumerated sets.
pub(crate) fn validate_params(params: &GlobalMixingParams) -> AudioResult<()> {
    if params.sample_rate == 0 {
        return Err(AudioError::InvalidSampleRate {
            rate: params.sample_rate,
        });
    }
    let checks: [(&str, &str, &[&str]); 5] = [
        ("subject_id", params.subject_id.as_str(), SUBJECT_IDS),
        ("speaker_layout", params.speaker_layout.as_str(), SPEAKER_LAYOUTS),
        ("reverb_type", params.reverb_type.as_str(), REVERB_TYPES),
        ("mode", params.mode.as_str(), INTERPOLATION_MODES),
        ("ir_type", params.ir_type.as_str(), IR_TYPES),
    ];
    for (name, value, allowed) in checks {
        if !allowed.contains(&value) {
            return Err(AudioError::invalid_param(
                name,
                format!("'{}' is not one of {:?}", value, allowed),
            ));
        }
    }
    Ok(())
}
