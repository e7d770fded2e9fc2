//! Parametric binaural renderer.
//!
//! Each track is spatialized with a spherical-head model: an interaural time
//! difference from Woodworth's formula, a level difference for the head
//! shadow, a gentle elevation attenuation, and a lowpass for sources behind
//! the listener. With `BRIR` impulse responses the tracks also feed a shared
//! Freeverb room bus scaled by each track's reverb amount. With a speaker
//! layout other than `none`, sources snap to the nearest virtual speaker on
//! the horizontal plane.

use misophonia_spec::mixing::SUBJECT_IDS;
use misophonia_spec::{GlobalMixingParams, Waveform};
use tracing::trace;

use super::delay_line::DelayLine;
use super::room::{room_size_for, Room, DEFAULT_DAMPING};
use super::{common_length, validate_params, RenderTrack, Renderer};
use crate::error::AudioResult;

/// Speed of sound in m/s.
const SPEED_OF_SOUND: f64 = 343.0;

/// Head radius of the first subject, in metres.
const BASE_HEAD_RADIUS: f64 = 0.0825;

/// Head radius step between consecutive subjects, in metres.
const HEAD_RADIUS_STEP: f64 = 0.0005;

/// Level difference at fully lateral incidence, in dB.
const MAX_HEAD_SHADOW_DB: f64 = 9.0;

/// Attenuation at the poles relative to the horizontal plane.
const ELEVATION_ATTENUATION: f64 = 0.25;

/// Lowpass coefficient for a source directly behind the listener.
const MAX_REAR_LOWPASS: f64 = 0.35;

const STEREO_SPEAKERS: &[f64] = &[-30.0, 30.0];
const SURROUND_5_1_SPEAKERS: &[f64] = &[-110.0, -30.0, 0.0, 30.0, 110.0];
const SURROUND_7_1_SPEAKERS: &[f64] = &[-135.0, -90.0, -30.0, 0.0, 30.0, 90.0, 135.0];

/// Binaural renderer producing a two-channel (left, right) waveform.
#[derive(Debug, Clone)]
pub struct BinauralRenderer {
    damping: f64,
}

impl Default for BinauralRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl BinauralRenderer {
    /// Creates a renderer with the default room damping.
    pub fn new() -> Self {
        Self {
            damping: DEFAULT_DAMPING,
        }
    }

    /// Sets the room bus's high-frequency absorption in [0, 1].
    pub fn with_damping(mut self, damping: f64) -> Self {
        self.damping = damping.clamp(0.0, 1.0);
        self
    }
}

impl Renderer for BinauralRenderer {
    fn name(&self) -> &'static str {
        "binaural"
    }

    fn render(
        &self,
        tracks: &[RenderTrack<'_>],
        params: &GlobalMixingParams,
    ) -> AudioResult<Waveform> {
        validate_params(params)?;
        let length = common_length(tracks)?;
        let sample_rate = params.sample_rate as f64;
        let head_radius = head_radius(&params.subject_id);
        let interpolate = params.mode != "nearest";
        let with_room = params.ir_type == "BRIR";

        let mut left = vec![0.0; length];
        let mut right = vec![0.0; length];
        let mut send = vec![0.0; if with_room { length } else { 0 }];

        for track in tracks {
            let (azimuth, elevation) = snap_to_layout(
                &params.speaker_layout,
                track.azimuth,
                track.elevation,
            );
            let cue = SpatialCue::new(azimuth, elevation, head_radius, sample_rate);
            trace!(
                "Rendering '{}' at az {:.0} el {:.0}: itd {:.2} samples, far gain {:.3}",
                track.name,
                azimuth,
                elevation,
                cue.delay_samples,
                cue.far_gain
            );

            let mut near_delay = DelayLine::new(1);
            let mut far_delay = DelayLine::new(cue.delay_samples.ceil() as usize + 2);
            let mut lowpass_state = 0.0;

            for (i, &sample) in track.audio.iter().enumerate() {
                let filtered = (1.0 - cue.lowpass) * sample + cue.lowpass * lowpass_state;
                lowpass_state = filtered;
                let dry = filtered * track.level * cue.gain;

                let near = near_delay.process(dry, 0.0, interpolate);
                let far = far_delay.process(dry, cue.delay_samples, interpolate) * cue.far_gain;
                if cue.source_on_left {
                    left[i] += near;
                    right[i] += far;
                } else {
                    left[i] += far;
                    right[i] += near;
                }

                if with_room {
                    send[i] += sample * track.level * track.reverb;
                }
            }
        }

        if with_room {
            let mut room = Room::new(
                sample_rate,
                room_size_for(&params.reverb_type),
                self.damping,
            );
            let (wet_left, wet_right) = room.process_buffer(&send);
            for (out, wet) in left.iter_mut().zip(wet_left) {
                *out += wet;
            }
            for (out, wet) in right.iter_mut().zip(wet_right) {
                *out += wet;
            }
        }

        Ok(Waveform::from_channels(vec![left, right])?)
    }
}

/// Per-track binaural cues.
#[derive(Debug, Clone, Copy, PartialEq)]
struct SpatialCue {
    /// Far-ear delay in samples.
    delay_samples: f64,
    /// Far-ear gain from the head shadow.
    far_gain: f64,
    /// Gain applied to both ears.
    gain: f64,
    /// One-pole lowpass coefficient (0 = bypass).
    lowpass: f64,
    /// True if the near ear is the left ear.
    source_on_left: bool,
}

impl SpatialCue {
    fn new(azimuth: f64, elevation: f64, head_radius: f64, sample_rate: f64) -> Self {
        let az = azimuth.to_radians();
        let el = elevation.to_radians();

        // Positive lateral component means the source is on the left.
        let lateral = (az.sin() * el.cos()).clamp(-1.0, 1.0);
        let theta = lateral.abs().asin();
        let itd = head_radius / SPEED_OF_SOUND * (theta + theta.sin());

        let shadow_db = MAX_HEAD_SHADOW_DB * lateral.abs();
        let frontal = az.cos() * el.cos();

        Self {
            delay_samples: itd * sample_rate,
            far_gain: 10f64.powf(-shadow_db / 20.0),
            gain: 1.0 - ELEVATION_ATTENUATION * el.sin().abs(),
            lowpass: if frontal < 0.0 {
                MAX_REAR_LOWPASS * -frontal
            } else {
                0.0
            },
            source_on_left: lateral >= 0.0,
        }
    }
}

/// Head radius for a subject; unknown subjects use the first subject's radius.
fn head_radius(subject_id: &str) -> f64 {
    let index = SUBJECT_IDS
        .iter()
        .position(|s| *s == subject_id)
        .unwrap_or(0);
    BASE_HEAD_RADIUS + HEAD_RADIUS_STEP * index as f64
}

/// Maps a direction onto the nearest speaker of a virtual layout.
///
/// Layout `none` leaves the direction untouched. Any speaker layout places
/// the source on the horizontal plane.
fn snap_to_layout(layout: &str, azimuth: f64, elevation: f64) -> (f64, f64) {
    let speakers = match layout {
        "stereo" => STEREO_SPEAKERS,
        "5.1" => SURROUND_5_1_SPEAKERS,
        "7.1" => SURROUND_7_1_SPEAKERS,
        _ => return (azimuth, elevation),
    };
    let nearest = speakers
        .iter()
        .copied()
        .min_by(|a, b| {
            angular_distance(*a, azimuth).total_cmp(&angular_distance(*b, azimuth))
        })
        .unwrap_or(0.0);
    (nearest, 0.0)
}

fn angular_distance(a: f64, b: f64) -> f64 {
    let d = (a - b).rem_euclid(360.0);
    d.min(360.0 - d)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frontal_source_has_no_interaural_difference() {
        let cue = SpatialCue::new(0.0, 0.0, BASE_HEAD_RADIUS, 44100.0);
        assert!(cue.delay_samples.abs() < 1e-12);
        assert!((cue.far_gain - 1.0).abs() < 1e-12);
        assert_eq!(cue.lowpass, 0.0);
        assert_eq!(cue.gain, 1.0);
    }

    #[test]
    fn test_lateral_source_matches_woodworth() {
        let cue = SpatialCue::new(90.0, 0.0, 0.0875, 44100.0);
        let expected = 0.0875 / 343.0 * (std::f64::consts::FRAC_PI_2 + 1.0) * 44100.0;
        assert!((cue.delay_samples - expected).abs() < 1e-9);
        assert!(cue.source_on_left);
        assert!((cue.far_gain - 10f64.powf(-MAX_HEAD_SHADOW_DB / 20.0)).abs() < 1e-12);
    }

    #[test]
    fn test_negative_azimuth_is_right() {
        let cue = SpatialCue::new(-45.0, 0.0, BASE_HEAD_RADIUS, 44100.0);
        assert!(!cue.source_on_left);
    }

    #[test]
    fn test_rear_source_is_lowpassed() {
        let cue = SpatialCue::new(180.0, 0.0, BASE_HEAD_RADIUS, 44100.0);
        assert!((cue.lowpass - MAX_REAR_LOWPASS).abs() < 1e-12);
    }

    #[test]
    fn test_head_radius_by_subject() {
        assert_eq!(head_radius("D1"), BASE_HEAD_RADIUS);
        assert!(head_radius("H20") > head_radius("D2"));
        assert_eq!(head_radius("unknown"), BASE_HEAD_RADIUS);
    }

    #[test]
    fn test_snap_to_layout() {
        assert_eq!(snap_to_layout("none", 17.0, 40.0), (17.0, 40.0));
        assert_eq!(snap_to_layout("stereo", 5.0, 40.0), (30.0, 0.0));
        assert_eq!(snap_to_layout("stereo", -170.0, 0.0), (-30.0, 0.0));
        assert_eq!(snap_to_layout("5.1", 100.0, 10.0), (110.0, 0.0));
        assert_eq!(snap_to_layout("7.1", 180.0, 0.0).0.abs(), 135.0);
    }

    #[test]
    fn test_angular_distance_wraps() {
        assert_eq!(angular_distance(170.0, -170.0), 20.0);
        assert_eq!(angular_distance(0.0, 90.0), 90.0);
    }
}
