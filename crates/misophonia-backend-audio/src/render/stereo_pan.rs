//! Equal-power stereo panning renderer.

use misophonia_spec::{GlobalMixingParams, Waveform};

use super::{common_length, validate_params, RenderTrack, Renderer};
use crate::error::AudioResult;

/// Pans each track by the sine of its azimuth; elevation and reverb are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct StereoPanRenderer;

/// Left and right gains for an azimuth in degrees (positive = left).
pub(crate) fn pan_gains(azimuth: f64) -> (f64, f64) {
    // -1 is hard left, 1 is hard right.
    let pan = -azimuth.to_radians().sin();
    let pan_angle = (pan + 1.0) * std::f64::consts::FRAC_PI_4;
    (pan_angle.cos(), pan_angle.sin())
}

impl Renderer for StereoPanRenderer {
    fn name(&self) -> &'static str {
        "stereo_pan"
    }

    fn render(
        &self,
        tracks: &[RenderTrack<'_>],
        params: &GlobalMixingParams,
    ) -> AudioResult<Waveform> {
        validate_params(params)?;
        let length = common_length(tracks)?;

        let mut left = vec![0.0; length];
        let mut right = vec![0.0; length];
        for track in tracks {
            let (gain_l, gain_r) = pan_gains(track.azimuth);
            for (i, &sample) in track.audio.iter().enumerate() {
                let s = sample * track.level;
                left[i] += s * gain_l;
                right[i] += s * gain_r;
            }
        }

        Ok(Waveform::from_channels(vec![left, right])?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_is_equal_power() {
        let (l, r) = pan_gains(0.0);
        let expected = std::f64::consts::FRAC_PI_4.cos();
        assert!((l - expected).abs() < 1e-12);
        assert!((r - expected).abs() < 1e-12);
    }

    #[test]
    fn test_hard_left_and_right() {
        let (l, r) = pan_gains(90.0);
        assert!((l - 1.0).abs() < 1e-12);
        assert!(r.abs() < 1e-12);

        let (l, r) = pan_gains(-90.0);
        assert!(l.abs() < 1e-12);
        assert!((r - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_power_is_constant() {
        for az in (-180..=180).step_by(15) {
            let (l, r) = pan_gains(az as f64);
            assert!((l * l + r * r - 1.0).abs() < 1e-12);
        }
    }
}
