//! Mix orchestration over a [`Renderer`].

use misophonia_spec::{GlobalMixingParams, Waveform};
use tracing::debug;

use crate::error::{AudioError, AudioResult};
use crate::prepare::PlacedTrack;
use crate::render::{render_tracks, track_names, Renderer};

/// Renders the full mix and, for trigger items, the foreground-only ground truth.
///
/// Both renders use the same global parameters. The ground truth must have
/// the mix's exact shape; anything else is a renderer contract violation.
///
/// # Arguments
/// * `foregrounds` - Placed foreground tracks
/// * `backgrounds` - Placed background tracks
/// * `params` - Global mixing parameters
/// * `is_trigger` - Whether to render the ground truth
/// * `renderer` - Spatial renderer
///
/// # Returns
/// `(mix, ground_truth)`; the ground truth is `None` for control items
pub fn binaural_mix(
    foregrounds: &[PlacedTrack],
    backgrounds: &[PlacedTrack],
    params: &GlobalMixingParams,
    is_trigger: bool,
    renderer: &dyn Renderer,
) -> AudioResult<(Waveform, Option<Waveform>)> {
    let placed: Vec<PlacedTrack> = foregrounds.iter().chain(backgrounds).cloned().collect();
    let names = track_names(&placed);
    let tracks = render_tracks(&placed, &names);
    let mix = renderer.render(&tracks, params)?;
    debug!(
        "Rendered mix with {} ({} tracks, shape {:?})",
        renderer.name(),
        tracks.len(),
        mix.shape()
    );

    if !is_trigger {
        return Ok((mix, None));
    }

    // Foreground tracks come first in `tracks`.
    let ground_truth = renderer.render(&tracks[..foregrounds.len()], params)?;
    if ground_truth.shape() != mix.shape() {
        return Err(AudioError::contract(format!(
            "ground truth shape {:?} does not match mix shape {:?}",
            ground_truth.shape(),
            mix.shape()
        )));
    }
    Ok((mix, Some(ground_truth)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{RenderTrack, StereoPanRenderer};
    use misophonia_spec::{LabelType, SourceDataItem, SourceTrack, Split, TrackOptions};
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn placed(label_type: LabelType, audio: Vec<f64>, azimuth: f64) -> PlacedTrack {
        let item = SourceDataItem::builder(Split::Train, "d", "a.wav", label_type)
            .label("x")
            .build()
            .unwrap();
        let options = TrackOptions {
            azimuth: Some(azimuth),
            elevation: Some(0.0),
            level: Some(1.0),
            reverb: Some(0.0),
        };
        let len = audio.len();
        let track =
            SourceTrack::new(item, 0, len, &options, &mut Pcg32::seed_from_u64(0)).unwrap();
        PlacedTrack { track, audio }
    }

    /// Drops the last sample of single-track renders.
    struct ShortRenderer;

    impl Renderer for ShortRenderer {
        fn name(&self) -> &'static str {
            "short"
        }

        fn render(
            &self,
            tracks: &[RenderTrack<'_>],
            params: &GlobalMixingParams,
        ) -> AudioResult<Waveform> {
            let full = StereoPanRenderer.render(tracks, params)?;
            if tracks.len() > 1 {
                return Ok(full);
            }
            let channels = full
                .into_channels()
                .into_iter()
                .map(|mut c| {
                    c.pop();
                    c
                })
                .collect();
            Ok(Waveform::from_channels(channels)?)
        }
    }

    #[test]
    fn test_control_has_no_ground_truth() {
        let fg = [placed(LabelType::Control, vec![0.5; 64], 0.0)];
        let bg = [placed(LabelType::Background, vec![0.1; 64], 0.0)];
        let (mix, gt) =
            binaural_mix(&fg, &bg, &GlobalMixingParams::default(), false, &StereoPanRenderer)
                .unwrap();
        assert_eq!(mix.shape(), (2, 64));
        assert!(gt.is_none());
    }

    #[test]
    fn test_trigger_ground_truth_is_foreground_only() {
        let fg = [placed(LabelType::Trigger, vec![0.5; 64], 90.0)];
        let bg = [placed(LabelType::Background, vec![0.25; 64], -90.0)];
        let (mix, gt) =
            binaural_mix(&fg, &bg, &GlobalMixingParams::default(), true, &StereoPanRenderer)
                .unwrap();
        let gt = gt.unwrap();
        assert_eq!(gt.shape(), mix.shape());
        // Foreground is hard left, background hard right.
        assert!(gt.channel(1).unwrap().iter().all(|s| s.abs() < 1e-12));
        assert!((mix.channel(1).unwrap()[0] - 0.25).abs() < 1e-12);
        assert!((gt.channel(0).unwrap()[0] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_shape_mismatch_is_contract_violation() {
        let fg = [placed(LabelType::Trigger, vec![0.5; 16], 0.0)];
        let bg = [placed(LabelType::Background, vec![0.1; 16], 0.0)];
        let err = binaural_mix(&fg, &bg, &GlobalMixingParams::default(), true, &ShortRenderer)
            .unwrap_err();
        assert!(matches!(err, AudioError::RendererContract { .. }));
    }
}
