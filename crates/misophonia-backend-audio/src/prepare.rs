//! Track preparation: loading, loudness matching, and placement in the mix window.
//!
//! All tracks of one mix share a window as long as the longest normalized
//! track. Each track is placed at a random offset inside that window and
//! zero-padded on both sides so every padded buffer has the same length.

use misophonia_spec::{GlobalMixingParams, SourceDataItem, SourceTrack, TrackOptions};
use rand::Rng;
use tracing::debug;

use crate::error::{AudioError, AudioResult};
use crate::loader::AudioLoader;
use crate::loudness::{normalize_to_mean_rms, rms, RMS_EPSILON};

/// A track specification with its padded mono audio.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedTrack {
    /// Placement and render parameters.
    pub track: SourceTrack,
    /// Mono audio padded to the mix window.
    pub audio: Vec<f64>,
}

/// Render-parameter overrides for foreground and background tracks.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PrepareOptions {
    /// Applied to every foreground track.
    pub foreground: TrackOptions,
    /// Applied to every background track.
    pub background: TrackOptions,
}

/// Prepared foreground and background tracks of one mix.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedTracks {
    /// Foreground tracks, in input order.
    pub foregrounds: Vec<PlacedTrack>,
    /// Background tracks, in input order.
    pub backgrounds: Vec<PlacedTrack>,
    /// Length of every padded buffer.
    pub length: usize,
}

/// Loads, loudness-matches, and places the tracks of one mix.
///
/// Draw order on `rng`: for each foreground then each background, the start
/// offset followed by the track's render parameters.
///
/// # Arguments
/// * `fg_items` - Foreground source items (at least one)
/// * `bg_items` - Background source items (at least one)
/// * `params` - Global parameters; `sample_rate` selects the load rate
/// * `options` - Pinned render parameters
/// * `loader` - Audio loader
/// * `rng` - The mix's dedicated generator
pub fn prepare_track_specs<R: Rng + ?Sized>(
    fg_items: &[SourceDataItem],
    bg_items: &[SourceDataItem],
    params: &GlobalMixingParams,
    options: &PrepareOptions,
    loader: &dyn AudioLoader,
    rng: &mut R,
) -> AudioResult<PreparedTracks> {
    if fg_items.is_empty() {
        return Err(AudioError::EmptyTrackSet { kind: "foreground" });
    }
    if bg_items.is_empty() {
        return Err(AudioError::EmptyTrackSet { kind: "background" });
    }

    let mut audios = Vec::with_capacity(fg_items.len() + bg_items.len());
    for item in fg_items.iter().chain(bg_items) {
        audios.push(loader.load_mono(&item.file_path, params.sample_rate)?);
    }

    let target = normalize_to_mean_rms(&mut audios);
    let length = audios.iter().map(Vec::len).max().unwrap_or(0);
    debug!(
        "Prepared {} tracks, target RMS {:.6}, window {} samples",
        audios.len(),
        target,
        length
    );

    let bg_audios = audios.split_off(fg_items.len());
    let mut foregrounds = Vec::with_capacity(fg_items.len());
    for (item, audio) in fg_items.iter().zip(audios) {
        foregrounds.push(place_track(
            item.clone(),
            audio,
            length,
            &options.foreground,
            rng,
        )?);
    }
    let mut backgrounds = Vec::with_capacity(bg_items.len());
    for (item, audio) in bg_items.iter().zip(bg_audios) {
        backgrounds.push(place_track(
            item.clone(),
            audio,
            length,
            &options.background,
            rng,
        )?);
    }

    Ok(PreparedTracks {
        foregrounds,
        backgrounds,
        length,
    })
}

/// Places one track in a window of `window` samples.
///
/// The start is uniform in `[0, window - len]` (0 when the track fills the
/// window), then the render parameters are drawn.
pub fn place_track<R: Rng + ?Sized>(
    item: SourceDataItem,
    audio: Vec<f64>,
    window: usize,
    options: &TrackOptions,
    rng: &mut R,
) -> AudioResult<PlacedTrack> {
    let len = audio.len();
    let start = if window > len {
        rng.gen_range(0..=window - len)
    } else {
        0
    };
    let end = start + len;
    let track = SourceTrack::new(item, start, end, options, rng)?;
    let audio = pad_to_window(&audio, start, window);
    Ok(PlacedTrack { track, audio })
}

/// Zero-pads `audio` so it starts at `start` in a buffer of `window` samples.
///
/// Audio that would run past the window is cut at the window end.
pub fn pad_to_window(audio: &[f64], start: usize, window: usize) -> Vec<f64> {
    let mut padded = vec![0.0; window];
    if start < window {
        let n = audio.len().min(window - start);
        padded[start..start + n].copy_from_slice(&audio[..n]);
    }
    padded
}

/// Rebuilds a mix with its foreground swapped for another sound.
///
/// The replacement is placed at `foreground.start` with the foreground's
/// render parameters. Background audio is reloaded and scaled by the same
/// gains the original mix used (its loudness target is recomputed from the
/// original foreground and backgrounds), and the replacement is scaled to
/// that same target, so only the foreground sound differs. When the
/// replacement runs past the original window, the window grows and the
/// backgrounds gain trailing silence.
///
/// # Arguments
/// * `foreground` - The original single foreground track
/// * `backgrounds` - The original background tracks
/// * `replacement` - Source item of the new foreground
/// * `params` - The original mix's global parameters
/// * `window` - The original mix length
/// * `loader` - Audio loader
pub fn prepare_substituted_foreground(
    foreground: &SourceTrack,
    backgrounds: &[SourceTrack],
    replacement: &SourceDataItem,
    params: &GlobalMixingParams,
    window: usize,
    loader: &dyn AudioLoader,
) -> AudioResult<PreparedTracks> {
    if backgrounds.is_empty() {
        return Err(AudioError::EmptyTrackSet { kind: "background" });
    }

    let original_fg = loader.load_mono(&foreground.source_item.file_path, params.sample_rate)?;
    let mut bg_audio = Vec::with_capacity(backgrounds.len());
    for track in backgrounds {
        bg_audio.push(loader.load_mono(&track.source_item.file_path, params.sample_rate)?);
    }
    let mut replacement_audio = loader.load_mono(&replacement.file_path, params.sample_rate)?;

    let mut levels = vec![rms(&original_fg)];
    levels.extend(bg_audio.iter().map(|a| rms(a)));
    let target = levels.iter().sum::<f64>() / levels.len() as f64;
    scale_to(&mut replacement_audio, target);
    for (audio, level) in bg_audio.iter_mut().zip(&levels[1..]) {
        if *level > RMS_EPSILON {
            let gain = target / level;
            audio.iter_mut().for_each(|s| *s *= gain);
        }
    }

    let start = foreground.start;
    let end = start + replacement_audio.len();
    let length = window.max(end);
    let track = foreground.with_source(replacement.clone(), start, end)?;
    let foregrounds = vec![PlacedTrack {
        audio: pad_to_window(&replacement_audio, start, length),
        track,
    }];

    let backgrounds = backgrounds
        .iter()
        .zip(bg_audio)
        .map(|(track, audio)| PlacedTrack {
            audio: pad_to_window(&audio[..audio.len().min(track.len())], track.start, length),
            track: track.clone(),
        })
        .collect();

    Ok(PreparedTracks {
        foregrounds,
        backgrounds,
        length,
    })
}

fn scale_to(audio: &mut [f64], target: f64) {
    let level = rms(audio);
    if level > RMS_EPSILON {
        let gain = target / level;
        audio.iter_mut().for_each(|s| *s *= gain);
    }
}
