//! Misophonia Audio Backend
//!
//! This crate turns chosen source items into rendered mixes:
//!
//! - [`prepare`] - loads audio, matches loudness, and places tracks in a common window
//! - [`render`] - spatial renderers behind the [`Renderer`] trait
//! - [`binaural`] - renders the full mix and the foreground-only ground truth
//! - [`wav`] - deterministic WAV writer and PCM hashing
//!
//! # Determinism
//!
//! Given the same source audio and seed, every stage produces identical
//! samples. All randomness comes from PCG32 generators created with
//! [`rng::create_rng`], with per-component seeds derived via BLAKE3.
//!
//! # Example
//!
//! ```ignore
//! use misophonia_backend_audio::{
//!     binaural_mix, prepare_track_specs, rng, RendererKind, WavFileLoader,
//! };
//!
//! let mut rng = rng::create_rng(42);
//! let params = GlobalMixingParams::sample(&mut rng);
//! let options = Default::default();
//! let tracks = prepare_track_specs(&fgs, &bgs, &params, &options, &WavFileLoader, &mut rng)?;
//! let renderer = RendererKind::Binaural.create();
//! let (mix, ground_truth) =
//!     binaural_mix(&tracks.foregrounds, &tracks.backgrounds, &params, true, renderer.as_ref())?;
//! ```

pub mod binaural;
pub mod error;
pub mod loader;
pub mod loudness;
pub mod prepare;
pub mod render;
pub mod resample;
pub mod rng;
pub mod wav;

pub use binaural::binaural_mix;
pub use error::{AudioError, AudioResult};
pub use loader::{AudioLoader, WavFileLoader};
pub use prepare::{
    prepare_substituted_foreground, prepare_track_specs, PlacedTrack, PrepareOptions,
    PreparedTracks,
};
pub use render::{BinauralRenderer, RenderTrack, Renderer, RendererKind, StereoPanRenderer};
pub use wav::{compute_pcm_hash, write_wav_file, DEFAULT_BITS_PER_SAMPLE};
