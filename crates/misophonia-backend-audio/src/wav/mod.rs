//! Deterministic WAV file writer.
//!
//! This module writes 16- or 24-bit PCM WAV files with no timestamps or
//! variable metadata, so identical waveforms always produce identical files.
//! The hash of the PCM data is used by the determinism checks.

mod format;
mod pcm;
mod writer;

#[cfg(test)]
mod tests;

pub use format::{WavFormat, DEFAULT_BITS_PER_SAMPLE};
pub use pcm::{compute_pcm_hash, extract_pcm_data};
pub use writer::{waveform_to_pcm, write_wav, write_wav_file, write_wav_to_vec};
