//! Misophonia End-to-End Test Infrastructure
//!
//! This crate provides integration tests for the full pipeline:
//!
//! - Generation: source WAV files -> rendered, saved split
//! - Persistence: saved split -> reloaded items with existing audio
//! - **Determinism**: identical mixes for identical seeds
//! - Pairing: derived control items for selected triggers
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p misophonia-tests
//! ```
//!
//! ## Fixtures
//!
//! [`SyntheticSourceFixture`] writes small sine and noise WAV files into a
//! temporary directory together with a manifest and source configuration:
//!
//! ```rust,ignore
//! use misophonia_tests::fixtures::{Signal, SyntheticSourceFixture};
//!
//! let fixture = SyntheticSourceFixture::new("synth");
//! fixture.add_sound(Split::Train, LabelType::Trigger, "chewing", Signal::Sine(440.0), 0.1);
//! let config = fixture.write_config();
//! ```

pub mod determinism;
pub mod fixtures;

pub use determinism::{
    assert_deterministic, compute_hash, hash_split, verify_determinism, verify_hash_determinism,
    DeterminismResult, DiffInfo,
};
pub use fixtures::{Signal, SyntheticSourceFixture};
