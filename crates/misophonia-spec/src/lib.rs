//! Misophonia Dataset Model Library
//!
//! This crate provides the typed data model shared by every stage of the
//! misophonia dataset pipeline, together with the invariant checks that run
//! whenever a value is constructed or re-hydrated from disk.
//!
//! # Overview
//!
//! - **Source items**: one audio file from a source collection, labelled as
//!   trigger, control, or background
//! - **Tracks**: a source item placed in a mix window with azimuth, elevation,
//!   level, and reverb
//! - **Global mixing parameters**: renderer settings shared by one mix
//! - **Items**: a generated mix with its tracks and, for triggers, the
//!   foreground-only ground truth
//!
//! # Example
//!
//! ```
//! use misophonia_spec::{GlobalMixingParams, MisophoniaItem, Split, Waveform};
//!
//! let mix = Waveform::silence(2, 441);
//! let item = MisophoniaItem::builder(Split::Train, mix.clone(), GlobalMixingParams::default())
//!     .trigger(true)
//!     .ground_truth(Some(mix.into()))
//!     .build()
//!     .unwrap();
//! assert_eq!(item.length(), 441);
//!
//! // Trigger items must carry a ground truth.
//! let silence = Waveform::silence(2, 441);
//! let missing = MisophoniaItem::builder(Split::Train, silence, GlobalMixingParams::default())
//!     .trigger(true)
//!     .build();
//! assert!(missing.is_err());
//! ```

pub mod audio;
pub mod error;
pub mod item;
pub mod mixing;
pub mod source;
pub mod track;
pub mod validation;

// Re-export commonly used types at the crate root
pub use audio::{AudioData, Waveform};
pub use error::{BackendError, ErrorCode, SpecError, ValidationError, ValidationResult};
pub use item::{
    categories_of, default_mix_licensing, MisophoniaItem, MisophoniaItemBuilder, MisophoniaRecord,
};
pub use mixing::{GlobalMixingParams, DEFAULT_SAMPLE_RATE};
pub use source::{
    extra_key_prefix, LabelType, License, SourceDataItem, SourceDataItemBuilder, Split,
};
pub use track::{SourceTrack, TrackOptions};
pub use validation::{validate_item, validate_source_item, validate_track};
