//! Misophonia Dataset Pipeline
//!
//! This crate builds datasets out of labelled source collections:
//!
//! - [`source`] - source datasets and their configuration
//! - [`sampling`] - the deterministic plan of which source items form each item
//! - [`generated`] - on-demand generation of a planned split
//! - [`persistence`] - saving splits to disk and reading them back
//! - [`pairs`] - matched trigger/control pairs derived from a saved split
//! - [`flatten`] - single-level columns for analysis
//!
//! # Example
//!
//! ```ignore
//! use misophonia_dataset::{
//!     GenerateOptions, GeneratedMisophoniaDataset, IfExists, PremadeMisophoniaDataset,
//!     SaveOptions, SourceConfig,
//! };
//! use misophonia_spec::Split;
//!
//! let config = SourceConfig::load("sources.json".as_ref())?;
//! let mut generated = GeneratedMisophoniaDataset::new(config.build(&[])?);
//! generated.prepare()?;
//! let view = generated.get_split(Split::Train, &GenerateOptions::new(100))?;
//!
//! let dataset = PremadeMisophoniaDataset::new("demo", "/data/misophonia");
//! dataset.save_split(&view, IfExists::Error, &SaveOptions::default())?;
//! ```

pub mod config;
pub mod error;
pub mod flatten;
pub mod generated;
pub mod pairs;
pub mod persistence;
pub mod pools;
pub mod sampling;
pub mod source;
pub mod split_view;

pub use config::{FallbackPolicy, GenerateOptions, IfExists, SaveOptions};
pub use error::{DatasetError, DatasetResult};
pub use flatten::{flatten_record, flatten_value};
pub use generated::GeneratedMisophoniaDataset;
pub use pairs::{add_experimental_pairs_to_dataset, PairSummary};
pub use persistence::{MetadataWriter, PremadeMisophoniaDataset, SaveSummary};
pub use pools::{PoolSizes, SourcePools};
pub use sampling::{plan_sampling, IndexCycle, SamplingPlan};
pub use source::{
    FolderSource, LicenseTable, ManifestSource, SourceConfig, SourceData, SourceEntry,
};
pub use split_view::DatasetSplitView;
