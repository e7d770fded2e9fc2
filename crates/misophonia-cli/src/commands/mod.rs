//! CLI command implementations

pub mod download;
pub mod generate;
pub mod inspect;
pub mod search_metadata;

use std::path::Path;

use anyhow::{Context, Result};
use misophonia_dataset::{SourceConfig, SourceData};

/// Loads the source configuration and builds the named sources (all if none named).
pub(crate) fn load_sources(config: &Path, names: &[String]) -> Result<Vec<Box<dyn SourceData>>> {
    let config = SourceConfig::load(config)
        .with_context(|| format!("failed to load source config '{}'", config.display()))?;
    let sources = config.build(names)?;
    Ok(sources)
}
