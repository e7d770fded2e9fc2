//! Search-metadata command implementation
//!
//! Prints the standardized source items that match every given filter.

use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;
use colored::Colorize;
use misophonia_spec::{LabelType, SourceDataItem, Split};

use super::load_sources;
use crate::defaults;

/// Filters for the search; `None` matches anything.
#[derive(Debug, Clone, Default)]
pub struct MetadataFilter {
    /// Label type.
    pub label_type: Option<LabelType>,
    /// Label, matched case-insensitively against any of the item's labels.
    pub label: Option<String>,
    /// Split.
    pub split: Option<Split>,
    /// Source dataset name, matched case-insensitively.
    pub dataset: Option<String>,
}

impl MetadataFilter {
    /// Returns true if `item` passes every filter.
    pub fn matches(&self, item: &SourceDataItem) -> bool {
        if self.label_type.is_some_and(|t| t != item.label_type) {
            return false;
        }
        if self.split.is_some_and(|s| s != item.split) {
            return false;
        }
        if let Some(label) = &self.label {
            if !item.labels.iter().any(|l| l.eq_ignore_ascii_case(label)) {
                return false;
            }
        }
        if let Some(dataset) = &self.dataset {
            if !item.source_dataset.eq_ignore_ascii_case(dataset) {
                return false;
            }
        }
        true
    }
}

/// Run the search-metadata command
///
/// Matching items go to stdout as JSON lines; the count goes to stderr.
///
/// # Arguments
/// * `source_config` - Source configuration file
/// * `filter` - Item filter
pub fn run(source_config: Option<&Path>, filter: &MetadataFilter) -> Result<ExitCode> {
    let config_path = defaults::source_config(source_config);
    let mut count = 0usize;
    for source in load_sources(&config_path, &[])? {
        for item in source.get_metadata()? {
            if filter.matches(&item) {
                println!("{}", serde_json::to_string(&item)?);
                count += 1;
            }
        }
    }
    eprintln!("{} {} matching items", "ok".green(), count);
    Ok(ExitCode::SUCCESS)
}
