//! Inspect command implementation
//!
//! Prints the items of a persisted split as JSON lines.

use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;
use colored::Colorize;
use misophonia_dataset::{flatten_record, PremadeMisophoniaDataset};
use misophonia_spec::Split;

use crate::defaults;

/// Run the inspect command
///
/// # Arguments
/// * `name` - Dataset name
/// * `split` - Split name
/// * `save_dir` - Dataset root directory
/// * `flatten` - Print flattened single-level records
pub fn run(name: &str, split: &str, save_dir: Option<&Path>, flatten: bool) -> Result<ExitCode> {
    let split: Split = split.parse()?;
    let dataset = PremadeMisophoniaDataset::new(name, defaults::save_dir(save_dir));
    let view = dataset.get_split(split)?;

    for item in view.iter() {
        let record = item?.to_record()?;
        let line = if flatten {
            serde_json::to_string(&flatten_record(&record)?)?
        } else {
            serde_json::to_string(&record)?
        };
        println!("{}", line);
    }
    eprintln!("{} {} items in {}/{}", "ok".green(), view.len(), name, split);
    Ok(ExitCode::SUCCESS)
}
