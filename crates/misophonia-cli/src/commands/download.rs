//! Download command implementation
//!
//! Makes every requested source dataset available locally.

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use colored::Colorize;

use super::load_sources;
use crate::defaults;

/// Run the download command
///
/// Sources already downloaded are skipped.
///
/// # Arguments
/// * `names` - Sources to download; empty means all configured
/// * `source_config` - Source configuration file
///
/// # Returns
/// Exit code: 0 if every source is available
pub fn run(names: &[String], source_config: Option<&Path>) -> Result<ExitCode> {
    let config_path = defaults::source_config(source_config);
    for source in load_sources(&config_path, names)? {
        if source.is_downloaded() {
            println!("  {} {} (already downloaded)", "ok".green(), source.name());
            continue;
        }
        source
            .download_data()
            .with_context(|| format!("failed to download '{}'", source.name()))?;
        println!("  {} {}", "ok".green(), source.name());
    }
    Ok(ExitCode::SUCCESS)
}
