//! Generate command implementation
//!
//! Plans and renders one split from the configured source datasets and saves
//! it, optionally followed by experimental pairing.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use colored::Colorize;
use misophonia_backend_audio::{Renderer, RendererKind, WavFileLoader};
use misophonia_dataset::{
    add_experimental_pairs_to_dataset, GenerateOptions, GeneratedMisophoniaDataset, IfExists,
    PremadeMisophoniaDataset, SaveOptions,
};
use misophonia_spec::Split;
use tracing::info;

use super::load_sources;
use crate::defaults;

/// Arguments of the generate command.
#[derive(Debug, Clone)]
pub struct GenerateArgs {
    /// Dataset name.
    pub name: String,
    /// Split to generate.
    pub split: String,
    /// Replace an existing split instead of failing.
    pub replace: bool,
    /// Source configuration file.
    pub source_config: Option<PathBuf>,
    /// Source datasets to draw from; empty means all configured.
    pub source_datasets: Vec<String>,
    /// Dataset root directory.
    pub save_dir: Option<PathBuf>,
    /// Generation options.
    pub options: GenerateOptions,
    /// Worker threads.
    pub workers: Option<usize>,
    /// Renderer name.
    pub renderer: String,
    /// Derive experimental pairs after saving.
    pub add_experimental_pairs: bool,
    /// Show a progress bar.
    pub show_progress: bool,
}

/// Run the generate command
///
/// # Returns
/// Exit code: 0 on success
pub fn run(args: &GenerateArgs) -> Result<ExitCode> {
    let split: Split = args.split.parse()?;
    let kind: RendererKind = args.renderer.parse()?;
    if args.add_experimental_pairs && split != Split::Test {
        bail!(
            "--add-experimental-pairs requires the test split, got '{}'",
            split
        );
    }
    let renderer: Arc<dyn Renderer> = Arc::from(kind.create());

    let config_path = defaults::source_config(args.source_config.as_deref());
    let sources = load_sources(&config_path, &args.source_datasets)?;
    let mut generated =
        GeneratedMisophoniaDataset::new(sources).with_renderer(Arc::clone(&renderer));
    info!("Using sources: {}", generated.source_names().join(", "));
    generated
        .prepare()
        .context("failed to prepare source datasets")?;

    let view = generated.get_split(split, &args.options)?;
    let save_dir = defaults::save_dir(args.save_dir.as_deref());
    let dataset = PremadeMisophoniaDataset::new(&args.name, save_dir);
    let if_exists = if args.replace {
        IfExists::Replace
    } else {
        IfExists::Error
    };
    let summary = dataset.save_split(
        &view,
        if_exists,
        &SaveOptions {
            workers: args.workers,
            show_progress: args.show_progress,
        },
    )?;
    println!(
        "{} {} {} items to {}",
        "ok".green(),
        summary.uuids.len(),
        split,
        summary.directory.display()
    );

    if args.add_experimental_pairs {
        let pairs = add_experimental_pairs_to_dataset(
            &dataset,
            split,
            args.options.random_seed,
            &WavFileLoader,
            renderer.as_ref(),
        )?;
        println!(
            "{} {} experimental pairs ({} categories, {} skipped)",
            "ok".green(),
            pairs.len(),
            pairs.categories.len(),
            pairs.skipped_categories.len()
        );
    }

    Ok(ExitCode::SUCCESS)
}
