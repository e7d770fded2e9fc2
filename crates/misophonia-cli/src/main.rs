//! Misophonia CLI - generating binaural misophonia datasets
//!
//! This binary provides commands for preparing source datasets, generating
//! and saving dataset splits, and inspecting saved splits.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use misophonia_dataset::GenerateOptions;

use misophonia_cli::commands;
use misophonia_cli::commands::generate::GenerateArgs;
use misophonia_cli::commands::search_metadata::MetadataFilter;
use misophonia_cli::logging;

/// Misophonia - Binaural Dataset Generation
#[derive(Parser)]
#[command(name = "misophonia")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a dataset split from the configured source datasets
    Generate {
        /// Name of the dataset
        name: String,

        /// Split to generate (train, val, test)
        split: String,

        /// Replace the split if it already exists
        #[arg(short = 'f', long)]
        replace: bool,

        /// Source configuration file (default: data dir)
        #[arg(long)]
        source_config: Option<PathBuf>,

        /// Source dataset to draw from; repeat for several (default: all)
        #[arg(short = 'd', long = "source-dataset")]
        source_datasets: Vec<String>,

        /// Directory datasets are saved under (default: data dir)
        #[arg(short, long)]
        save_dir: Option<PathBuf>,

        /// Number of items to generate
        #[arg(short, long, default_value = "1")]
        num_samples: usize,

        /// Probability that an item is a trigger item
        #[arg(long, default_value = "0.5")]
        trig_to_ctrl: f64,

        /// Minimum foregrounds per item
        #[arg(long, default_value = "1")]
        min_fgs_pr_item: usize,

        /// Maximum foregrounds per item
        #[arg(long, default_value = "1")]
        max_fgs_pr_item: usize,

        /// Minimum backgrounds per item
        #[arg(long, default_value = "1")]
        min_bgs_pr_item: usize,

        /// Maximum backgrounds per item
        #[arg(long, default_value = "3")]
        max_bgs_pr_item: usize,

        /// Seed for sampling and mixing
        #[arg(short, long, default_value = "42")]
        random_seed: u32,

        /// Worker threads (default: available parallelism)
        #[arg(long)]
        workers: Option<usize>,

        /// Spatial renderer
        #[arg(long, default_value = "binaural", value_parser = ["binaural", "stereo_pan"])]
        renderer: String,

        /// Derive experimental trigger/control pairs after saving
        #[arg(long)]
        add_experimental_pairs: bool,

        /// Hide the progress bar
        #[arg(long)]
        no_progress: bool,
    },

    /// Make source datasets available locally
    Download {
        /// Sources to download (default: all configured)
        names: Vec<String>,

        /// Source configuration file (default: data dir)
        #[arg(long)]
        source_config: Option<PathBuf>,
    },

    /// Print source items matching the given filters as JSON lines
    SearchMetadata {
        /// Source configuration file (default: data dir)
        #[arg(long)]
        source_config: Option<PathBuf>,

        /// Label type (trigger, control, background)
        #[arg(long)]
        label_type: Option<String>,

        /// Label
        #[arg(long)]
        label: Option<String>,

        /// Split (train, val, test)
        #[arg(long)]
        split: Option<String>,

        /// Source dataset name
        #[arg(long)]
        dataset: Option<String>,
    },

    /// Print the items of a saved split as JSON lines
    Inspect {
        /// Name of the dataset
        name: String,

        /// Split to inspect (train, val, test)
        split: String,

        /// Directory datasets are saved under (default: data dir)
        #[arg(short, long)]
        save_dir: Option<PathBuf>,

        /// Print flattened single-level records
        #[arg(long)]
        flatten: bool,
    },
}

fn run(command: Commands) -> Result<ExitCode> {
    match command {
        Commands::Generate {
            name,
            split,
            replace,
            source_config,
            source_datasets,
            save_dir,
            num_samples,
            trig_to_ctrl,
            min_fgs_pr_item,
            max_fgs_pr_item,
            min_bgs_pr_item,
            max_bgs_pr_item,
            random_seed,
            workers,
            renderer,
            add_experimental_pairs,
            no_progress,
        } => {
            let options = GenerateOptions::new(num_samples)
                .with_foregrounds(min_fgs_pr_item, max_fgs_pr_item)
                .with_backgrounds(min_bgs_pr_item, max_bgs_pr_item)
                .with_ratio(trig_to_ctrl)
                .with_seed(random_seed);
            commands::generate::run(&GenerateArgs {
                name,
                split,
                replace,
                source_config,
                source_datasets,
                save_dir,
                options,
                workers,
                renderer,
                add_experimental_pairs,
                show_progress: !no_progress,
            })
        }
        Commands::Download {
            names,
            source_config,
        } => commands::download::run(&names, source_config.as_deref()),
        Commands::SearchMetadata {
            source_config,
            label_type,
            label,
            split,
            dataset,
        } => {
            let filter = MetadataFilter {
                label_type: label_type.as_deref().map(str::parse).transpose()?,
                label,
                split: split.as_deref().map(str::parse).transpose()?,
                dataset,
            };
            commands::search_metadata::run(source_config.as_deref(), &filter)
        }
        Commands::Inspect {
            name,
            split,
            save_dir,
            flatten,
        } => commands::inspect::run(&name, &split, save_dir.as_deref(), flatten),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init();

    match run(cli.command) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}
