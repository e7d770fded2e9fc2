//! Saving and loading generated splits.
//!
//! On-disk layout, per dataset and split:
//!
//! ```text
//! {base}/{name}/{split}/metadata.jsonl
//! {base}/{name}/{split}/mixes/{uuid}.wav
//! {base}/{name}/{split}/ground_truths/{uuid}.wav
//! ```
//!
//! Each metadata line is one self-contained item record whose audio paths
//! are relative to the split directory. Lines are appended by whichever
//! worker finishes first, so file order is completion order.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use indicatif::{ProgressBar, ProgressStyle};
use misophonia_backend_audio::{write_wav_file, DEFAULT_BITS_PER_SAMPLE};
use misophonia_spec::{AudioData, MisophoniaItem, MisophoniaRecord, Split};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::{IfExists, SaveOptions};
use crate::error::{DatasetError, DatasetResult};
use crate::split_view::DatasetSplitView;

/// Metadata file name inside a split directory.
pub const METADATA_FILE: &str = "metadata.jsonl";

/// Mix directory inside a split directory.
pub const MIXES_DIR: &str = "mixes";

/// Ground-truth directory inside a split directory.
pub const GROUND_TRUTHS_DIR: &str = "ground_truths";

/// Appends JSON lines to a shared file.
///
/// Each call serializes one value, then writes and flushes the complete line
/// under a lock, so lines from concurrent workers never interleave.
#[derive(Debug)]
pub struct MetadataWriter {
    file: Mutex<File>,
}

impl MetadataWriter {
    /// Opens `path` for appending, creating it if needed.
    pub fn open(path: &Path) -> DatasetResult<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    /// Appends one value as a JSON line.
    pub fn append<T: Serialize>(&self, value: &T) -> DatasetResult<()> {
        let mut line = serde_json::to_string(value)?;
        line.push('\n');
        let mut file = self.file.lock().unwrap_or_else(|e| e.into_inner());
        file.write_all(line.as_bytes())?;
        file.flush()?;
        Ok(())
    }
}

/// Result of a save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveSummary {
    /// Split that was written.
    pub split: Split,
    /// Split directory.
    pub directory: PathBuf,
    /// Ids of the written items, in completion order.
    pub uuids: Vec<Uuid>,
}

/// A dataset stored on disk under `{base_dir}/{name}`.
#[derive(Debug, Clone)]
pub struct PremadeMisophoniaDataset {
    name: String,
    base_dir: PathBuf,
}

impl PremadeMisophoniaDataset {
    /// Creates a handle; nothing is read or written yet.
    pub fn new(name: impl Into<String>, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            base_dir: base_dir.into(),
        }
    }

    /// Dataset name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `{base_dir}/{name}`.
    pub fn dataset_dir(&self) -> PathBuf {
        self.base_dir.join(&self.name)
    }

    /// `{base_dir}/{name}/{split}`.
    pub fn split_dir(&self, split: Split) -> PathBuf {
        self.dataset_dir().join(split.as_str())
    }

    /// Path of a split's metadata file.
    pub fn metadata_path(&self, split: Split) -> PathBuf {
        self.split_dir(split).join(METADATA_FILE)
    }

    /// Generates and writes every item of `view`.
    ///
    /// The existing-directory policy is applied once, before any worker
    /// starts. Items are then generated and written in parallel; the first
    /// failure stops the save, and lines already written stay valid.
    ///
    /// `Replace` writes into a staging directory next to the split and swaps
    /// it in only once every item is saved. The existing split stays intact
    /// until then, so a view loaded from that split can be saved over it, and
    /// a failed save leaves it untouched.
    ///
    /// # Arguments
    /// * `view` - Items to save
    /// * `if_exists` - Policy for an existing split directory
    /// * `options` - Worker count and progress display
    pub fn save_split(
        &self,
        view: &DatasetSplitView,
        if_exists: IfExists,
        options: &SaveOptions,
    ) -> DatasetResult<SaveSummary> {
        let split = view.split();
        let dir = self.split_dir(split);
        let replacing = dir.exists() && if_exists == IfExists::Replace;
        if dir.exists() {
            match if_exists {
                IfExists::Error => return Err(DatasetError::DirectoryExists { path: dir }),
                IfExists::Replace => info!("Replacing '{}'", dir.display()),
                IfExists::Append => debug!("Appending to '{}'", dir.display()),
            }
        }

        if !replacing {
            let uuids = self.write_split(view, &dir, options)?;
            return Ok(SaveSummary {
                split,
                directory: dir,
                uuids,
            });
        }

        let staging = self.staging_dir(split);
        if staging.exists() {
            fs::remove_dir_all(&staging)?;
        }
        let uuids = match self.write_split(view, &staging, options) {
            Ok(uuids) => uuids,
            Err(e) => {
                if let Err(cleanup) = fs::remove_dir_all(&staging) {
                    warn!("Failed to remove '{}': {}", staging.display(), cleanup);
                }
                return Err(e);
            }
        };
        fs::remove_dir_all(&dir)?;
        fs::rename(&staging, &dir)?;
        debug!("Moved '{}' to '{}'", staging.display(), dir.display());
        Ok(SaveSummary {
            split,
            directory: dir,
            uuids,
        })
    }

    /// `{base_dir}/{name}/.{split}.staging`, where replacements are built.
    fn staging_dir(&self, split: Split) -> PathBuf {
        self.dataset_dir().join(format!(".{}.staging", split.as_str()))
    }

    /// Writes every item of `view` into `dir`, creating its layout.
    fn write_split(
        &self,
        view: &DatasetSplitView,
        dir: &Path,
        options: &SaveOptions,
    ) -> DatasetResult<Vec<Uuid>> {
        let split = view.split();
        fs::create_dir_all(dir.join(MIXES_DIR))?;
        fs::create_dir_all(dir.join(GROUND_TRUTHS_DIR))?;
        let writer = MetadataWriter::open(&dir.join(METADATA_FILE))?;

        let workers = options.resolved_workers();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()
            .map_err(|e| DatasetError::WorkerPool {
                message: e.to_string(),
            })?;

        let progress = if options.show_progress {
            let bar = ProgressBar::new(view.len() as u64);
            bar.set_style(
                ProgressStyle::with_template("{msg} [{bar:40}] {pos}/{len} ({eta})")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("=> "),
            );
            bar.set_message(format!("{}/{}", self.name, split));
            bar
        } else {
            ProgressBar::hidden()
        };

        info!(
            "Saving {} {} items to '{}' with {} workers",
            view.len(),
            split,
            dir.display(),
            workers
        );
        let uuids = Mutex::new(Vec::with_capacity(view.len()));
        pool.install(|| {
            (0..view.len()).into_par_iter().try_for_each(|index| {
                let item = view.get(index as isize)?;
                let uuid = write_item(dir, item, &writer)?;
                uuids.lock().unwrap_or_else(|e| e.into_inner()).push(uuid);
                progress.inc(1);
                Ok::<(), DatasetError>(())
            })
        })?;
        progress.finish_and_clear();

        let uuids = uuids.into_inner().unwrap_or_else(|e| e.into_inner());
        info!("Saved {} items to '{}'", uuids.len(), dir.display());
        Ok(uuids)
    }

    /// Splits that have a metadata file.
    pub fn available_splits(&self) -> Vec<Split> {
        Split::all()
            .iter()
            .copied()
            .filter(|split| self.metadata_path(*split).is_file())
            .collect()
    }

    /// Loads and validates every persisted item of a split.
    ///
    /// A split without a metadata file has no items. Audio paths are resolved
    /// against the split directory and must exist.
    pub fn load_split_items(&self, split: Split) -> DatasetResult<Vec<MisophoniaItem>> {
        let path = self.metadata_path(split);
        if !path.is_file() {
            return Ok(Vec::new());
        }
        let dir = self.split_dir(split);
        let reader = BufReader::new(File::open(&path)?);

        let mut items = Vec::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let line_no = index + 1;
            if line.trim().is_empty() {
                continue;
            }
            let parse_error = |message: String| DatasetError::MetadataParse {
                path: path.clone(),
                line: line_no,
                message,
            };
            let record: MisophoniaRecord =
                serde_json::from_str(&line).map_err(|e| parse_error(e.to_string()))?;
            let item = MisophoniaItem::from_record(record, &dir)
                .map_err(|e| parse_error(e.to_string()))?;

            let audio = std::iter::once(item.mix()).chain(item.ground_truth());
            for data in audio {
                if let Some(file) = data.as_path() {
                    if !file.is_file() {
                        return Err(DatasetError::MissingAudioFile {
                            path: path.clone(),
                            line: line_no,
                            audio: file.to_path_buf(),
                        });
                    }
                }
            }
            items.push(item);
        }
        debug!("Loaded {} {} items from '{}'", items.len(), split, path.display());
        Ok(items)
    }

    /// Returns a view over a persisted split.
    ///
    /// A split with no items is an error.
    pub fn get_split(&self, split: Split) -> DatasetResult<DatasetSplitView> {
        let items = self.load_split_items(split)?;
        if items.is_empty() {
            return Err(DatasetError::NoData {
                split,
                path: self.split_dir(split),
            });
        }
        Ok(DatasetSplitView::from_items(split, items))
    }
}

/// Writes one item's audio and metadata line, returning its new id.
fn write_item(
    split_dir: &Path,
    item: MisophoniaItem,
    writer: &MetadataWriter,
) -> DatasetResult<Uuid> {
    let uuid = Uuid::new_v4();
    let item = item.with_uuid(uuid);
    let sample_rate = item.global_mixing_params().sample_rate;
    let file_name = format!("{}.wav", uuid);

    let mix_path = Path::new(MIXES_DIR).join(&file_name);
    store_audio(item.mix(), &split_dir.join(&mix_path), sample_rate)?;

    let ground_truth_path = match item.ground_truth() {
        Some(audio) => {
            let path = Path::new(GROUND_TRUTHS_DIR).join(&file_name);
            store_audio(audio, &split_dir.join(&path), sample_rate)?;
            Some(path)
        }
        None => None,
    };

    let stored = item.with_audio_paths(mix_path, ground_truth_path)?;
    writer.append(&stored.to_record()?)?;
    debug!("Wrote item {}", uuid);
    Ok(uuid)
}

/// Writes in-memory audio as 24-bit WAV, or copies an existing file.
fn store_audio(audio: &AudioData, dest: &Path, sample_rate: u32) -> DatasetResult<()> {
    match audio {
        AudioData::Waveform(waveform) => {
            write_wav_file(dest, waveform, sample_rate, DEFAULT_BITS_PER_SAMPLE)?;
        }
        AudioData::Path(source) => {
            fs::copy(source, dest)?;
        }
    }
    Ok(())
}
