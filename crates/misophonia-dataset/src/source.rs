//! Source dataset adapters.
//!
//! An adapter exposes a locally stored collection of labelled sounds as
//! standardized [`SourceDataItem`]s. Adapters are chosen by a JSON
//! [`SourceConfig`] rather than compiled in:
//!
//! ```json
//! {
//!   "sources": [
//!     { "kind": "manifest", "name": "FOAMS", "path": "foams/items.jsonl" },
//!     { "kind": "folder", "name": "ESC50", "root": "esc50", "license_table": "esc50/licenses.json" }
//!   ]
//! }
//! ```
//!
//! Relative paths in the configuration resolve against the configuration
//! file's directory.

use std::collections::BTreeMap;
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use misophonia_spec::{LabelType, License, SourceDataItem, Split};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{DatasetError, DatasetResult};

/// A source of labelled sounds.
pub trait SourceData: Send + Sync {
    /// Dataset name as written into each item's `source_dataset`.
    fn name(&self) -> &str;

    /// Returns true if the data is available locally.
    fn is_downloaded(&self) -> bool;

    /// Makes the data available locally. Calling it again is a no-op.
    fn download_data(&self) -> DatasetResult<()>;

    /// Returns every item of the dataset across all splits.
    fn get_metadata(&self) -> DatasetResult<Vec<SourceDataItem>>;
}

/// Reads standardized items from a JSON Lines manifest.
///
/// Relative `file_path`s resolve against the manifest's directory.
#[derive(Debug, Clone)]
pub struct ManifestSource {
    name: String,
    path: PathBuf,
}

impl ManifestSource {
    /// Creates a manifest source.
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

impl SourceData for ManifestSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_downloaded(&self) -> bool {
        self.path.is_file()
    }

    fn download_data(&self) -> DatasetResult<()> {
        if self.is_downloaded() {
            return Ok(());
        }
        Err(DatasetError::unavailable(
            &self.name,
            format!("manifest '{}' not found", self.path.display()),
        ))
    }

    fn get_metadata(&self) -> DatasetResult<Vec<SourceDataItem>> {
        self.download_data()?;
        let base = self.path.parent().unwrap_or_else(|| Path::new("."));
        let reader = BufReader::new(fs::File::open(&self.path)?);

        let mut items = Vec::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let item = SourceDataItem::from_json(&line).map_err(|e| DatasetError::MetadataParse {
                path: self.path.clone(),
                line: index + 1,
                message: e.to_string(),
            })?;
            items.push(item.resolved_against(base));
        }
        debug!("Loaded {} items from manifest '{}'", items.len(), self.name);
        Ok(items)
    }
}

/// Freesound licenses keyed by freesound id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LicenseTable {
    licenses: BTreeMap<u64, License>,
}

impl LicenseTable {
    /// Loads a `{"<freesound id>": License}` JSON file.
    pub fn load(path: &Path) -> DatasetResult<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Adds an entry.
    pub fn insert(&mut self, freesound_id: u64, license: License) {
        self.licenses.insert(freesound_id, license);
    }

    /// License for an id, or the "Unknown Author" placeholder.
    pub fn lookup(&self, freesound_id: Option<u64>) -> License {
        freesound_id
            .and_then(|id| self.licenses.get(&id))
            .cloned()
            .unwrap_or_else(License::unknown)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.licenses.len()
    }

    /// Returns true if the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.licenses.is_empty()
    }
}

/// Reads sounds laid out as `{root}/{split}/{label_type}/{label}/{file}.wav`.
///
/// A numeric file stem is taken as the freesound id and looked up in the
/// license table.
#[derive(Debug, Clone)]
pub struct FolderSource {
    name: String,
    root: PathBuf,
    licenses: LicenseTable,
    dataset_license: Option<License>,
}

impl FolderSource {
    /// Creates a folder source without license information.
    pub fn new(name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            root: root.into(),
            licenses: LicenseTable::default(),
            dataset_license: None,
        }
    }

    /// Sets the per-sound license table.
    pub fn with_licenses(mut self, licenses: LicenseTable) -> Self {
        self.licenses = licenses;
        self
    }

    /// Sets the license of the dataset as a whole.
    pub fn with_dataset_license(mut self, license: License) -> Self {
        self.dataset_license = Some(license);
        self
    }

    fn item_for(&self, path: &Path) -> DatasetResult<Option<SourceDataItem>> {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        let parts: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        let [split, label_type, label, _file] = parts.as_slice() else {
            return Ok(None);
        };
        let (Ok(split), Ok(label_type)) = (split.parse::<Split>(), label_type.parse::<LabelType>())
        else {
            warn!("Skipping '{}': unrecognized split or label type", path.display());
            return Ok(None);
        };

        let freesound_id = path
            .file_stem()
            .and_then(|s| s.to_str())
            .and_then(|s| s.parse::<u64>().ok());

        let mut builder = SourceDataItem::builder(split, &self.name, path, label_type)
            .label(label.as_str())
            .sound_license(self.licenses.lookup(freesound_id));
        if let Some(id) = freesound_id {
            builder = builder.freesound_id(id);
        }
        if let Some(license) = &self.dataset_license {
            builder = builder.dataset_license(license.clone());
        }
        Ok(Some(builder.build()?))
    }
}

impl SourceData for FolderSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_downloaded(&self) -> bool {
        self.root.is_dir()
    }

    fn download_data(&self) -> DatasetResult<()> {
        if self.is_downloaded() {
            return Ok(());
        }
        Err(DatasetError::unavailable(
            &self.name,
            format!("directory '{}' not found", self.root.display()),
        ))
    }

    fn get_metadata(&self) -> DatasetResult<Vec<SourceDataItem>> {
        self.download_data()?;

        let mut items = Vec::new();
        let walker = WalkDir::new(&self.root)
            .min_depth(4)
            .max_depth(4)
            .sort_by_file_name();
        for entry in walker {
            let entry = entry.map_err(|e| DatasetError::unavailable(&self.name, e.to_string()))?;
            let path = entry.path();
            let is_wav = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("wav"));
            if !entry.file_type().is_file() || !is_wav {
                continue;
            }
            if let Some(item) = self.item_for(path)? {
                items.push(item);
            }
        }
        debug!("Found {} items under '{}'", items.len(), self.root.display());
        Ok(items)
    }
}

/// One configured source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceEntry {
    /// A JSON Lines manifest of standardized items.
    Manifest {
        /// Dataset name.
        name: String,
        /// Manifest file.
        path: PathBuf,
    },
    /// A `{split}/{label_type}/{label}/*.wav` directory tree.
    Folder {
        /// Dataset name.
        name: String,
        /// Tree root.
        root: PathBuf,
        /// Optional freesound license table.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        license_table: Option<PathBuf>,
        /// Optional license of the whole dataset.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        dataset_license: Option<License>,
    },
}

impl SourceEntry {
    /// Dataset name.
    pub fn name(&self) -> &str {
        match self {
            SourceEntry::Manifest { name, .. } | SourceEntry::Folder { name, .. } => name,
        }
    }

    /// Builds the adapter, resolving relative paths against `base_dir`.
    pub fn build(&self, base_dir: &Path) -> DatasetResult<Box<dyn SourceData>> {
        let resolve = |p: &PathBuf| resolve_path(base_dir, p);
        match self {
            SourceEntry::Manifest { name, path } => {
                Ok(Box::new(ManifestSource::new(name, resolve(path))))
            }
            SourceEntry::Folder {
                name,
                root,
                license_table,
                dataset_license,
            } => {
                let mut source = FolderSource::new(name, resolve(root));
                if let Some(table) = license_table {
                    source = source.with_licenses(LicenseTable::load(&resolve(table))?);
                }
                if let Some(license) = dataset_license {
                    source = source.with_dataset_license(license.clone());
                }
                Ok(Box::new(source))
            }
        }
    }
}

fn resolve_path(base_dir: &Path, path: &Path) -> PathBuf {
    if path.is_relative() {
        base_dir.join(path)
    } else {
        path.to_path_buf()
    }
}

/// The set of configured source datasets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Configured sources, in order.
    pub sources: Vec<SourceEntry>,
    /// Directory relative paths resolve against.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl SourceConfig {
    /// Loads a configuration file.
    pub fn load(path: &Path) -> DatasetResult<Self> {
        let content = fs::read_to_string(path)?;
        let mut config: SourceConfig = serde_json::from_str(&content)?;
        config.base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Ok(config)
    }

    /// Names of all configured sources.
    pub fn names(&self) -> Vec<&str> {
        self.sources.iter().map(SourceEntry::name).collect()
    }

    /// Builds adapters for the named sources, or all sources if `names` is empty.
    ///
    /// Names match case-insensitively.
    pub fn build(&self, names: &[String]) -> DatasetResult<Vec<Box<dyn SourceData>>> {
        if names.is_empty() {
            return self
                .sources
                .iter()
                .map(|entry| entry.build(&self.base_dir))
                .collect();
        }
        names
            .iter()
            .map(|wanted| {
                let entry = self
                    .sources
                    .iter()
                    .find(|e| e.name().eq_ignore_ascii_case(wanted.trim()))
                    .ok_or_else(|| DatasetError::UnknownSource {
                        name: wanted.clone(),
                    })?;
                entry.build(&self.base_dir)
            })
            .collect()
    }
}
