//! Default locations under the user data directory.

use std::path::{Path, PathBuf};

/// Application directory name.
pub const APP_DIR: &str = "misophonia";

/// File name of the default source configuration.
pub const SOURCE_CONFIG_FILE: &str = "sources.json";

/// Directory generated datasets are saved under by default.
pub const DATASETS_DIR: &str = "datasets";

/// `{data_dir}/misophonia`, or `./misophonia` when the platform has no data directory.
pub fn app_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

/// Returns `explicit` or the default source configuration path.
pub fn source_config(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(|| app_dir().join(SOURCE_CONFIG_FILE))
}

/// Returns `explicit` or the default dataset directory.
pub fn save_dir(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(|| app_dir().join(DATASETS_DIR))
}
