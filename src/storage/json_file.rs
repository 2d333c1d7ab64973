use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Data directory not found")]
    DataDirNotFound,
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// Overrides the data directory (used by tests and portable installs)
const DATA_DIR_ENV: &str = "GHOST_NOTES_DATA_DIR";

/// Get the default data directory
pub fn default_data_dir() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV) {
        return Ok(PathBuf::from(dir));
    }
    dirs::data_local_dir()
        .map(|p| p.join("ghost-notes"))
        .ok_or(StorageError::DataDirNotFound)
}

/// Read a JSON document. Returns `Ok(None)` when the file does not exist.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value = serde_json::from_str(&content)?;
    Ok(Some(value))
}

/// Write a JSON document using atomic write (write to .tmp then rename)
pub fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp_path = path.with_extension("json.tmp");
    let json = serde_json::to_string_pretty(value)?;
    fs::write(&tmp_path, json)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Copy an unreadable document aside before it gets overwritten
///
/// The copy lands next to it as `<name>.corrupt` (numbered if one already
/// exists). Returns the backup path.
pub fn backup_corrupt(path: &Path) -> Result<PathBuf> {
    let mut backup = path.with_extension("json.corrupt");
    let mut n = 1;
    while backup.exists() {
        backup = path.with_extension(format!("json.corrupt.{}", n));
        n += 1;
    }
    fs::copy(path, &backup)?;
    Ok(backup)
}
