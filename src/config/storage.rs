use std::path::PathBuf;
use std::sync::Mutex;

use super::models::{AppConfig, ConfigUpdate};
use crate::storage::{read_json, write_json_atomic, Result};

/// File-backed store for the app config (`config.json`)
pub struct ConfigStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles on the config file
    write_lock: Mutex<()>,
}

impl ConfigStore {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            path: data_dir.join("config.json"),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn try_load(&self) -> Result<AppConfig> {
        Ok(read_json(&self.path)?.unwrap_or_default())
    }

    /// Load the config, falling back to defaults if missing or unreadable
    pub fn load(&self) -> AppConfig {
        match self.try_load() {
            Ok(config) => config,
            Err(e) => {
                log::error!("Config: failed to read {:?}, using defaults: {}", self.path, e);
                AppConfig::default()
            }
        }
    }

    /// Overwrite the config file (best effort)
    pub fn save(&self, config: &AppConfig) {
        if let Err(e) = write_json_atomic(&self.path, config) {
            log::error!("Config: failed to write {:?}: {}", self.path, e);
        }
    }

    /// Merge a partial update into the stored config and return the result
    pub fn update(&self, update: ConfigUpdate) -> AppConfig {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut config = self.load();
        if config.apply(update) {
            self.save(&config);
        }
        config
    }
}
