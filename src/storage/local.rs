//! File-backed Local Storage
//!
//! Keeps every key in one JSON object file under the data directory.
//! Writes go through a temp file and a rename so a crash never leaves a
//! half-written file behind.

use super::KeyValueStore;
use crate::types::{AppError, AppResult};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const STORAGE_FILE: &str = "local_storage.json";

/// Local storage manager
#[derive(Debug)]
pub struct LocalStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl LocalStore {
    /// Open the store in `base_dir`, creating nothing until the first write
    pub fn open(base_dir: &Path) -> Self {
        let path = base_dir.join(STORAGE_FILE);
        let entries = Self::read_entries(&path);
        Self { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(path: &Path) -> BTreeMap<String, String> {
        if !path.exists() {
            info!("No local storage file found, starting empty");
            return BTreeMap::new();
        }

        let data = match fs::read(path) {
            Ok(data) => data,
            Err(e) => {
                warn!("Failed to read {:?}: {}", path, e);
                return BTreeMap::new();
            }
        };

        match serde_json::from_slice(&data) {
            Ok(entries) => {
                debug!("Loaded local storage from {:?}", path);
                entries
            }
            Err(e) => {
                warn!("Local storage at {:?} is corrupt, ignoring it: {}", path, e);
                BTreeMap::new()
            }
        }
    }

    fn flush(&self) -> AppResult<()> {
        let dir = self
            .path
            .parent()
            .ok_or_else(|| AppError::Storage(format!("{:?} has no parent", self.path)))?;
        fs::create_dir_all(dir)?;

        let tmp_path = dir.join(format!("{}.tmp", STORAGE_FILE));
        let bytes = serde_json::to_vec_pretty(&self.entries)?;
        fs::write(&tmp_path, bytes)?;

        if let Err(rename_err) = fs::rename(&tmp_path, &self.path) {
            if self.path.exists() {
                fs::remove_file(&self.path)?;
                fs::rename(&tmp_path, &self.path)?;
            } else {
                return Err(rename_err.into());
            }
        }
        Ok(())
    }
}

impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> AppResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove(&mut self, key: &str) -> AppResult<()> {
        if self.entries.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}
