//! JSON files on disk
//!
//! A data directory holds `workers.json` and `tasks.json`, each a JSON array.
//! A missing file reads as an empty list; writes are pretty-printed.

use std::fs;
use std::path::{Path, PathBuf};

use linecrew_core::{RosterStore, StoreError, Task, Worker};
use serde::de::DeserializeOwned;

pub const WORKERS_FILE: &str = "workers.json";
pub const TASKS_FILE: &str = "tasks.json";

#[derive(Clone, Debug)]
pub struct JsonStore {
    dir: PathBuf,
}

impl JsonStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn workers_path(&self) -> PathBuf {
        self.dir.join(WORKERS_FILE)
    }

    pub fn tasks_path(&self) -> PathBuf {
        self.dir.join(TASKS_FILE)
    }

    fn read_list<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, StoreError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no file, starting empty");
            return Ok(Vec::new());
        }
        let text = fs::read_to_string(path)?;
        serde_json::from_str(&text)
            .map_err(|e| StoreError::Format(format!("{}: {}", path.display(), e)))
    }
}

impl RosterStore for JsonStore {
    fn load_workers(&self) -> Result<Vec<Worker>, StoreError> {
        Self::read_list(&self.workers_path())
    }

    fn load_tasks(&self) -> Result<Vec<Task>, StoreError> {
        Self::read_list(&self.tasks_path())
    }

    fn save_workers(&mut self, workers: &[Worker]) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_string_pretty(workers)
            .map_err(|e| StoreError::Format(e.to_string()))?;
        fs::write(self.workers_path(), json + "\n")?;
        tracing::debug!(count = workers.len(), "workers saved");
        Ok(())
    }
}
