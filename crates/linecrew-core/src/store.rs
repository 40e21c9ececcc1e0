//! Repository seam for worker and task records
//!
//! The engine never reaches for records on its own; callers hand it a store
//! (or plain slices) at call time.

use crate::{Task, Worker};
use thiserror::Error;

/// Store error
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Format error: {0}")]
    Format(String),
}

/// Source of worker and task records
pub trait RosterStore {
    fn load_workers(&self) -> Result<Vec<Worker>, StoreError>;

    fn load_tasks(&self) -> Result<Vec<Task>, StoreError>;

    fn save_workers(&mut self, workers: &[Worker]) -> Result<(), StoreError>;
}

/// In-memory store
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    pub workers: Vec<Worker>,
    pub tasks: Vec<Task>,
}

impl MemoryStore {
    pub fn new(workers: Vec<Worker>, tasks: Vec<Task>) -> Self {
        Self { workers, tasks }
    }
}

impl RosterStore for MemoryStore {
    fn load_workers(&self) -> Result<Vec<Worker>, StoreError> {
        Ok(self.workers.clone())
    }

    fn load_tasks(&self) -> Result<Vec<Task>, StoreError> {
        Ok(self.tasks.clone())
    }

    fn save_workers(&mut self, workers: &[Worker]) -> Result<(), StoreError> {
        self.workers = workers.to_vec();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trip() {
        let mut store = MemoryStore::new(vec![Worker::new(1, "a")], vec![Task::new("coil", 1)]);
        store
            .save_workers(&[Worker::new(1, "a"), Worker::new(2, "b")])
            .unwrap();
        assert_eq!(store.load_workers().unwrap().len(), 2);
        assert_eq!(store.load_tasks().unwrap(), vec![Task::new("coil", 1)]);
    }
}
