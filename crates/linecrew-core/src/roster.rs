//! Worker record management
//!
//! The roster is edited between runs (hiring, leaving, new sign-offs) and is
//! read-only while a solve is in progress.

use crate::{Task, Worker, WorkerId};
use thiserror::Error;

/// Roster edit error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RosterError {
    #[error("Name is required")]
    EmptyName,

    #[error("Worker id {0} is already in use")]
    DuplicateId(WorkerId),

    #[error("Worker not found: {0}")]
    UnknownWorker(WorkerId),

    #[error("Unknown task in qualification list: {0}")]
    UnknownTask(String),
}

/// Ordered collection of worker records
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Roster {
    workers: Vec<Worker>,
}

impl Roster {
    pub fn new(workers: Vec<Worker>) -> Self {
        Self { workers }
    }

    pub fn workers(&self) -> &[Worker] {
        &self.workers
    }

    pub fn into_workers(self) -> Vec<Worker> {
        self.workers
    }

    pub fn get(&self, id: WorkerId) -> Option<&Worker> {
        self.workers.iter().find(|w| w.id == id)
    }

    /// Add a worker; the name is trimmed and must not be blank
    pub fn add(&mut self, mut worker: Worker) -> Result<&Worker, RosterError> {
        let name = worker.name.trim();
        if name.is_empty() {
            return Err(RosterError::EmptyName);
        }
        worker.name = name.to_string();
        if self.get(worker.id).is_some() {
            return Err(RosterError::DuplicateId(worker.id));
        }
        self.workers.push(worker);
        Ok(&self.workers[self.workers.len() - 1])
    }

    /// Remove a worker, returning the removed record
    pub fn remove(&mut self, id: WorkerId) -> Result<Worker, RosterError> {
        let index = self
            .workers
            .iter()
            .position(|w| w.id == id)
            .ok_or(RosterError::UnknownWorker(id))?;
        Ok(self.workers.remove(index))
    }

    /// Change a worker's name, with the same rules as `add`
    pub fn rename(&mut self, id: WorkerId, name: &str) -> Result<&Worker, RosterError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RosterError::EmptyName);
        }
        let worker = self
            .workers
            .iter_mut()
            .find(|w| w.id == id)
            .ok_or(RosterError::UnknownWorker(id))?;
        worker.name = name.to_string();
        Ok(worker)
    }

    /// Replace a worker's qualifications.
    ///
    /// Every tag must be the id of a catalog task, matching how sign-offs are
    /// recorded through the editing UI.
    pub fn set_qualifications(
        &mut self,
        id: WorkerId,
        tags: impl IntoIterator<Item = String>,
        catalog: &[Task],
    ) -> Result<&Worker, RosterError> {
        let tags: Vec<String> = tags.into_iter().collect();
        if let Some(unknown) = tags.iter().find(|tag| !catalog.iter().any(|t| &t.id == *tag)) {
            return Err(RosterError::UnknownTask(unknown.clone()));
        }
        let worker = self
            .workers
            .iter_mut()
            .find(|w| w.id == id)
            .ok_or(RosterError::UnknownWorker(id))?;
        worker.qualifications = tags.into_iter().collect();
        Ok(worker)
    }
}
