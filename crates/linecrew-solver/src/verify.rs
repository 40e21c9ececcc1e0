//! Independent re-check of an assignment against its model
//!
//! Works from the grouped result only, not from solver state, so it also
//! catches mistakes in building the result.

use std::collections::{HashMap, HashSet};

use linecrew_core::{AssignmentResult, ConstraintModel, TaskId, WorkerId};
use thiserror::Error;

/// A broken rule in an assignment
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("{task} has {assigned} distinct worker(s), needs exactly {required}")]
    Headcount {
        task: TaskId,
        required: u32,
        assigned: usize,
    },

    #[error("{task} is not an active task")]
    UnknownTask { task: TaskId },

    #[error("{task} is missing from the result")]
    MissingTask { task: TaskId },

    #[error("worker {worker} on {task} is not available")]
    Unavailable { task: TaskId, worker: WorkerId },

    #[error("worker {worker} on {task} is not eligible for it")]
    Ineligible { task: TaskId, worker: WorkerId },

    #[error("worker {worker} has {load} task(s), cap is {max}")]
    Overloaded { worker: WorkerId, load: usize, max: u32 },

    #[error("worker {worker} covers {canonical} more than once: {}", .tasks.join(", "))]
    FamilyRepeat {
        worker: WorkerId,
        canonical: String,
        tasks: Vec<TaskId>,
    },
}

/// Every violation of `result` against `model`; empty means valid
pub fn verify(model: &ConstraintModel, result: &AssignmentResult) -> Vec<Violation> {
    let mut violations = Vec::new();

    let task_index: HashMap<&str, usize> = model
        .tasks()
        .iter()
        .enumerate()
        .map(|(t, active)| (active.task.id.as_str(), t))
        .collect();
    let worker_index: HashMap<WorkerId, usize> = model
        .workers()
        .iter()
        .enumerate()
        .map(|(w, worker)| (worker.id, w))
        .collect();

    let mut seen_tasks = HashSet::new();
    let mut worker_tasks: HashMap<WorkerId, Vec<&str>> = HashMap::new();

    for assignment in result.iter() {
        let task = assignment.task_id.as_str();
        let Some(&t) = task_index.get(task) else {
            violations.push(Violation::UnknownTask { task: task.into() });
            continue;
        };
        seen_tasks.insert(t);

        let distinct: HashSet<WorkerId> = assignment.workers.iter().map(|w| w.id).collect();
        let required = model.tasks()[t].task.required;
        if distinct.len() != required as usize {
            violations.push(Violation::Headcount {
                task: task.into(),
                required,
                assigned: distinct.len(),
            });
        }

        for worker in &distinct {
            match worker_index.get(worker) {
                None => violations.push(Violation::Unavailable {
                    task: task.into(),
                    worker: *worker,
                }),
                Some(&w) if !model.is_candidate(w, t) => violations.push(Violation::Ineligible {
                    task: task.into(),
                    worker: *worker,
                }),
                Some(_) => {}
            }
            worker_tasks.entry(*worker).or_default().push(task);
        }
    }

    for (t, active) in model.tasks().iter().enumerate() {
        if !seen_tasks.contains(&t) {
            violations.push(Violation::MissingTask {
                task: active.task.id.clone(),
            });
        }
    }

    let mut loads: Vec<(&WorkerId, &Vec<&str>)> = worker_tasks.iter().collect();
    loads.sort_by_key(|(id, _)| **id);
    for (worker, tasks) in loads {
        if tasks.len() > model.max_load() as usize {
            violations.push(Violation::Overloaded {
                worker: *worker,
                load: tasks.len(),
                max: model.max_load(),
            });
        }
    }

    for family in model.families() {
        let worker = model.workers()[family.worker].id;
        let Some(assigned) = worker_tasks.get(&worker) else {
            continue;
        };
        let repeated: Vec<TaskId> = family
            .vars
            .iter()
            .map(|&var| model.tasks()[model.candidates()[var].task].task.id.as_str())
            .filter(|id| assigned.contains(id))
            .map(String::from)
            .collect();
        if repeated.len() > 1 {
            violations.push(Violation::FamilyRepeat {
                worker,
                canonical: family.canonical.clone(),
                tasks: repeated,
            });
        }
    }

    violations
}
