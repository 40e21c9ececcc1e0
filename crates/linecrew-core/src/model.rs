//! Constraint model
//!
//! Turns a roster, a task catalog and the run parameters into the boolean
//! problem a solver works on:
//!
//! - one decision variable per eligible (worker, task) pair; ineligible pairs
//!   get no variable and can never be assigned
//! - **Headcount**: exactly `required` variables of each task are true
//! - **LoadCap**: at most `max_load` variables of each worker are true
//! - **FamilyExclusive**: at most one variable of each non-exempt
//!   (worker, canonical name) family is true
//!
//! The model owns copies of the available workers and active tasks, so one
//! solve never observes changes made to the caller's records.

use crate::naming::LineGroup;
use crate::policy::AssignmentPolicy;
use crate::{
    AssignedWorker, AssignmentResult, Bottleneck, CapacityShortfall, InputError, RunParameters, Task,
    TaskAssignment, TaskId, Worker, WorkerId,
};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Active tasks split by production line, catalog order preserved
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ActiveTasks<'a> {
    pub line2: Vec<&'a Task>,
    pub line3: Vec<&'a Task>,
    pub general: Vec<&'a Task>,
}

impl<'a> ActiveTasks<'a> {
    /// Line 2, then Line 3, then General
    pub fn iter(&self) -> impl Iterator<Item = &'a Task> + '_ {
        self.line2
            .iter()
            .chain(&self.line3)
            .chain(&self.general)
            .copied()
    }

    pub fn len(&self) -> usize {
        self.line2.len() + self.line3.len() + self.general.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Drop disabled tasks and partition the rest by line
pub fn active_tasks<'a>(all: &'a [Task], disabled: &BTreeSet<TaskId>) -> ActiveTasks<'a> {
    let mut active = ActiveTasks::default();
    for task in all.iter().filter(|t| !disabled.contains(&t.id)) {
        match task.group() {
            LineGroup::Line2 => active.line2.push(task),
            LineGroup::Line3 => active.line3.push(task),
            LineGroup::General => active.general.push(task),
        }
    }
    active
}

/// A task taking part in this run
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActiveTask {
    pub task: Task,
    pub canonical: String,
    pub group: LineGroup,
    /// Variant tokens a worker must hold for this task (empty unless variant mode)
    pub variant_tokens: Vec<String>,
}

/// Decision variable: `worker` (index into `workers()`) works `task`
/// (index into `tasks()`)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Candidate {
    pub worker: usize,
    pub task: usize,
}

/// Variables of one worker sharing a non-exempt canonical name
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Family {
    pub worker: usize,
    pub canonical: String,
    pub vars: Vec<usize>,
}

/// Constraint enumeration, for diagnostics and verification
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Constraint {
    /// Exactly `required` workers on `task`
    Headcount { task: TaskId, required: u32 },
    /// At most `max` tasks for `worker`
    LoadCap { worker: WorkerId, max: u32 },
    /// At most one of `tasks` for `worker`
    FamilyExclusive {
        worker: WorkerId,
        canonical: String,
        tasks: Vec<TaskId>,
    },
}

impl std::fmt::Display for Constraint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Constraint::Headcount { task, required } => {
                write!(f, "{} needs exactly {} worker(s)", task, required)
            }
            Constraint::LoadCap { worker, max } => {
                write!(f, "worker {} takes at most {} task(s)", worker, max)
            }
            Constraint::FamilyExclusive {
                worker,
                canonical,
                tasks,
            } => write!(
                f,
                "worker {} covers at most one {} task ({})",
                worker,
                canonical,
                tasks.join(", ")
            ),
        }
    }
}

/// The boolean problem for one run
#[derive(Clone, Debug)]
pub struct ConstraintModel {
    workers: Vec<Worker>,
    tasks: Vec<ActiveTask>,
    candidates: Vec<Candidate>,
    task_vars: Vec<Vec<usize>>,
    worker_vars: Vec<Vec<usize>>,
    families: Vec<Family>,
    var_family: Vec<Option<usize>>,
    max_load: u32,
    variant_mode: bool,
}

impl ConstraintModel {
    /// Validate the input and build the model.
    ///
    /// Duplicate ids, empty task ids and zero headcounts anywhere in the
    /// catalog are rejected, including on disabled tasks. Available or
    /// disabled ids that match nothing are ignored.
    pub fn build(
        workers: &[Worker],
        tasks: &[Task],
        params: &RunParameters,
        policy: &AssignmentPolicy,
    ) -> Result<Self, InputError> {
        validate(workers, tasks)?;

        for id in &params.available {
            if !workers.iter().any(|w| w.id == *id) {
                tracing::warn!(worker = id, "available worker not in roster, ignoring");
            }
        }
        for id in &params.disabled {
            if !tasks.iter().any(|t| &t.id == id) {
                tracing::warn!(task = %id, "disabled task not in catalog, ignoring");
            }
        }

        let workers: Vec<Worker> = workers
            .iter()
            .filter(|w| params.available.contains(&w.id))
            .cloned()
            .collect();

        let tasks: Vec<ActiveTask> = active_tasks(tasks, &params.disabled)
            .iter()
            .map(|task| ActiveTask {
                canonical: policy.canonical_name(&task.id),
                group: task.group(),
                variant_tokens: policy.variant_tokens(task, params.variant_mode),
                task: task.clone(),
            })
            .collect();

        let mut candidates = Vec::new();
        let mut task_vars = vec![Vec::new(); tasks.len()];
        let mut worker_vars = vec![Vec::new(); workers.len()];
        for (t, active) in tasks.iter().enumerate() {
            for (w, worker) in workers.iter().enumerate() {
                if policy.is_eligible(worker, &active.task, params.variant_mode) {
                    let var = candidates.len();
                    candidates.push(Candidate { worker: w, task: t });
                    task_vars[t].push(var);
                    worker_vars[w].push(var);
                }
            }
        }

        let mut families = Vec::new();
        let mut var_family = vec![None; candidates.len()];
        for (w, vars) in worker_vars.iter().enumerate() {
            let mut by_name: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
            for &var in vars {
                let canonical = tasks[candidates[var].task].canonical.as_str();
                if !policy.is_exempt(canonical) {
                    by_name.entry(canonical).or_default().push(var);
                }
            }
            for (canonical, vars) in by_name {
                // A lone variable cannot clash with anything
                if vars.len() < 2 {
                    continue;
                }
                let index = families.len();
                for &var in &vars {
                    var_family[var] = Some(index);
                }
                families.push(Family {
                    worker: w,
                    canonical: canonical.to_string(),
                    vars,
                });
            }
        }

        Ok(Self {
            workers,
            tasks,
            candidates,
            task_vars,
            worker_vars,
            families,
            var_family,
            max_load: policy.max_load,
            variant_mode: params.variant_mode,
        })
    }

    /// Available workers, roster order
    pub fn workers(&self) -> &[Worker] {
        &self.workers
    }

    /// Active tasks: Line 2, Line 3, General, catalog order within each
    pub fn tasks(&self) -> &[ActiveTask] {
        &self.tasks
    }

    /// Decision variables
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Variables of task `t`, in roster order
    pub fn task_vars(&self, t: usize) -> &[usize] {
        &self.task_vars[t]
    }

    /// Variables of worker `w`, in task order
    pub fn worker_vars(&self, w: usize) -> &[usize] {
        &self.worker_vars[w]
    }

    pub fn families(&self) -> &[Family] {
        &self.families
    }

    /// Family a variable belongs to, if any
    pub fn family_of(&self, var: usize) -> Option<usize> {
        self.var_family[var]
    }

    pub fn max_load(&self) -> u32 {
        self.max_load
    }

    pub fn variant_mode(&self) -> bool {
        self.variant_mode
    }

    /// Whether worker index `w` may be placed on task index `t`
    pub fn is_candidate(&self, w: usize, t: usize) -> bool {
        self.task_vars[t]
            .iter()
            .any(|&var| self.candidates[var].worker == w)
    }

    /// Sum of all headcounts
    pub fn total_required(&self) -> u64 {
        self.tasks.iter().map(|t| u64::from(t.task.required)).sum()
    }

    /// Tasks with fewer eligible workers than they require
    pub fn bottlenecks(&self) -> Vec<Bottleneck> {
        self.tasks
            .iter()
            .enumerate()
            .filter(|(t, active)| (self.task_vars[*t].len() as u64) < u64::from(active.task.required))
            .map(|(t, active)| Bottleneck {
                task_id: active.task.id.clone(),
                required: active.task.required,
                candidates: self.task_vars[t].len() as u32,
            })
            .collect()
    }

    /// Most tasks worker `w` can take: the load cap, and one seat per
    /// family plus one per variable outside any family
    pub fn worker_capacity(&self, w: usize) -> u32 {
        let mut families: Vec<usize> = Vec::new();
        let mut seats = 0u32;
        for &var in &self.worker_vars[w] {
            match self.var_family[var] {
                None => seats += 1,
                Some(f) if !families.contains(&f) => {
                    families.push(f);
                    seats += 1;
                }
                Some(_) => {}
            }
        }
        seats.min(self.max_load)
    }

    /// Set when the headcounts add up to more than every worker's capacity
    pub fn capacity_shortfall(&self) -> Option<CapacityShortfall> {
        let required = self.total_required();
        let capacity: u64 = (0..self.workers.len())
            .map(|w| u64::from(self.worker_capacity(w)))
            .sum();
        (capacity < required).then_some(CapacityShortfall { required, capacity })
    }

    /// Every counting constraint of the model
    pub fn constraints(&self) -> Vec<Constraint> {
        let mut constraints: Vec<Constraint> = self
            .tasks
            .iter()
            .map(|active| Constraint::Headcount {
                task: active.task.id.clone(),
                required: active.task.required,
            })
            .collect();

        constraints.extend(self.workers.iter().map(|worker| Constraint::LoadCap {
            worker: worker.id,
            max: self.max_load,
        }));

        constraints.extend(self.families.iter().map(|family| Constraint::FamilyExclusive {
            worker: self.workers[family.worker].id,
            canonical: family.canonical.clone(),
            tasks: family
                .vars
                .iter()
                .map(|&var| self.tasks[self.candidates[var].task].task.id.clone())
                .collect(),
        }));

        constraints
    }

    /// Group the variables set in `chosen` into an assignment result.
    ///
    /// `chosen` is indexed by variable; tasks keep catalog order and workers
    /// keep roster order.
    pub fn assignment_from(&self, chosen: &[bool]) -> AssignmentResult {
        let mut result = AssignmentResult::default();
        for (t, active) in self.tasks.iter().enumerate() {
            let workers = self.task_vars[t]
                .iter()
                .filter(|&&var| chosen.get(var).copied().unwrap_or(false))
                .map(|&var| {
                    let worker = &self.workers[self.candidates[var].worker];
                    AssignedWorker {
                        id: worker.id,
                        name: worker.name.clone(),
                    }
                })
                .collect();
            result.group_mut(active.group).push(TaskAssignment {
                task_id: active.task.id.clone(),
                required: active.task.required,
                workers,
            });
        }
        result
    }
}

fn validate(workers: &[Worker], tasks: &[Task]) -> Result<(), InputError> {
    let mut seen_workers = HashSet::new();
    for worker in workers {
        if !seen_workers.insert(worker.id) {
            return Err(InputError::DuplicateWorker(worker.id));
        }
    }

    let mut seen_tasks = HashSet::new();
    for task in tasks {
        if task.id.is_empty() {
            return Err(InputError::EmptyTaskId);
        }
        if !seen_tasks.insert(task.id.as_str()) {
            return Err(InputError::DuplicateTask(task.id.clone()));
        }
        if task.required == 0 {
            return Err(InputError::ZeroHeadcount(task.id.clone()));
        }
    }
    Ok(())
}
