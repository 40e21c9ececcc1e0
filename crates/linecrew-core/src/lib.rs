//! # linecrew-core
//!
//! Core domain model and traits for the linecrew assignment engine.
//!
//! This crate provides:
//! - Domain types: `Worker`, `Task`, `RunParameters`, `AssignmentResult`
//! - Task naming: canonical names, line groups, shift halves
//! - The constraint model handed to a solver (`ConstraintModel`)
//! - Core traits: `Assigner`, `Renderer`, `RosterStore`
//! - Error types and solve outcomes
//!
//! ## Example
//!
//! ```rust
//! use linecrew_core::{AssignmentPolicy, ConstraintModel, RunParameters, Task, Worker};
//!
//! let workers = vec![
//!     Worker::new(1, "Ana").qualify("plasma"),
//!     Worker::new(2, "Ben").qualify("leak_test"),
//! ];
//! let tasks = vec![
//!     Task::new("line2_plasma_1st_half", 1),
//!     Task::new("leak_test", 1),
//! ];
//! let params = RunParameters::all_available(&workers);
//!
//! let model = ConstraintModel::build(&workers, &tasks, &params, &AssignmentPolicy::default())
//!     .unwrap();
//! assert_eq!(model.tasks().len(), 2);
//! assert_eq!(model.candidates().len(), 2);
//! ```

pub mod model;
pub mod naming;
pub mod policy;
pub mod roster;
pub mod store;

pub use model::{active_tasks, ActiveTask, ActiveTasks, Candidate, Constraint, ConstraintModel, Family};
pub use naming::{canonical_name, LineGroup, ShiftHalf, TaskNaming};
pub use policy::{is_qualified, AssignmentPolicy, VariantRule};
pub use roster::{Roster, RosterError};
pub use store::{MemoryStore, RosterStore, StoreError};

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Duration;
use thiserror::Error;

// ============================================================================
// Type Aliases
// ============================================================================

/// Unique identifier for a worker
pub type WorkerId = u32;

/// Raw task identifier, e.g. `line3_coating_feed_2nd_half`
pub type TaskId = String;

// ============================================================================
// Worker
// ============================================================================

/// A person who can be placed on tasks they are signed off for
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Worker {
    /// Unique identifier
    pub id: WorkerId,
    /// Display name
    pub name: String,
    /// Free-form qualification tags
    #[serde(alias = "signed_off", default)]
    pub qualifications: BTreeSet<String>,
}

impl Worker {
    /// Create a worker with no qualifications
    pub fn new(id: WorkerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            qualifications: BTreeSet::new(),
        }
    }

    /// Add a qualification tag
    pub fn qualify(mut self, tag: impl Into<String>) -> Self {
        self.qualifications.insert(tag.into());
        self
    }

    /// Add several qualification tags
    pub fn qualify_all(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        for tag in tags {
            self.qualifications.insert(tag.into());
        }
        self
    }

    /// `Name (ID n)` as shown in rendered schedules
    pub fn label(&self) -> String {
        format!("{} (ID {})", self.name, self.id)
    }
}

// ============================================================================
// Task
// ============================================================================

/// A daily task that needs an exact number of workers
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Raw identifier encoding line, shift half and variant
    #[serde(alias = "name")]
    pub id: TaskId,
    /// Exact number of workers required
    pub required: u32,
}

impl Task {
    pub fn new(id: impl Into<String>, required: u32) -> Self {
        Self {
            id: id.into(),
            required,
        }
    }

    /// Line group derived from the raw identifier
    pub fn group(&self) -> LineGroup {
        LineGroup::of(&self.id)
    }

    /// Shift half derived from the raw identifier
    pub fn half(&self) -> ShiftHalf {
        ShiftHalf::of(&self.id)
    }
}

// ============================================================================
// Run Parameters
// ============================================================================

/// Per-run inputs supplied by the caller
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunParameters {
    /// Workers present today
    pub available: BTreeSet<WorkerId>,
    /// Tasks taken offline for the day
    pub disabled: BTreeSet<TaskId>,
    /// Variant production mode (e.g. 4-blade balloons)
    pub variant_mode: bool,
}

impl RunParameters {
    /// Every listed worker available, nothing disabled, variant mode off
    pub fn all_available(workers: &[Worker]) -> Self {
        Self {
            available: workers.iter().map(|w| w.id).collect(),
            disabled: BTreeSet::new(),
            variant_mode: false,
        }
    }

    /// Mark a worker as absent
    pub fn without_worker(mut self, id: WorkerId) -> Self {
        self.available.remove(&id);
        self
    }

    /// Take a task offline
    pub fn disable(mut self, task: impl Into<String>) -> Self {
        self.disabled.insert(task.into());
        self
    }

    /// Set variant production mode
    pub fn variant_mode(mut self, on: bool) -> Self {
        self.variant_mode = on;
        self
    }
}

// ============================================================================
// Assignment Result
// ============================================================================

/// A worker placed on a task
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignedWorker {
    pub id: WorkerId,
    pub name: String,
}

impl AssignedWorker {
    pub fn label(&self) -> String {
        format!("{} (ID {})", self.name, self.id)
    }
}

/// Workers bound to one task
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskAssignment {
    pub task_id: TaskId,
    pub required: u32,
    pub workers: Vec<AssignedWorker>,
}

/// A complete, valid assignment grouped by line
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentResult {
    pub line2: Vec<TaskAssignment>,
    pub line3: Vec<TaskAssignment>,
    pub general: Vec<TaskAssignment>,
}

impl AssignmentResult {
    /// Tasks of one line group, in catalog order
    pub fn group(&self, group: LineGroup) -> &[TaskAssignment] {
        match group {
            LineGroup::Line2 => &self.line2,
            LineGroup::Line3 => &self.line3,
            LineGroup::General => &self.general,
        }
    }

    pub(crate) fn group_mut(&mut self, group: LineGroup) -> &mut Vec<TaskAssignment> {
        match group {
            LineGroup::Line2 => &mut self.line2,
            LineGroup::Line3 => &mut self.line3,
            LineGroup::General => &mut self.general,
        }
    }

    /// All task assignments across groups
    pub fn iter(&self) -> impl Iterator<Item = &TaskAssignment> {
        self.line2.iter().chain(&self.line3).chain(&self.general)
    }

    /// Look up the assignment for a raw task id
    pub fn task(&self, task_id: &str) -> Option<&TaskAssignment> {
        self.iter().find(|t| t.task_id == task_id)
    }

    /// Number of tasks a worker was placed on
    pub fn load_of(&self, worker: WorkerId) -> usize {
        self.iter()
            .filter(|t| t.workers.iter().any(|w| w.id == worker))
            .count()
    }

    /// Raw ids of the tasks a worker was placed on
    pub fn tasks_of(&self, worker: WorkerId) -> Vec<&str> {
        self.iter()
            .filter(|t| t.workers.iter().any(|w| w.id == worker))
            .map(|t| t.task_id.as_str())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.line2.is_empty() && self.line3.is_empty() && self.general.is_empty()
    }

    /// Append a task assignment to the group its id belongs to
    pub fn push(&mut self, assignment: TaskAssignment) {
        let group = LineGroup::of(&assignment.task_id);
        self.group_mut(group).push(assignment);
    }
}

// ============================================================================
// Solve Outcome
// ============================================================================

/// A task that cannot reach its headcount even before searching
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bottleneck {
    pub task_id: TaskId,
    pub required: u32,
    /// Eligible, available workers for the task
    pub candidates: u32,
}

/// More seats than the available workers can fill, counting each worker's
/// load cap and at most one task per non-exempt family
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityShortfall {
    /// Sum of headcounts
    pub required: u64,
    pub capacity: u64,
}

/// Proof of infeasibility, with whatever diagnostics the solver gathered
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Infeasibility {
    /// Tasks short of eligible workers (empty when the conflict is combinatorial)
    pub bottlenecks: Vec<Bottleneck>,
    /// Set when the whole day is short of seats
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<CapacityShortfall>,
}

/// Which search budget ran out
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LimitHit {
    Backtracks(u64),
    TimeLimit(Duration),
}

impl std::fmt::Display for LimitHit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LimitHit::Backtracks(n) => write!(f, "backtrack limit of {} reached", n),
            LimitHit::TimeLimit(d) => write!(f, "time limit of {}ms reached", d.as_millis()),
        }
    }
}

/// Result of one solve call
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SolveOutcome {
    /// Every constraint holds
    Feasible(AssignmentResult),
    /// Proven: no assignment satisfies the constraints
    Infeasible(Infeasibility),
    /// Search stopped at a budget without a proof either way
    Exhausted(LimitHit),
}

impl SolveOutcome {
    pub fn is_feasible(&self) -> bool {
        matches!(self, SolveOutcome::Feasible(_))
    }

    pub fn is_infeasible(&self) -> bool {
        matches!(self, SolveOutcome::Infeasible(_))
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, SolveOutcome::Exhausted(_))
    }

    /// The assignment, if one was found
    pub fn assignment(&self) -> Option<&AssignmentResult> {
        match self {
            SolveOutcome::Feasible(result) => Some(result),
            _ => None,
        }
    }
}

/// Search effort counters
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Decision variables in the model
    pub variables: usize,
    /// Branching decisions taken
    pub decisions: u64,
    /// Branches abandoned after a contradiction
    pub backtracks: u64,
    /// Variables fixed by propagation
    pub propagations: u64,
    pub elapsed: Duration,
}

impl std::ops::AddAssign for SearchStats {
    fn add_assign(&mut self, rhs: Self) {
        self.variables += rhs.variables;
        self.decisions += rhs.decisions;
        self.backtracks += rhs.backtracks;
        self.propagations += rhs.propagations;
        self.elapsed = self.elapsed.max(rhs.elapsed);
    }
}

/// Outcome plus the effort it took
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SolveReport {
    pub outcome: SolveOutcome,
    pub stats: SearchStats,
}

// ============================================================================
// Traits
// ============================================================================

/// Core assignment abstraction
pub trait Assigner: Send + Sync {
    /// Build the constraint model for one run and solve it
    fn assign(
        &self,
        workers: &[Worker],
        tasks: &[Task],
        params: &RunParameters,
    ) -> Result<SolveReport, AssignError>;
}

/// Output rendering
pub trait Renderer {
    type Output;

    /// Render an assignment to the output format
    fn render(&self, result: &AssignmentResult) -> Result<Self::Output, RenderError>;
}

// ============================================================================
// Errors
// ============================================================================

/// Malformed run input, rejected before solving
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("Duplicate worker id: {0}")]
    DuplicateWorker(WorkerId),

    #[error("Duplicate task id: {0}")]
    DuplicateTask(TaskId),

    #[error("Task {0} must require at least one worker")]
    ZeroHeadcount(TaskId),

    #[error("Task id must not be empty")]
    EmptyTaskId,
}

/// Assignment error
#[derive(Debug, Error)]
pub enum AssignError {
    #[error("Malformed input: {0}")]
    MalformedInput(#[from] InputError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Rendering error
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Format error: {0}")]
    Format(String),
}

// ============================================================================
// Tests
// ============================================================================
