//! # linecrew-solver
//!
//! Assignment solver for linecrew: constraint propagation with backtracking
//! over boolean worker-by-task variables.
//!
//! This crate provides:
//! - `BacktrackSolver`, an `Assigner` returning any feasible assignment
//! - Splitting into independent components, optionally solved in parallel
//! - Optional search budgets (backtracks, wall clock)
//! - `verify` to re-check an assignment against its model
//!
//! ## Example
//!
//! ```rust
//! use linecrew_core::{Assigner, RunParameters, SolveOutcome, Task, Worker};
//! use linecrew_solver::BacktrackSolver;
//!
//! let workers = vec![
//!     Worker::new(1, "Ana").qualify("plasma"),
//!     Worker::new(2, "Ben").qualify("plasma"),
//! ];
//! let tasks = vec![
//!     Task::new("line2_plasma_1st_half", 1),
//!     Task::new("line2_plasma_2nd_half", 1),
//! ];
//! let params = RunParameters::all_available(&workers);
//!
//! let report = BacktrackSolver::new().assign(&workers, &tasks, &params).unwrap();
//! assert!(matches!(report.outcome, SolveOutcome::Feasible(_)));
//! ```

mod components;
mod search;
pub mod verify;

pub use verify::{verify, Violation};

use std::time::{Duration, Instant};

use linecrew_core::{
    AssignError, Assigner, AssignmentPolicy, ConstraintModel, Infeasibility, LimitHit,
    RosterStore, RunParameters, SearchStats, SolveOutcome, SolveReport, Task, Worker,
};
use rayon::prelude::*;

use crate::search::{ComponentOutcome, Search};

/// Optional cut-offs for a search.
///
/// The backtrack budget applies to each independent component; the time
/// limit is measured from the start of the solve call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchLimits {
    pub max_backtracks: Option<u64>,
    pub time_limit: Option<Duration>,
}

impl SearchLimits {
    pub fn unlimited() -> Self {
        Self::default()
    }

    pub fn max_backtracks(mut self, max: u64) -> Self {
        self.max_backtracks = Some(max);
        self
    }

    pub fn time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }
}

/// Solver tuning
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SolverOptions {
    pub limits: SearchLimits,
    /// Search independent components separately
    pub split_components: bool,
    /// Search components on the rayon thread pool
    pub parallel: bool,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            limits: SearchLimits::default(),
            split_components: true,
            parallel: false,
        }
    }
}

/// Propagation + backtracking assignment solver
#[derive(Clone, Debug, Default)]
pub struct BacktrackSolver {
    pub policy: AssignmentPolicy,
    pub options: SolverOptions,
}

impl BacktrackSolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a non-default rule set
    pub fn with_policy(mut self, policy: AssignmentPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_limits(mut self, limits: SearchLimits) -> Self {
        self.options.limits = limits;
        self
    }

    pub fn with_options(mut self, options: SolverOptions) -> Self {
        self.options = options;
        self
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.options.parallel = parallel;
        self
    }

    /// Load records from a store and solve one run
    pub fn plan(
        &self,
        store: &impl RosterStore,
        params: &RunParameters,
    ) -> Result<SolveReport, AssignError> {
        let workers = store.load_workers()?;
        let tasks = store.load_tasks()?;
        self.assign(&workers, &tasks, params)
    }

    /// Solve an already built model
    pub fn solve_model(&self, model: &ConstraintModel) -> Result<SolveReport, AssignError> {
        let started = Instant::now();
        let _span = tracing::debug_span!(
            "solve",
            tasks = model.tasks().len(),
            workers = model.workers().len(),
            variables = model.candidates().len()
        )
        .entered();

        let bottlenecks = model.bottlenecks();
        for b in &bottlenecks {
            tracing::info!(
                task = %b.task_id,
                required = b.required,
                candidates = b.candidates,
                "not enough eligible workers"
            );
        }
        let capacity = if bottlenecks.is_empty() {
            model.capacity_shortfall()
        } else {
            None
        };
        if let Some(short) = capacity {
            tracing::info!(
                required = short.required,
                capacity = short.capacity,
                "more seats than the available workers can fill"
            );
        }
        if !bottlenecks.is_empty() || capacity.is_some() {
            return Ok(SolveReport {
                outcome: SolveOutcome::Infeasible(Infeasibility {
                    bottlenecks,
                    capacity,
                }),
                stats: SearchStats {
                    variables: model.candidates().len(),
                    elapsed: started.elapsed(),
                    ..SearchStats::default()
                },
            });
        }

        let components = if self.options.split_components {
            components::components(model)
        } else {
            vec![(0..model.tasks().len()).collect()]
        };
        tracing::debug!(components = components.len(), "searching");

        let limits = self.options.limits;
        let solve_one = |tasks: &Vec<usize>| Search::new(model, tasks, limits, started).run();

        let runs: Vec<(ComponentOutcome, SearchStats)> = if self.options.parallel {
            components.par_iter().map(solve_one).collect()
        } else {
            // An exhausted component does not decide the outcome while a
            // later one may still be infeasible
            let mut runs = Vec::with_capacity(components.len());
            for tasks in &components {
                let run = solve_one(tasks);
                let stop = run.0 == ComponentOutcome::Infeasible;
                runs.push(run);
                if stop {
                    break;
                }
            }
            runs
        };

        let mut stats = SearchStats::default();
        let mut chosen = vec![false; model.candidates().len()];
        let mut infeasible = false;
        let mut exhausted: Option<LimitHit> = None;
        for (outcome, run_stats) in runs {
            stats += run_stats;
            match outcome {
                ComponentOutcome::Solved(vars) => {
                    for var in vars {
                        chosen[var] = true;
                    }
                }
                ComponentOutcome::Infeasible => infeasible = true,
                ComponentOutcome::Exhausted(hit) => exhausted = exhausted.or(Some(hit)),
            }
        }
        stats.elapsed = started.elapsed();

        let outcome = if infeasible {
            SolveOutcome::Infeasible(Infeasibility::default())
        } else if let Some(hit) = exhausted {
            SolveOutcome::Exhausted(hit)
        } else {
            let result = model.assignment_from(&chosen);
            let violations = verify(model, &result);
            if let Some(first) = violations.first() {
                return Err(AssignError::Internal(format!(
                    "solver produced an invalid assignment: {first}"
                )));
            }
            SolveOutcome::Feasible(result)
        };

        match &outcome {
            SolveOutcome::Feasible(_) => tracing::info!(
                decisions = stats.decisions,
                backtracks = stats.backtracks,
                "assignment found"
            ),
            SolveOutcome::Infeasible(_) => tracing::info!(
                decisions = stats.decisions,
                backtracks = stats.backtracks,
                "no feasible assignment"
            ),
            SolveOutcome::Exhausted(hit) => tracing::warn!(%hit, "search stopped early"),
        }

        Ok(SolveReport { outcome, stats })
    }
}

impl Assigner for BacktrackSolver {
    fn assign(
        &self,
        workers: &[Worker],
        tasks: &[Task],
        params: &RunParameters,
    ) -> Result<SolveReport, AssignError> {
        let model = ConstraintModel::build(workers, tasks, params, &self.policy)?;
        self.solve_model(&model)
    }
}
