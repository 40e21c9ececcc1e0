//! Propagation and backtracking search
//!
//! Every variable is unknown, true or false. Assignments are recorded on a
//! trail so a failed branch can be undone exactly. After each assignment the
//! affected task, worker and family are queued and re-examined until nothing
//! else is forced:
//!
//! - a task with no headcount left forces its open candidates false
//! - a task whose open candidates equal its remaining headcount forces them true
//! - a worker at the load cap forces their open variables false
//! - a family with one true variable forces the others false
//! - a task needing more workers than it has open candidates is a contradiction
//! - so is a component whose missing headcount exceeds what its workers can
//!   still take (room under the load cap, one seat per untouched family)
//!
//! Branching picks the task with the fewest open candidates per missing
//! worker (ties broken by raw task id) and tries its first open candidate as
//! true, then as false.

use std::collections::VecDeque;
use std::time::Instant;

use linecrew_core::{ConstraintModel, LimitHit, SearchStats};

use crate::SearchLimits;

/// Raised when propagation or an assignment hits a contradiction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Conflict;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Watch {
    Task(usize),
    Worker(usize),
    Family(usize),
}

/// Open branch point
#[derive(Debug, Clone, Copy)]
struct Frame {
    var: usize,
    mark: usize,
    tried_false: bool,
}

/// How the search over one component ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ComponentOutcome {
    /// Variables set to true
    Solved(Vec<usize>),
    Infeasible,
    Exhausted(LimitHit),
}

pub(crate) struct Search<'m> {
    model: &'m ConstraintModel,
    /// Component tasks ordered by raw id
    tasks: Vec<usize>,
    workers: Vec<usize>,
    values: Vec<Option<bool>>,
    task_remaining: Vec<u32>,
    task_open: Vec<u32>,
    worker_load: Vec<u32>,
    family_taken: Vec<u32>,
    trail: Vec<usize>,
    queue: VecDeque<Watch>,
    limits: SearchLimits,
    started: Instant,
    stats: SearchStats,
}

impl<'m> Search<'m> {
    /// Search restricted to `tasks`, which must be closed under shared
    /// workers (no worker has variables both inside and outside the set)
    pub(crate) fn new(
        model: &'m ConstraintModel,
        tasks: &[usize],
        limits: SearchLimits,
        started: Instant,
    ) -> Self {
        let mut ordered = tasks.to_vec();
        ordered.sort_by(|&a, &b| model.tasks()[a].task.id.cmp(&model.tasks()[b].task.id));

        let mut workers: Vec<usize> = tasks
            .iter()
            .flat_map(|&t| model.task_vars(t))
            .map(|&var| model.candidates()[var].worker)
            .collect();
        workers.sort_unstable();
        workers.dedup();

        let task_count = model.tasks().len();
        let mut task_remaining = vec![0; task_count];
        let mut task_open = vec![0; task_count];
        for &t in tasks {
            task_remaining[t] = model.tasks()[t].task.required;
            task_open[t] = model.task_vars(t).len() as u32;
        }

        let variables = tasks.iter().map(|&t| model.task_vars(t).len()).sum();

        Self {
            model,
            tasks: ordered,
            workers,
            values: vec![None; model.candidates().len()],
            task_remaining,
            task_open,
            worker_load: vec![0; model.workers().len()],
            family_taken: vec![0; model.families().len()],
            trail: Vec::new(),
            queue: VecDeque::new(),
            limits,
            started,
            stats: SearchStats {
                variables,
                ..SearchStats::default()
            },
        }
    }

    /// Run to a solution, a proof of infeasibility, or a budget limit
    pub(crate) fn run(mut self) -> (ComponentOutcome, SearchStats) {
        let outcome = self.search();
        self.stats.elapsed = self.started.elapsed();
        (outcome, self.stats)
    }

    fn search(&mut self) -> ComponentOutcome {
        self.queue.extend(self.tasks.iter().map(|&t| Watch::Task(t)));
        self.queue.extend(self.workers.iter().map(|&w| Watch::Worker(w)));
        if self.propagate().is_err() {
            tracing::debug!("contradiction during root propagation");
            return ComponentOutcome::Infeasible;
        }

        let mut stack: Vec<Frame> = Vec::new();
        loop {
            let Some(var) = self.select_branch() else {
                return ComponentOutcome::Solved(self.true_vars());
            };
            if let Some(hit) = self.limit_hit() {
                return ComponentOutcome::Exhausted(hit);
            }

            self.stats.decisions += 1;
            stack.push(Frame {
                var,
                mark: self.trail.len(),
                tried_false: false,
            });
            if self.try_value(var, true) {
                continue;
            }

            loop {
                let Some(frame) = stack.last_mut() else {
                    return ComponentOutcome::Infeasible;
                };
                self.undo(frame.mark);
                if frame.tried_false {
                    stack.pop();
                    continue;
                }
                frame.tried_false = true;
                let var = frame.var;

                self.stats.backtracks += 1;
                if let Some(hit) = self.limit_hit() {
                    return ComponentOutcome::Exhausted(hit);
                }
                if self.try_value(var, false) {
                    break;
                }
            }
        }
    }

    fn limit_hit(&self) -> Option<LimitHit> {
        if let Some(max) = self.limits.max_backtracks {
            if self.stats.backtracks > max {
                return Some(LimitHit::Backtracks(max));
            }
        }
        if let Some(limit) = self.limits.time_limit {
            if self.started.elapsed() >= limit {
                return Some(LimitHit::TimeLimit(limit));
            }
        }
        None
    }

    /// Most constrained task with headcount still missing, and its first
    /// open candidate
    fn select_branch(&self) -> Option<usize> {
        let mut best: Option<usize> = None;
        for &t in &self.tasks {
            let remaining = u64::from(self.task_remaining[t]);
            if remaining == 0 {
                continue;
            }
            let open = u64::from(self.task_open[t]);
            let better = match best {
                None => true,
                Some(b) => {
                    open * u64::from(self.task_remaining[b])
                        < u64::from(self.task_open[b]) * remaining
                }
            };
            if better {
                best = Some(t);
            }
        }

        let t = best?;
        self.model
            .task_vars(t)
            .iter()
            .copied()
            .find(|&var| self.values[var].is_none())
    }

    fn true_vars(&self) -> Vec<usize> {
        self.values
            .iter()
            .enumerate()
            .filter(|(_, value)| **value == Some(true))
            .map(|(var, _)| var)
            .collect()
    }

    fn try_value(&mut self, var: usize, value: bool) -> bool {
        let consistent = self.assign(var, value).and_then(|()| self.propagate());
        if consistent.is_err() {
            self.queue.clear();
        }
        consistent.is_ok()
    }

    fn assign(&mut self, var: usize, value: bool) -> Result<(), Conflict> {
        match self.values[var] {
            Some(current) if current == value => return Ok(()),
            Some(_) => return Err(Conflict),
            None => {}
        }

        let candidate = self.model.candidates()[var];
        let family = self.model.family_of(var);
        if value {
            if self.task_remaining[candidate.task] == 0
                || self.worker_load[candidate.worker] >= self.model.max_load()
                || family.is_some_and(|f| self.family_taken[f] > 0)
            {
                return Err(Conflict);
            }
            self.task_remaining[candidate.task] -= 1;
            self.worker_load[candidate.worker] += 1;
            if let Some(f) = family {
                self.family_taken[f] += 1;
            }
        }
        self.task_open[candidate.task] -= 1;
        self.values[var] = Some(value);
        self.trail.push(var);

        self.queue.push_back(Watch::Task(candidate.task));
        if value {
            self.queue.push_back(Watch::Worker(candidate.worker));
            if let Some(f) = family {
                self.queue.push_back(Watch::Family(f));
            }
        }
        Ok(())
    }

    /// Revert every assignment made after `mark`
    fn undo(&mut self, mark: usize) {
        while self.trail.len() > mark {
            let Some(var) = self.trail.pop() else { break };
            let candidate = self.model.candidates()[var];
            if self.values[var].take() == Some(true) {
                self.task_remaining[candidate.task] += 1;
                self.worker_load[candidate.worker] -= 1;
                if let Some(f) = self.model.family_of(var) {
                    self.family_taken[f] -= 1;
                }
            }
            self.task_open[candidate.task] += 1;
        }
    }

    fn propagate(&mut self) -> Result<(), Conflict> {
        let model = self.model;
        while let Some(watch) = self.queue.pop_front() {
            match watch {
                Watch::Task(t) => {
                    let remaining = self.task_remaining[t];
                    let open = self.task_open[t];
                    if remaining > open {
                        return Err(Conflict);
                    }
                    if open == 0 {
                        continue;
                    }
                    if remaining == 0 {
                        self.force(model.task_vars(t), false)?;
                    } else if remaining == open {
                        self.force(model.task_vars(t), true)?;
                    }
                }
                Watch::Worker(w) => {
                    if self.worker_load[w] >= model.max_load() {
                        self.force(model.worker_vars(w), false)?;
                    }
                }
                Watch::Family(f) => {
                    if self.family_taken[f] > 0 {
                        self.force(&model.families()[f].vars, false)?;
                    }
                }
            }
        }
        self.check_capacity()
    }

    /// Seats still missing against seats the component's workers can still fill
    fn check_capacity(&self) -> Result<(), Conflict> {
        let missing: u64 = self
            .tasks
            .iter()
            .map(|&t| u64::from(self.task_remaining[t]))
            .sum();
        if missing == 0 {
            return Ok(());
        }

        let mut capacity = 0u64;
        let mut families: Vec<usize> = Vec::new();
        for &w in &self.workers {
            let room = self.model.max_load().saturating_sub(self.worker_load[w]);
            if room == 0 {
                continue;
            }
            families.clear();
            let mut seats = 0u32;
            for &var in self.model.worker_vars(w) {
                if self.values[var].is_some() {
                    continue;
                }
                match self.model.family_of(var) {
                    None => seats += 1,
                    Some(f) if self.family_taken[f] == 0 && !families.contains(&f) => {
                        families.push(f);
                        seats += 1;
                    }
                    Some(_) => {}
                }
            }
            capacity += u64::from(seats.min(room));
            if capacity >= missing {
                return Ok(());
            }
        }
        Err(Conflict)
    }

    fn force(&mut self, vars: &[usize], value: bool) -> Result<(), Conflict> {
        for &var in vars {
            if self.values[var].is_none() {
                self.stats.propagations += 1;
                self.assign(var, value)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linecrew_core::{AssignmentPolicy, RunParameters, Task, Worker};

    fn model(workers: &[Worker], tasks: &[Task], policy: &AssignmentPolicy) -> ConstraintModel {
        let params = RunParameters::all_available(workers);
        ConstraintModel::build(workers, tasks, &params, policy).unwrap()
    }

    fn run(model: &ConstraintModel, limits: SearchLimits) -> (ComponentOutcome, SearchStats) {
        let all: Vec<usize> = (0..model.tasks().len()).collect();
        Search::new(model, &all, limits, Instant::now()).run()
    }

    #[test]
    fn forced_assignment_needs_no_decisions() {
        let workers = vec![Worker::new(1, "a").qualify("coil"), Worker::new(2, "b").qualify("coil")];
        let tasks = vec![Task::new("coil", 2)];
        let m = model(&workers, &tasks, &AssignmentPolicy::default());

        let (outcome, stats) = run(&m, SearchLimits::default());
        assert_eq!(outcome, ComponentOutcome::Solved(vec![0, 1]));
        assert_eq!(stats.decisions, 0);
        assert_eq!(stats.propagations, 2);
    }

    #[test]
    fn root_contradiction_is_infeasible() {
        let workers = vec![Worker::new(1, "a").qualify("coil")];
        let tasks = vec![Task::new("coil", 2)];
        let m = model(&workers, &tasks, &AssignmentPolicy::default());

        let (outcome, stats) = run(&m, SearchLimits::default());
        assert_eq!(outcome, ComponentOutcome::Infeasible);
        assert_eq!(stats.decisions, 0);
    }

    #[test]
    fn family_forces_other_half_false() {
        // Two workers for both plasma halves; once the first worker takes the
        // 1st half, exclusivity leaves the 2nd half to the other worker.
        let workers = vec![
            Worker::new(1, "a").qualify("plasma"),
            Worker::new(2, "b").qualify("plasma"),
            Worker::new(3, "c").qualify("coil"),
        ];
        let tasks = vec![
            Task::new("plasma_1st_half", 1),
            Task::new("plasma_2nd_half", 1),
            Task::new("coil", 1),
        ];
        let m = model(&workers, &tasks, &AssignmentPolicy::default());
        assert_eq!(m.families().len(), 2);

        let (outcome, stats) = run(&m, SearchLimits::default());
        let ComponentOutcome::Solved(vars) = outcome else {
            panic!("expected a solution, got {outcome:?}");
        };
        let chosen: Vec<(usize, usize)> = vars
            .iter()
            .map(|&v| (m.candidates()[v].worker, m.candidates()[v].task))
            .collect();
        assert_eq!(chosen, vec![(0, 0), (1, 1), (2, 2)]);
        assert_eq!(stats.decisions, 1);
        assert_eq!(stats.backtracks, 0);
    }

    #[test]
    fn short_component_fails_at_the_root() {
        // Six seats, three workers, one task each
        let workers: Vec<Worker> = (1..=3)
            .map(|id| Worker::new(id, format!("w{id}")).qualify_all(["coil", "plasma", "cml"]))
            .collect();
        let tasks = vec![Task::new("coil", 2), Task::new("plasma", 2), Task::new("cml", 2)];
        let m = model(&workers, &tasks, &AssignmentPolicy::default().max_load(1));

        let (outcome, stats) = run(&m, SearchLimits::default());
        assert_eq!(outcome, ComponentOutcome::Infeasible);
        assert_eq!(stats.decisions, 0);
    }

    #[test]
    fn one_family_seat_per_worker() {
        // Ana may take three tasks but only one plasma half
        let workers = vec![Worker::new(1, "a").qualify("plasma")];
        let tasks = vec![Task::new("plasma_1st_half", 1), Task::new("plasma_2nd_half", 1)];
        let m = model(&workers, &tasks, &AssignmentPolicy::default());

        let (outcome, stats) = run(&m, SearchLimits::default());
        assert_eq!(outcome, ComponentOutcome::Infeasible);
        assert_eq!(stats.decisions, 0);
    }

    #[test]
    fn backtracks_out_of_a_bad_first_choice() {
        // Two workers for three single seats, with enough spare hands on
        // tote cleaning that the seat count alone does not rule it out
        let m = model(&crowded(), &crowded_tasks(), &AssignmentPolicy::default().max_load(1));

        let (outcome, stats) = run(&m, SearchLimits::default());
        assert_eq!(outcome, ComponentOutcome::Infeasible);
        assert_eq!(stats.decisions, 1);
        assert_eq!(stats.backtracks, 1);

        let (outcome, _) = run(
            &m,
            SearchLimits {
                max_backtracks: Some(0),
                time_limit: None,
            },
        );
        assert_eq!(outcome, ComponentOutcome::Exhausted(LimitHit::Backtracks(0)));
    }

    fn crowded() -> Vec<Worker> {
        vec![
            Worker::new(1, "a").qualify_all(["cml", "coil", "plasma", "tote_cleaning"]),
            Worker::new(2, "b").qualify_all(["cml", "coil", "plasma"]),
            Worker::new(3, "c").qualify("tote_cleaning"),
            Worker::new(4, "d").qualify("tote_cleaning"),
        ]
    }

    fn crowded_tasks() -> Vec<Task> {
        vec![
            Task::new("cml", 1),
            Task::new("coil", 1),
            Task::new("plasma", 1),
            Task::new("tote_cleaning", 1),
        ]
    }

    #[test]
    fn undo_restores_counters() {
        let workers = vec![
            Worker::new(1, "a").qualify_all(["coil", "plasma"]),
            Worker::new(2, "b").qualify_all(["coil", "plasma"]),
        ];
        let tasks = vec![Task::new("coil", 1), Task::new("plasma", 1)];
        let m = model(&workers, &tasks, &AssignmentPolicy::default().max_load(1));
        let all: Vec<usize> = (0..m.tasks().len()).collect();
        let mut search = Search::new(&m, &all, SearchLimits::default(), Instant::now());

        let remaining = search.task_remaining.clone();
        let open = search.task_open.clone();
        assert!(search.try_value(0, true));
        assert!(search.trail.len() > 1);

        search.undo(0);
        assert_eq!(search.task_remaining, remaining);
        assert_eq!(search.task_open, open);
        assert!(search.values.iter().all(Option::is_none));
        assert!(search.worker_load.iter().all(|&l| l == 0));
    }
}
