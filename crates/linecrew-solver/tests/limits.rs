//! Search budgets

mod common;

use std::time::Duration;

use common::{ids, plant_catalog, plant_roster};
use linecrew_core::{
    Assigner, AssignmentPolicy, LimitHit, RunParameters, SolveOutcome, Task, Worker,
};
use linecrew_solver::{BacktrackSolver, SearchLimits};
use pretty_assertions::assert_eq;

/// cml, coil and plasma all fall to workers 1 and 2 at one task each, so
/// one of them always goes unstaffed. Tote cleaning has spare hands, which
/// keeps the seat count from ruling the day out before any search.
fn crowded() -> (Vec<Worker>, Vec<Task>) {
    let workers = vec![
        Worker::new(1, "a").qualify_all(["cml", "coil", "plasma", "tote_cleaning"]),
        Worker::new(2, "b").qualify_all(["cml", "coil", "plasma"]),
        Worker::new(3, "c").qualify("tote_cleaning"),
        Worker::new(4, "d").qualify("tote_cleaning"),
    ];
    let tasks = vec![
        Task::new("cml", 1),
        Task::new("coil", 1),
        Task::new("plasma", 1),
        Task::new("tote_cleaning", 1),
    ];
    (workers, tasks)
}

fn one_task_each() -> BacktrackSolver {
    BacktrackSolver::new().with_policy(AssignmentPolicy::default().max_load(1))
}

#[test]
fn unlimited_search_proves_infeasibility() {
    let (workers, tasks) = crowded();
    let report = one_task_each()
        .assign(&workers, &tasks, &RunParameters::all_available(&workers))
        .unwrap();

    assert!(report.outcome.is_infeasible());
    assert!(report.stats.backtracks > 0);
}

#[test]
fn backtrack_budget_stops_the_search() {
    let (workers, tasks) = crowded();
    let report = one_task_each()
        .with_limits(SearchLimits::unlimited().max_backtracks(0))
        .assign(&workers, &tasks, &RunParameters::all_available(&workers))
        .unwrap();

    assert_eq!(report.outcome, SolveOutcome::Exhausted(LimitHit::Backtracks(0)));
}

#[test]
fn zero_time_limit_stops_before_the_first_decision() {
    let (workers, tasks) = crowded();
    let report = one_task_each()
        .with_limits(SearchLimits::unlimited().time_limit(Duration::ZERO))
        .assign(&workers, &tasks, &RunParameters::all_available(&workers))
        .unwrap();

    assert_eq!(
        report.outcome,
        SolveOutcome::Exhausted(LimitHit::TimeLimit(Duration::ZERO))
    );
    assert_eq!(report.stats.decisions, 0);
}

#[test]
fn budgets_do_not_touch_propagation_only_runs() {
    let workers = vec![Worker::new(1, "a").qualify("coil")];
    let tasks = vec![Task::new("coil", 1)];
    let report = BacktrackSolver::new()
        .with_limits(SearchLimits::unlimited().time_limit(Duration::ZERO).max_backtracks(0))
        .assign(&workers, &tasks, &RunParameters::all_available(&workers))
        .unwrap();

    assert!(report.outcome.is_feasible());
}

#[test]
fn understaffed_plant_is_infeasible_without_search() {
    let workers = plant_roster();
    let mut params = RunParameters::all_available(&workers);
    for id in &ids(&workers)[10..] {
        params = params.without_worker(*id);
    }

    let report = BacktrackSolver::new()
        .assign(&workers, &plant_catalog(), &params)
        .unwrap();

    let SolveOutcome::Infeasible(why) = report.outcome else {
        panic!("expected infeasible, got {:?}", report.outcome);
    };
    assert!(why.bottlenecks.is_empty());
    let short = why.capacity.expect("seat shortfall");
    assert_eq!(short.required, 31);
    assert!(short.capacity <= 30);
    assert_eq!(report.stats.decisions, 0);
}

#[test]
fn exhausted_component_does_not_hide_an_infeasible_one() {
    let (mut workers, mut tasks) = crowded();
    workers.push(Worker::new(5, "e").qualify("leak_test"));
    workers.push(Worker::new(6, "f").qualify("tote_cleaning"));
    tasks.push(Task::new("leak_test_1st_half", 1));
    tasks.push(Task::new("leak_test_2nd_half", 1));
    let params = RunParameters::all_available(&workers);

    for parallel in [false, true] {
        let report = one_task_each()
            .parallel(parallel)
            .with_limits(SearchLimits::unlimited().max_backtracks(0))
            .assign(&workers, &tasks, &params)
            .unwrap();
        assert!(report.outcome.is_infeasible(), "parallel = {parallel}");
    }
}

#[test]
fn parallel_search_reports_the_budget_too() {
    let (workers, tasks) = crowded();
    let report = one_task_each()
        .parallel(true)
        .with_limits(SearchLimits::unlimited().max_backtracks(0))
        .assign(&workers, &tasks, &RunParameters::all_available(&workers))
        .unwrap();

    assert!(report.outcome.is_exhausted());
}
