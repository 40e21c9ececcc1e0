//! Subcommand implementations

use std::fs;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use linecrew_core::{
    Assigner, AssignmentPolicy, AssignmentResult, ConstraintModel, Renderer, Roster, RosterStore,
    RunParameters, SolveOutcome, Worker,
};
use linecrew_render::{display_name_with, CsvRenderer, JsonRenderer, TextRenderer};
use linecrew_solver::BacktrackSolver;

use crate::config::Config;
use crate::exit::ExitCode;
use crate::store::JsonStore;
use crate::{Cli, Commands, DayArgs, OutputFormat, WorkerCommand};

pub fn run(cli: Cli) -> Result<ExitCode> {
    let config = Config::resolve(cli.config.as_deref(), &cli.data_dir)?;
    let mut store = JsonStore::new(&cli.data_dir);

    match cli.command {
        Commands::Solve {
            day,
            format,
            output,
            max_backtracks,
            time_limit_ms,
            parallel,
            date,
        } => {
            let mut limits = config.limits.to_search_limits();
            if let Some(max) = max_backtracks {
                limits.max_backtracks = Some(max);
            }
            if let Some(ms) = time_limit_ms {
                limits.time_limit = Some(Duration::from_millis(ms));
            }
            let solver = BacktrackSolver::new()
                .with_policy(config.policy)
                .with_limits(limits)
                .parallel(parallel || config.parallel);
            let date = date.unwrap_or_else(|| chrono::Local::now().date_naive());
            solve(&store, &solver, &day, format, output.as_deref(), date)
        }
        Commands::Check { day } => check(&store, &config.policy, &day),
        Commands::Tasks => {
            list_tasks(&store, &config.policy)?;
            Ok(ExitCode::Success)
        }
        Commands::Worker(command) => {
            worker(&mut store, command)?;
            Ok(ExitCode::Success)
        }
    }
}

impl DayArgs {
    fn params(&self, workers: &[Worker]) -> RunParameters {
        let mut params = RunParameters::all_available(workers).variant_mode(self.variant);
        for &id in &self.unavailable {
            if !params.available.contains(&id) {
                tracing::warn!(worker = id, "unavailable worker not in roster");
            }
            params = params.without_worker(id);
        }
        for task in &self.offline {
            params = params.disable(task.clone());
        }
        params
    }
}

// ============================================================================
// solve
// ============================================================================

fn solve(
    store: &JsonStore,
    solver: &BacktrackSolver,
    day: &DayArgs,
    format: OutputFormat,
    output: Option<&Path>,
    date: NaiveDate,
) -> Result<ExitCode> {
    let workers = store.load_workers()?;
    let tasks = store.load_tasks()?;
    let params = day.params(&workers);

    let report = solver.assign(&workers, &tasks, &params)?;
    tracing::debug!(
        variables = report.stats.variables,
        decisions = report.stats.decisions,
        backtracks = report.stats.backtracks,
        propagations = report.stats.propagations,
        elapsed_ms = report.stats.elapsed.as_millis() as u64,
        "search finished"
    );

    match &report.outcome {
        SolveOutcome::Feasible(result) => write_result(result, format, output, date)?,
        SolveOutcome::Infeasible(infeasibility) => {
            eprintln!("No feasible assignment.");
            if let Some(short) = infeasibility.capacity {
                eprintln!(
                    "  {} seats to fill, but the available workers can cover at most {}.",
                    short.required, short.capacity
                );
            } else if infeasibility.bottlenecks.is_empty() {
                eprintln!("  Every task has enough eligible workers, but the load cap and");
                eprintln!("  same-family rule cannot all be met together.");
            }
            for b in &infeasibility.bottlenecks {
                eprintln!(
                    "  {}: needs {}, only {} eligible",
                    b.task_id, b.required, b.candidates
                );
            }
        }
        SolveOutcome::Exhausted(hit) => {
            eprintln!("Search stopped without an answer: {hit}.");
        }
    }

    Ok(ExitCode::from_outcome(&report.outcome))
}

fn write_result(
    result: &AssignmentResult,
    format: OutputFormat,
    output: Option<&Path>,
    date: NaiveDate,
) -> Result<()> {
    match format {
        OutputFormat::Text => {
            let text = TextRenderer::new().date(date).render(result)?;
            emit(&text, output)
        }
        OutputFormat::Json => {
            let json = JsonRenderer::new().date(date).render(result)?;
            emit(&(json + "\n"), output)
        }
        OutputFormat::Csv => {
            let documents = CsvRenderer::new().render(result)?;
            match output {
                Some(dir) => {
                    fs::create_dir_all(dir)
                        .with_context(|| format!("creating {}", dir.display()))?;
                    for doc in &documents {
                        let path = dir.join(&doc.file_name);
                        fs::write(&path, &doc.content)
                            .with_context(|| format!("writing {}", path.display()))?;
                        println!("Wrote: {}", path.display());
                    }
                    Ok(())
                }
                None => {
                    let joined: Vec<&str> = documents.iter().map(|d| d.content.as_str()).collect();
                    emit(&joined.join("\r\n"), None)
                }
            }
        }
    }
}

fn emit(content: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, content).with_context(|| format!("writing {}", path.display()))?;
            println!("Wrote: {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(content.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}

// ============================================================================
// check / tasks
// ============================================================================

fn check(store: &JsonStore, policy: &AssignmentPolicy, day: &DayArgs) -> Result<ExitCode> {
    let workers = store.load_workers()?;
    let tasks = store.load_tasks()?;
    let params = day.params(&workers);
    let model = ConstraintModel::build(&workers, &tasks, &params, policy)?;

    println!(
        "{} workers ({} available), {} tasks ({} active)",
        workers.len(),
        model.workers().len(),
        tasks.len(),
        model.tasks().len()
    );
    let capacity: u64 = (0..model.workers().len())
        .map(|w| u64::from(model.worker_capacity(w)))
        .sum();
    println!(
        "{} seats to fill, capacity {} at {} tasks per worker, {} eligible pairs",
        model.total_required(),
        capacity,
        model.max_load(),
        model.candidates().len()
    );

    let bottlenecks = model.bottlenecks();
    let shortfall = model.capacity_shortfall();
    if bottlenecks.is_empty() && shortfall.is_none() {
        println!("OK: every active task has enough eligible workers");
        return Ok(ExitCode::Success);
    }
    for b in &bottlenecks {
        println!(
            "SHORT: {} needs {}, only {} eligible",
            b.task_id, b.required, b.candidates
        );
    }
    if let Some(short) = shortfall {
        println!(
            "SHORT: {} seats to fill, workers can cover at most {}",
            short.required, short.capacity
        );
    }
    Ok(ExitCode::Infeasible)
}

fn list_tasks(store: &JsonStore, policy: &AssignmentPolicy) -> Result<()> {
    let tasks = store.load_tasks()?;
    if tasks.is_empty() {
        println!("No tasks in {}", store.tasks_path().display());
        return Ok(());
    }
    for task in &tasks {
        println!(
            "{:<36} {:>2}  {:<8} {:<9} {}",
            task.id,
            task.required,
            task.group().label(),
            task.half().label(),
            display_name_with(&policy.naming, &task.id)
        );
    }
    Ok(())
}

// ============================================================================
// worker
// ============================================================================

fn worker(store: &mut JsonStore, command: WorkerCommand) -> Result<()> {
    let mut roster = Roster::new(store.load_workers()?);

    match command {
        WorkerCommand::List => {
            if roster.workers().is_empty() {
                println!("No workers in {}", store.workers_path().display());
            }
            for w in roster.workers() {
                let tags: Vec<&str> = w.qualifications.iter().map(String::as_str).collect();
                println!("{:>6}  {:<24} {}", w.id, w.name, tags.join(", "));
            }
            return Ok(());
        }
        WorkerCommand::Add { id, name, tags } => {
            let catalog = store.load_tasks()?;
            roster.add(Worker::new(id, name))?;
            let added = roster.set_qualifications(id, tags, &catalog)?;
            println!("Added: {}", added.label());
        }
        WorkerCommand::Remove { id } => {
            let removed = roster.remove(id)?;
            println!("Removed: {}", removed.label());
        }
        WorkerCommand::Edit { id, name, tags } => {
            if name.is_none() && tags.is_none() {
                bail!("nothing to change: pass --name and/or --tag");
            }
            if let Some(name) = name {
                roster.rename(id, &name)?;
            }
            if let Some(tags) = tags {
                let catalog = store.load_tasks()?;
                roster.set_qualifications(id, tags, &catalog)?;
            }
            if let Some(updated) = roster.get(id) {
                println!("Updated: {}", updated.label());
            }
        }
    }

    store.save_workers(roster.workers())?;
    Ok(())
}
