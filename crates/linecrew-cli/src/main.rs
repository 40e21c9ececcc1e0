//! linecrew CLI - daily crew assignment
//!
//! Reads the roster and task catalog from a data directory, solves one day's
//! assignment and prints it. Also edits worker records.

mod commands;
mod config;
mod exit;
mod store;

use std::path::PathBuf;
use std::process;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use linecrew_core::WorkerId;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::exit::ExitCode;

#[derive(Parser)]
#[command(name = "linecrew")]
#[command(author, version, about = "Daily crew assignment for assembly lines", long_about = None)]
struct Cli {
    /// Verbose output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Directory holding workers.json and tasks.json
    #[arg(short, long, global = true, env = "LINECREW_DATA", default_value = "data")]
    data_dir: PathBuf,

    /// Configuration file (default: <data-dir>/linecrew.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Inputs describing one day
#[derive(Args, Debug, Clone, Default)]
struct DayArgs {
    /// Workers absent today (comma separated ids)
    #[arg(short, long, value_delimiter = ',', value_name = "ID")]
    unavailable: Vec<WorkerId>,

    /// Tasks taken offline today (comma separated ids)
    #[arg(long, value_delimiter = ',', value_name = "TASK")]
    offline: Vec<String>,

    /// Variant production day (e.g. 4-blade balloons)
    #[arg(long)]
    variant: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Csv,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Assign today's crew
    Solve {
        #[command(flatten)]
        day: DayArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Output file (stdout if not specified; a directory for csv)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Stop after this many backtracks per component
        #[arg(long)]
        max_backtracks: Option<u64>,

        /// Stop after this many milliseconds
        #[arg(long)]
        time_limit_ms: Option<u64>,

        /// Search independent components in parallel
        #[arg(long)]
        parallel: bool,

        /// Date printed in the roster header (default: today)
        #[arg(long, value_name = "YYYY-MM-DD")]
        date: Option<NaiveDate>,
    },

    /// Validate records and report tasks short of eligible workers
    Check {
        #[command(flatten)]
        day: DayArgs,
    },

    /// List the task catalog
    Tasks,

    /// Manage worker records
    #[command(subcommand)]
    Worker(WorkerCommand),
}

#[derive(Subcommand)]
enum WorkerCommand {
    /// List workers and their sign-offs
    List,

    /// Add a worker
    Add {
        #[arg(long)]
        id: WorkerId,

        #[arg(long)]
        name: String,

        /// Signed-off task (repeatable, must be a catalog task id)
        #[arg(long = "tag", value_name = "TASK")]
        tags: Vec<String>,
    },

    /// Remove a worker
    Remove {
        id: WorkerId,
    },

    /// Rename a worker or replace their sign-offs
    Edit {
        id: WorkerId,

        #[arg(long)]
        name: Option<String>,

        /// Replacement sign-off list (repeatable)
        #[arg(long = "tag", value_name = "TASK")]
        tags: Option<Vec<String>>,
    },
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> process::ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match commands::run(cli) {
        Ok(code) => code.into(),
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::Failure.into()
        }
    }
}
