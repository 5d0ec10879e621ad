//! `oncall-roster` command-line interface.
//!
//! Two commands:
//! - `validate --config PATH` — load configuration and availability,
//!   print problems, exit 0 only when no error is present.
//! - `generate --config PATH [--output-dir DIR]` — validate, solve all
//!   blocks, and emit the configured exports.
//!
//! Exit codes: 0 success, 1 configuration/validation error, 2 solver
//! infeasible, 3 solver timeout, 4 I/O error.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use oncall_roster::availability::load_unavailability;
use oncall_roster::config::Config;
use oncall_roster::error::ScheduleError;
use oncall_roster::export::write_outputs;
use oncall_roster::generate::RosterGenerator;
use oncall_roster::models::Unavailability;
use oncall_roster::validation::{validate, Severity};

#[derive(Parser)]
#[command(name = "oncall-roster", version, about = "Generate on-call rosters under hard constraints")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check configuration and availability without solving.
    Validate {
        /// Path to the YAML configuration.
        #[arg(long)]
        config: PathBuf,
    },
    /// Validate, solve all blocks, and write the schedule exports.
    Generate {
        /// Path to the YAML configuration.
        #[arg(long)]
        config: PathBuf,
        /// Directory the exports are written to (default: current directory).
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Validate { config } => run_validate(&config),
        Command::Generate { config, output_dir } => run_generate(&config, output_dir.as_deref()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            let code = err
                .downcast_ref::<ScheduleError>()
                .map(ScheduleError::exit_code)
                .unwrap_or(1);
            ExitCode::from(code)
        }
    }
}

/// Loads configuration plus availability and reports all problems.
fn load_and_validate(config_path: &Path) -> anyhow::Result<(Config, Vec<Unavailability>)> {
    let config = Config::load(config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;

    let records = match &config.files.availability {
        Some(file) => {
            let path = Config::resolve_path(config_path, file);
            load_unavailability(&path)
                .with_context(|| format!("loading availability from {}", path.display()))?
        }
        None => Vec::new(),
    };

    let outcome = validate(&config, &records);
    for problem in &outcome.problems {
        match problem.severity {
            Severity::Error => eprintln!("error: {}", problem.message),
            Severity::Warning => eprintln!("warning: {}", problem.message),
        }
    }
    if outcome.has_errors() {
        let count = outcome.errors().count();
        return Err(ScheduleError::Config(format!("{count} validation error(s)")).into());
    }

    Ok((config, records))
}

fn run_validate(config_path: &Path) -> anyhow::Result<()> {
    let (config, records) = load_and_validate(config_path)?;
    println!(
        "configuration OK: {} engineers, {} roles, {} block(s) of {} week(s), {} availability record(s)",
        config.team.len(),
        config.roles.len(),
        config.schedule.num_blocks,
        config.schedule.weeks_per_block,
        records.len()
    );
    Ok(())
}

fn run_generate(config_path: &Path, output_dir: Option<&Path>) -> anyhow::Result<()> {
    let (config, records) = load_and_validate(config_path)?;
    let plan = config.compile()?;

    let roster = match RosterGenerator::new(&plan, &records).generate() {
        Ok(roster) => roster,
        Err(err) => {
            explain_failure(&err, &plan);
            return Err(err.into());
        }
    };

    let dir = output_dir.unwrap_or_else(|| Path::new("."));
    let written = write_outputs(&roster, &plan, dir)?;
    println!(
        "wrote {} shift(s) across {} week(s)",
        roster.shift_count(),
        plan.num_blocks * plan.weeks_per_block
    );
    for path in written {
        println!("  {}", path.display());
    }
    Ok(())
}

/// Prints diagnosis hints for solver-level failures.
fn explain_failure(err: &ScheduleError, plan: &oncall_roster::config::Plan) {
    match err {
        ScheduleError::Infeasible { .. } => {
            eprintln!("enabled rules: {:?}", plan.rules);
            eprintln!(
                "capacity: {} engineers x {} max shifts vs {} weeks x {} roles per block",
                plan.team.len(),
                plan.max_shifts_per_engineer,
                plan.weeks_per_block,
                plan.roles.len()
            );
            eprintln!("hint: loosen rules, raise caps, or grow the team");
        }
        ScheduleError::Timeout { .. } => {
            eprintln!(
                "hint: raise solver.timeout_seconds (currently {}s) or loosen rules",
                plan.timeout.as_secs()
            );
        }
        _ => {}
    }
}
