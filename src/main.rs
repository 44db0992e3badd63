//! Scheduling simulator CLI.
//!
//! `rr` prints the Round Robin waiting/turnaround table, `sim` runs the
//! stochastic lifecycle simulation against a process table file, and `show`
//! prints that table (safe to run while a simulation is writing it).
//!
//! Logs go to stderr; set `RUST_LOG` to adjust (default `info`).
//!
//! # Exit Codes
//!
//! - `0`: Success
//! - `1`: Run failed (no progress, unreadable table)
//! - `2`: Invalid arguments or configuration error

use std::env;
use std::process::ExitCode;

use sched_sim::cli::{parse_args, usage, CliArgs, Subcommand};
use sched_sim::display::render_snapshot;
use sched_sim::{
    FileTable, LifecycleSimulator, ProcessTable, RoundRobinScheduler, SchedError, TableDisplay,
    TextDisplay,
};
use serde::Serialize;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut argv = env::args();
    let exe = argv.next().unwrap_or_else(|| "sched-sim".to_string());

    let args = match parse_args(argv) {
        Ok(args) => args,
        Err(err) => {
            eprintln!("error: {err}");
            eprintln!();
            eprintln!("{}", usage(&exe));
            return ExitCode::from(2);
        }
    };

    let result = match args.command {
        Subcommand::Help => {
            eprintln!("{}", usage(&exe));
            return ExitCode::SUCCESS;
        }
        Subcommand::RoundRobin => run_rr(&args),
        Subcommand::Simulate => run_sim(&args),
        Subcommand::Show => run_show(&args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) if err.is_usage_error() => {
            eprintln!("error: {err}");
            ExitCode::from(2)
        }
        Err(err) => {
            log::error!("{err}");
            ExitCode::from(1)
        }
    }
}

fn run_rr(args: &CliArgs) -> Result<(), SchedError> {
    let opts = args.options()?;
    let (jobs, quantum) = opts.rr_jobs()?;
    let report = RoundRobinScheduler::schedule_jobs(&jobs, quantum)?;
    if args.json {
        print_json(&report)?;
    } else {
        TextDisplay::stdout().rr_results(&report);
    }
    Ok(())
}

fn run_sim(args: &CliArgs) -> Result<(), SchedError> {
    let opts = args.options()?;
    let cfg = opts.sim_config()?;
    let seed = opts.seed_or_clock();
    let table = FileTable::new(opts.table_path());
    log::info!("seed {seed}, table {}", table.path().display());

    let sim = if args.resume {
        LifecycleSimulator::resume_seeded(cfg, table, seed)?
    } else {
        LifecycleSimulator::seeded(cfg, table, seed)?
    };

    if args.json {
        let report = sim.run(&mut sched_sim::NullDisplay)?;
        print_json(&report)?;
    } else {
        let report = sim.run(&mut TextDisplay::stdout())?;
        if report.persist_failures > 0 {
            log::warn!(
                "{} table saves failed; last error: {}",
                report.persist_failures,
                report.last_persist_error.as_deref().unwrap_or("unknown")
            );
        }
        println!(
            "Simulation finished: {} rounds ({} idle), {} cycles.",
            report.rounds, report.idle_rounds, report.clock
        );
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), SchedError> {
    let text =
        serde_json::to_string_pretty(value).map_err(|source| SchedError::Output { source })?;
    println!("{text}");
    Ok(())
}

fn run_show(args: &CliArgs) -> Result<(), SchedError> {
    let opts = args.options()?;
    let table = FileTable::new(opts.table_path());
    match table.load_all() {
        Ok(rows) if !rows.is_empty() => {
            print!("{}", render_snapshot(&table.path().display().to_string(), &rows));
        }
        Ok(_) => println!("no data yet"),
        Err(err) => {
            log::debug!("table not readable yet: {err}");
            println!("no data yet");
        }
    }
    Ok(())
}
