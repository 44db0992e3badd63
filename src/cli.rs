//! Subcommand CLI parser.
//!
//! Hand-rolled (no clap dependency): flags are `--name=value` or bare
//! switches.
//!
//! # Grammar
//!
//! ```text
//! sched-sim rr   [--quantum=N] [--bursts=A,B,..] [--process-count=N] [--config=FILE] [--json]
//! sched-sim sim  [--quantum=N] [--bursts=A,B,..] [--process-count=N] [--seed=N]
//!                [--p-io=F] [--p-unblock=F] [--max-rounds=N] [--snapshot-every=N]
//!                [--idle-ms=N] [--table=PATH] [--resume] [--config=FILE] [--json]
//! sched-sim show [--table=PATH]
//! sched-sim --help | -h
//! ```

use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

use crate::config::RunOptions;
use crate::error::SchedError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Subcommand {
    RoundRobin,
    Simulate,
    Show,
    Help,
}

/// Parsed command line.
#[derive(Clone, Debug, PartialEq)]
pub struct CliArgs {
    pub command: Subcommand,
    pub config: Option<PathBuf>,
    /// Values given on the command line; merged over `config`.
    pub overrides: RunOptions,
    pub json: bool,
    pub resume: bool,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CliError {
    #[error("expected a subcommand: rr, sim, or show")]
    MissingSubcommand,
    #[error("unknown subcommand '{0}'")]
    UnknownSubcommand(String),
    #[error("unknown option '{0}'")]
    UnknownFlag(String),
    #[error("invalid value for {flag}: '{value}'")]
    InvalidValue { flag: String, value: String },
    #[error("option {flag} is not accepted by '{command}'")]
    NotApplicable { flag: String, command: String },
}

impl CliArgs {
    /// Config file values with command-line overrides applied.
    pub fn options(&self) -> Result<RunOptions, SchedError> {
        let base = match &self.config {
            Some(path) => RunOptions::from_json_file(path)?,
            None => RunOptions::default(),
        };
        Ok(base.merge(self.overrides.clone()))
    }
}

pub fn usage(exe: &str) -> String {
    format!(
        "usage: {exe} <rr|sim|show> [OPTIONS]

SUBCOMMANDS:
    rr                      Round Robin waiting/turnaround report
    sim                     Stochastic lifecycle simulation with a persisted table
    show                    Print the persisted process table

OPTIONS:
    --quantum=<N>           Time-slice length in cycles
    --bursts=<A,B,..>       Per-process workload
    --process-count=<N>     Number of processes (cycles default workloads)
    --seed=<N>              RNG seed (default: derived from the clock)
    --p-io=<F>              Per-cycle I/O blocking probability (default 0.01)
    --p-unblock=<F>         Per-round unblock probability (default 0.30)
    --max-rounds=<N>        Round cap before giving up
    --snapshot-every=<N>    Print the table every N rounds (0 disables)
    --idle-ms=<N>           Sleep after a round with nothing ready
    --table=<PATH>          Process table file (default process_table.txt)
    --resume                Continue from the existing table
    --config=<FILE>         JSON file with the same options
    --json                  Print the report as JSON
    --help, -h              Show this help message"
    )
}

/// Parse arguments after the executable name.
pub fn parse_args<I, S>(args: I) -> Result<CliArgs, CliError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut args = args.into_iter().map(Into::into);
    let first = args.next().ok_or(CliError::MissingSubcommand)?;
    let command = match first.as_str() {
        "rr" => Subcommand::RoundRobin,
        "sim" => Subcommand::Simulate,
        "show" => Subcommand::Show,
        "--help" | "-h" | "help" => Subcommand::Help,
        other => return Err(CliError::UnknownSubcommand(other.to_string())),
    };

    let mut out = CliArgs {
        command,
        config: None,
        overrides: RunOptions::default(),
        json: false,
        resume: false,
    };

    for arg in args {
        let (flag, value) = match arg.split_once('=') {
            Some((f, v)) => (f.to_string(), Some(v.to_string())),
            None => (arg.clone(), None),
        };
        let o = &mut out.overrides;
        match (flag.as_str(), value) {
            ("--help" | "-h", None) => out.command = Subcommand::Help,
            ("--json", None) => out.json = true,
            ("--resume", None) => out.resume = true,
            ("--config", Some(v)) => out.config = Some(PathBuf::from(v)),
            ("--table", Some(v)) => o.table_path = Some(PathBuf::from(v)),
            ("--quantum", Some(v)) => o.quantum = Some(parse_value(&flag, &v)?),
            ("--process-count", Some(v)) => o.process_count = Some(parse_value(&flag, &v)?),
            ("--seed", Some(v)) => o.seed = Some(parse_value(&flag, &v)?),
            ("--p-io", Some(v)) => o.p_io = Some(parse_value(&flag, &v)?),
            ("--p-unblock", Some(v)) => o.p_unblock = Some(parse_value(&flag, &v)?),
            ("--max-rounds", Some(v)) => o.max_rounds = Some(parse_value(&flag, &v)?),
            ("--snapshot-every", Some(v)) => o.snapshot_every = Some(parse_value(&flag, &v)?),
            ("--idle-ms", Some(v)) => o.idle_delay_ms = Some(parse_value(&flag, &v)?),
            ("--bursts", Some(v)) => {
                let bursts = v
                    .split(',')
                    .map(|part| parse_value::<u64>(&flag, part.trim()))
                    .collect::<Result<Vec<_>, _>>()?;
                o.burst_times = Some(bursts);
            }
            _ => return Err(CliError::UnknownFlag(arg)),
        }
    }

    check_applicable(&out)?;
    Ok(out)
}

fn parse_value<T: FromStr>(flag: &str, value: &str) -> Result<T, CliError> {
    value.parse().map_err(|_| CliError::InvalidValue {
        flag: flag.to_string(),
        value: value.to_string(),
    })
}

fn check_applicable(args: &CliArgs) -> Result<(), CliError> {
    let o = &args.overrides;
    let reject = |flag: &str, command: &str| {
        Err(CliError::NotApplicable {
            flag: flag.to_string(),
            command: command.to_string(),
        })
    };
    match args.command {
        Subcommand::RoundRobin => {
            if args.resume {
                return reject("--resume", "rr");
            }
            if o.seed.is_some() || o.p_io.is_some() || o.p_unblock.is_some() {
                return reject("--seed/--p-io/--p-unblock", "rr");
            }
        }
        Subcommand::Show => {
            if o.quantum.is_some() || o.burst_times.is_some() || o.process_count.is_some() {
                return reject("--quantum/--bursts/--process-count", "show");
            }
        }
        Subcommand::Simulate | Subcommand::Help => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sim_flags() {
        let args = parse_args([
            "sim",
            "--quantum=3",
            "--bursts=10, 5,8",
            "--seed=42",
            "--p-io=0",
            "--table=/tmp/t.txt",
            "--json",
        ])
        .unwrap();
        assert_eq!(args.command, Subcommand::Simulate);
        assert_eq!(args.overrides.quantum, Some(3));
        assert_eq!(args.overrides.burst_times, Some(vec![10, 5, 8]));
        assert_eq!(args.overrides.seed, Some(42));
        assert_eq!(args.overrides.p_io, Some(0.0));
        assert!(args.json);
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(
            parse_args(Vec::<String>::new()),
            Err(CliError::MissingSubcommand)
        );
        assert!(matches!(
            parse_args(["run"]),
            Err(CliError::UnknownSubcommand(_))
        ));
        assert!(matches!(
            parse_args(["rr", "--quantum=x"]),
            Err(CliError::InvalidValue { .. })
        ));
        assert!(matches!(
            parse_args(["rr", "--verbose"]),
            Err(CliError::UnknownFlag(_))
        ));
        assert!(matches!(
            parse_args(["rr", "--seed=1"]),
            Err(CliError::NotApplicable { .. })
        ));
    }

    #[test]
    fn help_anywhere_wins() {
        let args = parse_args(["sim", "--help"]).unwrap();
        assert_eq!(args.command, Subcommand::Help);
    }

    #[test]
    fn options_merge_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("c.json");
        std::fs::write(&path, r#"{"quantum": 7, "seed": 1}"#).unwrap();
        let args = parse_args([
            "sim".to_string(),
            format!("--config={}", path.display()),
            "--seed=2".to_string(),
        ])
        .unwrap();
        let opts = args.options().unwrap();
        assert_eq!(opts.quantum, Some(7));
        assert_eq!(opts.seed, Some(2));
    }
}
