//! Run options shared by the CLI and JSON config files.
//!
//! Every field is optional. Values from a config file are loaded first and
//! CLI flags are merged on top (`RunOptions::merge`). Resolution into a
//! `SimConfig` or a Round Robin job list fills the remaining gaps with the
//! built-in defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::SchedError;
use crate::lifecycle::config::{SimConfig, DEFAULT_WORKLOADS};
use crate::process::Pid;
use crate::round_robin::RrJob;
use crate::table::file::DEFAULT_TABLE_PATH;

/// Burst times for the Round Robin demo set `P1..P4`.
pub const DEFAULT_RR_BURSTS: [u64; 4] = [10, 5, 8, 6];
pub const DEFAULT_RR_QUANTUM: u64 = 3;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunOptions {
    /// Time-slice length.
    pub quantum: Option<u64>,
    /// Number of simulated processes.
    pub process_count: Option<usize>,
    /// Per-process fixed workload.
    pub burst_times: Option<Vec<u64>>,
    /// RNG seed for reproducibility.
    pub seed: Option<u64>,
    pub p_io: Option<f64>,
    pub p_unblock: Option<f64>,
    pub max_rounds: Option<u64>,
    pub snapshot_every: Option<u64>,
    pub idle_delay_ms: Option<u64>,
    pub table_path: Option<PathBuf>,
}

impl RunOptions {
    /// Load options from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self, SchedError> {
        let bytes = fs::read(path).map_err(|source| SchedError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Fields set in `overrides` replace those in `self`.
    pub fn merge(self, overrides: RunOptions) -> RunOptions {
        RunOptions {
            quantum: overrides.quantum.or(self.quantum),
            process_count: overrides.process_count.or(self.process_count),
            burst_times: overrides.burst_times.or(self.burst_times),
            seed: overrides.seed.or(self.seed),
            p_io: overrides.p_io.or(self.p_io),
            p_unblock: overrides.p_unblock.or(self.p_unblock),
            max_rounds: overrides.max_rounds.or(self.max_rounds),
            snapshot_every: overrides.snapshot_every.or(self.snapshot_every),
            idle_delay_ms: overrides.idle_delay_ms.or(self.idle_delay_ms),
            table_path: overrides.table_path.or(self.table_path),
        }
    }

    /// Per-process workloads.
    ///
    /// - `burst_times` alone: used as given.
    /// - `process_count` alone: pid `i` takes `defaults[i % defaults.len()]`.
    /// - both: lengths must agree.
    /// - neither: `defaults`.
    pub fn workloads(&self, defaults: &[u64]) -> Result<Vec<u64>, SchedError> {
        match (&self.burst_times, self.process_count) {
            (Some(bursts), Some(n)) if bursts.len() != n => Err(SchedError::invalid(format!(
                "process_count {n} does not match {} burst times",
                bursts.len()
            ))),
            (Some(bursts), _) => Ok(bursts.clone()),
            (None, Some(0)) => Err(SchedError::invalid("process_count must be > 0")),
            (None, Some(n)) => Ok((0..n).map(|i| defaults[i % defaults.len()]).collect()),
            (None, None) => Ok(defaults.to_vec()),
        }
    }

    /// Lifecycle simulation config, validated.
    pub fn sim_config(&self) -> Result<SimConfig, SchedError> {
        let base = SimConfig::default();
        let cfg = SimConfig {
            quantum: self.quantum.unwrap_or(base.quantum),
            workloads: self.workloads(&DEFAULT_WORKLOADS)?,
            p_io: self.p_io.unwrap_or(base.p_io),
            p_unblock: self.p_unblock.unwrap_or(base.p_unblock),
            max_rounds: self.max_rounds.unwrap_or(base.max_rounds),
            snapshot_every: self.snapshot_every.unwrap_or(base.snapshot_every),
            idle_delay_ms: self.idle_delay_ms.unwrap_or(base.idle_delay_ms),
            trace_capacity: base.trace_capacity,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Round Robin jobs `P1..Pn` and the quantum.
    pub fn rr_jobs(&self) -> Result<(Vec<RrJob>, u64), SchedError> {
        let bursts = self.workloads(&DEFAULT_RR_BURSTS)?;
        let jobs = bursts
            .into_iter()
            .enumerate()
            .map(|(i, burst)| RrJob {
                pid: Pid::new(i as u32 + 1),
                burst,
            })
            .collect();
        Ok((jobs, self.quantum.unwrap_or(DEFAULT_RR_QUANTUM)))
    }

    pub fn table_path(&self) -> PathBuf {
        self.table_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_TABLE_PATH))
    }

    /// Configured seed, or one derived from the system clock.
    pub fn seed_or_clock(&self) -> u64 {
        self.seed.unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(0)
        })
    }
}
