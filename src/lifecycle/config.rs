//! Lifecycle simulation parameters.
//!
//! # Invariants
//! - `quantum > 0` and every workload is `> 0`.
//! - `p_io` and `p_unblock` lie in `[0, 1]`.
//! - `max_rounds > 0`; it bounds idle (stall) rounds as well as dispatches.

use serde::{Deserialize, Serialize};

use crate::error::SchedError;

/// Work per pid used when no workloads are configured.
pub const DEFAULT_WORKLOADS: [u64; 10] = [
    10_000, 5_000, 7_000, 3_000, 3_000, 8_000, 2_000, 5_000, 4_000, 10_000,
];
pub const DEFAULT_QUANTUM: u64 = 1_000;
pub const DEFAULT_P_IO: f64 = 0.01;
pub const DEFAULT_P_UNBLOCK: f64 = 0.30;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Maximum cycles per dispatch.
    pub quantum: u64,
    /// Total work per process; pid `i` gets `workloads[i]`.
    pub workloads: Vec<u64>,
    /// Per-cycle probability of blocking on I/O.
    pub p_io: f64,
    /// Per-round probability that a blocked process becomes ready.
    pub p_unblock: f64,
    /// Round cap; exceeding it yields `SchedError::NoProgress`.
    pub max_rounds: u64,
    /// Render a snapshot every N rounds (0 disables periodic snapshots).
    pub snapshot_every: u64,
    /// Wall-clock sleep after an idle round, in milliseconds.
    pub idle_delay_ms: u64,
    /// Trace ring capacity.
    pub trace_capacity: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            quantum: DEFAULT_QUANTUM,
            workloads: DEFAULT_WORKLOADS.to_vec(),
            p_io: DEFAULT_P_IO,
            p_unblock: DEFAULT_P_UNBLOCK,
            max_rounds: 1_000_000,
            snapshot_every: 5,
            idle_delay_ms: 0,
            trace_capacity: 256,
        }
    }
}

impl SimConfig {
    /// Config with the given quantum and workloads and default probabilities.
    pub fn with_workloads(quantum: u64, workloads: Vec<u64>) -> Self {
        Self {
            quantum,
            workloads,
            ..Self::default()
        }
    }

    pub fn process_count(&self) -> usize {
        self.workloads.len()
    }

    /// Check every invariant listed in the module docs.
    pub fn validate(&self) -> Result<(), SchedError> {
        if self.quantum == 0 {
            return Err(SchedError::invalid("quantum must be > 0"));
        }
        if self.workloads.is_empty() {
            return Err(SchedError::invalid("process set is empty"));
        }
        if u32::try_from(self.workloads.len()).is_err() {
            return Err(SchedError::invalid("too many processes"));
        }
        if let Some(pid) = self.workloads.iter().position(|w| *w == 0) {
            return Err(SchedError::invalid(format!(
                "workload for pid {pid} must be > 0"
            )));
        }
        if self
            .workloads
            .iter()
            .try_fold(0u64, |acc, w| acc.checked_add(*w))
            .is_none()
        {
            return Err(SchedError::invalid("total workload overflows"));
        }
        check_probability("p_io", self.p_io)?;
        check_probability("p_unblock", self.p_unblock)?;
        if self.max_rounds == 0 {
            return Err(SchedError::invalid("max_rounds must be > 0"));
        }
        Ok(())
    }
}

fn check_probability(name: &str, p: f64) -> Result<(), SchedError> {
    if (0.0..=1.0).contains(&p) {
        Ok(())
    } else {
        Err(SchedError::invalid(format!("{name} must be within [0, 1], got {p}")))
    }
}
