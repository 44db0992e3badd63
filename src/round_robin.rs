//! Deterministic Round Robin scheduler.
//!
//! Replays the classic RR dispatch loop over fixed burst lengths and reports
//! per-process waiting and turnaround times.
//!
//! # Invariants
//! - `turnaround == wait + burst` for every process.
//! - The final clock equals the sum of all bursts; every cycle appears in
//!   exactly one `Slice`.
//! - A process whose remaining time equals the quantum finishes on that
//!   slice and is not requeued.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::error::SchedError;
use crate::process::Pid;
use crate::sim::clock::SimClock;

/// One contiguous run of a process on the CPU.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slice {
    pub pid: Pid,
    /// Clock value when the slice started.
    pub start: u64,
    pub cycles: u64,
}

/// A named process with its burst time, in dispatch order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RrJob {
    pub pid: Pid,
    pub burst: u64,
}

/// Result for a single process.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RrOutcome {
    pub burst: u64,
    pub wait: u64,
    pub turnaround: u64,
}

/// Full result of a Round Robin run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RrReport {
    pub quantum: u64,
    /// Pids in input order.
    pub order: Vec<Pid>,
    pub per_process: BTreeMap<Pid, RrOutcome>,
    pub avg_wait: f64,
    pub avg_turnaround: f64,
    /// Clock value after the last process finished.
    pub clock: u64,
    pub slices: Vec<Slice>,
}

impl RrReport {
    /// Outcomes in input order.
    pub fn rows(&self) -> impl Iterator<Item = (Pid, &RrOutcome)> + '_ {
        self.order
            .iter()
            .filter_map(|pid| self.per_process.get(pid).map(|o| (*pid, o)))
    }
}

/// Stateless Round Robin scheduler.
pub struct RoundRobinScheduler;

impl RoundRobinScheduler {
    /// Run RR over `pids` (dispatch order) with `burst` times and `quantum`.
    ///
    /// Rejects an empty pid list, duplicate pids, missing or zero bursts, a
    /// burst total that does not fit in `u64`, and a zero quantum before doing
    /// any work.
    pub fn schedule(
        pids: &[Pid],
        burst: &BTreeMap<Pid, u64>,
        quantum: u64,
    ) -> Result<RrReport, SchedError> {
        validate(pids, burst, quantum)?;

        let mut remaining: BTreeMap<Pid, u64> =
            pids.iter().map(|pid| (*pid, burst[pid])).collect();
        let mut queue: VecDeque<Pid> = pids.iter().copied().collect();
        let mut clock = SimClock::new();
        let mut per_process = BTreeMap::new();
        let mut slices = Vec::new();

        while let Some(pid) = queue.pop_front() {
            let left = remaining[&pid];
            let start = clock.now();
            if left > quantum {
                clock.advance_by(quantum);
                remaining.insert(pid, left - quantum);
                slices.push(Slice {
                    pid,
                    start,
                    cycles: quantum,
                });
                queue.push_back(pid);
            } else {
                clock.advance_by(left);
                remaining.insert(pid, 0);
                slices.push(Slice {
                    pid,
                    start,
                    cycles: left,
                });
                let turnaround = clock.now();
                let b = burst[&pid];
                per_process.insert(
                    pid,
                    RrOutcome {
                        burst: b,
                        wait: turnaround - b,
                        turnaround,
                    },
                );
            }
        }

        let n = pids.len() as f64;
        // Each turnaround fits in u64, their sum need not.
        let total_wait: u128 = per_process
            .values()
            .map(|o: &RrOutcome| u128::from(o.wait))
            .sum();
        let total_turnaround: u128 = per_process
            .values()
            .map(|o| u128::from(o.turnaround))
            .sum();

        Ok(RrReport {
            quantum,
            order: pids.to_vec(),
            per_process,
            avg_wait: total_wait as f64 / n,
            avg_turnaround: total_turnaround as f64 / n,
            clock: clock.now(),
            slices,
        })
    }

    /// Convenience entry point taking `(pid, burst)` pairs in dispatch order.
    pub fn schedule_jobs(jobs: &[RrJob], quantum: u64) -> Result<RrReport, SchedError> {
        let pids: Vec<Pid> = jobs.iter().map(|j| j.pid).collect();
        let mut burst = BTreeMap::new();
        for job in jobs {
            if burst.insert(job.pid, job.burst).is_some() {
                return Err(SchedError::invalid(format!("duplicate pid {}", job.pid)));
            }
        }
        Self::schedule(&pids, &burst, quantum)
    }
}

fn validate(pids: &[Pid], burst: &BTreeMap<Pid, u64>, quantum: u64) -> Result<(), SchedError> {
    if quantum == 0 {
        return Err(SchedError::invalid("quantum must be > 0"));
    }
    if pids.is_empty() {
        return Err(SchedError::invalid("process set is empty"));
    }
    let mut seen = BTreeSet::new();
    let mut total = 0u64;
    for pid in pids {
        if !seen.insert(*pid) {
            return Err(SchedError::invalid(format!("duplicate pid {pid}")));
        }
        match burst.get(pid) {
            None => return Err(SchedError::invalid(format!("pid {pid} has no burst time"))),
            Some(0) => {
                return Err(SchedError::invalid(format!(
                    "burst time for pid {pid} must be > 0"
                )))
            }
            Some(b) => {
                total = total
                    .checked_add(*b)
                    .ok_or_else(|| SchedError::invalid("total burst time overflows"))?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jobs(bursts: &[u64]) -> Vec<RrJob> {
        bursts
            .iter()
            .enumerate()
            .map(|(i, b)| RrJob {
                pid: Pid::new(i as u32 + 1),
                burst: *b,
            })
            .collect()
    }

    #[test]
    fn single_process_runs_to_completion() {
        let report = RoundRobinScheduler::schedule_jobs(&jobs(&[7]), 3).unwrap();
        let out = report.per_process[&Pid::new(1)];
        assert_eq!(out.turnaround, 7);
        assert_eq!(out.wait, 0);
        assert_eq!(report.slices.len(), 3);
    }

    #[test]
    fn remaining_equal_to_quantum_finishes_without_requeue() {
        let report = RoundRobinScheduler::schedule_jobs(&jobs(&[3, 3]), 3).unwrap();
        let pids: Vec<u32> = report.slices.iter().map(|s| s.pid.get()).collect();
        assert_eq!(pids, vec![1, 2]);
        assert_eq!(report.per_process[&Pid::new(1)].turnaround, 3);
        assert_eq!(report.per_process[&Pid::new(2)].turnaround, 6);
    }

    #[test]
    fn rejects_zero_quantum() {
        let err = RoundRobinScheduler::schedule_jobs(&jobs(&[1]), 0).unwrap_err();
        assert!(matches!(err, SchedError::InvalidInput { .. }));
    }

    #[test]
    fn rejects_empty_and_zero_burst() {
        assert!(RoundRobinScheduler::schedule_jobs(&[], 2).is_err());
        assert!(RoundRobinScheduler::schedule_jobs(&jobs(&[4, 0]), 2).is_err());
    }

    #[test]
    fn rejects_duplicate_pid() {
        let dup = vec![
            RrJob {
                pid: Pid::new(1),
                burst: 2,
            },
            RrJob {
                pid: Pid::new(1),
                burst: 3,
            },
        ];
        assert!(RoundRobinScheduler::schedule_jobs(&dup, 2).is_err());

        let mut burst = BTreeMap::new();
        burst.insert(Pid::new(1), 2);
        let err = RoundRobinScheduler::schedule(&[Pid::new(1), Pid::new(1)], &burst, 2);
        assert!(err.is_err());
    }

    #[test]
    fn total_burst_overflow_is_invalid() {
        let big = vec![
            RrJob {
                pid: Pid::new(1),
                burst: u64::MAX,
            },
            RrJob {
                pid: Pid::new(2),
                burst: 1,
            },
        ];
        let err = RoundRobinScheduler::schedule_jobs(&big, u64::MAX).unwrap_err();
        assert!(matches!(err, SchedError::InvalidInput { .. }));
    }

    #[test]
    fn averages_do_not_overflow_near_u64_max() {
        let half = u64::MAX / 2;
        let report = RoundRobinScheduler::schedule_jobs(&jobs(&[half, half]), u64::MAX).unwrap();
        assert_eq!(report.clock, half * 2);
        assert_eq!(report.per_process[&Pid::new(2)].turnaround, half * 2);
        assert!(report.avg_turnaround > half as f64);
    }

    #[test]
    fn missing_burst_is_invalid() {
        let burst = BTreeMap::new();
        assert!(RoundRobinScheduler::schedule(&[Pid::new(9)], &burst, 2).is_err());
    }
}
