//! Stochastic process lifecycle simulator.
//!
//! Each round:
//! 1. Every blocked process independently becomes READY with probability
//!    `p_unblock` and joins the tail of the ready queue.
//! 2. If nothing is ready the round is idle; the next round retries step 1.
//! 3. The ready head is dequeued and reconciled against the persisted table.
//!    Rows the table marks TERMINATED are skipped without ending the round.
//! 4. The process runs up to `min(quantum, remaining)` cycles. Each cycle may
//!    block it on I/O with probability `p_io`; the rest of the quantum is
//!    forfeited.
//! 5. A process that used its whole slice without finishing or blocking goes
//!    back to the tail of the ready queue.
//!
//! The full table is saved after every mutation. A failed save does not stop
//! the run: it is logged and counted, and the next save rewrites everything.

use std::collections::{BTreeMap, VecDeque};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::config::SimConfig;
use super::reconcile::reconcile;
use crate::display::TableDisplay;
use crate::error::{Inconsistency, SchedError};
use crate::process::{Pid, ProcState, ProcessRecord};
use crate::round_robin::Slice;
use crate::sim::clock::SimClock;
use crate::sim::rng::{RandomSource, SimRng};
use crate::sim::trace::{TraceEvent, TraceRing};
use crate::table::ProcessTable;

/// Result of a completed simulation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimReport {
    pub seed: Option<u64>,
    pub rounds: u64,
    /// Rounds in which no process could be dispatched.
    pub idle_rounds: u64,
    /// Total cycles executed.
    pub clock: u64,
    pub records: Vec<ProcessRecord>,
    /// Clock value at which each process terminated by execution.
    pub completion: BTreeMap<Pid, u64>,
    pub slices: Vec<Slice>,
    pub persist_failures: u64,
    pub last_persist_error: Option<String>,
    pub warnings: Vec<Inconsistency>,
    pub trace: Vec<TraceEvent>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TurnEnd {
    Terminated,
    Blocked { cycle_in_slice: u64 },
    QuantumExpired,
}

pub struct LifecycleSimulator<T, U, I> {
    cfg: SimConfig,
    table: T,
    unblock_rng: U,
    io_rng: I,
    seed: Option<u64>,
    /// Indexed by pid.
    records: Vec<ProcessRecord>,
    ready: VecDeque<Pid>,
    /// Membership only; kept in insertion order so draws replay identically.
    blocked: Vec<Pid>,
    clock: SimClock,
    round: u64,
    idle_rounds: u64,
    trace: TraceRing,
    slices: Vec<Slice>,
    completion: BTreeMap<Pid, u64>,
    warnings: Vec<Inconsistency>,
    persist_failures: u64,
    last_persist_error: Option<String>,
    persist_pending: bool,
}

impl<T: ProcessTable> LifecycleSimulator<T, SimRng, SimRng> {
    /// Simulator whose unblock and I/O draws come from two independent
    /// streams derived from `seed`.
    pub fn seeded(cfg: SimConfig, table: T, seed: u64) -> Result<Self, SchedError> {
        let mut sim = Self::new(cfg, table, SimRng::stream(seed, 0), SimRng::stream(seed, 1))?;
        sim.seed = Some(seed);
        Ok(sim)
    }

    /// Seeded variant of [`LifecycleSimulator::resume`].
    pub fn resume_seeded(cfg: SimConfig, table: T, seed: u64) -> Result<Self, SchedError> {
        let mut sim =
            Self::resume(cfg, table, SimRng::stream(seed, 0), SimRng::stream(seed, 1))?;
        sim.seed = Some(seed);
        Ok(sim)
    }
}

impl<T, U, I> LifecycleSimulator<T, U, I>
where
    T: ProcessTable,
    U: RandomSource,
    I: RandomSource,
{
    /// Fresh simulation: pid `i` gets `cfg.workloads[i]` and every process
    /// starts READY, queued in pid order.
    pub fn new(cfg: SimConfig, table: T, unblock_rng: U, io_rng: I) -> Result<Self, SchedError> {
        cfg.validate()?;
        let records: Vec<ProcessRecord> = cfg
            .workloads
            .iter()
            .enumerate()
            .map(|(i, w)| ProcessRecord::new(Pid::new(i as u32), *w))
            .collect();
        let ready = records.iter().map(|r| r.pid).collect();
        Ok(Self::build(cfg, table, unblock_rng, io_rng, records, ready, Vec::new()))
    }

    /// Continue a run from the rows currently in `table`.
    ///
    /// Rows must cover pids `0..N` exactly. RUNNING rows (a writer that
    /// stopped mid-slice) resume as READY. `cfg.workloads` is replaced by
    /// each row's `cp + remaining`.
    pub fn resume(
        mut cfg: SimConfig,
        table: T,
        unblock_rng: U,
        io_rng: I,
    ) -> Result<Self, SchedError> {
        let mut records = table.load_all()?;
        if records.is_empty() {
            return Err(SchedError::invalid("no persisted process table to resume"));
        }
        for (i, rec) in records.iter().enumerate() {
            if rec.pid.index() != i {
                return Err(SchedError::invalid(format!(
                    "persisted pids must be 0..{}, found pid {} at row {}",
                    records.len(),
                    rec.pid,
                    i
                )));
            }
        }
        cfg.workloads = records.iter().map(|r| r.total_work().max(1)).collect();
        cfg.validate()?;

        let mut ready = VecDeque::new();
        let mut blocked = Vec::new();
        for rec in records.iter_mut() {
            match rec.state {
                ProcState::Running => {
                    rec.state = ProcState::Ready;
                    ready.push_back(rec.pid);
                }
                ProcState::Ready => ready.push_back(rec.pid),
                ProcState::Blocked => blocked.push(rec.pid),
                ProcState::Terminated => {}
            }
        }
        log::info!(
            "resuming from persisted table: {} ready, {} blocked, {} terminated",
            ready.len(),
            blocked.len(),
            records.len() - ready.len() - blocked.len()
        );
        Ok(Self::build(cfg, table, unblock_rng, io_rng, records, ready, blocked))
    }

    fn build(
        cfg: SimConfig,
        table: T,
        unblock_rng: U,
        io_rng: I,
        records: Vec<ProcessRecord>,
        ready: VecDeque<Pid>,
        blocked: Vec<Pid>,
    ) -> Self {
        let trace = TraceRing::new(cfg.trace_capacity);
        Self {
            cfg,
            table,
            unblock_rng,
            io_rng,
            seed: None,
            records,
            ready,
            blocked,
            clock: SimClock::new(),
            round: 0,
            idle_rounds: 0,
            trace,
            slices: Vec::new(),
            completion: BTreeMap::new(),
            warnings: Vec::new(),
            persist_failures: 0,
            last_persist_error: None,
            persist_pending: false,
        }
    }

    pub fn records(&self) -> &[ProcessRecord] {
        &self.records
    }

    pub fn ready_queue(&self) -> impl Iterator<Item = Pid> + '_ {
        self.ready.iter().copied()
    }

    pub fn blocked(&self) -> &[Pid] {
        &self.blocked
    }

    pub fn round(&self) -> u64 {
        self.round
    }

    /// Reconciliation warnings recorded so far.
    pub fn warnings(&self) -> &[Inconsistency] {
        &self.warnings
    }

    pub fn all_terminated(&self) -> bool {
        self.records.iter().all(ProcessRecord::is_terminated)
    }

    /// Run until every process is TERMINATED.
    ///
    /// Returns `SchedError::NoProgress` once `cfg.max_rounds` rounds have
    /// elapsed without completion.
    pub fn run(mut self, display: &mut dyn TableDisplay) -> Result<SimReport, SchedError> {
        log::info!(
            "simulation started: {} processes, quantum {}, p_io {}, p_unblock {}",
            self.records.len(),
            self.cfg.quantum,
            self.cfg.p_io,
            self.cfg.p_unblock
        );
        self.persist();
        display.snapshot("Initial state", &self.records);

        while !self.all_terminated() {
            if self.round >= self.cfg.max_rounds {
                log::warn!(
                    "round cap {} reached with {} blocked and {} ready; last events: {:?}",
                    self.cfg.max_rounds,
                    self.blocked.len(),
                    self.ready.len(),
                    self.trace.dump().iter().rev().take(8).collect::<Vec<_>>()
                );
                return Err(SchedError::NoProgress { rounds: self.round });
            }
            self.step_round();

            let every = self.cfg.snapshot_every;
            if every > 0 && self.round % every == 0 {
                display.snapshot(&format!("State after round {}", self.round), &self.records);
            }
        }

        if self.persist_pending {
            self.persist();
        }
        log::info!(
            "simulation finished after {} rounds and {} cycles",
            self.round,
            self.clock.now()
        );
        display.snapshot("Final state", &self.records);
        Ok(self.into_report())
    }

    /// Execute one round. Callers must check `all_terminated` first.
    pub fn step_round(&mut self) {
        self.round += 1;
        self.unblock_attempt();
        match self.next_dispatchable() {
            Some(pid) => self.run_turn(pid),
            None if self.all_terminated() => {}
            None => self.idle_round(),
        }
    }

    fn unblock_attempt(&mut self) {
        if self.blocked.is_empty() {
            return;
        }
        let p = self.cfg.p_unblock;
        let rng = &mut self.unblock_rng;
        let mut woken = Vec::new();
        self.blocked.retain(|pid| {
            if rng.chance(p) {
                woken.push(*pid);
                false
            } else {
                true
            }
        });
        if woken.is_empty() {
            return;
        }

        for pid in &woken {
            self.records[pid.index()].state = ProcState::Ready;
            self.ready.push_back(*pid);
            self.trace.push(TraceEvent::Unblock {
                round: self.round,
                pid: *pid,
            });
        }
        log::info!("[round {}] unblocked: {}", self.round, join_pids(&woken));
        self.persist();
    }

    /// Dequeue ready pids until one survives reconciliation.
    fn next_dispatchable(&mut self) -> Option<Pid> {
        while let Some(pid) = self.ready.pop_front() {
            let idx = pid.index();

            // A stale table must not roll back progress made since the last
            // successful save.
            if self.persist_pending {
                self.persist();
            }
            if !self.persist_pending {
                let persisted = self.table.load(pid);
                let merged = reconcile(&self.records[idx], persisted.as_ref());
                if let Some(warning) = merged.warning {
                    log::warn!("[round {}] reconciled pid {pid}: {warning}", self.round);
                    self.warnings.push(warning);
                }
                self.records[idx] = merged.record;
            } else {
                log::debug!("[round {}] table stale, skipping reconcile for pid {pid}", self.round);
            }

            match self.records[idx].state {
                ProcState::Terminated => {
                    log::info!("[round {}] pid {pid} already TERMINATED, skipping", self.round);
                    self.trace.push(TraceEvent::Skip {
                        round: self.round,
                        pid,
                    });
                }
                ProcState::Blocked => {
                    if !self.blocked.contains(&pid) {
                        self.blocked.push(pid);
                    }
                }
                ProcState::Ready | ProcState::Running => return Some(pid),
            }
        }
        None
    }

    fn run_turn(&mut self, pid: Pid) {
        let idx = pid.index();
        let round = self.round;

        let rec = &mut self.records[idx];
        rec.state = ProcState::Running;
        rec.n_cpu += 1;
        let n_cpu = rec.n_cpu;
        let budget = self.cfg.quantum.min(rec.total_remaining);
        self.trace.push(TraceEvent::Dispatch { round, pid, n_cpu });
        log::info!("[round {round}] dispatching pid {pid} (n_cpu {n_cpu})");
        self.persist();

        let start = self.clock.now();
        let mut executed = 0u64;
        let mut end = if budget == 0 {
            TurnEnd::Terminated
        } else {
            TurnEnd::QuantumExpired
        };
        for _ in 0..budget {
            self.clock.tick();
            executed += 1;
            let rec = &mut self.records[idx];
            rec.cp += 1;
            rec.total_remaining -= 1;
            if rec.total_remaining == 0 {
                end = TurnEnd::Terminated;
                break;
            }
            if self.io_rng.chance(self.cfg.p_io) {
                end = TurnEnd::Blocked {
                    cycle_in_slice: executed,
                };
                break;
            }
        }
        if executed > 0 {
            self.slices.push(Slice {
                pid,
                start,
                cycles: executed,
            });
        }

        let now = self.clock.now();
        let rec = &mut self.records[idx];
        debug_assert!(rec.total_remaining == 0 || end != TurnEnd::Terminated);
        match end {
            TurnEnd::Terminated => {
                rec.state = ProcState::Terminated;
                self.completion.insert(pid, now);
                self.trace.push(TraceEvent::Terminate { pid, clock: now });
                log::info!("  pid {pid} finished after {} cycles", rec.cp);
            }
            TurnEnd::Blocked { cycle_in_slice } => {
                rec.state = ProcState::Blocked;
                rec.nes += 1;
                let nes = rec.nes;
                self.blocked.push(pid);
                self.trace.push(TraceEvent::Block {
                    pid,
                    cycle_in_slice,
                    nes,
                });
                log::info!("  pid {pid} blocked on I/O at cycle {cycle_in_slice} of its quantum (nes {nes})");
            }
            TurnEnd::QuantumExpired => {
                rec.state = ProcState::Ready;
                self.ready.push_back(pid);
                self.trace.push(TraceEvent::Preempt {
                    pid,
                    cycles: executed,
                });
                log::debug!("  pid {pid} quantum expired after {executed} cycles: RUNNING -> READY");
            }
        }
        self.persist();
    }

    fn idle_round(&mut self) {
        self.idle_rounds += 1;
        self.trace.push(TraceEvent::Idle {
            round: self.round,
            blocked: self.blocked.len() as u32,
        });
        log::debug!(
            "[round {}] no READY process, {} blocked; retrying unblock",
            self.round,
            self.blocked.len()
        );
        if self.cfg.idle_delay_ms > 0 {
            std::thread::sleep(Duration::from_millis(self.cfg.idle_delay_ms));
        }
    }

    fn persist(&mut self) {
        match self.table.save(&self.records) {
            Ok(()) => self.persist_pending = false,
            Err(err) => {
                self.persist_failures += 1;
                self.persist_pending = true;
                log::warn!("[round {}] failed to save process table: {err}", self.round);
                self.last_persist_error = Some(err.to_string());
                self.trace.push(TraceEvent::PersistFailed { round: self.round });
            }
        }
    }

    fn into_report(self) -> SimReport {
        SimReport {
            seed: self.seed,
            rounds: self.round,
            idle_rounds: self.idle_rounds,
            clock: self.clock.now(),
            records: self.records,
            completion: self.completion,
            slices: self.slices,
            persist_failures: self.persist_failures,
            last_persist_error: self.last_persist_error,
            warnings: self.warnings,
            trace: self.trace.dump(),
        }
    }
}

fn join_pids(pids: &[Pid]) -> String {
    pids.iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
