//! CPU scheduling models over a logical cycle clock.
//!
//! ## Scope
//! - `RoundRobinScheduler`: pure Round Robin over fixed bursts, reporting
//!   per-process waiting and turnaround times.
//! - `LifecycleSimulator`: processes move through READY / RUNNING / BLOCKED /
//!   TERMINATED with randomized I/O blocking and probabilistic unblocking.
//!   The process table is saved after every transition so an outside reader
//!   can observe the run, and a new instance can resume from it.
//!
//! ## Key invariants
//! - RR: `turnaround == wait + burst`; the final clock equals the sum of
//!   bursts.
//! - Lifecycle: `cp + total_remaining` is constant per process; TERMINATED is
//!   absorbing; with `p_io == 0` the dispatch order equals RR's.
//! - Randomness is injected (`RandomSource`), so runs replay from a seed.
//!
//! ## Collaborators
//! - `table::ProcessTable`: persistence (`FileTable`, `InMemoryTable`).
//! - `display::TableDisplay`: human-readable snapshots.

pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod lifecycle;
pub mod process;
pub mod round_robin;
pub mod sim;
pub mod table;
#[cfg(test)]
pub mod test_utils;

pub use config::RunOptions;
pub use display::{NullDisplay, TableDisplay, TextDisplay};
pub use error::{Inconsistency, PersistError, SchedError};
pub use lifecycle::{LifecycleSimulator, SimConfig, SimReport};
pub use process::{Pid, ProcState, ProcessRecord};
pub use round_robin::{RoundRobinScheduler, RrJob, RrOutcome, RrReport, Slice};
pub use sim::{RandomSource, ScriptedRandom, SimRng};
pub use table::{FileTable, InMemoryTable, ProcessTable};
