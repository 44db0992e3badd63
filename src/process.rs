//! Process identity, lifecycle states, and the persisted process row.
//!
//! Invariants (lifecycle view):
//! - `cp + total_remaining` is constant for the life of a process.
//! - `TERMINATED` is absorbing; `total_remaining == 0` exactly when terminated
//!   by execution.
//! - `nes` and `n_cpu` never decrease.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Stable process identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pid(u32);

impl Pid {
    #[inline(always)]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[inline(always)]
    pub fn get(self) -> u32 {
        self.0
    }

    #[inline(always)]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of a simulated process.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcState {
    Ready,
    Running,
    Blocked,
    Terminated,
}

impl ProcState {
    pub const ALL: [ProcState; 4] = [
        ProcState::Ready,
        ProcState::Running,
        ProcState::Blocked,
        ProcState::Terminated,
    ];

    /// Table spelling of the state.
    pub fn as_str(self) -> &'static str {
        match self {
            ProcState::Ready => "READY",
            ProcState::Running => "RUNNING",
            ProcState::Blocked => "BLOCKED",
            ProcState::Terminated => "TERMINATED",
        }
    }

    #[inline(always)]
    pub fn is_terminal(self) -> bool {
        self == ProcState::Terminated
    }
}

impl fmt::Display for ProcState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a state name is not one of the four table spellings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownState(pub String);

impl fmt::Display for UnknownState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown process state {:?}", self.0)
    }
}

impl std::error::Error for UnknownState {}

impl FromStr for ProcState {
    type Err = UnknownState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProcState::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| UnknownState(s.to_string()))
    }
}

/// One row of the process table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessRecord {
    pub pid: Pid,
    /// Cycles of work left (TP).
    pub total_remaining: u64,
    /// Cycles executed so far.
    pub cp: u64,
    /// EP.
    pub state: ProcState,
    /// I/O blocking events experienced.
    pub nes: u64,
    /// Times the process was dispatched.
    pub n_cpu: u64,
}

impl ProcessRecord {
    /// Fresh READY record with `total` cycles of work.
    pub fn new(pid: Pid, total: u64) -> Self {
        Self {
            pid,
            total_remaining: total,
            cp: 0,
            state: ProcState::Ready,
            nes: 0,
            n_cpu: 0,
        }
    }

    /// Original total work, reconstructed from executed + remaining cycles.
    #[inline(always)]
    pub fn total_work(&self) -> u64 {
        self.cp.saturating_add(self.total_remaining)
    }

    #[inline(always)]
    pub fn is_terminated(&self) -> bool {
        self.state.is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_names_parse_back() {
        for state in ProcState::ALL {
            assert_eq!(state.as_str().parse::<ProcState>(), Ok(state));
        }
        assert!("PRONTO".parse::<ProcState>().is_err());
    }

    #[test]
    fn new_record_is_ready_with_full_work() {
        let rec = ProcessRecord::new(Pid::new(2), 7000);
        assert_eq!(rec.state, ProcState::Ready);
        assert_eq!(rec.total_work(), 7000);
        assert_eq!((rec.cp, rec.nes, rec.n_cpu), (0, 0, 0));
    }

    #[test]
    fn state_serializes_as_table_spelling() {
        let json = serde_json::to_string(&ProcState::Terminated).unwrap();
        assert_eq!(json, "\"TERMINATED\"");
    }
}
