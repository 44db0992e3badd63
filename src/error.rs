//! Error taxonomy for scheduling and simulation.
//!
//! - `SchedError` is returned by the public entry points. Input validation
//!   failures are reported before any state is mutated.
//! - `PersistError` covers the process table backends. The simulator treats it
//!   as non-fatal during a run (see `lifecycle::runner`).
//! - `Inconsistency` is a warning value produced by reconciliation; it is
//!   never returned as an `Err`.

use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::process::{Pid, ProcState};

/// Top-level error for scheduler and simulator entry points.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SchedError {
    /// Precondition violation (non-positive quantum/burst, duplicate pid,
    /// empty process set, probability out of range).
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },
    /// Process table could not be read or written.
    #[error(transparent)]
    Persistence(#[from] PersistError),
    /// The round cap was reached before every process terminated.
    #[error("no progress: {rounds} rounds elapsed without all processes terminating")]
    NoProgress { rounds: u64 },
    /// A configuration file could not be read.
    #[error("cannot read config {}: {source}", .path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// A configuration file could not be parsed.
    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),
    /// A report could not be serialized for output.
    #[error("cannot write report: {source}")]
    Output {
        #[source]
        source: serde_json::Error,
    },
}

impl SchedError {
    /// Creates an `InvalidInput` error.
    #[inline]
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Bad arguments or configuration, as opposed to a failed run.
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput { .. } | Self::Config(_) | Self::ConfigRead { .. }
        )
    }
}

/// Errors from process table backends.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PersistError {
    /// I/O error while reading or writing the table.
    #[error("process table I/O error: {0}")]
    Io(#[from] io::Error),
    /// The table text did not match the expected layout.
    #[error("process table format error at line {line}: {detail}")]
    Format { line: usize, detail: String },
    /// Backend-specific failure (used by in-memory fault injection).
    #[error("process table backend error: {detail}")]
    Backend { detail: String },
}

impl PersistError {
    #[inline]
    pub fn format(line: usize, detail: impl Into<String>) -> Self {
        Self::Format {
            line,
            detail: detail.into(),
        }
    }

    #[inline]
    pub fn backend(detail: impl Into<String>) -> Self {
        Self::Backend {
            detail: detail.into(),
        }
    }
}

/// Disagreement between in-memory and persisted state found on dispatch.
///
/// Resolved by the precedence rule in `lifecycle::reconcile` and surfaced as
/// a warning.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Inconsistency {
    /// The persisted row names a pid other than the one being dispatched.
    ///
    /// The bundled backends filter by pid in `load`, so only a custom
    /// `ProcessTable` that overrides `load` can produce this. Rows for pids
    /// outside the active set are never dispatched; `resume` rejects them.
    UnknownPid { requested: Pid, found: Pid },
    /// Persisted state is TERMINATED while the pid was queued as READY.
    TerminatedWhileReady { pid: Pid },
    /// Persisted state is BLOCKED while the pid was queued as READY.
    BlockedWhileReady { pid: Pid },
    /// Persisted state overrides a non-terminal in-memory state.
    StateOverride {
        pid: Pid,
        in_memory: ProcState,
        persisted: ProcState,
    },
}

impl std::fmt::Display for Inconsistency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownPid { requested, found } => {
                write!(f, "persisted row for pid {found} returned for pid {requested}")
            }
            Self::TerminatedWhileReady { pid } => {
                write!(f, "pid {pid} is TERMINATED in the table but READY in memory")
            }
            Self::BlockedWhileReady { pid } => {
                write!(f, "pid {pid} is BLOCKED in the table but READY in memory")
            }
            Self::StateOverride {
                pid,
                in_memory,
                persisted,
            } => write!(f, "pid {pid} state {in_memory} replaced by persisted {persisted}"),
        }
    }
}
