//! Merge of in-memory and persisted process state before dispatch.
//!
//! Precedence:
//! - No persisted row: keep the in-memory record unchanged.
//! - Persisted row for a different pid: ignored, reported as `UnknownPid`.
//! - Otherwise the persisted row wins for every field it carries
//!   (state, remaining work, cp, nes, n_cpu).
//!
//! A persisted state that differs from the in-memory state is reported as a
//! warning; it is never an error.

use crate::error::Inconsistency;
use crate::process::{ProcState, ProcessRecord};

/// Outcome of `reconcile`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reconciled {
    pub record: ProcessRecord,
    pub warning: Option<Inconsistency>,
}

pub fn reconcile(in_memory: &ProcessRecord, persisted: Option<&ProcessRecord>) -> Reconciled {
    let Some(stored) = persisted else {
        return Reconciled {
            record: *in_memory,
            warning: None,
        };
    };

    if stored.pid != in_memory.pid {
        return Reconciled {
            record: *in_memory,
            warning: Some(Inconsistency::UnknownPid {
                requested: in_memory.pid,
                found: stored.pid,
            }),
        };
    }

    let warning = match (in_memory.state, stored.state) {
        (mem, disk) if mem == disk => None,
        (ProcState::Ready, ProcState::Terminated) => {
            Some(Inconsistency::TerminatedWhileReady { pid: in_memory.pid })
        }
        (ProcState::Ready, ProcState::Blocked) => {
            Some(Inconsistency::BlockedWhileReady { pid: in_memory.pid })
        }
        (mem, disk) => Some(Inconsistency::StateOverride {
            pid: in_memory.pid,
            in_memory: mem,
            persisted: disk,
        }),
    };

    Reconciled {
        record: *stored,
        warning,
    }
}
