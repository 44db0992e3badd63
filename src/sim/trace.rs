//! Bounded trace ring for lifecycle runs.
//!
//! Events are retained in a fixed-capacity ring. When the ring is full, the
//! oldest events are evicted first. The ring is included in `SimReport` so a
//! failing seed can be diagnosed without re-running.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::process::Pid;

/// Lifecycle transitions and notable loop decisions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TraceEvent {
    Unblock {
        round: u64,
        pid: Pid,
    },
    Dispatch {
        round: u64,
        pid: Pid,
        n_cpu: u64,
    },
    /// Dequeued pid was terminated in the persisted table.
    Skip {
        round: u64,
        pid: Pid,
    },
    Block {
        pid: Pid,
        /// 1-based cycle within the current quantum.
        cycle_in_slice: u64,
        nes: u64,
    },
    Preempt {
        pid: Pid,
        cycles: u64,
    },
    Terminate {
        pid: Pid,
        clock: u64,
    },
    Idle {
        round: u64,
        blocked: u32,
    },
    PersistFailed {
        round: u64,
    },
}

/// Fixed-capacity ring buffer of trace events.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TraceRing {
    cap: usize,
    buf: VecDeque<TraceEvent>,
}

impl TraceRing {
    /// Create a trace ring with at least one slot.
    pub fn new(cap: usize) -> Self {
        let cap = cap.max(1);
        Self {
            cap,
            buf: VecDeque::with_capacity(cap.min(4096)),
        }
    }

    #[inline(always)]
    pub fn cap(&self) -> usize {
        self.cap
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Push a new event, evicting the oldest if at capacity.
    #[inline(always)]
    pub fn push(&mut self, ev: TraceEvent) {
        if self.buf.len() == self.cap {
            self.buf.pop_front();
        }
        self.buf.push_back(ev);
    }

    /// Snapshot the ring contents in chronological order.
    pub fn dump(&self) -> Vec<TraceEvent> {
        self.buf.iter().cloned().collect()
    }
}
