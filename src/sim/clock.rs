//! Logical cycle clock.
//!
//! All simulated time is a cycle counter. The clock only advances when a
//! scheduler explicitly executes cycles, which keeps runs replayable.

/// Monotonic cycle counter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SimClock {
    now: u64,
}

impl SimClock {
    /// Create a new clock at cycle 0.
    pub fn new() -> Self {
        Self { now: 0 }
    }

    /// Current cycle.
    #[inline(always)]
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Advance by one cycle and return the new value.
    #[inline(always)]
    pub fn tick(&mut self) -> u64 {
        self.now = self.now.saturating_add(1);
        self.now
    }

    /// Advance by a delta, saturating on overflow.
    #[inline(always)]
    pub fn advance_by(&mut self, dt: u64) {
        self.now = self.now.saturating_add(dt);
    }
}
