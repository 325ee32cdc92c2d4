use std::cell::Cell;
use std::time::{Duration, Instant};

/// Remaining time in the current idle slice.
pub trait Deadline {
    fn time_remaining(&self) -> Duration;
}

/// Slice bounded by the wall clock.
#[derive(Debug, Clone, Copy)]
pub struct InstantDeadline {
    end: Instant,
}

impl InstantDeadline {
    pub fn after(budget: Duration) -> Self {
        Self {
            end: Instant::now() + budget,
        }
    }
}

impl Deadline for InstantDeadline {
    fn time_remaining(&self) -> Duration {
        self.end.saturating_duration_since(Instant::now())
    }
}

/// Deterministic slice: every query spends one millisecond of a fixed
/// budget, so a budget of `n` lets exactly `n` units run before yielding
/// with the default 1ms threshold.
#[derive(Debug)]
pub struct UnitBudget {
    remaining: Cell<u64>,
}

impl UnitBudget {
    pub fn new(units: u64) -> Self {
        Self {
            remaining: Cell::new(units),
        }
    }
}

impl Deadline for UnitBudget {
    fn time_remaining(&self) -> Duration {
        let left = self.remaining.get().saturating_sub(1);
        self.remaining.set(left);
        Duration::from_millis(left)
    }
}
