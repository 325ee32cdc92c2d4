use std::cell::RefCell;
use std::collections::VecDeque;

use crate::deadline::Deadline;
use crate::work_loop::StepError;

pub type IdleCallback = Box<dyn FnOnce(&dyn Deadline) -> Result<(), StepError>>;
pub type AsapCallback = Box<dyn FnOnce() -> Result<(), StepError>>;

/// The host's event loop, as seen by the scheduler.
///
/// Callbacks are queued and later invoked by the host; an error returned by a
/// callback is the failure of that scheduling step and belongs to the host.
pub trait Runtime {
    /// Whether `request_idle_slice` is available. Schedulers check this before
    /// asking for idle time.
    fn supports_idle(&self) -> bool;
    fn request_idle_slice(&self, callback: IdleCallback);
    /// Run `callback` as soon as possible (a zero-delay timer).
    fn schedule_asap(&self, callback: AsapCallback);
}

/// Single-threaded event loop driven by hand.
///
/// Nothing runs until the owner calls [`run_idle_slice`](Self::run_idle_slice)
/// or [`run_timer`](Self::run_timer), which makes scheduling fully
/// deterministic in tests and lets a demo pump the loop itself.
pub struct ManualRuntime {
    idle: bool,
    idle_queue: RefCell<VecDeque<IdleCallback>>,
    timers: RefCell<VecDeque<AsapCallback>>,
}

impl Default for ManualRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualRuntime {
    pub fn new() -> Self {
        Self {
            idle: true,
            idle_queue: RefCell::new(VecDeque::new()),
            timers: RefCell::new(VecDeque::new()),
        }
    }

    /// A runtime that offers no idle slices, only timers.
    pub fn without_idle() -> Self {
        Self {
            idle: false,
            ..Self::new()
        }
    }

    pub fn pending_idle(&self) -> usize {
        self.idle_queue.borrow().len()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.borrow().len()
    }

    /// Run the oldest idle callback against `deadline`.
    /// Returns `Ok(false)` when none was queued.
    pub fn run_idle_slice(&self, deadline: &dyn Deadline) -> Result<bool, StepError> {
        let Some(callback) = self.idle_queue.borrow_mut().pop_front() else {
            return Ok(false);
        };
        callback(deadline)?;
        Ok(true)
    }

    /// Fire the oldest timer. Returns `Ok(false)` when none was queued.
    pub fn run_timer(&self) -> Result<bool, StepError> {
        let Some(callback) = self.timers.borrow_mut().pop_front() else {
            return Ok(false);
        };
        callback()?;
        Ok(true)
    }
}

impl Runtime for ManualRuntime {
    fn supports_idle(&self) -> bool {
        self.idle
    }

    fn request_idle_slice(&self, callback: IdleCallback) {
        self.idle_queue.borrow_mut().push_back(callback);
    }

    fn schedule_asap(&self, callback: AsapCallback) {
        self.timers.borrow_mut().push_back(callback);
    }
}
