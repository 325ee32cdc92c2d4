use std::cell::RefCell;
use std::error::Error;
use std::rc::Rc;

use thiserror::Error;
use tracing::{debug, trace};

use crate::config::{ScheduleMode, SchedulerConfig};
use crate::deadline::Deadline;
use crate::runtime::Runtime;

#[derive(Debug, Error)]
pub enum StepError {
    #[error("unit of work failed: {0}")]
    Task(#[source] Box<dyn Error + Send + Sync + 'static>),
}

impl StepError {
    /// The task's own error, if it has type `E`.
    pub fn downcast_ref<E: Error + 'static>(&self) -> Option<&E> {
        match self {
            StepError::Task(e) => e.downcast_ref::<E>(),
        }
    }
}

/// Resumable work split into units.
pub trait Task {
    type Error: Error + Send + Sync + 'static;

    fn has_pending_work(&self) -> bool;
    /// Perform exactly one unit. The task keeps its own continuation.
    fn perform_unit(&mut self) -> Result<(), Self::Error>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SliceReport {
    pub units: usize,
    /// Stopped because the slice ran low while work was still pending.
    pub yielded: bool,
}

/// Perform units until the task is done or the slice runs low.
///
/// The deadline is checked after each unit, so a slice always makes progress.
pub fn run_slice<T: Task + ?Sized>(
    task: &mut T,
    deadline: &dyn Deadline,
    config: &SchedulerConfig,
) -> Result<SliceReport, T::Error> {
    let mut report = SliceReport::default();
    let mut should_yield = false;
    while task.has_pending_work() && !should_yield {
        task.perform_unit()?;
        report.units += 1;
        should_yield = deadline.time_remaining() < config.yield_threshold;
    }
    report.yielded = should_yield && task.has_pending_work();
    Ok(report)
}

/// Perform every pending unit without yielding. Returns the unit count.
pub fn drain<T: Task + ?Sized>(task: &mut T) -> Result<usize, T::Error> {
    let mut units = 0;
    while task.has_pending_work() {
        task.perform_unit()?;
        units += 1;
    }
    Ok(units)
}

/// Handle to a running work loop.
///
/// The loop never stops: every callback re-arms the next one before it
/// returns, even when the slice failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scheduler {
    idle: bool,
}

impl Scheduler {
    pub fn start<T: Task + 'static>(
        task: Rc<RefCell<T>>,
        runtime: Rc<dyn Runtime>,
        config: SchedulerConfig,
    ) -> Self {
        let idle = match config.mode {
            ScheduleMode::Auto | ScheduleMode::Idle => runtime.supports_idle(),
            ScheduleMode::Timer => false,
        };
        if config.mode == ScheduleMode::Idle && !idle {
            debug!("runtime has no idle slices, falling back to timer");
        }
        if idle {
            arm_idle(task, runtime, config);
        } else {
            arm_timer(task, runtime);
        }
        Self { idle }
    }

    /// Whether the loop runs on idle slices rather than the timer.
    pub fn uses_idle(&self) -> bool {
        self.idle
    }
}

fn arm_idle<T: Task + 'static>(task: Rc<RefCell<T>>, runtime: Rc<dyn Runtime>, config: SchedulerConfig) {
    let rt = Rc::clone(&runtime);
    runtime.request_idle_slice(Box::new(move |deadline: &dyn Deadline| -> Result<(), StepError> {
        let result = run_slice(&mut *task.borrow_mut(), deadline, &config);
        arm_idle(task, rt, config);
        let report = result.map_err(|e| StepError::Task(Box::new(e)))?;
        if report.units > 0 {
            trace!(units = report.units, yielded = report.yielded, "idle slice");
        }
        Ok(())
    }));
}

fn arm_timer<T: Task + 'static>(task: Rc<RefCell<T>>, runtime: Rc<dyn Runtime>) {
    let rt = Rc::clone(&runtime);
    runtime.schedule_asap(Box::new(move || -> Result<(), StepError> {
        let result = drain(&mut *task.borrow_mut());
        arm_timer(task, rt);
        let units = result.map_err(|e| StepError::Task(Box::new(e)))?;
        if units > 0 {
            trace!(units, "timer drain");
        }
        Ok(())
    }));
}
