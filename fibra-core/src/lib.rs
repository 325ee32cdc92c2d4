//! Cooperative scheduling for fibra.
//!
//! Work is split into small units that run inside idle slices handed out by
//! the host runtime. Between units the loop checks how much of the slice is
//! left and gives control back once it runs low, picking up where it stopped
//! on the next slice. Hosts without an idle facility get a zero-delay timer
//! that drains all pending work at once.

pub mod config;
pub mod deadline;
pub mod runtime;
pub mod work_loop;

pub use config::{ScheduleMode, SchedulerConfig};
pub use deadline::{Deadline, InstantDeadline, UnitBudget};
pub use runtime::{AsapCallback, IdleCallback, ManualRuntime, Runtime};
pub use work_loop::{drain, run_slice, Scheduler, SliceReport, StepError, Task};
