use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use fibra_core::{
    drain, run_slice, ManualRuntime, ScheduleMode, Scheduler, SchedulerConfig, Task, UnitBudget,
};

#[derive(Debug, PartialEq)]
struct Boom(usize);

impl fmt::Display for Boom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "boom at unit {}", self.0)
    }
}
impl std::error::Error for Boom {}

/// Counts down `remaining`, recording the order units ran in.
#[derive(Default)]
struct Countdown {
    remaining: usize,
    done: Vec<usize>,
    fail_at: Option<usize>,
}

impl Countdown {
    fn new(n: usize) -> Self {
        Self { remaining: n, ..Default::default() }
    }
}

impl Task for Countdown {
    type Error = Boom;

    fn has_pending_work(&self) -> bool {
        self.remaining > 0
    }

    fn perform_unit(&mut self) -> Result<(), Boom> {
        let unit = self.done.len();
        if self.fail_at == Some(unit) {
            self.remaining = 0;
            return Err(Boom(unit));
        }
        self.done.push(unit);
        self.remaining -= 1;
        Ok(())
    }
}

#[test]
fn slice_yields_when_budget_runs_out() {
    let mut task = Countdown::new(10);
    let config = SchedulerConfig::default();

    let report = run_slice(&mut task, &UnitBudget::new(4), &config).unwrap();
    assert_eq!(report.units, 4);
    assert!(report.yielded);

    // Resumes exactly where it stopped.
    let report = run_slice(&mut task, &UnitBudget::new(4), &config).unwrap();
    assert_eq!(report.units, 4);
    let report = run_slice(&mut task, &UnitBudget::new(4), &config).unwrap();
    assert_eq!(report.units, 2);
    assert!(!report.yielded);
    assert_eq!(task.done, (0..10).collect::<Vec<_>>());
}

#[test]
fn exhausted_slice_still_makes_progress() {
    let mut task = Countdown::new(3);
    let report = run_slice(&mut task, &UnitBudget::new(0), &SchedulerConfig::default()).unwrap();
    assert_eq!(report.units, 1);
    assert!(report.yielded);
}

#[test]
fn threshold_is_configurable() {
    let mut task = Countdown::new(10);
    let config = SchedulerConfig::new().yield_threshold(Duration::from_millis(3));
    // 6ms budget: after unit 3 only 3ms remain, after unit 4 only 2ms.
    let report = run_slice(&mut task, &UnitBudget::new(6), &config).unwrap();
    assert_eq!(report.units, 4);
}

#[test]
fn drain_runs_everything() {
    let mut task = Countdown::new(5);
    assert_eq!(drain(&mut task).unwrap(), 5);
    assert!(!task.has_pending_work());
}

#[test]
fn idle_loop_rearms_forever() {
    let task = Rc::new(RefCell::new(Countdown::new(5)));
    let runtime = Rc::new(ManualRuntime::new());
    let scheduler = Scheduler::start(task.clone(), runtime.clone(), SchedulerConfig::default());
    assert!(scheduler.uses_idle());
    assert_eq!(runtime.pending_idle(), 1);

    assert!(runtime.run_idle_slice(&UnitBudget::new(2)).unwrap());
    assert_eq!(task.borrow().remaining, 3);
    assert!(runtime.run_idle_slice(&UnitBudget::new(2)).unwrap());
    assert!(runtime.run_idle_slice(&UnitBudget::new(2)).unwrap());
    assert_eq!(task.borrow().remaining, 0);

    // Nothing left to do, yet the loop keeps asking for time.
    assert!(runtime.run_idle_slice(&UnitBudget::new(2)).unwrap());
    assert_eq!(runtime.pending_idle(), 1);
    assert_eq!(runtime.pending_timers(), 0);
}

#[test]
fn timer_fallback_drains_in_one_callback() {
    let task = Rc::new(RefCell::new(Countdown::new(50)));
    let runtime = Rc::new(ManualRuntime::without_idle());
    let scheduler = Scheduler::start(task.clone(), runtime.clone(), SchedulerConfig::default());
    assert!(!scheduler.uses_idle());
    assert_eq!(runtime.pending_idle(), 0);

    assert!(runtime.run_timer().unwrap());
    assert_eq!(task.borrow().done.len(), 50);
    assert_eq!(runtime.pending_timers(), 1);
}

#[test]
fn timer_mode_can_be_forced() {
    let task = Rc::new(RefCell::new(Countdown::new(1)));
    let runtime = Rc::new(ManualRuntime::new());
    let config = SchedulerConfig::new().mode(ScheduleMode::Timer);
    let scheduler = Scheduler::start(task, runtime.clone(), config);
    assert!(!scheduler.uses_idle());
    assert_eq!(runtime.pending_timers(), 1);
}

#[test]
fn failure_surfaces_and_loop_survives() {
    let task = Rc::new(RefCell::new(Countdown {
        remaining: 5,
        fail_at: Some(2),
        ..Default::default()
    }));
    let runtime = Rc::new(ManualRuntime::new());
    Scheduler::start(task.clone(), runtime.clone(), SchedulerConfig::default());

    let err = runtime.run_idle_slice(&UnitBudget::new(10)).unwrap_err();
    assert_eq!(err.downcast_ref::<Boom>(), Some(&Boom(2)));
    assert_eq!(task.borrow().done, vec![0, 1]);
    assert_eq!(runtime.pending_idle(), 1);
}
