use std::time::Duration;

/// How the work loop asks the runtime for time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScheduleMode {
    /// Idle slices when the runtime offers them, timer otherwise.
    #[default]
    Auto,
    /// Always idle slices. Falls back to the timer if unsupported.
    Idle,
    /// Always the zero-delay timer, draining all work per callback.
    Timer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    pub mode: ScheduleMode,
    /// Yield once the slice has less than this left.
    pub yield_threshold: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            mode: ScheduleMode::Auto,
            yield_threshold: Duration::from_millis(1),
        }
    }
}

impl SchedulerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(mut self, mode: ScheduleMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn yield_threshold(mut self, threshold: Duration) -> Self {
        self.yield_threshold = threshold;
        self
    }
}
