use web_time::Duration;

/// Whether the tick timer is running.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum TimerState {
    /// No ticks are scheduled.
    #[default]
    Idle,
    /// Ticks fire every `interval`, the next one at `next_deadline`.
    Running {
        /// Clock time of the next tick.
        next_deadline: Duration,
        /// Tick interval captured when the timer started.
        interval: Duration,
    },
}

impl TimerState {
    /// Returns `true` while running.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        matches!(self, Self::Running { .. })
    }
}

/// Deadline bookkeeping for the periodic tick.
///
/// The scheduler holds at most one pending schedule, so it can never run two
/// timers at once. Deadlines advance by whole intervals from the start time,
/// which keeps the tick rate stable even when polls arrive late.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickScheduler {
    state: TimerState,
}

impl TickScheduler {
    /// An idle scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The current state.
    #[must_use]
    pub fn state(&self) -> TimerState {
        self.state
    }

    /// Returns `true` while running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    /// Starts ticking every `interval`, first at `now + interval`. Returns
    /// `false` if already running.
    pub fn start(&mut self, now: Duration, interval: Duration) -> bool {
        if self.is_running() {
            return false;
        }
        self.state = TimerState::Running {
            next_deadline: now.saturating_add(interval),
            interval,
        };
        true
    }

    /// Cancels the pending schedule. Returns `false` if already idle.
    pub fn pause(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.state = TimerState::Idle;
        true
    }

    /// Returns `true` if a tick is due at `now` without consuming it.
    #[must_use]
    pub fn is_due(&self, now: Duration) -> bool {
        matches!(self.state, TimerState::Running { next_deadline, .. } if now >= next_deadline)
    }

    /// Consumes one due tick, moving the deadline forward by one interval.
    pub fn take_due(&mut self, now: Duration) -> bool {
        match &mut self.state {
            TimerState::Running {
                next_deadline,
                interval,
            } if now >= *next_deadline => {
                *next_deadline = next_deadline.saturating_add(*interval);
                true
            },
            _ => false,
        }
    }

    /// Drops every overdue tick, scheduling the next one a full interval
    /// after `now`.
    pub fn reanchor(&mut self, now: Duration) {
        if let TimerState::Running {
            next_deadline,
            interval,
        } = &mut self.state
        {
            *next_deadline = now.saturating_add(*interval);
        }
    }
}
