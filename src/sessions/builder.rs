use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::history::{HistoryStack, DEFAULT_HISTORY_CAPACITY};
use crate::preferences::{MemoryPreferenceStore, PreferenceStore};
use crate::score_board::{ScoreBoard, TeamDefaults};
use crate::sessions::game_session::{GameSession, SessionSettings};
use crate::telemetry::ViolationObserver;
use crate::{StonesError, DEFAULT_COUNTDOWN_THRESHOLD, DEFAULT_MILESTONE_PERIOD};

/// Default event queue size.
/// Events older than this threshold are dropped if not drained.
const DEFAULT_EVENT_QUEUE_SIZE: usize = 100;
/// Smallest accepted event queue size.
const MIN_EVENT_QUEUE_SIZE: usize = 10;
/// Default cap on ticks fired by one [`GameSession::poll`].
const DEFAULT_MAX_TICKS_PER_POLL: usize = 1000;

/// The [`GameSessionBuilder`] builds a [`GameSession`].
///
/// Every option has a default, so `GameSessionBuilder::new().start_session()`
/// gives a working session with in-memory preferences and the system clock.
///
/// ```
/// use jugger_stones::{GameSessionBuilder, ManualClock, MemoryPreferenceStore, Preferences};
///
/// let session = GameSessionBuilder::new()
///     .with_preference_store(MemoryPreferenceStore::new(Preferences::tournament()))
///     .with_clock(ManualClock::new())
///     .with_history_capacity(64)?
///     .with_countdown_threshold(5)
///     .start_session();
/// assert!(session.policy().pause_after_point);
/// # Ok::<(), jugger_stones::StonesError>(())
/// ```
#[must_use = "GameSessionBuilder must be consumed by calling start_session"]
pub struct GameSessionBuilder {
    preference_store: Box<dyn PreferenceStore>,
    clock: Box<dyn Clock>,
    /// Optional observer for state violations.
    violation_observer: Option<Arc<dyn ViolationObserver>>,
    team_defaults: TeamDefaults,
    history_capacity: usize,
    /// Maximum number of events to queue before oldest are dropped.
    event_queue_size: usize,
    countdown_threshold: i64,
    milestone_period: i64,
    max_ticks_per_poll: usize,
}

impl std::fmt::Debug for GameSessionBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Destructure so that new fields cannot be forgotten here.
        let Self {
            preference_store: _,
            clock: _,
            violation_observer,
            team_defaults,
            history_capacity,
            event_queue_size,
            countdown_threshold,
            milestone_period,
            max_ticks_per_poll,
        } = self;

        f.debug_struct("GameSessionBuilder")
            .field("has_violation_observer", &violation_observer.is_some())
            .field("team_defaults", team_defaults)
            .field("history_capacity", history_capacity)
            .field("event_queue_size", event_queue_size)
            .field("countdown_threshold", countdown_threshold)
            .field("milestone_period", milestone_period)
            .field("max_ticks_per_poll", max_ticks_per_poll)
            .finish_non_exhaustive()
    }
}

impl Default for GameSessionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GameSessionBuilder {
    /// Construct a new builder with all values set to their defaults.
    pub fn new() -> Self {
        Self {
            preference_store: Box::new(MemoryPreferenceStore::default()),
            clock: Box::new(SystemClock::new()),
            violation_observer: None,
            team_defaults: TeamDefaults::default(),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            event_queue_size: DEFAULT_EVENT_QUEUE_SIZE,
            countdown_threshold: DEFAULT_COUNTDOWN_THRESHOLD,
            milestone_period: DEFAULT_MILESTONE_PERIOD,
            max_ticks_per_poll: DEFAULT_MAX_TICKS_PER_POLL,
        }
    }

    /// Sets where preferences are read from and written to. Defaults to an
    /// in-memory store holding [`Preferences::default`](crate::Preferences::default).
    pub fn with_preference_store(mut self, store: impl PreferenceStore + 'static) -> Self {
        self.preference_store = Box::new(store);
        self
    }

    /// Sets the time source the tick scheduler polls. Defaults to
    /// [`SystemClock`].
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Sets a custom observer for state violations.
    ///
    /// Configuration fallbacks, counter overflows, skipped tick backlogs and
    /// undo on an empty history are reported to it. If no observer is set,
    /// violations are logged via the `tracing` crate.
    pub fn with_violation_observer(mut self, observer: Arc<dyn ViolationObserver>) -> Self {
        self.violation_observer = Some(observer);
        self
    }

    /// Sets the names and colors teams get on reset or when left blank.
    pub fn with_team_defaults(mut self, team_defaults: TeamDefaults) -> Self {
        self.team_defaults = team_defaults;
        self
    }

    /// Sets how many undo snapshots are kept. Default is 32.
    ///
    /// # Errors
    ///
    /// Returns [`StonesError::InvalidRequest`] if `capacity` is 0.
    pub fn with_history_capacity(mut self, capacity: usize) -> Result<Self, StonesError> {
        if capacity == 0 {
            return Err(StonesError::InvalidRequest {
                info: "history capacity must be at least 1".to_owned(),
            });
        }
        self.history_capacity = capacity;
        Ok(self)
    }

    /// Sets the maximum number of events to queue before oldest are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`StonesError::InvalidRequest`] if `size` is less than 10.
    pub fn with_event_queue_size(mut self, size: usize) -> Result<Self, StonesError> {
        if size < MIN_EVENT_QUEUE_SIZE {
            return Err(StonesError::InvalidRequest {
                info: format!(
                    "event queue size {} is smaller than {}",
                    size, MIN_EVENT_QUEUE_SIZE
                ),
            });
        }
        self.event_queue_size = size;
        Ok(self)
    }

    /// Sets how many stones before the boundary the countdown cue starts.
    /// Default is 10. Zero or less disables the countdown cue.
    pub fn with_countdown_threshold(mut self, threshold: i64) -> Self {
        self.countdown_threshold = threshold;
        self
    }

    /// Sets the infinity mode milestone period in stones. Default is 1500.
    /// Zero or less disables milestones.
    pub fn with_milestone_period(mut self, period: i64) -> Self {
        self.milestone_period = period;
        self
    }

    /// Sets how many overdue ticks one poll may fire before the rest of the
    /// backlog is skipped. Default is 1000.
    ///
    /// # Errors
    ///
    /// Returns [`StonesError::InvalidRequest`] if `max` is 0.
    pub fn with_max_ticks_per_poll(mut self, max: usize) -> Result<Self, StonesError> {
        if max == 0 {
            return Err(StonesError::InvalidRequest {
                info: "max ticks per poll must be at least 1".to_owned(),
            });
        }
        self.max_ticks_per_poll = max;
        Ok(self)
    }

    /// Consumes the builder to create a [`GameSession`]. The counter starts
    /// at the start value of the stored mode, teams at their defaults.
    #[must_use]
    pub fn start_session(self) -> GameSession {
        let settings = SessionSettings {
            event_queue_size: self.event_queue_size,
            countdown_threshold: self.countdown_threshold,
            milestone_period: self.milestone_period,
            max_ticks_per_poll: self.max_ticks_per_poll,
        };
        GameSession::new(
            self.preference_store,
            self.clock,
            ScoreBoard::new(self.team_defaults),
            HistoryStack::new(self.history_capacity),
            settings,
            self.violation_observer,
        )
    }
}
