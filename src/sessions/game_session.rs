use std::collections::VecDeque;
use std::sync::Arc;

use tracing::{debug, trace};
use web_time::Duration;

use crate::clock::Clock;
use crate::counter::Counter;
use crate::counter_range::CounterRange;
use crate::history::{HistoryEntry, HistoryStack};
use crate::mode::{ModeDescriptor, ModePreferences, PolicyFlags};
use crate::preferences::{PreferenceStore, Preferences};
use crate::report_violation_to;
use crate::score_board::{ScoreBoard, Team};
use crate::scheduler::{TickScheduler, TimerState};
use crate::sessions::event_drain::EventDrain;
use crate::telemetry::{
    InvariantChecker, InvariantViolation, ViolationKind, ViolationObserver, ViolationSeverity,
};
use crate::{debug_check_invariants, Cue, StonesEvent, StonesResult, Stones, TeamIndex};

/// The tunables a [`GameSessionBuilder`](crate::GameSessionBuilder) hands to a
/// new session.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SessionSettings {
    pub(crate) event_queue_size: usize,
    pub(crate) countdown_threshold: i64,
    pub(crate) milestone_period: i64,
    pub(crate) max_ticks_per_poll: usize,
}

/// A running Jugger scoreboard: stone counter, tick timer, teams and undo
/// history.
///
/// All state is owned here and every operation runs to completion on the
/// caller's thread. Time only passes when the host calls [`poll`](Self::poll),
/// which fires every tick that has come due on the session's clock.
///
/// Operations that a user can trigger at the wrong moment (editing stones
/// while the timer runs, removing a point from a team with none) are
/// rejected by returning `false`, never by erroring.
pub struct GameSession {
    preference_store: Box<dyn PreferenceStore>,
    mode_preferences: ModePreferences,
    /// Cached resolution of `mode_preferences`, refreshed after every write.
    mode: ModeDescriptor,
    interval: Duration,
    policy: PolicyFlags,
    counter: Counter,
    scheduler: TickScheduler,
    score_board: ScoreBoard,
    history: HistoryStack,
    clock: Box<dyn Clock>,
    event_queue: VecDeque<StonesEvent>,
    settings: SessionSettings,
    violation_observer: Option<Arc<dyn ViolationObserver>>,
}

impl std::fmt::Debug for GameSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameSession")
            .field("mode", &self.mode)
            .field("interval", &self.interval)
            .field("policy", &self.policy)
            .field("counter", &self.counter)
            .field("timer", &self.scheduler.state())
            .field("score_board", &self.score_board)
            .field("history_len", &self.history.len())
            .field("queued_events", &self.event_queue.len())
            .field("settings", &self.settings)
            .field("has_violation_observer", &self.violation_observer.is_some())
            .finish_non_exhaustive()
    }
}

impl GameSession {
    pub(crate) fn new(
        preference_store: Box<dyn PreferenceStore>,
        clock: Box<dyn Clock>,
        score_board: ScoreBoard,
        history: HistoryStack,
        settings: SessionSettings,
        violation_observer: Option<Arc<dyn ViolationObserver>>,
    ) -> Self {
        let mode_preferences =
            ModePreferences::new(preference_store.load(), violation_observer.clone());
        let mode = mode_preferences.current_mode();
        let interval = mode_preferences.interval();
        let policy = mode_preferences.policy();
        debug!(%mode, interval_ms = interval.as_millis(), "starting game session");

        Self {
            preference_store,
            mode_preferences,
            mode,
            interval,
            policy,
            counter: Counter::new(mode.range()),
            scheduler: TickScheduler::new(),
            score_board,
            history,
            clock,
            event_queue: VecDeque::with_capacity(settings.event_queue_size),
            settings,
            violation_observer,
        }
    }

    // ==========================================
    // Accessors
    // ==========================================

    /// The active mode.
    #[must_use]
    pub fn mode(&self) -> ModeDescriptor {
        self.mode
    }

    /// The resolved tick interval. A running timer keeps the interval it was
    /// started with until it is paused.
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// The tick and point behavior flags.
    #[must_use]
    pub fn policy(&self) -> PolicyFlags {
        self.policy
    }

    /// The raw preference values the session currently runs on.
    #[must_use]
    pub fn preferences(&self) -> &Preferences {
        self.mode_preferences.preferences()
    }

    /// The current counter value.
    #[must_use]
    pub fn stones(&self) -> Stones {
        self.counter.value()
    }

    /// The legal counter range of the active mode.
    #[must_use]
    pub fn counter_range(&self) -> CounterRange {
        self.counter.range()
    }

    /// Idle or running, with the next deadline.
    #[must_use]
    pub fn timer_state(&self) -> TimerState {
        self.scheduler.state()
    }

    /// Returns `true` while the timer runs.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    /// The team at `index`.
    #[must_use]
    pub fn team(&self, index: TeamIndex) -> &Team {
        self.score_board.team(index)
    }

    /// Both teams in display order.
    #[must_use]
    pub fn teams(&self) -> &[Team; 2] {
        self.score_board.teams()
    }

    /// Number of snapshots that [`undo`](Self::undo) can restore.
    #[must_use]
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Drains all queued events, oldest first.
    pub fn events(&mut self) -> EventDrain<'_> {
        EventDrain::from_drain(self.event_queue.drain(..))
    }

    // ==========================================
    // Timer
    // ==========================================

    /// Starts the timer. Snapshots the current state for undo and, with
    /// `immediate_start`, fires the first tick right away. Returns `false`
    /// if already running.
    pub fn start(&mut self) -> bool {
        if self.scheduler.is_running() {
            return false;
        }
        self.push_history();
        let now = self.clock.now();
        self.scheduler.start(now, self.interval);
        self.push_event(StonesEvent::TimerStarted);
        debug!(
            mode = %self.mode,
            interval_ms = self.interval.as_millis(),
            stones = %self.counter.value(),
            "timer started"
        );
        if self.policy.immediate_start {
            self.on_tick();
        }
        true
    }

    /// Pauses the timer. Returns `false` if already idle.
    pub fn pause(&mut self) -> bool {
        if !self.scheduler.pause() {
            return false;
        }
        self.push_event(StonesEvent::TimerPaused);
        debug!(stones = %self.counter.value(), "timer paused");
        true
    }

    /// Starts when idle, pauses when running. Returns whether the timer runs
    /// afterwards.
    pub fn toggle(&mut self) -> bool {
        if self.scheduler.is_running() {
            self.pause();
        } else {
            self.start();
        }
        self.scheduler.is_running()
    }

    /// Pauses, resets the counter to its start value and forgets all undo
    /// history. Teams are kept.
    pub fn stop(&mut self) {
        self.pause();
        self.counter.reset();
        self.history.clear();
        debug!("timer stopped, history cleared");
    }

    /// Fires every tick that has come due on the clock and returns how many
    /// fired.
    ///
    /// Ticks fire one at a time and the timer state is re-checked after each,
    /// so a tick that pauses (at the gong, say) stops the rest. A backlog
    /// larger than `max_ticks_per_poll` is dropped with a `Scheduler` warning.
    pub fn poll(&mut self) -> usize {
        let now = self.clock.now();
        let mut fired = 0;
        while self.scheduler.take_due(now) {
            self.on_tick();
            fired += 1;
            if fired >= self.settings.max_ticks_per_poll && self.scheduler.is_due(now) {
                report_violation_to!(
                    &self.violation_observer,
                    ViolationSeverity::Warning,
                    ViolationKind::Scheduler,
                    stones = self.counter.value(),
                    "more than {} ticks overdue, skipping the backlog",
                    self.settings.max_ticks_per_poll
                );
                self.scheduler.reanchor(now);
                break;
            }
        }
        fired
    }

    fn on_tick(&mut self) {
        let advance = self.counter.advance(self.mode.direction());
        let stones = advance.stones;
        if advance.overflowed {
            report_violation_to!(
                &self.violation_observer,
                ViolationSeverity::Warning,
                ViolationKind::CounterRange,
                stones = stones,
                "stone counter reached its limit and was reset"
            );
        }

        if self.mode.is_unbounded()
            && self.settings.milestone_period > 0
            && stones > 0
            && stones % self.settings.milestone_period == 0
        {
            self.push_event(StonesEvent::InfinityMilestone { stones });
        }

        if self.counter.settle_boundary() {
            let stones = self.counter.value();
            trace!(%stones, "boundary reached");
            self.push_event(StonesEvent::Boundary { stones });
            self.push_event(StonesEvent::Cue {
                cue: Cue::Gong,
                stones,
            });
            if self.policy.pause_after_gong {
                self.pause();
            }
        } else {
            let near_boundary = self.counter.range().is_boundary_approach(
                stones.unsigned_abs() as i64,
                self.settings.countdown_threshold,
            );
            let cue = if near_boundary {
                Cue::Countdown
            } else {
                Cue::Stone
            };
            trace!(%stones, ?cue, "tick");
            self.push_event(StonesEvent::Cue { cue, stones });
        }

        self.counter.canonicalize();
        debug_check_invariants!(&self.violation_observer, self.counter, "after tick");
    }

    // ==========================================
    // Teams
    // ==========================================

    /// Adds a point. Pauses if `pause_after_point` is set and plays a gong if
    /// `gong_after_point` is set and the timer was running. Returns the new
    /// total.
    pub fn score_point(&mut self, team: TeamIndex) -> u32 {
        let was_running = self.scheduler.is_running();
        let points = self.score_board.score(team);
        debug!(%team, points, "point scored");
        if self.policy.pause_after_point {
            self.pause();
        }
        if was_running && self.policy.gong_after_point {
            self.push_event(StonesEvent::Cue {
                cue: Cue::Gong,
                stones: self.counter.value(),
            });
        }
        points
    }

    /// Removes a point. Returns `false` if the team has none.
    pub fn unscore_point(&mut self, team: TeamIndex) -> bool {
        self.score_board.unscore(team)
    }

    /// Sets one team's points to zero.
    pub fn reset_team_points(&mut self, team: TeamIndex) {
        self.score_board.reset_points(team);
    }

    /// Renames and recolors a team. Blank fields fall back to the defaults.
    ///
    /// # Errors
    ///
    /// [`StonesError::InvalidColor`](crate::StonesError::InvalidColor) for a
    /// color that is not `#rrggbb`.
    pub fn set_team(&mut self, team: TeamIndex, name: &str, color: &str) -> StonesResult<()> {
        self.score_board.set_team(team, name, color)
    }

    /// Recolors a team.
    ///
    /// # Errors
    ///
    /// [`StonesError::InvalidColor`](crate::StonesError::InvalidColor) for a
    /// color that is not `#rrggbb`.
    pub fn set_team_color(&mut self, team: TeamIndex, color: &str) -> StonesResult<()> {
        self.score_board.set_color(team, color)
    }

    /// Swaps the two teams, points included.
    pub fn flip_teams(&mut self) {
        self.score_board.flip();
    }

    /// Restores default names, colors and zero points.
    pub fn reset_teams(&mut self) {
        self.score_board.reset();
    }

    // ==========================================
    // Manual stones
    // ==========================================

    /// Adds one stone while idle, up to the range maximum.
    pub fn increment_stones(&mut self) -> bool {
        if self.scheduler.is_running() || self.counter.value() >= self.counter.range().max() {
            return false;
        }
        self.counter.set(self.counter.value() + 1);
        true
    }

    /// Removes one stone while idle, down to the range minimum.
    pub fn decrement_stones(&mut self) -> bool {
        if self.scheduler.is_running() || self.counter.value() <= self.counter.range().min() {
            return false;
        }
        self.counter.set(self.counter.value() - 1);
        true
    }

    /// Sets the counter to full while idle in a reverse mode.
    pub fn fill_stones(&mut self) -> bool {
        if self.scheduler.is_running() || !self.mode.reverse() {
            return false;
        }
        self.counter.set(Stones::new(self.mode.size()));
        true
    }

    /// Sets the counter to zero while idle.
    pub fn clear_stones(&mut self) -> bool {
        if self.scheduler.is_running() || self.counter.value() == 0 {
            return false;
        }
        self.counter.set(Stones::ZERO);
        true
    }

    /// Writes an arbitrary value, folded into the active range. Allowed while
    /// running. Returns the stored value.
    pub fn set_stones(&mut self, raw: Stones) -> Stones {
        let stones = self.counter.set(raw);
        if stones != raw {
            trace!(%raw, %stones, "stones cleaned on write");
        }
        stones
    }

    /// Resets the counter to the start value of the active mode.
    pub fn reset_stones(&mut self) {
        self.counter.reset();
    }

    // ==========================================
    // Mode and preferences
    // ==========================================

    /// Swaps between the current mode and infinity while idle. Resets the
    /// counter. Returns `false` while running.
    pub fn toggle_mode(&mut self) -> bool {
        if self.scheduler.is_running() {
            return false;
        }
        self.mode_preferences.toggle_mode_with_unbounded();
        self.write_preferences();
        self.counter.reset();
        true
    }

    /// Flips between forward and reverse counting while idle in a bounded
    /// mode. Resets the counter. Returns `false` while running or in infinity.
    pub fn toggle_reverse(&mut self) -> bool {
        if self.scheduler.is_running() || !self.mode_preferences.toggle_reverse() {
            return false;
        }
        self.write_preferences();
        self.counter.reset();
        true
    }

    /// Replaces the preferences the way a settings form does, persists them
    /// and refreshes the mode. The counter is folded into the new range.
    pub fn apply_preferences(&mut self, preferences: Preferences) {
        self.mode_preferences.apply_settings(preferences);
        self.write_preferences();
    }

    /// Reloads preferences from the store and refreshes the cached mode,
    /// interval and policy. Call this after writing to a shared store from
    /// outside the session.
    pub fn recompute_mode_descriptor(&mut self) {
        let previous = self.mode;
        self.mode_preferences =
            ModePreferences::new(self.preference_store.load(), self.violation_observer.clone());
        self.mode = self.mode_preferences.current_mode();
        self.interval = self.mode_preferences.interval();
        self.policy = self.mode_preferences.policy();
        self.counter.set_range(self.mode.range());
        if previous != self.mode {
            debug!(from = %previous, to = %self.mode, "mode changed");
            self.push_event(StonesEvent::ModeChanged { mode: self.mode });
        }
    }

    fn write_preferences(&mut self) {
        self.preference_store
            .store(self.mode_preferences.preferences());
        self.recompute_mode_descriptor();
    }

    // ==========================================
    // History
    // ==========================================

    fn snapshot(&self) -> HistoryEntry {
        let [team1, team2] = self.score_board.teams().clone();
        HistoryEntry {
            team1,
            team2,
            stones: self.counter.value(),
            mode_size: self.mode.selector(),
            reverse: self.mode.reverse(),
        }
    }

    fn push_history(&mut self) {
        let entry = self.snapshot();
        self.history.push(entry);
        debug_check_invariants!(&self.violation_observer, self.history, "after snapshot");
    }

    /// Restores the most recent snapshot: mode and direction first, then the
    /// teams, then the counter (folded into the restored range). With nothing
    /// to undo, teams and counter are reset instead.
    pub fn undo(&mut self) {
        let Some(entry) = self.history.pop() else {
            report_violation_to!(
                &self.violation_observer,
                ViolationSeverity::Warning,
                ViolationKind::History,
                stones = self.counter.value(),
                "nothing to undo, resetting teams and stones"
            );
            self.score_board.reset();
            self.counter.reset();
            self.push_event(StonesEvent::Reset);
            return;
        };

        if entry.mode_size != self.mode.selector() {
            self.mode_preferences.set_mode_from_history(entry.mode_size);
            self.write_preferences();
        }
        if self.mode.reverse_allowed() && entry.reverse != self.mode.reverse() {
            self.mode_preferences.toggle_reverse();
            self.write_preferences();
        }
        self.score_board.restore(entry.team1, entry.team2);
        self.counter.set(entry.stones);
        debug!(stones = %self.counter.value(), mode = %self.mode, "history restored");
        self.push_event(StonesEvent::HistoryRestored);
    }

    fn push_event(&mut self, event: StonesEvent) {
        self.event_queue.push_back(event);
        while self.event_queue.len() > self.settings.event_queue_size {
            self.event_queue.pop_front();
        }
    }
}

impl InvariantChecker for GameSession {
    fn check_invariants(&self) -> Result<(), InvariantViolation> {
        self.counter.check_invariants()?;
        self.history.check_invariants()?;
        self.score_board.check_invariants()?;
        if self.counter.range().mode() != self.mode {
            return Err(
                InvariantViolation::new("GameSession", "counter range out of date").with_details(
                    format!("mode={}, range mode={}", self.mode, self.counter.range().mode()),
                ),
            );
        }
        if self.event_queue.len() > self.settings.event_queue_size {
            return Err(InvariantViolation::new(
                "GameSession",
                "event queue exceeds its size",
            ));
        }
        Ok(())
    }
}
