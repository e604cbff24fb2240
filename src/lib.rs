//! # Jugger Stones
//!
//! The counting core of a Jugger scoreboard: a "stone" counter that advances on
//! a fixed interval, two team scores, and the counting modes that decide how
//! the counter wraps and when the gong sounds.
//!
//! Everything is owned by a single [`GameSession`], built by a
//! [`GameSessionBuilder`] with an injected [`PreferenceStore`] and [`Clock`].
//! The session never renders or plays audio. Instead it queues
//! [`StonesEvent`]s (cues, timer transitions, mode changes) that the host
//! drains with [`GameSession::events`].
//!
//! # Example
//!
//! ```
//! use jugger_stones::{Cue, GameSessionBuilder, ManualClock, MemoryPreferenceStore, Preferences, StonesEvent};
//! use web_time::Duration;
//!
//! let clock = ManualClock::new();
//! let prefs = Preferences { mode: 20, interval: 1000, ..Preferences::default() };
//! let mut session = GameSessionBuilder::new()
//!     .with_preference_store(MemoryPreferenceStore::new(prefs))
//!     .with_clock(clock.clone())
//!     .start_session();
//!
//! session.start();
//! clock.advance(Duration::from_secs(20));
//! assert_eq!(session.poll(), 20);
//!
//! // the twentieth stone crossed the boundary and wrapped back to zero
//! assert_eq!(session.stones().as_i64(), 0);
//! let gongs = session
//!     .events()
//!     .filter(|e| matches!(e, StonesEvent::Cue { cue: Cue::Gong, .. }))
//!     .count();
//! assert_eq!(gongs, 1);
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub use clock::{Clock, ManualClock, SystemClock};
pub use counter_range::CounterRange;
pub use error::{StonesError, StonesResult};
pub use history::HistoryEntry;
pub use mode::{ModeDescriptor, ModeKind, ModePreferences, PolicyFlags};
pub use preferences::{MemoryPreferenceStore, PreferenceStore, Preferences};
pub use score_board::{ScoreBoard, Team, TeamDefaults};
pub use scheduler::TimerState;
pub use sessions::builder::GameSessionBuilder;
pub use sessions::event_drain::EventDrain;
pub use sessions::game_session::GameSession;

pub mod clock;
#[doc(hidden)]
pub mod counter;
pub mod counter_range;
#[doc(hidden)]
pub mod error;
#[doc(hidden)]
pub mod history;
pub mod mode;
pub mod preferences;
pub mod prelude;
pub mod score_board;
#[doc(hidden)]
pub mod scheduler;
pub mod telemetry;
#[doc(hidden)]
pub mod sessions {
    #[doc(hidden)]
    pub mod builder;
    #[doc(hidden)]
    pub mod event_drain;
    #[doc(hidden)]
    pub mod game_session;
}

/// Internal module exposing the session's components for property tests.
///
/// # ⚠️ WARNING: No Stability Guarantees
///
/// **This module is NOT part of the public API.** Its contents may change
/// without notice. Use [`GameSession`] in application code.
#[doc(hidden)]
pub mod __internal {
    pub use crate::counter::{Advance, Counter};
    pub use crate::history::HistoryStack;
    pub use crate::scheduler::TickScheduler;
}

// #############
// # CONSTANTS #
// #############

/// Largest stone count representable in infinity mode. A tick that would
/// reach it resets the counter to its start value instead.
pub const STONES_LIMIT: i64 = i64::MAX;

/// Largest accepted bounded mode size. Larger sizes are clamped so that the
/// doubled reverse range cannot overflow.
pub const MAX_MODE_SIZE: i64 = 1 << 48;

/// Default number of stones before a boundary at which the countdown cue
/// replaces the normal stone cue.
pub const DEFAULT_COUNTDOWN_THRESHOLD: i64 = 10;

/// Default period (in stones) of the infinity mode milestone event.
pub const DEFAULT_MILESTONE_PERIOD: i64 = 1500;

/// The value of the stone counter.
///
/// Stones are signed: a forward bounded mode may be set below zero by hand and
/// then counts up through zero towards its boundary.
///
/// # Examples
///
/// ```
/// use jugger_stones::Stones;
///
/// let stones = Stones::new(19);
/// assert_eq!((stones + 1).as_i64(), 20);
/// assert_eq!(Stones::new(20) % 20, 0);
/// assert!(Stones::new(-3) < 0);
/// ```
#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    serde::Serialize,
    serde::Deserialize,
)]
pub struct Stones(i64);

impl Stones {
    /// Zero stones.
    pub const ZERO: Self = Self(0);

    /// Creates a new `Stones` value. No range is enforced here; ranges belong
    /// to the active mode.
    #[inline]
    #[must_use]
    pub const fn new(stones: i64) -> Self {
        Self(stones)
    }

    /// Returns the underlying `i64` value.
    #[inline]
    #[must_use]
    pub const fn as_i64(self) -> i64 {
        self.0
    }

    /// Returns the magnitude of the value.
    #[inline]
    #[must_use]
    pub const fn unsigned_abs(self) -> u64 {
        self.0.unsigned_abs()
    }
}

impl std::fmt::Display for Stones {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::ops::Add<i64> for Stones {
    type Output = Self;

    #[inline]
    fn add(self, rhs: i64) -> Self::Output {
        Self(self.0 + rhs)
    }
}

impl std::ops::Sub<i64> for Stones {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: i64) -> Self::Output {
        Self(self.0 - rhs)
    }
}

impl std::ops::Rem<i64> for Stones {
    type Output = i64;

    #[inline]
    fn rem(self, rhs: i64) -> Self::Output {
        self.0 % rhs
    }
}

impl From<i64> for Stones {
    #[inline]
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<Stones> for i64 {
    #[inline]
    fn from(stones: Stones) -> Self {
        stones.0
    }
}

impl PartialEq<i64> for Stones {
    #[inline]
    fn eq(&self, other: &i64) -> bool {
        self.0 == *other
    }
}

impl PartialOrd<i64> for Stones {
    #[inline]
    fn partial_cmp(&self, other: &i64) -> Option<std::cmp::Ordering> {
        self.0.partial_cmp(other)
    }
}

/// Addresses one of the two teams on the scoreboard.
///
/// ```
/// use jugger_stones::TeamIndex;
///
/// assert_eq!(TeamIndex::try_from(1)?, TeamIndex::Second);
/// assert!(TeamIndex::try_from(2).is_err());
/// assert_eq!(TeamIndex::First.other(), TeamIndex::Second);
/// # Ok::<(), jugger_stones::StonesError>(())
/// ```
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum TeamIndex {
    /// Team 1, shown on the left.
    First,
    /// Team 2, shown on the right.
    Second,
}

impl TeamIndex {
    /// Both teams in display order.
    pub const ALL: [Self; 2] = [Self::First, Self::Second];

    /// Returns the zero-based position of this team.
    #[inline]
    #[must_use]
    pub const fn as_usize(self) -> usize {
        match self {
            Self::First => 0,
            Self::Second => 1,
        }
    }

    /// Returns the opposing team.
    #[inline]
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::First => Self::Second,
            Self::Second => Self::First,
        }
    }
}

impl std::fmt::Display for TeamIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "team {}", self.as_usize() + 1)
    }
}

impl TryFrom<usize> for TeamIndex {
    type Error = StonesError;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        match index {
            0 => Ok(Self::First),
            1 => Ok(Self::Second),
            _ => Err(StonesError::InvalidTeamIndex {
                index,
                max_index: 1,
            }),
        }
    }
}

// #############
// #   ENUMS   #
// #############

/// The audible/visual cue the presentation layer should play for a tick.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Cue {
    /// The normal per-stone cue.
    Stone,
    /// The per-stone cue used when the counter is close to its boundary.
    Countdown,
    /// The boundary cue, also played after a point when configured.
    Gong,
}

/// Notifications that the session queues for the presentation layer.
///
/// Drain them with [`GameSession::events`]. Playing a cue is fire-and-forget:
/// nothing the host does with an event can affect the counter.
///
/// # Forward Compatibility
///
/// This enum is marked `#[non_exhaustive]`. Always include a wildcard arm when
/// matching.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StonesEvent {
    /// A cue should be played. `stones` is the counter value after the tick.
    Cue {
        /// Which cue to play.
        cue: Cue,
        /// Counter value the cue belongs to.
        stones: Stones,
    },
    /// The counter crossed its boundary and was normalized to `stones`.
    Boundary {
        /// Counter value after normalization.
        stones: Stones,
    },
    /// Infinity mode passed another multiple of the milestone period.
    InfinityMilestone {
        /// Counter value that hit the milestone.
        stones: Stones,
    },
    /// The timer started running.
    TimerStarted,
    /// The timer stopped running (pause, stop, or an automatic pause).
    TimerPaused,
    /// The active mode descriptor changed.
    ModeChanged {
        /// The new mode.
        mode: ModeDescriptor,
    },
    /// An undo restored a history entry.
    HistoryRestored,
    /// Teams and counter were reset (undo with an empty history).
    Reset,
}
