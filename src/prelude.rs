//! Convenient re-exports for common usage.
//!
//! ```rust
//! use jugger_stones::prelude::*;
//!
//! let mut session = GameSessionBuilder::new()
//!     .with_preference_store(MemoryPreferenceStore::new(Preferences::tournament()))
//!     .with_clock(ManualClock::new())
//!     .start_session();
//! session.score_point(TeamIndex::First);
//! assert_eq!(session.team(TeamIndex::First).points(), 1);
//! ```
//!
//! # What's Included
//!
//! - **Session types**: [`GameSession`], [`GameSessionBuilder`], [`EventDrain`]
//! - **Collaborators**: [`PreferenceStore`], [`MemoryPreferenceStore`], [`Clock`], [`SystemClock`], [`ManualClock`]
//! - **Fundamental types**: [`Stones`], [`TeamIndex`], [`Team`], [`TimerState`]
//! - **Modes**: [`Preferences`], [`ModeDescriptor`], [`ModeKind`], [`CounterRange`]
//! - **Events**: [`StonesEvent`], [`Cue`]
//! - **Error handling**: [`StonesError`], [`StonesResult`]

// Core session types
pub use crate::sessions::builder::GameSessionBuilder;
pub use crate::sessions::event_drain::EventDrain;
pub use crate::sessions::game_session::GameSession;

// Injected collaborators
pub use crate::{Clock, ManualClock, MemoryPreferenceStore, PreferenceStore, SystemClock};

// Fundamental types
pub use crate::{Stones, Team, TeamIndex, TimerState};

// Modes
pub use crate::{CounterRange, ModeDescriptor, ModeKind, Preferences};

// Events
pub use crate::{Cue, StonesEvent};

// Error handling
pub use crate::{StonesError, StonesResult};
