//! Common test infrastructure shared across integration tests.
//!
//! ```ignore
//! #[path = "common/mod.rs"]
//! mod common;
//! use common::{Harness, tick};
//! ```

#![allow(dead_code)]

use std::sync::Arc;

use jugger_stones::telemetry::CollectingObserver;
use jugger_stones::{
    Cue, GameSession, GameSessionBuilder, ManualClock, MemoryPreferenceStore, Preferences,
    StonesEvent,
};

/// A session driven by a manual clock, with every violation collected.
pub struct Harness {
    pub session: GameSession,
    pub clock: ManualClock,
    pub observer: Arc<CollectingObserver>,
}

impl Harness {
    pub fn new(preferences: Preferences) -> Self {
        Self::with_builder(preferences, |builder| builder)
    }

    /// Lets a test tweak the builder before the session starts.
    pub fn with_builder(
        preferences: Preferences,
        configure: impl FnOnce(GameSessionBuilder) -> GameSessionBuilder,
    ) -> Self {
        let clock = ManualClock::new();
        let observer = Arc::new(CollectingObserver::new());
        let builder = GameSessionBuilder::new()
            .with_preference_store(MemoryPreferenceStore::new(preferences))
            .with_clock(clock.clone())
            .with_violation_observer(observer.clone());
        let session = configure(builder).start_session();
        Self {
            session,
            clock,
            observer,
        }
    }

    /// Advances the clock by one interval and polls. Returns the ticks fired.
    pub fn tick(&mut self) -> usize {
        tick(&mut self.session, &self.clock)
    }

    /// Advances by `count` intervals, polling after each.
    pub fn ticks(&mut self, count: usize) -> usize {
        (0..count).map(|_| self.tick()).sum()
    }

    /// Drains the queue and returns only the cues.
    pub fn cues(&mut self) -> Vec<Cue> {
        cues(&mut self.session)
    }

    /// Drains the queue.
    pub fn events(&mut self) -> Vec<StonesEvent> {
        self.session.events().collect()
    }
}

pub fn tick(session: &mut GameSession, clock: &ManualClock) -> usize {
    clock.advance(session.interval());
    session.poll()
}

pub fn cues(session: &mut GameSession) -> Vec<Cue> {
    session
        .events()
        .filter_map(|event| match event {
            StonesEvent::Cue { cue, .. } => Some(cue),
            _ => None,
        })
        .collect()
}

/// Number of gong cues in a cue list.
pub fn gongs(cues: &[Cue]) -> usize {
    cues.iter().filter(|cue| **cue == Cue::Gong).count()
}
