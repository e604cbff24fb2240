//! Fuzz target for whole-session operation sequences.
//!
//! # Safety Properties Tested
//! - No panics on arbitrary operation sequences and preference values
//! - Session invariants hold after every operation
//! - The counter stays inside the active mode's range

#![no_main]

use arbitrary::Arbitrary;
use jugger_stones::telemetry::InvariantChecker;
use jugger_stones::{GameSessionBuilder, ManualClock, MemoryPreferenceStore, Preferences, Stones, TeamIndex};
use libfuzzer_sys::fuzz_target;
use std::time::Duration;

#[derive(Debug, Arbitrary)]
enum SessionOp {
    Start,
    Pause,
    Stop,
    /// Advance the clock by this many milliseconds, then poll
    Advance(u16),
    Score(bool),
    Unscore(bool),
    Undo,
    Increment,
    Decrement,
    Fill,
    Clear,
    Set(i64),
    ToggleMode,
    ToggleReverse,
    Flip,
    SetTeam { second: bool, name: String, color: String },
}

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    mode: i64,
    mode_custom: f64,
    interval: i64,
    interval_custom: f64,
    reverse: bool,
    immediate_start: bool,
    pause_after_point: bool,
    pause_after_gong: bool,
    operations: Vec<SessionOp>,
}

fn team(second: bool) -> TeamIndex {
    if second {
        TeamIndex::Second
    } else {
        TeamIndex::First
    }
}

fuzz_target!(|input: FuzzInput| {
    let clock = ManualClock::new();
    let mut session = GameSessionBuilder::new()
        .with_preference_store(MemoryPreferenceStore::new(Preferences {
            mode: input.mode,
            mode_custom: input.mode_custom,
            interval: input.interval,
            interval_custom: input.interval_custom,
            reverse: input.reverse,
            immediate_start: input.immediate_start,
            pause_after_point: input.pause_after_point,
            pause_after_gong: input.pause_after_gong,
            ..Preferences::default()
        }))
        .with_clock(clock.clone())
        .start_session();

    // Limit operations to keep runs fast
    for op in input.operations.into_iter().take(500) {
        match op {
            SessionOp::Start => {
                session.start();
            }
            SessionOp::Pause => {
                session.pause();
            }
            SessionOp::Stop => session.stop(),
            SessionOp::Advance(ms) => {
                clock.advance(Duration::from_millis(u64::from(ms)));
                session.poll();
            }
            SessionOp::Score(second) => {
                session.score_point(team(second));
            }
            SessionOp::Unscore(second) => {
                session.unscore_point(team(second));
            }
            SessionOp::Undo => session.undo(),
            SessionOp::Increment => {
                session.increment_stones();
            }
            SessionOp::Decrement => {
                session.decrement_stones();
            }
            SessionOp::Fill => {
                session.fill_stones();
            }
            SessionOp::Clear => {
                session.clear_stones();
            }
            SessionOp::Set(raw) => {
                session.set_stones(Stones::new(raw));
            }
            SessionOp::ToggleMode => {
                session.toggle_mode();
            }
            SessionOp::ToggleReverse => {
                session.toggle_reverse();
            }
            SessionOp::Flip => session.flip_teams(),
            SessionOp::SetTeam { second, name, color } => {
                let _ = session.set_team(team(second), &name, &color);
            }
        }

        assert!(session.check_invariants().is_ok());
        assert!(session.counter_range().contains(session.stones()));
        session.events().for_each(drop);
    }
});
