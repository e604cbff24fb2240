//! Game session integration tests.
//!
//! Whole-session scenarios driven through the public API with a manual clock:
//! timer protocol, boundary handling per mode, point policies, undo and
//! configuration fallbacks.

#![allow(clippy::unwrap_used, clippy::float_cmp)]

#[path = "common/mod.rs"]
mod common;

use common::{gongs, Harness};
use jugger_stones::telemetry::{ViolationKind, ViolationSeverity};
use jugger_stones::{
    assert_no_violations, assert_violation, Cue, ModeDescriptor, Preferences, Stones, StonesEvent,
    TeamIndex, TimerState,
};
use web_time::Duration;

fn bounded(size: i64) -> Preferences {
    Preferences {
        mode: size,
        ..Preferences::default()
    }
}

// ============================================================================
// Boundary scenarios
// ============================================================================

#[test]
fn twenty_ticks_in_mode_twenty_gong_once_and_wrap() {
    let mut h = Harness::new(bounded(20));
    h.session.start();
    h.ticks(19);
    assert_eq!(h.session.stones(), 19);
    assert_eq!(gongs(&h.cues()), 0);

    h.tick();
    assert_eq!(h.session.stones(), 0);
    let events = h.events();
    assert!(events.contains(&StonesEvent::Boundary {
        stones: Stones::ZERO
    }));
    assert_eq!(
        events.last(),
        Some(&StonesEvent::Cue {
            cue: Cue::Gong,
            stones: Stones::ZERO
        })
    );
    assert!(h.session.is_running());
    assert_no_violations!(h.observer);
}

#[test]
fn reverse_eight_reaches_zero_and_refills() {
    let mut h = Harness::new(Preferences {
        mode: 8,
        reverse: true,
        ..Preferences::default()
    });
    assert_eq!(h.session.stones(), 8);
    h.session.start();
    h.ticks(7);
    assert_eq!(h.session.stones(), 1);
    assert_eq!(gongs(&h.cues()), 0);

    h.tick();
    assert_eq!(h.session.stones(), 8);
    assert_eq!(h.cues(), vec![Cue::Gong]);
}

#[test]
fn full_cycle_fires_two_boundaries_in_both_directions() {
    for reverse in [false, true] {
        let mut h = Harness::new(Preferences {
            mode: 6,
            reverse,
            ..Preferences::default()
        });
        let start = h.session.stones();
        h.session.start();
        h.ticks(12);
        assert_eq!(h.session.stones(), start, "reverse={reverse}");
        assert_eq!(gongs(&h.cues()), 2, "reverse={reverse}");
    }
}

#[test]
fn infinity_never_gongs() {
    let mut h = Harness::new(Preferences::training());
    h.session.start();
    let mut cues = Vec::new();
    for _ in 0..500 {
        h.tick();
        cues.extend(h.cues());
    }
    assert_eq!(h.session.stones(), 500);
    assert_eq!(cues.len(), 500);
    assert!(cues.iter().all(|cue| *cue == Cue::Stone));
}

#[test]
fn countdown_cues_in_reverse_mode() {
    let mut h = Harness::new(Preferences {
        mode: 12,
        reverse: true,
        ..Preferences::default()
    });
    h.session.start();
    h.ticks(3);
    // 11 and 10 are not under the threshold, 9 is
    assert_eq!(h.cues(), vec![Cue::Stone, Cue::Stone, Cue::Countdown]);
}

#[test]
fn countdown_threshold_is_configurable() {
    let mut h = Harness::with_builder(bounded(12), |b| b.with_countdown_threshold(0));
    h.session.start();
    h.ticks(11);
    assert!(h.cues().iter().all(|cue| *cue == Cue::Stone));
}

#[test]
fn milestone_period_is_configurable() {
    let mut h = Harness::with_builder(Preferences::training(), |b| b.with_milestone_period(5));
    h.session.start();
    h.ticks(10);
    let milestones: Vec<_> = h
        .events()
        .into_iter()
        .filter(|e| matches!(e, StonesEvent::InfinityMilestone { .. }))
        .collect();
    assert_eq!(
        milestones,
        vec![
            StonesEvent::InfinityMilestone {
                stones: Stones::new(5)
            },
            StonesEvent::InfinityMilestone {
                stones: Stones::new(10)
            },
        ]
    );
}

// ============================================================================
// Timer protocol
// ============================================================================

#[test]
fn start_pause_toggle_protocol() {
    let mut h = Harness::new(Preferences::default());
    assert!(h.session.toggle());
    assert!(!h.session.start());
    assert!(matches!(h.session.timer_state(), TimerState::Running { .. }));
    assert!(!h.session.toggle());
    assert!(!h.session.pause());
    assert_eq!(h.session.timer_state(), TimerState::Idle);
    assert_eq!(
        h.events(),
        vec![StonesEvent::TimerStarted, StonesEvent::TimerPaused]
    );
}

#[test]
fn late_poll_catches_up_every_tick() {
    let mut h = Harness::new(bounded(100));
    h.session.start();
    h.clock.advance(Duration::from_millis(1500 * 7 + 10));
    assert_eq!(h.session.poll(), 7);
    assert_eq!(h.session.stones(), 7);
}

#[test]
fn interval_is_captured_at_start() {
    let mut h = Harness::new(Preferences {
        interval: 1000,
        ..Preferences::default()
    });
    h.session.start();
    h.session.apply_preferences(Preferences {
        interval: 250,
        ..Preferences::default()
    });
    assert_eq!(h.session.interval(), Duration::from_millis(250));
    h.clock.advance(Duration::from_millis(999));
    assert_eq!(h.session.poll(), 0);

    h.session.pause();
    h.session.start();
    h.clock.advance(Duration::from_millis(250));
    assert_eq!(h.session.poll(), 1);
}

#[test]
fn custom_interval_in_seconds() {
    let h = Harness::new(Preferences {
        interval: 0,
        interval_custom: 2.5,
        ..Preferences::default()
    });
    assert_eq!(h.session.interval(), Duration::from_millis(2500));
}

#[test]
fn stop_resets_counter_and_history_but_keeps_teams() {
    let mut h = Harness::new(bounded(50));
    h.session.start();
    h.ticks(5);
    h.session.score_point(TeamIndex::First);
    h.session.stop();
    assert!(!h.session.is_running());
    assert_eq!(h.session.stones(), 0);
    assert_eq!(h.session.history_len(), 0);
    assert_eq!(h.session.team(TeamIndex::First).points(), 1);
}

// ============================================================================
// Points
// ============================================================================

#[test]
fn point_while_running_with_pause_after_point() {
    let mut h = Harness::new(Preferences {
        pause_after_point: true,
        ..Preferences::default()
    });
    h.session.start();
    h.ticks(3);
    assert_eq!(h.session.score_point(TeamIndex::First), 1);
    assert_eq!(h.session.timer_state(), TimerState::Idle);
    assert_eq!(h.session.team(TeamIndex::First).points(), 1);
    assert_eq!(h.session.team(TeamIndex::Second).points(), 0);
    // gong_after_point is off
    assert_eq!(gongs(&h.cues()), 0);
}

#[test]
fn gong_after_point_without_pause_keeps_running() {
    let mut h = Harness::new(Preferences {
        gong_after_point: true,
        ..Preferences::default()
    });
    h.session.start();
    h.events();
    h.session.score_point(TeamIndex::Second);
    assert!(h.session.is_running());
    assert_eq!(h.cues(), vec![Cue::Gong]);
}

#[test]
fn unscore_is_clamped_at_zero() {
    let mut h = Harness::new(Preferences::default());
    assert!(!h.session.unscore_point(TeamIndex::First));
    h.session.score_point(TeamIndex::First);
    h.session.score_point(TeamIndex::First);
    h.session.reset_team_points(TeamIndex::First);
    assert_eq!(h.session.team(TeamIndex::First).points(), 0);
    assert!(h.cues().is_empty());
}

#[test]
fn team_edits() {
    let mut h = Harness::new(Preferences::default());
    h.session
        .set_team(TeamIndex::First, "Rats", "#112233")
        .unwrap();
    h.session.score_point(TeamIndex::First);
    h.session.flip_teams();
    assert_eq!(h.session.teams()[1].name(), "Rats");
    assert_eq!(h.session.teams()[1].points(), 1);
    assert!(h.session.set_team_color(TeamIndex::First, "red").is_err());
    h.session.reset_teams();
    assert_eq!(h.session.teams()[1].name(), "Team 2");
}

// ============================================================================
// Modes
// ============================================================================

#[test]
fn toggle_mode_twice_returns_to_bounded_mode() {
    let mut h = Harness::new(bounded(60));
    assert!(h.session.toggle_mode());
    assert!(h.session.mode().is_unbounded());
    assert!(h.session.toggle_mode());
    assert_eq!(h.session.mode(), ModeDescriptor::bounded(60, false));
}

#[test]
fn toggle_reverse_resets_to_new_start() {
    let mut h = Harness::new(bounded(30));
    h.session.set_stones(Stones::new(12));
    assert!(h.session.toggle_reverse());
    assert_eq!(h.session.stones(), 30);
    assert!(h.session.toggle_reverse());
    assert_eq!(h.session.stones(), 0);
}

#[test]
fn toggle_reverse_in_infinity_is_reported_not_applied() {
    let mut h = Harness::new(Preferences::training());
    assert!(!h.session.toggle_reverse());
    assert_violation!(h.observer, ViolationKind::CounterRange);
}

#[test]
fn settings_write_persists_to_store() {
    let mut h = Harness::new(bounded(40));
    h.session.apply_preferences(Preferences {
        mode: -1,
        ..Preferences::default()
    });
    assert!(h.session.mode().is_unbounded());
    assert_eq!(h.session.preferences().mode_previous, 40);
    assert!(h.session.toggle_mode());
    assert_eq!(h.session.mode().size(), 40);
}

#[test]
fn settings_resubmit_in_infinity_keeps_remembered_mode() {
    let mut h = Harness::new(bounded(40));
    assert!(h.session.toggle_mode());
    assert_eq!(h.session.preferences().mode_previous, 40);

    h.session.apply_preferences(Preferences {
        mode: -1,
        interval: 1000,
        ..Preferences::default()
    });
    assert!(h.session.mode().is_unbounded());
    assert_eq!(h.session.preferences().mode_previous, 40);
    assert_eq!(h.session.interval(), Duration::from_millis(1000));

    assert!(h.session.toggle_mode());
    assert_eq!(h.session.mode().size(), 40);
}

#[test]
fn bad_preference_is_reported_once_per_write() {
    let mut h = Harness::new(Preferences {
        mode: 0,
        mode_custom: f64::NAN,
        ..Preferences::default()
    });
    assert_eq!(h.session.mode().size(), 100);
    assert_eq!(h.observer.violations_of_kind(ViolationKind::Configuration).len(), 1);

    assert!(h.session.toggle_mode());
    assert!(h.session.mode().is_unbounded());
    assert_eq!(h.observer.violations_of_kind(ViolationKind::Configuration).len(), 1);
}

#[test]
fn session_starts_from_a_lenient_preference_document() {
    let prefs = Preferences::from_json(
        r#"{"mode":"8","reverse":"1","interval":"250","modeCustom":"many","theme":"dark"}"#,
    )
    .unwrap();
    assert_eq!(prefs.mode_custom, 100.0);

    let mut h = Harness::new(prefs);
    assert_eq!(h.session.mode(), ModeDescriptor::bounded(8, true));
    assert_eq!(h.session.interval(), Duration::from_millis(250));
    assert_eq!(h.session.stones(), 8);
    assert!(h.session.start());
    h.ticks(8);
    assert_eq!(gongs(&h.cues()), 1);
    assert_eq!(h.session.stones(), 8);
}

#[test]
fn invalid_configuration_falls_back_and_reports() {
    let h = Harness::new(Preferences {
        mode: -5,
        interval: -100,
        ..Preferences::default()
    });
    assert_eq!(h.session.mode(), ModeDescriptor::bounded(100, false));
    assert_eq!(h.session.interval(), Duration::from_millis(1));
    let config = h.observer.violations_of_kind(ViolationKind::Configuration);
    assert_eq!(config.len(), 2);
    assert!(config
        .iter()
        .all(|v| v.severity == ViolationSeverity::Warning));
}

#[test]
fn out_of_range_writes_are_cleaned() {
    let mut h = Harness::new(bounded(20));
    assert_eq!(h.session.set_stones(Stones::new(-25)), Stones::ZERO);
    assert_eq!(h.session.set_stones(Stones::new(47)), Stones::new(7));
    assert_eq!(h.session.set_stones(Stones::new(-19)), Stones::new(-19));
}

// ============================================================================
// Undo
// ============================================================================

#[test]
fn undo_walks_back_through_starts() {
    let mut h = Harness::new(bounded(100));
    for expected_points in 1..=3 {
        h.session.start();
        h.ticks(2);
        h.session.score_point(TeamIndex::Second);
        h.session.pause();
        assert_eq!(
            h.session.team(TeamIndex::Second).points(),
            expected_points
        );
    }
    assert_eq!(h.session.history_len(), 3);

    h.session.undo();
    assert_eq!(h.session.stones(), 4);
    assert_eq!(h.session.team(TeamIndex::Second).points(), 2);
    h.session.undo();
    h.session.undo();
    assert_eq!(h.session.stones(), 0);
    assert_eq!(h.session.team(TeamIndex::Second).points(), 0);

    h.session.undo();
    assert_violation!(h.observer, ViolationKind::History);
}

#[test]
fn identical_starts_do_not_grow_history() {
    let mut h = Harness::new(Preferences::default());
    for _ in 0..5 {
        h.session.start();
        h.session.pause();
    }
    assert_eq!(h.session.history_len(), 1);
}

#[test]
fn history_capacity_evicts_oldest() {
    let mut h = Harness::with_builder(Preferences::default(), |b| {
        b.with_history_capacity(4).unwrap()
    });
    for stones in 0..6 {
        h.session.set_stones(Stones::new(stones));
        h.session.start();
        h.session.pause();
    }
    assert_eq!(h.session.history_len(), 4);
    for expected in (2..6).rev() {
        h.session.undo();
        assert_eq!(h.session.stones(), expected);
    }
}

#[test]
fn undo_restores_infinity_and_remembers_bounded_mode() {
    let mut h = Harness::new(Preferences::training());
    h.session.set_stones(Stones::new(250));
    h.session.start();
    h.session.pause();
    h.session.toggle_mode();
    assert_eq!(h.session.mode().size(), 100);

    h.session.undo();
    assert!(h.session.mode().is_unbounded());
    assert_eq!(h.session.stones(), 250);
    assert_eq!(h.session.preferences().mode_previous, 100);
    assert!(h
        .events()
        .contains(&StonesEvent::ModeChanged {
            mode: ModeDescriptor::unbounded()
        }));
}
